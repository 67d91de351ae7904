//! Add-on feature adoption.

use forecast_core::{FeatureAdoptionConfig, FeatureBreakdown, FeatureRevenue, PlanRevenue};
use rust_decimal::Decimal;

use crate::{add, div, mul, EconError, RATE_SCALE};

/// Months over which one-time upgrade revenue is recognized.
pub const AMORTIZATION_MONTHS: u32 = 12;

/// Paying users on the named plans. Names missing from the breakdown add nothing.
pub fn eligible_users(per_plan: &[PlanRevenue], eligible_plans: &[String]) -> Decimal {
    per_plan
        .iter()
        .filter(|p| eligible_plans.iter().any(|name| name == &p.plan))
        .map(|p| p.users)
        .sum()
}

/// Revenue recognized this month from one feature.
///
/// The amortized upgrade share is rounded to [`RATE_SCALE`] places.
pub fn single_feature_revenue(
    feature: &FeatureAdoptionConfig,
    eligible_users: Decimal,
    total_users: u64,
) -> Result<FeatureRevenue, EconError> {
    let adopters = mul(eligible_users, feature.adoption_rate, "feature adopters")?;
    let usage_revenue = mul(
        mul(adopters, feature.monthly_usage_rate, "feature usage")?,
        feature.price,
        "feature usage revenue",
    )?;
    let upgrade_revenue = mul(
        mul(Decimal::from(total_users), feature.upgrade_rate, "feature upgrades")?,
        feature.price,
        "feature upgrade revenue",
    )?;
    let amortized = div(
        upgrade_revenue,
        Decimal::from(AMORTIZATION_MONTHS),
        "amortized upgrade revenue",
    )?
    .round_dp(RATE_SCALE);
    Ok(FeatureRevenue {
        feature: feature.name.clone(),
        adopters,
        usage_revenue,
        upgrade_revenue,
        revenue: add(usage_revenue, amortized, "feature revenue")?,
    })
}

/// Per-feature breakdown, in configuration order, and the month's total.
pub fn feature_revenue(
    features: &[FeatureAdoptionConfig],
    eligible_users: Decimal,
    total_users: u64,
) -> Result<FeatureBreakdown, EconError> {
    let mut breakdown = FeatureBreakdown {
        features: Vec::with_capacity(features.len()),
        total: Decimal::ZERO,
    };
    for feature in features {
        let r = single_feature_revenue(feature, eligible_users, total_users)?;
        breakdown.total = add(breakdown.total, r.revenue, "feature revenue total")?;
        breakdown.features.push(r);
    }
    Ok(breakdown)
}
