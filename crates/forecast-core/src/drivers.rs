//! Add-on feature and cost driver configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::schedule::{validate_money_schedule, StepSchedule};
use crate::{check_money, check_name, check_rate, check_unique, ValidationError};

/// Optional add-on sold to part of the paying population.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureAdoptionConfig {
    pub name: String,
    /// Price per billed use and per one-time upgrade.
    pub price: Decimal,
    /// Fraction of the eligible cohort that adopts the feature.
    pub adoption_rate: Decimal,
    /// Fraction of adopters billed in a given month.
    pub monthly_usage_rate: Decimal,
    /// Fraction of all users paying a one-time upgrade, amortized over 12 months.
    #[serde(default)]
    pub upgrade_rate: Decimal,
}

/// Which population a variable cost scales with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserBasis {
    #[default]
    TotalUsers,
    PayingUsers,
}

/// Per-user cost with a minimum monthly amount.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableCost {
    pub name: String,
    #[serde(default)]
    pub basis: UserBasis,
    pub per_user: Decimal,
    #[serde(default)]
    pub floor: Decimal,
}

/// Which revenue figure a percentage cost applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueBase {
    /// Recurring plus feature revenue recognized in the month.
    #[default]
    RecognizedRevenue,
    /// Feature (add-on) revenue only.
    FeatureRevenue,
}

/// Named cost proportional to revenue, e.g. marketing or platform fees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PercentageCost {
    pub name: String,
    pub rate: Decimal,
    #[serde(default)]
    pub base: RevenueBase,
}

/// Coefficients for the monthly cost model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostDriverSet {
    /// Fixed monthly cost by month range.
    pub fixed: StepSchedule,
    #[serde(default)]
    pub variable: Vec<VariableCost>,
    #[serde(default)]
    pub percentage: Vec<PercentageCost>,
}

pub fn validate_feature(feature: &FeatureAdoptionConfig) -> Result<(), ValidationError> {
    check_name(&feature.name)?;
    check_money(&feature.name, feature.price)?;
    check_rate(&format!("{} adoption rate", feature.name), feature.adoption_rate)?;
    check_rate(
        &format!("{} monthly usage rate", feature.name),
        feature.monthly_usage_rate,
    )?;
    check_rate(&format!("{} upgrade rate", feature.name), feature.upgrade_rate)
}

pub fn validate_cost_drivers(costs: &CostDriverSet) -> Result<(), ValidationError> {
    validate_money_schedule("fixed cost", &costs.fixed)?;
    for v in &costs.variable {
        check_money(&v.name, v.per_user)?;
        check_money(&v.name, v.floor)?;
    }
    for p in &costs.percentage {
        check_rate(&p.name, p.rate)?;
    }
    check_unique(
        costs
            .variable
            .iter()
            .map(|v| v.name.as_str())
            .chain(costs.percentage.iter().map(|p| p.name.as_str())),
    )
}
