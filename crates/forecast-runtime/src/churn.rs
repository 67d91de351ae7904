//! Churn decay: a fixed single-plan cohort attrited month by month.

use forecast_core::{check_horizon, validate_plan, Plan, PlanCatalog, ValidationError};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ForecastError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChurnMonth {
    pub month: u32,
    /// Users billed this month.
    pub active_users: u64,
    pub revenue: Decimal,
    /// `floor(active_users * churn_rate)`.
    pub churned: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChurnReport {
    pub plan: String,
    pub initial_users: u64,
    pub churn_rate: Decimal,
    pub total_revenue: Decimal,
    /// Users left after the last month's churn is applied.
    pub final_users: u64,
    /// `initial_users - final_users`.
    pub total_churned: u64,
    pub months: Vec<ChurnMonth>,
}

fn floor_users(users: u64, factor: Decimal) -> Result<u64, ForecastError> {
    Decimal::from(users)
        .checked_mul(factor)
        .map(|d| d.floor())
        .and_then(|d| d.to_u64())
        .ok_or(ForecastError::Overflow("cohort users"))
}

/// Attrit `initial_users` on `plan` for `months` months.
///
/// Each month bills the remaining users at the plan price, then keeps
/// `floor(remaining * (1 - churn_rate))`. A churn rate of 1 empties the
/// cohort after the first month.
pub fn simulate_churn(
    plan: &Plan,
    initial_users: u64,
    churn_rate: Decimal,
    months: u32,
) -> Result<ChurnReport, ForecastError> {
    validate_plan(plan)?;
    if churn_rate < Decimal::ZERO || churn_rate > Decimal::ONE {
        return Err(ValidationError::RateOutOfRange {
            field: format!("{} churn rate", plan.name),
            value: churn_rate,
        }
        .into());
    }
    check_horizon(&plan.name, months)?;

    let retained = Decimal::ONE - churn_rate;
    let mut remaining = initial_users;
    let mut total_revenue = Decimal::ZERO;
    let mut breakdown = Vec::with_capacity(months as usize);
    for month in 1..=months {
        let revenue = Decimal::from(remaining)
            .checked_mul(plan.monthly_price)
            .ok_or(ForecastError::Overflow("cohort revenue"))?;
        total_revenue = total_revenue
            .checked_add(revenue)
            .ok_or(ForecastError::Overflow("cohort revenue"))?;
        breakdown.push(ChurnMonth {
            month,
            active_users: remaining,
            revenue,
            churned: floor_users(remaining, churn_rate)?,
        });
        remaining = floor_users(remaining, retained)?;
    }

    info!(
        plan = %plan.name,
        initial_users,
        final_users = remaining,
        %total_revenue,
        "churn decay finished"
    );
    Ok(ChurnReport {
        plan: plan.name.clone(),
        initial_users,
        churn_rate,
        total_revenue,
        final_users: remaining,
        total_churned: initial_users - remaining,
        months: breakdown,
    })
}

/// Churn decay for a catalog plan, using its default churn rate unless overridden.
pub fn simulate_plan_churn(
    catalog: &PlanCatalog,
    plan: &str,
    initial_users: u64,
    months: u32,
    churn_override: Option<Decimal>,
) -> Result<ChurnReport, ForecastError> {
    let plan = catalog.plan_for(plan)?;
    let rate = churn_override
        .or(plan.default_churn_rate)
        .ok_or_else(|| ForecastError::MissingChurnRate(plan.name.clone()))?;
    simulate_churn(plan, initial_users, rate, months)
}
