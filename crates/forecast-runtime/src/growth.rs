//! Growth projection: compounding users through the conversion schedule.

use forecast_core::{
    period_label, validate_scenario, ForecastConfig, MonthlySnapshot, Scenario, StepSchedule,
    ValidationError,
};
use forecast_econ::{compute_month, RATE_SCALE};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::ForecastError;

/// `floor(users * (1 + growth_rate))`.
pub fn next_users(users: u64, growth_rate: Decimal) -> Result<u64, ForecastError> {
    Decimal::from(users)
        .checked_mul(Decimal::ONE + growth_rate)
        .map(|d| d.floor())
        .and_then(|d| d.to_u64())
        .ok_or(ForecastError::Overflow("users"))
}

/// Conversion rate of one month: `schedule(month) * multiplier`, rounded to
/// [`RATE_SCALE`] places and checked against [0,1].
fn adjusted_rate(
    schedule: &StepSchedule,
    scenario: &Scenario,
    month: u32,
    multiplier: Decimal,
) -> Result<Decimal, ForecastError> {
    let rate = schedule
        .value_for_month(month)?
        .checked_mul(multiplier)
        .ok_or(ForecastError::Overflow("conversion rate"))?
        .round_dp(RATE_SCALE);
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(ValidationError::RateOutOfRange {
            field: format!("{} conversion rate in month {}", scenario.name, month),
            value: rate,
        }
        .into());
    }
    Ok(rate)
}

fn compound(multiplier: Decimal, factor: Decimal) -> Result<Decimal, ForecastError> {
    multiplier
        .checked_mul(factor)
        .ok_or(ForecastError::Overflow("conversion growth"))
}

/// Conversion rate for each month of the scenario's horizon.
///
/// Month n uses `schedule(n) * (1 + conversion_growth)^(n-1)`.
pub fn conversion_rates(
    schedule: &StepSchedule,
    scenario: &Scenario,
) -> Result<Vec<Decimal>, ForecastError> {
    validate_scenario(scenario)?;
    let factor = Decimal::ONE + scenario.conversion_growth;
    let mut multiplier = Decimal::ONE;
    let mut rates = Vec::with_capacity(scenario.months as usize);
    for month in 1..=scenario.months {
        rates.push(adjusted_rate(schedule, scenario, month, multiplier)?);
        multiplier = compound(multiplier, factor)?;
    }
    Ok(rates)
}

/// Exactly `scenario.months` snapshots with recurring revenue only.
pub fn project_growth(
    config: &ForecastConfig,
    scenario: &Scenario,
) -> Result<Vec<MonthlySnapshot>, ForecastError> {
    config.validate()?;
    validate_scenario(scenario)?;
    project_validated(config, scenario)
}

pub(crate) fn project_validated(
    config: &ForecastConfig,
    scenario: &Scenario,
) -> Result<Vec<MonthlySnapshot>, ForecastError> {
    let factor = Decimal::ONE + scenario.conversion_growth;
    let mut multiplier = Decimal::ONE;
    let mut snapshots = Vec::with_capacity(scenario.months as usize);
    let mut users = scenario.initial_users;
    for month in 1..=scenario.months {
        if month > 1 {
            users = next_users(users, scenario.growth_rate)?;
            multiplier = compound(multiplier, factor)?;
        }
        let rate = adjusted_rate(&config.conversion, scenario, month, multiplier)?;
        let revenue = compute_month(users, rate, &config.distribution, &config.plans)?;
        let mut snap = MonthlySnapshot::from_revenue(month, users, rate, revenue);
        snap.label = config.start_month.map(|start| period_label(start, month));
        debug!(
            scenario = %scenario.name,
            month,
            users,
            mrr = %snap.recurring_revenue,
            "projected month"
        );
        snapshots.push(snap);
    }
    Ok(snapshots)
}
