//! Full forecast pipeline: growth, feature adoption, costs, KPIs.

use forecast_core::{validate_scenario, ForecastConfig, MonthlySnapshot, Scenario};
use forecast_econ::{compute_costs, eligible_users, feature_revenue, profitability, CostInputs};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::{summarize, KpiSummary};
use crate::growth::project_validated;
use crate::ForecastError;

/// Output handed to reporting: every month plus the summary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub scenario: String,
    pub months: Vec<MonthlySnapshot>,
    pub kpis: KpiSummary,
}

/// Run one scenario end to end.
pub fn run_forecast(
    config: &ForecastConfig,
    scenario: &Scenario,
) -> Result<ForecastResult, ForecastError> {
    config.validate()?;
    validate_scenario(scenario)?;
    forecast_validated(config, scenario)
}

pub(crate) fn forecast_validated(
    config: &ForecastConfig,
    scenario: &Scenario,
) -> Result<ForecastResult, ForecastError> {
    info!(
        scenario = %scenario.name,
        months = scenario.months,
        initial_users = scenario.initial_users,
        "forecast started"
    );
    let mut months = project_validated(config, scenario)?;
    for snap in &mut months {
        layer_month(config, snap)?;
    }
    let kpis = summarize(&months, config)?;
    info!(
        scenario = %scenario.name,
        final_mrr = %kpis.final_mrr,
        total_revenue = %kpis.total_revenue,
        "forecast finished"
    );
    Ok(ForecastResult {
        scenario: scenario.name.clone(),
        months,
        kpis,
    })
}

/// Add feature revenue, costs and profitability to a revenue-only snapshot.
fn layer_month(config: &ForecastConfig, snap: &mut MonthlySnapshot) -> Result<(), ForecastError> {
    if !config.features.is_empty() {
        let eligible = eligible_users(&snap.per_plan, &config.eligible_plans);
        let features = feature_revenue(&config.features, eligible, snap.users)?;
        snap.recognized_revenue = snap
            .recurring_revenue
            .checked_add(features.total)
            .ok_or(ForecastError::Overflow("recognized revenue"))?;
        snap.features = Some(features);
    }

    if let Some(drivers) = &config.costs {
        let costs = compute_costs(
            drivers,
            &CostInputs {
                month: snap.month,
                users: snap.users,
                paying_users: snap.paid_users,
                recognized_revenue: snap.recognized_revenue,
                feature_revenue: snap.feature_revenue(),
            },
        )?;
        snap.profitability = if snap.recognized_revenue == Decimal::ZERO {
            None
        } else {
            Some(profitability(
                snap.recognized_revenue,
                costs.total,
                config.operating_expense_ratio,
            )?)
        };
        snap.costs = Some(costs);
    }
    Ok(())
}
