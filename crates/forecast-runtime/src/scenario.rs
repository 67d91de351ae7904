//! Scenario runner: one independent forecast per named scenario.

use std::collections::BTreeMap;

use forecast_core::{ForecastConfig, Scenario};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::forecast::{forecast_validated, ForecastResult};
use crate::ForecastError;

/// Comparable headline figures of one scenario plus its full forecast.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub final_mrr: Decimal,
    pub final_arr: Decimal,
    pub total_revenue: Decimal,
    pub final_users: u64,
    pub final_paid_users: Decimal,
    pub forecast: ForecastResult,
}

impl From<ForecastResult> for ScenarioSummary {
    fn from(forecast: ForecastResult) -> Self {
        let k = &forecast.kpis;
        Self {
            final_mrr: k.final_mrr,
            final_arr: k.final_arr,
            total_revenue: k.total_revenue,
            final_users: k.final_users,
            final_paid_users: k.final_paid_users,
            forecast,
        }
    }
}

fn run_one(config: &ForecastConfig, scenario: &Scenario) -> Result<ScenarioSummary, ForecastError> {
    forecast_validated(config, scenario).map(ScenarioSummary::from)
}

/// Run every configured scenario in turn.
pub fn run_scenarios(
    config: &ForecastConfig,
) -> Result<BTreeMap<String, ScenarioSummary>, ForecastError> {
    config.validate()?;
    info!(scenarios = config.scenarios.len(), "running scenarios");
    config
        .scenarios
        .iter()
        .map(|s| run_one(config, s).map(|summary| (s.name.clone(), summary)))
        .collect()
}

/// Run every configured scenario on the rayon thread pool.
///
/// Results are identical to [`run_scenarios`]; the first failing scenario in
/// configuration order is reported.
pub fn run_scenarios_parallel(
    config: &ForecastConfig,
) -> Result<BTreeMap<String, ScenarioSummary>, ForecastError> {
    config.validate()?;
    info!(
        scenarios = config.scenarios.len(),
        "running scenarios in parallel"
    );
    let results: Vec<_> = config
        .scenarios
        .par_iter()
        .map(|s| run_one(config, s).map(|summary| (s.name.clone(), summary)))
        .collect();
    results.into_iter().collect()
}

/// Run a single configured scenario by name.
pub fn run_named(config: &ForecastConfig, name: &str) -> Result<ScenarioSummary, ForecastError> {
    let scenario = config
        .scenario(name)
        .ok_or_else(|| ForecastError::ScenarioNotFound(name.to_string()))?;
    config.validate()?;
    run_one(config, scenario)
}
