#![deny(warnings)]

//! Simulation runtime: month-by-month drivers and scenario orchestration.
//!
//! Every run is a sequential fold over the horizon (month n+1 depends on
//! month n). Runs share nothing mutable, so independent scenarios may execute
//! on the rayon pool. A run either returns its full month sequence or an
//! error; partial sequences are never returned.

mod aggregate;
mod churn;
mod forecast;
mod growth;
mod scenario;

use forecast_core::ValidationError;
use forecast_econ::EconError;
use thiserror::Error;

pub use aggregate::{summarize, KpiSummary, PlanEconomics, UndefinedMetric};
pub use churn::{simulate_churn, simulate_plan_churn, ChurnMonth, ChurnReport};
pub use forecast::{run_forecast, ForecastResult};
pub use growth::{conversion_rates, next_users, project_growth};
pub use scenario::{run_named, run_scenarios, run_scenarios_parallel, ScenarioSummary};

#[derive(Debug, Error, PartialEq)]
pub enum ForecastError {
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Econ(#[from] EconError),
    #[error("numeric overflow computing {0}")]
    Overflow(&'static str),
    #[error("scenario not found: {0}")]
    ScenarioNotFound(String),
    #[error("no churn rate given or configured for plan {0}")]
    MissingChurnRate(String),
}
