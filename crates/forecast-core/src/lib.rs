#![deny(warnings)]

//! Core value types and invariants for the recurring-revenue forecasting engine.
//!
//! This crate defines the serializable configuration consumed by the simulators
//! (plan catalog, plan distribution, step schedules, feature and cost drivers,
//! scenarios) together with the snapshot types they produce. Every type is a
//! plain value object; validation helpers guarantee the invariants the
//! simulators rely on before any month is computed.

mod config;
mod drivers;
mod plan;
mod scenario;
mod schedule;
mod snapshot;

use rust_decimal::Decimal;
use thiserror::Error;

pub use config::{period_label, ConfigError, ForecastConfig};
pub use drivers::{
    validate_cost_drivers, validate_feature, CostDriverSet, FeatureAdoptionConfig, PercentageCost,
    RevenueBase, UserBasis, VariableCost,
};
pub use plan::{
    validate_catalog, validate_distribution, validate_plan, Plan, PlanCatalog, PlanDistribution,
    PlanWeight,
};
pub use scenario::{check_horizon, validate_scenario, Scenario, MAX_HORIZON_MONTHS};
pub use schedule::{validate_conversion_schedule, validate_schedule, Step, StepSchedule};
pub use snapshot::{
    CostBreakdown, CostComponent, FeatureBreakdown, FeatureRevenue, MonthlyRevenue,
    MonthlySnapshot, PlanRevenue, Profitability,
};

/// Validation errors for configuration invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Price, cost or coefficient must be non-negative.
    #[error("negative monetary value for {0}")]
    NegativeMoney(String),
    /// Rate or weight must be within [0, 1].
    #[error("{field} must be within [0,1], got {value}")]
    RateOutOfRange { field: String, value: Decimal },
    /// Growth adjustments below -100% would produce negative populations.
    #[error("{field} must be >= -1, got {value}")]
    GrowthBelowFloor { field: String, value: Decimal },
    /// Names identify plans, features, cost components and scenarios.
    #[error("name must not be empty")]
    EmptyName,
    /// Names must be unique within their collection.
    #[error("duplicate name: {0}")]
    DuplicateName(String),
    /// A step schedule needs at least one step.
    #[error("schedule has no steps")]
    EmptySchedule,
    /// Step thresholds must be strictly increasing and start at month 1 or later.
    #[error("schedule thresholds must increase: {previous} then {next}")]
    NonMonotonicSchedule { previous: u32, next: u32 },
    /// Only the final step may be open-ended.
    #[error("open-ended step must be the last step")]
    OpenStepNotLast,
    /// Months are 1-based.
    #[error("invalid month {0}: months start at 1")]
    InvalidMonth(u32),
    /// A forecast must cover at least one month.
    #[error("scenario {0} has a zero-month horizon")]
    ZeroHorizon(String),
    /// Horizons are capped at [`MAX_HORIZON_MONTHS`].
    #[error("{name} horizon of {months} months exceeds {}", MAX_HORIZON_MONTHS)]
    HorizonTooLong { name: String, months: u32 },
    /// Retention lengths are strictly positive.
    #[error("retention for {0} must be at least one month")]
    NonPositiveRetention(String),
    /// Percentage must be within [0, 100].
    #[error("{field} must be within [0,100], got {value}")]
    PercentOutOfRange { field: String, value: Decimal },
    /// Lookup of a plan absent from the catalog.
    #[error("plan not found: {0}")]
    PlanNotFound(String),
}

pub(crate) fn check_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

pub(crate) fn check_money(field: &str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney(field.to_string()));
    }
    Ok(())
}

pub(crate) fn check_rate(field: &str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(ValidationError::RateOutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

pub(crate) fn check_growth(field: &str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::NEGATIVE_ONE {
        return Err(ValidationError::GrowthBelowFloor {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

pub(crate) fn check_unique<'a, I>(names: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = std::collections::BTreeSet::new();
    for name in names {
        check_name(name)?;
        if !seen.insert(name) {
            return Err(ValidationError::DuplicateName(name.to_string()));
        }
    }
    Ok(())
}
