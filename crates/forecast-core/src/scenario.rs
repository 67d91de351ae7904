//! Scenarios: named growth assumptions over a bounded horizon.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{check_growth, check_name, ValidationError};

/// A named, independent set of forecast assumptions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Users at month 1.
    pub initial_users: u64,
    /// Horizon length in months (>= 1).
    pub months: u32,
    /// Monthly compounding user growth, e.g. 0.15.
    pub growth_rate: Decimal,
    /// Monthly compounding adjustment applied on top of the conversion schedule.
    #[serde(default)]
    pub conversion_growth: Decimal,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        initial_users: u64,
        months: u32,
        growth_rate: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            initial_users,
            months,
            growth_rate,
            conversion_growth: Decimal::ZERO,
        }
    }

    pub fn with_conversion_growth(mut self, conversion_growth: Decimal) -> Self {
        self.conversion_growth = conversion_growth;
        self
    }
}

/// Longest horizon a simulation accepts: 100 years.
pub const MAX_HORIZON_MONTHS: u32 = 1200;

/// Horizon must be within `1..=MAX_HORIZON_MONTHS`.
pub fn check_horizon(name: &str, months: u32) -> Result<(), ValidationError> {
    if months == 0 {
        return Err(ValidationError::ZeroHorizon(name.to_string()));
    }
    if months > MAX_HORIZON_MONTHS {
        return Err(ValidationError::HorizonTooLong {
            name: name.to_string(),
            months,
        });
    }
    Ok(())
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    check_name(&scenario.name)?;
    check_horizon(&scenario.name, scenario.months)?;
    check_growth("growth_rate", scenario.growth_rate)?;
    check_growth("conversion_growth", scenario.conversion_growth)
}
