#![deny(warnings)]

//! Economic models for the forecasting engine.
//!
//! This crate provides pure, validated functions for:
//! - Monthly recurring revenue split across a plan distribution
//! - Incremental add-on feature revenue with amortized upgrades
//! - Monthly cost breakdowns (stepped fixed, per-user, percentage-of-revenue)
//! - Profitability, CLV, CAC payback and growth KPIs
//!
//! Ratios never divide by zero: a zero denominator is reported as
//! [`EconError::DivisionByZero`] naming the metric.

mod adoption;
mod cost;
mod kpi;
mod revenue;

use forecast_core::ValidationError;
use rust_decimal::Decimal;
use thiserror::Error;

pub use adoption::{eligible_users, feature_revenue, single_feature_revenue, AMORTIZATION_MONTHS};
pub use cost::{compute_costs, CostInputs};
pub use kpi::{cac_payback, clv, growth_rate, per_unit, profitability, CacPayback};
pub use revenue::{compute_month, MONTHS_PER_YEAR};

/// Decimal places kept by derived rates and amortized shares.
///
/// Keeps every later product at a terminating scale, so sums are exact and
/// do not depend on the order they are added in.
pub const RATE_SCALE: u32 = 10;

/// Errors produced by economic helpers.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Ratio whose denominator is zero.
    #[error("division by zero computing {0}")]
    DivisionByZero(&'static str),
    /// Result exceeds the decimal range.
    #[error("numeric overflow computing {0}")]
    Overflow(&'static str),
    /// CLV needs a retention length from the caller or the plan.
    #[error("no retention length for plan {0}")]
    MissingRetention(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

pub(crate) fn mul(a: Decimal, b: Decimal, metric: &'static str) -> Result<Decimal, EconError> {
    a.checked_mul(b).ok_or(EconError::Overflow(metric))
}

pub(crate) fn add(a: Decimal, b: Decimal, metric: &'static str) -> Result<Decimal, EconError> {
    a.checked_add(b).ok_or(EconError::Overflow(metric))
}

pub(crate) fn sub(a: Decimal, b: Decimal, metric: &'static str) -> Result<Decimal, EconError> {
    a.checked_sub(b).ok_or(EconError::Overflow(metric))
}

pub(crate) fn div(a: Decimal, b: Decimal, metric: &'static str) -> Result<Decimal, EconError> {
    if b.is_zero() {
        return Err(EconError::DivisionByZero(metric));
    }
    a.checked_div(b).ok_or(EconError::Overflow(metric))
}
