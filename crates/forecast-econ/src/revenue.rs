//! Monthly revenue calculator.

use forecast_core::{MonthlyRevenue, PlanCatalog, PlanDistribution, PlanRevenue, ValidationError};
use rust_decimal::Decimal;
use tracing::debug;

use crate::{add, mul, EconError};

pub const MONTHS_PER_YEAR: u32 = 12;

/// Paying users and recurring revenue per plan for one month.
///
/// `paid_users = users * conversion_rate` stays fractional. Plans are visited
/// in catalog order; a plan contributes when the distribution assigns it a
/// weight. Distribution entries naming plans absent from the catalog are
/// skipped without error.
pub fn compute_month(
    users: u64,
    conversion_rate: Decimal,
    distribution: &PlanDistribution,
    catalog: &PlanCatalog,
) -> Result<MonthlyRevenue, EconError> {
    if conversion_rate < Decimal::ZERO || conversion_rate > Decimal::ONE {
        return Err(ValidationError::RateOutOfRange {
            field: "conversion rate".to_string(),
            value: conversion_rate,
        }
        .into());
    }
    for w in distribution.iter().filter(|w| !catalog.contains(&w.plan)) {
        debug!(plan = %w.plan, "distribution references unknown plan; skipped");
    }

    let paid_users = mul(Decimal::from(users), conversion_rate, "paid users")?;
    let mut per_plan = Vec::with_capacity(catalog.len());
    let mut recurring_revenue = Decimal::ZERO;
    for plan in catalog.iter() {
        let Some(weight) = distribution.weight(&plan.name) else {
            continue;
        };
        let users = mul(paid_users, weight, "plan users")?;
        let revenue = mul(users, plan.monthly_price, "plan revenue")?;
        recurring_revenue = add(recurring_revenue, revenue, "recurring revenue")?;
        per_plan.push(PlanRevenue {
            plan: plan.name.clone(),
            users,
            revenue,
        });
    }
    let annualized_revenue = mul(
        recurring_revenue,
        Decimal::from(MONTHS_PER_YEAR),
        "annualized revenue",
    )?;
    Ok(MonthlyRevenue {
        paid_users,
        recurring_revenue,
        annualized_revenue,
        per_plan,
    })
}
