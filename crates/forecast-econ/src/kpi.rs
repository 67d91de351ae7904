//! Profitability and unit-economics KPIs.

use forecast_core::{Plan, Profitability};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{div, mul, sub, EconError};

/// Gross and net profitability of one period.
///
/// `net_margin = gross_margin - operating_expense_ratio`, all in percent.
/// Zero revenue is a [`EconError::DivisionByZero`], never an infinite margin.
pub fn profitability(
    revenue: Decimal,
    cost: Decimal,
    operating_expense_ratio: Decimal,
) -> Result<Profitability, EconError> {
    let gross_profit = sub(revenue, cost, "gross profit")?;
    let gross_margin = mul(
        div(gross_profit, revenue, "gross margin")?,
        Decimal::ONE_HUNDRED,
        "gross margin",
    )?;
    let net_margin = sub(gross_margin, operating_expense_ratio, "net margin")?;
    let net_profit = div(
        mul(revenue, net_margin, "net profit")?,
        Decimal::ONE_HUNDRED,
        "net profit",
    )?;
    Ok(Profitability {
        gross_profit,
        gross_margin,
        net_margin,
        net_profit,
    })
}

/// Customer lifetime value: price times retention months.
///
/// Falls back to the plan's default retention when none is given.
pub fn clv(plan: &Plan, retention_months: Option<u32>) -> Result<Decimal, EconError> {
    let months = retention_months
        .or(plan.default_retention_months)
        .ok_or_else(|| EconError::MissingRetention(plan.name.clone()))?;
    mul(plan.monthly_price, Decimal::from(months), "clv")
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacPayback {
    pub clv: Decimal,
    /// Months of subscription needed to recover the acquisition cost.
    pub payback_months: Decimal,
    pub clv_cac_ratio: Decimal,
}

pub fn cac_payback(
    cac: Decimal,
    plan: &Plan,
    retention_months: Option<u32>,
) -> Result<CacPayback, EconError> {
    let clv = clv(plan, retention_months)?;
    Ok(CacPayback {
        clv,
        payback_months: div(cac, plan.monthly_price, "payback months")?,
        clv_cac_ratio: div(clv, cac, "clv/cac ratio")?,
    })
}

/// Percentage change from `first` to `last`.
pub fn growth_rate(
    first: Decimal,
    last: Decimal,
    metric: &'static str,
) -> Result<Decimal, EconError> {
    mul(div(sub(last, first, metric)?, first, metric)?, Decimal::ONE_HUNDRED, metric)
}

/// Per-unit ratio such as revenue per user.
pub fn per_unit(
    total: Decimal,
    units: Decimal,
    metric: &'static str,
) -> Result<Decimal, EconError> {
    div(total, units, metric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pro() -> Plan {
        Plan::new("pro", Decimal::new(2999, 2)).with_retention(24)
    }

    #[test]
    fn clv_of_pro_over_two_years() {
        assert_eq!(clv(&pro(), Some(24)).unwrap(), Decimal::new(71976, 2));
        assert_eq!(clv(&pro(), None).unwrap(), Decimal::new(71976, 2));
        assert_eq!(clv(&pro(), Some(12)).unwrap(), Decimal::new(35988, 2));
    }

    #[test]
    fn clv_without_any_retention_fails() {
        let p = Plan::new("x", Decimal::TEN);
        assert_eq!(clv(&p, None), Err(EconError::MissingRetention("x".into())));
    }

    #[test]
    fn cac_payback_for_pro() {
        let r = cac_payback(Decimal::new(30, 0), &pro(), None).unwrap();
        assert_eq!(r.clv_cac_ratio, Decimal::new(23992, 3));
        assert!(r.payback_months > Decimal::new(10003, 4));
        assert!(r.payback_months < Decimal::new(10004, 4));
    }

    #[test]
    fn cac_payback_guards_zero_price_and_zero_cac() {
        let free = Plan::new("free", Decimal::ZERO).with_retention(12);
        assert_eq!(
            cac_payback(Decimal::new(30, 0), &free, None),
            Err(EconError::DivisionByZero("payback months"))
        );
        assert_eq!(
            cac_payback(Decimal::ZERO, &pro(), None),
            Err(EconError::DivisionByZero("clv/cac ratio"))
        );
    }

    #[test]
    fn profitability_of_zero_revenue_is_an_error() {
        assert_eq!(
            profitability(Decimal::ZERO, Decimal::new(100, 0), Decimal::new(15, 0)),
            Err(EconError::DivisionByZero("gross margin"))
        );
    }

    #[test]
    fn profitability_reports_overflow() {
        assert_eq!(
            profitability(Decimal::MAX, Decimal::MIN, Decimal::new(15, 0)),
            Err(EconError::Overflow("gross profit"))
        );
        assert_eq!(
            growth_rate(Decimal::MIN, Decimal::MAX, "mrr"),
            Err(EconError::Overflow("mrr"))
        );
    }

    #[test]
    fn profitability_margins() {
        let p = profitability(Decimal::new(1000, 0), Decimal::new(600, 0), Decimal::new(15, 0))
            .unwrap();
        assert_eq!(p.gross_profit, Decimal::new(400, 0));
        assert_eq!(p.gross_margin, Decimal::new(40, 0));
        assert_eq!(p.net_margin, Decimal::new(25, 0));
        assert_eq!(p.net_profit, Decimal::new(250, 0));
    }

    #[test]
    fn growth_rate_guards_zero_start() {
        assert_eq!(
            growth_rate(Decimal::new(100, 0), Decimal::new(150, 0), "users").unwrap(),
            Decimal::new(50, 0)
        );
        assert_eq!(
            growth_rate(Decimal::ZERO, Decimal::TEN, "users"),
            Err(EconError::DivisionByZero("users"))
        );
        assert_eq!(
            per_unit(Decimal::TEN, Decimal::ZERO, "arpu"),
            Err(EconError::DivisionByZero("arpu"))
        );
    }

    proptest! {
        #[test]
        fn clv_is_price_times_months(cents in 0i64..1_000_000, months in 1u32..240) {
            let p = Plan::new("p", Decimal::new(cents, 2));
            prop_assert_eq!(
                clv(&p, Some(months)).unwrap(),
                Decimal::new(cents, 2) * Decimal::from(months)
            );
        }
    }
}
