//! Reduction of a month sequence into summary KPIs.

use forecast_core::{ForecastConfig, MonthlySnapshot, Profitability};
use forecast_econ::{cac_payback, clv, growth_rate, per_unit, profitability, EconError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ForecastError;

/// A KPI that could not be computed, with the reason.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UndefinedMetric {
    pub metric: String,
    pub reason: String,
}

/// CLV and acquisition economics of one plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanEconomics {
    pub plan: String,
    pub clv: Decimal,
    pub payback_months: Option<Decimal>,
    pub clv_cac_ratio: Option<Decimal>,
}

/// Summary statistics of one forecast. Ratios that would divide by zero are
/// `None` and listed in `undefined`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub months: u32,
    pub total_recurring_revenue: Decimal,
    pub total_feature_revenue: Decimal,
    /// Recurring plus feature revenue over the horizon.
    pub total_revenue: Decimal,
    pub total_cost: Option<Decimal>,
    pub profitability: Option<Profitability>,
    pub final_users: u64,
    pub final_paid_users: Decimal,
    pub final_mrr: Decimal,
    pub final_arr: Decimal,
    pub user_growth_pct: Option<Decimal>,
    pub mrr_growth_pct: Option<Decimal>,
    /// Final month's recognized revenue per user.
    pub revenue_per_user: Option<Decimal>,
    pub revenue_per_paying_user: Option<Decimal>,
    pub unit_economics: Vec<PlanEconomics>,
    pub undefined: Vec<UndefinedMetric>,
}

struct Flags(Vec<UndefinedMetric>);

impl Flags {
    fn keep<T>(&mut self, metric: &str, result: Result<T, EconError>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.0.push(UndefinedMetric {
                    metric: metric.to_string(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }
}

fn checked_sum<I>(values: I, metric: &'static str) -> Result<Decimal, ForecastError>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(v).ok_or(ForecastError::Overflow(metric))
    })
}

/// Reduce snapshots to totals, growth rates, margins and unit economics.
///
/// Only overflow aborts; ratio failures are recorded per metric.
pub fn summarize(
    snapshots: &[MonthlySnapshot],
    config: &ForecastConfig,
) -> Result<KpiSummary, ForecastError> {
    let mut flags = Flags(Vec::new());

    let total_recurring_revenue =
        checked_sum(snapshots.iter().map(|s| s.recurring_revenue), "total recurring revenue")?;
    let total_feature_revenue =
        checked_sum(snapshots.iter().map(|s| s.feature_revenue()), "total feature revenue")?;
    let total_revenue =
        checked_sum(snapshots.iter().map(|s| s.recognized_revenue), "total revenue")?;
    let total_cost = if config.costs.is_some() {
        Some(checked_sum(
            snapshots.iter().filter_map(|s| s.total_cost()),
            "total cost",
        )?)
    } else {
        None
    };
    let horizon_profitability = total_cost.and_then(|cost| {
        flags.keep(
            "profitability",
            profitability(total_revenue, cost, config.operating_expense_ratio),
        )
    });
    for s in snapshots
        .iter()
        .filter(|s| s.costs.is_some() && s.profitability.is_none())
    {
        flags.0.push(UndefinedMetric {
            metric: format!("month {} profitability", s.month),
            reason: EconError::DivisionByZero("gross margin").to_string(),
        });
    }

    let (first, last) = (snapshots.first(), snapshots.last());
    let (user_growth_pct, mrr_growth_pct) = match (first, last) {
        (Some(first), Some(last)) => (
            flags.keep(
                "user growth",
                growth_rate(
                    Decimal::from(first.users),
                    Decimal::from(last.users),
                    "user growth",
                ),
            ),
            flags.keep(
                "mrr growth",
                growth_rate(first.recurring_revenue, last.recurring_revenue, "mrr growth"),
            ),
        ),
        _ => (None, None),
    };
    let revenue_per_user = last.and_then(|l| {
        flags.keep(
            "revenue per user",
            per_unit(l.recognized_revenue, Decimal::from(l.users), "revenue per user"),
        )
    });
    let revenue_per_paying_user = last.and_then(|l| {
        flags.keep(
            "revenue per paying user",
            per_unit(l.recognized_revenue, l.paid_users, "revenue per paying user"),
        )
    });

    let mut unit_economics = Vec::new();
    if let Some(cac) = config.acquisition_cost {
        for plan in config
            .plans
            .iter()
            .filter(|p| p.default_retention_months.is_some())
        {
            let Some(value) = flags.keep(&format!("{} clv", plan.name), clv(plan, None)) else {
                continue;
            };
            let payback = flags.keep(
                &format!("{} cac payback", plan.name),
                cac_payback(cac, plan, None),
            );
            unit_economics.push(PlanEconomics {
                plan: plan.name.clone(),
                clv: value,
                payback_months: payback.as_ref().map(|p| p.payback_months),
                clv_cac_ratio: payback.map(|p| p.clv_cac_ratio),
            });
        }
    }

    Ok(KpiSummary {
        months: snapshots.len() as u32,
        total_recurring_revenue,
        total_feature_revenue,
        total_revenue,
        total_cost,
        profitability: horizon_profitability,
        final_users: last.map_or(0, |l| l.users),
        final_paid_users: last.map_or(Decimal::ZERO, |l| l.paid_users),
        final_mrr: last.map_or(Decimal::ZERO, |l| l.recurring_revenue),
        final_arr: last.map_or(Decimal::ZERO, |l| l.annualized_revenue),
        user_growth_pct,
        mrr_growth_pct,
        revenue_per_user,
        revenue_per_paying_user,
        unit_economics,
        undefined: flags.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::project_growth;
    use forecast_core::{MonthlyRevenue, Plan, PlanCatalog, Scenario};

    fn snapshot(month: u32, users: u64, mrr: i64) -> MonthlySnapshot {
        MonthlySnapshot::from_revenue(
            month,
            users,
            Decimal::new(5, 2),
            MonthlyRevenue {
                paid_users: Decimal::from(users) * Decimal::new(5, 2),
                recurring_revenue: Decimal::from(mrr),
                annualized_revenue: Decimal::from(mrr * 12),
                per_plan: vec![],
            },
        )
    }

    fn bare_config() -> ForecastConfig {
        let mut c = ForecastConfig::reference();
        c.costs = None;
        c.acquisition_cost = None;
        c
    }

    #[test]
    fn totals_and_growth_over_horizon() {
        let snaps = [snapshot(1, 100, 50), snapshot(2, 150, 100)];
        let k = summarize(&snaps, &bare_config()).unwrap();
        assert_eq!(k.months, 2);
        assert_eq!(k.total_recurring_revenue, Decimal::new(150, 0));
        assert_eq!(k.total_revenue, Decimal::new(150, 0));
        assert_eq!(k.final_mrr, Decimal::new(100, 0));
        assert_eq!(k.final_arr, Decimal::new(1200, 0));
        assert_eq!(k.user_growth_pct, Some(Decimal::new(50, 0)));
        assert_eq!(k.mrr_growth_pct, Some(Decimal::new(100, 0)));
        assert_eq!(k.revenue_per_user, Some(Decimal::new(100, 0) / Decimal::new(150, 0)));
        assert!(k.total_cost.is_none());
        assert!(k.undefined.is_empty());
    }

    #[test]
    fn zero_start_is_flagged_not_infinite() {
        let snaps = [snapshot(1, 0, 0), snapshot(2, 10, 20)];
        let k = summarize(&snaps, &bare_config()).unwrap();
        assert_eq!(k.user_growth_pct, None);
        assert_eq!(k.mrr_growth_pct, None);
        let names: Vec<_> = k.undefined.iter().map(|u| u.metric.as_str()).collect();
        assert_eq!(names, ["user growth", "mrr growth"]);
        // the remaining KPIs are still computed
        assert_eq!(k.revenue_per_user, Some(Decimal::TWO));
    }

    #[test]
    fn empty_sequence_yields_zeros() {
        let k = summarize(&[], &bare_config()).unwrap();
        assert_eq!(k.months, 0);
        assert_eq!(k.final_users, 0);
        assert_eq!(k.user_growth_pct, None);
        assert!(k.undefined.is_empty());
    }

    #[test]
    fn unit_economics_per_plan() {
        let mut c = bare_config();
        c.acquisition_cost = Some(Decimal::new(30, 0));
        c.plans = PlanCatalog::new(vec![
            Plan::new("pro", Decimal::new(2999, 2)).with_retention(24),
            Plan::new("free", Decimal::ZERO).with_retention(6),
            Plan::new("trial", Decimal::ONE),
        ]);
        let k = summarize(&[snapshot(1, 10, 10)], &c).unwrap();
        assert_eq!(k.unit_economics.len(), 2);
        let pro = &k.unit_economics[0];
        assert_eq!(pro.clv, Decimal::new(71976, 2));
        assert_eq!(pro.clv_cac_ratio, Some(Decimal::new(23992, 3)));
        let free = &k.unit_economics[1];
        assert_eq!(free.clv, Decimal::ZERO);
        assert_eq!(free.payback_months, None);
        assert_eq!(k.undefined[0].metric, "free cac payback");
    }

    #[test]
    fn summary_of_projection_matches_last_snapshot() {
        let c = bare_config();
        let snaps = project_growth(&c, &Scenario::new("s", 100, 3, Decimal::new(15, 2))).unwrap();
        let k = summarize(&snaps, &c).unwrap();
        assert_eq!(k.final_users, 132);
        assert_eq!(k.user_growth_pct, Some(Decimal::new(32, 0)));
        assert_eq!(k.final_mrr, snaps[2].recurring_revenue);
    }
}
