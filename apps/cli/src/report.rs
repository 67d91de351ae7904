//! Text rendering of forecast results.

use forecast_runtime::{ChurnReport, ScenarioSummary};
use rust_decimal::Decimal;

fn money(d: Decimal) -> Decimal {
    d.round_dp(2)
}

fn pct(d: Option<Decimal>) -> String {
    d.map_or_else(|| "n/a".to_string(), |v| format!("{}%", v.round_dp(1)))
}

pub fn scenario_line(name: &str, s: &ScenarioSummary) -> String {
    let k = &s.forecast.kpis;
    format!(
        "Scenario {} | months: {} | users: {} | paid: {} | MRR: ${} | ARR: ${} | revenue: ${} | growth: {} | net margin: {} | undefined: {}",
        name,
        k.months,
        s.final_users,
        s.final_paid_users.round(),
        money(s.final_mrr),
        money(s.final_arr),
        money(s.total_revenue),
        pct(k.user_growth_pct),
        pct(k.profitability.as_ref().map(|p| p.net_margin)),
        k.undefined.len()
    )
}

pub fn churn_line(r: &ChurnReport) -> String {
    format!(
        "Cohort {} | churn: {}% | months: {} | start: {} | end: {} | churned: {} | revenue: ${}",
        r.plan,
        (r.churn_rate * Decimal::ONE_HUNDRED).round_dp(1),
        r.months.len(),
        r.initial_users,
        r.final_users,
        r.total_churned,
        money(r.total_revenue)
    )
}
