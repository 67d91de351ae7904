//! Per-month simulation output.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Paying users and revenue attributed to one plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanRevenue {
    pub plan: String,
    /// Fractional; rounding is left to the presentation layer.
    pub users: Decimal,
    pub revenue: Decimal,
}

/// Result of the monthly revenue calculation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub paid_users: Decimal,
    /// Exact sum of `per_plan` revenues.
    pub recurring_revenue: Decimal,
    pub annualized_revenue: Decimal,
    pub per_plan: Vec<PlanRevenue>,
}

/// Incremental revenue from one add-on feature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureRevenue {
    pub feature: String,
    pub adopters: Decimal,
    pub usage_revenue: Decimal,
    /// Full one-time upgrade revenue before amortization.
    pub upgrade_revenue: Decimal,
    /// Sum of usage revenue and the monthly share of upgrade revenue.
    pub revenue: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureBreakdown {
    pub features: Vec<FeatureRevenue>,
    pub total: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostComponent {
    pub name: String,
    pub amount: Decimal,
}

/// Monthly costs with every component individually addressable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub fixed: Decimal,
    pub variable: Vec<CostComponent>,
    pub percentage: Vec<CostComponent>,
    pub total: Decimal,
}

impl CostBreakdown {
    /// Amount of a named variable or percentage component.
    pub fn component(&self, name: &str) -> Option<Decimal> {
        self.variable
            .iter()
            .chain(self.percentage.iter())
            .find(|c| c.name == name)
            .map(|c| c.amount)
    }
}

/// Margins are percentages (e.g. 42.5 = 42.5%).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profitability {
    pub gross_profit: Decimal,
    pub gross_margin: Decimal,
    pub net_margin: Decimal,
    pub net_profit: Decimal,
}

/// One simulated month.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlySnapshot {
    /// 1-based month index.
    pub month: u32,
    /// Calendar label ("YYYY-MM") when a start month is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub users: u64,
    pub conversion_rate: Decimal,
    pub paid_users: Decimal,
    pub recurring_revenue: Decimal,
    pub annualized_revenue: Decimal,
    pub per_plan: Vec<PlanRevenue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureBreakdown>,
    /// Recurring revenue plus feature revenue.
    pub recognized_revenue: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs: Option<CostBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profitability: Option<Profitability>,
}

impl MonthlySnapshot {
    /// Snapshot carrying revenue only; features and costs are layered on later.
    pub fn from_revenue(
        month: u32,
        users: u64,
        conversion_rate: Decimal,
        revenue: MonthlyRevenue,
    ) -> Self {
        Self {
            month,
            label: None,
            users,
            conversion_rate,
            paid_users: revenue.paid_users,
            recurring_revenue: revenue.recurring_revenue,
            annualized_revenue: revenue.annualized_revenue,
            per_plan: revenue.per_plan,
            features: None,
            recognized_revenue: revenue.recurring_revenue,
            costs: None,
            profitability: None,
        }
    }

    pub fn feature_revenue(&self) -> Decimal {
        self.features.as_ref().map_or(Decimal::ZERO, |f| f.total)
    }

    pub fn total_cost(&self) -> Option<Decimal> {
        self.costs.as_ref().map(|c| c.total)
    }
}
