//! Monthly cost model.

use forecast_core::{CostBreakdown, CostComponent, CostDriverSet, RevenueBase, UserBasis};
use rust_decimal::Decimal;

use crate::{add, mul, EconError};

/// Figures of one month that cost drivers scale with.
#[derive(Clone, Debug, PartialEq)]
pub struct CostInputs {
    pub month: u32,
    pub users: u64,
    pub paying_users: Decimal,
    pub recognized_revenue: Decimal,
    pub feature_revenue: Decimal,
}

/// Fixed, variable and percentage-of-revenue costs for one month.
///
/// Variable components are `max(floor, basis * per_user)`. Percentage
/// components apply to recognized revenue or, for add-on infrastructure, to
/// feature revenue alone.
pub fn compute_costs(
    drivers: &CostDriverSet,
    inputs: &CostInputs,
) -> Result<CostBreakdown, EconError> {
    let fixed = drivers.fixed.value_for_month(inputs.month)?;
    let mut total = fixed;

    let mut variable = Vec::with_capacity(drivers.variable.len());
    for v in &drivers.variable {
        let count = match v.basis {
            UserBasis::TotalUsers => Decimal::from(inputs.users),
            UserBasis::PayingUsers => inputs.paying_users,
        };
        let amount = mul(count, v.per_user, "variable cost")?.max(v.floor);
        total = add(total, amount, "total cost")?;
        variable.push(CostComponent {
            name: v.name.clone(),
            amount,
        });
    }

    let mut percentage = Vec::with_capacity(drivers.percentage.len());
    for p in &drivers.percentage {
        let base = match p.base {
            RevenueBase::RecognizedRevenue => inputs.recognized_revenue,
            RevenueBase::FeatureRevenue => inputs.feature_revenue,
        };
        let amount = mul(base, p.rate, "percentage cost")?;
        total = add(total, amount, "total cost")?;
        percentage.push(CostComponent {
            name: p.name.clone(),
            amount,
        });
    }

    Ok(CostBreakdown {
        fixed,
        variable,
        percentage,
        total,
    })
}
