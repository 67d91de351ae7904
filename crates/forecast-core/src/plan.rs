//! Plan catalog and plan distribution.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{check_money, check_name, check_rate, check_unique, ValidationError};

/// A named pricing tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Plan identifier, e.g. "starter".
    pub name: String,
    /// Monthly price in USD (>= 0).
    pub monthly_price: Decimal,
    /// Expected retention in months, used as the CLV default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_retention_months: Option<u32>,
    /// Default monthly churn rate in [0,1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_churn_rate: Option<Decimal>,
}

impl Plan {
    pub fn new(name: impl Into<String>, monthly_price: Decimal) -> Self {
        Self {
            name: name.into(),
            monthly_price,
            default_retention_months: None,
            default_churn_rate: None,
        }
    }

    pub fn with_retention(mut self, months: u32) -> Self {
        self.default_retention_months = Some(months);
        self
    }

    pub fn with_churn(mut self, rate: Decimal) -> Self {
        self.default_churn_rate = Some(rate);
        self
    }
}

/// Ordered list of plans. Breakdowns follow this order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanCatalog {
    plans: Vec<Plan>,
}

impl PlanCatalog {
    pub fn new(plans: Vec<Plan>) -> Self {
        Self { plans }
    }

    /// Look up a plan by name.
    pub fn plan_for(&self, name: &str) -> Result<&Plan, ValidationError> {
        self.get(name)
            .ok_or_else(|| ValidationError::PlanNotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Plan> {
        self.plans.iter()
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

/// Share of paying users assigned to a plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanWeight {
    pub plan: String,
    pub weight: Decimal,
}

/// Ordered plan weights. Weights are used as given and never renormalized;
/// a total below 1 leaves part of the paying population unassigned.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanDistribution {
    weights: Vec<PlanWeight>,
}

impl PlanDistribution {
    pub fn new(weights: Vec<PlanWeight>) -> Self {
        Self { weights }
    }

    pub fn from_pairs(pairs: &[(&str, Decimal)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(plan, weight)| PlanWeight {
                    plan: (*plan).to_string(),
                    weight: *weight,
                })
                .collect(),
        )
    }

    pub fn weight(&self, plan: &str) -> Option<Decimal> {
        self.weights
            .iter()
            .find(|w| w.plan == plan)
            .map(|w| w.weight)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlanWeight> {
        self.weights.iter()
    }

    /// Sum of all weights.
    pub fn total(&self) -> Decimal {
        self.weights.iter().map(|w| w.weight).sum()
    }
}

/// Validate a single plan.
pub fn validate_plan(plan: &Plan) -> Result<(), ValidationError> {
    check_name(&plan.name)?;
    check_money(&plan.name, plan.monthly_price)?;
    if plan.default_retention_months == Some(0) {
        return Err(ValidationError::NonPositiveRetention(plan.name.clone()));
    }
    if let Some(churn) = plan.default_churn_rate {
        check_rate(&format!("{} churn rate", plan.name), churn)?;
    }
    Ok(())
}

/// Validate every plan and reject duplicate names.
pub fn validate_catalog(catalog: &PlanCatalog) -> Result<(), ValidationError> {
    for plan in catalog.iter() {
        validate_plan(plan)?;
    }
    check_unique(catalog.iter().map(|p| p.name.as_str()))
}

/// Validate distribution weights.
///
/// Weights referencing plans absent from the catalog are allowed here; the
/// revenue calculator skips them.
pub fn validate_distribution(distribution: &PlanDistribution) -> Result<(), ValidationError> {
    for w in distribution.iter() {
        check_rate(&format!("weight of {}", w.plan), w.weight)?;
    }
    check_unique(distribution.iter().map(|w| w.plan.as_str()))?;
    let total = distribution.total();
    if total != Decimal::ONE {
        warn!(%total, "plan distribution weights do not sum to 1");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PlanCatalog {
        PlanCatalog::new(vec![
            Plan::new("starter", Decimal::new(999, 2)).with_retention(12),
            Plan::new("pro", Decimal::new(2999, 2)).with_churn(Decimal::new(5, 2)),
        ])
    }

    #[test]
    fn plan_for_finds_and_reports_missing() {
        let c = catalog();
        assert_eq!(c.plan_for("pro").unwrap().monthly_price, Decimal::new(2999, 2));
        assert_eq!(
            c.plan_for("ultra"),
            Err(ValidationError::PlanNotFound("ultra".to_string()))
        );
    }

    #[test]
    fn catalog_rejects_negative_price_and_duplicates() {
        assert!(validate_catalog(&catalog()).is_ok());
        let neg = PlanCatalog::new(vec![Plan::new("x", Decimal::new(-1, 0))]);
        assert_eq!(
            validate_catalog(&neg),
            Err(ValidationError::NegativeMoney("x".to_string()))
        );
        let dup = PlanCatalog::new(vec![
            Plan::new("x", Decimal::ONE),
            Plan::new("x", Decimal::TWO),
        ]);
        assert_eq!(
            validate_catalog(&dup),
            Err(ValidationError::DuplicateName("x".to_string()))
        );
    }

    #[test]
    fn churn_above_one_is_rejected() {
        let p = Plan::new("x", Decimal::ONE).with_churn(Decimal::new(11, 1));
        assert!(matches!(
            validate_plan(&p),
            Err(ValidationError::RateOutOfRange { .. })
        ));
        let zero_retention = Plan::new("y", Decimal::ONE).with_retention(0);
        assert_eq!(
            validate_plan(&zero_retention),
            Err(ValidationError::NonPositiveRetention("y".to_string()))
        );
    }

    #[test]
    fn partial_distribution_is_tolerated_not_renormalized() {
        let d = PlanDistribution::from_pairs(&[
            ("starter", Decimal::new(5, 1)),
            ("pro", Decimal::new(3, 1)),
        ]);
        assert!(validate_distribution(&d).is_ok());
        assert_eq!(d.total(), Decimal::new(8, 1));
        assert_eq!(d.weight("starter"), Some(Decimal::new(5, 1)));
        assert_eq!(d.weight("enterprise"), None);
    }

    #[test]
    fn distribution_weight_out_of_range_fails() {
        let d = PlanDistribution::from_pairs(&[("starter", Decimal::new(12, 1))]);
        assert!(validate_distribution(&d).is_err());
    }

    #[test]
    fn serde_roundtrip_catalog_keeps_order() {
        let c = catalog();
        let s = serde_json::to_string(&c).unwrap();
        let back: PlanCatalog = serde_json::from_str(&s).unwrap();
        let names: Vec<_> = back.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["starter", "pro"]);
        assert_eq!(back.get("starter").unwrap().default_retention_months, Some(12));
    }
}
