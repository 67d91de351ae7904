//! Forecast configuration: loading, validation and the reference assumptions.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::drivers::{
    validate_cost_drivers, validate_feature, CostDriverSet, FeatureAdoptionConfig, PercentageCost,
    RevenueBase, UserBasis, VariableCost,
};
use crate::plan::{validate_catalog, validate_distribution, Plan, PlanCatalog, PlanDistribution};
use crate::scenario::{validate_scenario, Scenario};
use crate::schedule::{validate_conversion_schedule, Step, StepSchedule};
use crate::{check_money, check_name, check_unique, ValidationError};

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

fn default_operating_expense_ratio() -> Decimal {
    Decimal::new(15, 0)
}

/// Everything a forecast run reads. Never mutated by the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub plans: PlanCatalog,
    pub distribution: PlanDistribution,
    pub conversion: StepSchedule,
    #[serde(default)]
    pub features: Vec<FeatureAdoptionConfig>,
    /// Plans whose paying users are eligible for add-on features.
    #[serde(default)]
    pub eligible_plans: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs: Option<CostDriverSet>,
    /// Customer acquisition cost used for CLV/CAC metrics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquisition_cost: Option<Decimal>,
    /// Percentage of revenue subtracted from gross margin to get net margin.
    #[serde(default = "default_operating_expense_ratio")]
    pub operating_expense_ratio: Decimal,
    /// Calendar month of month 1, used for chart labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_month: Option<NaiveDate>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

impl ForecastConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.yaml`/`.yml` file, or JSON for any other extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }

    pub fn scenario(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    /// Check every invariant before a run starts.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_catalog(&self.plans)?;
        validate_distribution(&self.distribution)?;
        validate_conversion_schedule(&self.conversion)?;
        for f in &self.features {
            validate_feature(f)?;
        }
        check_unique(self.features.iter().map(|f| f.name.as_str()))?;
        for p in &self.eligible_plans {
            check_name(p)?;
        }
        if let Some(costs) = &self.costs {
            validate_cost_drivers(costs)?;
        }
        if let Some(cac) = self.acquisition_cost {
            check_money("acquisition_cost", cac)?;
        }
        if self.operating_expense_ratio < Decimal::ZERO
            || self.operating_expense_ratio > Decimal::ONE_HUNDRED
        {
            return Err(ValidationError::PercentOutOfRange {
                field: "operating_expense_ratio".to_string(),
                value: self.operating_expense_ratio,
            });
        }
        for s in &self.scenarios {
            validate_scenario(s)?;
        }
        check_unique(self.scenarios.iter().map(|s| s.name.as_str()))
    }

    /// Built-in reference assumptions: three plans, tiered conversion,
    /// three add-ons for pro and enterprise, stepped fixed costs and three
    /// growth scenarios.
    pub fn reference() -> Self {
        let plans = PlanCatalog::new(vec![
            Plan::new("starter", Decimal::new(999, 2))
                .with_retention(12)
                .with_churn(Decimal::new(8, 2)),
            Plan::new("pro", Decimal::new(2999, 2))
                .with_retention(24)
                .with_churn(Decimal::new(5, 2)),
            Plan::new("enterprise", Decimal::new(9999, 2))
                .with_retention(36)
                .with_churn(Decimal::new(3, 2)),
        ]);
        let distribution = PlanDistribution::from_pairs(&[
            ("starter", Decimal::new(6, 1)),
            ("pro", Decimal::new(3, 1)),
            ("enterprise", Decimal::new(1, 1)),
        ]);
        let conversion = StepSchedule::new(vec![
            Step::through(3, Decimal::new(2, 2)),
            Step::through(6, Decimal::new(3, 2)),
            Step::through(12, Decimal::new(5, 2)),
            Step::open(Decimal::new(7, 2)),
        ])
        .unwrap_or_default();
        let features = vec![
            FeatureAdoptionConfig {
                name: "ai_insights".to_string(),
                price: Decimal::new(1999, 2),
                adoption_rate: Decimal::new(25, 2),
                monthly_usage_rate: Decimal::new(8, 1),
                upgrade_rate: Decimal::new(1, 2),
            },
            FeatureAdoptionConfig {
                name: "priority_support".to_string(),
                price: Decimal::new(4999, 2),
                adoption_rate: Decimal::new(15, 2),
                monthly_usage_rate: Decimal::ONE,
                upgrade_rate: Decimal::new(5, 3),
            },
            FeatureAdoptionConfig {
                name: "advanced_analytics".to_string(),
                price: Decimal::new(1499, 2),
                adoption_rate: Decimal::new(3, 1),
                monthly_usage_rate: Decimal::new(7, 1),
                upgrade_rate: Decimal::ZERO,
            },
        ];
        let costs = CostDriverSet {
            fixed: StepSchedule::new(vec![
                Step::through(6, Decimal::new(5000, 0)),
                Step::through(12, Decimal::new(8000, 0)),
                Step::open(Decimal::new(12000, 0)),
            ])
            .unwrap_or_default(),
            variable: vec![
                VariableCost {
                    name: "infrastructure".to_string(),
                    basis: UserBasis::TotalUsers,
                    per_user: Decimal::new(5, 2),
                    floor: Decimal::new(500, 0),
                },
                VariableCost {
                    name: "support".to_string(),
                    basis: UserBasis::PayingUsers,
                    per_user: Decimal::new(150, 2),
                    floor: Decimal::ZERO,
                },
            ],
            percentage: vec![
                PercentageCost {
                    name: "marketing".to_string(),
                    rate: Decimal::new(2, 1),
                    base: RevenueBase::RecognizedRevenue,
                },
                PercentageCost {
                    name: "platform_fees".to_string(),
                    rate: Decimal::new(3, 2),
                    base: RevenueBase::RecognizedRevenue,
                },
                PercentageCost {
                    name: "addon_infrastructure".to_string(),
                    rate: Decimal::new(1, 1),
                    base: RevenueBase::FeatureRevenue,
                },
            ],
        };
        let scenarios = vec![
            Scenario::new("conservative", 1000, 24, Decimal::new(5, 2)),
            Scenario::new("base", 1000, 24, Decimal::new(10, 2)),
            Scenario::new("optimistic", 1000, 24, Decimal::new(15, 2))
                .with_conversion_growth(Decimal::new(1, 2)),
        ];
        Self {
            plans,
            distribution,
            conversion,
            features,
            eligible_plans: vec!["pro".to_string(), "enterprise".to_string()],
            costs: Some(costs),
            acquisition_cost: Some(Decimal::new(30, 0)),
            operating_expense_ratio: default_operating_expense_ratio(),
            start_month: None,
            scenarios,
        }
    }
}

/// "YYYY-MM" label for 1-based `month` counted from `start`.
pub fn period_label(start: NaiveDate, month: u32) -> String {
    let offset = month.saturating_sub(1) as i64;
    let total = start.year() as i64 * 12 + start.month0() as i64 + offset;
    let y = total.div_euclid(12);
    let m = total.rem_euclid(12) + 1;
    format!("{:04}-{:02}", y, m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_config_is_valid() {
        let c = ForecastConfig::reference();
        c.validate().unwrap();
        assert_eq!(c.plans.len(), 3);
        assert_eq!(c.distribution.total(), Decimal::ONE);
        assert!(c.scenario("base").is_some());
    }

    #[test]
    fn yaml_roundtrip_of_reference() {
        let c = ForecastConfig::reference();
        let s = serde_yaml::to_string(&c).unwrap();
        let back = ForecastConfig::from_yaml_str(&s).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn loading_rejects_invalid_values_eagerly() {
        let mut c = ForecastConfig::reference();
        c.scenarios[0].months = 0;
        let json = serde_json::to_string(&c).unwrap();
        let err = ForecastConfig::from_json_str(&json).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(ValidationError::ZeroHorizon(_))
        ));
    }

    #[test]
    fn duplicate_scenarios_rejected() {
        let mut c = ForecastConfig::reference();
        c.scenarios.push(c.scenarios[0].clone());
        assert_eq!(
            c.validate(),
            Err(ValidationError::DuplicateName("conservative".to_string()))
        );
    }

    #[test]
    fn operating_expense_ratio_is_a_percentage() {
        let mut c = ForecastConfig::reference();
        c.operating_expense_ratio = Decimal::new(101, 0);
        assert!(matches!(
            c.validate(),
            Err(ValidationError::PercentOutOfRange { .. })
        ));
    }

    #[test]
    fn minimal_yaml_uses_defaults() {
        let yaml = r#"
plans:
  - name: starter
    monthly_price: 9.99
distribution:
  - plan: starter
    weight: 1
conversion:
  - value: 0.05
"#;
        let c = ForecastConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(c.operating_expense_ratio, Decimal::new(15, 0));
        assert!(c.costs.is_none());
        assert!(c.features.is_empty());
        assert!(c.scenarios.is_empty());
    }

    #[test]
    fn labels_cross_year_boundaries() {
        let start = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
        assert_eq!(period_label(start, 1), "2025-11");
        assert_eq!(period_label(start, 2), "2025-12");
        assert_eq!(period_label(start, 3), "2026-01");
        assert_eq!(period_label(start, 27), "2028-01");
    }
}
