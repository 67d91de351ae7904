//! Month-indexed step functions.
//!
//! The same shape drives the conversion-rate schedule and the fixed-cost
//! schedule: an ordered list of steps, each covering months up to and
//! including `through_month`. Months past the last bounded step fall through
//! to the final step's value.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{check_money, check_rate, ValidationError};

/// One tier of a step schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Last month (inclusive) covered by this step; `None` means open-ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub through_month: Option<u32>,
    pub value: Decimal,
}

impl Step {
    pub fn through(month: u32, value: Decimal) -> Self {
        Self {
            through_month: Some(month),
            value,
        }
    }

    pub fn open(value: Decimal) -> Self {
        Self {
            through_month: None,
            value,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepSchedule {
    steps: Vec<Step>,
}

impl StepSchedule {
    /// Build a schedule, checking its structure.
    pub fn new(steps: Vec<Step>) -> Result<Self, ValidationError> {
        let schedule = Self { steps };
        validate_schedule(&schedule)?;
        Ok(schedule)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Value of the first step whose threshold covers `month`.
    pub fn value_for_month(&self, month: u32) -> Result<Decimal, ValidationError> {
        if month == 0 {
            return Err(ValidationError::InvalidMonth(month));
        }
        let last = self.steps.last().ok_or(ValidationError::EmptySchedule)?;
        let step = self
            .steps
            .iter()
            .find(|s| s.through_month.map_or(true, |t| month <= t))
            .unwrap_or(last);
        Ok(step.value)
    }
}

/// Structural checks: non-empty, thresholds >= 1 and strictly increasing,
/// open-ended step only in last position.
pub fn validate_schedule(schedule: &StepSchedule) -> Result<(), ValidationError> {
    if schedule.steps.is_empty() {
        return Err(ValidationError::EmptySchedule);
    }
    let mut previous = 0u32;
    let n = schedule.steps.len();
    for (i, step) in schedule.steps.iter().enumerate() {
        match step.through_month {
            Some(t) if t <= previous => {
                return Err(ValidationError::NonMonotonicSchedule { previous, next: t });
            }
            Some(t) => previous = t,
            None if i + 1 != n => return Err(ValidationError::OpenStepNotLast),
            None => {}
        }
    }
    Ok(())
}

/// Structural checks plus every value being a rate in [0,1].
pub fn validate_conversion_schedule(schedule: &StepSchedule) -> Result<(), ValidationError> {
    validate_schedule(schedule)?;
    for step in schedule.steps() {
        check_rate("conversion rate", step.value)?;
    }
    Ok(())
}

pub(crate) fn validate_money_schedule(
    field: &str,
    schedule: &StepSchedule,
) -> Result<(), ValidationError> {
    validate_schedule(schedule)?;
    for step in schedule.steps() {
        check_money(field, step.value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tiers() -> StepSchedule {
        StepSchedule::new(vec![
            Step::through(3, Decimal::new(2, 2)),
            Step::through(6, Decimal::new(3, 2)),
            Step::through(12, Decimal::new(5, 2)),
            Step::open(Decimal::new(7, 2)),
        ])
        .unwrap()
    }

    #[test]
    fn tier_boundaries_are_inclusive() {
        let s = tiers();
        assert_eq!(s.value_for_month(1).unwrap(), Decimal::new(2, 2));
        assert_eq!(s.value_for_month(3).unwrap(), Decimal::new(2, 2));
        assert_eq!(s.value_for_month(4).unwrap(), Decimal::new(3, 2));
        assert_eq!(s.value_for_month(12).unwrap(), Decimal::new(5, 2));
        assert_eq!(s.value_for_month(13).unwrap(), Decimal::new(7, 2));
        assert_eq!(s.value_for_month(480).unwrap(), Decimal::new(7, 2));
    }

    #[test]
    fn month_zero_is_invalid() {
        assert_eq!(tiers().value_for_month(0), Err(ValidationError::InvalidMonth(0)));
    }

    #[test]
    fn bounded_schedule_falls_through_to_last_step() {
        let s = StepSchedule::new(vec![
            Step::through(6, Decimal::new(5000, 0)),
            Step::through(12, Decimal::new(8000, 0)),
        ])
        .unwrap();
        assert_eq!(s.value_for_month(40).unwrap(), Decimal::new(8000, 0));
    }

    #[test]
    fn structure_is_checked() {
        assert_eq!(
            StepSchedule::new(vec![]),
            Err(ValidationError::EmptySchedule)
        );
        assert_eq!(
            StepSchedule::new(vec![
                Step::through(6, Decimal::ONE),
                Step::through(6, Decimal::ONE)
            ]),
            Err(ValidationError::NonMonotonicSchedule { previous: 6, next: 6 })
        );
        assert_eq!(
            StepSchedule::new(vec![Step::open(Decimal::ONE), Step::through(6, Decimal::ONE)]),
            Err(ValidationError::OpenStepNotLast)
        );
        assert_eq!(
            StepSchedule::new(vec![Step::through(0, Decimal::ONE)]),
            Err(ValidationError::NonMonotonicSchedule { previous: 0, next: 0 })
        );
    }

    #[test]
    fn conversion_values_must_be_rates() {
        let s = StepSchedule::new(vec![Step::open(Decimal::new(15, 1))]).unwrap();
        assert!(validate_conversion_schedule(&s).is_err());
        assert!(validate_conversion_schedule(&tiers()).is_ok());
    }

    #[test]
    fn deserializes_from_yaml() {
        let yaml = "- through_month: 3\n  value: 0.02\n- value: 0.07\n";
        let s: StepSchedule = serde_yaml::from_str(yaml).unwrap();
        assert!(validate_schedule(&s).is_ok());
        assert_eq!(s.value_for_month(2).unwrap(), Decimal::new(2, 2));
        assert_eq!(s.value_for_month(9).unwrap(), Decimal::new(7, 2));
    }

    proptest! {
        #[test]
        fn every_positive_month_has_a_value(month in 1u32..10_000) {
            let s = tiers();
            let v = s.value_for_month(month).unwrap();
            prop_assert!(s.steps().iter().any(|step| step.value == v));
        }
    }
}
