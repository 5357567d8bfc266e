use crate::domain::model::{Evaluation, HealthyTarget, OVERWEIGHT_BMI};
use crate::utils::error::Result;
use crate::utils::validation::validate_bounds;

/// BMI target used when the configuration does not override it.
pub fn default_bmi_target() -> HealthyTarget {
    HealthyTarget::new(None, Some(OVERWEIGHT_BMI))
}

pub fn validate_target(field_name: &str, target: &HealthyTarget) -> Result<()> {
    validate_bounds(field_name, target.lower_bound, target.upper_bound)
}

/// 沒有評估結果時不算超標
pub fn bmi_out_of_target(target: &HealthyTarget, evaluation: Option<&Evaluation>) -> bool {
    evaluation.is_some_and(|e| target.is_out_of_target(e.bmi.bmi))
}
