use crate::core::evaluator::{evaluate, round2};
use crate::core::form::{
    BMI_FIELD, HEIGHT_FEET_FIELD, HEIGHT_INCHES_FIELD, LEGACY_REDUCTION_FIELD, REDUCTION_FIELD,
    WEIGHT_FIELD,
};
use crate::domain::model::{FormFields, MeasurementInput};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 進度紀錄上小數欄位的上限
pub const MAX_DECIMAL: f64 = 99_999.99;

/// Name of the goal field on a progress-note submission.
pub const SUBMITTED_REDUCTION_FIELD: &str = "weightReduction";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VitalsError {
    #[error("{label} value must be a number.")]
    NotANumber { label: &'static str },

    #[error("{label} value is too large.")]
    TooLarge { label: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} vitals field(s) rejected: {}", .0.len(), messages(.0))]
pub struct VitalsErrors(pub Vec<VitalsError>);

fn messages(errors: &[VitalsError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Vitals of one progress note after validation. Every field is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalsEntry {
    pub weight: Option<f64>,
    pub height_feet: Option<i32>,
    pub height_inches: Option<i32>,
    pub weight_reduction_goal: Option<f64>,
    pub bmi: Option<f64>,
}

fn blank(raw: Option<&String>) -> Option<&str> {
    raw.map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn decimal(
    raw: Option<&String>,
    label: &'static str,
    errors: &mut Vec<VitalsError>,
) -> Option<f64> {
    let raw = blank(raw)?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => {
            let value = round2(value);
            if value > MAX_DECIMAL {
                errors.push(VitalsError::TooLarge { label });
                None
            } else {
                Some(value)
            }
        }
        _ => {
            errors.push(VitalsError::NotANumber { label });
            None
        }
    }
}

fn integer(raw: Option<&String>, label: &'static str, errors: &mut Vec<VitalsError>) -> Option<i32> {
    let raw = blank(raw)?;
    match raw.parse::<i32>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(VitalsError::NotANumber { label });
            None
        }
    }
}

impl VitalsEntry {
    /// Validates the vitals part of a progress-note submission. Blank fields
    /// become `None`; every rejected field is reported, not just the first.
    pub fn from_fields(fields: &FormFields) -> Result<Self, VitalsErrors> {
        let mut errors = Vec::new();

        let reduction = fields
            .get(SUBMITTED_REDUCTION_FIELD)
            .or_else(|| fields.get(REDUCTION_FIELD))
            .or_else(|| fields.get(LEGACY_REDUCTION_FIELD));

        let entry = VitalsEntry {
            weight: decimal(fields.get(WEIGHT_FIELD), "Weight", &mut errors),
            height_feet: integer(fields.get(HEIGHT_FEET_FIELD), "Height feet", &mut errors),
            height_inches: integer(fields.get(HEIGHT_INCHES_FIELD), "Height inches", &mut errors),
            weight_reduction_goal: decimal(reduction, "Weight reduction", &mut errors),
            bmi: decimal(fields.get(BMI_FIELD), "BMI", &mut errors),
        };

        if errors.is_empty() {
            Ok(entry)
        } else {
            tracing::debug!(count = errors.len(), "vitals submission rejected");
            Err(VitalsErrors(errors))
        }
    }

    pub fn measurement(&self) -> MeasurementInput {
        MeasurementInput {
            weight_pounds: self.weight,
            height_feet: self.height_feet.map(f64::from),
            height_inches: self.height_inches.map(f64::from),
        }
    }

    /// Fills a missing BMI or goal from weight and height. Values the user
    /// typed in are kept.
    pub fn with_computed_bmi(self) -> Self {
        if self.bmi.is_some() && self.weight_reduction_goal.is_some() {
            return self;
        }
        match evaluate(&self.measurement()) {
            Some(evaluation) => VitalsEntry {
                bmi: self.bmi.or(Some(evaluation.bmi.bmi)),
                weight_reduction_goal: self
                    .weight_reduction_goal
                    .or(Some(evaluation.reduction_goal.target_pounds)),
                ..self
            },
            None => self,
        }
    }
}
