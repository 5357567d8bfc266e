//! Binds the evaluator to identifier-keyed form fields.
//!
//! Inputs are read from `weight`, `heightFeet` and `heightInches`; results are
//! written to `bmi` and `weightreduction`. When the evaluator declines to run,
//! nothing is written.

use crate::core::evaluator::evaluate;
use crate::domain::model::{Evaluation, FormFields, MeasurementInput};
use regex::Regex;
use std::sync::OnceLock;

pub const WEIGHT_FIELD: &str = "weight";
pub const HEIGHT_FEET_FIELD: &str = "heightFeet";
pub const HEIGHT_INCHES_FIELD: &str = "heightInches";
pub const BMI_FIELD: &str = "bmi";
pub const REDUCTION_FIELD: &str = "weightreduction";
/// Older pages named the goal field this way; it is read but never written.
pub const LEGACY_REDUCTION_FIELD: &str = "weightreductioninput";

fn float_prefix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?")
            .expect("float prefix pattern is valid")
    })
}

/// Lenient float parsing: skips leading whitespace and reads the longest
/// numeric prefix, so `"150 lbs"` is 150. Returns `None` when there is no
/// numeric prefix at all.
///
/// Only finite values are accepted. `"Infinity"` has no digit prefix and an
/// exponent that overflows (`"1e999"`) is dropped, so neither can reach the
/// evaluator as a measurement.
pub fn parse_lenient(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    float_prefix()
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// 由原始字串組出量測值，不合法的欄位視為缺值
pub fn measurement_from_raw(weight: &str, feet: &str, inches: &str) -> MeasurementInput {
    MeasurementInput {
        weight_pounds: parse_lenient(weight),
        height_feet: parse_lenient(feet),
        height_inches: parse_lenient(inches),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BmiForm {
    fields: FormFields,
}

impl BmiForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(mut fields: FormFields) -> Self {
        if let Some(legacy) = fields.remove(LEGACY_REDUCTION_FIELD) {
            fields.entry(REDUCTION_FIELD.to_string()).or_insert(legacy);
        }
        Self { fields }
    }

    pub fn set(&mut self, id: &str, value: impl Into<String>) {
        let id = if id == LEGACY_REDUCTION_FIELD {
            REDUCTION_FIELD
        } else {
            id
        };
        self.fields.insert(id.to_string(), value.into());
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.fields.get(id).map(String::as_str)
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn measurement(&self) -> MeasurementInput {
        measurement_from_raw(
            self.get(WEIGHT_FIELD).unwrap_or_default(),
            self.get(HEIGHT_FEET_FIELD).unwrap_or_default(),
            self.get(HEIGHT_INCHES_FIELD).unwrap_or_default(),
        )
    }

    /// Re-runs the evaluator against the current inputs and writes both
    /// output fields. Returns `None`, leaving every field as it was, when the
    /// required inputs are not filled in yet.
    pub fn recalculate(&mut self) -> Option<Evaluation> {
        let evaluation = evaluate(&self.measurement())?;

        tracing::debug!(
            bmi = %evaluation.bmi,
            goal = %evaluation.reduction_goal,
            "form recalculated"
        );
        self.fields
            .insert(BMI_FIELD.to_string(), evaluation.bmi.to_string());
        self.fields.insert(
            REDUCTION_FIELD.to_string(),
            evaluation.reduction_goal.to_string(),
        );
        Some(evaluation)
    }
}
