use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// BMI above this value counts as overweight.
pub const OVERWEIGHT_BMI: f64 = 25.0;

/// 兩位小數顯示，與表單上看到的數值一致
pub fn format2(value: f64) -> String {
    format!("{:.2}", value)
}

/// Weight and height as entered on the form. Any field may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementInput {
    pub weight_pounds: Option<f64>,
    pub height_feet: Option<f64>,
    pub height_inches: Option<f64>,
}

impl MeasurementInput {
    pub fn new(weight_pounds: f64, height_feet: f64, height_inches: f64) -> Self {
        Self {
            weight_pounds: Some(weight_pounds),
            height_feet: Some(height_feet),
            height_inches: Some(height_inches),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BmiResult {
    pub bmi: f64,
}

impl fmt::Display for BmiResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format2(self.bmi))
    }
}

/// Suggested weight loss in pounds. Zero when the BMI is not above the threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReductionGoal {
    pub target_pounds: f64,
}

impl ReductionGoal {
    pub fn none() -> Self {
        Self { target_pounds: 0.0 }
    }
}

impl fmt::Display for ReductionGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format2(self.target_pounds))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub bmi: BmiResult,
    pub reduction_goal: ReductionGoal,
}

impl Evaluation {
    pub fn is_overweight(&self) -> bool {
        self.bmi.bmi > OVERWEIGHT_BMI
    }
}

/// 表單欄位：識別字 -> 原始字串
pub type FormFields = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Some(Sex::Male),
            "f" | "female" => Some(Sex::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub sex: Sex,
    pub last_bmi: f64,
    pub classes_attended: u32,
}

/// A class-attendance bucket: 1 through 4, or `5` meaning "five or more / other".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassGroup {
    pub classes_attended: u32,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyMassStats {
    pub average: Option<f64>,
    pub groups: Vec<ClassGroup>,
}

/// One row of a measurement export. Numeric fields stay raw so the form's
/// lenient parsing applies to batch rows too.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub id: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default, rename = "heightFeet")]
    pub height_feet: String,
    #[serde(default, rename = "heightInches")]
    pub height_inches: String,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default, rename = "classesAttended")]
    pub classes_attended: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedRecord {
    pub record: MeasurementRecord,
    pub evaluation: Option<Evaluation>,
    pub bmi_out_of_target: bool,
}

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub evaluated: Vec<EvaluatedRecord>,
    pub skipped: usize,
    pub csv_output: String,
    pub tsv_output: String,
    pub json_output: String,
    pub stats: Option<[BodyMassStats; 2]>,
}

/// Healthy range for a measure. A missing bound leaves that side unchecked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthyTarget {
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
}

impl HealthyTarget {
    pub fn new(lower_bound: Option<f64>, upper_bound: Option<f64>) -> Self {
        Self {
            lower_bound,
            upper_bound,
        }
    }

    pub fn is_out_of_target(&self, value: f64) -> bool {
        self.lower_bound.is_some_and(|lower| value < lower)
            || self.upper_bound.is_some_and(|upper| value > upper)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeasurementSource {
    Csv { path: String },
    Api { endpoint: String },
}
