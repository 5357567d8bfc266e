use crate::domain::model::{HealthyTarget, MeasurementSource};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::{
    validate_bounds, validate_file_extension, validate_output_formats, validate_path,
    validate_range, validate_url, Validate,
};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "bmi-registry")]
#[command(about = "BMI evaluation and weight-reduction goals for a diabetes registry")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Evaluate a single measurement
    Evaluate(EvaluateArgs),
    /// Recalculate a form given as identifier=value pairs
    Form(FormArgs),
    /// Evaluate every row of a measurement export
    Batch(BatchArgs),
}

#[derive(Debug, Clone, Args)]
pub struct EvaluateArgs {
    /// Weight in pounds
    #[arg(long)]
    pub weight: String,

    /// Height, whole feet
    #[arg(long)]
    pub feet: String,

    /// Remaining inches
    #[arg(long, default_value = "")]
    pub inches: String,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct FormArgs {
    /// Field assignment such as weight=180 (repeatable)
    #[arg(long = "field", value_parser = parse_field_assignment)]
    pub fields: Vec<(String, String)>,
}

pub fn parse_field_assignment(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected identifier=value, got '{}'", raw)),
    }
}

#[derive(Debug, Clone, Args)]
pub struct BatchArgs {
    /// Measurement CSV file
    #[arg(long, conflicts_with = "endpoint")]
    pub input: Option<String>,

    /// HTTP endpoint returning a JSON array of measurements
    #[arg(long)]
    pub endpoint: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "csv")]
    pub formats: Vec<String>,

    /// Bundle the outputs into one zip archive
    #[arg(long)]
    pub zip: bool,

    #[arg(long)]
    pub max_records: Option<usize>,

    #[arg(long)]
    pub bmi_lower: Option<f64>,

    #[arg(long, default_value = "25")]
    pub bmi_upper: f64,
}

impl Validate for BatchArgs {
    fn validate(&self) -> Result<()> {
        match (&self.input, &self.endpoint) {
            (Some(input), None) => {
                validate_path("input", input)?;
                validate_file_extension("input", input, &["csv"])?;
            }
            (None, Some(endpoint)) => validate_url("endpoint", endpoint)?,
            _ => {
                return Err(RegistryError::ConfigError {
                    message: "exactly one of --input or --endpoint is required".to_string(),
                })
            }
        }

        validate_path("output_path", &self.output_path)?;
        validate_output_formats("formats", &self.formats)?;
        if let Some(max) = self.max_records {
            validate_range("max_records", max, 1, usize::MAX)?;
        }
        validate_bounds("bmi_lower..bmi_upper", self.bmi_lower, Some(self.bmi_upper))
    }
}

impl ConfigProvider for BatchArgs {
    fn source(&self) -> MeasurementSource {
        match &self.endpoint {
            Some(endpoint) => MeasurementSource::Api {
                endpoint: endpoint.clone(),
            },
            None => MeasurementSource::Csv {
                path: self.input.clone().unwrap_or_default(),
            },
        }
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn compress(&self) -> bool {
        self.zip
    }

    fn max_records(&self) -> Option<usize> {
        self.max_records
    }

    fn bmi_target(&self) -> HealthyTarget {
        HealthyTarget::new(self.bmi_lower, Some(self.bmi_upper))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(args: &[&str]) -> BatchArgs {
        let mut argv = vec!["bmi-registry", "batch"];
        argv.extend_from_slice(args);
        match CliConfig::try_parse_from(argv).unwrap().command {
            Command::Batch(args) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_field_assignment() {
        assert_eq!(
            parse_field_assignment("heightFeet=5").unwrap(),
            ("heightFeet".to_string(), "5".to_string())
        );
        assert_eq!(
            parse_field_assignment("heightInches=").unwrap(),
            ("heightInches".to_string(), String::new())
        );
        assert!(parse_field_assignment("weight").is_err());
        assert!(parse_field_assignment("=5").is_err());
    }

    #[test]
    fn test_batch_defaults() {
        let args = batch(&["--input", "vitals.csv"]);
        assert!(args.validate().is_ok());
        assert_eq!(args.formats, vec!["csv".to_string()]);
        assert_eq!(
            args.source(),
            MeasurementSource::Csv {
                path: "vitals.csv".to_string()
            }
        );
        assert_eq!(args.bmi_target(), HealthyTarget::new(None, Some(25.0)));
    }

    #[test]
    fn test_batch_requires_a_source() {
        let args = batch(&[]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_batch_rejects_unknown_format() {
        let args = batch(&["--input", "vitals.csv", "--formats", "csv,xml"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_batch_endpoint_source() {
        let args = batch(&["--endpoint", "https://registry.example.com/vitals", "--zip"]);
        assert!(args.validate().is_ok());
        assert!(args.compress());
        assert!(matches!(args.source(), MeasurementSource::Api { .. }));
    }

    #[test]
    fn test_evaluate_inches_optional() {
        let config =
            CliConfig::try_parse_from(["bmi-registry", "evaluate", "--weight", "150", "--feet", "5"])
                .unwrap();
        match config.command {
            Command::Evaluate(args) => assert_eq!(args.inches, ""),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
