use crate::core::targets::{default_bmi_target, validate_target};
use crate::domain::model::{HealthyTarget, MeasurementSource};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_output_formats, validate_path,
    validate_range, validate_required_field, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub targets: TargetsConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// `csv` or `api`
    pub r#type: String,
    pub path: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub max_records: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetsConfig {
    pub bmi: Option<HealthyTarget>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    /// `compact` (default) or `json`
    pub log_format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| RegistryError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${REGISTRY_EXPORT_URL})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        let re = Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid");

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("pipeline.name", &self.pipeline.name)?;

        match self.source.r#type.as_str() {
            "csv" => {
                let path = validate_required_field("source.path", &self.source.path)?;
                validate_path("source.path", path)?;
                validate_file_extension("source.path", path, &["csv"])?;
            }
            "api" => {
                let endpoint = validate_required_field("source.endpoint", &self.source.endpoint)?;
                validate_url("source.endpoint", endpoint)?;
            }
            other => {
                return Err(RegistryError::InvalidConfigValueError {
                    field: "source.type".to_string(),
                    value: other.to_string(),
                    reason: "Supported source types: csv, api".to_string(),
                })
            }
        }

        if let Some(max) = self.extract.max_records {
            validate_range("extract.max_records", max, 1, usize::MAX)?;
        }

        validate_target("targets.bmi", &self.bmi_target())?;
        validate_path("load.output_path", &self.load.output_path)?;
        validate_output_formats("load.output_formats", &self.load.output_formats)?;

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .is_some_and(|format| format.eq_ignore_ascii_case("json"))
    }
}

impl ConfigProvider for TomlConfig {
    fn source(&self) -> MeasurementSource {
        match self.source.r#type.as_str() {
            "api" => MeasurementSource::Api {
                endpoint: self.source.endpoint.clone().unwrap_or_default(),
            },
            _ => MeasurementSource::Csv {
                path: self.source.path.clone().unwrap_or_default(),
            },
        }
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn compress(&self) -> bool {
        self.load
            .compression
            .as_ref()
            .map(|c| c.enabled)
            .unwrap_or(false)
    }

    fn max_records(&self) -> Option<usize> {
        self.extract.max_records
    }

    fn request_timeout_seconds(&self) -> Option<u64> {
        self.source.timeout_seconds
    }

    fn bmi_target(&self) -> HealthyTarget {
        self.targets.bmi.unwrap_or_else(default_bmi_target)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_csv_config() {
        let toml_content = r#"
[pipeline]
name = "clinic-vitals"
description = "Quarterly vitals export"
version = "1.0.0"

[source]
type = "csv"
path = "./exports/vitals.csv"

[extract]
max_records = 500

[targets.bmi]
lower_bound = 18.5
upper_bound = 25.0

[load]
output_path = "./bmi-output"
output_formats = ["csv", "json"]

[load.compression]
enabled = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.pipeline.name, "clinic-vitals");
        assert!(config.validate().is_ok());
        assert_eq!(
            config.source(),
            MeasurementSource::Csv {
                path: "./exports/vitals.csv".to_string()
            }
        );
        assert_eq!(config.max_records(), Some(500));
        assert_eq!(config.bmi_target(), HealthyTarget::new(Some(18.5), Some(25.0)));
        assert!(config.compress());
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_defaults_when_sections_are_omitted() {
        let toml_content = r#"
[pipeline]
name = "minimal"

[source]
type = "csv"
path = "vitals.csv"

[load]
output_path = "./out"
output_formats = ["tsv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.bmi_target(), default_bmi_target());
        assert_eq!(config.max_records(), None);
        assert!(!config.compress());
        assert!(!config.json_logs());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("BMI_TEST_EXPORT_URL", "https://registry.example.com/vitals");

        let toml_content = r#"
[pipeline]
name = "remote"

[source]
type = "api"
endpoint = "${BMI_TEST_EXPORT_URL}"

[load]
output_path = "./output"
output_formats = ["json"]

[monitoring]
enabled = true
log_format = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.source.endpoint.as_deref(),
            Some("https://registry.example.com/vitals")
        );
        assert!(config.validate().is_ok());
        assert!(config.monitoring_enabled());
        assert!(config.json_logs());

        std::env::remove_var("BMI_TEST_EXPORT_URL");
    }

    #[test]
    fn test_unset_env_var_is_left_in_place() {
        let out = TomlConfig::substitute_env_vars("endpoint = \"${BMI_TEST_SURELY_UNSET}\"");
        assert_eq!(out, "endpoint = \"${BMI_TEST_SURELY_UNSET}\"");
    }

    #[test]
    fn test_config_validation_failures() {
        let missing_path = r#"
[pipeline]
name = "broken"

[source]
type = "csv"

[load]
output_path = "./output"
output_formats = ["csv"]
"#;
        let config = TomlConfig::from_toml_str(missing_path).unwrap();
        assert!(matches!(
            config.validate(),
            Err(RegistryError::MissingConfigError { .. })
        ));

        let inverted_target = r#"
[pipeline]
name = "broken"

[source]
type = "csv"
path = "vitals.csv"

[targets.bmi]
lower_bound = 30.0
upper_bound = 20.0

[load]
output_path = "./output"
output_formats = ["csv"]
"#;
        let config = TomlConfig::from_toml_str(inverted_target).unwrap();
        assert!(config.validate().is_err());

        let unknown_source = r#"
[pipeline]
name = "broken"

[source]
type = "database"

[load]
output_path = "./output"
output_formats = ["csv"]
"#;
        let config = TomlConfig::from_toml_str(unknown_source).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[pipeline]
name = "file-test"

[source]
type = "csv"
path = "vitals.csv"

[load]
output_path = "./output"
output_formats = ["csv"]
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "file-test");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[pipeline\nname = ").unwrap_err();
        assert!(matches!(err, RegistryError::ConfigValidationError { .. }));
    }
}
