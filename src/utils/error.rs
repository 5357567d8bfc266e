use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RegistryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RegistryError::ConfigError { .. }
            | RegistryError::InvalidConfigValueError { .. }
            | RegistryError::MissingConfigError { .. }
            | RegistryError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            RegistryError::ApiError(_) => ErrorCategory::Network,
            RegistryError::CsvError(_)
            | RegistryError::SerializationError(_)
            | RegistryError::ProcessingError { .. }
            | RegistryError::ValidationError { .. } => ErrorCategory::Data,
            RegistryError::IoError(_) | RegistryError::ZipError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的訊息，不含內部細節
    pub fn user_friendly_message(&self) -> String {
        match self {
            RegistryError::ApiError(_) => {
                "Could not fetch measurements from the remote source".to_string()
            }
            RegistryError::CsvError(e) => format!("The measurement file is not valid CSV: {}", e),
            RegistryError::IoError(e) => format!("File system error: {}", e),
            RegistryError::ZipError(_) => "Could not build the output archive".to_string(),
            RegistryError::MissingConfigError { field } => {
                format!("Missing required setting '{}'", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the command line flags or the TOML file",
            ErrorCategory::Network => "Check the endpoint URL and retry",
            ErrorCategory::Data => "Check the input rows for malformed values",
            ErrorCategory::System => "Check that the output path exists and is writable",
        }
    }

    /// 依嚴重程度對應程序結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
