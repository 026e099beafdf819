use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndustryError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingConfigError { field: String },

    #[error("Classifier did not answer within {seconds}s")]
    ClassifierTimeout { seconds: u64 },

    #[error("Cache document error: {message}")]
    CacheError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Cache,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IndustryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_) | Self::HttpStatus { .. } | Self::ClassifierTimeout { .. } => {
                ErrorCategory::Network
            }
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::CsvError(_) | Self::SerializationError(_) => ErrorCategory::Data,
            Self::CacheError { .. } => ErrorCategory::Cache,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 快取只是最佳化，失敗不影響結果
            ErrorCategory::Cache => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check network connectivity and the target URL, then retry",
            ErrorCategory::Configuration => "Review the TOML configuration and CLI arguments",
            ErrorCategory::Data => "Check that the input file or cache document is well-formed",
            ErrorCategory::Cache => "The cache document can be deleted safely; it will be rebuilt",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::HttpError(_) | Self::HttpStatus { .. } => {
                format!("Could not reach the remote site: {}", self)
            }
            Self::ClassifierTimeout { seconds } => {
                format!("Industry classification took longer than {} seconds", seconds)
            }
            Self::MissingConfigError { field } => format!("'{}' is required", field),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("'{}' is invalid: {}", field, reason)
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IndustryError>;
