use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Archive write to '{path}' failed: {detail}")]
    ArchiveWriteError { path: String, detail: String },

    #[error("Versioned store connection failed: {detail}")]
    StoreConnectionError { detail: String },

    #[error("No submission uploaded in this session")]
    NoSubmission,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Storage,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReportError::ConfigError { .. }
            | ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ReportError::HttpError(_) | ReportError::StoreConnectionError { .. } => {
                ErrorCategory::Network
            }
            ReportError::IoError(_) | ReportError::ArchiveWriteError { .. } => {
                ErrorCategory::Storage
            }
            ReportError::CsvError(_)
            | ReportError::SerializationError(_)
            | ReportError::NoSubmission => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤通常可以重試
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Storage | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ReportError::HttpError(_) | ReportError::StoreConnectionError { .. } => {
                "Check network access, the repository name and that the access token is valid"
                    .to_string()
            }
            ReportError::ArchiveWriteError { .. } => {
                "The report itself is unaffected; retry the archive action a second or more later to get a new timestamped path"
                    .to_string()
            }
            ReportError::IoError(_) => "Check that the file exists and is readable".to_string(),
            ReportError::CsvError(_) | ReportError::SerializationError(_) => {
                "Check the output destination and try a different output format".to_string()
            }
            ReportError::MissingConfigError { field } => {
                format!("Set '{}' in the config file or the environment", field)
            }
            ReportError::NoSubmission => "Upload a report file before archiving".to_string(),
            ReportError::ConfigError { .. }
            | ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. } => {
                "Review the TOML configuration file".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ReportError::ArchiveWriteError { path, detail } => {
                format!("Could not archive the submission to {}: {}", path, detail)
            }
            ReportError::StoreConnectionError { detail } => {
                format!("Connection Failed: {}", detail)
            }
            ReportError::MissingConfigError { field } => {
                format!("Missing configuration value: {}", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
