use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}: {body}")]
    HttpStatusError {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Sink operation on table '{table}' failed: {message}")]
    SinkError { table: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Sink,
    Configuration,
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

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) | EtlError::HttpStatusError { .. } => ErrorCategory::Network,
            EtlError::SinkError { .. } => ErrorCategory::Sink,
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EtlError::SerializationError(_) => ErrorCategory::Data,
            EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Sink => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::Low,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::ApiError(_) => {
                "Check network connectivity and the Rakuten endpoint URLs".to_string()
            }
            EtlError::HttpStatusError { status, .. } if *status == 429 => {
                "Rakuten rate limit hit; raise rate_limit.interval_ms".to_string()
            }
            EtlError::HttpStatusError { status, .. } if *status == 401 || *status == 403 => {
                "Check RAKUTEN_APP_ID / SUPABASE_KEY credentials".to_string()
            }
            EtlError::HttpStatusError { .. } => "Retry later; the remote side rejected the request".to_string(),
            EtlError::SinkError { table, .. } => {
                format!("Check that table '{}' exists and its columns match the row layout", table)
            }
            EtlError::MissingConfigError { field } => {
                format!("Set '{}' in the config file or environment", field)
            }
            EtlError::InvalidConfigValueError { field, .. }
            | EtlError::ConfigValidationError { field, .. } => {
                format!("Fix the value of '{}'", field)
            }
            EtlError::ConfigError { .. } => "Review the configuration file".to_string(),
            EtlError::SerializationError(_) => {
                "Upstream data had an unexpected shape; inspect the debug log".to_string()
            }
            EtlError::IoError(_) => "Check file paths and permissions".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the Rakuten API: {}", self),
            ErrorCategory::Sink => format!("Could not write to Supabase: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Data => format!("Unexpected data: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = EtlError::MissingConfigError {
            field: "rakuten.application_id".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("rakuten.application_id"));
    }

    #[test]
    fn test_rate_limit_suggestion() {
        let err = EtlError::HttpStatusError {
            status: 429,
            url: "https://app.rakuten.co.jp".to_string(),
            body: String::new(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.recovery_suggestion().contains("interval_ms"));
    }
}
