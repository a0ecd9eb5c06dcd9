use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("No donation events available for {scope}")]
    EmptyData { scope: String },

    #[error("Insufficient data: series has {actual} periods, model needs at least {required}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Numerical fit failed: {message}")]
    NumericalFit { message: String },

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

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field '{field}'")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

pub type Result<T> = std::result::Result<T, ForecastError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Data,
    Model,
    Source,
    Configuration,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Non-fatal conditions raised while fitting a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitWarning {
    /// Trend fitted on a single period: flat line through the observed value.
    DegenerateTrend { observations: usize },
}

impl fmt::Display for FitWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitWarning::DegenerateTrend { observations } => write!(
                f,
                "trend fitted on {} observation(s); slope fixed at 0",
                observations
            ),
        }
    }
}

/// Boundary-facing shape of a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ForecastError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ForecastError::EmptyData { .. } | ForecastError::InsufficientData { .. } => {
                ErrorCategory::Data
            }
            ForecastError::NumericalFit { .. } => ErrorCategory::Model,
            ForecastError::ApiError(_) | ForecastError::CsvError(_) => ErrorCategory::Source,
            ForecastError::ConfigError { .. }
            | ForecastError::ConfigValidationError { .. }
            | ForecastError::InvalidConfigValueError { .. }
            | ForecastError::MissingConfigError { .. }
            | ForecastError::ValidationError { .. } => ErrorCategory::Configuration,
            ForecastError::ZipError(_)
            | ForecastError::IoError(_)
            | ForecastError::SerializationError(_)
            | ForecastError::ProcessingError { .. } => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ForecastError::EmptyData { .. } | ForecastError::InsufficientData { .. } => {
                ErrorSeverity::Medium
            }
            ForecastError::ApiError(_) => ErrorSeverity::Medium,
            ForecastError::NumericalFit { .. }
            | ForecastError::CsvError(_)
            | ForecastError::ConfigError { .. }
            | ForecastError::ConfigValidationError { .. }
            | ForecastError::InvalidConfigValueError { .. }
            | ForecastError::MissingConfigError { .. }
            | ForecastError::ValidationError { .. }
            | ForecastError::ProcessingError { .. } => ErrorSeverity::High,
            ForecastError::ZipError(_)
            | ForecastError::IoError(_)
            | ForecastError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    /// Stable machine-readable code for the boundary layer.
    pub fn error_code(&self) -> &'static str {
        match self {
            ForecastError::EmptyData { .. } => "no_data",
            ForecastError::InsufficientData { .. } => "insufficient_data",
            ForecastError::NumericalFit { .. } => "numerical_fit",
            ForecastError::ApiError(_) => "source_unavailable",
            ForecastError::CsvError(_) => "source_malformed",
            ForecastError::ConfigError { .. }
            | ForecastError::ConfigValidationError { .. }
            | ForecastError::InvalidConfigValueError { .. }
            | ForecastError::MissingConfigError { .. }
            | ForecastError::ValidationError { .. } => "invalid_configuration",
            ForecastError::ZipError(_)
            | ForecastError::IoError(_)
            | ForecastError::SerializationError(_)
            | ForecastError::ProcessingError { .. } => "internal",
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ForecastError::EmptyData { .. } => {
                "Pick a year that has recorded donations, or omit the year to use all data"
            }
            ForecastError::InsufficientData { .. } => {
                "Use a wider date range or a lower autoregressive order"
            }
            ForecastError::NumericalFit { .. } => {
                "Try the other AR estimator or the linear trend forecast for this series"
            }
            ForecastError::ApiError(_) => "Check that the event endpoint is reachable and retry",
            ForecastError::CsvError(_) => {
                "Make sure the events file has 'date' (YYYY-MM-DD) and 'quantity' columns"
            }
            ForecastError::ConfigError { .. }
            | ForecastError::ConfigValidationError { .. }
            | ForecastError::InvalidConfigValueError { .. }
            | ForecastError::MissingConfigError { .. }
            | ForecastError::ValidationError { .. } => {
                "Review the configuration values and command-line flags"
            }
            ForecastError::ZipError(_) | ForecastError::IoError(_) => {
                "Check that the output path exists and is writable"
            }
            ForecastError::SerializationError(_) | ForecastError::ProcessingError { .. } => {
                "Re-run with --verbose and report the logged details"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ForecastError::EmptyData { scope } => format!("No donation data found for {}", scope),
            ForecastError::InsufficientData { required, actual } => format!(
                "Not enough history to forecast: {} period(s) available, {} required",
                actual, required
            ),
            ForecastError::NumericalFit { .. } => {
                "The forecast model could not be fitted to this series".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.user_friendly_message(),
        }
    }
}
