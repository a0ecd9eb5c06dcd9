use crate::adapters::{ConfiguredSource, CsvEventSource, HttpEventSource};
use crate::core::ConfigProvider;
use crate::domain::model::{
    ArEstimator, ForecastSettings, OutputFormat, PeriodLabel, RequestKind,
};
use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub report: ReportConfig,
    pub source: SourceConfig,
    pub forecast: Option<ForecastConfig>,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
    pub error_handling: Option<ErrorHandlingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// `csv` or `http`
    pub r#type: String,
    pub path: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub year: Option<i32>,
    pub kinds: Option<Vec<RequestKind>>,
    pub trend_horizon: Option<usize>,
    pub ar_horizon: Option<usize>,
    pub ar_order: Option<usize>,
    pub diff_order: Option<usize>,
    pub estimator: Option<ArEstimator>,
    pub month_label: Option<PeriodLabel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<OutputFormat>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorHandlingConfig {
    /// `fail` (default) or `skip`
    pub on_model_error: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ForecastError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ForecastError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ForecastError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("report.name", &self.report.name)?;

        match self.source.r#type.as_str() {
            "csv" => {
                let path = validation::validate_required_field("source.path", &self.source.path)?;
                validation::validate_path("source.path", path)?;
                validation::validate_file_extension("source.path", path, &["csv"])?;
            }
            "http" => {
                let endpoint =
                    validation::validate_required_field("source.endpoint", &self.source.endpoint)?;
                validation::validate_url("source.endpoint", endpoint)?;
            }
            other => {
                return Err(ForecastError::InvalidConfigValueError {
                    field: "source.type".to_string(),
                    value: other.to_string(),
                    reason: "Unsupported source. Valid sources: csv, http".to_string(),
                })
            }
        }

        validation::validate_path("load.output_path", &self.load.output_path)?;
        if self.load.output_formats.is_empty() {
            return Err(ForecastError::InvalidConfigValueError {
                field: "load.output_formats".to_string(),
                value: "[]".to_string(),
                reason: "At least one output format is required".to_string(),
            });
        }
        if let Some(compression) = &self.load.compression {
            if compression.enabled {
                validation::validate_file_extension(
                    "load.compression.filename",
                    &compression.filename,
                    &["zip"],
                )?;
            }
        }

        if let Some(handling) = self
            .error_handling
            .as_ref()
            .and_then(|h| h.on_model_error.as_deref())
        {
            if !["fail", "skip"].contains(&handling) {
                return Err(ForecastError::InvalidConfigValueError {
                    field: "error_handling.on_model_error".to_string(),
                    value: handling.to_string(),
                    reason: "Valid values: fail, skip".to_string(),
                });
            }
        }

        validation::validate_year("forecast.year", self.year())?;
        if self.kinds().is_empty() {
            return Err(ForecastError::InvalidConfigValueError {
                field: "forecast.kinds".to_string(),
                value: "[]".to_string(),
                reason: "At least one request kind is required".to_string(),
            });
        }
        self.settings().validate()
    }

    pub fn event_source(&self) -> Result<ConfiguredSource> {
        match self.source.r#type.as_str() {
            "csv" => {
                let path = validation::validate_required_field("source.path", &self.source.path)?;
                Ok(ConfiguredSource::Csv(CsvEventSource::new(path)))
            }
            "http" => {
                let endpoint =
                    validation::validate_required_field("source.endpoint", &self.source.endpoint)?;
                let mut source = HttpEventSource::new(endpoint.clone());
                if let Some(seconds) = self.source.timeout_seconds {
                    source = source.with_timeout(Duration::from_secs(seconds));
                }
                Ok(ConfiguredSource::Http(source))
            }
            other => Err(ForecastError::InvalidConfigValueError {
                field: "source.type".to_string(),
                value: other.to_string(),
                reason: "Unsupported source. Valid sources: csv, http".to_string(),
            }),
        }
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    fn forecast_config(&self) -> ForecastConfig {
        self.forecast.clone().unwrap_or_default()
    }
}

impl ConfigProvider for TomlConfig {
    fn settings(&self) -> ForecastSettings {
        let forecast = self.forecast_config();
        let defaults = ForecastSettings::default();
        ForecastSettings {
            trend_horizon: forecast.trend_horizon.unwrap_or(defaults.trend_horizon),
            ar_horizon: forecast.ar_horizon.unwrap_or(defaults.ar_horizon),
            ar_order: forecast.ar_order.unwrap_or(defaults.ar_order),
            diff_order: forecast.diff_order.unwrap_or(defaults.diff_order),
            estimator: forecast.estimator.unwrap_or(defaults.estimator),
            month_label: forecast.month_label.unwrap_or(defaults.month_label),
        }
    }

    fn year(&self) -> Option<i32> {
        self.forecast.as_ref().and_then(|f| f.year)
    }

    fn kinds(&self) -> Vec<RequestKind> {
        self.forecast_config().kinds.unwrap_or_else(|| {
            vec![
                RequestKind::RawSeries,
                RequestKind::TrendForecast,
                RequestKind::ArForecast,
            ]
        })
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        self.load.output_formats.clone()
    }

    fn bundle_name(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }

    fn skip_failed_requests(&self) -> bool {
        self.error_handling
            .as_ref()
            .and_then(|h| h.on_model_error.as_deref())
            == Some("skip")
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
