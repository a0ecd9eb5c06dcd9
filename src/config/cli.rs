use crate::adapters::{ConfiguredSource, CsvEventSource, HttpEventSource};
use crate::core::ConfigProvider;
use crate::domain::model::{
    ArEstimator, ForecastSettings, Granularity, OutputFormat, PeriodLabel, RequestKind,
};
use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::{self, Validate};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliRequest {
    Series,
    Trend,
    Arima,
    Years,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "donation-forecast")]
#[command(about = "Donation activity series and forecasts")]
pub struct CliConfig {
    /// CSV file with `date` and `quantity` columns
    #[arg(long, conflicts_with = "endpoint")]
    pub events: Option<String>,

    /// HTTP endpoint returning a JSON array of events
    #[arg(long)]
    pub endpoint: Option<String>,

    #[arg(long, value_enum, default_value = "series")]
    pub kind: CliRequest,

    #[arg(long)]
    pub year: Option<i32>,

    /// Overrides the default granularity of a series request
    #[arg(long)]
    pub granularity: Option<Granularity>,

    #[arg(long, default_value = "end")]
    pub month_label: PeriodLabel,

    #[arg(long, default_value = "yule-walker")]
    pub estimator: ArEstimator,

    /// Write result files here instead of printing JSON
    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(long, value_delimiter = ',', default_value = "json")]
    pub formats: Vec<OutputFormat>,

    /// Bundle written files into this zip archive
    #[arg(long)]
    pub zip: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

impl CliConfig {
    pub fn event_source(&self) -> Result<ConfiguredSource> {
        match (&self.events, &self.endpoint) {
            (Some(path), _) => Ok(ConfiguredSource::Csv(CsvEventSource::new(path))),
            (None, Some(endpoint)) => {
                Ok(ConfiguredSource::Http(HttpEventSource::new(endpoint.clone())))
            }
            (None, None) => Err(ForecastError::MissingConfigError {
                field: "events or endpoint".to_string(),
            }),
        }
    }
}

impl ConfigProvider for CliConfig {
    fn settings(&self) -> ForecastSettings {
        ForecastSettings {
            estimator: self.estimator,
            month_label: self.month_label,
            ..ForecastSettings::default()
        }
    }

    fn year(&self) -> Option<i32> {
        self.year
    }

    fn kinds(&self) -> Vec<RequestKind> {
        match self.kind {
            CliRequest::Series => vec![RequestKind::RawSeries],
            CliRequest::Trend => vec![RequestKind::TrendForecast],
            CliRequest::Arima => vec![RequestKind::ArForecast],
            CliRequest::Years => Vec::new(),
        }
    }

    fn output_path(&self) -> &str {
        self.output_path.as_deref().unwrap_or(".")
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        self.formats.clone()
    }

    fn bundle_name(&self) -> Option<&str> {
        self.zip.as_deref()
    }

    fn skip_failed_requests(&self) -> bool {
        false
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        match (&self.events, &self.endpoint) {
            (Some(path), _) => {
                validation::validate_path("events", path)?;
                validation::validate_file_extension("events", path, &["csv"])?;
            }
            (None, Some(endpoint)) => validation::validate_url("endpoint", endpoint)?,
            (None, None) => {
                return Err(ForecastError::MissingConfigError {
                    field: "events or endpoint".to_string(),
                })
            }
        }
        validation::validate_year("year", self.year)?;
        if let Some(path) = &self.output_path {
            validation::validate_path("output_path", path)?;
        }
        if let Some(zip) = &self.zip {
            validation::validate_file_extension("zip", zip, &["zip"])?;
        }
        if self.formats.is_empty() {
            return Err(ForecastError::ValidationError {
                message: "at least one output format is required".to_string(),
            });
        }
        self.settings().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forecast_request() {
        let config = CliConfig::parse_from([
            "donation-forecast",
            "--events",
            "donations.csv",
            "--kind",
            "arima",
            "--year",
            "2023",
            "--estimator",
            "least-squares",
        ]);
        assert!(config.validate().is_ok());
        assert_eq!(config.kinds(), vec![RequestKind::ArForecast]);
        assert_eq!(config.settings().estimator, ArEstimator::LeastSquares);
        assert_eq!(config.settings().ar_horizon, 12);
    }

    #[test]
    fn test_requires_a_source() {
        let config = CliConfig::parse_from(["donation-forecast", "--kind", "trend"]);
        assert!(matches!(
            config.validate(),
            Err(ForecastError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        let config =
            CliConfig::parse_from(["donation-forecast", "--endpoint", "not a url"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parses_format_list() {
        let config = CliConfig::parse_from([
            "donation-forecast",
            "--events",
            "donations.csv",
            "--formats",
            "json,csv",
            "--granularity",
            "monthly",
        ]);
        assert_eq!(config.formats, vec![OutputFormat::Json, OutputFormat::Csv]);
        assert_eq!(config.granularity, Some(Granularity::Monthly));
    }
}
