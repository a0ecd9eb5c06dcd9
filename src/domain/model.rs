use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One recorded donation: the number of articles given on a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationEvent {
    pub date: NaiveDate,
    pub quantity: u32,
}

impl DonationEvent {
    pub fn new(date: NaiveDate, quantity: u32) -> Self {
        Self { date, quantity }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Daily,
    Monthly,
}

/// Which date names a monthly period in output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodLabel {
    Start,
    #[default]
    End,
}

/// A day or a calendar month, identified by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    start: NaiveDate,
    granularity: Granularity,
}

impl Period {
    /// The bucket a date falls into.
    pub fn containing(date: NaiveDate, granularity: Granularity) -> Self {
        let start = match granularity {
            Granularity::Daily => date,
            // day 1 exists in every month
            Granularity::Monthly => date - chrono::Days::new(u64::from(date.day0())),
        };
        Self { start, granularity }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Last calendar day covered by the period.
    pub fn end(&self) -> NaiveDate {
        match self.granularity {
            Granularity::Daily => self.start,
            Granularity::Monthly => self
                .start
                .checked_add_months(Months::new(1))
                .and_then(|next| next.pred_opt())
                .unwrap_or(NaiveDate::MAX),
        }
    }

    /// The following period, or `None` past the end of the calendar.
    pub fn next(&self) -> Option<Self> {
        let start = match self.granularity {
            Granularity::Daily => self.start.succ_opt()?,
            Granularity::Monthly => self.start.checked_add_months(Months::new(1))?,
        };
        Some(Self {
            start,
            granularity: self.granularity,
        })
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// `YYYY-MM-DD` rendering. Daily periods always print their own date.
    pub fn label(&self, label: PeriodLabel) -> String {
        let date = match (self.granularity, label) {
            (Granularity::Monthly, PeriodLabel::End) => self.end(),
            _ => self.start,
        };
        date.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.granularity {
            Granularity::Daily => write!(f, "{}", self.start.format("%Y-%m-%d")),
            Granularity::Monthly => write!(f, "{}", self.start.format("%Y-%m")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub period: Period,
    pub value: f64,
}

/// Dense, strictly increasing periodic series. Only built through
/// [`RegularizedSeries::from_values`] or the regularizer, so the no-gap
/// invariant holds by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularizedSeries {
    granularity: Granularity,
    points: Vec<SeriesPoint>,
}

impl RegularizedSeries {
    pub(crate) fn from_points(granularity: Granularity, points: Vec<SeriesPoint>) -> Self {
        Self {
            granularity,
            points,
        }
    }

    pub fn empty(granularity: Granularity) -> Self {
        Self::from_points(granularity, Vec::new())
    }

    /// Builds consecutive periods starting at `first`.
    pub fn from_values(first: Period, values: &[f64]) -> Self {
        let mut points = Vec::with_capacity(values.len());
        let mut period = Some(first);
        for &value in values {
            let Some(current) = period else { break };
            points.push(SeriesPoint {
                period: current,
                value,
            });
            period = current.next();
        }
        Self::from_points(first.granularity(), points)
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_period(&self) -> Option<Period> {
        self.points.first().map(|p| p.period)
    }

    pub fn last_period(&self) -> Option<Period> {
        self.points.last().map(|p| p.period)
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    /// Each point as an event dated on its period start. Values are rounded
    /// to whole articles.
    pub fn to_events(&self) -> Vec<DonationEvent> {
        self.points
            .iter()
            .map(|p| DonationEvent::new(p.period.start(), p.value.max(0.0).round() as u32))
            .collect()
    }

    /// The `horizon` periods that follow the series.
    pub fn future_periods(&self, horizon: usize) -> Vec<Period> {
        let mut periods = Vec::with_capacity(horizon);
        let mut cursor = self.last_period();
        while periods.len() < horizon {
            let Some(next) = cursor.and_then(|p| p.next()) else {
                break;
            };
            periods.push(next);
            cursor = Some(next);
        }
        periods
    }

    pub fn to_records(&self, label: PeriodLabel) -> Vec<SeriesRecord> {
        self.points
            .iter()
            .map(|p| SeriesRecord::new(&p.period, p.value, label))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub period: Period,
    pub value: f64,
}

pub fn forecast_records(points: &[ForecastPoint], label: PeriodLabel) -> Vec<SeriesRecord> {
    points
        .iter()
        .map(|p| SeriesRecord::new(&p.period, p.value, label))
        .collect()
}

/// Row handed to the boundary layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub period: String,
    pub quantity: f64,
}

impl SeriesRecord {
    pub fn new(period: &Period, quantity: f64, label: PeriodLabel) -> Self {
        Self {
            period: period.label(label),
            quantity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    RawSeries,
    TrendForecast,
    ArForecast,
}

impl RequestKind {
    pub fn slug(&self) -> &'static str {
        match self {
            RequestKind::RawSeries => "series",
            RequestKind::TrendForecast => "trend_forecast",
            RequestKind::ArForecast => "arima_forecast",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArEstimator {
    /// Levinson-Durbin on the sample autocovariance.
    #[default]
    YuleWalker,
    /// Normal equations over every lagged window.
    LeastSquares,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastSettings {
    pub trend_horizon: usize,
    pub ar_horizon: usize,
    pub ar_order: usize,
    pub diff_order: usize,
    pub estimator: ArEstimator,
    pub month_label: PeriodLabel,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            trend_horizon: 6,
            ar_horizon: 12,
            ar_order: 5,
            diff_order: 1,
            estimator: ArEstimator::YuleWalker,
            month_label: PeriodLabel::End,
        }
    }
}

/// Result of one request inside a report run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSection {
    pub kind: RequestKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<SeriesRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<crate::utils::error::ErrorResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub year: Option<i32>,
    pub event_count: usize,
    pub available_years: Vec<i32>,
    pub sections: Vec<ReportSection>,
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Granularity::Daily),
            "monthly" | "month" => Ok(Granularity::Monthly),
            other => Err(format!("unknown granularity '{}', expected daily or monthly", other)),
        }
    }
}

impl FromStr for PeriodLabel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "start" => Ok(PeriodLabel::Start),
            "end" => Ok(PeriodLabel::End),
            other => Err(format!("unknown month label '{}', expected start or end", other)),
        }
    }
}

impl FromStr for ArEstimator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "yule-walker" => Ok(ArEstimator::YuleWalker),
            "least-squares" => Ok(ArEstimator::LeastSquares),
            other => Err(format!(
                "unknown estimator '{}', expected yule-walker or least-squares",
                other
            )),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unknown output format '{}', expected json or csv", other)),
        }
    }
}
