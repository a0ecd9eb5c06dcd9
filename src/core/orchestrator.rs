use crate::core::autoregressive::fit_and_forecast_ar_with;
use crate::core::regularizer::regularize;
use crate::core::trend::fit_and_forecast_linear;
use crate::domain::model::{
    forecast_records, DonationEvent, ForecastSettings, Granularity, RequestKind, SeriesRecord,
};
use crate::domain::ports::EventSource;
use crate::utils::error::{ForecastError, Result};

/// Raw series over all years are daily; anything scoped to a year, and every
/// forecast, is monthly.
pub fn granularity_for(kind: RequestKind, year: Option<i32>) -> Granularity {
    match (kind, year) {
        (RequestKind::RawSeries, None) => Granularity::Daily,
        _ => Granularity::Monthly,
    }
}

fn scope(year: Option<i32>) -> String {
    match year {
        Some(year) => format!("year {}", year),
        None => "all years".to_string(),
    }
}

/// Regularizes `events` and runs the forecaster `kind` asks for.
pub fn compute(
    kind: RequestKind,
    year: Option<i32>,
    granularity: Granularity,
    events: &[DonationEvent],
    settings: &ForecastSettings,
) -> Result<Vec<SeriesRecord>> {
    if events.is_empty() {
        return Err(ForecastError::EmptyData { scope: scope(year) });
    }

    let series = regularize(events, granularity);
    let label = settings.month_label;
    match kind {
        RequestKind::RawSeries => Ok(series.to_records(label)),
        RequestKind::TrendForecast => {
            let points = fit_and_forecast_linear(&series, settings.trend_horizon)?;
            Ok(forecast_records(&points, label))
        }
        RequestKind::ArForecast => {
            let points = fit_and_forecast_ar_with(
                &series,
                settings.ar_order,
                settings.diff_order,
                settings.ar_horizon,
                settings.estimator,
            )?;
            Ok(forecast_records(&points, label))
        }
    }
}

/// Entry point for the boundary layer. Holds no state besides the injected
/// source and settings; every call re-reads events.
pub struct ForecastService<S: EventSource> {
    source: S,
    settings: ForecastSettings,
}

impl<S: EventSource> ForecastService<S> {
    pub fn new(source: S) -> Self {
        Self::with_settings(source, ForecastSettings::default())
    }

    pub fn with_settings(source: S, settings: ForecastSettings) -> Self {
        Self { source, settings }
    }

    pub fn settings(&self) -> &ForecastSettings {
        &self.settings
    }

    pub async fn get_series(
        &self,
        year: Option<i32>,
        granularity: Granularity,
    ) -> Result<Vec<SeriesRecord>> {
        let events = self.source.fetch_events(year).await?;
        compute(
            RequestKind::RawSeries,
            year,
            granularity,
            &events,
            &self.settings,
        )
    }

    pub async fn get_trend_forecast(&self, year: i32) -> Result<Vec<SeriesRecord>> {
        self.run(RequestKind::TrendForecast, Some(year)).await
    }

    pub async fn get_arima_forecast(&self, year: i32) -> Result<Vec<SeriesRecord>> {
        self.run(RequestKind::ArForecast, Some(year)).await
    }

    pub async fn get_available_years(&self) -> Result<Vec<i32>> {
        self.source.available_years().await
    }

    pub async fn run(&self, kind: RequestKind, year: Option<i32>) -> Result<Vec<SeriesRecord>> {
        let events = self.source.fetch_events(year).await?;
        tracing::debug!("{:?} request for {}: {} events", kind, scope(year), events.len());
        compute(
            kind,
            year,
            granularity_for(kind, year),
            &events,
            &self.settings,
        )
    }
}
