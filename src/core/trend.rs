use crate::domain::model::{ForecastPoint, RegularizedSeries};
use crate::utils::error::{FitWarning, ForecastError, Result};

/// Straight line over the period index, fitted by ordinary least squares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendModel {
    pub slope: f64,
    pub intercept: f64,
    observations: usize,
}

impl TrendModel {
    /// Closed-form OLS with `x = 0..n-1`. A single observation has no index
    /// variance, so the line is flat through that value.
    pub fn fit(series: &RegularizedSeries) -> Result<Self> {
        let values = series.values();
        let n = values.len();
        if n == 0 {
            return Err(ForecastError::EmptyData {
                scope: "trend fit".to_string(),
            });
        }
        if n == 1 {
            return Ok(Self {
                slope: 0.0,
                intercept: values[0],
                observations: 1,
            });
        }

        let mean_x = (n - 1) as f64 / 2.0;
        let mean_y = values.iter().sum::<f64>() / n as f64;
        let (cov, var) = values
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(cov, var), (i, &y)| {
                let dx = i as f64 - mean_x;
                (cov + dx * (y - mean_y), var + dx * dx)
            });

        let slope = cov / var;
        Ok(Self {
            slope,
            intercept: mean_y - slope * mean_x,
            observations: n,
        })
    }

    pub fn predict(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }

    pub fn observations(&self) -> usize {
        self.observations
    }

    pub fn warning(&self) -> Option<FitWarning> {
        (self.observations < 2).then_some(FitWarning::DegenerateTrend {
            observations: self.observations,
        })
    }
}

/// Fits a [`TrendModel`] and extends it `horizon` periods past the series.
pub fn fit_and_forecast_linear(
    series: &RegularizedSeries,
    horizon: usize,
) -> Result<Vec<ForecastPoint>> {
    let model = TrendModel::fit(series)?;
    if let Some(warning) = model.warning() {
        tracing::warn!("Degenerate trend fit: {}", warning);
    }
    tracing::debug!(
        "Trend fit over {} periods: slope={:.6}, intercept={:.6}",
        model.observations,
        model.slope,
        model.intercept
    );

    let n = series.len();
    Ok(series
        .future_periods(horizon)
        .into_iter()
        .enumerate()
        .map(|(i, period)| ForecastPoint {
            period,
            value: model.predict(n + i),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Granularity, Period};
    use chrono::NaiveDate;

    fn monthly(values: &[f64]) -> RegularizedSeries {
        let first = Period::containing(
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            Granularity::Monthly,
        );
        RegularizedSeries::from_values(first, values)
    }

    #[test]
    fn test_recovers_exact_line() {
        let values: Vec<f64> = (0..10).map(|i| 2.0 * i as f64 + 3.0).collect();
        let series = monthly(&values);
        let model = TrendModel::fit(&series).unwrap();

        assert!((model.slope - 2.0).abs() < 1e-9);
        assert!((model.intercept - 3.0).abs() < 1e-9);
        assert!(model.warning().is_none());

        let forecast = fit_and_forecast_linear(&series, 3).unwrap();
        let predicted: Vec<f64> = forecast.iter().map(|p| p.value).collect();
        for (got, want) in predicted.iter().zip([23.0, 25.0, 27.0]) {
            assert!((got - want).abs() < 1e-9);
        }
        assert_eq!(forecast[0].period.to_string(), "2023-11");
    }

    #[test]
    fn test_hand_computed_three_points() {
        // mean_x = 1, mean_y = 6, cov = 7, var = 2
        let forecast = fit_and_forecast_linear(&monthly(&[3.0, 5.0, 10.0]), 2).unwrap();
        assert!((forecast[0].value - 13.0).abs() < 1e-9);
        assert!((forecast[1].value - 16.5).abs() < 1e-9);
    }

    #[test]
    fn test_single_point_is_flat() {
        let series = monthly(&[42.0]);
        let model = TrendModel::fit(&series).unwrap();
        assert_eq!(model.slope, 0.0);
        assert_eq!(model.intercept, 42.0);
        assert_eq!(
            model.warning(),
            Some(FitWarning::DegenerateTrend { observations: 1 })
        );

        let forecast = fit_and_forecast_linear(&series, 6).unwrap();
        assert_eq!(forecast.len(), 6);
        assert!(forecast.iter().all(|p| p.value == 42.0));
    }

    #[test]
    fn test_empty_series_is_rejected() {
        let err = TrendModel::fit(&monthly(&[])).unwrap_err();
        assert!(matches!(err, ForecastError::EmptyData { .. }));
    }

    #[test]
    fn test_zero_horizon() {
        let forecast = fit_and_forecast_linear(&monthly(&[1.0, 2.0]), 0).unwrap();
        assert!(forecast.is_empty());
    }
}
