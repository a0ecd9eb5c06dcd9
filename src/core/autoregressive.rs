//! Autoregressive forecaster on a differenced series (ARIMA(p, d, 0)
//! without a constant term).
//!
//! Coefficients come from one of two estimators:
//! * Yule-Walker (default): Levinson-Durbin on the biased sample
//!   autocovariance of the differenced series, taken about zero since the
//!   model carries no mean. The Toeplitz system is positive definite for any
//!   non-zero input, so it still fits when only `p + 1` differences exist.
//! * Conditional least squares: normal equations over every complete lag
//!   window. Needs enough windows to be well determined and reports a
//!   singular system otherwise.
//!
//! The two are not numerically identical, so forecasts differ slightly
//! between them on the same series.

use crate::core::linalg;
use crate::domain::model::{ArEstimator, ForecastPoint, RegularizedSeries};
use crate::utils::error::{ForecastError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ArModel {
    pub order: usize,
    pub coefficients: Vec<f64>,
    pub differencing_order: usize,
    pub estimator: ArEstimator,
}

impl ArModel {
    /// Fits `order` coefficients to `values` differenced `differencing_order` times.
    pub fn fit(
        values: &[f64],
        order: usize,
        differencing_order: usize,
        estimator: ArEstimator,
    ) -> Result<Self> {
        let required = order + differencing_order + 1;
        if values.len() < required {
            return Err(ForecastError::InsufficientData {
                required,
                actual: values.len(),
            });
        }

        let (differenced, _) = difference(values, differencing_order);
        let coefficients = if order == 0 {
            Vec::new()
        } else if differenced.iter().all(|v| *v == 0.0) {
            // constant input: nothing to regress, the forecast holds the last level
            tracing::debug!("Differenced series is identically zero; using zero coefficients");
            vec![0.0; order]
        } else {
            match estimator {
                ArEstimator::YuleWalker => {
                    linalg::levinson_durbin(&autocovariance(&differenced, order))?
                }
                ArEstimator::LeastSquares => conditional_least_squares(&differenced, order)?,
            }
        };

        Ok(Self {
            order,
            coefficients,
            differencing_order,
            estimator,
        })
    }

    /// Forecasts `horizon` values on the original scale of `values`, which
    /// must be the history the model was fitted on.
    pub fn forecast(&self, values: &[f64], horizon: usize) -> Vec<f64> {
        let (differenced, anchors) = difference(values, self.differencing_order);
        let steps = recursive_forecast(&differenced, &self.coefficients, horizon);
        integrate(steps, &anchors)
    }
}

/// Fits with the default Yule-Walker estimator and forecasts `horizon` periods.
pub fn fit_and_forecast_ar(
    series: &RegularizedSeries,
    ar_order: usize,
    diff_order: usize,
    horizon: usize,
) -> Result<Vec<ForecastPoint>> {
    fit_and_forecast_ar_with(series, ar_order, diff_order, horizon, ArEstimator::default())
}

pub fn fit_and_forecast_ar_with(
    series: &RegularizedSeries,
    ar_order: usize,
    diff_order: usize,
    horizon: usize,
    estimator: ArEstimator,
) -> Result<Vec<ForecastPoint>> {
    let values = series.values();
    let model = ArModel::fit(&values, ar_order, diff_order, estimator)?;
    tracing::debug!(
        "AR({}) fit with d={} via {:?}: {:?}",
        model.order,
        model.differencing_order,
        model.estimator,
        model.coefficients
    );

    let forecasts = model.forecast(&values, horizon);
    if forecasts.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::NumericalFit {
            message: "forecast diverged to non-finite values".to_string(),
        });
    }

    Ok(series
        .future_periods(horizon)
        .into_iter()
        .zip(forecasts)
        .map(|(period, value)| ForecastPoint { period, value })
        .collect())
}

/// Applies first differences `d` times. Also returns the last value of each
/// level before it was differenced, outermost first.
fn difference(values: &[f64], d: usize) -> (Vec<f64>, Vec<f64>) {
    let mut current = values.to_vec();
    let mut anchors = Vec::with_capacity(d);
    for _ in 0..d {
        let Some(&last) = current.last() else { break };
        anchors.push(last);
        current = current.windows(2).map(|w| w[1] - w[0]).collect();
    }
    (current, anchors)
}

/// Undoes [`difference`] by cumulative summation, innermost level first.
fn integrate(mut steps: Vec<f64>, anchors: &[f64]) -> Vec<f64> {
    for &anchor in anchors.iter().rev() {
        let mut level = anchor;
        for step in steps.iter_mut() {
            level += *step;
            *step = level;
        }
    }
    steps
}

/// Biased autocovariance about zero for lags `0..=max_lag`.
fn autocovariance(series: &[f64], max_lag: usize) -> Vec<f64> {
    let n = series.len() as f64;
    (0..=max_lag)
        .map(|lag| {
            series
                .iter()
                .skip(lag)
                .zip(series.iter())
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n
        })
        .collect()
}

fn conditional_least_squares(series: &[f64], order: usize) -> Result<Vec<f64>> {
    let mut xtx = vec![vec![0.0; order]; order];
    let mut xty = vec![0.0; order];
    for t in order..series.len() {
        for i in 0..order {
            let xi = series[t - 1 - i];
            xty[i] += xi * series[t];
            for j in 0..order {
                xtx[i][j] += xi * series[t - 1 - j];
            }
        }
    }
    linalg::solve(xtx, xty)
}

fn recursive_forecast(history: &[f64], coefficients: &[f64], horizon: usize) -> Vec<f64> {
    let mut extended = history.to_vec();
    for _ in 0..horizon {
        let next: f64 = coefficients
            .iter()
            .enumerate()
            .map(|(k, a)| {
                extended
                    .len()
                    .checked_sub(k + 1)
                    .map_or(0.0, |idx| a * extended[idx])
            })
            .sum();
        extended.push(next);
    }
    extended.split_off(history.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Granularity, Period};
    use chrono::NaiveDate;

    fn monthly(values: &[f64]) -> RegularizedSeries {
        let first = Period::containing(
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            Granularity::Monthly,
        );
        RegularizedSeries::from_values(first, values)
    }

    #[test]
    fn test_difference_and_integrate_invert() {
        let values = [10.0, 12.0, 15.0, 14.0, 18.0];
        let (diff, anchors) = difference(&values, 1);
        assert_eq!(diff, vec![2.0, 3.0, -1.0, 4.0]);
        assert_eq!(anchors, vec![18.0]);
        assert_eq!(integrate(vec![1.0, -2.0], &anchors), vec![19.0, 17.0]);
    }

    #[test]
    fn test_second_order_integration() {
        // quadratic: second differences are constant 2
        let values: Vec<f64> = (0..6).map(|i| (i * i) as f64).collect();
        let (diff, anchors) = difference(&values, 2);
        assert!(diff.iter().all(|v| *v == 2.0));
        assert_eq!(integrate(vec![2.0, 2.0], &anchors), vec![36.0, 49.0]);
    }

    #[test]
    fn test_rejects_series_at_the_boundary() {
        let series = monthly(&[1.0, 4.0, 2.0, 8.0, 5.0, 7.0]);
        let err = fit_and_forecast_ar(&series, 5, 1, 12).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientData {
                required: 7,
                actual: 6
            }
        ));
    }

    #[test]
    fn test_accepts_one_more_than_the_boundary() {
        let series = monthly(&[3.0, 7.0, 2.0, 9.0, 4.0, 8.0, 5.0]);
        let forecast = fit_and_forecast_ar(&series, 5, 1, 12).unwrap();
        assert_eq!(forecast.len(), 12);
        assert!(forecast.iter().all(|p| p.value.is_finite()));
        assert_eq!(forecast[0].period.to_string(), "2022-08");
    }

    #[test]
    fn test_constant_series_holds_level() {
        let series = monthly(&[4.0; 10]);
        for estimator in [ArEstimator::YuleWalker, ArEstimator::LeastSquares] {
            let forecast = fit_and_forecast_ar_with(&series, 5, 1, 12, estimator).unwrap();
            assert!(forecast.iter().all(|p| (p.value - 4.0).abs() < 1e-9));
        }
    }

    #[test]
    fn test_yule_walker_recovers_ar1() {
        let differences: Vec<f64> = (0..40).map(|t| 0.5_f64.powi(t)).collect();
        let coeffs = linalg::levinson_durbin(&autocovariance(&differences, 1)).unwrap();
        assert!((coeffs[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_least_squares_recovers_ar1_exactly() {
        let differences: Vec<f64> = (0..20).map(|t| 0.5_f64.powi(t)).collect();
        let coeffs = conditional_least_squares(&differences, 1).unwrap();
        assert!((coeffs[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_least_squares_reports_singular_fit() {
        // a single lag window cannot determine five coefficients
        let values = [3.0, 7.0, 2.0, 9.0, 4.0, 8.0, 5.0];
        let err = ArModel::fit(&values, 5, 1, ArEstimator::LeastSquares).unwrap_err();
        assert!(matches!(err, ForecastError::NumericalFit { .. }));
    }

    #[test]
    fn test_forecast_continues_geometric_decay() {
        // differences halve each step, so the level converges
        let mut values = vec![100.0];
        for t in 0..15 {
            let last = *values.last().unwrap();
            values.push(last + 64.0 * 0.5_f64.powi(t));
        }
        let model = ArModel::fit(&values, 1, 1, ArEstimator::LeastSquares).unwrap();
        let forecast = model.forecast(&values, 3);

        let last = *values.last().unwrap();
        let step = 64.0 * 0.5_f64.powi(15);
        assert!((forecast[0] - (last + step)).abs() < 1e-6);
        assert!(forecast.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_zero_order_is_a_random_walk() {
        let series = monthly(&[1.0, 5.0, 3.0]);
        let forecast = fit_and_forecast_ar(&series, 0, 1, 4).unwrap();
        assert!(forecast.iter().all(|p| p.value == 3.0));
    }
}
