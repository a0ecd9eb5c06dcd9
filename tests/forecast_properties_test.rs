use anyhow::Result;
use chrono::NaiveDate;
use donation_forecast::core::autoregressive::{fit_and_forecast_ar, fit_and_forecast_ar_with};
use donation_forecast::core::regularizer::regularize;
use donation_forecast::core::trend::{fit_and_forecast_linear, TrendModel};
use donation_forecast::domain::model::{ArEstimator, Period, RegularizedSeries};
use donation_forecast::{
    DonationEvent, ForecastError, ForecastService, Granularity, InMemoryEventSource,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn monthly(values: &[f64]) -> RegularizedSeries {
    RegularizedSeries::from_values(
        Period::containing(date(2022, 1, 1), Granularity::Monthly),
        values,
    )
}

fn scattered_events() -> Vec<DonationEvent> {
    vec![
        DonationEvent::new(date(2022, 11, 30), 7),
        DonationEvent::new(date(2023, 1, 5), 3),
        DonationEvent::new(date(2023, 1, 5), 1),
        DonationEvent::new(date(2023, 1, 20), 2),
        DonationEvent::new(date(2023, 4, 2), 9),
        DonationEvent::new(date(2022, 12, 31), 4),
    ]
}

#[test]
fn test_regularized_series_is_complete_and_preserves_total() {
    let events = scattered_events();
    let expected_total: f64 = events.iter().map(|e| e.quantity as f64).sum();

    for granularity in [Granularity::Daily, Granularity::Monthly] {
        let series = regularize(&events, granularity);

        assert_eq!(series.total(), expected_total);
        for pair in series.points().windows(2) {
            assert_eq!(pair[0].period.next(), Some(pair[1].period));
        }
        assert_eq!(
            series.first_period(),
            Some(Period::containing(date(2022, 11, 30), granularity))
        );
        assert_eq!(
            series.last_period(),
            Some(Period::containing(date(2023, 4, 2), granularity))
        );
    }

    let monthly = regularize(&events, Granularity::Monthly);
    assert_eq!(monthly.values(), vec![7.0, 4.0, 6.0, 0.0, 0.0, 9.0]);
}

#[test]
fn test_regularizing_a_regular_series_is_identity() {
    for granularity in [Granularity::Daily, Granularity::Monthly] {
        let series = regularize(&scattered_events(), granularity);
        let again = regularize(&series.to_events(), granularity);
        assert_eq!(again, series);
    }
}

#[test]
fn test_trend_recovers_a_perfect_line() -> Result<()> {
    let values: Vec<f64> = (0..10).map(|i| 2.0 * i as f64 + 3.0).collect();
    let series = monthly(&values);

    let model = TrendModel::fit(&series)?;
    assert!((model.slope - 2.0).abs() < 1e-9);
    assert!((model.intercept - 3.0).abs() < 1e-9);

    let forecast = fit_and_forecast_linear(&series, 4)?;
    let predicted: Vec<f64> = forecast.iter().map(|p| p.value).collect();
    for (got, want) in predicted.iter().zip([23.0, 25.0, 27.0, 29.0]) {
        assert!((got - want).abs() < 1e-9);
    }
    assert_eq!(forecast[0].period.to_string(), "2022-11");
    Ok(())
}

#[test]
fn test_ar_sufficiency_boundary() -> Result<()> {
    let short = monthly(&[4.0, 6.0, 5.0, 9.0, 7.0, 8.0]);
    let err = fit_and_forecast_ar(&short, 5, 1, 12).unwrap_err();
    assert!(matches!(
        err,
        ForecastError::InsufficientData {
            required: 7,
            actual: 6
        }
    ));

    let exact = monthly(&[4.0, 6.0, 5.0, 9.0, 7.0, 8.0, 11.0]);
    let forecast = fit_and_forecast_ar(&exact, 5, 1, 12)?;
    assert_eq!(forecast.len(), 12);
    assert!(forecast.iter().all(|p| p.value.is_finite()));
    assert_eq!(forecast[0].period.to_string(), "2022-08");
    Ok(())
}

#[test]
fn test_ar_constant_series_holds_its_level() -> Result<()> {
    let series = monthly(&[6.0; 9]);
    for estimator in [ArEstimator::YuleWalker, ArEstimator::LeastSquares] {
        let forecast = fit_and_forecast_ar_with(&series, 5, 1, 12, estimator)?;
        assert_eq!(forecast.len(), 12);
        assert!(forecast.iter().all(|p| (p.value - 6.0).abs() < 1e-9));
    }
    Ok(())
}

#[tokio::test]
async fn test_monthly_example_and_trend_reference() -> Result<()> {
    let service = ForecastService::new(InMemoryEventSource::new(vec![
        DonationEvent::new(date(2023, 1, 5), 3),
        DonationEvent::new(date(2023, 1, 20), 2),
        DonationEvent::new(date(2023, 2, 10), 5),
    ]));

    let series = service.get_series(Some(2023), Granularity::Monthly).await?;
    let series: Vec<(&str, f64)> = series
        .iter()
        .map(|r| (r.period.as_str(), r.quantity))
        .collect();
    assert_eq!(series, vec![("2023-01-31", 5.0), ("2023-02-28", 5.0)]);

    // two equal points: slope 0, intercept 5
    let trend = service.get_trend_forecast(2023).await?;
    let periods: Vec<&str> = trend.iter().map(|r| r.period.as_str()).collect();
    assert_eq!(
        periods,
        vec![
            "2023-03-31",
            "2023-04-30",
            "2023-05-31",
            "2023-06-30",
            "2023-07-31",
            "2023-08-31"
        ]
    );
    assert!(trend.iter().all(|r| (r.quantity - 5.0).abs() < 1e-9));
    Ok(())
}

#[tokio::test]
async fn test_empty_year_is_reported_not_raised() {
    let service = ForecastService::new(InMemoryEventSource::new(scattered_events()));

    for result in [
        service.get_trend_forecast(2019).await,
        service.get_arima_forecast(2019).await,
        service.get_series(Some(2019), Granularity::Monthly).await,
    ] {
        let err = result.unwrap_err();
        assert!(matches!(err, ForecastError::EmptyData { .. }));
        assert_eq!(err.to_response().code, "no_data");
    }
}
