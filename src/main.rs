use clap::Parser;
use donation_forecast::config::CliRequest;
use donation_forecast::core::ConfigProvider;
use donation_forecast::utils::error::ErrorSeverity;
use donation_forecast::utils::{logger, validation::Validate};
use donation_forecast::{
    CliConfig, ForecastService, LocalStorage, ReportEngine, ReportPipeline,
    RequestKind, Result,
};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting donation-forecast CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(&config).await {
        tracing::error!(
            "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );

        // structured body for callers, human text for the terminal
        println!("{}", serde_json::to_string_pretty(&e.to_response())?);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(config: &CliConfig) -> Result<()> {
    let source = config.event_source()?;

    if config.output_path.is_some() && config.kind != CliRequest::Years {
        let storage = LocalStorage::new(config.output_path().to_string());
        let pipeline = ReportPipeline::new(source, storage, config.clone());
        let engine = ReportEngine::new_with_monitoring(pipeline, config.monitor);

        let output_path = engine.run().await?;
        println!("✅ Report completed successfully!");
        println!("📁 Output saved to: {}", output_path);
        return Ok(());
    }

    let service = ForecastService::with_settings(source, config.settings());
    let body = match config.kind {
        CliRequest::Years => serde_json::to_string_pretty(&service.get_available_years().await?)?,
        CliRequest::Series => {
            let records = match config.granularity {
                Some(granularity) => service.get_series(config.year, granularity).await?,
                None => service.run(RequestKind::RawSeries, config.year).await?,
            };
            serde_json::to_string_pretty(&records)?
        }
        CliRequest::Trend => {
            serde_json::to_string_pretty(&service.run(RequestKind::TrendForecast, config.year).await?)?
        }
        CliRequest::Arima => {
            serde_json::to_string_pretty(&service.run(RequestKind::ArForecast, config.year).await?)?
        }
    };
    println!("{}", body);

    Ok(())
}
