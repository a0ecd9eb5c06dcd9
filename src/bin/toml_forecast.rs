use clap::Parser;
use donation_forecast::config::toml_config::{ForecastConfig, TomlConfig};
use donation_forecast::core::ConfigProvider;
use donation_forecast::utils::error::ErrorSeverity;
use donation_forecast::utils::{logger, validation::Validate};
use donation_forecast::{LocalStorage, ReportEngine, ReportPipeline};

#[derive(Parser)]
#[command(name = "toml-forecast")]
#[command(about = "Donation forecast reports driven by a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "forecast.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the year from config
    #[arg(long)]
    year: Option<i32>,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - show what would be computed without reading events
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based forecast report");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Some(year) = args.year {
        config
            .forecast
            .get_or_insert_with(ForecastConfig::default)
            .year = Some(year);
        tracing::info!("🔧 Year overridden to: {}", year);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No events will be read");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let source = config.event_source()?;
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = ReportPipeline::new(source, storage, config);
    let engine = ReportEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Forecast report completed successfully!");
            println!("✅ Forecast report completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Forecast report failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

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
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Report: {} v{}",
        config.report.name,
        config.report.version.as_deref().unwrap_or("0")
    );
    match config.source.r#type.as_str() {
        "http" => println!(
            "  Source: {}",
            config.source.endpoint.as_deref().unwrap_or_default()
        ),
        _ => println!(
            "  Source: {}",
            config.source.path.as_deref().unwrap_or_default()
        ),
    }
    println!(
        "  Year: {}",
        config
            .year()
            .map_or_else(|| "all".to_string(), |y| y.to_string())
    );
    println!("  Output: {}", config.output_path());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    let settings = config.settings();

    println!("🔍 Dry Run Analysis:");
    println!();

    println!("⚙️ Requests:");
    for kind in config.kinds() {
        let granularity =
            donation_forecast::core::orchestrator::granularity_for(kind, config.year());
        let horizon = match kind {
            donation_forecast::RequestKind::RawSeries => "observed range".to_string(),
            donation_forecast::RequestKind::TrendForecast => {
                format!("{} periods", settings.trend_horizon)
            }
            donation_forecast::RequestKind::ArForecast => format!(
                "{} periods, AR({}) d={} via {:?}",
                settings.ar_horizon, settings.ar_order, settings.diff_order, settings.estimator
            ),
        };
        println!("  {:?} ({:?}): {}", kind, granularity, horizon);
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    let formats: Vec<String> = config
        .output_formats()
        .iter()
        .map(|f| format!("{:?}", f).to_lowercase())
        .collect();
    println!("  Formats: {}", formats.join(", "));
    if let Some(bundle) = config.bundle_name() {
        println!("  Compression: {} (ZIP)", bundle);
    }
    println!(
        "  On model error: {}",
        if config.skip_failed_requests() { "skip" } else { "fail" }
    );

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
