pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{CsvEventSource, HttpEventSource, InMemoryEventSource, LocalStorage};
pub use app::pipelines::ReportPipeline;
pub use crate::core::{engine::ReportEngine, orchestrator::ForecastService};
pub use domain::model::{DonationEvent, Granularity, RequestKind, SeriesRecord};
pub use utils::error::{ForecastError, Result};
