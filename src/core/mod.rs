pub mod autoregressive;
pub mod engine;
pub mod linalg;
pub mod orchestrator;
pub mod regularizer;
pub mod trend;

pub use crate::domain::model::{DonationEvent, ForecastReport, ReportSection, SeriesRecord};
pub use crate::domain::ports::{ConfigProvider, EventSource, Pipeline, Storage};
pub use crate::utils::error::Result;
