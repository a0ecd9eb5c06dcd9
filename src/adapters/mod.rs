// Adapters layer: concrete implementations for external systems (event sources, storage).

pub mod csv_source;
pub mod http_source;
pub mod memory;
pub mod storage;

pub use csv_source::CsvEventSource;
pub use http_source::HttpEventSource;
pub use memory::InMemoryEventSource;
pub use storage::LocalStorage;

use crate::domain::model::DonationEvent;
use crate::domain::ports::EventSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Datelike;

pub(crate) fn retain_year(events: &mut Vec<DonationEvent>, year: Option<i32>) {
    if let Some(year) = year {
        events.retain(|e| e.date.year() == year);
    }
}

/// Source chosen at runtime from configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredSource {
    Csv(CsvEventSource),
    Http(HttpEventSource),
}

#[async_trait]
impl EventSource for ConfiguredSource {
    async fn fetch_events(&self, year: Option<i32>) -> Result<Vec<DonationEvent>> {
        match self {
            ConfiguredSource::Csv(source) => source.fetch_events(year).await,
            ConfiguredSource::Http(source) => source.fetch_events(year).await,
        }
    }
}
