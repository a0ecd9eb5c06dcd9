use crate::adapters::retain_year;
use crate::domain::model::DonationEvent;
use crate::domain::ports::EventSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Reads events from a CSV export with `date` and `quantity` headers.
/// Other columns are ignored.
#[derive(Debug, Clone)]
pub struct CsvEventSource {
    path: PathBuf,
}

impl CsvEventSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn parse(data: &[u8]) -> Result<Vec<DonationEvent>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data);
        let mut events = Vec::new();
        for row in reader.deserialize::<DonationEvent>() {
            events.push(row?);
        }
        Ok(events)
    }
}

#[async_trait]
impl EventSource for CsvEventSource {
    async fn fetch_events(&self, year: Option<i32>) -> Result<Vec<DonationEvent>> {
        tracing::debug!("Reading donation events from {}", self.path.display());
        let data = tokio::fs::read(&self.path).await?;
        let mut events = Self::parse(&data)?;
        retain_year(&mut events, year);
        Ok(events)
    }
}
