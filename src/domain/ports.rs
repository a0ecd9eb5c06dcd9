use crate::domain::model::{
    DonationEvent, ForecastReport, ForecastSettings, OutputFormat, RequestKind,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Datelike;
use std::collections::BTreeSet;

/// Read-only supplier of donation events.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Events for `year`, or every event when `year` is `None`.
    async fn fetch_events(&self, year: Option<i32>) -> Result<Vec<DonationEvent>>;

    /// Distinct years that have at least one event, ascending.
    async fn available_years(&self) -> Result<Vec<i32>> {
        let events = self.fetch_events(None).await?;
        let years: BTreeSet<i32> = events.iter().map(|e| e.date.year()).collect();
        Ok(years.into_iter().collect())
    }
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn settings(&self) -> ForecastSettings;
    fn year(&self) -> Option<i32>;
    fn kinds(&self) -> Vec<RequestKind>;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> Vec<OutputFormat>;
    /// Zip bundle file name when output should be compressed.
    fn bundle_name(&self) -> Option<&str>;
    /// Keep going when a single request fails with a data or model error.
    fn skip_failed_requests(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<DonationEvent>>;
    async fn transform(&self, events: Vec<DonationEvent>) -> Result<ForecastReport>;
    async fn load(&self, report: ForecastReport) -> Result<String>;
}
