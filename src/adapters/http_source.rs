use crate::adapters::retain_year;
use crate::domain::model::DonationEvent;
use crate::domain::ports::EventSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Fetches events as a JSON array from an HTTP endpoint. A year filter is
/// passed as the `year` query parameter.
#[derive(Debug, Clone)]
pub struct HttpEventSource {
    client: Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl HttpEventSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    async fn fetch_events(&self, year: Option<i32>) -> Result<Vec<DonationEvent>> {
        let mut request = self.client.get(&self.endpoint);
        if let Some(year) = year {
            request = request.query(&[("year", year)]);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!("Making API request to: {}", self.endpoint);
        let response = request.send().await?.error_for_status()?;
        tracing::debug!("API response status: {}", response.status());

        let mut events: Vec<DonationEvent> = response.json().await?;
        // the endpoint may ignore the filter
        retain_year(&mut events, year);
        Ok(events)
    }
}
