use crate::adapters::retain_year;
use crate::domain::model::DonationEvent;
use crate::domain::ports::EventSource;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Event source over events already in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventSource {
    events: Vec<DonationEvent>,
}

impl InMemoryEventSource {
    pub fn new(events: Vec<DonationEvent>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl EventSource for InMemoryEventSource {
    async fn fetch_events(&self, year: Option<i32>) -> Result<Vec<DonationEvent>> {
        let mut events = self.events.clone();
        retain_year(&mut events, year);
        Ok(events)
    }
}
