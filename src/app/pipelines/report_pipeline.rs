use crate::core::orchestrator::{compute, granularity_for};
use crate::core::{
    ConfigProvider, DonationEvent, EventSource, ForecastReport, Pipeline, ReportSection,
    SeriesRecord, Storage,
};
use crate::domain::model::{OutputFormat, RequestKind};
use crate::utils::error::{ErrorCategory, ErrorResponse, ForecastError, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use zip::write::{SimpleFileOptions, ZipWriter};

const SUMMARY_FILE: &str = "summary.json";

/// Reads events once, computes every configured request from them and
/// writes one file per request and format plus a summary.
pub struct ReportPipeline<E: EventSource, S: Storage, C: ConfigProvider> {
    source: E,
    storage: S,
    config: C,
}

impl<E: EventSource, S: Storage, C: ConfigProvider> ReportPipeline<E, S, C> {
    pub fn new(source: E, storage: S, config: C) -> Self {
        Self {
            source,
            storage,
            config,
        }
    }

    fn render(&self, report: &ForecastReport) -> Result<Vec<(String, Vec<u8>)>> {
        let mut files = Vec::new();
        for section in &report.sections {
            let Some(records) = &section.records else {
                continue;
            };
            for format in self.config.output_formats() {
                let file = match format {
                    OutputFormat::Json => (
                        format!("{}.json", section.kind.slug()),
                        serde_json::to_vec_pretty(records)?,
                    ),
                    OutputFormat::Csv => (
                        format!("{}.csv", section.kind.slug()),
                        records_to_csv(records)?,
                    ),
                };
                files.push(file);
            }
        }
        files.push((
            SUMMARY_FILE.to_string(),
            serde_json::to_vec_pretty(&ReportSummary::from(report))?,
        ));
        Ok(files)
    }
}

#[async_trait::async_trait]
impl<E: EventSource, S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<E, S, C> {
    async fn extract(&self) -> Result<Vec<DonationEvent>> {
        let year = self.config.year();
        tracing::info!(
            "📥 Fetching donation events for {}",
            year.map_or_else(|| "all years".to_string(), |y| y.to_string())
        );
        self.source.fetch_events(year).await
    }

    async fn transform(&self, events: Vec<DonationEvent>) -> Result<ForecastReport> {
        let year = self.config.year();
        let settings = self.config.settings();
        let skip_failed = self.config.skip_failed_requests();

        let mut sections = Vec::new();
        for kind in self.config.kinds() {
            let granularity = granularity_for(kind, year);
            match compute(kind, year, granularity, &events, &settings) {
                Ok(records) => {
                    tracing::debug!("{:?}: {} records", kind, records.len());
                    sections.push(ReportSection {
                        kind,
                        records: Some(records),
                        error: None,
                    });
                }
                Err(e) if skip_failed && is_request_error(&e) => {
                    tracing::warn!("⚠️ Skipping {:?}: {}", kind, e);
                    sections.push(ReportSection {
                        kind,
                        records: None,
                        error: Some(e.to_response()),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(ForecastReport {
            year,
            event_count: events.len(),
            available_years: self.source.available_years().await?,
            sections,
        })
    }

    async fn load(&self, report: ForecastReport) -> Result<String> {
        let files = self.render(&report)?;
        let base = Path::new(self.config.output_path());

        if let Some(bundle) = self.config.bundle_name() {
            tracing::debug!("Creating ZIP bundle with {} files", files.len());
            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, data) in &files {
                    zip.start_file(name.as_str(), SimpleFileOptions::default())?;
                    zip.write_all(data)?;
                }
                zip.finish()?.into_inner()
            };
            self.storage.write_file(bundle, &zip_data).await?;
            return Ok(base.join(bundle).display().to_string());
        }

        for (name, data) in &files {
            tracing::debug!("Writing {} ({} bytes)", name, data.len());
            self.storage.write_file(name, data).await?;
        }
        Ok(base.display().to_string())
    }
}

/// Failures that belong to one request rather than to the whole run.
fn is_request_error(error: &ForecastError) -> bool {
    matches!(error.category(), ErrorCategory::Data | ErrorCategory::Model)
}

pub fn records_to_csv(records: &[SeriesRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| ForecastError::ProcessingError {
            message: format!("failed to flush CSV output: {}", e),
        })
}

#[derive(Debug, Serialize)]
struct ReportSummary {
    year: Option<i32>,
    event_count: usize,
    available_years: Vec<i32>,
    sections: Vec<SectionSummary>,
}

#[derive(Debug, Serialize)]
struct SectionSummary {
    kind: RequestKind,
    points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorResponse>,
}

impl From<&ForecastReport> for ReportSummary {
    fn from(report: &ForecastReport) -> Self {
        Self {
            year: report.year,
            event_count: report.event_count,
            available_years: report.available_years.clone(),
            sections: report
                .sections
                .iter()
                .map(|s| SectionSummary {
                    kind: s.kind,
                    points: s.records.as_ref().map_or(0, |r| r.len()),
                    error: s.error.clone(),
                })
                .collect(),
        }
    }
}
