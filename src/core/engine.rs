use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct ReportEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ReportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting forecast report");
        self.monitor.log_stats("Start");

        let events = self.pipeline.extract().await?;
        tracing::info!("Extracted {} donation events", events.len());
        self.monitor.log_stats("Extract");

        let report = self.pipeline.transform(events).await?;
        tracing::info!(
            "Computed {} report sections ({} failed)",
            report.sections.len(),
            report.sections.iter().filter(|s| s.error.is_some()).count()
        );
        self.monitor.log_stats("Transform");

        let output_path = self.pipeline.load(report).await?;
        tracing::info!("Report saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
