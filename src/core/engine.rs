use crate::core::Pipeline;
use crate::domain::model::RunReport;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct FeedEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> FeedEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("Starting feed generation");
        self.monitor.log_stats("Start");

        // Extract
        let raw_data = self.pipeline.extract().await?;
        let locations = raw_data.len();
        self.monitor.log_stats("Extract");

        // Transform
        let update = self.pipeline.transform(raw_data).await?;
        let new_locations = update.new_exposures.len();
        let changed = update.changed;
        tracing::info!(
            "{} locations, {} new, changed: {}",
            locations,
            new_locations,
            changed
        );
        self.monitor.log_stats("Transform");

        // Load
        let written = self.pipeline.load(update).await?;
        for path in &written {
            tracing::info!("Wrote {}", path);
        }
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(RunReport {
            locations,
            new_locations,
            changed,
            written,
        })
    }
}
