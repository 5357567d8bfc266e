use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

/// Runs a pipeline's extract, transform and load phases in order.
pub struct BatchEngine<P: Pipeline> {
    pipeline: P,
    timed: bool,
}

impl<P: Pipeline> BatchEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            timed: false,
        }
    }

    /// 開啟後每個階段都會記錄耗時
    pub fn new_with_monitoring(pipeline: P, timed: bool) -> Self {
        Self { pipeline, timed }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting BMI batch...");

        let phase = Instant::now();
        let records = self.pipeline.extract().await?;
        tracing::info!("Extracted {} measurement records", records.len());
        self.log_phase("extract", phase);

        let phase = Instant::now();
        let result = self.pipeline.transform(records).await?;
        tracing::info!(
            "Evaluated {} records ({} skipped for missing weight or height)",
            result.evaluated.len().saturating_sub(result.skipped),
            result.skipped
        );
        self.log_phase("transform", phase);

        let phase = Instant::now();
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.log_phase("load", phase);

        if self.timed {
            tracing::info!("📊 Total time: {:?}", started.elapsed());
        }
        Ok(output_path)
    }

    fn log_phase(&self, name: &str, started: Instant) {
        if self.timed {
            tracing::info!("📊 {} took {:?}", name, started.elapsed());
        }
    }
}
