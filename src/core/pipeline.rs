use crate::config::OutputFormat;
use crate::core::distance::round_miles;
use crate::core::{export, input};
use crate::core::{ConfigProvider, DistancePair, DistanceProvider, Pipeline, ProgressSink, Storage, ZipInputs};
use crate::utils::error::{PipelineError, Result};
use std::sync::Arc;

/// Logs `completed/total` through tracing; the default sink when no UI
/// collaborator is attached.
pub struct TraceProgress;

impl ProgressSink for TraceProgress {
    fn report(&self, completed: usize, total: usize) {
        tracing::info!("progress: {}/{}", completed, total);
    }
}

pub struct DistancePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    provider: Box<dyn DistanceProvider>,
    progress: Arc<dyn ProgressSink>,
}

impl<S: Storage, C: ConfigProvider> DistancePipeline<S, C> {
    pub fn new(storage: S, config: C, provider: Box<dyn DistanceProvider>) -> Self {
        Self {
            storage,
            config,
            provider,
            progress: Arc::new(TraceProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DistancePipeline<S, C> {
    async fn extract(&self) -> Result<ZipInputs> {
        let origins = input::parse_origin_spec(self.config.origins());
        if origins.is_empty() {
            return Err(PipelineError::ConfigError {
                message: format!("no valid origin ZIP codes in '{}'", self.config.origins()),
            });
        }

        tracing::debug!("Reading destination table: {}", self.config.input_path());
        let bytes = self.storage.read_file(self.config.input_path()).await?;
        let destinations = input::parse_destination_table(&bytes, self.config.zip_column())?;
        if destinations.is_empty() {
            tracing::warn!(
                "No usable ZIP codes in column '{}' of {}",
                self.config.zip_column(),
                self.config.input_path()
            );
        }

        Ok(ZipInputs {
            origins,
            destinations,
        })
    }

    async fn transform(&self, inputs: ZipInputs) -> Result<Vec<DistancePair>> {
        let total = inputs.pair_count();
        let chunk_size = self.provider.batch_size().max(1);
        let mut rows = Vec::with_capacity(total);
        let mut completed = 0;

        for origin in &inputs.origins {
            for batch in inputs.destinations.chunks(chunk_size) {
                let mut legs = self.provider.resolve_batch(origin, batch).await.into_iter();
                for destination in batch {
                    // A well-behaved provider returns one leg per destination;
                    // anything short degrades to unknown.
                    let leg = legs.next().unwrap_or_default();
                    rows.push(DistancePair {
                        origin: origin.clone(),
                        destination: destination.clone(),
                        miles: leg.miles.map(round_miles),
                        duration: leg.duration,
                    });
                }
                completed += batch.len();
                self.progress.report(completed, total);
            }
        }

        Ok(rows)
    }

    async fn load(&self, rows: Vec<DistancePair>) -> Result<String> {
        let bytes = match self.config.output_format() {
            OutputFormat::Csv => export::to_csv(&rows)?,
            OutputFormat::Xlsx => export::to_xlsx(&rows)?,
        };

        tracing::debug!(
            "Writing {} result rows ({} bytes) to {}",
            rows.len(),
            bytes.len(),
            self.config.output_path()
        );
        self.storage
            .write_file(self.config.output_path(), &bytes)
            .await?;

        Ok(self.config.output_path().to_string())
    }
}
