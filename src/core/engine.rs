use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct DistanceEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> DistanceEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting distance run...");

        let inputs = self.pipeline.extract().await?;
        tracing::info!(
            "Resolved {} origins x {} destinations ({} pairs)",
            inputs.origins.len(),
            inputs.destinations.len(),
            inputs.pair_count()
        );

        let rows = self.pipeline.transform(inputs).await?;
        tracing::info!("Computed {} distance pairs", rows.len());

        let output_path = self.pipeline.load(rows).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}
