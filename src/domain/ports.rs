use crate::config::{OutputFormat, ProviderKind};
use crate::domain::model::{DistancePair, Leg, PostalCode, ZipInputs};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_format(&self) -> OutputFormat;
    fn zip_column(&self) -> &str;
    fn origins(&self) -> &str;
    fn provider(&self) -> ProviderKind;
    fn api_key(&self) -> Option<&str>;
    fn endpoint(&self) -> Option<&str>;
    fn geocode_endpoint(&self) -> Option<&str>;
    fn rate_limit_ms(&self) -> u64;
    fn retries(&self) -> u32;
    fn batch_size(&self) -> usize;
}

/// Capability set shared by the interchangeable distance backends. A call
/// covers one origin and a slice of destinations; implementations that have
/// no native batching report `batch_size() == 1` and receive one destination
/// per call.
///
/// Lookup failures are absorbed here: `resolve_batch` always returns one
/// `Leg` per destination, degraded to `Leg::unknown()` for entries the
/// backend could not resolve. Only fatal configuration errors abort a run,
/// and those are raised before the first remote call.
#[async_trait]
pub trait DistanceProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn batch_size(&self) -> usize {
        1
    }

    async fn resolve_batch(&self, origin: &PostalCode, destinations: &[PostalCode]) -> Vec<Leg>;
}

/// Receives `completed/total` after every unit of work (one pair or one
/// batch) for display by an external collaborator.
pub trait ProgressSink: Send + Sync {
    fn report(&self, completed: usize, total: usize);
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ZipInputs>;
    async fn transform(&self, inputs: ZipInputs) -> Result<Vec<DistancePair>>;
    async fn load(&self, rows: Vec<DistancePair>) -> Result<String>;
}
