pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, FileConfig, OutputFormat, ProviderKind};

pub use core::{engine::DistanceEngine, pipeline::DistancePipeline};
pub use domain::model::{Coordinate, DistancePair, PostalCode};
pub use utils::error::{PipelineError, Result};
