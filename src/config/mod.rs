pub mod cli;
pub mod file;

pub use file::FileConfig;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ORIGINS: &str = "52806,46168,42307,60446,91730";
pub const DEFAULT_ZIP_COLUMN: &str = "To Zip";
pub const API_KEY_ENV_VAR: &str = "DISTANCE_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Free geocoder + local great-circle distance
    Geocode,
    /// Paid distance matrix with batched queries and durations
    Matrix,
    /// Geocoder + per-pair routing engine
    Routing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Xlsx,
}

#[cfg(feature = "cli")]
mod cli_config {
    use super::{OutputFormat, ProviderKind, API_KEY_ENV_VAR, DEFAULT_ORIGINS, DEFAULT_ZIP_COLUMN};
    use crate::core::ConfigProvider;
    use crate::utils::validation::{self, Validate};
    use crate::utils::error::Result;
    use clap::Parser;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "zipdist")]
    #[command(about = "Compute pairwise distances between origin and destination ZIP codes")]
    pub struct CliConfig {
        /// Load all settings from a TOML file instead of flags
        #[arg(long)]
        pub config: Option<String>,

        /// Destination table (CSV/TSV) containing the ZIP column
        #[arg(long, default_value = "ZIP.csv")]
        pub input: String,

        /// Output file for the result table
        #[arg(long, default_value = "zip_distances.csv")]
        pub output: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        pub format: OutputFormat,

        /// Name of the destination ZIP column in the input table
        #[arg(long, default_value = DEFAULT_ZIP_COLUMN)]
        pub zip_column: String,

        /// Comma-separated origin ZIP codes
        #[arg(long, default_value = DEFAULT_ORIGINS)]
        pub origins: String,

        #[arg(long, value_enum, default_value_t = ProviderKind::Geocode)]
        pub provider: ProviderKind,

        /// API key for providers that need one (falls back to $DISTANCE_API_KEY)
        #[arg(long)]
        pub api_key: Option<String>,

        /// Base URL override for the selected provider
        #[arg(long)]
        pub endpoint: Option<String>,

        /// Base URL override for the geocoder used by the routing provider
        #[arg(long)]
        pub geocode_endpoint: Option<String>,

        /// Minimum delay between consecutive remote calls
        #[arg(long, default_value = "1000")]
        pub rate_limit_ms: u64,

        /// Retry budget per lookup before a pair degrades to unknown
        #[arg(long, default_value = "2")]
        pub retries: u32,

        /// Destinations per distance-matrix request
        #[arg(long, default_value = "20")]
        pub batch_size: usize,

        /// Enable verbose output
        #[arg(long)]
        pub verbose: bool,
    }

    impl CliConfig {
        /// Flags win over the environment; the environment fallback is read
        /// once here so the rest of the run sees one configuration object.
        pub fn with_env_fallback(mut self) -> Self {
            if self.api_key.is_none() {
                self.api_key = std::env::var(API_KEY_ENV_VAR).ok();
            }
            self
        }
    }

    impl ConfigProvider for CliConfig {
        fn input_path(&self) -> &str {
            &self.input
        }

        fn output_path(&self) -> &str {
            &self.output
        }

        fn output_format(&self) -> OutputFormat {
            self.format
        }

        fn zip_column(&self) -> &str {
            &self.zip_column
        }

        fn origins(&self) -> &str {
            &self.origins
        }

        fn provider(&self) -> ProviderKind {
            self.provider
        }

        fn api_key(&self) -> Option<&str> {
            self.api_key.as_deref()
        }

        fn endpoint(&self) -> Option<&str> {
            self.endpoint.as_deref()
        }

        fn geocode_endpoint(&self) -> Option<&str> {
            self.geocode_endpoint.as_deref()
        }

        fn rate_limit_ms(&self) -> u64 {
            self.rate_limit_ms
        }

        fn retries(&self) -> u32 {
            self.retries
        }

        fn batch_size(&self) -> usize {
            self.batch_size
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_non_empty_string("input", &self.input)?;
            validation::validate_file_extension("input", &self.input, &["csv", "tsv", "txt"])?;
            validation::validate_path("output", &self.output)?;
            validation::validate_non_empty_string("zip_column", &self.zip_column)?;
            validation::validate_non_empty_string("origins", &self.origins)?;
            validation::validate_positive_number("batch_size", self.batch_size, 1)?;

            if let Some(endpoint) = &self.endpoint {
                validation::validate_url("endpoint", endpoint)?;
            }
            if let Some(endpoint) = &self.geocode_endpoint {
                validation::validate_url("geocode_endpoint", endpoint)?;
            }

            if self.provider == ProviderKind::Matrix && self.api_key().is_none() {
                return Err(crate::utils::error::PipelineError::MissingConfigError {
                    field: format!("api_key (or ${})", API_KEY_ENV_VAR),
                });
            }

            Ok(())
        }
    }

}

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;
