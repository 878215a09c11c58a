use crate::config::{OutputFormat, ProviderKind, DEFAULT_ORIGINS, DEFAULT_ZIP_COLUMN};
use crate::core::ConfigProvider;
use crate::utils::error::{PipelineError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// TOML run configuration, the file-based alternative to CLI flags.
/// `${VAR}` references are replaced from the environment before parsing, so
/// credentials stay out of the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub input: InputConfig,
    pub provider: ProviderConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
    pub zip_column: Option<String>,
    pub origins: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub geocode_endpoint: Option<String>,
    pub rate_limit_ms: Option<u64>,
    pub retries: Option<u32>,
    pub batch_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub format: Option<OutputFormat>,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PipelineError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| PipelineError::InvalidConfigValueError {
            field: "toml_parsing".to_string(),
            value: String::new(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR_NAME}` references with values from the environment.
    /// Unset variables are left as-is so validation can report them.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").expect("static env-var pattern");

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}

impl ConfigProvider for FileConfig {
    fn input_path(&self) -> &str {
        &self.input.path
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_format(&self) -> OutputFormat {
        self.output.format.unwrap_or(OutputFormat::Csv)
    }

    fn zip_column(&self) -> &str {
        self.input.zip_column.as_deref().unwrap_or(DEFAULT_ZIP_COLUMN)
    }

    fn origins(&self) -> &str {
        self.input.origins.as_deref().unwrap_or(DEFAULT_ORIGINS)
    }

    fn provider(&self) -> ProviderKind {
        self.provider.kind
    }

    fn api_key(&self) -> Option<&str> {
        // An unresolved ${VAR} placeholder is not a usable key.
        self.provider
            .api_key
            .as_deref()
            .filter(|key| !key.starts_with("${"))
    }

    fn endpoint(&self) -> Option<&str> {
        self.provider.endpoint.as_deref()
    }

    fn geocode_endpoint(&self) -> Option<&str> {
        self.provider.geocode_endpoint.as_deref()
    }

    fn rate_limit_ms(&self) -> u64 {
        self.provider.rate_limit_ms.unwrap_or(1000)
    }

    fn retries(&self) -> u32 {
        self.provider.retries.unwrap_or(2)
    }

    fn batch_size(&self) -> usize {
        self.provider.batch_size.unwrap_or(20)
    }
}

impl Validate for FileConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("input.path", &self.input.path)?;
        validation::validate_file_extension("input.path", &self.input.path, &["csv", "tsv", "txt"])?;
        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_positive_number("provider.batch_size", self.batch_size(), 1)?;

        if let Some(endpoint) = self.endpoint() {
            validation::validate_url("provider.endpoint", endpoint)?;
        }
        if let Some(endpoint) = self.geocode_endpoint() {
            validation::validate_url("provider.geocode_endpoint", endpoint)?;
        }

        if self.provider.kind == ProviderKind::Matrix && self.api_key().is_none() {
            return Err(PipelineError::MissingConfigError {
                field: "provider.api_key".to_string(),
            });
        }

        Ok(())
    }
}
