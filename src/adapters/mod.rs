// Adapters layer: concrete backends behind the DistanceProvider port.

pub mod geocode;
pub mod matrix;
pub mod routing;
pub mod throttle;

pub use geocode::{GeocodeClient, GeocodeHaversine};
pub use matrix::DistanceMatrix;
pub use routing::RoutingEngine;
pub use throttle::Throttle;

use crate::config::ProviderKind;
use crate::domain::ports::{ConfigProvider, DistanceProvider};
use crate::utils::error::{PipelineError, Result};

pub const NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org";
pub const DISTANCE_MATRIX_ENDPOINT: &str = "https://maps.googleapis.com";
pub const OSRM_ENDPOINT: &str = "https://router.project-osrm.org";

/// Build the configured backend. The matrix provider needs its API key up
/// front; a missing key halts the run before any remote call is made.
pub fn build_provider<C: ConfigProvider>(config: &C) -> Result<Box<dyn DistanceProvider>> {
    let rate_limit_ms = config.rate_limit_ms();
    let retries = config.retries();

    match config.provider() {
        ProviderKind::Geocode => {
            let endpoint = config.endpoint().unwrap_or(NOMINATIM_ENDPOINT);
            let geocoder = GeocodeClient::new(endpoint, rate_limit_ms, retries);
            Ok(Box::new(GeocodeHaversine::new(geocoder)))
        }
        ProviderKind::Matrix => {
            let api_key = config.api_key().ok_or_else(|| PipelineError::ConfigError {
                message: "the distance matrix provider requires an API key".to_string(),
            })?;
            let endpoint = config.endpoint().unwrap_or(DISTANCE_MATRIX_ENDPOINT);
            Ok(Box::new(DistanceMatrix::new(
                endpoint,
                api_key,
                config.batch_size(),
                rate_limit_ms,
                retries,
            )))
        }
        ProviderKind::Routing => {
            let geocoder = GeocodeClient::new(
                config.geocode_endpoint().unwrap_or(NOMINATIM_ENDPOINT),
                rate_limit_ms,
                retries,
            );
            let endpoint = config.endpoint().unwrap_or(OSRM_ENDPOINT);
            Ok(Box::new(RoutingEngine::new(
                geocoder,
                endpoint,
                rate_limit_ms,
                retries,
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    struct TestConfig {
        provider: ProviderKind,
        api_key: Option<String>,
    }

    impl TestConfig {
        fn new(provider: ProviderKind) -> Self {
            Self {
                provider,
                api_key: None,
            }
        }

        fn with_key(mut self, key: &str) -> Self {
            self.api_key = Some(key.to_string());
            self
        }
    }

    impl ConfigProvider for TestConfig {
        fn input_path(&self) -> &str {
            "destinations.csv"
        }

        fn output_path(&self) -> &str {
            "distances.csv"
        }

        fn output_format(&self) -> OutputFormat {
            OutputFormat::Csv
        }

        fn zip_column(&self) -> &str {
            "To Zip"
        }

        fn origins(&self) -> &str {
            "42307"
        }

        fn provider(&self) -> ProviderKind {
            self.provider
        }

        fn api_key(&self) -> Option<&str> {
            self.api_key.as_deref()
        }

        fn endpoint(&self) -> Option<&str> {
            None
        }

        fn geocode_endpoint(&self) -> Option<&str> {
            None
        }

        fn rate_limit_ms(&self) -> u64 {
            0
        }

        fn retries(&self) -> u32 {
            2
        }

        fn batch_size(&self) -> usize {
            20
        }
    }

    #[test]
    fn test_build_provider_selects_backend_by_kind() {
        let geocode = build_provider(&TestConfig::new(ProviderKind::Geocode)).unwrap();
        assert_eq!(geocode.name(), "geocode-haversine");
        assert_eq!(geocode.batch_size(), 1);

        let matrix =
            build_provider(&TestConfig::new(ProviderKind::Matrix).with_key("test-key")).unwrap();
        assert_eq!(matrix.name(), "distance-matrix");
        assert_eq!(matrix.batch_size(), 20);

        let routing = build_provider(&TestConfig::new(ProviderKind::Routing)).unwrap();
        assert_eq!(routing.name(), "routing");
        assert_eq!(routing.batch_size(), 1);
    }

    #[test]
    fn test_build_provider_requires_matrix_key() {
        let err = match build_provider(&TestConfig::new(ProviderKind::Matrix)) {
            Ok(_) => panic!("expected build_provider to fail without a matrix key"),
            Err(e) => e,
        };
        assert!(matches!(err, PipelineError::ConfigError { .. }));
    }
}
