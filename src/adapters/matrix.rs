use crate::adapters::throttle::Throttle;
use crate::domain::model::{Leg, PostalCode};
use crate::domain::ports::DistanceProvider;
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use serde::Deserialize;

pub const METERS_PER_MILE: f64 = 1609.344;

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<MatrixValue>,
    duration: Option<MatrixValue>,
}

/// Distance values arrive in meters, durations in seconds; both carry a
/// human-readable text form.
#[derive(Debug, Deserialize)]
struct MatrixValue {
    value: f64,
    text: String,
}

/// Paid distance-matrix backend: one remote call covers one origin and up to
/// `batch` destinations, returning routed distance and a display duration
/// per element.
pub struct DistanceMatrix {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    batch: usize,
    throttle: Throttle,
    retries: u32,
}

impl DistanceMatrix {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        batch: usize,
        rate_limit_ms: u64,
        retries: u32,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            batch,
            throttle: Throttle::from_millis(rate_limit_ms),
            retries,
        }
    }

    async fn query(&self, origin: &PostalCode, destinations: &[PostalCode]) -> Result<Vec<Leg>> {
        let joined = destinations
            .iter()
            .map(PostalCode::as_str)
            .collect::<Vec<_>>()
            .join("|");

        let response = self
            .client
            .get(format!("{}/maps/api/distancematrix/json", self.endpoint))
            .query(&[
                ("origins", origin.as_str()),
                ("destinations", joined.as_str()),
                ("units", "imperial"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let payload: MatrixResponse = response.json().await?;
        if payload.status != "OK" {
            return Err(PipelineError::ProcessingError {
                message: format!("distance matrix returned status {}", payload.status),
            });
        }

        let row = payload
            .rows
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::ProcessingError {
                message: "distance matrix returned no rows".to_string(),
            })?;

        Ok(row
            .elements
            .into_iter()
            .map(|element| {
                if element.status == "OK" {
                    Leg {
                        miles: element.distance.map(|d| d.value / METERS_PER_MILE),
                        duration: element.duration.map(|d| d.text),
                    }
                } else {
                    Leg::unknown()
                }
            })
            .collect())
    }
}

#[async_trait]
impl DistanceProvider for DistanceMatrix {
    fn name(&self) -> &'static str {
        "distance-matrix"
    }

    fn batch_size(&self) -> usize {
        self.batch
    }

    async fn resolve_batch(&self, origin: &PostalCode, destinations: &[PostalCode]) -> Vec<Leg> {
        for attempt in 0..=self.retries {
            self.throttle.wait().await;
            match self.query(origin, destinations).await {
                Ok(mut legs) => {
                    legs.resize(destinations.len(), Leg::unknown());
                    return legs;
                }
                Err(e) => {
                    tracing::warn!(
                        "Distance matrix call for {} ({} destinations) failed (attempt {}): {}",
                        origin,
                        destinations.len(),
                        attempt + 1,
                        e
                    );
                }
            }
        }
        vec![Leg::unknown(); destinations.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn zip(code: &str) -> PostalCode {
        PostalCode::parse(code).unwrap()
    }

    fn matrix_body() -> serde_json::Value {
        serde_json::json!({
            "status": "OK",
            "rows": [{
                "elements": [
                    {
                        "status": "OK",
                        "distance": {"value": 160934.4, "text": "100 mi"},
                        "duration": {"value": 5400.0, "text": "1 hour 30 mins"}
                    },
                    {"status": "NOT_FOUND"}
                ]
            }]
        })
    }

    #[tokio::test]
    async fn test_resolve_batch_joins_destinations_and_converts_units() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/maps/api/distancematrix/json")
                .query_param("origins", "42307")
                .query_param("destinations", "42301|99999")
                .query_param("units", "imperial")
                .query_param("key", "test-key");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(matrix_body());
        });

        let provider = DistanceMatrix::new(server.base_url(), "test-key", 20, 0, 2);
        let legs = provider
            .resolve_batch(&zip("42307"), &[zip("42301"), zip("99999")])
            .await;

        api_mock.assert();
        assert_eq!(legs.len(), 2);
        assert!((legs[0].miles.unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(legs[0].duration.as_deref(), Some("1 hour 30 mins"));
        assert_eq!(legs[1], Leg::unknown());
    }

    #[tokio::test]
    async fn test_denied_response_degrades_batch_after_retries() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/maps/api/distancematrix/json");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"status": "REQUEST_DENIED", "rows": []}));
        });

        let provider = DistanceMatrix::new(server.base_url(), "bad-key", 20, 0, 1);
        let legs = provider
            .resolve_batch(&zip("42307"), &[zip("42301"), zip("60446")])
            .await;

        api_mock.assert_hits(2);
        assert_eq!(legs, vec![Leg::unknown(), Leg::unknown()]);
    }

    #[tokio::test]
    async fn test_short_element_list_pads_with_unknown() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/maps/api/distancematrix/json");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "status": "OK",
                    "rows": [{"elements": [
                        {"status": "OK", "distance": {"value": 16093.44, "text": "10 mi"}}
                    ]}]
                }));
        });

        let provider = DistanceMatrix::new(server.base_url(), "test-key", 20, 0, 0);
        let legs = provider
            .resolve_batch(&zip("42307"), &[zip("42301"), zip("60446")])
            .await;

        assert_eq!(legs.len(), 2);
        assert!((legs[0].miles.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(legs[0].duration, None);
        assert_eq!(legs[1], Leg::unknown());
    }
}
