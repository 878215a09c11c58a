use crate::adapters::geocode::GeocodeClient;
use crate::adapters::matrix::METERS_PER_MILE;
use crate::adapters::throttle::Throttle;
use crate::domain::model::{Coordinate, Leg, PostalCode};
use crate::domain::ports::DistanceProvider;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    distance: f64,
}

/// Routing-engine backend: geocodes both endpoints through the shared
/// geocoding client, then asks an OSRM-style route service for the driving
/// distance. The route service reports meters and makes no duration
/// guarantee, so legs carry distance only.
pub struct RoutingEngine {
    geocoder: GeocodeClient,
    client: reqwest::Client,
    endpoint: String,
    throttle: Throttle,
    retries: u32,
}

impl RoutingEngine {
    pub fn new(
        geocoder: GeocodeClient,
        endpoint: impl Into<String>,
        rate_limit_ms: u64,
        retries: u32,
    ) -> Self {
        Self {
            geocoder,
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            throttle: Throttle::from_millis(rate_limit_ms),
            retries,
        }
    }

    async fn route_with_retry(&self, from: Coordinate, to: Coordinate) -> Option<f64> {
        for attempt in 0..=self.retries {
            self.throttle.wait().await;
            match self.route_miles(from, to).await {
                // "no route found" is definitive, not transient
                Ok(miles) => return miles,
                Err(e) => {
                    tracing::warn!("Route query failed (attempt {}): {}", attempt + 1, e);
                }
            }
        }
        None
    }

    async fn route_miles(&self, from: Coordinate, to: Coordinate) -> Result<Option<f64>> {
        let url = format!(
            "{}/route/v1/driving/{:.6},{:.6};{:.6},{:.6}",
            self.endpoint, from.lon, from.lat, to.lon, to.lat
        );
        let response = self
            .client
            .get(url)
            .query(&[("overview", "false")])
            .send()
            .await?
            .error_for_status()?;

        let payload: RouteResponse = response.json().await?;
        if payload.code != "Ok" {
            return Ok(None);
        }
        Ok(payload
            .routes
            .first()
            .map(|route| route.distance / METERS_PER_MILE))
    }
}

#[async_trait]
impl DistanceProvider for RoutingEngine {
    fn name(&self) -> &'static str {
        "routing"
    }

    async fn resolve_batch(&self, origin: &PostalCode, destinations: &[PostalCode]) -> Vec<Leg> {
        let from = self.geocoder.coordinate(origin).await;

        let mut legs = Vec::with_capacity(destinations.len());
        for destination in destinations {
            let leg = match (from, self.geocoder.coordinate(destination).await) {
                (Some(a), Some(b)) => Leg {
                    miles: self.route_with_retry(a, b).await,
                    duration: None,
                },
                _ => Leg::unknown(),
            };
            legs.push(leg);
        }
        legs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn zip(code: &str) -> PostalCode {
        PostalCode::parse(code).unwrap()
    }

    fn mock_geocoder(server: &MockServer) -> GeocodeClient {
        server.mock(|when, then| {
            when.method(GET)
                .path("/search")
                .query_param("postalcode", "42307");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([{"lat": "37.5034", "lon": "-86.8530"}]));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/search")
                .query_param("postalcode", "42301");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([{"lat": "37.7719", "lon": "-87.1112"}]));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/search")
                .query_param("postalcode", "99999");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([]));
        });
        GeocodeClient::new(server.base_url(), 0, 2)
    }

    #[tokio::test]
    async fn test_resolve_batch_routes_between_geocoded_points() {
        let server = MockServer::start();
        let geocoder = mock_geocoder(&server);

        let route_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/route/v1/driving/-86.853000,37.503400;-87.111200,37.771900")
                .query_param("overview", "false");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "code": "Ok",
                    "routes": [{"distance": 48280.32, "duration": 1800.0}]
                }));
        });

        let provider = RoutingEngine::new(geocoder, server.base_url(), 0, 2);
        let legs = provider.resolve_batch(&zip("42307"), &[zip("42301")]).await;

        route_mock.assert();
        assert_eq!(legs.len(), 1);
        assert!((legs[0].miles.unwrap() - 30.0).abs() < 1e-9);
        assert_eq!(legs[0].duration, None);
    }

    #[tokio::test]
    async fn test_unresolvable_destination_skips_route_call() {
        let server = MockServer::start();
        let geocoder = mock_geocoder(&server);

        let route_mock = server.mock(|when, then| {
            when.method(GET).path_contains("/route/v1/driving/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"code": "Ok", "routes": []}));
        });

        let provider = RoutingEngine::new(geocoder, server.base_url(), 0, 2);
        let legs = provider.resolve_batch(&zip("42307"), &[zip("99999")]).await;

        route_mock.assert_hits(0);
        assert_eq!(legs, vec![Leg::unknown()]);
    }

    #[tokio::test]
    async fn test_no_route_is_not_retried() {
        let server = MockServer::start();
        let geocoder = mock_geocoder(&server);

        let route_mock = server.mock(|when, then| {
            when.method(GET).path_contains("/route/v1/driving/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"code": "NoRoute", "routes": []}));
        });

        let provider = RoutingEngine::new(geocoder, server.base_url(), 0, 2);
        let legs = provider.resolve_batch(&zip("42307"), &[zip("42301")]).await;

        route_mock.assert_hits(1);
        assert_eq!(legs, vec![Leg::unknown()]);
    }
}
