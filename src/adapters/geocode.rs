use crate::adapters::throttle::Throttle;
use crate::core::distance::haversine_miles;
use crate::domain::model::{Coordinate, Leg, PostalCode};
use crate::domain::ports::DistanceProvider;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// One hit from a Nominatim-style search response. Coordinates arrive as
/// strings.
#[derive(Debug, Deserialize)]
struct GeocodeHit {
    lat: String,
    lon: String,
}

/// Postal-code geocoding over a Nominatim-style endpoint, with throttling,
/// bounded retries, and a per-run memoization cache shared by every pair
/// that touches the same ZIP.
pub struct GeocodeClient {
    client: reqwest::Client,
    endpoint: String,
    throttle: Throttle,
    retries: u32,
    cache: Mutex<HashMap<PostalCode, Option<Coordinate>>>,
}

impl GeocodeClient {
    pub fn new(endpoint: impl Into<String>, rate_limit_ms: u64, retries: u32) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("zipdist/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            endpoint: endpoint.into(),
            throttle: Throttle::from_millis(rate_limit_ms),
            retries,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a ZIP to a coordinate, memoized for the run. Negative results
    /// are cached too: a code that exhausted its retry budget stays unknown
    /// for the remainder of the run.
    pub async fn coordinate(&self, code: &PostalCode) -> Option<Coordinate> {
        if let Some(cached) = self.cache.lock().await.get(code) {
            return *cached;
        }

        let resolved = self.lookup_with_retry(code).await;
        self.cache.lock().await.insert(code.clone(), resolved);
        resolved
    }

    async fn lookup_with_retry(&self, code: &PostalCode) -> Option<Coordinate> {
        for attempt in 0..=self.retries {
            self.throttle.wait().await;
            match self.lookup(code).await {
                // A definitive empty result is not a transient failure; do
                // not spend retries on it.
                Ok(hit) => return hit,
                Err(e) => {
                    tracing::warn!(
                        "Geocode lookup for {} failed (attempt {}): {}",
                        code,
                        attempt + 1,
                        e
                    );
                }
            }
        }
        None
    }

    async fn lookup(&self, code: &PostalCode) -> Result<Option<Coordinate>> {
        let response = self
            .client
            .get(format!("{}/search", self.endpoint))
            .query(&[
                ("postalcode", code.as_str()),
                ("country", "us"),
                ("format", "jsonv2"),
                ("limit", "1"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let hits: Vec<GeocodeHit> = response.json().await?;
        Ok(hits.first().and_then(|hit| {
            Some(Coordinate {
                lat: hit.lat.parse().ok()?,
                lon: hit.lon.parse().ok()?,
            })
        }))
    }
}

/// Free-geocoder backend: coordinates from the geocoding endpoint, distances
/// computed locally with the great-circle formula. A pair degrades to
/// unknown unless both endpoints geocode.
pub struct GeocodeHaversine {
    geocoder: GeocodeClient,
}

impl GeocodeHaversine {
    pub fn new(geocoder: GeocodeClient) -> Self {
        Self { geocoder }
    }
}

#[async_trait]
impl DistanceProvider for GeocodeHaversine {
    fn name(&self) -> &'static str {
        "geocode-haversine"
    }

    async fn resolve_batch(&self, origin: &PostalCode, destinations: &[PostalCode]) -> Vec<Leg> {
        let from = self.geocoder.coordinate(origin).await;

        let mut legs = Vec::with_capacity(destinations.len());
        for destination in destinations {
            let leg = match (from, self.geocoder.coordinate(destination).await) {
                (Some(a), Some(b)) => Leg {
                    miles: Some(haversine_miles(a, b)),
                    duration: None,
                },
                _ => Leg::unknown(),
            };
            legs.push(leg);
        }
        legs
    }
}
