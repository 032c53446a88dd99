//! Nominatim-style search endpoint provider.

use super::{GeocodeError, GeocodeOutcome, Geocoder};
use abode_geo::GeoPoint;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One search hit; Nominatim serializes coordinates as strings.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}

/// Geocoder backed by a Nominatim-compatible `/search` endpoint.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: String, user_agent: String) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GeocodeError::Init(e.to_string()))?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> GeocodeOutcome {
        let response = match self
            .client
            .get(&self.base_url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return GeocodeOutcome::failed(format!("request failed: {}", e)),
        };

        if !response.status().is_success() {
            return GeocodeOutcome::failed(format!("provider returned {}", response.status()));
        }

        let hits: Vec<SearchHit> = match response.json().await {
            Ok(hits) => hits,
            Err(e) => return GeocodeOutcome::failed(format!("invalid response body: {}", e)),
        };

        let Some(hit) = hits.into_iter().next() else {
            return GeocodeOutcome::failed("no results for address");
        };

        let (lat, lon) = match (hit.lat.parse::<f64>(), hit.lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) => (lat, lon),
            _ => return GeocodeOutcome::failed("provider returned unparseable coordinates"),
        };

        GeocodeOutcome {
            point: Some(GeoPoint::new(lat, lon)),
            display_name: Some(hit.display_name),
            error: None,
        }
    }
}
