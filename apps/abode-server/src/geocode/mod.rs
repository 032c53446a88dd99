//! Geocoding of declared addresses.
//!
//! Providers are best-effort: a failed lookup produces an outcome with no
//! coordinates and an error annotation for the logs, never an error the
//! lifecycle has to handle. A record without expected coordinates simply
//! skips distance computation until a later submission geocodes.

mod nominatim;

pub use nominatim::NominatimGeocoder;

use crate::config::GeocoderConfig;
use abode_geo::GeoPoint;
use async_trait::async_trait;
use thiserror::Error;

/// Outcome of a geocoding attempt.
#[derive(Clone, Debug, Default)]
pub struct GeocodeOutcome {
    pub point: Option<GeoPoint>,
    pub display_name: Option<String>,
    /// Why `point` is missing; log-only, never surfaced to the caller.
    pub error: Option<String>,
}

impl GeocodeOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            point: None,
            display_name: None,
            error: Some(error.into()),
        }
    }
}

/// Geocoder construction error (misconfigured provider, client build
/// failure). Lookup failures never produce errors.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("failed to initialize geocoder: {0}")]
    Init(String),
}

/// Trait for geocoding providers
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a display-line address to coordinates, absorbing provider
    /// failures into the outcome.
    async fn geocode(&self, address: &str) -> GeocodeOutcome;
}

/// Create a geocoder from configuration; `None` when geocoding is disabled.
pub fn create_geocoder(
    config: &GeocoderConfig,
) -> Result<Option<Box<dyn Geocoder>>, GeocodeError> {
    match config {
        GeocoderConfig::Disabled => Ok(None),
        GeocoderConfig::Nominatim {
            base_url,
            user_agent,
        } => Ok(Some(Box::new(NominatimGeocoder::new(
            base_url.clone(),
            user_agent.clone(),
        )?))),
    }
}
