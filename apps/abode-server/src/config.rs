//! Server configuration module.
//!
//! Supports configuration via environment variables:
//!
//! ```bash
//! # Organization defaults
//! ABODE_DISTANCE_THRESHOLD_KM=1.0
//!
//! # Geocoder: nominatim (default) or disabled
//! ABODE_GEOCODER=nominatim
//! ABODE_GEOCODER_URL=https://nominatim.openstreetmap.org/search
//! ABODE_GEOCODER_USER_AGENT="abode-server (ops@example.com)"
//!
//! # Evidence storage
//! ABODE_EVIDENCE_STORE=filesystem
//! ABODE_EVIDENCE_ROOT=/var/lib/abode/evidence
//! ABODE_EVIDENCE_BASE_URL=https://evidence.example.com
//! ```

use abode_geo::DEFAULT_THRESHOLD_KM;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";
const DEFAULT_GEOCODER_USER_AGENT: &str = "abode-server";
const DEFAULT_EVIDENCE_ROOT: &str = "./evidence-data";
const DEFAULT_EVIDENCE_BASE_URL: &str = "/evidence";

/// Server configuration, resolved once at startup and passed down per
/// request. There is no module-level mutable state.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Organization-wide distance threshold; callers may override per
    /// confirmation.
    pub distance_threshold_km: f64,
    pub geocoder: GeocoderConfig,
    pub evidence: EvidenceStoreConfig,
}

/// Geocoding provider configuration
#[derive(Debug, Clone)]
pub enum GeocoderConfig {
    /// No geocoding; submissions never get expected coordinates.
    Disabled,
    /// Nominatim-style search endpoint.
    Nominatim { base_url: String, user_agent: String },
}

/// Evidence object-store configuration
#[derive(Debug, Clone)]
pub enum EvidenceStoreConfig {
    /// Server-local directory; references are formed against `base_url`.
    Filesystem { root: PathBuf, base_url: String },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid geocoder: {0}. Expected 'nominatim' or 'disabled'")]
    InvalidGeocoder(String),

    #[error("Invalid evidence store: {0}. Expected 'filesystem'")]
    InvalidEvidenceStore(String),

    #[error("Invalid distance threshold: {0}")]
    InvalidThreshold(String),
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            distance_threshold_km: DEFAULT_THRESHOLD_KM,
            geocoder: GeocoderConfig::Disabled,
            evidence: EvidenceStoreConfig::Filesystem {
                root: PathBuf::from(DEFAULT_EVIDENCE_ROOT),
                base_url: DEFAULT_EVIDENCE_BASE_URL.to_string(),
            },
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let distance_threshold_km = match env::var("ABODE_DISTANCE_THRESHOLD_KM") {
            Ok(raw) => {
                let parsed: f64 = raw
                    .parse()
                    .map_err(|_| ConfigError::InvalidThreshold(raw.clone()))?;
                if parsed <= 0.0 {
                    return Err(ConfigError::InvalidThreshold(raw));
                }
                parsed
            }
            Err(_) => DEFAULT_THRESHOLD_KM,
        };

        let geocoder = match env::var("ABODE_GEOCODER").as_deref() {
            Err(_) | Ok("nominatim") => GeocoderConfig::Nominatim {
                base_url: env::var("ABODE_GEOCODER_URL")
                    .unwrap_or_else(|_| DEFAULT_GEOCODER_URL.to_string()),
                user_agent: env::var("ABODE_GEOCODER_USER_AGENT")
                    .unwrap_or_else(|_| DEFAULT_GEOCODER_USER_AGENT.to_string()),
            },
            Ok("disabled") => GeocoderConfig::Disabled,
            Ok(other) => return Err(ConfigError::InvalidGeocoder(other.to_string())),
        };

        let evidence = match env::var("ABODE_EVIDENCE_STORE").as_deref() {
            Err(_) | Ok("filesystem") => EvidenceStoreConfig::Filesystem {
                root: PathBuf::from(
                    env::var("ABODE_EVIDENCE_ROOT")
                        .unwrap_or_else(|_| DEFAULT_EVIDENCE_ROOT.to_string()),
                ),
                base_url: env::var("ABODE_EVIDENCE_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_EVIDENCE_BASE_URL.to_string()),
            },
            Ok(other) => return Err(ConfigError::InvalidEvidenceStore(other.to_string())),
        };

        Ok(Self {
            distance_threshold_km,
            geocoder,
            evidence,
        })
    }
}
