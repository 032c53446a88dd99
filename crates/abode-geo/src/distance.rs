//! Great-circle distance and risk-tier classification.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Mean earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Organization-wide default distance threshold in kilometres.
pub const DEFAULT_THRESHOLD_KM: f64 = 1.0;

/// Tier boundaries, in metres.
const VERIFIED_MAX_M: f64 = 100.0;
const REVIEW_MAX_M: f64 = 500.0;

/// A coordinate pair in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Haversine great-circle distance between two points, in kilometres.
///
/// Unrounded; use [`round_km`] for the 2-decimal value that gets stored and
/// reported.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Round a distance to the 2-decimal kilometre precision used in records and
/// responses.
pub fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

/// Whether a distance exceeds the organizational threshold. Drives the
/// lightweight admin triage flag, independent of the three-tier
/// classification.
pub fn exceeds_threshold(km: f64, threshold_km: f64) -> bool {
    km > threshold_km
}

/// Internal risk tier derived from capture distance.
///
/// Admin-only: employee-facing projections must never carry this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Verified,
    Review,
    Flagged,
}

/// Error type for parsing RiskTier from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRiskTierError(pub String);

impl std::fmt::Display for ParseRiskTierError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid risk tier: {}", self.0)
    }
}

impl std::error::Error for ParseRiskTierError {}

impl FromStr for RiskTier {
    type Err = ParseRiskTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "verified" => Ok(RiskTier::Verified),
            "review" => Ok(RiskTier::Review),
            "flagged" => Ok(RiskTier::Flagged),
            _ => Err(ParseRiskTierError(s.to_string())),
        }
    }
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Verified => "verified",
            RiskTier::Review => "review",
            RiskTier::Flagged => "flagged",
        }
    }
}

/// A tier plus the human-readable reason shown to reviewers.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceAssessment {
    pub tier: RiskTier,
    pub reason: String,
}

/// Classify a capture distance into a risk tier.
///
/// Operates on the distance in metres, rounded to the nearest metre, so the
/// tier is a deterministic function of distance alone.
pub fn classify_distance(km: f64) -> DistanceAssessment {
    let metres = (km * 1000.0).round();
    if metres <= VERIFIED_MAX_M {
        DistanceAssessment {
            tier: RiskTier::Verified,
            reason: format!("captured location is {} m from the declared address", metres),
        }
    } else if metres <= REVIEW_MAX_M {
        DistanceAssessment {
            tier: RiskTier::Review,
            reason: format!(
                "captured location is {} m from the declared address; manual review recommended",
                metres
            ),
        }
    } else {
        DistanceAssessment {
            tier: RiskTier::Flagged,
            reason: format!(
                "captured location is {} m from the declared address; outside the acceptable range",
                metres
            ),
        }
    }
}
