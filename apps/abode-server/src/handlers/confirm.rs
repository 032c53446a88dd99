//! GPS confirmation handler.

use abode_events::VerificationEventKind;
use abode_geo::{
    classify_distance, distance_km, exceeds_threshold, parse_wall_clock, round_km, GeoPoint,
    Window,
};
use abode_storage::{ConfirmationParams, Store, VerificationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::server::AbodeServer;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmLocationRequest {
    pub latitude: f64,
    pub longitude: f64,
    /// Overrides the organization default when present.
    #[serde(default)]
    pub distance_threshold_km: Option<f64>,
    /// "HH:MM" on the reporter's own clock. The window check never falls
    /// back to the server clock: a window chosen in the reporter's timezone
    /// checked against server time only lines up at one instant a day.
    pub reporter_local_clock: String,
}

/// Employee-facing confirmation result. The internal risk tier is
/// deliberately absent; only the admin projection carries it.
#[derive(Debug, Serialize)]
pub struct ConfirmLocationResponse {
    pub id: String,
    pub status: String,
    pub verified_at: DateTime<Utc>,
    pub distance_km: Option<f64>,
    pub distance_flagged: Option<bool>,
}

pub async fn confirm_location(
    server: &AbodeServer,
    id: VerificationId,
    req: ConfirmLocationRequest,
) -> Result<ConfirmLocationResponse, ApiError> {
    if !(-90.0..=90.0).contains(&req.latitude) {
        return Err(ApiError::Validation(
            "latitude must be between -90 and 90".to_string(),
        ));
    }
    if !(-180.0..=180.0).contains(&req.longitude) {
        return Err(ApiError::Validation(
            "longitude must be between -180 and 180".to_string(),
        ));
    }
    if let Some(threshold) = req.distance_threshold_km {
        if threshold <= 0.0 {
            return Err(ApiError::Validation(
                "distanceThresholdKm must be positive".to_string(),
            ));
        }
    }
    let now = parse_wall_clock(&req.reporter_local_clock)
        .map_err(|e| ApiError::Validation(format!("reporterLocalClock: {}", e)))?;

    let record = server.store.get_verification(&id).await?;

    if !record.status.allows_confirmation() {
        return Err(ApiError::Policy(format!(
            "location cannot be confirmed while the record is {}",
            record.status.as_str()
        )));
    }

    let window = Window::parse(&record.window_start, &record.window_end)
        .map_err(|e| ApiError::Internal(format!("stored window is invalid: {}", e)))?;
    if !window.contains(now) {
        return Err(ApiError::Policy(format!(
            "confirmation is only allowed between {} and {}",
            record.window_start, record.window_end
        )));
    }

    let captured = GeoPoint::new(req.latitude, req.longitude);
    let threshold = req
        .distance_threshold_km
        .unwrap_or(server.config.distance_threshold_km);

    // Without a geocoded expectation there is nothing to measure against;
    // the record still verifies, it just carries no distance metrics.
    let (distance, flagged, tier) = match record.expected {
        Some(expected) => {
            let raw = distance_km(expected, captured);
            (
                Some(round_km(raw)),
                Some(exceeds_threshold(raw, threshold)),
                Some(classify_distance(raw).tier),
            )
        }
        None => (None, None, None),
    };

    let record = server
        .store
        .record_confirmation(
            &id,
            &ConfirmationParams {
                captured,
                distance_km: distance,
                distance_flagged: flagged,
                risk_tier: tier,
                verified_at: Utc::now(),
            },
        )
        .await?;
    server
        .publish_transition(&record, VerificationEventKind::Confirmed)
        .await;
    info!(
        "location confirmed for record {} (distance: {:?} km)",
        record.id.0, record.distance_km
    );

    let verified_at = record
        .verified_at
        .ok_or_else(|| ApiError::Internal("confirmation did not set verified_at".to_string()))?;

    Ok(ConfirmLocationResponse {
        id: record.id.0.to_string(),
        status: record.status.as_str().to_string(),
        verified_at,
        distance_km: record.distance_km,
        distance_flagged: record.distance_flagged,
    })
}
