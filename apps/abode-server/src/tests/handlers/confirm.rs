//! GPS confirmation tests: window enforcement, status gating, distance
//! metrics and the withheld risk tier.

use abode_geo::RiskTier;
use abode_storage::{Store, VerificationStatus};

use super::super::common::*;
use crate::error::ApiError;
use crate::handlers::confirm::{self, ConfirmLocationRequest};

fn request_at(clock: &str) -> ConfirmLocationRequest {
    ConfirmLocationRequest {
        latitude: EXPECTED_POINT.lat + 0.0002,
        longitude: EXPECTED_POINT.lon + 0.0002,
        distance_threshold_km: None,
        reporter_local_clock: clock.to_string(),
    }
}

#[tokio::test]
async fn confirmation_inside_window_verifies_the_record() {
    let server = create_test_server().await;
    let employee = test_employee();
    let record = submit_test_record(&server, &employee).await;

    let response = confirm::confirm_location(&server, record.id.clone(), request_at("23:30"))
        .await
        .unwrap();
    assert_eq!(response.status, "VERIFIED");
    assert!(response.distance_km.unwrap() < 0.1);
    assert_eq!(response.distance_flagged, Some(false));

    let record = server.store.get_verification(&record.id).await.unwrap();
    assert_eq!(record.status, VerificationStatus::Verified);
    assert!(record.verified_at.is_some());
    assert!(record.captured.is_some());
    assert_eq!(record.risk_tier, Some(RiskTier::Verified));
}

#[tokio::test]
async fn confirmation_outside_window_is_rejected() {
    let server = create_test_server().await;
    let employee = test_employee();
    let record = submit_test_record(&server, &employee).await;

    // Stored window is 23:00-01:00, wrapping midnight.
    let err = confirm::confirm_location(&server, record.id.clone(), request_at("12:00"))
        .await
        .unwrap_err();
    assert!(
        matches!(&err, ApiError::Policy(msg) if msg.contains("23:00") && msg.contains("01:00")),
        "unexpected error: {}",
        err
    );

    let record = server.store.get_verification(&record.id).await.unwrap();
    assert_eq!(record.status, VerificationStatus::PendingVerification);
    assert!(record.verified_at.is_none());
}

#[tokio::test]
async fn window_boundaries_are_inclusive() {
    let server = create_test_server().await;

    // One minute before the start is rejected; the boundary itself passes.
    let employee = test_employee();
    let record = submit_test_record(&server, &employee).await;
    let err = confirm::confirm_location(&server, record.id.clone(), request_at("22:59"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Policy(_)));
    confirm::confirm_location(&server, record.id.clone(), request_at("23:00"))
        .await
        .unwrap();

    // Same at the wrapped end boundary.
    let employee = test_employee();
    let record = submit_test_record(&server, &employee).await;
    let err = confirm::confirm_location(&server, record.id.clone(), request_at("01:01"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Policy(_)));
    confirm::confirm_location(&server, record.id.clone(), request_at("01:00"))
        .await
        .unwrap();
}

#[tokio::test]
async fn already_verified_record_rejects_confirmation() {
    let server = create_test_server().await;
    let employee = test_employee();
    let record = submit_test_record(&server, &employee).await;
    confirm_test_record(&server, &record.id).await;

    let err = confirm::confirm_location(&server, record.id.clone(), request_at("23:30"))
        .await
        .unwrap_err();
    assert!(
        matches!(&err, ApiError::Policy(msg) if msg.contains("VERIFIED")),
        "unexpected error: {}",
        err
    );
}

#[tokio::test]
async fn unknown_record_is_not_found() {
    let server = create_test_server().await;
    let missing = abode_storage::VerificationId(uuid::Uuid::now_v7());

    let err = confirm::confirm_location(&server, missing, request_at("23:30"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn confirmation_without_expected_coordinates_skips_metrics() {
    let server = create_test_server_with_failing_geocoder().await;
    let employee = test_employee();
    let record = submit_test_record(&server, &employee).await;
    assert!(record.expected.is_none());

    let response = confirm::confirm_location(&server, record.id.clone(), request_at("23:30"))
        .await
        .unwrap();
    assert_eq!(response.status, "VERIFIED");
    assert_eq!(response.distance_km, None);
    assert_eq!(response.distance_flagged, None);

    let record = server.store.get_verification(&record.id).await.unwrap();
    assert!(record.verified_at.is_some());
    assert!(record.distance_km.is_none());
    assert!(record.risk_tier.is_none());
}

#[tokio::test]
async fn distant_capture_is_flagged_and_tiered_but_tier_stays_internal() {
    let server = create_test_server().await;
    let employee = test_employee();
    let record = submit_test_record(&server, &employee).await;

    // ~1.2 km north of the expected point, against the 1.0 km default.
    let response = confirm::confirm_location(
        &server,
        record.id.clone(),
        ConfirmLocationRequest {
            latitude: EXPECTED_POINT.lat + 0.0108,
            longitude: EXPECTED_POINT.lon,
            distance_threshold_km: None,
            reporter_local_clock: "23:30".to_string(),
        },
    )
    .await
    .unwrap();

    let distance = response.distance_km.unwrap();
    assert!(distance > 1.0 && distance < 1.4, "distance: {}", distance);
    assert_eq!(response.distance_flagged, Some(true));

    // The employee-facing response carries no tier in any form.
    let body = serde_json::to_value(&response).unwrap();
    let keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
    assert!(
        !keys.iter().any(|k| k.to_lowercase().contains("tier")),
        "tier leaked into the response: {:?}",
        keys
    );

    let record = server.store.get_verification(&record.id).await.unwrap();
    assert_eq!(record.risk_tier, Some(RiskTier::Flagged));
}

#[tokio::test]
async fn caller_supplied_threshold_overrides_the_default() {
    let server = create_test_server().await;
    let employee = test_employee();
    let record = submit_test_record(&server, &employee).await;

    let response = confirm::confirm_location(
        &server,
        record.id.clone(),
        ConfirmLocationRequest {
            latitude: EXPECTED_POINT.lat + 0.0108,
            longitude: EXPECTED_POINT.lon,
            distance_threshold_km: Some(2.0),
            reporter_local_clock: "23:30".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(response.distance_flagged, Some(false));

    // The three-tier classification is independent of the triage threshold.
    let record = server.store.get_verification(&record.id).await.unwrap();
    assert_eq!(record.risk_tier, Some(RiskTier::Flagged));
}

#[tokio::test]
async fn malformed_inputs_are_rejected() {
    let server = create_test_server().await;
    let employee = test_employee();
    let record = submit_test_record(&server, &employee).await;

    let mut req = request_at("23:30");
    req.latitude = 91.0;
    let err = confirm::confirm_location(&server, record.id.clone(), req)
        .await
        .unwrap_err();
    assert!(matches!(&err, ApiError::Validation(msg) if msg.contains("latitude")));

    let err = confirm::confirm_location(&server, record.id.clone(), request_at("25:99"))
        .await
        .unwrap_err();
    assert!(matches!(&err, ApiError::Validation(msg) if msg.contains("reporterLocalClock")));

    let mut req = request_at("23:30");
    req.distance_threshold_km = Some(0.0);
    let err = confirm::confirm_location(&server, record.id.clone(), req)
        .await
        .unwrap_err();
    assert!(matches!(&err, ApiError::Validation(msg) if msg.contains("distanceThresholdKm")));
}
