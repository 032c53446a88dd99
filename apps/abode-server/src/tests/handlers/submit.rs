//! Submission lifecycle tests.

use std::sync::Arc;

use abode_storage::{DeclaredAddress, Store, StoreError, VerificationStatus};

use super::super::common::*;
use crate::error::ApiError;
use crate::handlers::submit::{self, SubmitAddressRequest};

#[tokio::test]
async fn inspection_submission_creates_pending_record() {
    let server = create_test_server().await;
    let employee = test_employee();

    let response =
        submit::submit_inspection(&server, employee.clone(), inspection_form(), basic_upload())
            .await
            .unwrap();
    assert_eq!(response.status, "PENDING_VERIFICATION");
    assert_eq!(response.images_uploaded, 2);
    assert_eq!(response.window_start, "23:00");
    assert_eq!(response.window_end, "01:00");

    let record = server.store.get_active_verification(&employee).await.unwrap();
    assert_eq!(record.status, VerificationStatus::PendingVerification);
    assert_eq!(record.expected, Some(EXPECTED_POINT));
    assert!(record.evidence.front.is_some());
    assert!(record.evidence.street.is_some());
    assert!(record.evidence.gate.is_none());
    assert!(matches!(record.address, DeclaredAddress::Structured(_)));
    assert!(record.property.is_some());
    assert!(record.captured.is_none());
    assert!(record.risk_tier.is_none());
}

#[tokio::test]
async fn legacy_address_submission_creates_record_without_images() {
    let server = create_test_server().await;
    let employee = test_employee();

    let response = submit::submit_address(
        &server,
        employee.clone(),
        SubmitAddressRequest {
            street: "4 Marina Rd".to_string(),
            city: "Lagos Island".to_string(),
            state: "Lagos".to_string(),
            zip: Some("101001".to_string()),
            landmark: None,
            window_start: "22:00".to_string(),
            window_end: "23:30".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(response.status, "PENDING_VERIFICATION");
    assert_eq!(response.images_uploaded, 0);

    let record = server.store.get_active_verification(&employee).await.unwrap();
    assert!(matches!(record.address, DeclaredAddress::Legacy(_)));
    assert!(record.property.is_none());
    assert!(record.occupancy.is_none());
}

#[tokio::test]
async fn missing_required_field_is_rejected() {
    let server = create_test_server().await;
    let mut form = inspection_form();
    form.city = String::new();

    let err = submit::submit_inspection(&server, test_employee(), form, basic_upload())
        .await
        .unwrap_err();
    assert!(
        matches!(&err, ApiError::Validation(msg) if msg.contains("city")),
        "unexpected error: {}",
        err
    );
}

#[tokio::test]
async fn window_outside_catalogue_is_rejected() {
    let server = create_test_server().await;
    let mut form = inspection_form();
    form.window_start = "20:00".to_string();

    let err = submit::submit_inspection(&server, test_employee(), form, basic_upload())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    let mut form = inspection_form();
    form.window_start = "01:00".to_string();
    form.window_end = "23:00".to_string();
    let err = submit::submit_inspection(&server, test_employee(), form, basic_upload())
        .await
        .unwrap_err();
    assert!(
        matches!(&err, ApiError::Validation(msg) if msg.contains("end")),
        "unexpected error: {}",
        err
    );
}

#[tokio::test]
async fn verified_record_rejects_resubmission() {
    let server = create_test_server().await;
    let employee = test_employee();
    let record = submit_test_record(&server, &employee).await;
    confirm_test_record(&server, &record.id).await;

    // A perfectly valid payload still conflicts once the record is verified.
    let err =
        submit::submit_inspection(&server, employee.clone(), inspection_form(), basic_upload())
            .await
            .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)), "unexpected error: {}", err);

    let record = server.store.get_active_verification(&employee).await.unwrap();
    assert_eq!(record.status, VerificationStatus::Verified);
}

#[tokio::test]
async fn resubmission_overwrites_the_active_record() {
    let server = create_test_server().await;
    let employee = test_employee();
    submit_test_record(&server, &employee).await;

    let mut form = inspection_form();
    form.full_address = "7 Awolowo Way".to_string();
    submit::submit_inspection(&server, employee.clone(), form, basic_upload())
        .await
        .unwrap();

    let all = server.store.list_verifications(&employee).await.unwrap();
    assert_eq!(all.len(), 1, "resubmission must not create a second record");
    match &all[0].address {
        DeclaredAddress::Structured(a) => assert_eq!(a.full_address, "7 Awolowo Way"),
        other => panic!("unexpected address shape: {:?}", other),
    }
}

#[tokio::test]
async fn missing_gate_view_aborts_before_any_record_exists() {
    let server = create_test_server().await;
    let employee = test_employee();
    let mut form = inspection_form();
    form.has_gate = true;

    let err = submit::submit_inspection(&server, employee.clone(), form, basic_upload())
        .await
        .unwrap_err();
    assert!(
        matches!(&err, ApiError::Validation(msg) if msg.contains("gateView")),
        "unexpected error: {}",
        err
    );
    assert!(matches!(
        server.store.get_active_verification(&employee).await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn geocoding_failure_does_not_block_submission() {
    let server = create_test_server_with_failing_geocoder().await;
    let employee = test_employee();

    submit::submit_inspection(&server, employee.clone(), inspection_form(), basic_upload())
        .await
        .unwrap();

    let record = server.store.get_active_verification(&employee).await.unwrap();
    assert_eq!(record.status, VerificationStatus::PendingVerification);
    assert!(record.expected.is_none());
}

#[tokio::test]
async fn upload_failure_aborts_the_submission() {
    let server = create_test_server_with(
        Some(Arc::new(StubGeocoder {
            point: Some(EXPECTED_POINT),
        })),
        Arc::new(MemoryObjectStore::failing()),
    )
    .await;
    let employee = test_employee();

    let err =
        submit::submit_inspection(&server, employee.clone(), inspection_form(), basic_upload())
            .await
            .unwrap_err();
    assert!(matches!(err, ApiError::EvidenceUpload(_)));
    assert!(
        matches!(
            server.store.get_active_verification(&employee).await,
            Err(StoreError::NotFound)
        ),
        "no partial record may be persisted"
    );
}
