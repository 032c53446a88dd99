//! Admin adjudication and re-verification tests.

use abode_storage::{AdminId, ReviewDecision, ReviewStatus, Store, VerificationStatus};
use uuid::Uuid;

use super::super::common::*;
use crate::error::ApiError;
use crate::handlers::review::{self, ReviewRequest};

fn test_admin() -> AdminId {
    AdminId(Uuid::now_v7())
}

#[tokio::test]
async fn review_before_confirmation_is_rejected() {
    let server = create_test_server().await;
    let employee = test_employee();
    let record = submit_test_record(&server, &employee).await;

    let err = review::review(
        &server,
        record.id.clone(),
        test_admin(),
        ReviewRequest {
            decision: ReviewDecision::Approved,
            notes: None,
        },
    )
    .await
    .unwrap_err();
    assert!(
        matches!(&err, ApiError::Policy(msg) if msg.contains("confirmed")),
        "unexpected error: {}",
        err
    );
}

#[tokio::test]
async fn approval_records_reviewer_and_keeps_the_record_verified() {
    let server = create_test_server().await;
    let employee = test_employee();
    let record = submit_test_record(&server, &employee).await;
    confirm_test_record(&server, &record.id).await;
    let admin = test_admin();

    let response = review::review(
        &server,
        record.id.clone(),
        admin.clone(),
        ReviewRequest {
            decision: ReviewDecision::Approved,
            notes: Some("matches the declared address".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(response.review_status, "APPROVED");
    assert_eq!(
        response.review_notes.as_deref(),
        Some("matches the declared address")
    );
    assert!(response.reviewed_at.is_some());

    let record = server.store.get_verification(&record.id).await.unwrap();
    assert_eq!(record.status, VerificationStatus::Verified);
    assert_eq!(record.review_status, ReviewStatus::Approved);
    assert_eq!(record.reviewed_by, Some(admin));
}

#[tokio::test]
async fn rejection_forces_the_record_to_failed() {
    let server = create_test_server().await;
    let employee = test_employee();
    let record = submit_test_record(&server, &employee).await;
    confirm_test_record(&server, &record.id).await;

    let response = review::review(
        &server,
        record.id.clone(),
        test_admin(),
        ReviewRequest {
            decision: ReviewDecision::Rejected,
            notes: Some("capture too far from the address".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(response.review_status, "REJECTED");

    let record = server.store.get_verification(&record.id).await.unwrap();
    assert_eq!(record.status, VerificationStatus::Failed);
    assert_eq!(record.review_status, ReviewStatus::Rejected);
}

#[tokio::test]
async fn reverification_clears_gps_state_but_preserves_declared_fields() {
    let server = create_test_server().await;
    let employee = test_employee();
    let before = submit_test_record(&server, &employee).await;
    confirm_test_record(&server, &before.id).await;

    let response = review::request_reverification(&server, before.id.clone())
        .await
        .unwrap();
    assert_eq!(response.status, "REVERIFICATION_REQUIRED");

    let after = server.store.get_verification(&before.id).await.unwrap();
    assert_eq!(after.status, VerificationStatus::ReverificationRequired);
    assert!(after.captured.is_none());
    assert!(after.distance_km.is_none());
    assert!(after.distance_flagged.is_none());
    assert!(after.risk_tier.is_none());
    assert!(after.verified_at.is_none());
    assert_eq!(after.review_status, ReviewStatus::Pending);
    // Declared address and evidence survive untouched.
    assert_eq!(after.address, before.address);
    assert_eq!(after.evidence, before.evidence);
    assert_eq!(after.expected, before.expected);
}

#[tokio::test]
async fn reverified_record_can_be_confirmed_again() {
    let server = create_test_server().await;
    let employee = test_employee();
    let record = submit_test_record(&server, &employee).await;
    confirm_test_record(&server, &record.id).await;
    review::request_reverification(&server, record.id.clone())
        .await
        .unwrap();

    let response = confirm_test_record(&server, &record.id).await;
    assert_eq!(response.status, "VERIFIED");
}

#[tokio::test]
async fn reverification_requires_a_verified_record() {
    let server = create_test_server().await;
    let employee = test_employee();
    let record = submit_test_record(&server, &employee).await;

    let err = review::request_reverification(&server, record.id.clone())
        .await
        .unwrap_err();
    assert!(
        matches!(&err, ApiError::Policy(msg) if msg.contains("verified")),
        "unexpected error: {}",
        err
    );
}
