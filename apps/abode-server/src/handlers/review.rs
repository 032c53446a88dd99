//! Admin adjudication handlers: review and re-verification.

use abode_events::VerificationEventKind;
use abode_storage::{AdminId, ReviewDecision, ReviewParams, Store, VerificationId, VerificationStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::server::AbodeServer;

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub review_status: String,
    pub review_notes: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ReverifyResponse {
    pub id: String,
    pub status: String,
}

pub async fn review(
    server: &AbodeServer,
    id: VerificationId,
    admin: AdminId,
    req: ReviewRequest,
) -> Result<ReviewResponse, ApiError> {
    let record = server.store.get_verification(&id).await?;

    // A record that has never been GPS-confirmed has nothing to adjudicate.
    if record.verified_at.is_none() {
        return Err(ApiError::Policy(
            "record cannot be reviewed before its location has been confirmed".to_string(),
        ));
    }

    let params = ReviewParams {
        status: req.decision.as_review_status(),
        notes: req.notes,
        reviewed_by: admin.clone(),
        reviewed_at: Utc::now(),
        record_status: match req.decision {
            ReviewDecision::Rejected => Some(VerificationStatus::Failed),
            ReviewDecision::Approved => None,
        },
    };
    let record = server.store.record_review(&id, &params).await?;
    server
        .publish_transition(&record, VerificationEventKind::Reviewed)
        .await;
    info!(
        "record {} reviewed as {} by {}",
        record.id.0,
        record.review_status.as_str(),
        admin.0
    );

    Ok(ReviewResponse {
        id: record.id.0.to_string(),
        review_status: record.review_status.as_str().to_string(),
        review_notes: record.review_notes,
        reviewed_at: record.reviewed_at,
    })
}

pub async fn request_reverification(
    server: &AbodeServer,
    id: VerificationId,
) -> Result<ReverifyResponse, ApiError> {
    let record = server.store.get_verification(&id).await?;

    if record.status != VerificationStatus::Verified {
        return Err(ApiError::Policy(format!(
            "re-verification can only be requested for a verified record, not {}",
            record.status.as_str()
        )));
    }

    // Only GPS state resets; the declared address and evidence stay.
    let record = server.store.reset_confirmation(&id).await?;
    server
        .publish_transition(&record, VerificationEventKind::ReverificationRequested)
        .await;
    info!("re-verification requested for record {}", record.id.0);

    Ok(ReverifyResponse {
        id: record.id.0.to_string(),
        status: record.status.as_str().to_string(),
    })
}
