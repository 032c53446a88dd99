//! Read projections: employee-facing and admin-facing views of a record.

use abode_geo::{classify_distance, GeoPoint};
use abode_storage::{
    DeclaredAddress, EmployeeId, EvidenceImages, OccupancyDetails, PropertyDetails, Store,
    VerificationId, VerificationRecord,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ApiError;
use crate::server::AbodeServer;

/// Employee-facing projection. Must never carry the internal risk tier or
/// its reason string.
#[derive(Debug, Serialize)]
pub struct VerificationView {
    pub id: String,
    pub status: String,
    pub address: String,
    pub landmark: Option<String>,
    pub window_start: String,
    pub window_end: String,
    pub images: EvidenceImages,
    pub distance_km: Option<f64>,
    pub distance_flagged: Option<bool>,
    pub verified_at: Option<DateTime<Utc>>,
    pub review_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VerificationView {
    pub fn from_record(record: &VerificationRecord) -> Self {
        Self {
            id: record.id.0.to_string(),
            status: record.status.as_str().to_string(),
            address: record.address.display_line(),
            landmark: record.address.landmark().map(str::to_string),
            window_start: record.window_start.clone(),
            window_end: record.window_end.clone(),
            images: record.evidence.clone(),
            distance_km: record.distance_km,
            distance_flagged: record.distance_flagged,
            verified_at: record.verified_at,
            review_status: record.review_status.as_str().to_string(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Admin projection: everything the employee view has, plus the internal
/// tier with its reason string, both coordinate pairs and the full declared
/// blocks.
#[derive(Debug, Serialize)]
pub struct AdminVerificationView {
    pub id: String,
    pub employee_id: String,
    pub status: String,
    pub address: DeclaredAddress,
    pub property: Option<PropertyDetails>,
    pub occupancy: Option<OccupancyDetails>,
    pub images: EvidenceImages,
    pub window_start: String,
    pub window_end: String,
    pub expected: Option<GeoPoint>,
    pub captured: Option<GeoPoint>,
    pub distance_km: Option<f64>,
    pub distance_flagged: Option<bool>,
    pub risk_tier: Option<String>,
    pub risk_reason: Option<String>,
    pub review_status: String,
    pub review_notes: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl AdminVerificationView {
    pub fn from_record(record: &VerificationRecord) -> Self {
        Self {
            id: record.id.0.to_string(),
            employee_id: record.employee_id.0.to_string(),
            status: record.status.as_str().to_string(),
            address: record.address.clone(),
            property: record.property.clone(),
            occupancy: record.occupancy.clone(),
            images: record.evidence.clone(),
            window_start: record.window_start.clone(),
            window_end: record.window_end.clone(),
            expected: record.expected,
            captured: record.captured,
            distance_km: record.distance_km,
            distance_flagged: record.distance_flagged,
            risk_tier: record.risk_tier.map(|t| t.as_str().to_string()),
            risk_reason: record.distance_km.map(|km| classify_distance(km).reason),
            review_status: record.review_status.as_str().to_string(),
            review_notes: record.review_notes.clone(),
            reviewed_by: record.reviewed_by.as_ref().map(|a| a.0.to_string()),
            reviewed_at: record.reviewed_at,
            created_at: record.created_at,
            updated_at: record.updated_at,
            verified_at: record.verified_at,
        }
    }
}

pub async fn get_record_view(
    server: &AbodeServer,
    id: VerificationId,
) -> Result<VerificationView, ApiError> {
    let record = server.store.get_verification(&id).await?;
    Ok(VerificationView::from_record(&record))
}

pub async fn get_admin_record_view(
    server: &AbodeServer,
    id: VerificationId,
) -> Result<AdminVerificationView, ApiError> {
    let record = server.store.get_verification(&id).await?;
    Ok(AdminVerificationView::from_record(&record))
}

/// Chronological history for one employee, oldest first.
pub async fn list_employee_records(
    server: &AbodeServer,
    employee_id: EmployeeId,
) -> Result<Vec<AdminVerificationView>, ApiError> {
    let records = server.store.list_verifications(&employee_id).await?;
    Ok(records.iter().map(AdminVerificationView::from_record).collect())
}
