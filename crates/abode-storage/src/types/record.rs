//! The verification record aggregate and mutation parameter structs.

use abode_geo::{GeoPoint, RiskTier};
use chrono::{DateTime, Utc};

use super::{
    AdminId, DeclaredAddress, EmployeeId, EvidenceImages, OccupancyDetails, PropertyDetails,
    ReviewStatus, VerificationId, VerificationStatus,
};

/// One verification cycle for one employee.
///
/// Records are never hard-deleted; the latest record per employee is the
/// active one and earlier rows are retained as history. The captured
/// coordinates, distance metrics, risk tier and `verified_at` are cleared
/// together on re-verification and only written by a confirmation.
#[derive(Clone, Debug)]
pub struct VerificationRecord {
    pub id: VerificationId,
    pub employee_id: EmployeeId,
    pub address: DeclaredAddress,
    /// None on records from the legacy flat-address flow, which predates the
    /// structured property block.
    pub property: Option<PropertyDetails>,
    pub occupancy: Option<OccupancyDetails>,
    pub evidence: EvidenceImages,
    /// Window boundaries as "HH:MM" local wall-clock strings; the window may
    /// wrap past midnight (start > end).
    pub window_start: String,
    pub window_end: String,
    /// Geocoded expectation for the declared address; None when geocoding
    /// failed at submission time.
    pub expected: Option<GeoPoint>,
    /// GPS position reported by the employee at confirmation time.
    pub captured: Option<GeoPoint>,
    /// Great-circle distance between expected and captured, km, 2 decimals.
    pub distance_km: Option<f64>,
    /// Whether the distance exceeded the organizational threshold.
    pub distance_flagged: Option<bool>,
    /// Internal classification; never exposed to the employee.
    pub risk_tier: Option<RiskTier>,
    pub status: VerificationStatus,
    pub review_status: ReviewStatus,
    pub review_notes: Option<String>,
    pub reviewed_by: Option<AdminId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

/// Declared fields persisted by a submission.
///
/// A submission creates the employee's record or overwrites the active one;
/// the backend clears any stale GPS/derived state in the same write and moves
/// the record to `PENDING_VERIFICATION`.
#[derive(Clone, Debug)]
pub struct SubmissionParams {
    pub employee_id: EmployeeId,
    pub address: DeclaredAddress,
    /// None for the legacy flat-address flow.
    pub property: Option<PropertyDetails>,
    pub occupancy: Option<OccupancyDetails>,
    pub evidence: EvidenceImages,
    pub window_start: String,
    pub window_end: String,
    /// Best-effort geocode of the declared address.
    pub expected: Option<GeoPoint>,
}

/// GPS confirmation outcome persisted in one write.
///
/// Distance metrics and tier are None when the record has no expected
/// coordinates; the backend also resets the review status to `PENDING`.
#[derive(Clone, Debug)]
pub struct ConfirmationParams {
    pub captured: GeoPoint,
    pub distance_km: Option<f64>,
    pub distance_flagged: Option<bool>,
    pub risk_tier: Option<RiskTier>,
    pub verified_at: DateTime<Utc>,
}

/// Admin adjudication outcome.
#[derive(Clone, Debug)]
pub struct ReviewParams {
    pub status: ReviewStatus,
    pub notes: Option<String>,
    pub reviewed_by: AdminId,
    pub reviewed_at: DateTime<Utc>,
    /// Lifecycle status forced by the decision (rejection fails the record);
    /// None leaves the lifecycle status untouched.
    pub record_status: Option<VerificationStatus>,
}
