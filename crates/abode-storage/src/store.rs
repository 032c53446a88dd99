//! The Store trait that backends implement.

use crate::types::*;
use crate::StoreError;

/// The storage trait the server depends on.
///
/// Every method that mutates a record returns the record as written, so
/// callers never read back a row they might race with.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Create a fresh verification record for an employee from a submission.
    /// The record is created in `PENDING_VERIFICATION` with review `PENDING`.
    async fn create_verification(
        &self,
        params: &SubmissionParams,
    ) -> Result<VerificationRecord, StoreError>;

    /// Overwrite the declared fields of an existing record from a repeat
    /// submission, clearing captured coordinates, distance metrics, risk
    /// tier and `verified_at`, and moving the record back to
    /// `PENDING_VERIFICATION`.
    async fn apply_submission(
        &self,
        id: &VerificationId,
        params: &SubmissionParams,
    ) -> Result<VerificationRecord, StoreError>;

    /// Get a record by ID.
    async fn get_verification(
        &self,
        id: &VerificationId,
    ) -> Result<VerificationRecord, StoreError>;

    /// Get the employee's active record (the most recently created one).
    async fn get_active_verification(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<VerificationRecord, StoreError>;

    /// List all of an employee's records, oldest first.
    async fn list_verifications(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<VerificationRecord>, StoreError>;

    /// Persist a GPS confirmation: captured coordinates, derived metrics,
    /// `verified_at`, status `VERIFIED`, review status reset to `PENDING`.
    async fn record_confirmation(
        &self,
        id: &VerificationId,
        params: &ConfirmationParams,
    ) -> Result<VerificationRecord, StoreError>;

    /// Clear GPS/derived state for a re-verification cycle: captured
    /// coordinates, distance metrics, risk tier and `verified_at` go null,
    /// status becomes `REVERIFICATION_REQUIRED`, review resets to `PENDING`.
    /// Declared fields and evidence are untouched.
    async fn reset_confirmation(
        &self,
        id: &VerificationId,
    ) -> Result<VerificationRecord, StoreError>;

    /// Persist an admin review decision.
    async fn record_review(
        &self,
        id: &VerificationId,
        params: &ReviewParams,
    ) -> Result<VerificationRecord, StoreError>;
}
