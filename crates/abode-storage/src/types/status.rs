//! Lifecycle and adjudication status enums.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle state of a verification record.
///
/// `PendingAddress` is the initial state; there is no terminal state, since
/// an admin can always reopen a verified or failed record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    PendingAddress,
    PendingVerification,
    Verified,
    Failed,
    ReverificationRequired,
}

/// Error type for parsing VerificationStatus from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVerificationStatusError(pub String);

impl std::fmt::Display for ParseVerificationStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid verification status: {}", self.0)
    }
}

impl std::error::Error for ParseVerificationStatusError {}

impl FromStr for VerificationStatus {
    type Err = ParseVerificationStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING_ADDRESS" => Ok(VerificationStatus::PendingAddress),
            "PENDING_VERIFICATION" => Ok(VerificationStatus::PendingVerification),
            "VERIFIED" => Ok(VerificationStatus::Verified),
            "FAILED" => Ok(VerificationStatus::Failed),
            "REVERIFICATION_REQUIRED" => Ok(VerificationStatus::ReverificationRequired),
            _ => Err(ParseVerificationStatusError(s.to_string())),
        }
    }
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::PendingAddress => "PENDING_ADDRESS",
            VerificationStatus::PendingVerification => "PENDING_VERIFICATION",
            VerificationStatus::Verified => "VERIFIED",
            VerificationStatus::Failed => "FAILED",
            VerificationStatus::ReverificationRequired => "REVERIFICATION_REQUIRED",
        }
    }

    /// GPS confirmation is only legal from these states.
    pub fn allows_confirmation(&self) -> bool {
        matches!(
            self,
            VerificationStatus::PendingVerification | VerificationStatus::ReverificationRequired
        )
    }
}

/// Admin adjudication state of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

/// Error type for parsing ReviewStatus from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReviewStatusError(pub String);

impl std::fmt::Display for ParseReviewStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid review status: {}", self.0)
    }
}

impl std::error::Error for ParseReviewStatusError {}

impl FromStr for ReviewStatus {
    type Err = ParseReviewStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ReviewStatus::Pending),
            "APPROVED" => Ok(ReviewStatus::Approved),
            "REJECTED" => Ok(ReviewStatus::Rejected),
            _ => Err(ParseReviewStatusError(s.to_string())),
        }
    }
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "PENDING",
            ReviewStatus::Approved => "APPROVED",
            ReviewStatus::Rejected => "REJECTED",
        }
    }
}

/// A reviewer's verdict. Distinct from [`ReviewStatus`] so `PENDING` is not
/// an acceptable decision input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl ReviewDecision {
    pub fn as_review_status(&self) -> ReviewStatus {
        match self {
            ReviewDecision::Approved => ReviewStatus::Approved,
            ReviewDecision::Rejected => ReviewStatus::Rejected,
        }
    }
}
