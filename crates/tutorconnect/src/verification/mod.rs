//! Educator verification: the status state machine and the simulated registry.
//!
//! ```text
//! NotStarted -> Pending -> Verified
//!                       -> Rejected -> Pending (resubmission)
//! ```
//!
//! `Verified` is terminal except through an admin override.

mod registry;

pub use registry::{
    lookup, LookupOutcome, VerificationSubmission, MATCH_MESSAGE, MIN_REGISTRATION_LENGTH,
    NO_MATCH_MESSAGE,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{VerificationState, VerificationStatus};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("This account is already verified")]
    AlreadyVerified,

    #[error("A verification request is already pending")]
    AlreadyPending,

    #[error("No verification request is pending")]
    NotPending,

    #[error("Verification status can only be overridden to VERIFIED or REJECTED, not {0:?}")]
    InvalidOverrideTarget(VerificationStatus),
}

/// Checks the submission has both fields before anything changes.
pub fn validate_submission(submission: &VerificationSubmission) -> Result<(), VerificationError> {
    if submission.sace_number.trim().is_empty() {
        return Err(VerificationError::MissingField("sace_number"));
    }
    if submission.id_number.trim().is_empty() {
        return Err(VerificationError::MissingField("id_number"));
    }
    Ok(())
}

/// `NotStarted | Rejected -> Pending`. The previous rejection reason is dropped.
pub fn begin_submission(state: &VerificationState) -> Result<VerificationState, VerificationError> {
    match state.status {
        VerificationStatus::NotStarted | VerificationStatus::Rejected => {
            Ok(VerificationState::new(VerificationStatus::Pending))
        }
        VerificationStatus::Pending => Err(VerificationError::AlreadyPending),
        VerificationStatus::Verified => Err(VerificationError::AlreadyVerified),
    }
}

/// `Pending -> Verified | Rejected` from a registry lookup.
pub fn resolve(
    state: &VerificationState,
    outcome: &LookupOutcome,
) -> Result<VerificationState, VerificationError> {
    if state.status != VerificationStatus::Pending {
        return Err(VerificationError::NotPending);
    }

    Ok(if outcome.success {
        VerificationState::new(VerificationStatus::Verified)
    } else {
        VerificationState {
            status: VerificationStatus::Rejected,
            reason: Some(outcome.message.clone()),
        }
    })
}

/// `Pending -> previous` when the lookup never resolved.
pub fn withdraw(
    state: &VerificationState,
    previous: &VerificationState,
) -> Result<VerificationState, VerificationError> {
    if state.status != VerificationStatus::Pending {
        return Err(VerificationError::NotPending);
    }
    Ok(previous.clone())
}

/// Manual admin decision. Bypasses the lookup and works from any state.
pub fn override_status(target: VerificationStatus) -> Result<VerificationState, VerificationError> {
    match target {
        VerificationStatus::Verified => Ok(VerificationState::new(VerificationStatus::Verified)),
        VerificationStatus::Rejected => Ok(VerificationState {
            status: VerificationStatus::Rejected,
            reason: Some("Rejected by platform admin".to_string()),
        }),
        other => Err(VerificationError::InvalidOverrideTarget(other)),
    }
}

/// What an admin override changed. Returned to the caller and logged on the
/// `audit` tracing target; nothing stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOverride {
    pub admin_id: String,
    pub teacher_id: String,
    pub previous: VerificationStatus,
    pub status: VerificationStatus,
    pub at: DateTime<Utc>,
}
