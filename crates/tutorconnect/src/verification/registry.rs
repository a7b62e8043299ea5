//! Simulated SACE registry lookup.
//!
//! There is no real registry behind this. A registration number counts as found
//! when it carries the `SACE` prefix (any case) and is at least eight characters
//! long; everything else is reported as not found.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::model::VerificationStatus;

pub const MIN_REGISTRATION_LENGTH: usize = 8;

static SACE_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^SACE").unwrap());

pub const MATCH_MESSAGE: &str = "Registry match found. Status: Active Educator.";
pub const NO_MATCH_MESSAGE: &str = "No registry record found for this SACE number/ID combination.";

/// Credentials submitted by a teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSubmission {
    pub sace_number: String,
    pub id_number: String,
}

/// Result of one registry lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOutcome {
    pub success: bool,
    pub message: String,
    pub status: VerificationStatus,
}

/// Applies the mock registry rule. Pure; the caller supplies the latency.
pub fn lookup(submission: &VerificationSubmission) -> LookupOutcome {
    let number = submission.sace_number.trim();
    if SACE_PREFIX.is_match(number) && number.chars().count() >= MIN_REGISTRATION_LENGTH {
        LookupOutcome {
            success: true,
            message: MATCH_MESSAGE.to_string(),
            status: VerificationStatus::Verified,
        }
    } else {
        LookupOutcome {
            success: false,
            message: NO_MATCH_MESSAGE.to_string(),
            status: VerificationStatus::Rejected,
        }
    }
}
