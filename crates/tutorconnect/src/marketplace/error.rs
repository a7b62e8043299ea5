//! Errors returned by marketplace mutations. A failed mutation changes nothing.

use thiserror::Error;

use crate::booking::BookingError;
use crate::reviews::ReviewError;
use crate::verification::VerificationError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarketplaceError {
    #[error("Teacher not found: {0}")]
    TeacherNotFound(String),

    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    /// The caller's account cannot perform this action
    #[error("{0}")]
    Forbidden(&'static str),

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Review(#[from] ReviewError),

    #[error(transparent)]
    Verification(#[from] VerificationError),
}
