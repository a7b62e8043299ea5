//! Review submission and rating aggregation.

use thiserror::Error;

use crate::model::{Review, Teacher, User};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("Please log in to leave a review")]
    NotAuthenticated,

    #[error("Rating must be between 1 and 5 stars, got {0}")]
    InvalidRating(u8),

    #[error("Please write a comment")]
    EmptyComment,
}

/// Checks a submission before anything is mutated.
pub fn validate_submission(user: Option<&User>, rating: u8, comment: &str) -> Result<(), ReviewError> {
    if user.is_none() {
        return Err(ReviewError::NotAuthenticated);
    }
    if !(1..=5).contains(&rating) {
        return Err(ReviewError::InvalidRating(rating));
    }
    if comment.trim().is_empty() {
        return Err(ReviewError::EmptyComment);
    }
    Ok(())
}

/// Mean of `ratings` rounded half-up to one decimal place. Zero when empty.
pub fn average_rating<I>(ratings: I) -> f64
where
    I: IntoIterator<Item = u8>,
{
    let (sum, count) = ratings
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), r| (sum + u64::from(r), count + 1));
    if count == 0 {
        return 0.0;
    }

    // tenths = round_half_up(10 * sum / count), in integers
    let tenths = (20 * sum + count) / (2 * count);
    tenths as f64 / 10.0
}

/// Returns `teacher` with `review` prepended and the aggregates recomputed.
pub fn apply_review(teacher: &Teacher, review: Review) -> Teacher {
    let mut updated = teacher.clone();
    updated.reviews.insert(0, review);
    updated.reviews_count = updated.reviews.len();
    updated.rating = average_rating(updated.reviews.iter().map(|r| r.rating));
    updated
}
