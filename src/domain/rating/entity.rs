use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult};

/// Lowest accepted rating value
pub const MIN_RATING: i32 = 1;

/// Highest accepted rating value
pub const MAX_RATING: i32 = 5;

/// One user's rating of one movie, joined against the movie slug for
/// display. The ratings table itself is keyed by (user_id, movie_id);
/// this read model never carries the user id back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRating {
    pub movie_id: Uuid,
    pub slug: String,
    pub value: i32,
}

/// Rating values are bounded; anything outside the range is rejected
/// before it reaches storage.
pub fn validate_rating_value(value: i32) -> DomainResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&value) {
        return Err(DomainError::InvariantViolation(format!(
            "Rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }
    Ok(())
}

/// The crate-wide rounding rule for mean ratings: one decimal place,
/// half away from zero. Applied in code on every path that produces a
/// mean, so single reads and list reads can never disagree.
pub fn round_rating(mean: f64) -> f64 {
    (mean * 10.0).round() / 10.0
}
