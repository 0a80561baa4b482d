// src/services/rating_service.rs
//
// Rating orchestration: bounds-checks values and resolves "movie does
// not exist" to a false result the caller can map to not-found.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::rating::{validate_rating_value, MovieRating};
use crate::error::AppResult;
use crate::repositories::{MovieRepository, RatingRepository};

pub struct RatingService {
    rating_repo: Arc<dyn RatingRepository>,
    movie_repo: Arc<dyn MovieRepository>,
}

impl RatingService {
    pub fn new(rating_repo: Arc<dyn RatingRepository>, movie_repo: Arc<dyn MovieRepository>) -> Self {
        Self {
            rating_repo,
            movie_repo,
        }
    }

    /// Rate a movie on the user's behalf. Returns `Ok(false)` when the
    /// movie does not exist - not an error, so the caller can answer
    /// with not-found.
    pub fn rate(&self, movie_id: Uuid, value: i32, user_id: Uuid) -> AppResult<bool> {
        validate_rating_value(value)?;

        if !self.movie_repo.exists_by_id(movie_id)? {
            return Ok(false);
        }

        self.rating_repo.rate(movie_id, value, user_id)
    }

    pub fn delete_rating(&self, movie_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        self.rating_repo.delete_rating(movie_id, user_id)
    }

    pub fn get_rating(&self, movie_id: Uuid) -> AppResult<Option<f64>> {
        self.rating_repo.get_rating(movie_id)
    }

    pub fn get_ratings_for_user(&self, user_id: Uuid) -> AppResult<Vec<MovieRating>> {
        self.rating_repo.get_ratings_for_user(user_id)
    }
}
