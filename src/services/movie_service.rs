// src/services/movie_service.rs
//
// Movie orchestration: runs the validation gate, short-circuits writes
// against missing ids, and folds rating aggregates back into updates.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::movie::{validate_movie, Movie};
use crate::domain::query::{validate_options, GetAllMoviesOptions};
use crate::error::AppResult;
use crate::repositories::{MovieRepository, RatingRepository};

pub struct MovieService {
    movie_repo: Arc<dyn MovieRepository>,
    rating_repo: Arc<dyn RatingRepository>,
}

impl MovieService {
    pub fn new(movie_repo: Arc<dyn MovieRepository>, rating_repo: Arc<dyn RatingRepository>) -> Self {
        Self {
            movie_repo,
            rating_repo,
        }
    }

    pub fn create(&self, movie: &Movie) -> AppResult<bool> {
        validate_movie(movie)?;
        self.movie_repo.create(movie)
    }

    pub fn get_by_id(&self, id: Uuid, user_id: Option<Uuid>) -> AppResult<Option<Movie>> {
        self.movie_repo.get_by_id(id, user_id)
    }

    pub fn get_by_slug(&self, slug: &str, user_id: Option<Uuid>) -> AppResult<Option<Movie>> {
        self.movie_repo.get_by_slug(slug, user_id)
    }

    pub fn get_all(&self, options: &GetAllMoviesOptions) -> AppResult<Vec<Movie>> {
        validate_options(options)?;
        self.movie_repo.get_all(options)
    }

    pub fn get_count(&self, title: Option<String>, year_of_release: Option<i32>) -> AppResult<usize> {
        self.movie_repo.get_count(title, year_of_release)
    }

    /// Update a movie. Returns `None` when the id is unknown; otherwise
    /// returns the movie with its derived rating fields refreshed in a
    /// single extra round trip.
    pub fn update(&self, mut movie: Movie, user_id: Option<Uuid>) -> AppResult<Option<Movie>> {
        validate_movie(&movie)?;

        if !self.movie_repo.exists_by_id(movie.id)? {
            return Ok(None);
        }

        self.movie_repo.update(&movie)?;

        let (rating, user_rating) = self.rating_repo.get_ratings(movie.id, user_id)?;
        movie.rating = rating;
        movie.user_rating = user_rating;
        Ok(Some(movie))
    }

    pub fn delete_by_id(&self, id: Uuid) -> AppResult<bool> {
        self.movie_repo.delete_by_id(id)
    }
}
