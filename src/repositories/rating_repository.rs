// src/repositories/rating_repository.rs
//
// Rating persistence
//
// Owns the ratings table. One rating per (user, movie); rate() is an
// upsert, never an append. Mean values are rounded here with the shared
// domain rule so they always agree with the joined movie reads.

use std::sync::Arc;

use rusqlite::{params, Row};
use uuid::Uuid;

use crate::db::ConnectionPool;
use crate::domain::rating::{round_rating, MovieRating};
use crate::error::AppResult;

#[cfg_attr(test, mockall::automock)]
pub trait RatingRepository: Send + Sync {
    fn rate(&self, movie_id: Uuid, value: i32, user_id: Uuid) -> AppResult<bool>;
    fn delete_rating(&self, movie_id: Uuid, user_id: Uuid) -> AppResult<bool>;
    fn get_rating(&self, movie_id: Uuid) -> AppResult<Option<f64>>;
    fn get_ratings(
        &self,
        movie_id: Uuid,
        user_id: Option<Uuid>,
    ) -> AppResult<(Option<f64>, Option<i32>)>;
    fn get_ratings_for_user(&self, user_id: Uuid) -> AppResult<Vec<MovieRating>>;
}

pub struct SqliteRatingRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteRatingRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_movie_rating(row: &Row) -> Result<MovieRating, rusqlite::Error> {
        let movie_id_str: String = row.get("movie_id")?;
        let movie_id = Uuid::parse_str(&movie_id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(MovieRating {
            movie_id,
            slug: row.get("slug")?,
            value: row.get("value")?,
        })
    }
}

impl RatingRepository for SqliteRatingRepository {
    fn rate(&self, movie_id: Uuid, value: i32, user_id: Uuid) -> AppResult<bool> {
        let conn = self.pool.get()?;

        let result = conn.execute(
            "INSERT INTO ratings (user_id, movie_id, value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (user_id, movie_id) DO UPDATE SET value = excluded.value",
            params![user_id.to_string(), movie_id.to_string(), value],
        )?;

        Ok(result > 0)
    }

    fn delete_rating(&self, movie_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let conn = self.pool.get()?;

        let result = conn.execute(
            "DELETE FROM ratings WHERE movie_id = ?1 AND user_id = ?2",
            params![movie_id.to_string(), user_id.to_string()],
        )?;

        Ok(result > 0)
    }

    fn get_rating(&self, movie_id: Uuid) -> AppResult<Option<f64>> {
        let conn = self.pool.get()?;

        // avg over zero rows is NULL, which maps to None
        let rating: Option<f64> = conn.query_row(
            "SELECT avg(value) FROM ratings WHERE movie_id = ?1",
            params![movie_id.to_string()],
            |row| row.get(0),
        )?;

        Ok(rating.map(round_rating))
    }

    fn get_ratings(
        &self,
        movie_id: Uuid,
        user_id: Option<Uuid>,
    ) -> AppResult<(Option<f64>, Option<i32>)> {
        let conn = self.pool.get()?;

        let (rating, user_rating): (Option<f64>, Option<i32>) = conn.query_row(
            "SELECT avg(value),
                    (SELECT value FROM ratings WHERE movie_id = ?1 AND user_id = ?2)
             FROM ratings
             WHERE movie_id = ?1",
            params![movie_id.to_string(), user_id.map(|u| u.to_string())],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok((rating.map(round_rating), user_rating))
    }

    fn get_ratings_for_user(&self, user_id: Uuid) -> AppResult<Vec<MovieRating>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT r.movie_id, m.slug, r.value
             FROM ratings r
             INNER JOIN movies m ON r.movie_id = m.id
             WHERE r.user_id = ?1",
        )?;

        let ratings = stmt
            .query_map(params![user_id.to_string()], Self::row_to_movie_rating)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ratings)
    }
}
