use chrono::{Datelike, Utc};

use super::entity::Movie;
use crate::domain::{DomainError, DomainResult};

/// Validates all Movie invariants
/// These are the absolute rules that must hold before a movie reaches storage
pub fn validate_movie(movie: &Movie) -> DomainResult<()> {
    validate_title(&movie.title)?;
    validate_year(movie.year_of_release)?;
    validate_genres(&movie.genres)?;
    Ok(())
}

/// Title cannot be empty
fn validate_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Movie title cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Release year cannot lie in the future
fn validate_year(year: i32) -> DomainResult<()> {
    let current_year = Utc::now().year();
    if year > current_year {
        return Err(DomainError::InvariantViolation(format!(
            "Release year {} is after the current year {}",
            year, current_year
        )));
    }
    Ok(())
}

/// At least one genre, none of them blank
fn validate_genres(genres: &[String]) -> DomainResult<()> {
    if genres.is_empty() {
        return Err(DomainError::InvariantViolation(
            "Movie must have at least one genre".to_string(),
        ));
    }
    if genres.iter().any(|g| g.trim().is_empty()) {
        return Err(DomainError::InvariantViolation(
            "Genre tags cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Invariants that must hold true for the Movie domain:
///
/// 1. Identity (UUID) is immutable
/// 2. Slug is derived from title + year, never set independently
/// 3. Exactly one movie may hold a given slug (storage enforces)
/// 4. Title cannot be empty
/// 5. Release year never lies in the future
/// 6. Genres exist only while their parent movie exists
