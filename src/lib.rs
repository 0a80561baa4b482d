// src/lib.rs
// Cinelog - Movie catalog store
//
// Architecture:
// - Domain-centric: entities and invariants live in `domain`
// - Repositories: dumb data mappers over SQLite, one per aggregate
// - Services: orchestration + validation gate in front of the stores
// - Explicit: no implicit behavior, no magic
//
// The HTTP/API surface that consumes this crate is deliberately absent;
// everything here is the query/storage layer.

pub mod db;
pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;

// ============================================================================
// PUBLIC API - Domain Entities
// ============================================================================

pub use domain::{
    parse_sort_expression,
    round_rating,
    validate_movie,
    validate_options,
    validate_rating_value,
    // Query Options
    GetAllMoviesOptions,
    // Movie
    Movie,
    // Rating (Derived Data)
    MovieRating,
    SortField,
    SortOrder,
    MAX_PAGE_SIZE,
    MAX_RATING,
    MIN_RATING,
};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Database
// ============================================================================

pub use db::{create_connection_pool, get_connection, initialize_database, ConnectionPool};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    MovieRepository,
    RatingRepository,
    SqliteMovieRepository,
    SqliteRatingRepository,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{MovieService, RatingService};
