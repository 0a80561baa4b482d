// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// This file declares all domain modules and re-exports their public API.
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod movie;
pub mod query;
pub mod rating;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Movie Domain
pub use movie::{validate_movie, Movie};

// Rating Domain (Derived Data)
pub use rating::{round_rating, validate_rating_value, MovieRating, MAX_RATING, MIN_RATING};

// Query Options
pub use query::{
    parse_sort_expression, validate_options, GetAllMoviesOptions, SortField, SortOrder,
    MAX_PAGE_SIZE,
};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Field '{0}' cannot be used for sorting")]
    UnsortableField(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
