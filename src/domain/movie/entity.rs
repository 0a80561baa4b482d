use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalogued movie and its identity-defining keys (id, slug).
///
/// `rating` and `user_rating` are derived values: they are never written
/// to the movies table and are populated by the read queries that join
/// the ratings aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    /// Internal immutable identifier
    pub id: Uuid,

    /// Display title
    pub title: String,

    /// URL-safe alternate lookup key, derived from title and year.
    /// Unique across the catalog (enforced by the storage layer).
    pub slug: String,

    /// Release year
    pub year_of_release: i32,

    /// Genre tags; a child collection owned by this movie
    pub genres: Vec<String>,

    /// Mean of all user ratings, one decimal place; `None` when unrated
    pub rating: Option<f64>,

    /// The requesting user's own rating, when a user is known
    pub user_rating: Option<i32>,
}

impl Movie {
    /// Create a new Movie with a fresh identity.
    /// The slug is computed here and never drifts from title + year.
    pub fn new(title: String, year_of_release: i32, genres: Vec<String>) -> Self {
        let slug = generate_slug(&title, year_of_release);
        Self {
            id: Uuid::new_v4(),
            title,
            slug,
            year_of_release,
            genres,
            rating: None,
            user_rating: None,
        }
    }

    /// Rebuild a Movie around an existing identity, recomputing the slug.
    /// Used by update paths where the caller supplies the id.
    pub fn with_id(id: Uuid, title: String, year_of_release: i32, genres: Vec<String>) -> Self {
        let slug = generate_slug(&title, year_of_release);
        Self {
            id,
            title,
            slug,
            year_of_release,
            genres,
            rating: None,
            user_rating: None,
        }
    }
}

/// Derive the URL-safe slug: drop everything outside `[0-9A-Za-z _-]`,
/// lowercase, spaces to dashes, year appended.
pub fn generate_slug(title: &str, year_of_release: i32) -> String {
    static SLUG_CHARS: OnceLock<Regex> = OnceLock::new();
    let re = SLUG_CHARS.get_or_init(|| Regex::new(r"[^0-9A-Za-z _\-]").unwrap());

    let slugged = re.replace_all(title, "").to_lowercase().replace(' ', "-");
    format!("{}-{}", slugged, year_of_release)
}
