// src/domain/query/value_objects.rs
//
// Query Options - value objects describing filter, sort and page window
//
// Sort fields are a closed enumeration mapped to physical column names
// through `SortField::column`. Caller-supplied text is matched against
// the whitelist here and nowhere else; query construction only ever
// sees the enum.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult};

/// Largest page a single query may return
pub const MAX_PAGE_SIZE: u32 = 25;

/// The closed set of attributes a caller may sort by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Title,
    YearOfRelease,
}

impl SortField {
    /// Resolve a caller-supplied field name against the whitelist.
    /// Unknown fields are an error, never silently "unsorted" - a typo
    /// must not masquerade as a request for natural order.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "year_of_release" | "yearofrelease" => Ok(SortField::YearOfRelease),
            _ => Err(DomainError::UnsortableField(raw.to_string())),
        }
    }

    /// Physical column the field maps to. The only place sort text can
    /// enter a query, and it is a static lookup.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::YearOfRelease => "year_of_release",
        }
    }
}

/// Direction of an ordered read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Unsorted,
    Ascending,
    Descending,
}

/// Filter, sort and page window for a catalog listing.
/// Produced by the request-mapping layer, validated here, consumed by
/// the movie repository.
#[derive(Debug, Clone, Default)]
pub struct GetAllMoviesOptions {
    /// Substring match on title; ASCII case-insensitive (SQLite LIKE),
    /// and identical for the page fetch and the count query
    pub title: Option<String>,

    /// Exact release-year match
    pub year_of_release: Option<i32>,

    /// When present, that user's own rating is folded into each row
    pub user_id: Option<Uuid>,

    pub sort_field: Option<SortField>,
    pub sort_order: SortOrder,

    /// 1-based page number
    pub page: u32,

    /// Rows per page, 1..=MAX_PAGE_SIZE
    pub page_size: u32,
}

impl GetAllMoviesOptions {
    /// Options with no filters, natural order, first page of ten
    pub fn new() -> Self {
        Self {
            page: 1,
            page_size: 10,
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user_id: Option<Uuid>) -> Self {
        self.user_id = user_id;
        self
    }
}

/// Normalize a raw sort expression into field + direction.
/// A leading '-' means descending, an optional leading '+' ascending;
/// the remainder must resolve against the whitelist.
pub fn parse_sort_expression(raw: &str) -> DomainResult<(SortField, SortOrder)> {
    let trimmed = raw.trim();
    let (order, name) = match trimmed.strip_prefix('-') {
        Some(rest) => (SortOrder::Descending, rest),
        None => (
            SortOrder::Ascending,
            trimmed.strip_prefix('+').unwrap_or(trimmed),
        ),
    };

    let field = SortField::parse(name)?;
    Ok((field, order))
}

/// Page window invariants: pages are 1-based and bounded in size
pub fn validate_options(options: &GetAllMoviesOptions) -> DomainResult<()> {
    if options.page < 1 {
        return Err(DomainError::InvariantViolation(
            "Page must be 1 or greater".to_string(),
        ));
    }
    if options.page_size < 1 || options.page_size > MAX_PAGE_SIZE {
        return Err(DomainError::InvariantViolation(format!(
            "Page size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    Ok(())
}
