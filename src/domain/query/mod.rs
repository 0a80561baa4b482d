// src/domain/query/mod.rs

pub mod value_objects;

pub use value_objects::{
    parse_sort_expression, validate_options, GetAllMoviesOptions, SortField, SortOrder,
    MAX_PAGE_SIZE,
};
