// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod movie_service;
pub mod rating_service;


// Re-export all services
pub use movie_service::MovieService;
pub use rating_service::RatingService;
