//! Query execution over the built indices.

pub mod engine;
pub mod types;

pub use engine::SearchEngine;
pub use types::{
    GenreCount, LanguageCount, MatchType, SearchHit, SearchOptions, SearchResponse, SeriesCount,
};
