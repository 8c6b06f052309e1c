//! # bookdex - Book Catalog Fuzzy-Search Engine
//!
//! bookdex ingests a field-delimited book catalog export, builds normalized
//! in-memory indices (title words, author names, genres), and answers
//! ranked queries that tolerate typos, partial matches, and queries typed
//! in Latin letters against a Cyrillic catalog.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`catalog`] - Catalog export parsing (records, authors, file resolution)
//! - [`index`] - Index building and snapshot persistence
//! - [`search`] - The query engine (fuzzy search, listings, sampling)
//! - [`output`] - Result formatting for the CLI
//! - [`utils`] - Text utilities (normalization, transliteration, edit distance)
//!
//! ## Quick Start
//!
//! ```ignore
//! use bookdex::catalog::{CatalogSource, DirResolver};
//! use bookdex::index::SnapshotStore;
//! use bookdex::search::{SearchEngine, SearchOptions};
//! use std::sync::Arc;
//!
//! let engine = SearchEngine::new(
//!     CatalogSource::new("/data/catalog"),
//!     Arc::new(DirResolver::new("/data/books")),
//!     Some(SnapshotStore::new(".book-index.json")),
//! );
//!
//! let response = engine.search(&SearchOptions {
//!     query: Some("voina i mir".to_string()),
//!     ..Default::default()
//! })?;
//!
//! for hit in response.hits {
//!     println!("{} ({:.2})", hit.book.title, hit.score);
//! }
//! ```
//!
//! ## Startup
//!
//! On the first read the engine tries the snapshot; on a miss or when the
//! export is newer it parses the catalog, builds fresh indices, and saves
//! a new snapshot. All later reads are pure lookups over immutable maps
//! and are safe to run concurrently.

pub mod catalog;
pub mod index;
pub mod output;
pub mod search;
pub mod utils;
