use crate::catalog::types::{Book, BookId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregate snapshot of a built index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_books: usize,
    pub total_authors: usize,
    pub total_genres: usize,
    /// Book count per language code
    pub languages: HashMap<String, u64>,
    /// Unix seconds of the last build
    pub built_at: u64,
}

/// The fully-built, immutable index set.
///
/// Built once per process (or restored from a fresh snapshot) and never
/// mutated afterwards; a rebuild produces a new `BookIndex` that replaces
/// the old one behind a single `Arc` swap, so readers always see a
/// complete index.
///
/// Posting lists may contain duplicate ids; callers deduplicate at query
/// time.
#[derive(Debug, Default)]
pub struct BookIndex {
    /// Book table keyed by catalog id
    pub books: FxHashMap<BookId, Book>,
    /// Normalized title token (len >= 2) -> book ids
    pub title_index: FxHashMap<String, Vec<BookId>>,
    /// Normalized author full name and last name -> book ids
    pub author_index: FxHashMap<String, Vec<BookId>>,
    /// Raw genre tag -> book ids
    pub genre_index: FxHashMap<String, Vec<BookId>>,
    pub stats: IndexStats,
}

impl BookIndex {
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
