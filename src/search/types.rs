use crate::catalog::types::Book;
use serde::{Deserialize, Serialize};

/// Default page size when the caller gives no limit
pub const DEFAULT_LIMIT: usize = 20;

/// Hard cap on page size
pub const MAX_LIMIT: usize = 100;

/// Similarity gate for free-text fuzzy matching
pub const FUZZY_THRESHOLD: f32 = 0.6;

/// Similarity gate for author-only matching
pub const AUTHOR_THRESHOLD: f32 = 0.7;

/// Author hits rank slightly below title hits for an undifferentiated query
pub const AUTHOR_SCORE_FACTOR: f32 = 0.9;

/// Search criteria. All fields optional; with no criteria at all the
/// engine returns the full catalog, paginated.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Free-text query matched against titles and authors
    pub query: Option<String>,
    /// Title-only query
    pub title: Option<String>,
    /// Author-only query
    pub author: Option<String>,
    /// Exact genre tag filter
    pub genre: Option<String>,
    /// Exact language-code filter
    pub language: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl SearchOptions {
    /// True when nothing would seed the result set.
    pub fn has_criteria(&self) -> bool {
        self.query.is_some()
            || self.title.is_some()
            || self.author.is_some()
            || self.genre.is_some()
    }
}

/// How a hit matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Similarity exactly 1
    Exact,
    /// Similarity above 0.8
    Fuzzy,
    /// Anything that qualified below that
    Partial,
}

impl MatchType {
    /// Classify a raw similarity score.
    pub fn classify(similarity: f32) -> Self {
        if similarity == 1.0 {
            MatchType::Exact
        } else if similarity > 0.8 {
            MatchType::Fuzzy
        } else {
            MatchType::Partial
        }
    }
}

/// One ranked search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub book: Book,
    /// Relevance in [0, 1]
    pub score: f32,
    pub match_type: MatchType,
}

/// A page of results plus the size of the full filtered set.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub total: usize,
}

/// Genre listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

/// Language listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageCount {
    pub language: String,
    pub count: u64,
}

/// Series listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesCount {
    pub series: String,
    pub count: usize,
}
