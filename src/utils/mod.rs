//! Text-matching utilities shared by the index builder and the search engine.
//!
//! - [`normalize`] - search-text normalization (lowercase, strip punctuation)
//! - [`translit`] - rule-based Latin→Cyrillic transliteration
//! - [`levenshtein`] - edit distance and similarity scoring
//!
//! ## Key Functions
//!
//! ```no_run
//! use bookdex::utils::{normalize, similarity, transliterate};
//!
//! let norm = normalize("Война и мир!");
//! // "война и мир"
//!
//! let cyr = transliterate("voina i mir");
//! // "воина и мир"
//!
//! let score = similarity("война", "воина");
//! // 0.8
//! ```

pub mod levenshtein;
pub mod normalize;
pub mod translit;

pub use levenshtein::*;
pub use normalize::*;
pub use translit::*;
