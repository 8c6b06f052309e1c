use crate::catalog::types::{Book, BookId};
use crate::index::types::{BookIndex, IndexStats};
use crate::utils::normalize;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Minimum char length for an indexed title token (single-letter words are
/// noise)
const MIN_TOKEN_LEN: usize = 2;

/// Build the three inverted indices and stats in one pass over the book
/// table.
///
/// Returns a fresh, fully-populated [`BookIndex`]; nothing is published
/// until the whole build is done. An empty catalog yields empty indices
/// and zero counts, which is valid.
pub fn build_index(books: FxHashMap<BookId, Book>) -> BookIndex {
    let mut title_index: FxHashMap<String, Vec<BookId>> = FxHashMap::default();
    let mut author_index: FxHashMap<String, Vec<BookId>> = FxHashMap::default();
    let mut genre_index: FxHashMap<String, Vec<BookId>> = FxHashMap::default();

    let mut distinct_authors: FxHashSet<String> = FxHashSet::default();
    let mut distinct_genres: FxHashSet<String> = FxHashSet::default();
    let mut languages: HashMap<String, u64> = HashMap::new();

    for (&id, book) in &books {
        for token in normalize(&book.title).split_whitespace() {
            if token.chars().count() < MIN_TOKEN_LEN {
                continue;
            }
            title_index.entry(token.to_string()).or_default().push(id);
        }

        for author in &book.authors {
            let full = normalize(&author.full_name());
            distinct_authors.insert(full.clone());
            author_index.entry(full).or_default().push(id);

            // A bare surname query must hit without full-name context.
            let last = normalize(&author.last_name);
            author_index.entry(last).or_default().push(id);
        }

        // Genre tags are exact vocabulary; no normalization.
        for genre in &book.genres {
            distinct_genres.insert(genre.clone());
            genre_index.entry(genre.clone()).or_default().push(id);
        }

        *languages.entry(book.language.clone()).or_insert(0) += 1;
    }

    let stats = IndexStats {
        total_books: books.len(),
        total_authors: distinct_authors.len(),
        total_genres: distinct_genres.len(),
        languages,
        built_at: now_secs(),
    };

    info!(
        books = stats.total_books,
        authors = stats.total_authors,
        genres = stats.total_genres,
        title_tokens = title_index.len(),
        "index built"
    );

    BookIndex {
        books,
        title_index,
        author_index,
        genre_index,
        stats,
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
