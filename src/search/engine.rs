use crate::catalog::parser::{CatalogSource, parse_catalog};
use crate::catalog::resolver::FileResolver;
use crate::catalog::types::{Book, BookId};
use crate::index::build::build_index;
use crate::index::snapshot::SnapshotStore;
use crate::index::types::{BookIndex, IndexStats};
use crate::search::types::{
    AUTHOR_SCORE_FACTOR, AUTHOR_THRESHOLD, DEFAULT_LIMIT, FUZZY_THRESHOLD, GenreCount,
    LanguageCount, MAX_LIMIT, MatchType, SearchHit, SearchOptions, SearchResponse, SeriesCount,
};
use crate::utils::{normalize, similarity, transliterate, within_length_window};
use anyhow::Result;
use rand::seq::SliceRandom;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Instant;
use tracing::{info, warn};

/// Books below this rating never appear in the top-rated listing
const TOP_RATED_MIN: u8 = 4;

/// A query in all the forms it is matched in: normalized, transliterated,
/// and split into words (so multi-word queries can hit single-token index
/// keys).
struct QueryText {
    normalized: String,
    translit: String,
    variants: Vec<String>,
}

impl QueryText {
    fn new(raw: &str) -> Self {
        let normalized = normalize(raw);
        let translit = transliterate(&normalized);

        let mut variants = vec![normalized.clone()];
        if translit != normalized {
            variants.push(translit.clone());
        }
        for word in normalized
            .split_whitespace()
            .chain(translit.split_whitespace())
        {
            // One-char words ("и", "a") flood the index with noise.
            if word.chars().count() < 2 {
                continue;
            }
            if !variants.iter().any(|v| v == word) {
                variants.push(word.to_string());
            }
        }

        Self {
            normalized,
            translit,
            variants,
        }
    }

    fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Substring containment of any query form in the key.
    fn contained_in(&self, key: &str) -> bool {
        self.variants.iter().any(|v| key.contains(v.as_str()))
    }

    /// Containment OR similarity above `min_sim` for any query form.
    ///
    /// The Levenshtein DP only runs for forms whose char-length window
    /// still permits the threshold, which bounds the full-index scan.
    fn matches(&self, key: &str, min_sim: f32) -> bool {
        if self.contained_in(key) {
            return true;
        }
        self.variants
            .iter()
            .any(|v| within_length_window(key, v, min_sim) && similarity(key, v) > min_sim)
    }

    /// Scoring similarity: the key against the whole query and its whole
    /// transliteration, whichever is closer.
    fn whole_similarity(&self, key: &str) -> f32 {
        let sim = similarity(key, &self.normalized);
        if self.translit == self.normalized {
            sim
        } else {
            sim.max(similarity(key, &self.translit))
        }
    }
}

/// The read front of the engine: owns the book table and the three indices
/// and answers every catalog query from memory.
///
/// Initialization is lazy and idempotent: the first read triggers the
/// snapshot-or-parse build, concurrent first callers serialize on one
/// in-flight build, and the finished [`BookIndex`] is published behind a
/// single `Arc` so readers never observe a partial index.
pub struct SearchEngine {
    source: CatalogSource,
    resolver: Arc<dyn FileResolver>,
    snapshot: Option<SnapshotStore>,
    index: OnceLock<Arc<BookIndex>>,
    init_lock: Mutex<()>,
}

impl SearchEngine {
    pub fn new(
        source: CatalogSource,
        resolver: Arc<dyn FileResolver>,
        snapshot: Option<SnapshotStore>,
    ) -> Self {
        Self {
            source,
            resolver,
            snapshot,
            index: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Engine over an index built elsewhere (embedding hosts, tests).
    pub fn from_index(index: BookIndex, resolver: Arc<dyn FileResolver>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Arc::new(index));
        Self {
            source: CatalogSource::new(PathBuf::new()),
            resolver,
            snapshot: None,
            index: cell,
            init_lock: Mutex::new(()),
        }
    }

    /// Force initialization now instead of on the first read.
    ///
    /// Fails only when the catalog export cannot be located or read; a
    /// stale or corrupt snapshot silently falls back to a full rebuild.
    pub fn initialize(&self) -> Result<()> {
        self.ensure_ready().map(|_| ())
    }

    pub fn is_ready(&self) -> bool {
        self.index.get().is_some()
    }

    fn ensure_ready(&self) -> Result<Arc<BookIndex>> {
        if let Some(index) = self.index.get() {
            return Ok(index.clone());
        }

        // One build at a time; late arrivals find the published index.
        let _guard = self.init_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(index) = self.index.get() {
            return Ok(index.clone());
        }

        let index = Arc::new(self.build()?);
        let _ = self.index.set(index.clone());
        Ok(index)
    }

    fn build(&self) -> Result<BookIndex> {
        let start = Instant::now();
        let source_mtime = self.source.modified_at()?;

        if let Some(store) = &self.snapshot {
            if let Some(index) = store.load(source_mtime) {
                info!(
                    books = index.stats.total_books,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "index restored from snapshot"
                );
                return Ok(index);
            }
        }

        let (books, report) = parse_catalog(&self.source, self.resolver.as_ref())?;
        if report.skipped > 0 || report.missing_file > 0 {
            warn!(
                skipped = report.skipped,
                missing_file = report.missing_file,
                "catalog records dropped during parse"
            );
        }

        let index = build_index(books);

        if let Some(store) = &self.snapshot {
            if let Err(err) = store.save(&index) {
                warn!("failed to save index snapshot: {err:#}");
            }
        }

        info!(
            books = index.stats.total_books,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "index initialized"
        );
        Ok(index)
    }

    /// Ranked, paginated search across titles, authors, and genres.
    ///
    /// With no criteria at all the full catalog is returned (score 1,
    /// exact, ascending id); the language filter still applies. Results
    /// order by descending score, ties by ascending id. Never errors on
    /// "no results".
    pub fn search(&self, options: &SearchOptions) -> Result<SearchResponse> {
        let index = self.ensure_ready()?;

        let limit = options.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = options.offset.unwrap_or(0);

        let mut hits: Vec<SearchHit> = Vec::new();
        let mut seen: FxHashSet<BookId> = FxHashSet::default();

        // Free-text: titles first, then authors at a slight discount.
        if let Some(q) = non_empty_query(options.query.as_deref()) {
            let title_scores = scan_fuzzy(&index.title_index, &q);
            push_scored(&mut hits, &mut seen, &index, title_scores, 1.0);

            let author_scores = scan_fuzzy(&index.author_index, &q);
            push_scored(&mut hits, &mut seen, &index, author_scores, AUTHOR_SCORE_FACTOR);
        }

        // Title-only: containment gate, scored against the full title.
        if let Some(q) = non_empty_query(options.title.as_deref()) {
            let mut scores: FxHashMap<BookId, f32> = FxHashMap::default();
            for (token, ids) in &index.title_index {
                if !q.contained_in(token) {
                    continue;
                }
                for &id in ids {
                    if seen.contains(&id) || scores.contains_key(&id) {
                        continue;
                    }
                    if let Some(book) = index.books.get(&id) {
                        let sim = q.whole_similarity(&normalize(&book.title));
                        scores.insert(id, sim);
                    }
                }
            }
            push_scored(&mut hits, &mut seen, &index, scores, 1.0);
        }

        // Author-only: containment or similarity above 0.7; always partial.
        if let Some(q) = non_empty_query(options.author.as_deref()) {
            let mut scores: FxHashMap<BookId, f32> = FxHashMap::default();
            for (name, ids) in &index.author_index {
                if !q.matches(name, AUTHOR_THRESHOLD) {
                    continue;
                }
                let sim = similarity(name, &q.normalized);
                for &id in ids {
                    if seen.contains(&id) {
                        continue;
                    }
                    let entry = scores.entry(id).or_insert(sim);
                    *entry = (*entry).max(sim);
                }
            }
            for (id, score) in sorted_by_id(scores) {
                if let Some(book) = index.books.get(&id) {
                    seen.insert(id);
                    hits.push(SearchHit {
                        book: book.clone(),
                        score,
                        match_type: MatchType::Partial,
                    });
                }
            }
        }

        // No criteria: the whole catalog is the result set.
        if !options.has_criteria() {
            let mut ids: Vec<BookId> = index.books.keys().copied().collect();
            ids.sort_unstable();
            for id in ids {
                if let Some(book) = index.books.get(&id) {
                    hits.push(SearchHit {
                        book: book.clone(),
                        score: 1.0,
                        match_type: MatchType::Exact,
                    });
                }
            }
        }

        // Genre narrows existing hits, or becomes the primary source.
        if let Some(genre) = options.genre.as_deref() {
            let genre_ids = index.genre_index.get(genre);
            if !hits.is_empty() {
                let genre_set: FxHashSet<BookId> = genre_ids
                    .map(|ids| ids.iter().copied().collect())
                    .unwrap_or_default();
                hits.retain(|hit| genre_set.contains(&hit.book.id));
            } else if let Some(ids) = genre_ids {
                for &id in ids {
                    if !seen.insert(id) {
                        continue;
                    }
                    if let Some(book) = index.books.get(&id) {
                        hits.push(SearchHit {
                            book: book.clone(),
                            score: 1.0,
                            match_type: MatchType::Exact,
                        });
                    }
                }
            }
        }

        if let Some(language) = options.language.as_deref() {
            hits.retain(|hit| hit.book.language == language);
        }

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.book.id.cmp(&b.book.id))
        });

        let total = hits.len();
        let hits = hits.into_iter().skip(offset).take(limit).collect();
        Ok(SearchResponse { hits, total })
    }

    pub fn get_book(&self, id: BookId) -> Result<Option<Book>> {
        Ok(self.ensure_ready()?.books.get(&id).cloned())
    }

    /// Content-file path for a known book, via the injected resolver.
    pub fn get_book_path(&self, id: BookId) -> Result<Option<PathBuf>> {
        let index = self.ensure_ready()?;
        Ok(index
            .books
            .get(&id)
            .and_then(|book| self.resolver.resolve(book.id)))
    }

    /// Books by an author's last name, in index order.
    pub fn get_author_books(
        &self,
        last_name: &str,
        limit: Option<usize>,
        exclude_id: Option<BookId>,
    ) -> Result<Vec<Book>> {
        let index = self.ensure_ready()?;
        let key = normalize(last_name);

        let mut books = Vec::new();
        let mut seen: FxHashSet<BookId> = FxHashSet::default();
        if let Some(ids) = index.author_index.get(&key) {
            for &id in ids {
                if Some(id) == exclude_id || !seen.insert(id) {
                    continue;
                }
                if let Some(book) = index.books.get(&id) {
                    books.push(book.clone());
                }
                if limit.is_some_and(|l| books.len() >= l) {
                    break;
                }
            }
        }
        Ok(books)
    }

    /// All books in a series, ordered by series position ascending
    /// (missing position sorts as 0), ties by id.
    pub fn get_series_books(&self, series: &str) -> Result<Vec<Book>> {
        let index = self.ensure_ready()?;
        let mut books: Vec<Book> = index
            .books
            .values()
            .filter(|book| book.series.as_deref() == Some(series))
            .cloned()
            .collect();
        books.sort_by_key(|book| (book.series_num.unwrap_or(0), book.id));
        Ok(books)
    }

    /// All genres with distinct-book counts, most common first.
    pub fn get_genres(&self) -> Result<Vec<GenreCount>> {
        let index = self.ensure_ready()?;
        let mut rows: Vec<GenreCount> = index
            .genre_index
            .iter()
            .map(|(genre, ids)| GenreCount {
                genre: genre.clone(),
                count: ids.iter().collect::<FxHashSet<_>>().len(),
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.genre.cmp(&b.genre)));
        Ok(rows)
    }

    pub fn get_languages(&self) -> Result<Vec<LanguageCount>> {
        let index = self.ensure_ready()?;
        let mut rows: Vec<LanguageCount> = index
            .stats
            .languages
            .iter()
            .map(|(language, &count)| LanguageCount {
                language: language.clone(),
                count,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.language.cmp(&b.language))
        });
        Ok(rows)
    }

    /// Series names with book counts, largest first.
    pub fn get_series(&self, limit: Option<usize>) -> Result<Vec<SeriesCount>> {
        let index = self.ensure_ready()?;
        let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
        for book in index.books.values() {
            if let Some(series) = book.series.as_deref() {
                *counts.entry(series).or_insert(0) += 1;
            }
        }

        let mut rows: Vec<SeriesCount> = counts
            .into_iter()
            .map(|(series, count)| SeriesCount {
                series: series.to_string(),
                count,
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.series.cmp(&b.series)));
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    /// Uniform random sample without replacement, after filters.
    pub fn get_random_books(
        &self,
        count: usize,
        genre: Option<&str>,
        language: Option<&str>,
    ) -> Result<Vec<Book>> {
        let index = self.ensure_ready()?;

        let mut pool: Vec<&Book> = index.books.values().collect();
        if let Some(genre) = genre {
            let ids: FxHashSet<BookId> = index
                .genre_index
                .get(genre)
                .map(|ids| ids.iter().copied().collect())
                .unwrap_or_default();
            pool.retain(|book| ids.contains(&book.id));
        }
        if let Some(language) = language {
            pool.retain(|book| book.language == language);
        }

        let mut rng = rand::thread_rng();
        Ok(pool
            .choose_multiple(&mut rng, count)
            .map(|book| (*book).clone())
            .collect())
    }

    /// Rated books (rating >= 4), best first, ties by id.
    pub fn get_top_rated(&self, limit: usize, genre: Option<&str>) -> Result<Vec<Book>> {
        let index = self.ensure_ready()?;

        let genre_ids: Option<FxHashSet<BookId>> = genre.map(|g| {
            index
                .genre_index
                .get(g)
                .map(|ids| ids.iter().copied().collect())
                .unwrap_or_default()
        });

        let mut books: Vec<Book> = index
            .books
            .values()
            .filter(|book| book.rating.is_some_and(|r| r >= TOP_RATED_MIN))
            .filter(|book| {
                genre_ids
                    .as_ref()
                    .is_none_or(|ids| ids.contains(&book.id))
            })
            .cloned()
            .collect();
        books.sort_by(|a, b| {
            b.rating
                .cmp(&a.rating)
                .then_with(|| a.id.cmp(&b.id))
        });
        books.truncate(limit);
        Ok(books)
    }

    pub fn get_stats(&self) -> Result<IndexStats> {
        Ok(self.ensure_ready()?.stats.clone())
    }
}

/// An option that normalizes to nothing is no criterion at all.
fn non_empty_query(raw: Option<&str>) -> Option<QueryText> {
    raw.map(QueryText::new).filter(|q| !q.is_empty())
}

/// Fuzzy scan of one index: per-book best whole-query similarity across
/// all qualifying keys. Order-independent, so results are deterministic
/// regardless of map iteration order.
fn scan_fuzzy(
    index: &FxHashMap<String, Vec<BookId>>,
    q: &QueryText,
) -> FxHashMap<BookId, f32> {
    let mut scores: FxHashMap<BookId, f32> = FxHashMap::default();
    for (key, ids) in index {
        if !q.matches(key, FUZZY_THRESHOLD) {
            continue;
        }
        let sim = q.whole_similarity(key);
        for &id in ids {
            let entry = scores.entry(id).or_insert(sim);
            *entry = (*entry).max(sim);
        }
    }
    scores
}

/// Turn candidate scores into hits, skipping books claimed by an earlier
/// match source. Match type is classified on the raw similarity, before
/// the source factor is applied.
fn push_scored(
    hits: &mut Vec<SearchHit>,
    seen: &mut FxHashSet<BookId>,
    index: &BookIndex,
    scores: FxHashMap<BookId, f32>,
    factor: f32,
) {
    for (id, sim) in sorted_by_id(scores) {
        if !seen.insert(id) {
            continue;
        }
        if let Some(book) = index.books.get(&id) {
            hits.push(SearchHit {
                book: book.clone(),
                score: sim * factor,
                match_type: MatchType::classify(sim),
            });
        }
    }
}

fn sorted_by_id(scores: FxHashMap<BookId, f32>) -> Vec<(BookId, f32)> {
    let mut rows: Vec<(BookId, f32)> = scores.into_iter().collect();
    rows.sort_unstable_by_key(|&(id, _)| id);
    rows
}
