//! End-to-end tests over a real on-disk catalog fixture.
//!
//! Each test builds a temp directory with catalog sections and a books
//! directory, then drives the engine exactly the way the hosting
//! application would.

use bookdex::catalog::{BookId, CatalogSource, DirResolver, FileResolver};
use bookdex::index::SnapshotStore;
use bookdex::search::{MatchType, SearchEngine, SearchOptions};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

const EOT: &str = "\u{0004}";

/// One catalog line in export field order.
fn catalog_line(
    authors_genre: &str,
    title: &str,
    series: &str,
    series_num: &str,
    id: BookId,
    language: &str,
    rating: &str,
) -> String {
    [
        authors_genre,
        "",
        title,
        series,
        series_num,
        &id.to_string(),
        "1000",
        "",
        "",
        "fb2",
        "2020-01-01",
        language,
        rating,
    ]
    .join(EOT)
}

struct Fixture {
    _dir: TempDir,
    catalog: PathBuf,
    books_dir: PathBuf,
    snapshot: PathBuf,
}

impl Fixture {
    fn new(lines: &[String]) -> Self {
        let dir = TempDir::new().unwrap();
        let catalog = dir.path().join("catalog");
        let books_dir = dir.path().join("books");
        fs::create_dir_all(&catalog).unwrap();
        fs::create_dir_all(&books_dir).unwrap();

        fs::write(catalog.join("shelf01.inp"), lines.join("\n")).unwrap();

        // Every referenced book gets a content file.
        for line in lines {
            if let Some(id) = line.split(EOT).nth(5) {
                if let Ok(id) = id.trim().parse::<u32>() {
                    fs::write(books_dir.join(format!("{id}.fb2")), b"<FictionBook/>").unwrap();
                }
            }
        }

        Self {
            snapshot: dir.path().join(".book-index.json"),
            _dir: dir,
            catalog,
            books_dir,
        }
    }

    fn engine(&self) -> SearchEngine {
        SearchEngine::new(
            CatalogSource::new(&self.catalog),
            Arc::new(DirResolver::new(&self.books_dir)),
            Some(SnapshotStore::new(&self.snapshot)),
        )
    }
}

fn library_lines() -> Vec<String> {
    vec![
        catalog_line("Толстой,Лев,:prose", "Война и мир", "", "", 1, "ru", "5"),
        catalog_line("Роулинг,Джоан,:Fantasy", "Гарри Поттер", "Поттериана", "1", 2, "ru", "5"),
        catalog_line("Сапковский,Анджей,:Fantasy", "Ведьмак", "", "", 3, "ru", "4"),
        catalog_line("Мартин,Джордж,:Fantasy", "Игра престолов", "", "", 4, "en", ""),
        catalog_line("Чехов,Антон,:Drama", "Вишнёвый сад", "", "", 5, "ru", "3"),
        catalog_line("Горький,Максим,:Drama", "На дне", "", "", 6, "ru", ""),
    ]
}

#[test]
fn builds_from_disk_and_serves_queries() {
    let fixture = Fixture::new(&library_lines());
    let engine = fixture.engine();

    assert!(!engine.is_ready());
    let stats = engine.get_stats().unwrap();
    assert!(engine.is_ready());
    assert_eq!(stats.total_books, 6);
    assert_eq!(stats.languages.get("ru"), Some(&5));
    assert_eq!(stats.languages.get("en"), Some(&1));

    let book = engine.get_book(2).unwrap().unwrap();
    assert_eq!(book.title, "Гарри Поттер");
    assert_eq!(book.authors[0].last_name, "Роулинг");

    let path = engine.get_book_path(2).unwrap().unwrap();
    assert!(path.ends_with("2.fb2"));
    assert!(engine.get_book(999).unwrap().is_none());
}

#[test]
fn genre_only_query_is_the_primary_source() {
    let fixture = Fixture::new(&library_lines());
    let engine = fixture.engine();

    let response = engine
        .search(&SearchOptions {
            genre: Some("Fantasy".to_string()),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(response.total, 3);
    assert_eq!(response.hits.len(), 3);
    for hit in &response.hits {
        assert_eq!(hit.score, 1.0);
        assert_eq!(hit.match_type, MatchType::Exact);
        assert!(hit.book.genres.contains(&"Fantasy".to_string()));
    }
}

#[test]
fn genre_narrows_a_text_query() {
    let fixture = Fixture::new(&library_lines());
    let engine = fixture.engine();

    // "поттер" matches the Fantasy book; the Drama filter must empty it.
    let response = engine
        .search(&SearchOptions {
            query: Some("поттер".to_string()),
            genre: Some("Drama".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(response.total, 0);

    let kept = engine
        .search(&SearchOptions {
            query: Some("поттер".to_string()),
            genre: Some("Fantasy".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(kept.total, 1);
    assert_eq!(kept.hits[0].book.id, 2);
}

#[test]
fn latin_query_finds_cyrillic_book() {
    let fixture = Fixture::new(&library_lines());
    let engine = fixture.engine();

    let response = engine
        .search(&SearchOptions {
            query: Some("voina i mir".to_string()),
            ..Default::default()
        })
        .unwrap();

    let hit = response
        .hits
        .iter()
        .find(|h| h.book.id == 1)
        .expect("transliterated query should reach the Cyrillic title");
    assert!(hit.score > 0.0);
    assert!(matches!(hit.match_type, MatchType::Fuzzy | MatchType::Partial));

    // Same for a transliterated author.
    let by_author = engine
        .search(&SearchOptions {
            author: Some("tolstoy".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert!(by_author.hits.iter().any(|h| h.book.id == 1));
}

#[test]
fn series_books_come_in_reading_order() {
    let lines = vec![
        catalog_line("Автор,,:sf", "Том третий", "Сага", "3", 1, "ru", ""),
        catalog_line("Автор,,:sf", "Том первый", "Сага", "1", 2, "ru", ""),
        catalog_line("Автор,,:sf", "Том второй", "Сага", "2", 3, "ru", ""),
    ];
    let fixture = Fixture::new(&lines);
    let engine = fixture.engine();

    let books = engine.get_series_books("Сага").unwrap();
    let nums: Vec<Option<u32>> = books.iter().map(|b| b.series_num).collect();
    assert_eq!(nums, vec![Some(1), Some(2), Some(3)]);

    let series = engine.get_series(None).unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].series, "Сага");
    assert_eq!(series[0].count, 3);
}

#[test]
fn listings_are_sorted_by_count() {
    let fixture = Fixture::new(&library_lines());
    let engine = fixture.engine();

    let genres = engine.get_genres().unwrap();
    assert_eq!(genres[0].genre, "Fantasy");
    assert_eq!(genres[0].count, 3);

    let languages = engine.get_languages().unwrap();
    assert_eq!(languages[0].language, "ru");
    assert_eq!(languages[0].count, 5);
}

#[test]
fn top_rated_requires_rating_of_four() {
    let fixture = Fixture::new(&library_lines());
    let engine = fixture.engine();

    let top = engine.get_top_rated(10, None).unwrap();
    let ids: Vec<BookId> = top.iter().map(|b| b.id).collect();
    // Ratings: 1 and 2 at 5, 3 at 4; the rating-3 and unrated books are out.
    assert_eq!(ids, vec![1, 2, 3]);

    let fantasy = engine.get_top_rated(10, Some("Fantasy")).unwrap();
    let ids: Vec<BookId> = fantasy.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn snapshot_is_reused_when_fresh() {
    let fixture = Fixture::new(&library_lines());

    fixture.engine().initialize().unwrap();
    assert!(fixture.snapshot.exists());

    // A second engine restores from the snapshot and sees the same books.
    let engine = fixture.engine();
    engine.initialize().unwrap();
    assert_eq!(engine.get_stats().unwrap().total_books, 6);
    assert_eq!(
        engine.get_book(1).unwrap().unwrap().title,
        "Война и мир"
    );
}

#[test]
fn stale_snapshot_forces_rebuild() {
    let fixture = Fixture::new(&library_lines());
    fixture.engine().initialize().unwrap();

    // Age the snapshot below the export's mtime.
    let mut doc: serde_json::Value =
        serde_json::from_slice(&fs::read(&fixture.snapshot).unwrap()).unwrap();
    doc["built_at"] = serde_json::Value::from(1u64);
    fs::write(&fixture.snapshot, serde_json::to_vec(&doc).unwrap()).unwrap();

    // Add a new shelf; the rebuild must pick it up.
    let line = catalog_line("Новый,Автор,:sf", "Новая книга", "", "", 100, "ru", "");
    fs::write(fixture.catalog.join("shelf02.inp"), line).unwrap();
    fs::write(fixture.books_dir.join("100.fb2"), b"x").unwrap();

    let engine = fixture.engine();
    assert_eq!(engine.get_stats().unwrap().total_books, 7);
    assert!(engine.get_book(100).unwrap().is_some());
}

#[test]
fn corrupt_snapshot_falls_back_to_rebuild() {
    let fixture = Fixture::new(&library_lines());
    fs::write(&fixture.snapshot, b"definitely not json").unwrap();

    let engine = fixture.engine();
    assert_eq!(engine.get_stats().unwrap().total_books, 6);
}

#[test]
fn books_without_content_files_are_dropped() {
    let fixture = Fixture::new(&library_lines());
    fs::remove_file(fixture.books_dir.join("6.fb2")).unwrap();

    let engine = fixture.engine();
    assert_eq!(engine.get_stats().unwrap().total_books, 5);
    assert!(engine.get_book(6).unwrap().is_none());
}

#[test]
fn missing_catalog_is_a_startup_error() {
    let dir = TempDir::new().unwrap();
    let engine = SearchEngine::new(
        CatalogSource::new(dir.path().join("nope")),
        Arc::new(DirResolver::new(dir.path())),
        None,
    );
    assert!(engine.initialize().is_err());
    assert!(!engine.is_ready());
}

/// Resolver that counts lookups, to prove concurrent first readers share
/// one build.
struct CountingResolver {
    inner: DirResolver,
    calls: AtomicUsize,
}

impl FileResolver for CountingResolver {
    fn resolve(&self, id: BookId) -> Option<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve(id)
    }
}

#[test]
fn concurrent_first_reads_share_one_initialization() {
    let fixture = Fixture::new(&library_lines());
    let resolver = Arc::new(CountingResolver {
        inner: DirResolver::new(&fixture.books_dir),
        calls: AtomicUsize::new(0),
    });
    let engine = Arc::new(SearchEngine::new(
        CatalogSource::new(&fixture.catalog),
        resolver.clone(),
        None,
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            std::thread::spawn(move || {
                engine
                    .search(&SearchOptions {
                        query: Some("ведьмак".to_string()),
                        ..Default::default()
                    })
                    .unwrap()
                    .total
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }

    // One resolver call per catalog line means the parse ran exactly once.
    assert_eq!(resolver.calls.load(Ordering::SeqCst), library_lines().len());
}

#[test]
fn random_sampling_respects_filters() {
    let fixture = Fixture::new(&library_lines());
    let engine = fixture.engine();

    let sample = engine.get_random_books(2, Some("Fantasy"), None).unwrap();
    assert_eq!(sample.len(), 2);
    assert!(
        sample
            .iter()
            .all(|b| b.genres.contains(&"Fantasy".to_string()))
    );
    assert_ne!(sample[0].id, sample[1].id);
}

#[test]
fn search_is_deterministic_across_engines() {
    let fixture = Fixture::new(&library_lines());
    let options = SearchOptions {
        query: Some("drakon".to_string()),
        ..Default::default()
    };

    let a = fixture.engine().search(&options).unwrap();
    let b = fixture.engine().search(&options).unwrap();

    assert_eq!(a.total, b.total);
    let ids_a: Vec<BookId> = a.hits.iter().map(|h| h.book.id).collect();
    let ids_b: Vec<BookId> = b.hits.iter().map(|h| h.book.id).collect();
    assert_eq!(ids_a, ids_b);
}
