//! Search benchmarks over a synthetic catalog.
//!
//! Run with: `cargo bench`
//! Save baseline: `cargo bench -- --save-baseline main`
//! Compare: `cargo bench -- --baseline main`

use bookdex::catalog::{Author, Book, BookId, FileResolver};
use bookdex::index::build_index;
use bookdex::search::{SearchEngine, SearchOptions};
use criterion::{Criterion, criterion_group, criterion_main};
use std::path::PathBuf;
use std::sync::Arc;

struct NoFiles;

impl FileResolver for NoFiles {
    fn resolve(&self, _id: BookId) -> Option<PathBuf> {
        None
    }
}

const TITLE_WORDS: &[&str] = &[
    "война", "мир", "преступление", "наказание", "мастер", "маргарита", "тихий", "дон",
    "белая", "гвардия", "собачье", "сердце", "отцы", "дети", "мертвые", "души",
];

const SURNAMES: &[&str] = &[
    "Толстой", "Достоевский", "Булгаков", "Шолохов", "Тургенев", "Гоголь", "Чехов", "Пушкин",
];

const GENRES: &[&str] = &["prose", "sf", "detective", "poetry", "history"];

/// Deterministic synthetic catalog; ids double as the randomness source.
fn synthetic_engine(count: usize) -> SearchEngine {
    let books = (0..count as BookId).map(|id| {
        let w = id as usize;
        let title = format!(
            "{} {}",
            TITLE_WORDS[w % TITLE_WORDS.len()],
            TITLE_WORDS[(w / 3 + 5) % TITLE_WORDS.len()]
        );
        let book = Book {
            id,
            title,
            authors: vec![Author {
                last_name: SURNAMES[w % SURNAMES.len()].to_string(),
                first_name: None,
                middle_name: None,
            }],
            genres: vec![GENRES[w % GENRES.len()].to_string()],
            series: (w % 7 == 0).then(|| format!("Серия {}", w % 50)),
            series_num: (w % 7 == 0).then(|| (w % 10) as u32),
            size: 1000,
            format: "fb2".to_string(),
            date: "2020-01-01".to_string(),
            language: if w % 10 == 0 { "en" } else { "ru" }.to_string(),
            rating: (w % 4 == 0).then(|| 4 + (w % 2) as u8),
            folder: "bench".to_string(),
        };
        (id, book)
    });

    SearchEngine::from_index(build_index(books.collect()), Arc::new(NoFiles))
}

fn bench_search(c: &mut Criterion) {
    let engine = synthetic_engine(20_000);

    let mut group = c.benchmark_group("search");

    group.bench_function("fuzzy_free_text", |b| {
        let options = SearchOptions {
            query: Some("voina i mir".to_string()),
            ..Default::default()
        };
        b.iter(|| engine.search(&options).unwrap().total)
    });

    group.bench_function("exact_title_word", |b| {
        let options = SearchOptions {
            query: Some("мастер".to_string()),
            ..Default::default()
        };
        b.iter(|| engine.search(&options).unwrap().total)
    });

    group.bench_function("genre_only", |b| {
        let options = SearchOptions {
            genre: Some("prose".to_string()),
            ..Default::default()
        };
        b.iter(|| engine.search(&options).unwrap().total)
    });

    group.bench_function("author_fuzzy", |b| {
        let options = SearchOptions {
            author: Some("dostoevsky".to_string()),
            ..Default::default()
        };
        b.iter(|| engine.search(&options).unwrap().total)
    });

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    c.bench_function("build_index_20k", |b| {
        b.iter(|| {
            let engine = synthetic_engine(20_000);
            engine.get_stats().unwrap().total_books
        })
    });
}

criterion_group!(benches, bench_search, bench_build);
criterion_main!(benches);
