use crate::catalog::resolver::FileResolver;
use crate::catalog::types::{Author, Book, BookId};
use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::debug;

/// Field delimiter inside catalog sections (EOT control character)
const FIELD_DELIMITER: char = '\u{0004}';

/// Lines with fewer fields than this are malformed and skipped
const MIN_FIELDS: usize = 10;

/// The catalog export on disk: either a single section file or a directory
/// of `*.inp` section files (one per shelf).
#[derive(Debug, Clone)]
pub struct CatalogSource {
    path: PathBuf,
}

/// One text block of the export, named after the file it came from.
struct Section {
    name: String,
    content: String,
}

impl CatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last-modified time of the export in unix seconds.
    ///
    /// For a directory source this is the newest `*.inp` mtime, so touching
    /// any shelf invalidates the snapshot.
    pub fn modified_at(&self) -> Result<u64> {
        let mut newest = mtime_secs(&self.path)?;
        if self.path.is_dir() {
            for path in self.section_paths()? {
                newest = newest.max(mtime_secs(&path)?);
            }
        }
        Ok(newest)
    }

    /// Read every section of the export.
    ///
    /// Sections are returned sorted by file name so that duplicate-id
    /// resolution (last wins) is deterministic across runs. Byte content
    /// is decoded lossily: a stray invalid sequence corrupts one line, not
    /// the whole parse.
    fn read_sections(&self) -> Result<Vec<Section>> {
        if !self.path.exists() {
            bail!("catalog export not found: {}", self.path.display());
        }

        let paths = if self.path.is_dir() {
            self.section_paths()?
        } else {
            vec![self.path.clone()]
        };

        let mut sections = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = fs::read(&path)
                .with_context(|| format!("failed to read catalog section {}", path.display()))?;
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            sections.push(Section {
                name,
                content: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(sections)
    }

    fn section_paths(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.path)
            .with_context(|| format!("failed to read catalog dir {}", self.path.display()))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("inp"))
            .collect();
        paths.sort();
        Ok(paths)
    }
}

fn mtime_secs(path: &Path) -> Result<u64> {
    let meta = fs::metadata(path)
        .with_context(|| format!("failed to stat catalog export {}", path.display()))?;
    let modified = meta
        .modified()
        .with_context(|| format!("no modification time for {}", path.display()))?;
    Ok(modified
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs())
}

/// Per-run parsing diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Records decoded and confirmed on disk
    pub parsed: usize,
    /// Malformed lines (too few fields or non-numeric id)
    pub skipped: usize,
    /// Well-formed records whose content file is missing
    pub missing_file: usize,
}

impl ParseReport {
    fn merge(&mut self, other: ParseReport) {
        self.parsed += other.parsed;
        self.skipped += other.skipped;
        self.missing_file += other.missing_file;
    }
}

/// Parse the whole export into a book table.
///
/// Sections are decoded in parallel, then merged in section order; a later
/// record with a duplicate id overwrites an earlier one (catalog exports
/// may concatenate multiple generations of a shelf). One malformed line
/// never aborts the parse.
pub fn parse_catalog(
    source: &CatalogSource,
    resolver: &dyn FileResolver,
) -> Result<(FxHashMap<BookId, Book>, ParseReport)> {
    let sections = source.read_sections()?;

    let parsed: Vec<(Vec<Book>, ParseReport)> = sections
        .par_iter()
        .map(|section| parse_section(&section.content, &section.name, resolver))
        .collect();

    let mut books = FxHashMap::default();
    let mut report = ParseReport::default();
    for (section_books, section_report) in parsed {
        report.merge(section_report);
        for book in section_books {
            // Last wins across sections and within a section.
            books.insert(book.id, book);
        }
    }

    debug!(
        parsed = report.parsed,
        skipped = report.skipped,
        missing_file = report.missing_file,
        "catalog export decoded"
    );
    Ok((books, report))
}

/// Parse one section, preserving line order.
fn parse_section(
    content: &str,
    folder: &str,
    resolver: &dyn FileResolver,
) -> (Vec<Book>, ParseReport) {
    let mut books = Vec::new();
    let mut report = ParseReport::default();

    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line, folder) {
            Some(book) if resolver.exists(book.id) => {
                report.parsed += 1;
                books.push(book);
            }
            Some(_) => report.missing_file += 1,
            None => report.skipped += 1,
        }
    }

    (books, report)
}

/// Decode one `\x04`-delimited catalog line.
///
/// Field layout: 0 authors:genre, 1 secondary genre, 2 title, 3 series,
/// 4 series position, 5 id, 6 size, 9 format, 10 date, 11 language,
/// 12 rating. Returns `None` for lines with fewer than 10 fields or a
/// non-numeric id; optional numeric fields that fail to parse are simply
/// absent.
pub fn parse_line(line: &str, folder: &str) -> Option<Book> {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let id: BookId = fields[5].trim().parse().ok()?;

    // Authors before the first colon, genre chain after it.
    let (author_part, genre_part) = fields[0].split_once(':').unwrap_or((fields[0], ""));
    let authors = parse_authors(author_part);

    let secondary_genre = fields.get(1).copied().unwrap_or("");
    let genre_candidates: Vec<&str> = if secondary_genre.is_empty() {
        vec![genre_part]
    } else {
        // A comma in a genre tag means author fields spilled over; drop it.
        vec![genre_part, secondary_genre]
            .into_iter()
            .filter(|g| !g.contains(','))
            .collect()
    };
    let genres: Vec<String> = genre_candidates
        .into_iter()
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect();

    Some(Book {
        id,
        title: fields.get(2).copied().unwrap_or("").to_string(),
        authors,
        genres,
        series: non_empty(fields.get(3).copied()),
        series_num: fields.get(4).and_then(|f| f.trim().parse().ok()),
        size: fields.get(6).and_then(|f| f.trim().parse().ok()).unwrap_or(0),
        format: fields
            .get(9)
            .filter(|f| !f.is_empty())
            .copied()
            .unwrap_or("fb2")
            .to_string(),
        date: fields.get(10).copied().unwrap_or("").to_string(),
        language: fields
            .get(11)
            .filter(|f| !f.is_empty())
            .copied()
            .unwrap_or("ru")
            .to_string(),
        rating: fields.get(12).and_then(|f| f.trim().parse().ok()),
        folder: folder.to_string(),
    })
}

/// Authors come as comma-separated triples: last, first, middle, repeated.
fn parse_authors(part: &str) -> Vec<Author> {
    let cells: Vec<&str> = part.split(',').collect();
    let mut authors = Vec::new();

    for triple in cells.chunks(3) {
        let last = triple[0].trim();
        if last.is_empty() {
            continue;
        }
        authors.push(Author {
            last_name: last.to_string(),
            first_name: non_empty(triple.get(1).copied()),
            middle_name: non_empty(triple.get(2).copied()),
        });
    }

    authors
}

fn non_empty(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
