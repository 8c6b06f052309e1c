use crate::catalog::types::{Book, BookId};
use crate::index::types::{BookIndex, IndexStats};
use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// On-disk snapshot document.
///
/// The book table is stored as a flat list; ids are the identity keys and
/// the maps are rebuilt losslessly on load.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    built_at: u64,
    stats: IndexStats,
    books: Vec<Book>,
    title_index: FxHashMap<String, Vec<BookId>>,
    author_index: FxHashMap<String, Vec<BookId>>,
    genre_index: FxHashMap<String, Vec<BookId>>,
}

/// Best-effort persistence for a built index, so a restart can skip the
/// catalog parse when nothing changed.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot, or `None` on any miss.
    ///
    /// A missing file, unreadable or corrupt JSON, or a snapshot older
    /// than `source_mtime` (the catalog export's last-modified time) are
    /// all misses that trigger a full rebuild, never errors.
    pub fn load(&self, source_mtime: u64) -> Option<BookIndex> {
        if !self.path.exists() {
            return None;
        }

        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "failed to read index snapshot");
                return None;
            }
        };

        let snapshot: Snapshot = match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "corrupt index snapshot, rebuilding");
                return None;
            }
        };

        if snapshot.built_at < source_mtime {
            info!(
                built_at = snapshot.built_at,
                source_mtime, "catalog export newer than snapshot, rebuilding"
            );
            return None;
        }

        let books: FxHashMap<BookId, Book> =
            snapshot.books.into_iter().map(|b| (b.id, b)).collect();

        Some(BookIndex {
            books,
            title_index: snapshot.title_index,
            author_index: snapshot.author_index,
            genre_index: snapshot.genre_index,
            stats: snapshot.stats,
        })
    }

    /// Persist the index atomically (write temp, then rename).
    ///
    /// A torn write leaves only the temp file behind; the snapshot path
    /// itself is either the old complete document or the new one.
    pub fn save(&self, index: &BookIndex) -> Result<()> {
        let snapshot = Snapshot {
            built_at: index.stats.built_at,
            stats: index.stats.clone(),
            books: index.books.values().cloned().collect(),
            title_index: index.title_index.clone(),
            author_index: index.author_index.clone(),
            genre_index: index.genre_index.clone(),
        };

        let json = serde_json::to_vec(&snapshot).context("failed to serialize index snapshot")?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, &json)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to publish {}", self.path.display()))?;

        info!(path = %self.path.display(), bytes = json.len(), "index snapshot saved");
        Ok(())
    }
}
