use crate::catalog::types::BookId;
use std::path::{Path, PathBuf};

/// Collaborator that maps a book id to its content file.
///
/// The catalog export routinely references books whose files were never
/// extracted; the parser drops those records, so the resolver is consulted
/// once per decoded line. Implementations must be cheap and side-effect
/// free.
pub trait FileResolver: Send + Sync {
    /// Path to the book's content file, if it exists.
    fn resolve(&self, id: BookId) -> Option<PathBuf>;

    fn exists(&self, id: BookId) -> bool {
        self.resolve(id).is_some()
    }
}

/// Resolver over a flat directory of `<id>.<ext>` files.
#[derive(Debug, Clone)]
pub struct DirResolver {
    books_dir: PathBuf,
    extension: String,
}

impl DirResolver {
    pub fn new(books_dir: impl Into<PathBuf>) -> Self {
        Self {
            books_dir: books_dir.into(),
            extension: "fb2".to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn books_dir(&self) -> &Path {
        &self.books_dir
    }
}

impl FileResolver for DirResolver {
    fn resolve(&self, id: BookId) -> Option<PathBuf> {
        let path = self.books_dir.join(format!("{}.{}", id, self.extension));
        path.is_file().then_some(path)
    }
}
