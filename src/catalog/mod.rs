//! Catalog export parsing.
//!
//! A catalog export is a set of plain-text sections (one per shelf of the
//! original library), each line describing one book as `\x04`-delimited
//! fields. Parsing is tolerant: malformed lines are counted and skipped,
//! never fatal. A record only survives when the injected [`FileResolver`]
//! confirms its content file exists.

pub mod parser;
pub mod resolver;
pub mod types;

pub use parser::{CatalogSource, ParseReport, parse_catalog};
pub use resolver::{DirResolver, FileResolver};
pub use types::{Author, Book, BookId};
