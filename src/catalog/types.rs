use serde::{Deserialize, Serialize};

/// Unique identifier for a book in the catalog
pub type BookId = u32;

/// One author of a book. Only the last name is guaranteed present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
}

impl Author {
    /// Full name as "last first middle", empty parts omitted.
    pub fn full_name(&self) -> String {
        let mut parts = vec![self.last_name.as_str()];
        if let Some(first) = self.first_name.as_deref() {
            parts.push(first);
        }
        if let Some(middle) = self.middle_name.as_deref() {
            parts.push(middle);
        }
        parts.join(" ")
    }
}

/// Immutable book record decoded from one catalog line.
///
/// A `Book` exists in the index only if its backing content file was
/// confirmed present at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub authors: Vec<Author>,
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_num: Option<u32>,
    pub size: u64,
    pub format: String,
    pub date: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    /// Storage-location hint (which shelf/section the record came from)
    pub folder: String,
}
