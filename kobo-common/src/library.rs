use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    pub content_id: String,
    pub title: String,
    pub display_title: Option<String>,
    pub subtitle: Option<String>,
    pub attribution: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Annotation {
    pub bookmark_id: String,
    pub content_id: String,
    pub volume_id: String,
    pub chapter_title: Option<String>,
    pub text: String,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
    pub modified_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct LedgerEntry {
    pub bookmark_id: String,
    pub date_imported: NaiveDateTime,
}

/// Everything read from the e-reader in one pass.
#[derive(Debug, Default)]
pub struct Library {
    pub books: HashMap<String, Book>,

    /// Highlights in ascending order of creation.
    pub annotations: Vec<Annotation>,
}

impl Library {
    pub fn book(&self, content_id: &str) -> Option<&Book> {
        self.books.get(content_id)
    }
}

/// Parses the timestamp shapes the e-reader writes, e.g. `2020-01-01T10:00:00.000`,
/// `2020-01-01T10:00:00Z` or `2020-01-01 10:00:00`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim().trim_end_matches('Z');

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}
