//! Error taxonomy for the export pipeline.
//!
//! `Render`, `UnknownBook` and `Output` only concern a single book and end up in
//! the [`ExportSummary`](crate::ExportSummary), every other variant aborts the run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The e-reader database is missing, unreadable or not shaped as expected.
    #[error("Source database {path:?} is unavailable: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    /// The import ledger could not be opened, read or committed to.
    #[error("Import ledger {path:?} could not be updated")]
    LedgerWrite {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to render {book:?}: {reason}")]
    Render { book: String, reason: String },

    /// A highlight refers to a volume that is not a known book.
    #[error("Highlight {bookmark_id} belongs to unknown book {volume_id}")]
    UnknownBook {
        volume_id: String,
        bookmark_id: String,
    },

    #[error("Failed to write {path:?}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to prepare {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load templates: {reason}")]
    Template { reason: String },
}

impl Error {
    pub(crate) fn source_unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::SourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn ledger(path: impl Into<PathBuf>, source: sqlx::Error) -> Self {
        Error::LedgerWrite {
            path: path.into(),
            source,
        }
    }
}

/// Joins an error with all of its causes, tera in particular hides the useful
/// part of a failure in the source chain.
pub(crate) fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}
