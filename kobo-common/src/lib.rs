pub mod error;
pub mod export;
pub mod group;
pub mod ledger;
pub mod library;
pub mod render;
pub mod source;

// Re-export commonly used types
pub use error::Error;
pub use export::{ExportSummary, Exporter};
pub use ledger::ImportLedger;
pub use library::{Annotation, Book, LedgerEntry, Library};
pub use render::Renderer;

/// Name of the ledger database kept next to the exported documents.
pub const LEDGER_FILENAME: &str = "kobo-export.sqlite";
