//! The incremental export pipeline.
//!
//! A run reads the e-reader database, drops the highlights the ledger already
//! knows about, and appends the rest to one markdown document per book. The
//! ledger is only updated after a book's document has been flushed, so an
//! interrupted run can duplicate output on the next attempt but never lose it.

use crate::error::{error_chain, Error};
use crate::group::{group_by_book, BookGroup};
use crate::ledger::ImportLedger;
use crate::library::{Book, Library};
use crate::render::Renderer;
use crate::source::SourceReader;
use chrono::{Local, NaiveDateTime};
use regex::Regex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, error, info, warn};

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[/\\?%*|"<>\p{Cc}]"#).expect("valid filename regex")
});

/// Highlights appended to one book's document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookReport {
    pub title: String,
    pub path: PathBuf,
    pub imported: usize,
}

/// A book whose new highlights were left out of this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFailure {
    pub book: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub import_date: NaiveDateTime,
    pub books: Vec<BookReport>,
    pub failures: Vec<BookFailure>,
}

impl ExportSummary {
    fn new(import_date: NaiveDateTime) -> Self {
        Self {
            import_date,
            books: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn total_imported(&self) -> usize {
        self.books.iter().map(|b| b.imported).sum()
    }

    pub fn is_successful(&self) -> bool {
        self.failures.is_empty()
    }

    /// True when books were attempted and not a single one was exported.
    pub fn all_failed(&self) -> bool {
        !self.failures.is_empty() && self.books.is_empty()
    }
}

pub struct Exporter {
    output_dir: PathBuf,
    renderer: Renderer,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>, renderer: Renderer) -> Self {
        Self {
            output_dir: output_dir.into(),
            renderer,
        }
    }

    /// Exports every highlight in `source` that has not been exported before.
    pub async fn run(&self, source: &Path) -> Result<ExportSummary, Error> {
        self.run_at(source, Local::now().naive_local()).await
    }

    pub async fn run_at(
        &self,
        source: &Path,
        import_date: NaiveDateTime,
    ) -> Result<ExportSummary, Error> {
        let library = SourceReader::read(source).await?;

        std::fs::create_dir_all(&self.output_dir).map_err(|e| Error::Io {
            path: self.output_dir.clone(),
            source: e,
        })?;

        let ledger = ImportLedger::open(&self.output_dir).await?;
        let summary = self.export(library, &ledger, import_date).await;
        ledger.close().await;

        summary
    }

    async fn export(
        &self,
        mut library: Library,
        ledger: &ImportLedger,
        import_date: NaiveDateTime,
    ) -> Result<ExportSummary, Error> {
        let mut summary = ExportSummary::new(import_date);
        let annotations = std::mem::take(&mut library.annotations);
        let total = annotations.len();

        let mut pending = Vec::with_capacity(total);
        for annotation in annotations {
            if !ledger.is_imported(&annotation.bookmark_id).await? {
                pending.push(annotation);
            }
        }

        debug!(
            "{} of {} highlights have not been imported yet",
            pending.len(),
            total
        );

        for group in group_by_book(pending) {
            match self.export_book(&library, &group, import_date) {
                Ok(report) => {
                    ledger.commit(import_date, &group.annotations).await?;
                    summary.books.push(report);
                }
                Err(e) => {
                    let book = library
                        .book(&group.volume_id)
                        .map(|b| b.title.clone())
                        .unwrap_or_else(|| group.volume_id.clone());

                    let reason = error_chain(&e);

                    error!("Skipping {}: {}", book, reason);
                    summary.failures.push(BookFailure { book, reason });
                }
            }
        }

        if summary.books.is_empty() && summary.failures.is_empty() {
            info!("No new highlights to import");
        }

        Ok(summary)
    }

    /// Renders `group` and appends it to the book's document.
    fn export_book(
        &self,
        library: &Library,
        group: &BookGroup,
        import_date: NaiveDateTime,
    ) -> Result<BookReport, Error> {
        let book = library.book(&group.volume_id).ok_or_else(|| Error::UnknownBook {
            volume_id: group.volume_id.clone(),
            bookmark_id: group
                .annotations
                .first()
                .map(|a| a.bookmark_id.clone())
                .unwrap_or_default(),
        })?;

        info!(
            "Importing {} new annotations for {}",
            group.annotations.len(),
            book.title
        );

        let path = self.output_path(book);

        let mut contents = String::new();
        if !path.exists() {
            debug!("Creating {:?}", path);
            contents.push_str(&self.renderer.render_book_header(book)?);
        }
        contents.push_str(
            &self
                .renderer
                .render_annotations(book, &group.days(), import_date)?,
        );

        append(&path, &contents).map_err(|e| Error::Output {
            path: path.clone(),
            source: e,
        })?;

        Ok(BookReport {
            title: book.title.clone(),
            path,
            imported: group.annotations.len(),
        })
    }

    /// The book's document, named after its title or its content id when the
    /// title has nothing usable in a filename.
    pub fn output_path(&self, book: &Book) -> PathBuf {
        let mut filename = sanitize_title(&book.title);
        if filename.is_empty() {
            warn!(
                "Book title {:?} has no usable characters, using {:?}",
                book.title, book.content_id
            );
            filename = sanitize_title(&book.content_id);
        }

        self.output_dir.join(format!("{filename}.md"))
    }
}

fn sanitize_title(title: &str) -> String {
    UNSAFE_FILENAME_CHARS
        .replace_all(title, "")
        .replace(':', "-")
        .trim()
        .to_string()
}

fn append(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}
