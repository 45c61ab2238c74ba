use crate::error::Error;
use crate::library::{parse_timestamp, Annotation, Book, Library};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{debug, info};

const BOOKS: &str = r#"
    SELECT
        volume.ContentID AS content_id,
        volume.Title AS title,
        volume.BookTitle AS display_title,
        volume.SubTitle AS subtitle,
        volume.Attribution AS attribution,
        volume.Description AS description
    FROM content volume
    WHERE volume.ContentType = '6' AND volume.Title IS NOT NULL
"#;

const ANNOTATIONS: &str = r#"
    SELECT
        Bookmark.BookmarkID AS bookmark_id,
        Bookmark.ContentID AS content_id,
        Bookmark.VolumeID AS volume_id,
        content.Title AS chapter_title,
        COALESCE(Bookmark.Text, '') AS text,
        Bookmark.Annotation AS note,
        Bookmark.DateCreated AS date_created,
        Bookmark.DateModified AS date_modified
    FROM Bookmark
    JOIN content ON Bookmark.ContentID = content.ContentID
    JOIN content volume ON Bookmark.VolumeID = volume.ContentID
    WHERE Bookmark.Type = 'highlight'
    ORDER BY Bookmark.DateCreated
"#;

#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    content_id: String,
    title: String,
    display_title: Option<String>,
    subtitle: Option<String>,
    attribution: Option<String>,
    description: Option<String>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            content_id: row.content_id,
            title: row.title,
            display_title: row.display_title,
            subtitle: row.subtitle,
            attribution: row.attribution,
            description: row.description,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AnnotationRow {
    bookmark_id: String,
    content_id: String,
    volume_id: String,
    chapter_title: Option<String>,
    text: String,
    note: Option<String>,
    date_created: String,
    date_modified: Option<String>,
}

impl AnnotationRow {
    fn into_annotation(self) -> Result<Annotation, String> {
        let created_at = parse_timestamp(&self.date_created).ok_or_else(|| {
            format!(
                "highlight {} has an unreadable creation date {:?}",
                self.bookmark_id, self.date_created
            )
        })?;

        Ok(Annotation {
            created_at,
            modified_at: self.date_modified.as_deref().and_then(parse_timestamp),
            bookmark_id: self.bookmark_id,
            content_id: self.content_id,
            volume_id: self.volume_id,
            chapter_title: self.chapter_title,
            text: self.text,
            note: self.note.filter(|n| !n.trim().is_empty()),
        })
    }
}

/// Read access to the e-reader database.
pub struct SourceReader;

impl SourceReader {
    /// Reads every book and highlight from the database at `path`.
    ///
    /// The database is opened read-only and never created, a missing path
    /// leaves the filesystem untouched.
    pub async fn read(path: &Path) -> Result<Library, Error> {
        if !path.is_file() {
            return Err(Error::source_unavailable(path, "no such file"));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| Error::source_unavailable(path, e))?;

        let library = Self::query(&pool).await;
        pool.close().await;

        let library = library.map_err(|reason| Error::source_unavailable(path, reason))?;

        info!(
            "Read {} books and {} highlights from {:?}",
            library.books.len(),
            library.annotations.len(),
            path
        );

        Ok(library)
    }

    async fn query(pool: &SqlitePool) -> Result<Library, String> {
        let books = sqlx::query_as::<_, BookRow>(BOOKS)
            .fetch_all(pool)
            .await
            .map_err(|e| format!("failed to read books: {e}"))?
            .into_iter()
            .map(Book::from)
            .map(|book| (book.content_id.clone(), book))
            .collect();

        let annotations = sqlx::query_as::<_, AnnotationRow>(ANNOTATIONS)
            .fetch_all(pool)
            .await
            .map_err(|e| format!("failed to read highlights: {e}"))?
            .into_iter()
            .map(AnnotationRow::into_annotation)
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Source query returned {} highlights", annotations.len());

        Ok(Library { books, annotations })
    }
}
