#![allow(dead_code)]

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};

const CONTENT: &str = r#"
    CREATE TABLE content (
        ContentID TEXT NOT NULL PRIMARY KEY,
        ContentType INTEGER,
        BookTitle TEXT,
        Title TEXT,
        SubTitle TEXT,
        Attribution TEXT,
        Description TEXT
    )
"#;

const BOOKMARK: &str = r#"
    CREATE TABLE Bookmark (
        BookmarkID TEXT NOT NULL PRIMARY KEY,
        VolumeID TEXT NOT NULL,
        ContentID TEXT NOT NULL,
        Text TEXT,
        Annotation TEXT,
        DateCreated TEXT,
        DateModified TEXT,
        Type TEXT
    )
"#;

/// A throwaway e-reader database with the tables the exporter reads.
pub struct KoboFixture {
    path: PathBuf,
    pool: SqlitePool,
}

impl KoboFixture {
    pub async fn create(path: &Path) -> Self {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .journal_mode(SqliteJournalMode::Delete)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await.unwrap();

        for table in [CONTENT, BOOKMARK] {
            sqlx::query(table).execute(&pool).await.unwrap();
        }

        Self {
            path: path.to_path_buf(),
            pool,
        }
    }

    /// Reopens a fixture closed earlier to add more rows.
    pub async fn open(path: &Path) -> Self {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .journal_mode(SqliteJournalMode::Delete);
        let pool = SqlitePool::connect_with(options).await.unwrap();

        Self {
            path: path.to_path_buf(),
            pool,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Adds a book together with one chapter, `<volume_id>#ch1`.
    pub async fn book(&self, volume_id: &str, title: &str) {
        sqlx::query(
            "INSERT INTO content
                 (ContentID, ContentType, BookTitle, Title, SubTitle, Attribution, Description)
             VALUES (?, 6, NULL, ?, NULL, 'Frank Herbert', '<p>A desert planet</p>')",
        )
        .bind(volume_id)
        .bind(title)
        .execute(&self.pool)
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO content (ContentID, ContentType, BookTitle, Title)
             VALUES (?, 9, ?, 'Chapter One')",
        )
        .bind(format!("{volume_id}#ch1"))
        .bind(title)
        .execute(&self.pool)
        .await
        .unwrap();
    }

    /// Adds a volume the e-reader never finished indexing: it has no title, so
    /// it is not listed as a book although highlights may point at it.
    pub async fn untitled_volume(&self, volume_id: &str) {
        let rows = [
            (volume_id.to_string(), 6),
            (format!("{volume_id}#ch1"), 9),
        ];

        for (content_id, content_type) in rows {
            sqlx::query("INSERT INTO content (ContentID, ContentType, Title) VALUES (?, ?, NULL)")
                .bind(content_id)
                .bind(content_type)
                .execute(&self.pool)
                .await
                .unwrap();
        }
    }

    pub async fn highlight(
        &self,
        bookmark_id: &str,
        volume_id: &str,
        created: &str,
        text: &str,
    ) {
        self.bookmark(bookmark_id, volume_id, created, text, "highlight")
            .await;
    }

    pub async fn bookmark(
        &self,
        bookmark_id: &str,
        volume_id: &str,
        created: &str,
        text: &str,
        kind: &str,
    ) {
        sqlx::query(
            "INSERT INTO Bookmark (
                 BookmarkID, VolumeID, ContentID, Text, Annotation,
                 DateCreated, DateModified, Type
             )
             VALUES (?, ?, ?, ?, NULL, ?, NULL, ?)",
        )
        .bind(bookmark_id)
        .bind(volume_id)
        .bind(format!("{volume_id}#ch1"))
        .bind(text)
        .bind(created)
        .bind(kind)
        .execute(&self.pool)
        .await
        .unwrap();
    }

    pub async fn close(self) -> PathBuf {
        self.pool.close().await;
        self.path
    }
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
