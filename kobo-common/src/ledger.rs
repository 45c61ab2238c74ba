use crate::error::Error;
use crate::library::{Annotation, LedgerEntry};
use crate::LEDGER_FILENAME;
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Durable record of the highlights that have already been exported.
pub struct ImportLedger {
    path: PathBuf,
    pool: SqlitePool,
}

impl ImportLedger {
    /// Opens the ledger kept in `output_dir`, creating it on first use.
    pub async fn open(output_dir: &Path) -> Result<Self, Error> {
        Self::open_at(&output_dir.join(LEDGER_FILENAME)).await
    }

    pub async fn open_at(path: &Path) -> Result<Self, Error> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| Error::ledger(path, e))?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
            pool.close().await;
            return Err(Error::ledger(path, e.into()));
        }

        debug!("Opened import ledger at {:?}", path);

        Ok(Self {
            path: path.to_path_buf(),
            pool,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn is_imported(&self, bookmark_id: &str) -> Result<bool, Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM imported WHERE bookmark_id = ?)",
        )
        .bind(bookmark_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::ledger(&self.path, e))
    }

    /// Records `annotations` as imported at `import_date`.
    ///
    /// All entries are written in one transaction, either every annotation is
    /// recorded or none is.
    pub async fn commit(
        &self,
        import_date: NaiveDateTime,
        annotations: &[Annotation],
    ) -> Result<(), Error> {
        if annotations.is_empty() {
            return Ok(());
        }

        self.insert_all(import_date, annotations)
            .await
            .map_err(|e| Error::ledger(&self.path, e))?;

        debug!("Committed {} highlights to the ledger", annotations.len());
        Ok(())
    }

    async fn insert_all(
        &self,
        import_date: NaiveDateTime,
        annotations: &[Annotation],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        for annotation in annotations {
            sqlx::query("INSERT INTO imported (bookmark_id, date_imported) VALUES (?, ?)")
                .bind(annotation.bookmark_id.as_str())
                .bind(import_date)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await
    }

    pub async fn entries(&self) -> Result<Vec<LedgerEntry>, Error> {
        sqlx::query_as::<_, LedgerEntry>(
            "SELECT bookmark_id, date_imported FROM imported ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::ledger(&self.path, e))
    }

    /// Releases the underlying connection.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
