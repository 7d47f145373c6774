//! Store connection and pool management.

use exn::ResultExt;
use sqlx::SqliteConnection;
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

// Readers only, and most callers issue one query at a time.
const MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_millis(1500);

/// Options for opening an archive store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    path: PathBuf,
    busy_timeout: Duration,
    max_connections: u32,
}
impl OpenOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), busy_timeout: BUSY_TIMEOUT, max_connections: MAX_CONNECTIONS }
    }

    /// How long to wait on a lock held by a writer (the backup process)
    /// before giving up with `SQLITE_BUSY`.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Zero is treated as one.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.path)
            // The index belongs to the backup process; never create or
            // modify it from here.
            .read_only(true)
            .create_if_missing(false)
            .busy_timeout(self.busy_timeout)
    }
}

/// Read-only handle on an archive index.
///
/// This is the main entry point of the crate. Dropping it (or calling
/// [`close`](Self::close)) releases every pooled connection.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl From<SqlitePool> for Store {
    /// Wrap a pool opened elsewhere. The pool is used as-is, so it is up to
    /// the caller whether it is read-only.
    fn from(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl Store {
    /// Open the archive index at the given path.
    ///
    /// Returns [`StoreUnavailable`](ErrorKind::StoreUnavailable) if the file
    /// does not exist, cannot be read, or is not an SQLite database.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(OpenOptions::new(path.as_ref())).await
    }

    #[instrument("opening archive store", skip_all, fields(path = %options.path.display()))]
    pub async fn open_with(options: OpenOptions) -> Result<Self> {
        let unavailable = || ErrorKind::StoreUnavailable(options.path.clone());
        let pool = SqlitePoolOptions::new()
            // Apply the query-based PRAGMAs to every pooled connection, not
            // only the first one.
            .after_connect(|conn, meta| Box::pin(async move { Self::apply_pragmas(conn, meta).await }))
            .max_connections(options.max_connections)
            .connect_with(options.connect_options())
            .await
            .or_raise(unavailable)?;
        // SQLite opens anything lazily; reading the schema is the first point
        // at which a corrupt or foreign file is noticed.
        let store = Self { pool };
        store.verify().await.or_raise(unavailable)?;
        tracing::debug!("archive store opened");
        Ok(store)
    }

    /// Apply additional PRAGMA settings that aren't exposed via SqliteConnectOptions.
    async fn apply_pragmas(conn: &mut SqliteConnection, _meta: PoolConnectionMetadata) -> sqlx::Result<()> {
        sqlx::query(
            r#"
                PRAGMA query_only = ON;
                PRAGMA cache_size = -8192;
                PRAGMA temp_store = MEMORY;
            "#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    async fn verify(&self) -> sqlx::Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master").fetch_one(&self.pool).await?;
        Ok(())
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the store.
    ///
    /// This waits for all connections to be returned to the pool and then
    /// closes them. After calling this, the Store instance should not be used.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
