//! Point-in-time resolution of archive contents.
//!
//! Resolution runs in two stages. SQLite does the filtering (cutoff, path
//! globs, the join to `location`) and hands rows back grouped by path in
//! timestamp order; the `Resolver` then collapses each path's history and
//! decides which versions to emit. Only one path's rows are held in memory
//! at a time, so listing the full history of a large archive streams.

use crate::collapse::collapse;
use crate::error::{ErrorKind, Result};
use crate::models::{EntryRow, RunRow};
use crate::{ContentsQuery, Entry, PathFilter, RunInfo, Store};
use async_stream::try_stream;
use exn::ResultExt;
use futures::{Stream, TryStreamExt};
use sqlx::SqliteConnection;
use std::pin::Pin;
use tracing::instrument;

/// Lazily resolved archive contents. Consumed once; run the query again for
/// a fresh copy.
pub type EntryStream<'a> = Pin<Box<dyn Stream<Item = Result<Entry>> + Send + 'a>>;

/// Turns one path's rows at a time into the versions that get emitted.
struct Resolver {
    show_all: bool,
    pending: Vec<Entry>,
    paths: usize,
    emitted: usize,
}
impl Resolver {
    fn new(show_all: bool) -> Self {
        Self { show_all, pending: Vec::new(), paths: 0, emitted: 0 }
    }

    /// Accept the next row (rows must arrive grouped by path, timestamp
    /// ascending). Returns the resolved versions of the previous path once
    /// a new path starts.
    fn push(&mut self, entry: Entry) -> Vec<Entry> {
        let finished = match self.pending.last() {
            Some(last) if last.path != entry.path => self.flush(),
            _ => Vec::new(),
        };
        self.pending.push(entry);
        finished
    }

    /// Resolve whatever path is still pending.
    fn finish(mut self) -> Vec<Entry> {
        let resolved = self.flush();
        tracing::debug!(paths = self.paths, entries = self.emitted, "resolved archive contents");
        resolved
    }

    fn flush(&mut self) -> Vec<Entry> {
        let mut versions = collapse(self.pending.drain(..));
        let Some(latest) = versions.last() else {
            return versions;
        };
        tracing::trace!(path = %latest.path, versions = versions.len(), "collapsed path history");
        self.paths += 1;
        let resolved = match self.show_all {
            // Newest first.
            true => {
                versions.reverse();
                versions
            },
            false => versions.pop().into_iter().collect(),
        };
        self.emitted += resolved.len();
        resolved
    }
}

impl Store {
    async fn table_exists(conn: &mut SqliteConnection, table: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/table_exists.sql"))
            .bind(table)
            .fetch_one(conn)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(count > 0)
    }

    // =========================================================================
    // Contents
    // =========================================================================

    /// Stream the state of the archive as described by `query`.
    ///
    /// Entries are ordered by path ascending and, when the query asks for
    /// every version, by timestamp descending within a path. Consecutive
    /// backups of unchanged content count as one version, timestamped when
    /// that content was first captured.
    ///
    /// The whole stream reads from a single transaction, so it sees one
    /// consistent snapshot of the store even while the backup process
    /// writes to it. An archive with no content (or no tables at all) yields
    /// nothing. If the store fails mid-query the stream yields the error and
    /// ends.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use futures::TryStreamExt;
    /// use rewind_index::{ContentsQuery, Store};
    /// # async fn example(store: &Store) -> rewind_index::error::Result<()> {
    /// let query = ContentsQuery::from_globs(["/home/*"])?.with_show_all(true);
    /// let mut versions = store.archive_contents_stream(&query);
    /// while let Some(entry) = versions.try_next().await? {
    ///     println!("{}\t{}\t{}", entry.timestamp, entry.checksum, entry.path);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn archive_contents_stream<'a>(&'a self, query: &'a ContentsQuery) -> EntryStream<'a> {
        Box::pin(try_stream! {
            tracing::debug!(
                filters = query.filters().len(),
                cutoff = ?query.cutoff(),
                show_all = query.show_all(),
                "resolving archive contents"
            );
            let mut tx = self.pool().begin().await.or_raise(|| ErrorKind::Database)?;
            // Nothing has been archived yet if the backup process never
            // created its tables.
            let initialised = Self::table_exists(&mut tx, "content").await?
                && Self::table_exists(&mut tx, "location").await?;
            if initialised {
                let mut builder = query.to_sql();
                let mut rows = builder.build_query_as::<EntryRow>().fetch(&mut *tx);
                let mut resolver = Resolver::new(query.show_all());
                while let Some(row) = rows.try_next().await.or_raise(|| ErrorKind::Database)? {
                    for entry in resolver.push(Entry::try_from(row)?) {
                        yield entry;
                    }
                }
                for entry in resolver.finish() {
                    yield entry;
                }
            }
            // Read-only: there is nothing to commit.
            tx.rollback().await.or_raise(|| ErrorKind::Database)?;
        })
    }

    /// Resolve the state of the archive as described by `query`.
    ///
    /// Collects [`archive_contents_stream()`](Self::archive_contents_stream)
    /// into a [`Vec`]. On error nothing is returned, never a partial list.
    pub async fn archive_contents(&self, query: &ContentsQuery) -> Result<Vec<Entry>> {
        self.archive_contents_stream(query).try_collect().await
    }

    /// Every version of a single path, newest first.
    ///
    /// The path is matched literally, so glob metacharacters in file names
    /// are harmless.
    #[instrument("fetching path history", skip(self))]
    pub async fn history(&self, path: &str, cutoff: Option<i64>) -> Result<Vec<Entry>> {
        let query = ContentsQuery::new()
            .with_filter(PathFilter::exact(path))
            .with_optional_cutoff(cutoff)
            .with_show_all(true);
        self.archive_contents(&query).await
    }

    // =========================================================================
    // Runs
    // =========================================================================

    /// List every backup run, oldest first.
    pub async fn runs(&self) -> Result<Vec<RunInfo>> {
        let mut conn = self.pool().acquire().await.or_raise(|| ErrorKind::Database)?;
        if !Self::table_exists(&mut conn, "run").await? {
            return Ok(Vec::new());
        }
        let rows: Vec<RunRow> = sqlx::query_as(include_str!("../queries/list_runs.sql"))
            .fetch_all(&mut *conn)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(RunInfo::try_from).collect()
    }

    /// Timestamp of the most recently captured content, if anything has
    /// been archived at all.
    ///
    /// This is the effective cutoff of a query without one.
    pub async fn latest_timestamp(&self) -> Result<Option<i64>> {
        let mut conn = self.pool().acquire().await.or_raise(|| ErrorKind::Database)?;
        if !Self::table_exists(&mut conn, "content").await? {
            return Ok(None);
        }
        let latest: Option<i64> = sqlx::query_scalar(include_str!("../queries/latest_timestamp.sql"))
            .fetch_one(&mut *conn)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(latest)
    }
}
