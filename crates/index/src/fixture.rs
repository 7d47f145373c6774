//! Archive stores for tests.
//!
//! Writing the index is the backup process's job, so the only code in this
//! crate that ever writes one lives here.

use crate::{Entry, Store};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FILES: &str = "abcdefghxy";
// 2017-09-22T00:00:00Z
const FIRST_DAY: i64 = 1_506_038_400;
const DAY: i64 = 86_400;

/// Runs of the canonical archive and the files each one backed up.
pub(crate) const RUNS: [(&str, &str); 4] = [
    ("2017-09-22", "abcdex"),
    ("2017-09-23", "abcdfx"),
    ("2017-09-24", "abefgy"),
    ("2017-09-25", "abcfghy"),
];

pub(crate) fn file_path(file: char) -> String {
    format!("/home/user/{file}.txt")
}

#[derive(Debug, Clone)]
pub(crate) struct ContentRow {
    pub(crate) run_name: String,
    pub(crate) timestamp: i64,
    pub(crate) path: String,
    pub(crate) checksum: String,
}

#[derive(Debug, Clone)]
pub(crate) struct Fixture {
    schema: bool,
    runs: Vec<(String, i64)>,
    content: Vec<ContentRow>,
    locations: Vec<(String, String)>,
}

impl Fixture {
    /// A store with the schema in place and no rows.
    pub(crate) fn new() -> Self {
        Self { schema: true, runs: Vec::new(), content: Vec::new(), locations: Vec::new() }
    }

    /// A valid SQLite file that the backup process never initialised.
    pub(crate) fn uninitialised() -> Self {
        Self { schema: false, ..Self::new() }
    }

    /// Four daily runs over files `a`..`h`, `x` and `y`. Every (run, file)
    /// pair gets a fresh checksum, except `b`, which every run backs up
    /// without its content ever changing.
    pub(crate) fn canonical() -> Self {
        let mut fixture = Self::new();
        let mut sequence = 0u32;
        let mut next_checksum = move || {
            sequence += 1;
            format!("{sequence:032x}")
        };
        let mut b_checksum: Option<String> = None;
        for (day, (run, files)) in RUNS.iter().enumerate() {
            for file in files.chars() {
                let index = FILES.find(file).unwrap_or_default() as i64;
                let timestamp = FIRST_DAY + day as i64 * DAY + 3_600 + index * 60;
                let checksum = match file {
                    'b' => b_checksum.get_or_insert_with(&mut next_checksum).clone(),
                    _ => next_checksum(),
                };
                fixture = fixture.content(run, timestamp, &file_path(file), &checksum, &format!("/archive/{run}"));
            }
        }
        fixture
    }

    /// Record a content row, and a location for its checksum unless one is
    /// already known. The run's timestamp tracks its newest content row.
    pub(crate) fn content(self, run: &str, timestamp: i64, path: &str, checksum: &str, archive_dir: &str) -> Self {
        let mut fixture = self.unlocated(run, timestamp, path, checksum);
        if !fixture.locations.iter().any(|(c, _)| c == checksum) {
            fixture.locations.push((checksum.to_string(), archive_dir.to_string()));
        }
        fixture
    }

    /// Record a content row without any location for its checksum.
    pub(crate) fn unlocated(mut self, run: &str, timestamp: i64, path: &str, checksum: &str) -> Self {
        match self.runs.iter_mut().find(|(name, _)| name == run) {
            Some((_, run_timestamp)) => *run_timestamp = (*run_timestamp).max(timestamp),
            None => self.runs.push((run.to_string(), timestamp)),
        }
        self.content.push(ContentRow {
            run_name: run.to_string(),
            timestamp,
            path: path.to_string(),
            checksum: checksum.to_string(),
        });
        self
    }

    pub(crate) fn rows(&self) -> &[ContentRow] {
        &self.content
    }

    pub(crate) fn runs(&self) -> &[(String, i64)] {
        &self.runs
    }

    /// Every content row joined to its location, in insertion order.
    pub(crate) fn entries(&self) -> Vec<Entry> {
        self.content
            .iter()
            .filter_map(|row| {
                let (_, archive_dir) = self.locations.iter().find(|(c, _)| c == &row.checksum)?;
                Some(Entry::new(&row.path, row.timestamp, archive_dir, &row.checksum))
            })
            .collect()
    }

    /// Write the fixture to `archive.db` inside `dir`.
    pub(crate) async fn write(&self, dir: &Path) -> PathBuf {
        let path = dir.join("archive.db");
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Delete);
        let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await.unwrap();
        // Forces SQLite to write a header, so even the uninitialised store
        // is a real (table-less) database rather than an empty file.
        sqlx::query("PRAGMA user_version = 1").execute(&pool).await.unwrap();
        if self.schema {
            sqlx::query(include_str!("../fixtures/schema.sql")).execute(&pool).await.unwrap();
        }
        let mut tx = pool.begin().await.unwrap();
        for (name, timestamp) in &self.runs {
            sqlx::query("INSERT INTO run (run_name, timestamp) VALUES (?, ?)")
                .bind(name)
                .bind(timestamp)
                .execute(&mut *tx)
                .await
                .unwrap();
        }
        for row in &self.content {
            sqlx::query("INSERT INTO content (run_name, timestamp, path, checksum) VALUES (?, ?, ?, ?)")
                .bind(&row.run_name)
                .bind(row.timestamp)
                .bind(&row.path)
                .bind(&row.checksum)
                .execute(&mut *tx)
                .await
                .unwrap();
        }
        for (checksum, archive_dir) in &self.locations {
            sqlx::query("INSERT INTO location (checksum, archive_dir) VALUES (?, ?)")
                .bind(checksum)
                .bind(archive_dir)
                .execute(&mut *tx)
                .await
                .unwrap();
        }
        tx.commit().await.unwrap();
        pool.close().await;
        path
    }

    /// Write the fixture to a fresh temporary directory and open it. Keep the
    /// directory alive for as long as the store is used.
    pub(crate) async fn open(&self) -> (TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let path = self.write(dir.path()).await;
        let store = Store::open(&path).await.unwrap();
        (dir, store)
    }
}
