//! Point-in-time query layer for a content-addressed backup archive.
//!
//! The archive index is an SQLite database populated by the backup process.
//! This crate never writes to it: it opens the file read-only and answers one
//! question, "what did the archive look like at a given moment?"
//!
//! # Architecture
//! The store holds three tables:
//! - **run**: one row per backup execution, keyed by run name.
//! - **content**: one row per (run, path) that was backed up, with the
//!   capture timestamp and the checksum of the file's bytes.
//! - **location**: where the blob for each checksum physically lives.
//!
//! A file that is backed up again without changing produces a new content
//! row with the same checksum. Those rows are not separate versions: they
//! [`collapse`](crate::collapse::collapse) into one version stamped with the
//! time the content was first seen.
//!
//! # Examples
//!
//! ```no_run
//! use futures::TryStreamExt;
//! use rewind_index::{ContentsQuery, PathFilter, Store};
//! # async fn example() -> rewind_index::error::Result<()> {
//! let store = Store::open("/var/lib/backup/archive.db").await?;
//! let query = ContentsQuery::new()
//!     .with_filter(PathFilter::new("*.txt")?)
//!     .with_cutoff(1_506_297_600);
//! let mut contents = store.archive_contents_stream(&query);
//! while let Some(entry) = contents.try_next().await? {
//!     println!("{} @ {} -> {}", entry.path, entry.timestamp, entry.archive_dir);
//! }
//! store.close().await;
//! # Ok(())
//! # }
//! ```

mod archive;
pub mod collapse;
mod db;
pub mod error;
pub mod filter;
#[cfg(test)]
mod fixture;
mod models;
mod query;

pub use crate::archive::EntryStream;
pub use crate::db::{OpenOptions, Store};
pub use crate::filter::PathFilter;
pub use crate::models::{Entry, RunInfo};
pub use crate::query::ContentsQuery;
