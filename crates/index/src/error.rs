//! Archive Index Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An archive index error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive index operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The store file is missing, unreadable, or not an SQLite database.
    #[display("archive store unavailable: {}", _0.display())]
    StoreUnavailable(#[error(not(source))] PathBuf),
    /// A path filter could not be turned into a pattern. Report it to
    /// whoever wrote the filter; retrying with the same input won't help.
    #[display("invalid path filter: {_0}")]
    InvalidFilter(#[error(not(source))] String),
    #[display("database error")]
    Database,
    /// A row could not be converted into its model.
    #[display("invalid archive data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// The store is a local file, so nothing here is transient.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
