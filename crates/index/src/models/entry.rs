use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use time::UtcDateTime;

/// One resolved version of an archived file.
///
/// The timestamp is the moment this content was first captured for the
/// path, which may be earlier than the run that most recently saw it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry {
    pub path: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    /// Directory holding the content-addressed blob.
    pub archive_dir: String,
    pub checksum: String,
}
impl Entry {
    pub fn new(
        path: impl Into<String>,
        timestamp: i64,
        archive_dir: impl Into<String>,
        checksum: impl Into<String>,
    ) -> Self {
        Self { path: path.into(), timestamp, archive_dir: archive_dir.into(), checksum: checksum.into() }
    }

    pub fn recorded_at(&self) -> Result<UtcDateTime> {
        UtcDateTime::from_unix_timestamp(self.timestamp).or_raise(|| ErrorKind::InvalidData("timestamp"))
    }
}
impl From<Entry> for (String, i64, String, String) {
    fn from(entry: Entry) -> Self {
        (entry.path, entry.timestamp, entry.archive_dir, entry.checksum)
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct EntryRow {
    path: String,
    timestamp: i64,
    archive_dir: String,
    checksum: String,
}
impl TryFrom<EntryRow> for Entry {
    type Error = Error;
    fn try_from(row: EntryRow) -> std::result::Result<Self, Self::Error> {
        if row.checksum.is_empty() {
            exn::bail!(ErrorKind::InvalidData("checksum"));
        }
        Ok(Self { path: row.path, timestamp: row.timestamp, archive_dir: row.archive_dir, checksum: row.checksum })
    }
}
