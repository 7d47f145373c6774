use crate::error::{Error, ErrorKind};

/// A single backup execution.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunInfo {
    pub name: String,
    /// Completion time of the run, in seconds since the Unix epoch.
    pub timestamp: i64,
}

#[derive(sqlx::FromRow)]
pub(crate) struct RunRow {
    run_name: String,
    timestamp: i64,
}
impl TryFrom<RunRow> for RunInfo {
    type Error = Error;
    fn try_from(row: RunRow) -> Result<Self, Self::Error> {
        if row.run_name.is_empty() {
            exn::bail!(ErrorKind::InvalidData("run name"));
        }
        Ok(Self { name: row.run_name, timestamp: row.timestamp })
    }
}
