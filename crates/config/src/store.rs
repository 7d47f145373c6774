use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use rewind_index::error::Result as IndexResult;
use rewind_index::{OpenOptions, Store};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_FILENAME: &str = "archive.db";

/// Where the archive index lives and how to connect to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the SQLite index written by the backup process.
    pub path: PathBuf,
    pub busy_timeout_ms: u64,
    pub max_connections: u32,
}
impl Default for StoreConfig {
    fn default() -> Self {
        // Falls back to the working directory on platforms without a home
        // directory.
        let path = ProjectDirs::from("", "", "rewind")
            .map(|dirs| dirs.data_dir().join(DEFAULT_FILENAME))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILENAME));
        Self { path, busy_timeout_ms: 1500, max_connections: 5 }
    }
}
impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("store.path"));
        }
        if self.max_connections == 0 {
            exn::bail!(ErrorKind::Invalid("store.max_connections"));
        }
        Ok(())
    }

    pub fn open_options(&self) -> OpenOptions {
        OpenOptions::new(&self.path)
            .busy_timeout(Duration::from_millis(self.busy_timeout_ms))
            .max_connections(self.max_connections)
    }

    /// Open the configured archive index.
    pub async fn open(&self) -> IndexResult<Store> {
        Store::open_with(self.open_options()).await
    }
}
