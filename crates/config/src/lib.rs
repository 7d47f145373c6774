//! Layered configuration for rewind.
//!
//! Values are merged, later layers winning, from:
//! 1. built-in defaults,
//! 2. an optional configuration file (TOML, YAML or JSON, chosen by file
//!    extension),
//! 3. `REWIND_`-prefixed environment variables, with `__` separating nested
//!    keys (`REWIND_STORE__PATH=/srv/backup/archive.db`).
//!
//! ```toml
//! [store]
//! path = "/srv/backup/archive.db"
//! busy_timeout_ms = 1500
//! max_connections = 5
//!
//! [query]
//! case_sensitive = true
//! ```

pub mod error;
mod query;
mod store;

pub use crate::query::QueryConfig;
pub use crate::store::StoreConfig;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "REWIND_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub query: QueryConfig,
}

impl Config {
    /// Load and validate the configuration.
    ///
    /// `file` is optional, but if given it must exist.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(file)?.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    /// The merged (but not yet extracted) configuration providers.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = Self::merge_file(figment, path)?;
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
        // Figment quietly skips missing files; a file the user asked for
        // should exist.
        if !path.is_file() {
            exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
        }
        tracing::debug!(path = %path.display(), "loading configuration file");
        let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
        Ok(match extension.as_deref() {
            Some("toml") => figment.merge(Toml::file(path)),
            Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
            Some("json") => figment.merge(Json::file(path)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.store.validate()
    }
}
