//! Store configuration
//!
//! Loaded from environment variables with development defaults and passed
//! explicitly into [`crate::WidgetStore::open`].

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{StorageError, StorageResult};

/// Default database file.
pub const DEFAULT_DB_PATH: &str = "widgets.db";

/// Default table name.
pub const DEFAULT_TABLE: &str = "widgets";

/// Default time to wait on a locked database, in milliseconds.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Configuration for the execution engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Path of the single database file.
    pub path: PathBuf,
    /// Table holding the widgets. Rendered into statement text.
    pub table: String,
    /// How long a statement waits on another writer's lock.
    pub busy_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
            table: DEFAULT_TABLE.to_string(),
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }
}

impl StoreConfig {
    /// Default configuration pointing at `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Create a store configuration from environment variables.
    ///
    /// Environment variables:
    /// - `WIDGET_DB_PATH`: database file (default: widgets.db)
    /// - `WIDGET_DB_TABLE`: table name (default: widgets)
    /// - `WIDGET_DB_BUSY_TIMEOUT_MS`: lock wait in milliseconds (default: 5000)
    pub fn from_env() -> Self {
        Self {
            path: std::env::var("WIDGET_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH)),
            table: std::env::var("WIDGET_DB_TABLE").unwrap_or_else(|_| DEFAULT_TABLE.to_string()),
            busy_timeout: Duration::from_millis(
                std::env::var("WIDGET_DB_BUSY_TIMEOUT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_BUSY_TIMEOUT_MS),
            ),
        }
    }

    /// Check that the configuration can be used to render statements.
    pub fn validate(&self) -> StorageResult<()> {
        if self.path.as_os_str().is_empty() {
            return Err(StorageError::InvalidConfig {
                field: "path",
                reason: "must not be empty".to_string(),
            });
        }
        if !is_plain_identifier(&self.table) {
            return Err(StorageError::InvalidConfig {
                field: "table",
                reason: format!("{:?} is not a plain SQL identifier", self.table),
            });
        }
        Ok(())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`, excluding the reserved `sqlite_` prefix.
fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    starts_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.to_ascii_lowercase().starts_with("sqlite_")
}
