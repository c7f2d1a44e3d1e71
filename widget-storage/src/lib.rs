//! Widget Storage - Query Catalog and Execution Engine
//!
//! Persists widgets in a single-table SQLite file. Callers hand the engine a
//! logical [`Operation`] plus bound values and get back the canonical result
//! set as [`StorageTuple`]s; decoding into [`widget_core::Widget`] is left to
//! the caller so malformed rows can be handled one at a time.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;

pub use catalog::{bind_parameters, Catalog, Operation, ParameterOrder};
pub use config::StoreConfig;
pub use engine::WidgetStore;
pub use error::{StorageError, StorageResult};

pub use widget_core::{StorageTuple, StorageValue};
