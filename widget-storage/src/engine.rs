//! Execution Engine
//!
//! Runs one logical operation per call against the SQLite file named in the
//! [`StoreConfig`]. Each call walks the same steps:
//!
//! 1. bind and validate parameters
//! 2. open a connection scoped to the call
//! 3. ensure the schema exists (creating it on first use)
//! 4. execute the statement
//! 5. for mutations, commit and refetch the row by id
//!
//! The connection is dropped on every exit path. There is no application
//! level locking: concurrent writers to the same id are ordered by SQLite's
//! own locks and the last committed write wins.

use rusqlite::types::Value;
use rusqlite::{ffi, params_from_iter, Connection, ErrorCode, OpenFlags, OptionalExtension};
use tracing::{debug, info};

use widget_core::{StorageTuple, StorageValue, WIDGET_COLUMN_COUNT};

use crate::catalog::{bind_parameters, Catalog, Operation};
use crate::config::StoreConfig;
use crate::error::{StorageError, StorageResult};

/// Handle to a widget store. Cheap to share; holds no open connection.
#[derive(Debug, Clone)]
pub struct WidgetStore {
    config: StoreConfig,
    catalog: Catalog,
}

impl WidgetStore {
    /// Validate `config` and render the statement catalog.
    ///
    /// Does not touch the filesystem; the database file is created by the
    /// first call to [`WidgetStore::execute`].
    pub fn open(config: StoreConfig) -> StorageResult<Self> {
        config.validate()?;
        let catalog = Catalog::new(&config.table);
        Ok(Self { config, catalog })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Execute one logical operation and return its canonical result set.
    ///
    /// Reads return their rows directly and `create_table` returns nothing.
    /// `insert`, `update_by_id` and `delete_by_id` return the row stored under
    /// the id at position 0 of `params` after the commit, which is empty
    /// after a delete.
    pub fn execute(
        &self,
        op: Operation,
        params: Option<&[StorageValue]>,
    ) -> StorageResult<Vec<StorageTuple>> {
        let bound = bind_parameters(op, params)?;
        let mut conn = self.connect(op)?;

        if op == Operation::CreateTable {
            self.create_table(&conn)?;
            return Ok(Vec::new());
        }

        self.ensure_schema(&conn)?;

        if !op.is_mutation() {
            return self.query(&conn, op, &bound);
        }

        let key = params
            .and_then(|values| values.first())
            .cloned()
            .ok_or(StorageError::MissingParameters {
                operation: op.name(),
            })?;

        let tx = conn.transaction().map_err(|e| database_error(op, e))?;
        let changed = tx
            .execute(self.catalog.statement(op), params_from_iter(to_sql_values(&bound)))
            .map_err(|e| classify_error(op, &key, e))?;
        tx.commit().map_err(|e| database_error(op, e))?;
        debug!(operation = op.name(), changed, "mutation committed");

        self.query(&conn, Operation::SelectById, std::slice::from_ref(&key))
    }

    /// Open the existing database file and run a trivial statement.
    ///
    /// Never creates the file: a store that has not been bootstrapped yet is
    /// reported as unreachable.
    pub fn ping(&self) -> StorageResult<()> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.config.path, flags).map_err(|e| {
            StorageError::Database {
                operation: "ping",
                reason: e.to_string(),
            }
        })?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map(|_| ())
            .map_err(|e| StorageError::Database {
                operation: "ping",
                reason: e.to_string(),
            })
    }

    fn connect(&self, op: Operation) -> StorageResult<Connection> {
        let conn = Connection::open(&self.config.path).map_err(|e| database_error(op, e))?;
        conn.busy_timeout(self.config.busy_timeout)
            .map_err(|e| database_error(op, e))?;
        Ok(conn)
    }

    /// Create the table if it is not there yet. A no-op once it exists.
    fn ensure_schema(&self, conn: &Connection) -> StorageResult<()> {
        let present = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [self.catalog.table()],
                |row| row.get::<_, i64>(0),
            )
            .optional()
            .map_err(|e| StorageError::SchemaBootstrap {
                reason: e.to_string(),
            })?
            .is_some();

        if present {
            return Ok(());
        }
        self.create_table(conn)
    }

    /// Run `create_table`, treating a concurrent creator's win as success.
    fn create_table(&self, conn: &Connection) -> StorageResult<()> {
        match conn.execute(self.catalog.statement(Operation::CreateTable), []) {
            Ok(_) => {
                info!(
                    table = self.catalog.table(),
                    path = %self.config.path.display(),
                    "schema bootstrapped"
                );
                Ok(())
            }
            Err(e) if is_table_exists(&e) => {
                debug!(table = self.catalog.table(), "table already exists");
                Ok(())
            }
            Err(e) => Err(StorageError::SchemaBootstrap {
                reason: e.to_string(),
            }),
        }
    }

    fn query(
        &self,
        conn: &Connection,
        op: Operation,
        bound: &[StorageValue],
    ) -> StorageResult<Vec<StorageTuple>> {
        let mut stmt = conn
            .prepare(self.catalog.statement(op))
            .map_err(|e| database_error(op, e))?;

        let rows = stmt
            .query_map(params_from_iter(to_sql_values(bound)), |row| {
                (0..WIDGET_COLUMN_COUNT)
                    .map(|i| row.get::<_, Value>(i).map(from_sql_value))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })
            .map_err(|e| database_error(op, e))?;

        let mut tuples = Vec::new();
        for row in rows {
            let values = row.map_err(|e| database_error(op, e))?;
            let tuple = StorageTuple::try_from(values).map_err(|e| StorageError::Database {
                operation: op.name(),
                reason: e.to_string(),
            })?;
            tuples.push(tuple);
        }

        debug!(operation = op.name(), rows = tuples.len(), "query returned");
        Ok(tuples)
    }
}

// ============================================================================
// VALUE CONVERSION
// ============================================================================

fn to_sql_value(value: &StorageValue) -> Value {
    match value {
        StorageValue::Null => Value::Null,
        StorageValue::Integer(n) => Value::Integer(*n),
        StorageValue::Real(f) => Value::Real(*f),
        StorageValue::Text(s) => Value::Text(s.clone()),
        StorageValue::Blob(b) => Value::Blob(b.clone()),
    }
}

fn to_sql_values(values: &[StorageValue]) -> impl Iterator<Item = Value> + '_ {
    values.iter().map(to_sql_value)
}

fn from_sql_value(value: Value) -> StorageValue {
    match value {
        Value::Null => StorageValue::Null,
        Value::Integer(n) => StorageValue::Integer(n),
        Value::Real(f) => StorageValue::Real(f),
        Value::Text(s) => StorageValue::Text(s),
        Value::Blob(b) => StorageValue::Blob(b),
    }
}

// ============================================================================
// ERROR CLASSIFICATION
// ============================================================================

fn database_error(op: Operation, err: rusqlite::Error) -> StorageError {
    StorageError::Database {
        operation: op.name(),
        reason: err.to_string(),
    }
}

fn classify_error(op: Operation, key: &StorageValue, err: rusqlite::Error) -> StorageError {
    if let rusqlite::Error::SqliteFailure(ref failure, _) = err {
        if failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            || failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
        {
            return StorageError::DuplicateKey {
                id: display_key(key),
            };
        }
        if failure.code == ErrorCode::ConstraintViolation {
            return StorageError::Constraint {
                operation: op.name(),
                reason: err.to_string(),
            };
        }
    }
    database_error(op, err)
}

/// SQLite reports a second `CREATE TABLE` while preparing the statement, so
/// with the bundled library the message arrives as `SqlInputError`.
fn is_table_exists(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqlInputError { msg, .. } => msg.contains("already exists"),
        rusqlite::Error::SqliteFailure(_, Some(msg)) => msg.contains("already exists"),
        _ => false,
    }
}

fn display_key(key: &StorageValue) -> String {
    match key {
        StorageValue::Text(s) => s.clone(),
        StorageValue::Integer(n) => n.to_string(),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_value_conversion_is_symmetric() {
        let values = [
            StorageValue::Null,
            StorageValue::Integer(-4),
            StorageValue::Real(2.5),
            StorageValue::Text("t".to_string()),
            StorageValue::Blob(vec![1, 2, 3]),
        ];
        for value in values {
            assert_eq!(from_sql_value(to_sql_value(&value)), value);
        }
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let config = StoreConfig {
            table: "bad name".to_string(),
            ..StoreConfig::default()
        };
        assert!(matches!(
            WidgetStore::open(config),
            Err(StorageError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_open_does_not_create_file() -> StorageResult<()> {
        let path = std::env::temp_dir().join(format!(
            "widget-store-open-{}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let store = WidgetStore::open(StoreConfig::with_path(&path))?;
        assert!(!path.exists());
        assert_eq!(store.catalog().table(), "widgets");
        Ok(())
    }

    #[test]
    fn test_table_exists_is_recognized_in_both_error_shapes() {
        let input = rusqlite::Error::SqlInputError {
            error: ffi::Error::new(ffi::SQLITE_ERROR),
            msg: "table widgets already exists".to_string(),
            sql: "CREATE TABLE widgets (id TEXT)".to_string(),
            offset: 13,
        };
        assert!(is_table_exists(&input));

        let failure = rusqlite::Error::SqliteFailure(
            ffi::Error::new(ffi::SQLITE_ERROR),
            Some("table widgets already exists".to_string()),
        );
        assert!(is_table_exists(&failure));

        let other = rusqlite::Error::SqliteFailure(
            ffi::Error::new(ffi::SQLITE_ERROR),
            Some("near \"TABLE\": syntax error".to_string()),
        );
        assert!(!is_table_exists(&other));
    }

    #[test]
    fn test_display_key() {
        assert_eq!(display_key(&StorageValue::Text("abc".to_string())), "abc");
        assert_eq!(display_key(&StorageValue::Integer(7)), "7");
    }
}
