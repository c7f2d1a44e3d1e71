//! Query Catalog
//!
//! The fixed set of logical operations and the statement text for each one.
//! Statements are rendered once from [`WIDGET_COLUMNS`], so the column list
//! cannot drift between them. Values are never inlined; everything variable
//! is bound positionally.

use std::fmt;

use widget_core::{StorageValue, WIDGET_COLUMNS, WIDGET_COLUMN_COUNT};

use crate::error::{StorageError, StorageResult};

/// Column type and constraints, in [`WIDGET_COLUMNS`] order.
const COLUMN_DEFINITIONS: [&str; WIDGET_COLUMN_COUNT] = [
    "TEXT PRIMARY KEY NOT NULL",
    "TEXT NOT NULL",
    "INTEGER",
    "TEXT NOT NULL",
    "TEXT",
];

/// Position of the primary key in a storage tuple.
const KEY_POSITION: usize = 0;

// ============================================================================
// OPERATIONS
// ============================================================================

/// One logical operation the engine can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateTable,
    Insert,
    SelectAll,
    SelectById,
    SelectByName,
    UpdateById,
    DeleteById,
}

/// How caller-supplied values map onto statement placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterOrder {
    /// The statement takes no values.
    None,
    /// Values bind in the order given.
    Positional,
    /// The caller supplies the key first, the statement wants it last.
    KeyLast,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::CreateTable,
        Operation::Insert,
        Operation::SelectAll,
        Operation::SelectById,
        Operation::SelectByName,
        Operation::UpdateById,
        Operation::DeleteById,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateTable => "create_table",
            Operation::Insert => "insert",
            Operation::SelectAll => "select_all",
            Operation::SelectById => "select_by_id",
            Operation::SelectByName => "select_by_name",
            Operation::UpdateById => "update_by_id",
            Operation::DeleteById => "delete_by_id",
        }
    }

    /// Mutations are committed and answered with a refetch by id.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Operation::Insert | Operation::UpdateById | Operation::DeleteById
        )
    }

    pub fn requires_parameters(&self) -> bool {
        self.arity() > 0
    }

    /// Number of values the caller must supply.
    pub fn arity(&self) -> usize {
        match self {
            Operation::CreateTable | Operation::SelectAll => 0,
            Operation::SelectById | Operation::SelectByName | Operation::DeleteById => 1,
            Operation::Insert | Operation::UpdateById => WIDGET_COLUMN_COUNT,
        }
    }

    pub fn parameter_order(&self) -> ParameterOrder {
        match self {
            Operation::CreateTable | Operation::SelectAll => ParameterOrder::None,
            Operation::UpdateById => ParameterOrder::KeyLast,
            Operation::Insert
            | Operation::SelectById
            | Operation::SelectByName
            | Operation::DeleteById => ParameterOrder::Positional,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validate caller values for `op` and put them in placeholder order.
///
/// Fails with [`StorageError::MissingParameters`] when values are required
/// but absent, and [`StorageError::InvalidParameters`] on an arity mismatch.
pub fn bind_parameters(
    op: Operation,
    params: Option<&[StorageValue]>,
) -> StorageResult<Vec<StorageValue>> {
    let values = match params {
        Some(values) => values,
        None if op.requires_parameters() => {
            return Err(StorageError::MissingParameters {
                operation: op.name(),
            })
        }
        None => &[][..],
    };

    if values.len() != op.arity() {
        return Err(StorageError::InvalidParameters {
            operation: op.name(),
            expected: op.arity(),
            got: values.len(),
        });
    }

    let mut bound = values.to_vec();
    if op.parameter_order() == ParameterOrder::KeyLast {
        bound.rotate_left(1);
    }
    Ok(bound)
}

// ============================================================================
// CATALOG
// ============================================================================

/// Statement text for every [`Operation`] against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    table: String,
    create_table: String,
    insert: String,
    select_all: String,
    select_by_id: String,
    select_by_name: String,
    update_by_id: String,
    delete_by_id: String,
}

impl Catalog {
    /// Render all statements for `table`.
    ///
    /// The table name is inlined, so callers must have validated it as an
    /// identifier (see [`crate::StoreConfig::validate`]).
    pub fn new(table: &str) -> Self {
        let key = WIDGET_COLUMNS[KEY_POSITION];
        let columns = WIDGET_COLUMNS.join(", ");

        let definitions = WIDGET_COLUMNS
            .iter()
            .zip(COLUMN_DEFINITIONS.iter())
            .map(|(name, definition)| format!("{name} {definition}"))
            .collect::<Vec<_>>()
            .join(", ");

        let placeholders = (1..=WIDGET_COLUMN_COUNT)
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");

        let assignments = WIDGET_COLUMNS
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != KEY_POSITION)
            .enumerate()
            .map(|(slot, (_, name))| format!("{name} = ?{}", slot + 1))
            .collect::<Vec<_>>()
            .join(", ");

        let select = format!("SELECT {columns} FROM {table}");

        Self {
            table: table.to_string(),
            create_table: format!("CREATE TABLE {table} ({definitions})"),
            insert: format!("INSERT INTO {table} ({columns}) VALUES ({placeholders})"),
            select_all: format!("{select} ORDER BY rowid"),
            select_by_id: format!("{select} WHERE {key} = ?1"),
            select_by_name: format!("{select} WHERE name = ?1 ORDER BY rowid"),
            update_by_id: format!(
                "UPDATE {table} SET {assignments} WHERE {key} = ?{WIDGET_COLUMN_COUNT}"
            ),
            delete_by_id: format!("DELETE FROM {table} WHERE {key} = ?1"),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn statement(&self, op: Operation) -> &str {
        match op {
            Operation::CreateTable => &self.create_table,
            Operation::Insert => &self.insert,
            Operation::SelectAll => &self.select_all,
            Operation::SelectById => &self.select_by_id,
            Operation::SelectByName => &self.select_by_name,
            Operation::UpdateById => &self.update_by_id,
            Operation::DeleteById => &self.delete_by_id,
        }
    }
}


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
