/// Executor Boundary Module
///
/// This module defines the contract between mdblink and the SQL execution
/// engine: an executor turns a connection string into a session, and a
/// session runs statement text with positional parameters.
///
/// Sessions own the driver-level handle and release it when dropped, so a
/// statement that fails halfway never leaks the connection.

use crate::core::db::schema::{ColumnDescriptor, TableSnapshot, Value};
use crate::core::Result;
use crate::type_map::ParamKind;

/// A positional parameter ready to be bound
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParam {
    /// Column the value belongs to
    pub name: String,
    /// Wire kind the executor must bind with
    pub kind: ParamKind,
    /// Value to bind
    pub value: Value,
}

impl BoundParam {
    pub fn new(name: impl Into<String>, kind: ParamKind, value: Value) -> Self {
        BoundParam {
            name: name.into(),
            kind,
            value,
        }
    }
}

/// Tabular result of a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Column metadata reported by the executor
    pub columns: Vec<ColumnDescriptor>,
    /// Rows of data aligned to `columns`
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Creates a new ResultSet from columns and row data
    pub fn new(columns: Vec<ColumnDescriptor>, rows: Vec<Vec<Value>>) -> Self {
        ResultSet { columns, rows }
    }

    /// Converts the result into a named table snapshot
    pub fn into_snapshot(self, name: impl Into<String>) -> TableSnapshot {
        TableSnapshot {
            name: name.into(),
            columns: self.columns,
            rows: self.rows,
        }
    }
}

/// One row of the executor's table introspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    /// Table name
    pub name: String,
    /// Kind reported by the driver, e.g. "TABLE", "VIEW", "SYSTEM TABLE"
    pub table_type: String,
}

impl TableEntry {
    pub fn new(name: impl Into<String>, table_type: impl Into<String>) -> Self {
        TableEntry {
            name: name.into(),
            table_type: table_type.into(),
        }
    }
}

/// An established connection to a data source.
///
/// Implementations are not expected to be reentrant; every method takes
/// `&mut self` so a session is used by one caller at a time.
pub trait Session {
    /// Runs a statement and returns the affected-row count
    fn execute(&mut self, sql: &str, params: &[BoundParam]) -> Result<u64>;

    /// Runs a statement that yields rows
    fn query(&mut self, sql: &str, params: &[BoundParam]) -> Result<ResultSet>;

    /// Lists the tables, views and system tables of the data source
    fn tables(&mut self) -> Result<Vec<TableEntry>>;

    /// Declared columns of a table, in table order; empty when the table is unknown
    fn columns(&mut self, table_name: &str) -> Result<Vec<ColumnDescriptor>>;
}

/// Opens sessions from connection strings
pub trait Executor {
    type Session: Session;

    /// Establishes a session, or fails with a connection-level fault
    fn connect(&self, connection_string: &str) -> Result<Self::Session>;
}
