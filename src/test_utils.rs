/// # Test Utilities Module
///
/// Test doubles for the executor boundary. `ScriptedExecutor` accepts or
/// refuses connection strings by substring, records every connection attempt
/// and statement, and counts released sessions so tests can check that no
/// handle leaks.

use crate::core::db::{BoundParam, ColumnDescriptor, Executor, ResultSet, Session, TableEntry};
use crate::core::{MdbError, Result};
use std::cell::RefCell;
use std::rc::Rc;

/// A statement as the executor received it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStatement {
    pub sql: String,
    pub params: Vec<BoundParam>,
}

#[derive(Debug, Default)]
struct ScriptState {
    accepted: Vec<String>,
    attempts: Vec<String>,
    statements: Vec<RecordedStatement>,
    fail_when: Option<String>,
    tables: Vec<TableEntry>,
    columns: Vec<ColumnDescriptor>,
    result: ResultSet,
    released: usize,
}

/// Executor double; clones share the same script and recordings
#[derive(Debug, Clone, Default)]
pub struct ScriptedExecutor {
    state: Rc<RefCell<ScriptState>>,
}

impl ScriptedExecutor {
    /// Accepts connection strings containing any of `patterns`
    pub fn accepting(patterns: &[&str]) -> Self {
        let executor = ScriptedExecutor::default();
        executor.state.borrow_mut().accepted = patterns.iter().map(|p| p.to_string()).collect();
        executor
    }

    /// Statements containing `pattern` fail with an executor fault
    pub fn fail_when(self, pattern: &str) -> Self {
        self.state.borrow_mut().fail_when = Some(pattern.to_string());
        self
    }

    /// Table introspection rows returned by every session
    pub fn with_tables(self, tables: Vec<TableEntry>) -> Self {
        self.state.borrow_mut().tables = tables;
        self
    }

    /// Declared columns reported for every table
    pub fn with_columns(self, columns: Vec<ColumnDescriptor>) -> Self {
        self.state.borrow_mut().columns = columns;
        self
    }

    /// Result returned by every query
    pub fn with_result(self, result: ResultSet) -> Self {
        self.state.borrow_mut().result = result;
        self
    }

    pub fn attempts(&self) -> Vec<String> {
        self.state.borrow().attempts.clone()
    }

    pub fn statements(&self) -> Vec<RecordedStatement> {
        self.state.borrow().statements.clone()
    }

    /// Statement texts in execution order
    pub fn sql(&self) -> Vec<String> {
        self.state.borrow().statements.iter().map(|s| s.sql.clone()).collect()
    }

    /// Number of sessions dropped so far
    pub fn released(&self) -> usize {
        self.state.borrow().released
    }
}

impl Executor for ScriptedExecutor {
    type Session = ScriptedSession;

    fn connect(&self, connection_string: &str) -> Result<ScriptedSession> {
        let mut state = self.state.borrow_mut();
        state.attempts.push(connection_string.to_string());
        if state.accepted.iter().any(|p| connection_string.contains(p.as_str())) {
            Ok(ScriptedSession {
                state: Rc::clone(&self.state),
            })
        } else {
            Err(MdbError::Executor(format!("cannot connect: {}", connection_string)))
        }
    }
}

#[derive(Debug)]
pub struct ScriptedSession {
    state: Rc<RefCell<ScriptState>>,
}

impl ScriptedSession {
    fn record(&self, sql: &str, params: &[BoundParam]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if let Some(pattern) = &state.fail_when {
            if sql.contains(pattern.as_str()) {
                return Err(MdbError::Executor(format!("statement rejected: {}", sql)));
            }
        }
        state.statements.push(RecordedStatement {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        Ok(())
    }
}

impl Session for ScriptedSession {
    fn execute(&mut self, sql: &str, params: &[BoundParam]) -> Result<u64> {
        self.record(sql, params)?;
        Ok(1)
    }

    fn query(&mut self, sql: &str, params: &[BoundParam]) -> Result<ResultSet> {
        self.record(sql, params)?;
        Ok(self.state.borrow().result.clone())
    }

    fn tables(&mut self) -> Result<Vec<TableEntry>> {
        Ok(self.state.borrow().tables.clone())
    }

    fn columns(&mut self, _table_name: &str) -> Result<Vec<ColumnDescriptor>> {
        Ok(self.state.borrow().columns.clone())
    }
}

impl Drop for ScriptedSession {
    fn drop(&mut self) {
        self.state.borrow_mut().released += 1;
    }
}
