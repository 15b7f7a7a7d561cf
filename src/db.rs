//! Database facade.
//!
//! `AccessDatabase` ties driver resolution, the connection manager and the
//! statement builder together behind the public operations: open/close,
//! schema changes, row writes and table reads.

use crate::catalog::{installed_drivers, DriverCatalog, OdbcInstIni};
use crate::config::{ConfigStore, Settings};
use crate::core::db::{ColumnDescriptor, ConnectionManager, Executor, Session, TableSnapshot, Value};
use crate::core::Result;
use crate::resolver::{resolve, ConnectionSpec};
use crate::statement::{StatementBuilder, StatementPlan};
use tracing::{debug, warn};

/// A handle on one database file.
///
/// Holds at most one open session. Not synchronized: share it across threads
/// only behind a `Mutex`.
pub struct AccessDatabase<E: Executor> {
    connection: ConnectionManager<E>,
    catalog: Box<dyn DriverCatalog>,
    config: Box<dyn ConfigStore>,
    builder: StatementBuilder,
}

impl<E: Executor> AccessDatabase<E> {
    /// Handle with the system driver catalog and no driver override
    pub fn new(executor: E) -> Self {
        AccessDatabase {
            connection: ConnectionManager::new(executor),
            catalog: Box::new(OdbcInstIni::from_env()),
            config: Box::new(Settings::default()),
            builder: StatementBuilder::new(),
        }
    }

    /// Handle configured from loaded settings
    pub fn from_settings(executor: E, settings: Settings) -> Self {
        let builder = settings.statement_builder();
        AccessDatabase::new(executor)
            .with_config_store(settings)
            .with_builder(builder)
    }

    pub fn with_catalog(mut self, catalog: impl DriverCatalog + 'static) -> Self {
        self.catalog = Box::new(catalog);
        self
    }

    pub fn with_config_store(mut self, config: impl ConfigStore + 'static) -> Self {
        self.config = Box::new(config);
        self
    }

    pub fn with_builder(mut self, builder: StatementBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Ordered connection strings `open` would try for `path`
    pub fn connection_spec(&self, path: &str) -> ConnectionSpec {
        let driver_override = self.config.driver_override().unwrap_or_else(|e| {
            warn!("Ignoring driver override: {}", e);
            Default::default()
        });
        let drivers = installed_drivers(self.catalog.as_ref());
        ConnectionSpec::build(path, &resolve(&driver_override, &drivers))
    }

    /// Opens the database, closing any previous connection first.
    ///
    /// Returns `false` when no candidate driver could open the file.
    pub fn open(&mut self, path: &str) -> bool {
        let spec = self.connection_spec(path);
        self.connection.open(&spec)
    }

    /// Closes the database; does nothing when not connected
    pub fn close(&mut self) {
        self.connection.close();
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Connection string that opened the current database
    pub fn connection_string(&self) -> Option<&str> {
        self.connection.connection_string()
    }

    pub fn begin_transaction(&mut self) {
        self.connection.begin_transaction();
    }

    pub fn commit_transaction(&mut self) {
        self.connection.commit_transaction();
    }

    pub fn create_table(&mut self, columns: &[ColumnDescriptor], table_name: &str) -> Result<()> {
        let plan = self.builder.create_table(columns, table_name)?;
        self.execute_plan(&plan)?;
        Ok(())
    }

    /// Creates a table with the snapshot's name and columns
    pub fn create_table_from(&mut self, snapshot: &TableSnapshot) -> Result<()> {
        self.create_table(&snapshot.columns, &snapshot.name)
    }

    pub fn drop_table(&mut self, table_name: &str) -> Result<()> {
        let plan = self.builder.drop_table(table_name)?;
        self.execute_plan(&plan)?;
        Ok(())
    }

    /// Drops tables in order, stopping at the first failure
    pub fn drop_tables<S: AsRef<str>>(&mut self, table_names: &[S]) -> Result<()> {
        for name in table_names {
            self.drop_table(name.as_ref())?;
        }
        Ok(())
    }

    /// Deletes the rows whose `key` column equals `value`
    pub fn delete_row(&mut self, table_name: &str, key: &str, value: impl Into<Value>) -> Result<u64> {
        let plan = self.builder.delete_where(table_name, key, &value.into())?;
        self.execute_plan(&plan)
    }

    /// Inserts every row of the snapshot, one statement per row.
    ///
    /// A failing row stops the remaining rows; earlier rows stay written.
    pub fn insert_rows(&mut self, snapshot: &TableSnapshot, exclude_column: Option<&str>) -> Result<u64> {
        let plans = self.builder.insert_rows(snapshot, exclude_column)?;
        self.execute_all(&plans)
    }

    /// Updates every row of the snapshot in `target_table`, matched on
    /// `primary_key`, one statement per row
    pub fn update_rows(&mut self, snapshot: &TableSnapshot, primary_key: &str, target_table: &str) -> Result<u64> {
        let plans = self.builder.update_rows(snapshot, primary_key, target_table)?;
        self.execute_all(&plans)
    }

    pub fn table_exists(&mut self, table_name: &str) -> Result<bool> {
        Ok(self.list_tables()?.iter().any(|t| t == table_name))
    }

    /// User tables only; views and system tables are left out
    pub fn list_tables(&mut self) -> Result<Vec<String>> {
        let entries = self.connection.session()?.tables()?;
        Ok(entries
            .into_iter()
            .filter(|e| e.table_type == "TABLE")
            .map(|e| e.name)
            .collect())
    }

    /// Columns of a table without its rows
    pub fn fetch_structure(&mut self, table_name: &str) -> Result<TableSnapshot> {
        let mut snapshot = self.fetch_table(table_name)?;
        snapshot.clear_rows();
        Ok(snapshot)
    }

    /// Columns and rows of a table.
    ///
    /// Nullability and identity flags come from the session's column
    /// introspection; a result column it does not report keeps the defaults.
    pub fn fetch_table(&mut self, table_name: &str) -> Result<TableSnapshot> {
        let sql = format!("SELECT * FROM \"{}\";", table_name);
        let mut snapshot = self.run_query(&sql)?;
        snapshot.name = table_name.to_string();

        let declared = self.connection.session()?.columns(table_name)?;
        for column in &mut snapshot.columns {
            if let Some(found) = declared.iter().find(|d| d.name == column.name) {
                column.nullable = found.nullable;
                column.auto_increment = found.auto_increment;
            }
        }
        Ok(snapshot)
    }

    /// Runs a statement and returns the affected-row count
    pub fn run_command(&mut self, sql: &str) -> Result<u64> {
        debug!("{}", sql);
        self.connection.session()?.execute(sql, &[])
    }

    /// Runs a query; the snapshot is unnamed
    pub fn run_query(&mut self, sql: &str) -> Result<TableSnapshot> {
        debug!("{}", sql);
        Ok(self.connection.session()?.query(sql, &[])?.into_snapshot(""))
    }

    fn execute_plan(&mut self, plan: &StatementPlan) -> Result<u64> {
        debug!("{} ({} parameters)", plan.text, plan.parameters.len());
        self.connection.session()?.execute(&plan.text, &plan.parameters)
    }

    fn execute_all(&mut self, plans: &[StatementPlan]) -> Result<u64> {
        self.begin_transaction();
        let mut affected = 0;
        for plan in plans {
            affected += self.execute_plan(plan)?;
        }
        self.commit_transaction();
        Ok(affected)
    }
}
