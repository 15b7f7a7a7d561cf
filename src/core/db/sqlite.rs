/// SQLite-backed Executor
///
/// A local executor built on rusqlite. It reads the `DBQ` attribute of a
/// connection string as the path of an existing SQLite file, which makes it
/// usable for development and differential testing without an installed
/// Access driver.

use crate::core::db::query::{BoundParam, Executor, ResultSet, Session, TableEntry};
use crate::core::db::schema::{ColumnDescriptor, TypeTag, Value};
use crate::core::{MdbError, Result};
use crate::resolver::connection_attribute;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, OpenFlags};
use tracing::debug;

/// Executor opening SQLite files named by `DBQ`
#[derive(Debug, Clone, Default)]
pub struct SqliteExecutor {
    /// Driver names this executor pretends to have installed; `None` accepts any
    accepted_drivers: Option<Vec<String>>,
}

impl SqliteExecutor {
    pub fn new() -> Self {
        SqliteExecutor::default()
    }

    /// Refuses connection strings naming any other driver
    pub fn with_accepted_drivers<I, S>(drivers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SqliteExecutor {
            accepted_drivers: Some(drivers.into_iter().map(Into::into).collect()),
        }
    }
}

impl Executor for SqliteExecutor {
    type Session = SqliteSession;

    fn connect(&self, connection_string: &str) -> Result<SqliteSession> {
        if let Some(accepted) = &self.accepted_drivers {
            let driver = connection_attribute(connection_string, "Driver").unwrap_or_default();
            if !accepted.iter().any(|d| *d == driver) {
                return Err(MdbError::Executor(format!(
                    "Data source name not found and no default driver specified: {}",
                    driver
                )));
            }
        }

        let path = connection_attribute(connection_string, "DBQ")
            .filter(|p| !p.is_empty())
            .ok_or_else(|| MdbError::Executor("connection string has no DBQ".to_string()))?;

        // Never create the file: a missing database is a connection fault.
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        // Forces SQLite to read the header so a non-database file fails here
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))?;

        debug!("Opened SQLite session for {}", path);
        Ok(SqliteSession { conn })
    }
}

/// Session over one SQLite connection, closed on drop
#[derive(Debug)]
pub struct SqliteSession {
    conn: Connection,
}

impl Session for SqliteSession {
    fn execute(&mut self, sql: &str, params: &[BoundParam]) -> Result<u64> {
        let values = to_sql_values(params)?;
        let mut stmt = self.conn.prepare(sql)?;
        let affected = stmt.execute(params_from_iter(values))?;
        Ok(affected as u64)
    }

    fn query(&mut self, sql: &str, params: &[BoundParam]) -> Result<ResultSet> {
        let values = to_sql_values(params)?;
        let mut stmt = self.conn.prepare(sql)?;

        let declared: Vec<(String, Option<(TypeTag, bool)>)> = stmt
            .columns()
            .iter()
            .map(|c| (c.name().to_string(), c.decl_type().and_then(tag_for_declared_type)))
            .collect();

        let mut rows = Vec::new();
        let mut cursor = stmt.query(params_from_iter(values))?;
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(declared.len());
            for (i, (_, decl)) in declared.iter().enumerate() {
                values.push(value_from_ref(row.get_ref(i)?, decl.map(|(tag, _)| tag)));
            }
            rows.push(values);
        }

        // Expression columns have no declared type: use the first non-null value
        let columns = declared
            .into_iter()
            .enumerate()
            .map(|(i, (name, decl))| match decl {
                Some((tag, auto_increment)) => ColumnDescriptor {
                    auto_increment,
                    ..ColumnDescriptor::new(name, tag)
                },
                None => {
                    let tag = rows
                        .iter()
                        .find_map(|r: &Vec<Value>| r[i].tag())
                        .unwrap_or(TypeTag::String);
                    ColumnDescriptor::new(name, tag)
                }
            })
            .collect();

        Ok(ResultSet::new(columns, rows))
    }

    fn columns(&mut self, table_name: &str) -> Result<Vec<ColumnDescriptor>> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info('{}')", table_name.replace('\'', "''")))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, bool>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .map(|(name, type_name, not_null)| {
                let (tag, auto_increment) =
                    tag_for_declared_type(&type_name).unwrap_or((TypeTag::String, false));
                ColumnDescriptor {
                    name,
                    type_tag: tag,
                    nullable: !not_null,
                    auto_increment,
                }
            })
            .collect())
    }

    fn tables(&mut self) -> Result<Vec<TableEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, type FROM sqlite_master WHERE type IN ('table', 'view') ORDER BY rowid")?;
        let entries = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries
            .into_iter()
            .map(|(name, kind)| {
                let table_type = if name.starts_with("sqlite_") {
                    "SYSTEM TABLE".to_string()
                } else {
                    kind.to_uppercase()
                };
                TableEntry::new(name, table_type)
            })
            .collect())
    }
}

fn to_sql_values(params: &[BoundParam]) -> Result<Vec<SqlValue>> {
    params.iter().map(|p| to_sql_value(&p.value)).collect()
}

fn to_sql_value(value: &Value) -> Result<SqlValue> {
    let converted = match value {
        Value::Null => SqlValue::Null,
        Value::Boolean(b) => SqlValue::Integer(i64::from(*b)),
        Value::Int16(i) => SqlValue::Integer(i64::from(*i)),
        Value::Int32(i) => SqlValue::Integer(i64::from(*i)),
        Value::Int64(i) => SqlValue::Integer(*i),
        Value::UInt16(i) => SqlValue::Integer(i64::from(*i)),
        Value::UInt32(i) => SqlValue::Integer(i64::from(*i)),
        Value::UInt64(i) => SqlValue::Integer(i64::try_from(*i).map_err(|_| {
            MdbError::Executor(format!("{} does not fit a SQLite integer", i))
        })?),
        Value::Decimal(d) => SqlValue::Text(d.clone()),
        Value::Double(d) => SqlValue::Real(*d),
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Binary(b) => SqlValue::Blob(b.clone()),
    };
    Ok(converted)
}

/// Type tag for a declared column type, and whether it is an identity column.
///
/// Covers the keywords this crate writes plus the common SQLite and Jet
/// spellings; anything else is `None`.
fn tag_for_declared_type(declared: &str) -> Option<(TypeTag, bool)> {
    let upper = declared.trim().to_uppercase();
    let base = upper.split('(').next().unwrap_or_default().trim();
    let tag = match base {
        "AUTOINCREMENT" | "COUNTER" => return Some((TypeTag::Int32, true)),
        "SMALLINT" | "SHORT" => TypeTag::Int16,
        "INTEGER" | "INT" | "LONG" => TypeTag::Int32,
        "BIGINT" => TypeTag::Int64,
        "DOUBLE" | "REAL" | "FLOAT" => TypeTag::Double,
        "DECIMAL" | "NUMERIC" | "CURRENCY" | "MONEY" => TypeTag::Decimal,
        "TEXT" | "VARCHAR" | "CHAR" | "MEMO" | "LONGTEXT" => TypeTag::String,
        "IMAGE" | "BLOB" | "BINARY" | "VARBINARY" | "LONGBINARY" => TypeTag::Binary,
        "BIT" | "BOOLEAN" | "YESNO" => TypeTag::Boolean,
        _ => return None,
    };
    Some((tag, false))
}

/// Converts a stored value, narrowing it to the declared column type when it fits
fn value_from_ref(value: ValueRef<'_>, declared: Option<TypeTag>) -> Value {
    let stored = match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int64(i),
        ValueRef::Real(f) => Value::Double(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).to_string()),
        ValueRef::Blob(b) => Value::Binary(b.to_vec()),
    };
    let Some(tag) = declared else { return stored };

    let narrowed = match (&stored, tag) {
        (Value::Int64(i), TypeTag::Int16) => i16::try_from(*i).ok().map(Value::Int16),
        (Value::Int64(i), TypeTag::Int32) => i32::try_from(*i).ok().map(Value::Int32),
        (Value::Int64(i), TypeTag::UInt16) => u16::try_from(*i).ok().map(Value::UInt16),
        (Value::Int64(i), TypeTag::UInt32) => u32::try_from(*i).ok().map(Value::UInt32),
        (Value::Int64(i), TypeTag::UInt64) => u64::try_from(*i).ok().map(Value::UInt64),
        (Value::Int64(i), TypeTag::Boolean) => Some(Value::Boolean(*i != 0)),
        (Value::Int64(i), TypeTag::Double) => Some(Value::Double(*i as f64)),
        (Value::Int64(i), TypeTag::Decimal) => Some(Value::Decimal(i.to_string())),
        (Value::Double(d), TypeTag::Decimal) => Some(Value::Decimal(d.to_string())),
        (Value::String(s), TypeTag::Decimal) => Some(Value::Decimal(s.clone())),
        _ => None,
    };
    narrowed.unwrap_or(stored)
}
