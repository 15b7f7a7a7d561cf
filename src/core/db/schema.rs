/// Tabular Data Model
///
/// This module provides the strongly-typed in-memory representation of
/// tables that the statement builder consumes and the executor produces:
/// type tags, cell values, column descriptors and table snapshots.

use crate::core::{MdbError, Result};
use std::fmt;
use std::str::FromStr;

/// The in-memory value kinds the mapping table understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Int16,
    Int32,
    Int64,
    UInt16,
    UInt32,
    UInt64,
    Decimal,
    Double,
    String,
    Binary,
    Boolean,
}

impl TypeTag {
    /// Every supported tag, in declaration order
    pub const ALL: [TypeTag; 11] = [
        TypeTag::Int16,
        TypeTag::Int32,
        TypeTag::Int64,
        TypeTag::UInt16,
        TypeTag::UInt32,
        TypeTag::UInt64,
        TypeTag::Decimal,
        TypeTag::Double,
        TypeTag::String,
        TypeTag::Binary,
        TypeTag::Boolean,
    ];

    /// Canonical lowercase name, accepted back by `FromStr`
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Int16 => "int16",
            TypeTag::Int32 => "int32",
            TypeTag::Int64 => "int64",
            TypeTag::UInt16 => "uint16",
            TypeTag::UInt32 => "uint32",
            TypeTag::UInt64 => "uint64",
            TypeTag::Decimal => "decimal",
            TypeTag::Double => "double",
            TypeTag::String => "string",
            TypeTag::Binary => "binary",
            TypeTag::Boolean => "boolean",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeTag {
    type Err = MdbError;

    /// Parses a type name. Both the canonical names and the matching Rust
    /// primitive names are accepted; anything else is `UnsupportedType`.
    fn from_str(s: &str) -> Result<Self> {
        let tag = match s.trim().to_lowercase().as_str() {
            "int16" | "i16" => TypeTag::Int16,
            "int32" | "i32" => TypeTag::Int32,
            "int64" | "i64" => TypeTag::Int64,
            "uint16" | "u16" => TypeTag::UInt16,
            "uint32" | "u32" => TypeTag::UInt32,
            "uint64" | "u64" => TypeTag::UInt64,
            "decimal" => TypeTag::Decimal,
            "double" | "f64" => TypeTag::Double,
            "string" => TypeTag::String,
            "binary" | "vec<u8>" => TypeTag::Binary,
            "boolean" | "bool" => TypeTag::Boolean,
            other => return Err(MdbError::UnsupportedType(other.to_string())),
        };
        Ok(tag)
    }
}

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    /// Exact decimal kept in its textual form
    Decimal(String),
    Double(f64),
    String(String),
    Binary(Vec<u8>),
}

impl Value {
    /// Type tag of this value, `None` for NULL
    pub fn tag(&self) -> Option<TypeTag> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(TypeTag::Boolean),
            Value::Int16(_) => Some(TypeTag::Int16),
            Value::Int32(_) => Some(TypeTag::Int32),
            Value::Int64(_) => Some(TypeTag::Int64),
            Value::UInt16(_) => Some(TypeTag::UInt16),
            Value::UInt32(_) => Some(TypeTag::UInt32),
            Value::UInt64(_) => Some(TypeTag::UInt64),
            Value::Decimal(_) => Some(TypeTag::Decimal),
            Value::Double(_) => Some(TypeTag::Double),
            Value::String(_) => Some(TypeTag::String),
            Value::Binary(_) => Some(TypeTag::Binary),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn decimal(text: impl Into<String>) -> Self {
        Value::Decimal(text.into())
    }
}

/// Textual form used when a value is inlined into statement text
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Int16(i) => write!(f, "{}", i),
            Value::Int32(i) => write!(f, "{}", i),
            Value::Int64(i) => write!(f, "{}", i),
            Value::UInt16(i) => write!(f, "{}", i),
            Value::UInt32(i) => write!(f, "{}", i),
            Value::UInt64(i) => write!(f, "{}", i),
            Value::Decimal(d) => f.write_str(d),
            Value::Double(d) => write!(f, "{}", d),
            Value::String(s) => f.write_str(s),
            Value::Binary(bytes) => {
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Boolean,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f64 => Double,
    String => String,
    Vec<u8> => Binary,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Represents a table column with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Runtime type of the values held in this column
    pub type_tag: TypeTag,
    /// Whether the column allows NULL values
    pub nullable: bool,
    /// Whether the driver generates values for this column
    pub auto_increment: bool,
}

impl ColumnDescriptor {
    /// Creates a nullable, non-generated column
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        ColumnDescriptor {
            name: name.into(),
            type_tag,
            nullable: true,
            auto_increment: false,
        }
    }

    /// Creates a column from a type name, failing with `UnsupportedType`
    /// for names outside the enumerated set
    pub fn parse(name: impl Into<String>, type_name: &str) -> Result<Self> {
        Ok(ColumnDescriptor::new(name, type_name.parse()?))
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }
}

/// A table's columns and rows, produced fresh per fetch.
///
/// Changes made to a snapshot are never written back on their own; use the
/// insert and update operations of the database facade.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot {
    /// Table name
    pub name: String,
    /// Columns in positional order
    pub columns: Vec<ColumnDescriptor>,
    /// Rows aligned positionally to `columns`
    pub rows: Vec<Vec<Value>>,
}

impl TableSnapshot {
    /// Creates an empty snapshot with the given structure
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        TableSnapshot {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row after checking it lines up with the columns.
    ///
    /// NULL is accepted in any column; every other value must carry the
    /// column's type tag.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(MdbError::InvalidSchema(format!(
                "row has {} values but table '{}' has {} columns",
                row.len(),
                self.name,
                self.columns.len()
            )));
        }

        for (value, column) in row.iter().zip(&self.columns) {
            if let Some(tag) = value.tag() {
                if tag != column.type_tag {
                    return Err(MdbError::InvalidSchema(format!(
                        "column '{}' expects {} but got {}",
                        column.name, column.type_tag, tag
                    )));
                }
            }
        }

        self.rows.push(row);
        Ok(())
    }

    /// Builder-style variant of `push_row`
    pub fn with_row(mut self, row: Vec<Value>) -> Result<Self> {
        self.push_row(row)?;
        Ok(self)
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Value of the named column in the given row
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Drops all rows, keeping the structure
    pub fn clear_rows(&mut self) {
        self.rows.clear();
    }
}
