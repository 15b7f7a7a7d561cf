//! Type mapping between in-memory tags and the driver.
//!
//! Column types map to CREATE TABLE keywords and to parameter wire kinds.

use crate::core::db::TypeTag;
use crate::core::{MdbError, Result};
use std::fmt;

/// Column-definition keyword used in CREATE TABLE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKeyword {
    Integer,
    Double,
    Text,
    Image,
}

impl SchemaKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKeyword::Integer => "INTEGER",
            SchemaKeyword::Double => "DOUBLE",
            SchemaKeyword::Text => "TEXT",
            SchemaKeyword::Image => "IMAGE",
        }
    }
}

impl fmt::Display for SchemaKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameter-binding type tag handed to the executor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Boolean,
    Int16,
    Int32,
    Int64,
    UInt16,
    UInt32,
    UInt64,
    Decimal,
    Double,
    String,
    /// Small variable-length binary
    Binary,
    /// Large binary ("image") wire kind
    Image,
}

/// Maps a column type to its schema keyword.
///
/// Boolean has no keyword and is rejected like any unmapped type; the
/// statement builder can opt into creating Boolean columns as INTEGER.
pub fn to_schema_keyword(tag: TypeTag) -> Result<SchemaKeyword> {
    match tag {
        TypeTag::Int16
        | TypeTag::Int32
        | TypeTag::Int64
        | TypeTag::UInt16
        | TypeTag::UInt32
        | TypeTag::UInt64 => Ok(SchemaKeyword::Integer),
        TypeTag::Decimal | TypeTag::Double => Ok(SchemaKeyword::Double),
        TypeTag::String => Ok(SchemaKeyword::Text),
        TypeTag::Binary => Ok(SchemaKeyword::Image),
        TypeTag::Boolean => Err(MdbError::UnsupportedType(format!(
            "{} has no column keyword",
            tag
        ))),
    }
}

/// Maps a column type to its natural parameter kind
pub fn to_parameter_kind(tag: TypeTag) -> Result<ParamKind> {
    let kind = match tag {
        TypeTag::Boolean => ParamKind::Boolean,
        TypeTag::Int16 => ParamKind::Int16,
        TypeTag::Int32 => ParamKind::Int32,
        TypeTag::Int64 => ParamKind::Int64,
        TypeTag::UInt16 => ParamKind::UInt16,
        TypeTag::UInt32 => ParamKind::UInt32,
        TypeTag::UInt64 => ParamKind::UInt64,
        TypeTag::Decimal => ParamKind::Decimal,
        TypeTag::Double => ParamKind::Double,
        TypeTag::String => ParamKind::String,
        TypeTag::Binary => ParamKind::Binary,
    };
    Ok(kind)
}

/// Kind actually used when binding a value of this type.
///
/// Binary payloads are always bound as `Image`: the driver corrupts
/// variable-length binary parameters of roughly 511 to 2000 bytes.
pub fn to_bind_kind(tag: TypeTag) -> Result<ParamKind> {
    match to_parameter_kind(tag)? {
        ParamKind::Binary => Ok(ParamKind::Image),
        kind => Ok(kind),
    }
}
