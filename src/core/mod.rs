/// Core Module for mdblink
///
/// Shared infrastructure used by the driver resolver, the statement builder
/// and the database facade: the error taxonomy and the database layer
/// (connection lifecycle, executor boundary, tabular data model).

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{MdbError, Result};
