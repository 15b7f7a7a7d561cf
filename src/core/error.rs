/// mdblink Error Module
///
/// This module defines the error taxonomy shared by every layer of the crate:
/// type mapping, statement building, driver discovery, configuration and the
/// executor boundary.
use thiserror::Error;

/// Error type for mdblink.
///
/// There is no connection-fallback variant: when every driver
/// candidate fails, `open` reports `false` instead of raising an error.
#[derive(Error, Debug)]
pub enum MdbError {
    /// A runtime type reached the mapping table without a mapping
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Empty table name, empty column set or rows not aligned to columns
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// The installed-driver list could not be read
    #[error("Driver catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Any failure reported by the executor while running a statement
    #[error("Executor fault: {0}")]
    Executor(String),

    /// A schema or data operation was issued without an open connection
    #[error("Not connected to a database")]
    NotConnected,

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors from the configuration file
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for MdbError {
    fn from(err: rusqlite::Error) -> Self {
        MdbError::Executor(err.to_string())
    }
}

/// Type alias for Result to use MdbError as the error type.
pub type Result<T> = std::result::Result<T, MdbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MdbError::UnsupportedType("DateTime".to_string());
        assert!(err.to_string().contains("Unsupported type"));

        let err = MdbError::InvalidSchema("empty table name".to_string());
        assert!(err.to_string().contains("Invalid schema"));

        assert_eq!(MdbError::NotConnected.to_string(), "Not connected to a database");
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MdbError = io_err.into();
        match err {
            MdbError::Io(_) => {}
            _ => panic!("Expected IO error"),
        }

        let err: MdbError = rusqlite::Error::ExecuteReturnedResults.into();
        match err {
            MdbError::Executor(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected executor fault"),
        }
    }
}
