/// Database Module
///
/// The database layer is split into focused submodules:
/// - **Connection Management** (`connection.rs`): the single active session and candidate fallback
/// - **Executor Boundary** (`query.rs`): the traits an SQL engine implements, parameters and result sets
/// - **Data Model** (`schema.rs`): type tags, values, column descriptors and table snapshots
/// - **SQLite Executor** (`sqlite.rs`): a rusqlite-backed executor for local use and testing
///
/// All operations use `MdbError` for error propagation.
pub mod connection;
pub mod query;
pub mod schema;
pub mod sqlite;

pub use connection::*;
pub use query::*;
pub use schema::*;
pub use sqlite::*;
