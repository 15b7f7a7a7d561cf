// Core infrastructure modules
pub mod core;

// Driver selection
pub mod catalog;
pub mod config;
pub mod resolver;

// Statement generation and the public facade
pub mod db;
pub mod statement;
pub mod template;
pub mod type_map;

#[cfg(test)]
mod test_utils;

pub use crate::core::{MdbError, Result};
pub use crate::db::AccessDatabase;
