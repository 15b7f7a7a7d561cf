//! Driver preference resolution.
//!
//! Combines the operator's driver override with the installed-driver catalog
//! into the ordered list of connection strings that `open` walks through.

use crate::catalog::filter_for_legacy_format;
use serde::Serialize;

/// Driver shipped with older systems, `.mdb` only
pub const LEGACY_FAMILY_DRIVER: &str = "Microsoft Access Driver (*.mdb)";

/// Driver shipped with newer database engines, `.mdb` and `.accdb`
pub const MODERN_FAMILY_DRIVER: &str = "Microsoft Access Driver (*.mdb, *.accdb)";

/// Operator override for driver selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverOverride {
    /// Driver to try first; empty when not set
    pub preferred_name: String,
    /// Try only `preferred_name`
    pub force_only: bool,
    /// Try the legacy-family driver even when it is not listed as installed
    pub include_legacy_family: bool,
    /// Try the modern-family driver even when it is not listed as installed
    pub include_modern_family: bool,
}

/// A driver to try, by display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverCandidate {
    pub name: String,
}

impl DriverCandidate {
    pub fn new(name: impl Into<String>) -> Self {
        DriverCandidate { name: name.into() }
    }

    /// Expands `Driver={name};DBQ={path}`. The path is inserted verbatim.
    pub fn connection_string(&self, path: &str) -> String {
        format!("Driver={{{}}};DBQ={}", self.name, path)
    }
}

/// Ordered connection strings for one target file, most preferred first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionSpec {
    pub path: String,
    pub connection_strings: Vec<String>,
}

impl ConnectionSpec {
    pub fn build(path: &str, candidates: &[DriverCandidate]) -> Self {
        ConnectionSpec {
            path: path.to_string(),
            connection_strings: candidates.iter().map(|c| c.connection_string(path)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.connection_strings.is_empty()
    }
}

/// Orders driver candidates.
///
/// The preferred driver always comes first. With `force_only` nothing else is
/// tried. Otherwise the catalog is filtered to legacy-format drivers, the
/// requested families are pushed to the front when missing (legacy first,
/// then modern, so modern ends up ahead when both are requested) and the
/// filtered list follows.
pub fn resolve(driver_override: &DriverOverride, catalog: &[String]) -> Vec<DriverCandidate> {
    let mut candidates = Vec::new();

    if !driver_override.preferred_name.is_empty() {
        candidates.push(DriverCandidate::new(driver_override.preferred_name.clone()));
    }
    if driver_override.force_only {
        return candidates;
    }

    let mut drivers = filter_for_legacy_format(catalog);

    if driver_override.include_legacy_family && !drivers.iter().any(|d| d == LEGACY_FAMILY_DRIVER) {
        drivers.insert(0, LEGACY_FAMILY_DRIVER.to_string());
    }
    if driver_override.include_modern_family && !drivers.iter().any(|d| d == MODERN_FAMILY_DRIVER) {
        drivers.insert(0, MODERN_FAMILY_DRIVER.to_string());
    }

    candidates.extend(drivers.into_iter().map(DriverCandidate::new));
    candidates
}

/// Splits a connection string into key/value attributes.
///
/// Values wrapped in braces keep any `;` they contain and lose the braces.
pub fn parse_connection_string(connection_string: &str) -> Vec<(String, String)> {
    let mut attributes = Vec::new();
    let mut rest = connection_string;

    while !rest.is_empty() {
        let Some(eq) = rest.find('=') else { break };
        let key = rest[..eq].trim().to_string();
        let after = &rest[eq + 1..];

        let (value, remainder) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(close) => {
                    let tail = &braced[close + 1..];
                    (braced[..close].to_string(), tail.strip_prefix(';').unwrap_or(tail))
                }
                None => (braced.to_string(), ""),
            }
        } else {
            match after.find(';') {
                Some(semi) => (after[..semi].to_string(), &after[semi + 1..]),
                None => (after.to_string(), ""),
            }
        };

        if !key.is_empty() {
            attributes.push((key, value));
        }
        rest = remainder;
    }

    attributes
}

/// Looks up one attribute of a connection string, ignoring key case
pub fn connection_attribute(connection_string: &str, key: &str) -> Option<String> {
    parse_connection_string(connection_string)
        .into_iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}
