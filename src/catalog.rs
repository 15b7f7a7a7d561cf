//! Installed-driver discovery.
//!
//! Lists the database drivers registered with the system and narrows them
//! down to the ones able to open legacy `.mdb` files.

use crate::core::{MdbError, Result};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Source of installed driver display names
pub trait DriverCatalog {
    /// Raw driver names in the order the system reports them.
    ///
    /// Fails with `CatalogUnavailable` when the source cannot be read.
    fn list_installed_drivers(&self) -> Result<Vec<String>>;
}

/// A fixed driver list supplied by the caller
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    drivers: Vec<String>,
}

impl StaticCatalog {
    pub fn new<I, S>(drivers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StaticCatalog {
            drivers: drivers.into_iter().map(Into::into).collect(),
        }
    }
}

impl DriverCatalog for StaticCatalog {
    fn list_installed_drivers(&self) -> Result<Vec<String>> {
        Ok(self.drivers.clone())
    }
}

/// Driver registrations from a unixODBC `odbcinst.ini`
#[derive(Debug, Clone)]
pub struct OdbcInstIni {
    path: PathBuf,
}

impl OdbcInstIni {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        OdbcInstIni { path: path.into() }
    }

    /// `$ODBCSYSINI/odbcinst.ini`, falling back to `/etc/odbcinst.ini`
    pub fn from_env() -> Self {
        let dir = std::env::var_os("ODBCSYSINI")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/etc"));
        OdbcInstIni::new(dir.join("odbcinst.ini"))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl DriverCatalog for OdbcInstIni {
    fn list_installed_drivers(&self) -> Result<Vec<String>> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            MdbError::CatalogUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(parse_odbcinst(&content))
    }
}

/// Extracts driver names from odbcinst.ini content.
///
/// The `[ODBC Drivers]` section is authoritative when present; otherwise
/// every section except `[ODBC]` names a driver.
fn parse_odbcinst(content: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut registered = Vec::new();
    let mut has_registry_section = false;
    let mut in_registry_section = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let section = section.trim();
            in_registry_section = section.eq_ignore_ascii_case("ODBC Drivers");
            if in_registry_section {
                has_registry_section = true;
            } else if !section.eq_ignore_ascii_case("ODBC") {
                sections.push(section.to_string());
            }
            continue;
        }

        if in_registry_section {
            if let Some((name, _)) = line.split_once('=') {
                registered.push(name.trim().to_string());
            }
        }
    }

    if has_registry_section {
        registered
    } else {
        sections
    }
}

/// Installed drivers, or an empty list when the catalog cannot be read
pub fn installed_drivers(catalog: &dyn DriverCatalog) -> Vec<String> {
    match catalog.list_installed_drivers() {
        Ok(drivers) => {
            debug!("Driver catalog reported {} drivers", drivers.len());
            drivers
        }
        Err(e) => {
            warn!("{}; continuing without installed drivers", e);
            Vec::new()
        }
    }
}

/// Keeps drivers naming the vendor, the product and the `*.mdb` extension,
/// case-insensitively, in input order
pub fn filter_for_legacy_format(names: &[String]) -> Vec<String> {
    names
        .iter()
        .filter(|name| {
            let lower = name.to_lowercase();
            lower.contains("microsoft") && lower.contains("access") && lower.contains("*.mdb")
        })
        .cloned()
        .collect()
}
