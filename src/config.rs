use crate::core::{MdbError, Result};
use crate::resolver::DriverOverride;
use crate::statement::{LiteralMode, StatementBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable that replaces the default configuration path
pub const CONFIG_ENV: &str = "MDBLINK_CONFIG";

/// Top-level configuration structure parsed from a TOML file.
///
/// Every section and key is optional; missing values read as empty/false.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub driver: DriverSettings,
    pub statements: StatementSettings,
    pub database: DatabaseSettings,
}

/// Driver selection overrides. Name and force flags exist per process
/// bit-width since 32- and 64-bit drivers are installed separately.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverSettings {
    pub name32: String,
    pub name64: String,
    pub force32: bool,
    pub force64: bool,
    pub force_legacy: bool,
    pub force_modern: bool,
}

/// Statement generation options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementSettings {
    pub literal_mode: LiteralMode,
    pub boolean_as_integer: bool,
}

/// Database file options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Blank database copied by `create`
    pub template: Option<PathBuf>,
}

/// Read access to the stored driver override
pub trait ConfigStore {
    fn driver_override(&self) -> Result<DriverOverride>;
}

impl Settings {
    /// Loads configuration from a TOML file, or defaults when the file does
    /// not exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// let settings = mdblink::config::Settings::load("config.toml").expect("Failed to load config");
    /// println!("{:?}", settings);
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No configuration at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads from `default_config_path()`
    pub fn load_default() -> Result<Settings> {
        Settings::load(default_config_path()?)
    }

    /// Writes the configuration, creating parent directories as needed
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string(self).map_err(|e| MdbError::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Statement builder configured from `[statements]`
    pub fn statement_builder(&self) -> StatementBuilder {
        StatementBuilder::new()
            .with_literal_mode(self.statements.literal_mode)
            .with_boolean_as_integer(self.statements.boolean_as_integer)
    }
}

impl DriverSettings {
    /// Override for a process of the given pointer width
    pub fn override_for(&self, is_64_bit: bool) -> DriverOverride {
        let (name, force) = if is_64_bit {
            (&self.name64, self.force64)
        } else {
            (&self.name32, self.force32)
        };
        DriverOverride {
            preferred_name: name.clone(),
            force_only: force,
            include_legacy_family: self.force_legacy,
            include_modern_family: self.force_modern,
        }
    }
}

impl ConfigStore for Settings {
    fn driver_override(&self) -> Result<DriverOverride> {
        Ok(self
            .driver
            .override_for(cfg!(target_pointer_width = "64")))
    }
}

/// Configuration file re-read on every access, so operator edits apply to
/// the next `open` without restarting
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileConfigStore { path: path.into() }
    }

    pub fn from_default_path() -> Result<Self> {
        Ok(FileConfigStore::new(default_config_path()?))
    }
}

impl ConfigStore for FileConfigStore {
    fn driver_override(&self) -> Result<DriverOverride> {
        Settings::load(&self.path)?.driver_override()
    }
}

/// `$MDBLINK_CONFIG`, or `<config dir>/mdblink/config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    dirs::config_dir()
        .map(|dir| dir.join("mdblink").join("config.toml"))
        .ok_or_else(|| MdbError::Config("no configuration directory on this system".to_string()))
}
