//! Reading and writing `config.toml`.

use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tempfile::NamedTempFile;

use crate::core::config::data::{path_display, Config};

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    /// The platform gave us no place to keep a config file.
    NoConfigDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Cannot read config file {}: {source}", path_display(path))
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Invalid config file {}: {source}", path_display(path))
            }
            ConfigError::NoConfigDir => f.write_str("No config directory available"),
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::NoConfigDir => None,
        }
    }
}

/// The explicit path if given, otherwise `config.toml` in the platform
/// config dir.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    ProjectDirs::from("org", "ragline", "ragline")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .ok_or(ConfigError::NoConfigDir)
}

impl Config {
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let path = resolve_path(path)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        toml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Replace the file atomically and return where it was written.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf, Box<dyn StdError>> {
        let path = resolve_path(path)?;
        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(toml::to_string_pretty(self)?.as_bytes())?;
        staged.as_file_mut().sync_all()?;
        staged.persist(&path)?;
        Ok(path)
    }
}
