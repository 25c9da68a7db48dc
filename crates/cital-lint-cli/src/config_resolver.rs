//! Configuration file resolution with global fallback.
//!
//! Resolution order:
//!
//! 1. `--config` flag (or `CITAL_LINT_CONFIG`)
//! 2. `{project}/cital-lint.toml` or `.cital-lint.toml`
//! 3. `~/.cital-lint/config.toml`, or `$CITAL_LINT_CONFIG_DIR/config.toml`
//! 4. Built-in defaults

use anyhow::{Context, Result};
use cital_lint_core::Config;
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given on the command line.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Loads the configuration this source points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed. An explicit
    /// path that does not exist is an error too.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            tracing::debug!("No config file found, using defaults");
            return Ok(Config::default());
        };
        if matches!(self, Self::Global(_)) {
            tracing::info!("Using global config: {}", path.display());
        } else {
            tracing::debug!("Using config: {}", path.display());
        }
        Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

const PROJECT_CONFIG_NAMES: &[&str] = &["cital-lint.toml", ".cital-lint.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Environment variable overriding the global config directory.
pub const CONFIG_DIR_ENV: &str = "CITAL_LINT_CONFIG_DIR";

/// Resolves the configuration file for `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_in(project_dir, explicit, global_config_dir())
}

fn resolve_in(project_dir: &Path, explicit: Option<&Path>, global_dir: Option<PathBuf>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    if let Some(found) = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.is_file())
    {
        return ConfigSource::Project(found);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, ConfigSource::Global)
}

/// Global config directory: `$CITAL_LINT_CONFIG_DIR`, else `~/.cital-lint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".cital-lint"))
}
