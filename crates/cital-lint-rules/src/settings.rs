//! AL-Go project settings discovery.
//!
//! Project-level settings live in `<project>/.AL-Go/settings.json`, and
//! repository-level settings in `<repo>/.github/AL-Go-Settings.json`. Both
//! are looked up by walking from a source file's directory to the
//! filesystem root. Missing or malformed files never fail a rule; the
//! dependent check is skipped instead.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings files checked in each directory, nearest first.
pub const SETTINGS_FILES: [&str; 2] = [".AL-Go/settings.json", ".github/AL-Go-Settings.json"];

/// Project type that marks an AppSource app.
pub const APP_SOURCE_TYPE: &str = "AppSource App";

/// Errors reading a settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The file could not be read.
    #[error("Failed to read settings {path}: {source}")]
    Io {
        /// Settings file path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("Invalid settings {path}: {source}")]
    Json {
        /// Settings file path.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSettings {
    #[serde(default)]
    app_source_cop_mandatory_affixes: Vec<serde_json::Value>,
    #[serde(default, rename = "type")]
    project_type: Option<serde_json::Value>,
}

/// Values the rules read from AL-Go settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectSettings {
    /// Mandatory affixes, e.g. `"CIG Sales"`.
    pub affixes: Vec<String>,
    /// Project type, e.g. `"AppSource App"` or `"PTE"`.
    pub project_type: Option<String>,
}

impl ProjectSettings {
    /// Parses a settings document. Non-string entries are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not a JSON object of the expected shape.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let raw: RawSettings = serde_json::from_str(content)?;
        Ok(Self {
            affixes: raw
                .app_source_cop_mandatory_affixes
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            project_type: raw
                .project_type
                .and_then(|v| v.as_str().map(str::to_string)),
        })
    }

    /// Reads and parses a settings file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| SettingsError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Project name taken from the first affix of the form `"<ORG> <Project>"`.
    #[must_use]
    pub fn project_name(&self, organization: &str) -> Option<&str> {
        self.affixes.iter().find_map(|affix| {
            let head = affix.get(..organization.len())?;
            let rest = affix.get(organization.len()..)?;
            if !head.eq_ignore_ascii_case(organization) || !rest.starts_with(' ') {
                return None;
            }
            let name = rest.trim();
            (!name.is_empty()).then_some(name)
        })
    }

    /// Returns true if the project type is `AppSource App`.
    #[must_use]
    pub fn is_app_source(&self) -> bool {
        self.project_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(APP_SOURCE_TYPE))
    }

    fn fill_from(&mut self, other: Self) {
        if self.affixes.is_empty() {
            self.affixes = other.affixes;
        }
        if self.project_type.is_none() {
            self.project_type = other.project_type;
        }
    }

    fn is_complete(&self) -> bool {
        !self.affixes.is_empty() && self.project_type.is_some()
    }
}

/// Source of project settings for a given source file.
pub trait SettingsSource: Send + Sync {
    /// Settings that apply to `file`, if any were found.
    fn settings_for(&self, file: &Path) -> Option<ProjectSettings>;
}

/// Looks settings up on disk, walking parent directories of each file.
///
/// Nothing is cached: each file is resolved on its own because projects
/// in one repository may carry different settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSettingsLocator;

impl FsSettingsLocator {
    /// Creates a locator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SettingsSource for FsSettingsLocator {
    fn settings_for(&self, file: &Path) -> Option<ProjectSettings> {
        let mut merged: Option<ProjectSettings> = None;

        for dir in file.ancestors().skip(1) {
            for name in SETTINGS_FILES {
                let candidate = dir.join(name);
                if !candidate.is_file() {
                    continue;
                }
                match ProjectSettings::from_file(&candidate) {
                    Ok(found) => {
                        debug!("Using settings from {}", candidate.display());
                        merged.get_or_insert_with(ProjectSettings::default).fill_from(found);
                    }
                    Err(e) => debug!("Ignoring settings: {e}"),
                }
            }
            if merged.as_ref().is_some_and(ProjectSettings::is_complete) {
                break;
            }
        }

        merged
    }
}

/// Fixed settings, independent of the file.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings(pub Option<ProjectSettings>);

impl SettingsSource for StaticSettings {
    fn settings_for(&self, _file: &Path) -> Option<ProjectSettings> {
        self.0.clone()
    }
}
