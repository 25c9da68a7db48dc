//! Configuration types for cital-lint.

use crate::descriptor::RuleDescriptor;
use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level configuration for cital-lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use (e.g., "recommended", "strict", "minimal").
    #[serde(default)]
    pub preset: Option<String>,

    /// Severity threshold for a failing run (default: "error").
    #[serde(default)]
    pub fail_on: Option<String>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Per-rule configurations, keyed by rule name or code.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Configuration block for a rule, looked up by name or code.
    #[must_use]
    pub fn rule_config(&self, rule: &RuleDescriptor) -> Option<&RuleConfig> {
        self.rules
            .iter()
            .find(|(key, _)| rule.matches(key))
            .map(|(_, config)| config)
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule: &RuleDescriptor) -> bool {
        self.rule_config(rule)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule: &RuleDescriptor) -> Option<Severity> {
        self.rule_config(rule).and_then(|c| c.severity)
    }

    /// Severity at which a run counts as failed.
    ///
    /// # Errors
    ///
    /// Returns an error if `fail_on` is not a known severity.
    pub fn fail_on_severity(&self) -> Result<Severity, ConfigError> {
        self.fail_on
            .as_deref()
            .map_or(Ok(Severity::Error), |s| {
                s.parse::<Severity>().map_err(|message| ConfigError::InvalidValue {
                    key: "fail_on".to_string(),
                    message,
                })
            })
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: vec!["**/.alpackages/**".to_string()],
            respect_gitignore: true,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets a boolean option with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Gets an integer option with a default value.
    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.options
            .get(key)
            .and_then(toml::Value::as_integer)
            .unwrap_or(default)
    }

    /// Gets a string option with a default value.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.options
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A value has the right type but is not accepted.
    #[error("Invalid value for `{key}`: {message}")]
    InvalidValue {
        /// Offending key.
        key: String,
        /// What is wrong with it.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    static SET_LOAD_FIELDS: RuleDescriptor = RuleDescriptor {
        id: "CIG0011",
        name: "set-load-fields",
        title: "t",
        message_format: "m",
        category: "Performance",
        default_severity: Severity::Warning,
        enabled_by_default: true,
    };

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analyzer.respect_gitignore);
        assert!(config.rules.is_empty());
        assert_eq!(config.fail_on_severity().unwrap(), Severity::Error);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
preset = "strict"
fail_on = "warning"

[analyzer]
root = "./src"
exclude = ["**/generated/**"]

[rules.set-load-fields]
severity = "error"
field_threshold = 15
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.analyzer.root, PathBuf::from("./src"));
        assert_eq!(config.fail_on_severity().unwrap(), Severity::Warning);
        assert!(config.is_rule_enabled(&SET_LOAD_FIELDS));
        assert_eq!(config.rule_severity(&SET_LOAD_FIELDS), Some(Severity::Error));

        let rule_config = config.rule_config(&SET_LOAD_FIELDS).unwrap();
        assert_eq!(rule_config.get_int("field_threshold", 10), 15);
    }

    #[test]
    fn test_rule_lookup_by_code() {
        let config = Config::parse("[rules.CIG0011]\nenabled = false\n").unwrap();
        assert!(!config.is_rule_enabled(&SET_LOAD_FIELDS));
    }

    #[test]
    fn test_invalid_fail_on() {
        let config = Config::parse("fail_on = \"fatal\"\n").unwrap();
        assert!(matches!(
            config.fail_on_severity(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Config::parse("preset = "),
            Err(ConfigError::Parse { .. })
        ));
    }
}
