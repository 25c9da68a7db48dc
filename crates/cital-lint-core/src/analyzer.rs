//! Core analyzer for orchestrating lint execution.

use crate::config::{Config, RuleConfig};
use crate::context::CancellationToken;
use crate::descriptor::{RuleDescriptor, RULE_FAULT};
use crate::model::{CompilationUnit, ModelError};
use crate::registry::{Cancelled, Registry};
use crate::rule::{Rule, RuleBox};
use crate::sink::{CollectingSink, DiagnosticLocation, DiagnosticSink};
use crate::types::{sort_violations, LintResult, Location, Violation};
use crate::utils::allowance::check_node_allowance;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// File suffix of JSON model dumps produced by the compiler frontend.
pub const MODEL_FILE_SUFFIX: &str = ".model.json";

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A model file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path of the model file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A model file could not be decoded.
    #[error("Invalid model in {path}: {source}")]
    Model {
        /// Path of the model file.
        path: PathBuf,
        /// Decoding or validation error.
        source: ModelError,
    },

    /// Directory walk error.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// The run was cancelled.
    #[error("Analysis cancelled")]
    Cancelled,
}

impl From<Cancelled> for AnalyzerError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    fail_on_load_error: bool,
    cancellation: Option<CancellationToken>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets whether to fail on unreadable model files (default: false).
    #[must_use]
    pub fn fail_on_load_error(mut self, fail: bool) -> Self {
        self.fail_on_load_error = fail;
        self
    }

    /// Sets the cancellation token shared with the host.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Builds the analyzer.
    ///
    /// Rules disabled in the configuration are not registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined or an
    /// exclude pattern is invalid.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let exclude_patterns = self
            .exclude_patterns
            .iter()
            .chain(&config.analyzer.exclude)
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let mut registry = Registry::new();
        for rule in self.rules {
            if config.is_rule_enabled(rule.descriptor()) {
                registry.register(rule);
            } else {
                debug!("Skipping disabled rule: {}", rule.name());
            }
        }

        Ok(Analyzer {
            root,
            registry,
            exclude_patterns,
            respect_gitignore: config.analyzer.respect_gitignore,
            config,
            fail_on_load_error: self.fail_on_load_error,
            cancellation: self.cancellation.unwrap_or_default(),
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    registry: Registry,
    exclude_patterns: Vec<glob::Pattern>,
    respect_gitignore: bool,
    config: Config,
    fail_on_load_error: bool,
    cancellation: CancellationToken,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.registry.len()
    }

    /// Registered rules.
    #[must_use]
    pub fn rules(&self) -> &[RuleBox] {
        self.registry.rules()
    }

    /// Gets the configuration block for a rule.
    #[must_use]
    pub fn rule_config(&self, rule: &RuleDescriptor) -> Option<&RuleConfig> {
        self.config.rule_config(rule)
    }

    /// Dispatches every registered rule over one unit into `sink`.
    ///
    /// Diagnostics are raw: no allowance, severity or ordering is applied.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Cancelled`] if the run was cancelled.
    pub fn run(
        &self,
        unit: &CompilationUnit,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), AnalyzerError> {
        self.registry
            .run_in(&self.root, unit, sink, &self.cancellation)?;
        Ok(())
    }

    /// Analyzes one unit and returns its violations, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Cancelled`] if the run was cancelled.
    pub fn analyze_unit(&self, unit: &CompilationUnit) -> Result<Vec<Violation>, AnalyzerError> {
        debug!("Analyzing: {}", unit.file_path().display());

        let mut sink = CollectingSink::new();
        self.run(unit, &mut sink)?;

        let mut violations = Vec::new();
        for diagnostic in sink.into_diagnostics() {
            let Some(descriptor) = self.descriptor_for(diagnostic.rule_id) else {
                warn!("Dropping diagnostic from unknown rule {}", diagnostic.rule_id);
                continue;
            };

            if let Some(node) = diagnostic.node {
                let allowance = check_node_allowance(unit, node, descriptor);
                if allowance.is_allowed() {
                    debug!(
                        "Allowed {} in {}: {}",
                        descriptor.id,
                        unit.file_path().display(),
                        allowance.reason().unwrap_or("no reason given")
                    );
                    continue;
                }
            }

            let file = unit.file_path().to_path_buf();
            let location = match diagnostic.location {
                DiagnosticLocation::Span(span) => Location::from_span(file, span),
                DiagnosticLocation::File => Location::file_level(file),
            };
            let severity = self
                .config
                .rule_severity(descriptor)
                .unwrap_or(descriptor.default_severity);

            violations.push(
                Violation::new(
                    descriptor.id,
                    descriptor.name,
                    severity,
                    location,
                    descriptor.format_message(&diagnostic.args),
                )
                .with_category(descriptor.category)
                .with_help(descriptor.title),
            );
        }

        sort_violations(&mut violations);
        Ok(violations)
    }

    /// Discovers and analyzes every model file under the root.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails, the run is cancelled, or a model
    /// cannot be loaded while `fail_on_load_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let mut result = LintResult::new();
        let files = self.discover_files()?;

        info!("Found {} files to analyze", files.len());

        for file_path in &files {
            let unit = match load_unit(file_path) {
                Ok(unit) => unit,
                Err(e) => {
                    warn!("Skipping {}: {e}", file_path.display());
                    if self.fail_on_load_error {
                        return Err(e);
                    }
                    continue;
                }
            };
            result.violations.extend(self.analyze_unit(&unit)?);
            result.files_checked += 1;
        }

        result.sort();

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    fn descriptor_for(&self, rule_id: &str) -> Option<&'static RuleDescriptor> {
        if rule_id == RULE_FAULT.id {
            return Some(&RULE_FAULT);
        }
        self.registry
            .rules()
            .iter()
            .map(|r| r.descriptor())
            .find(|d| d.id == rule_id)
    }

    /// Discovers all model files to analyze, in path order.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(self.respect_gitignore)
            .require_git(false);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() || !path.to_string_lossy().ends_with(MODEL_FILE_SUFFIX) {
                continue;
            }

            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let options = glob::MatchOptions {
            case_sensitive: false,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        self.exclude_patterns
            .iter()
            .any(|p| p.matches_path_with(path, options) || p.matches_path_with(relative, options))
    }
}

/// Reads and decodes a model file.
///
/// # Errors
///
/// Returns [`AnalyzerError::Read`] or [`AnalyzerError::Model`].
pub fn load_unit(path: &Path) -> Result<CompilationUnit, AnalyzerError> {
    let content = std::fs::read_to_string(path).map_err(|source| AnalyzerError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    CompilationUnit::from_json(&content).map_err(|source| AnalyzerError::Model {
        path: path.to_path_buf(),
        source,
    })
}
