//! Check command implementation.

use anyhow::{Context, Result};
use cital_lint_core::{Analyzer, Config, RuleBox};
use cital_lint_rules::rules_from_config;
use std::path::Path;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the check command.
///
/// Returns true when a violation reached the configured `fail_on` severity.
pub fn run(
    path: Option<&Path>,
    format: OutputFormat,
    rules_filter: Option<&str>,
    exclude: Vec<String>,
    source: &ConfigSource,
) -> Result<bool> {
    let config = source.load()?;
    let fail_on = config.fail_on_severity().context("Invalid configuration")?;

    let rules = match rules_filter {
        Some(filter) => select_rules(&config, filter)?,
        None => rules_from_config(&config).context("Invalid rule configuration")?,
    };

    let mut builder = Analyzer::builder().config(config).excludes(exclude);
    if let Some(path) = path {
        builder = builder.root(path);
    }
    for rule in rules {
        builder = builder.rule_box(rule);
    }
    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {} with {} rules",
        analyzer.root().display(),
        analyzer.rule_count()
    );

    let result = analyzer.analyze().context("Analysis failed")?;
    super::output::print(&result, format)?;

    Ok(result.has_violations_at(fail_on))
}

/// Rules named in a comma-separated filter, with configured options applied.
fn select_rules(config: &Config, filter: &str) -> Result<Vec<RuleBox>> {
    let wanted: Vec<&str> = filter
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut every = config.clone();
    every.preset = Some("strict".to_string());
    let available = rules_from_config(&every).context("Invalid rule configuration")?;

    for name in &wanted {
        if !available.iter().any(|r| r.descriptor().matches(name)) {
            tracing::warn!("Unknown rule: {}", name);
        }
    }

    Ok(available
        .into_iter()
        .filter(|rule| wanted.iter().any(|name| rule.descriptor().matches(name)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(rules: &[RuleBox]) -> Vec<&'static str> {
        rules.iter().map(|r| r.code()).collect()
    }

    #[test]
    fn filter_accepts_names_and_codes() {
        let rules = select_rules(&Config::default(), "set-load-fields, CIG0000,unknown").unwrap();
        assert_eq!(codes(&rules), vec!["CIG0000", "CIG0011"]);
    }

    #[test]
    fn filter_ignores_preset() {
        let config = Config::parse("preset = \"minimal\"\n").unwrap();
        let rules = select_rules(&config, "missing-caption").unwrap();
        assert_eq!(codes(&rules), vec!["CIG0002"]);
    }
}
