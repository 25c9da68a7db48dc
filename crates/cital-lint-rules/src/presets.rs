//! Rule presets for common configurations.

use crate::{
    MissingCaption, PreferSetAutoCalcFields, PreferTextBuilder, ProjectStructure,
    RedundantDataClassification, SetLoadFields, SourceExpressionProcedure,
    VarParameterUnmodified,
};
use cital_lint_core::{Config, ConfigError, RuleBox};
use std::str::FromStr;

/// Preset configurations for cital-lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Every rule that is enabled by default.
    #[default]
    Recommended,
    /// Every rule.
    Strict,
    /// The three program-analysis rules only, for gradual adoption.
    Minimal,
}

impl Preset {
    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        match self {
            Self::Recommended => recommended_rules(),
            Self::Strict => strict_rules(),
            Self::Minimal => minimal_rules(),
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "recommended" => Ok(Self::Recommended),
            "strict" => Ok(Self::Strict),
            "minimal" => Ok(Self::Minimal),
            other => Err(format!(
                "unknown preset '{other}' (expected recommended, strict or minimal)"
            )),
        }
    }
}

/// Returns the recommended set of rules.
#[must_use]
pub fn recommended_rules() -> Vec<RuleBox> {
    all_rules()
        .into_iter()
        .filter(|rule| rule.descriptor().enabled_by_default)
        .collect()
}

/// Returns the strict set of rules.
///
/// Every rule, including those disabled by default.
#[must_use]
pub fn strict_rules() -> Vec<RuleBox> {
    all_rules()
}

/// Returns the minimal set of rules.
///
/// - `set-load-fields` (CIG0011)
/// - `source-expression-procedure` (CIG0015)
/// - `project-structure` (CIG0000)
#[must_use]
pub fn minimal_rules() -> Vec<RuleBox> {
    vec![
        Box::new(SetLoadFields::new()),
        Box::new(SourceExpressionProcedure::new()),
        Box::new(ProjectStructure::new()),
    ]
}

/// Returns all available rules, ordered by code.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![
        Box::new(ProjectStructure::new()),
        Box::new(MissingCaption::new()),
        Box::new(RedundantDataClassification::new()),
        Box::new(VarParameterUnmodified::new()),
        Box::new(SetLoadFields::new()),
        Box::new(PreferSetAutoCalcFields::new()),
        Box::new(PreferTextBuilder::new()),
        Box::new(SourceExpressionProcedure::new()),
    ]
}

/// Builds the rule set selected by a configuration.
///
/// The preset picks the rules; rule options such as `field_threshold` or
/// `organization` are applied on top. Enabling and severity overrides are
/// left to the analyzer.
///
/// # Errors
///
/// Returns an error for an unknown preset or an invalid option value.
pub fn rules_from_config(config: &Config) -> Result<Vec<RuleBox>, ConfigError> {
    let preset = match config.preset.as_deref() {
        Some(name) => name.parse::<Preset>().map_err(|message| ConfigError::InvalidValue {
            key: "preset".to_string(),
            message,
        })?,
        None => Preset::default(),
    };

    let mut rules = preset.rules();
    for rule in &mut rules {
        let descriptor = rule.descriptor();
        let Some(options) = config.rule_config(descriptor) else {
            continue;
        };

        if descriptor.id == crate::set_load_fields::CODE {
            let default = i64::try_from(crate::set_load_fields::DEFAULT_FIELD_THRESHOLD)
                .unwrap_or(i64::MAX);
            let threshold = usize::try_from(options.get_int("field_threshold", default))
                .map_err(|_| ConfigError::InvalidValue {
                    key: format!("rules.{}.field_threshold", descriptor.name),
                    message: "must not be negative".to_string(),
                })?;
            *rule = Box::new(SetLoadFields::new().field_threshold(threshold));
        } else if descriptor.id == crate::project_structure::CODE {
            let organization = options
                .get_str("organization", crate::project_structure::DEFAULT_ORGANIZATION);
            *rule = Box::new(ProjectStructure::new().organization(organization));
        }
    }
    Ok(rules)
}
