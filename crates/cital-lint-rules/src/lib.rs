//! # cital-lint-rules
//!
//! Built-in rules for cital-lint.
//!
//! This crate provides the convention and performance rules for AL
//! business applications, their diagnostic descriptors, and the AL-Go
//! settings lookup some of them depend on.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | CIG0000 | `project-structure` | Source files sit in the folders their namespace and kind imply |
//! | CIG0002 | `missing-caption` | Table fields define a caption |
//! | CIG0003 | `redundant-data-classification` | `DataClassification = CustomerContent` is omitted outside AppSource |
//! | CIG0010 | `var-parameter-unmodified` | `var` parameters are modified by the procedure |
//! | CIG0011 | `set-load-fields` | `SetLoadFields` precedes record fetches |
//! | CIG0012 | `prefer-set-auto-calc-fields` | `SetAutoCalcFields` instead of `CalcFields` |
//! | CIG0014 | `prefer-text-builder` | `TextBuilder` for text extended in loops |
//! | CIG0015 | `source-expression-procedure` | Page fields use procedures, not globals set in `OnAfterGetRecord` |
//!
//! ## Usage
//!
//! ```ignore
//! use cital_lint_core::Analyzer;
//! use cital_lint_rules::{SetLoadFields, SourceExpressionProcedure};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./.output/models")
//!     .rule(SetLoadFields::new())
//!     .rule(SourceExpressionProcedure::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod calc_fields;
pub mod catalog;
mod data_classification;
mod missing_caption;
mod presets;
mod project_structure;
mod semantics;
mod set_load_fields;
pub mod settings;
mod source_expression;
mod text_builder;
mod var_parameter;

#[cfg(test)]
mod test_support;

pub use calc_fields::PreferSetAutoCalcFields;
pub use catalog::{all_descriptors, find_descriptor};
pub use data_classification::RedundantDataClassification;
pub use missing_caption::MissingCaption;
pub use presets::{
    all_rules, minimal_rules, recommended_rules, rules_from_config, strict_rules, Preset,
};
pub use project_structure::ProjectStructure;
pub use set_load_fields::SetLoadFields;
pub use settings::{FsSettingsLocator, ProjectSettings, SettingsSource, StaticSettings};
pub use source_expression::SourceExpressionProcedure;
pub use text_builder::PreferTextBuilder;
pub use var_parameter::VarParameterUnmodified;

/// Re-export core types for convenience.
pub use cital_lint_core::{Rule, Severity, Violation};
