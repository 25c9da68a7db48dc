//! Diagnostic catalog: one static descriptor per rule.

use crate::{
    calc_fields, data_classification, missing_caption, project_structure, set_load_fields,
    source_expression, text_builder, var_parameter,
};
use cital_lint_core::{RuleDescriptor, Severity, RULE_FAULT};

/// CIG0000: source files must sit in the folder their namespace and kind imply.
pub static PROJECT_STRUCTURE: RuleDescriptor = RuleDescriptor {
    id: project_structure::CODE,
    name: project_structure::NAME,
    title: "Source files must follow the project folder structure",
    message_format: "{0} '{1}' is not in the expected folder structure. Expected: '{2}', actual: '{3}'",
    category: "Design",
    default_severity: Severity::Warning,
    enabled_by_default: true,
};

/// CIG0002: table fields need a caption.
pub static MISSING_CAPTION: RuleDescriptor = RuleDescriptor {
    id: missing_caption::CODE,
    name: missing_caption::NAME,
    title: "Captions must always be defined for table fields",
    message_format: "Field '{0}' has no Caption",
    category: "Design",
    default_severity: Severity::Warning,
    enabled_by_default: true,
};

/// CIG0003: `DataClassification = CustomerContent` is the default.
pub static REDUNDANT_DATA_CLASSIFICATION: RuleDescriptor = RuleDescriptor {
    id: data_classification::CODE,
    name: data_classification::NAME,
    title: "Omit DataClassification except for AppSource apps",
    message_format: "DataClassification 'CustomerContent' on '{0}' is the default and should be omitted",
    category: "Design",
    default_severity: Severity::Warning,
    enabled_by_default: true,
};

/// CIG0010: `var` parameters must be modified.
pub static VAR_PARAMETER_UNMODIFIED: RuleDescriptor = RuleDescriptor {
    id: var_parameter::CODE,
    name: var_parameter::NAME,
    title: "Call by reference may only be used if the parameter is modified",
    message_format: "Parameter '{0}' is passed by reference but never modified",
    category: "Design",
    default_severity: Severity::Warning,
    enabled_by_default: true,
};

/// CIG0011: SetLoadFields before fetching records.
pub static SET_LOAD_FIELDS: RuleDescriptor = RuleDescriptor {
    id: set_load_fields::CODE,
    name: set_load_fields::NAME,
    title: "SetLoadFields must be used before fetching a record",
    message_format: "Use SetLoadFields on '{0}' before calling '{1}'",
    category: "Performance",
    default_severity: Severity::Warning,
    enabled_by_default: true,
};

/// CIG0012: SetAutoCalcFields over CalcFields.
pub static PREFER_SET_AUTO_CALC_FIELDS: RuleDescriptor = RuleDescriptor {
    id: calc_fields::CODE,
    name: calc_fields::NAME,
    title: "Use SetAutoCalcFields instead of CalcFields",
    message_format: "Use SetAutoCalcFields instead of CalcFields",
    category: "Performance",
    default_severity: Severity::Warning,
    enabled_by_default: true,
};

/// CIG0014: TextBuilder for text extended in loops.
pub static PREFER_TEXT_BUILDER: RuleDescriptor = RuleDescriptor {
    id: text_builder::CODE,
    name: text_builder::NAME,
    title: "Use TextBuilder when a text is continuously extended",
    message_format: "Text variable '{0}' is extended inside a loop; use a TextBuilder instead",
    category: "Performance",
    default_severity: Severity::Warning,
    enabled_by_default: true,
};

/// CIG0015: procedures as page field source expressions.
pub static SOURCE_EXPRESSION_PROCEDURE: RuleDescriptor = RuleDescriptor {
    id: source_expression::CODE,
    name: source_expression::NAME,
    title: "Use procedures as page field source expressions instead of globals set in OnAfterGetRecord",
    message_format: "Global variable '{0}' is set in OnAfterGetRecord; define a procedure as the source expression of the page field instead",
    category: "Design",
    default_severity: Severity::Warning,
    enabled_by_default: true,
};

/// Every descriptor, ordered by code, including the internal rule-fault one.
#[must_use]
pub fn all_descriptors() -> [&'static RuleDescriptor; 9] {
    [
        &PROJECT_STRUCTURE,
        &MISSING_CAPTION,
        &REDUNDANT_DATA_CLASSIFICATION,
        &VAR_PARAMETER_UNMODIFIED,
        &SET_LOAD_FIELDS,
        &PREFER_SET_AUTO_CALC_FIELDS,
        &PREFER_TEXT_BUILDER,
        &SOURCE_EXPRESSION_PROCEDURE,
        &RULE_FAULT,
    ]
}

/// Finds a descriptor by code or name, ignoring case.
#[must_use]
pub fn find_descriptor(key: &str) -> Option<&'static RuleDescriptor> {
    all_descriptors().into_iter().find(|d| d.matches(key))
}
