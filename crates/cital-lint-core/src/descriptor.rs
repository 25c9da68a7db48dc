//! Static rule descriptors.

use crate::types::Severity;

/// Identity and message template of a rule.
///
/// Descriptors are `'static` data built once; the analyzer only reads them
/// to attach identity and text to emitted diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleDescriptor {
    /// Rule code (e.g., "CIG0011").
    pub id: &'static str,
    /// Kebab-case rule name (e.g., "set-load-fields").
    pub name: &'static str,
    /// Short human-readable title.
    pub title: &'static str,
    /// Message template with positional `{0}`, `{1}`, ... placeholders.
    pub message_format: &'static str,
    /// Rule category (e.g., "Design").
    pub category: &'static str,
    /// Severity used unless configuration overrides it.
    pub default_severity: Severity,
    /// Whether the rule runs without explicit opt-in.
    pub enabled_by_default: bool,
}

impl RuleDescriptor {
    /// Renders the message template with the given arguments.
    ///
    /// Placeholders without a matching argument are left as-is.
    #[must_use]
    pub fn format_message(&self, args: &[String]) -> String {
        let template = self.message_format;
        let mut message = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            message.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let arg = after.find('}').and_then(|close| {
                let index: usize = after[..close].parse().ok()?;
                Some((args.get(index)?, close))
            });
            match arg {
                Some((value, close)) => {
                    message.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    message.push('{');
                    rest = after;
                }
            }
        }
        message.push_str(rest);
        message
    }

    /// Returns true if `key` is this rule's code or name.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        key.eq_ignore_ascii_case(self.id) || key.eq_ignore_ascii_case(self.name)
    }
}

/// Descriptor for faults raised while a rule handler runs.
pub static RULE_FAULT: RuleDescriptor = RuleDescriptor {
    id: "CIG9999",
    name: "rule-fault",
    title: "A rule failed while analyzing this file",
    message_format: "Rule '{0}' failed: {1}",
    category: "Internal",
    default_severity: Severity::Warning,
    enabled_by_default: true,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_positional_arguments() {
        let msg = RULE_FAULT.format_message(&["CIG0011".to_string(), "boom".to_string()]);
        assert_eq!(msg, "Rule 'CIG0011' failed: boom");
    }

    #[test]
    fn leaves_missing_placeholders() {
        let msg = RULE_FAULT.format_message(&["CIG0011".to_string()]);
        assert_eq!(msg, "Rule 'CIG0011' failed: {1}");
    }

    #[test]
    fn arguments_are_not_reinterpreted() {
        let msg = RULE_FAULT.format_message(&["Rec{1}".to_string(), "boom".to_string()]);
        assert_eq!(msg, "Rule 'Rec{1}' failed: boom");
    }

    #[test]
    fn faults_are_warnings() {
        assert_eq!(RULE_FAULT.default_severity, Severity::Warning);
    }

    #[test]
    fn matches_code_or_name() {
        assert!(RULE_FAULT.matches("cig9999"));
        assert!(RULE_FAULT.matches("rule-fault"));
        assert!(!RULE_FAULT.matches("set-load-fields"));
    }
}
