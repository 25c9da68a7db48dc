//! Comment-based allowance directives.
//!
//! Supports directives like:
//! ```text
//! // cital-lint: allow(set-load-fields) reason="single record lookup"
//! ```
//!
//! A directive applies to the node it is attached to as a leading comment
//! and to everything nested inside that node.

use crate::descriptor::RuleDescriptor;
use crate::model::{CompilationUnit, NodeId};
use std::collections::HashSet;

/// Result of checking for allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Rule is not allowed.
    Denied,
    /// Rule is allowed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Parsed allowance directive.
#[derive(Debug, Clone)]
pub struct AllowDirective {
    /// Rule names or codes that are allowed, lowercased.
    pub rules: HashSet<String>,
    /// Optional reason for the allowance.
    pub reason: Option<String>,
}

impl AllowDirective {
    /// Returns true if the directive covers `rule`.
    #[must_use]
    pub fn allows(&self, rule: &RuleDescriptor) -> bool {
        self.rules.contains("all") || self.rules.iter().any(|r| rule.matches(r))
    }
}

/// Checks a node and its ancestors for a directive covering `rule`.
#[must_use]
pub fn check_node_allowance(
    unit: &CompilationUnit,
    node: NodeId,
    rule: &RuleDescriptor,
) -> AllowCheck {
    for id in unit.ancestors_and_self(node) {
        let check = check_allow_with_reason(unit.leading_comments(id), rule);
        if check.is_allowed() {
            return check;
        }
    }
    AllowCheck::Denied
}

/// Checks a list of comments for a directive covering `rule`.
#[must_use]
pub fn check_allow_with_reason(comments: &[String], rule: &RuleDescriptor) -> AllowCheck {
    comments
        .iter()
        .filter_map(|c| parse_allow_directive(c))
        .find(|d| d.allows(rule))
        .map_or(AllowCheck::Denied, |d| AllowCheck::Allowed { reason: d.reason })
}

/// Parses an allowance directive from a single comment.
///
/// Accepts `//`, `///` and `/* ... */` comments.
#[must_use]
pub fn parse_allow_directive(comment: &str) -> Option<AllowDirective> {
    let comment = comment.trim();

    let comment_content = if let Some(rest) = comment.strip_prefix("///") {
        rest.trim()
    } else if let Some(rest) = comment.strip_prefix("//") {
        rest.trim()
    } else if let Some(rest) = comment.strip_prefix("/*") {
        rest.strip_suffix("*/").unwrap_or(rest).trim()
    } else {
        return None;
    };

    let directive = comment_content.strip_prefix("cital-lint:")?.trim();
    let allow_content = directive.strip_prefix("allow(")?.trim();

    let paren_end = allow_content.find(')')?;
    let rules: HashSet<String> = allow_content[..paren_end]
        .split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    if rules.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest
        .strip_prefix("reason=")
        .map(str::trim)
        .and_then(|r| r.strip_prefix('"'))
        .and_then(|r| r.find('"').map(|end| r[..end].to_string()));

    Some(AllowDirective { rules, reason })
}
