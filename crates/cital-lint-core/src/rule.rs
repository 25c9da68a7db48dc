//! Rule traits for defining lint rules.

use crate::context::{NodeContext, SymbolContext};
use crate::descriptor::RuleDescriptor;
use crate::model::{NodeKind, SymbolKind};
use crate::types::Severity;

/// What a rule wants to observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interest {
    /// Every syntax node of this kind.
    Node(NodeKind),
    /// Every symbol of this kind.
    Symbol(SymbolKind),
}

/// Failure inside a rule handler.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// The model did not have the shape the rule relies on.
    #[error("unexpected model shape: {0}")]
    Shape(String),

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

/// A lint rule driven by the dispatcher.
///
/// A rule declares the node and symbol kinds it observes through
/// [`Rule::interests`]; the dispatcher calls [`Rule::check_node`] or
/// [`Rule::check_symbol`] once for every matching node or symbol. Any state a
/// rule needs lives on the stack of a single handler call.
///
/// # Example
///
/// ```ignore
/// use cital_lint_core::{Interest, NodeContext, NodeKind, Rule, RuleDescriptor, RuleError};
///
/// pub struct NoExit;
///
/// impl Rule for NoExit {
///     fn descriptor(&self) -> &'static RuleDescriptor { &NO_EXIT }
///     fn interests(&self) -> &'static [Interest] { &[Interest::Node(NodeKind::Exit)] }
///
///     fn check_node(&self, ctx: &mut NodeContext<'_>) -> Result<(), RuleError> {
///         ctx.report_at(ctx.node, Vec::new());
///         Ok(())
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Identity and message template.
    fn descriptor(&self) -> &'static RuleDescriptor;

    /// Node and symbol kinds this rule observes.
    fn interests(&self) -> &'static [Interest];

    /// Returns the kebab-case name of this rule.
    fn name(&self) -> &'static str {
        self.descriptor().name
    }

    /// Returns the rule code (e.g., "CIG0011").
    fn code(&self) -> &'static str {
        self.descriptor().id
    }

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        self.descriptor().title
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        self.descriptor().default_severity
    }

    /// Called for every node whose kind the rule registered for.
    ///
    /// # Errors
    ///
    /// Errors are reported as a rule fault and do not stop the run.
    fn check_node(&self, _ctx: &mut NodeContext<'_>) -> Result<(), RuleError> {
        Ok(())
    }

    /// Called for every symbol whose kind the rule registered for.
    ///
    /// # Errors
    ///
    /// Errors are reported as a rule fault and do not stop the run.
    fn check_symbol(&self, _ctx: &mut SymbolContext<'_>) -> Result<(), RuleError> {
        Ok(())
    }
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

#[cfg(test)]
mod tests {
    use super::*;

    static TEST: RuleDescriptor = RuleDescriptor {
        id: "TEST001",
        name: "test-rule",
        title: "A test rule",
        message_format: "test",
        category: "Design",
        default_severity: Severity::Error,
        enabled_by_default: true,
    };

    struct TestRule;

    impl Rule for TestRule {
        fn descriptor(&self) -> &'static RuleDescriptor {
            &TEST
        }

        fn interests(&self) -> &'static [Interest] {
            &[Interest::Node(NodeKind::Exit)]
        }
    }

    #[test]
    fn test_rule_trait_defaults() {
        let rule = TestRule;
        assert_eq!(rule.name(), "test-rule");
        assert_eq!(rule.code(), "TEST001");
        assert_eq!(rule.description(), "A test rule");
        assert_eq!(rule.default_severity(), Severity::Error);
    }
}
