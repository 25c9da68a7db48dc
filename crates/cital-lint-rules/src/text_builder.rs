//! Rule preferring `TextBuilder` for text extended inside loops.
//!
//! # Rationale
//!
//! `Text += ...` copies the whole string on each append. Inside a loop this
//! grows quadratically; a `TextBuilder` appends in place.
//!
//! # Detected Patterns
//!
//! ```al
//! repeat
//!     Result += Customer.Name;   // flagged
//! until Customer.Next() = 0;
//! ```
//!
//! Only `+=` on a variable of type `Text`, `Code` or `BigText` is flagged,
//! and only inside a `for`, `while` or `repeat` of the same procedure.
//!
//! # Suppression
//!
//! - `// cital-lint: allow(prefer-text-builder)` comment on the statement or loop

use crate::catalog::PREFER_TEXT_BUILDER;
use crate::semantics::is_object_obsolete;
use cital_lint_core::{
    CompilationUnit, Interest, NodeContext, NodeId, NodeKind, Rule, RuleDescriptor, RuleError,
};

/// Rule code for prefer-text-builder.
pub const CODE: &str = "CIG0014";

/// Rule name for prefer-text-builder.
pub const NAME: &str = "prefer-text-builder";

const APPEND_OPERATOR: &str = "+=";

/// Flags text appends inside loops.
#[derive(Debug, Clone, Default)]
pub struct PreferTextBuilder;

impl PreferTextBuilder {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Returns true if a loop encloses `node` before the enclosing procedure or trigger.
fn in_loop(unit: &CompilationUnit, node: NodeId) -> bool {
    for ancestor in unit.ancestors(node) {
        let kind = unit.kind(ancestor);
        if kind.is_loop() {
            return true;
        }
        if kind.is_code_block() {
            return false;
        }
    }
    false
}

impl Rule for PreferTextBuilder {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &PREFER_TEXT_BUILDER
    }

    fn interests(&self) -> &'static [Interest] {
        &[Interest::Node(NodeKind::CompoundAssignment)]
    }

    fn check_node(&self, ctx: &mut NodeContext<'_>) -> Result<(), RuleError> {
        let unit = ctx.unit;
        if unit.node(ctx.node).text().trim() != APPEND_OPERATOR {
            return Ok(());
        }
        let Some(target) = unit
            .child(ctx.node, 0)
            .filter(|&t| unit.kind(t) == NodeKind::Identifier)
        else {
            return Ok(());
        };
        let Some(variable) = unit.resolved(target) else {
            return Ok(());
        };
        if !variable.kind.is_variable() || !variable.ty.kind.is_text() {
            return Ok(());
        }
        if !in_loop(unit, ctx.node) {
            return Ok(());
        }
        if unit
            .enclosing_object(ctx.node)
            .is_some_and(|o| is_object_obsolete(unit, o))
        {
            return Ok(());
        }

        let name = variable.name.clone();
        ctx.report_at(ctx.node, vec![name]);
        Ok(())
    }
}
