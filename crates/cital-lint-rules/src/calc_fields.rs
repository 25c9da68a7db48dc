//! Rule preferring `SetAutoCalcFields` over `CalcFields`.
//!
//! # Rationale
//!
//! `CalcFields` after a fetch costs one extra query per record.
//! `SetAutoCalcFields` before the fetch computes the FlowFields as part of
//! the same query.
//!
//! # Detected Patterns
//!
//! Any call to the built-in `CalcFields`. Procedures named `CalcFields` in
//! source are not affected, nor are obsolete objects.
//!
//! # Suppression
//!
//! - `// cital-lint: allow(prefer-set-auto-calc-fields)` comment on the statement

use crate::catalog::PREFER_SET_AUTO_CALC_FIELDS;
use crate::semantics::{builtin_call, is_object_obsolete};
use cital_lint_core::{Interest, NodeContext, NodeKind, Rule, RuleDescriptor, RuleError};

/// Rule code for prefer-set-auto-calc-fields.
pub const CODE: &str = "CIG0012";

/// Rule name for prefer-set-auto-calc-fields.
pub const NAME: &str = "prefer-set-auto-calc-fields";

const CALC_FIELDS: &str = "CalcFields";

/// Flags built-in `CalcFields` calls.
#[derive(Debug, Clone, Default)]
pub struct PreferSetAutoCalcFields;

impl PreferSetAutoCalcFields {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for PreferSetAutoCalcFields {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &PREFER_SET_AUTO_CALC_FIELDS
    }

    fn interests(&self) -> &'static [Interest] {
        &[Interest::Node(NodeKind::Invocation)]
    }

    fn check_node(&self, ctx: &mut NodeContext<'_>) -> Result<(), RuleError> {
        let Some((_, method)) = builtin_call(ctx.unit, ctx.node) else {
            return Ok(());
        };
        if !method.name.eq_ignore_ascii_case(CALC_FIELDS) {
            return Ok(());
        }
        if ctx
            .unit
            .enclosing_object(ctx.node)
            .is_some_and(|o| is_object_obsolete(ctx.unit, o))
        {
            return Ok(());
        }
        ctx.report_at(ctx.node, Vec::new());
        Ok(())
    }
}
