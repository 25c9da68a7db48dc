//! Rule flagging `var` parameters that the procedure never modifies.
//!
//! # Rationale
//!
//! Passing by reference tells the caller to expect changes. When nothing
//! changes, the `var` keyword is misleading.
//!
//! # Detected Patterns
//!
//! A `var` parameter counts as modified when it is:
//!
//! - the target of an assignment (`Param := ...`, `Param += ...`)
//! - the receiver of a member assignment (`Param.Name := ...`)
//! - the receiver of a method call (`Param.SetRange(...)`, `Param.Modify()`)
//!
//! # Suppression
//!
//! - A leading comment on the procedure that mentions `filter` and the
//!   parameter name, e.g. `// filter is set on Customer`
//! - `// cital-lint: allow(var-parameter-unmodified)` comment on the procedure

use crate::catalog::VAR_PARAMETER_UNMODIFIED;
use cital_lint_core::{
    CompilationUnit, Interest, NodeContext, NodeId, NodeKind, Rule, RuleDescriptor, RuleError,
    SymbolId,
};
use std::collections::HashSet;

/// Rule code for var-parameter-unmodified.
pub const CODE: &str = "CIG0010";

/// Rule name for var-parameter-unmodified.
pub const NAME: &str = "var-parameter-unmodified";

const FILTER_KEYWORD: &str = "filter";

/// Flags by-reference parameters that are never modified.
#[derive(Debug, Clone, Default)]
pub struct VarParameterUnmodified;

impl VarParameterUnmodified {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Symbol behind `expr` when it is a plain identifier.
fn identifier_symbol(unit: &CompilationUnit, expr: Option<NodeId>) -> Option<SymbolId> {
    let expr = expr?;
    (unit.kind(expr) == NodeKind::Identifier)
        .then(|| unit.resolve_symbol(expr))
        .flatten()
}

/// Root symbol of `target` or `target.member`.
fn written_symbol(unit: &CompilationUnit, target: NodeId) -> Option<SymbolId> {
    match unit.kind(target) {
        NodeKind::Identifier => unit.resolve_symbol(target),
        NodeKind::MemberAccess => identifier_symbol(unit, unit.child(target, 0)),
        _ => None,
    }
}

fn modified_symbols(unit: &CompilationUnit, procedure: NodeId) -> HashSet<SymbolId> {
    let mut modified = HashSet::new();
    for node in unit.descendants(procedure) {
        let symbol = match unit.kind(node) {
            NodeKind::Assignment | NodeKind::CompoundAssignment => {
                unit.child(node, 0).and_then(|t| written_symbol(unit, t))
            }
            NodeKind::Invocation => unit
                .child(node, 0)
                .filter(|&callee| unit.kind(callee) == NodeKind::MemberAccess)
                .and_then(|callee| identifier_symbol(unit, unit.child(callee, 0))),
            _ => None,
        };
        modified.extend(symbol);
    }
    modified
}

impl Rule for VarParameterUnmodified {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &VAR_PARAMETER_UNMODIFIED
    }

    fn interests(&self) -> &'static [Interest] {
        &[Interest::Node(NodeKind::Procedure)]
    }

    fn check_node(&self, ctx: &mut NodeContext<'_>) -> Result<(), RuleError> {
        let unit = ctx.unit;
        let parameters: Vec<(NodeId, SymbolId)> = unit
            .children(ctx.node)
            .iter()
            .copied()
            .filter(|&c| unit.kind(c) == NodeKind::Parameter)
            .filter_map(|c| unit.declared_symbol(c).map(|s| (c, s)))
            .filter(|&(_, s)| unit.symbol(s).by_reference)
            .collect();
        if parameters.is_empty() {
            return Ok(());
        }

        let modified = modified_symbols(unit, ctx.node);
        let comments: Vec<String> = unit
            .leading_comments(ctx.node)
            .iter()
            .map(|c| c.to_lowercase())
            .collect();

        for (node, symbol) in parameters {
            if modified.contains(&symbol) {
                continue;
            }
            let name = unit.symbol(symbol).name.clone();
            let lowered = name.to_lowercase();
            let explained = comments
                .iter()
                .any(|c| c.contains(FILTER_KEYWORD) && c.contains(&lowered));
            if !explained {
                ctx.report_at(node, vec![name]);
            }
        }
        Ok(())
    }
}
