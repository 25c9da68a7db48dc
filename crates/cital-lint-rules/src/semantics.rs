//! Small semantic queries shared by several rules.

use cital_lint_core::{CompilationUnit, NodeId, NodeKind, Symbol, SymbolId, SymbolKind};

/// Resolved target of an `Invocation` node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CallTarget {
    pub method: SymbolId,
    /// Explicit receiver (`Rec` in `Rec.Get()`), if any.
    pub receiver: Option<NodeId>,
}

/// Resolves the method called by `invocation`.
pub(crate) fn call_target(unit: &CompilationUnit, invocation: NodeId) -> Option<CallTarget> {
    let callee = unit.child(invocation, 0)?;
    let (method_node, receiver) = match unit.kind(callee) {
        NodeKind::MemberAccess => (unit.child(callee, 1)?, Some(unit.child(callee, 0)?)),
        NodeKind::Identifier => (callee, None),
        _ => return None,
    };
    let method = unit.resolve_symbol(method_node)?;
    (unit.symbol(method).kind == SymbolKind::Method).then_some(CallTarget { method, receiver })
}

/// Returns the built-in method called by `invocation`, if it is one.
pub(crate) fn builtin_call(unit: &CompilationUnit, invocation: NodeId) -> Option<(CallTarget, &Symbol)> {
    let target = call_target(unit, invocation)?;
    let method = unit.symbol(target.method);
    method.builtin.then_some((target, method))
}

/// Target expression of the nearest enclosing `with` statement below `stop`.
pub(crate) fn with_target(unit: &CompilationUnit, node: NodeId, stop: NodeId) -> Option<NodeId> {
    for ancestor in unit.ancestors(node) {
        if ancestor == stop {
            break;
        }
        if unit.kind(ancestor) == NodeKind::With {
            return unit.child(ancestor, 0);
        }
    }
    None
}

/// Returns true for symbols marked `ObsoleteState = Pending` or `Removed`.
pub(crate) fn is_obsolete(symbol: &Symbol) -> bool {
    symbol.property("ObsoleteState").is_some_and(|state| {
        state.eq_ignore_ascii_case("Pending") || state.eq_ignore_ascii_case("Removed")
    })
}

/// Returns true if the object declared by `object` is obsolete.
pub(crate) fn is_object_obsolete(unit: &CompilationUnit, object: NodeId) -> bool {
    unit.declared_symbol(object)
        .is_some_and(|s| is_obsolete(unit.symbol(s)))
}
