//! Rule flagging page fields fed by globals computed in `OnAfterGetRecord`.
//!
//! # Rationale
//!
//! A global that `OnAfterGetRecord` recalculates for every record and a page
//! field then displays is a procedure in disguise. Using the procedure as
//! the field's source expression keeps the value next to the field and
//! avoids computing it for records that are never shown.
//!
//! # Algorithm
//!
//! 1. Collect every global variable of the page that is the target of an
//!    assignment or compound assignment in the trigger body.
//! 2. Follow calls to procedures declared in the same object and collect
//!    their assignments too. A visited set keyed by method stops cycles.
//!    Calls into other objects are not followed.
//! 3. For each page field, look at the identifiers of its source
//!    expression; the first one naming a collected global is reported.
//!
//! # Suppression
//!
//! - `// cital-lint: allow(source-expression-procedure)` comment on the field

use crate::catalog::SOURCE_EXPRESSION_PROCEDURE;
use crate::semantics::{call_target, is_object_obsolete};
use cital_lint_core::{
    CompilationUnit, Interest, NodeContext, NodeId, NodeKind, Rule, RuleDescriptor, RuleError,
    SymbolId, SymbolKind,
};
use std::collections::HashSet;
use tracing::trace;

/// Rule code for source-expression-procedure.
pub const CODE: &str = "CIG0015";

/// Rule name for source-expression-procedure.
pub const NAME: &str = "source-expression-procedure";

/// Trigger whose writes are tracked.
pub const TRIGGER_NAME: &str = "OnAfterGetRecord";

/// Flags page fields whose source expression reads a global set in `OnAfterGetRecord`.
#[derive(Debug, Clone, Default)]
pub struct SourceExpressionProcedure;

impl SourceExpressionProcedure {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for SourceExpressionProcedure {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &SOURCE_EXPRESSION_PROCEDURE
    }

    fn interests(&self) -> &'static [Interest] {
        &[Interest::Node(NodeKind::Trigger)]
    }

    fn check_node(&self, ctx: &mut NodeContext<'_>) -> Result<(), RuleError> {
        let unit = ctx.unit;
        if !unit.node(ctx.node).text_is(TRIGGER_NAME) {
            return Ok(());
        }
        let Some(object) = unit.enclosing_object(ctx.node) else {
            return Ok(());
        };
        let is_page = unit
            .kind(object)
            .object_kind()
            .is_some_and(|kind| kind.is_page_like());
        if !is_page || is_object_obsolete(unit, object) {
            return Ok(());
        }
        let Some(object_symbol) = unit.declared_symbol(object) else {
            return Ok(());
        };

        let globals: HashSet<SymbolId> = unit
            .members_of(object_symbol)
            .filter(|(_, s)| s.kind == SymbolKind::GlobalVariable)
            .map(|(id, _)| id)
            .collect();
        if globals.is_empty() {
            return Ok(());
        }

        let Some(body) = unit.body(ctx.node) else {
            return Ok(());
        };
        let modified = modified_globals(unit, body, object_symbol, &globals);
        if modified.is_empty() {
            return Ok(());
        }

        for field in unit.descendants(object) {
            if unit.kind(field) != NodeKind::PageField {
                continue;
            }
            let Some(source) = unit.child(field, 0) else {
                continue;
            };
            let hit = unit.descendants_and_self(source).find_map(|id| {
                let symbol = unit.resolve_symbol(id)?;
                (unit.kind(id) == NodeKind::Identifier && modified.contains(&symbol))
                    .then_some((id, symbol))
            });
            if let Some((id, symbol)) = hit {
                ctx.report_at(id, vec![unit.symbol(symbol).name.clone()]);
            }
        }
        Ok(())
    }
}

/// Globals written by `body` or by any same-object procedure it reaches.
fn modified_globals(
    unit: &CompilationUnit,
    body: NodeId,
    object: SymbolId,
    globals: &HashSet<SymbolId>,
) -> HashSet<SymbolId> {
    let mut modified = HashSet::new();
    let mut visited: HashSet<SymbolId> = HashSet::new();
    let mut pending = vec![body];

    while let Some(block) = pending.pop() {
        for node in unit.descendants(block) {
            match unit.kind(node) {
                NodeKind::Assignment | NodeKind::CompoundAssignment => {
                    let target = unit
                        .child(node, 0)
                        .filter(|&t| unit.kind(t) == NodeKind::Identifier)
                        .and_then(|t| unit.resolve_symbol(t));
                    if let Some(symbol) = target.filter(|s| globals.contains(s)) {
                        modified.insert(symbol);
                    }
                }
                NodeKind::Invocation => {
                    let Some(callee) = local_procedure_body(unit, node, object) else {
                        continue;
                    };
                    if visited.insert(callee.0) {
                        trace!("following call to {}", unit.symbol(callee.0).name);
                        pending.push(callee.1);
                    }
                }
                _ => {}
            }
        }
    }

    modified
}

/// Method and body of a call to a procedure declared in `object`.
fn local_procedure_body(
    unit: &CompilationUnit,
    invocation: NodeId,
    object: SymbolId,
) -> Option<(SymbolId, NodeId)> {
    let target = call_target(unit, invocation)?;
    let method = unit.symbol(target.method);
    if method.builtin || method.container != Some(object) {
        return None;
    }
    let body = unit.body(method.declaration?)?;
    Some((target.method, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{assign_stmt, check};
    use cital_lint_core::{ObjectKind, Symbol, UnitBuilder, Violation};

    struct PageFixture {
        b: UnitBuilder,
        object: NodeId,
        page: SymbolId,
        trigger_body: NodeId,
    }

    impl PageFixture {
        fn new(kind: ObjectKind) -> Self {
            let mut b = UnitBuilder::new("App/Sales/Page/CustomerCard.al");
            let root = b.root();
            let object = b.add_text(root, NodeKind::Object(kind), "Customer Card");
            let page = b.symbol(Symbol::new("Customer Card", SymbolKind::Object(kind)));
            b.declare(object, page);
            let trigger = b.add_text(object, NodeKind::Trigger, "OnAfterGetRecord");
            let trigger_body = b.add(trigger, NodeKind::Block);
            Self {
                b,
                object,
                page,
                trigger_body,
            }
        }

        fn global(&mut self, name: &str) -> SymbolId {
            self.b
                .symbol(Symbol::new(name, SymbolKind::GlobalVariable).in_container(self.page))
        }

        fn procedure(&mut self, name: &str) -> (SymbolId, NodeId) {
            let node = self.b.add_text(self.object, NodeKind::Procedure, name);
            let method = self
                .b
                .symbol(Symbol::new(name, SymbolKind::Method).in_container(self.page));
            self.b.declare(node, method);
            let body = self.b.add(node, NodeKind::Block);
            (method, body)
        }

        fn call(&mut self, parent: NodeId, method: SymbolId) {
            let stmt = self.b.add(parent, NodeKind::ExpressionStatement);
            let call = self.b.add(stmt, NodeKind::Invocation);
            self.b.identifier(call, method);
        }

        fn page_field(&mut self, source: SymbolId) -> NodeId {
            let field = self.b.add(self.object, NodeKind::PageField);
            self.b.identifier(field, source);
            field
        }

        fn check(self) -> Vec<Violation> {
            check(SourceExpressionProcedure::new(), &self.b.build().unwrap())
        }
    }

    #[test]
    fn test_detects_global_set_in_trigger() {
        let mut f = PageFixture::new(ObjectKind::Page);
        let balance = f.global("Balance");
        let body = f.trigger_body;
        assign_stmt(&mut f.b, body, balance);
        f.page_field(balance);

        let violations = f.check();
        assert_eq!(violations.len(), 1);
        insta::assert_snapshot!(violations[0].message, @"Global variable 'Balance' is set in OnAfterGetRecord; define a procedure as the source expression of the page field instead");
    }

    #[test]
    fn test_compound_assignment_counts() {
        let mut f = PageFixture::new(ObjectKind::PageExtension);
        let total = f.global("Total");
        let body = f.trigger_body;
        let compound = f.b.add_text(body, NodeKind::CompoundAssignment, "+=");
        f.b.identifier(compound, total);
        f.page_field(total);

        assert_eq!(f.check().len(), 1);
    }

    #[test]
    fn test_follows_local_procedures_through_cycles() {
        let mut f = PageFixture::new(ObjectKind::Page);
        let status = f.global("Status");
        let (calc, calc_body) = f.procedure("CalcStatus");
        let (helper, helper_body) = f.procedure("Helper");
        let body = f.trigger_body;
        f.call(body, calc);
        f.call(calc_body, helper);
        f.call(helper_body, calc);
        assign_stmt(&mut f.b, helper_body, status);
        f.page_field(status);

        assert_eq!(f.check().len(), 1);
    }

    #[test]
    fn test_globals_assigned_outside_call_graph_are_ignored() {
        let mut f = PageFixture::new(ObjectKind::Page);
        let status = f.global("Status");
        let (_, unrelated_body) = f.procedure("Unrelated");
        assign_stmt(&mut f.b, unrelated_body, status);
        f.page_field(status);

        assert!(f.check().is_empty());
    }

    #[test]
    fn test_calls_into_other_objects_are_not_followed() {
        let mut f = PageFixture::new(ObjectKind::Page);
        let status = f.global("Status");
        let other = f
            .b
            .symbol(Symbol::new("Other", SymbolKind::Object(ObjectKind::Codeunit)));
        let root = f.b.root();
        let other_node = f.b.add(root, NodeKind::Object(ObjectKind::Codeunit));
        let foreign = f.b.add_text(other_node, NodeKind::Procedure, "SetStatus");
        let foreign_method = f
            .b
            .symbol(Symbol::new("SetStatus", SymbolKind::Method).in_container(other));
        f.b.declare(foreign, foreign_method);
        let foreign_body = f.b.add(foreign, NodeKind::Block);
        assign_stmt(&mut f.b, foreign_body, status);
        let body = f.trigger_body;
        f.call(body, foreign_method);
        f.page_field(status);

        assert!(f.check().is_empty());
    }

    #[test]
    fn test_reports_once_per_field_at_first_match() {
        let mut f = PageFixture::new(ObjectKind::Page);
        let first = f.global("First");
        let second = f.global("Second");
        let body = f.trigger_body;
        assign_stmt(&mut f.b, body, first);
        assign_stmt(&mut f.b, body, second);
        let field = f.b.add(f.object, NodeKind::PageField);
        let expr = f.b.add_text(field, NodeKind::Binary, "+");
        f.b.identifier(expr, first);
        f.b.identifier(expr, second);

        let violations = f.check();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("'First'"));
    }

    #[test]
    fn test_field_properties_are_not_scanned() {
        let mut f = PageFixture::new(ObjectKind::Page);
        let name = f.global("Name");
        let visible = f.global("IsVisible");
        let body = f.trigger_body;
        assign_stmt(&mut f.b, body, visible);
        let field = f.page_field(name);
        let property = f.b.add_text(field, NodeKind::Property, "Visible");
        f.b.identifier(property, visible);

        assert!(f.check().is_empty());
    }

    #[test]
    fn test_other_triggers_and_non_pages_are_ignored() {
        let mut b = UnitBuilder::new("App/Sales/Codeunit/Foo.al");
        let root = b.root();
        let object = b.add(root, NodeKind::Object(ObjectKind::Codeunit));
        let codeunit = b.symbol(Symbol::new("Foo", SymbolKind::Object(ObjectKind::Codeunit)));
        b.declare(object, codeunit);
        let global = b.symbol(Symbol::new("G", SymbolKind::GlobalVariable).in_container(codeunit));
        let trigger = b.add_text(object, NodeKind::Trigger, "OnAfterGetRecord");
        let body = b.add(trigger, NodeKind::Block);
        assign_stmt(&mut b, body, global);
        let field = b.add(object, NodeKind::PageField);
        b.identifier(field, global);
        assert!(check(SourceExpressionProcedure::new(), &b.build().unwrap()).is_empty());

        let mut f = PageFixture::new(ObjectKind::Page);
        let g = f.global("G");
        let open = f.b.add_text(f.object, NodeKind::Trigger, "OnOpenPage");
        let open_body = f.b.add(open, NodeKind::Block);
        assign_stmt(&mut f.b, open_body, g);
        f.page_field(g);
        assert!(f.check().is_empty());
    }
}
