//! Fixture helpers for rule unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use cital_lint_core::{
    Analyzer, CompilationUnit, NodeId, NodeKind, ObjectKind, Rule, Symbol, SymbolId, SymbolKind,
    TypeDescriptor, UnitBuilder, Violation,
};

/// Runs a single rule over a unit through the full analyzer pipeline.
pub(crate) fn check(rule: impl Rule + 'static, unit: &CompilationUnit) -> Vec<Violation> {
    Analyzer::builder()
        .root(".")
        .rule(rule)
        .build()
        .unwrap()
        .analyze_unit(unit)
        .unwrap()
}

/// A codeunit with one procedure `Run` and an empty body.
pub(crate) struct ProcedureFixture {
    pub b: UnitBuilder,
    pub object: NodeId,
    pub procedure: NodeId,
    pub body: NodeId,
    pub method: SymbolId,
}

impl ProcedureFixture {
    pub fn new() -> Self {
        Self::in_object(ObjectKind::Codeunit, "App/Sales/Codeunit/Fixture.al")
    }

    pub fn in_object(kind: ObjectKind, path: &str) -> Self {
        let mut b = UnitBuilder::new(path);
        let root = b.root();
        let object = b.add_text(root, NodeKind::Object(kind), "Fixture");
        let object_symbol = b.symbol(Symbol::new("Fixture", SymbolKind::Object(kind)));
        b.declare(object, object_symbol);
        let procedure = b.add_text(object, NodeKind::Procedure, "Run");
        let method = b.symbol(Symbol::new("Run", SymbolKind::Method).in_container(object_symbol));
        b.declare(procedure, method);
        let body = b.add(procedure, NodeKind::Block);
        Self {
            b,
            object,
            procedure,
            body,
            method,
        }
    }

    /// Declares a local record variable of the procedure.
    pub fn record(&mut self, name: &str, temporary: bool) -> SymbolId {
        let ty = if temporary {
            TypeDescriptor::temporary_record(name)
        } else {
            TypeDescriptor::record(name)
        };
        self.b.symbol(
            Symbol::new(name, SymbolKind::LocalVariable)
                .with_type(ty)
                .in_container(self.method),
        )
    }

    pub fn build(self) -> CompilationUnit {
        self.b.build().unwrap()
    }
}

/// Adds `receiver.method()` as a statement and returns the invocation.
pub(crate) fn member_call(
    b: &mut UnitBuilder,
    parent: NodeId,
    receiver: SymbolId,
    method: &str,
) -> NodeId {
    let method = b.symbol(Symbol::builtin_method(method));
    let stmt = b.add(parent, NodeKind::ExpressionStatement);
    let call = b.add(stmt, NodeKind::Invocation);
    let access = b.add(call, NodeKind::MemberAccess);
    b.identifier(access, receiver);
    b.identifier(access, method);
    call
}

/// Adds `target := ...` and returns the assignment; the caller adds the source.
pub(crate) fn assign_stmt(b: &mut UnitBuilder, parent: NodeId, target: SymbolId) -> NodeId {
    let assignment = b.add(parent, NodeKind::Assignment);
    b.identifier(assignment, target);
    assignment
}

/// Adds `with record do begin end` and returns the inner block.
pub(crate) fn with_body(b: &mut UnitBuilder, parent: NodeId, record: SymbolId) -> NodeId {
    let with = b.add(parent, NodeKind::With);
    b.identifier(with, record);
    b.add(with, NodeKind::Block)
}
