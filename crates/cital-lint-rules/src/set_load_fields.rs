//! Rule requiring `SetLoadFields` before records are fetched.
//!
//! # Rationale
//!
//! Fetching a record loads every field unless the load set was narrowed
//! first. Calling `SetLoadFields` (or `AddLoadFields`) before `Get`,
//! `Find`, `FindFirst`, `FindLast` or `FindSet` keeps the query small.
//!
//! # Algorithm
//!
//! Each procedure body is scanned twice:
//!
//! 1. Exemptions. A record variable is exempt when it takes part in a
//!    `TransferFields` call (as receiver or argument), or when more than
//!    `field_threshold` distinct fields are read from it, either as
//!    `Rec.Field` or as a bare field inside `with Rec do`.
//! 2. State tracking, in source order. Every record starts `NotLoaded`; a
//!    setter moves it to `Loaded`, `ClearLoadFields` or a direct
//!    assignment moves it back. A fetch on a `NotLoaded`, non-exempt record
//!    is a violation.
//!
//! Diagnostics are emitted only after both passes. Obsolete objects are
//! skipped and temporary records are never tracked.
//!
//! # Configuration
//!
//! - `field_threshold`: distinct field count above which a record is exempt (default 10)
//!
//! # Suppression
//!
//! - `// cital-lint: allow(set-load-fields)` comment on the procedure or statement

use crate::catalog::SET_LOAD_FIELDS;
use crate::semantics::{builtin_call, is_object_obsolete, with_target};
use cital_lint_core::{
    CompilationUnit, Interest, NodeContext, NodeId, NodeKind, Rule, RuleDescriptor, RuleError,
    SymbolId, SymbolKind,
};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Rule code for set-load-fields.
pub const CODE: &str = "CIG0011";

/// Rule name for set-load-fields.
pub const NAME: &str = "set-load-fields";

/// Default distinct-field count above which preloading is pointless.
pub const DEFAULT_FIELD_THRESHOLD: usize = 10;

const FETCH_METHODS: &[&str] = &["FindSet", "FindFirst", "FindLast", "Find", "Get"];
const LOAD_FIELD_SETTERS: &[&str] = &["SetLoadFields", "AddLoadFields"];
const LOAD_FIELD_CLEARERS: &[&str] = &["ClearLoadFields"];
const TRANSFER_FIELDS: &str = "TransferFields";

fn is_one_of(name: &str, set: &[&str]) -> bool {
    set.iter().any(|m| m.eq_ignore_ascii_case(name))
}

/// Requires `SetLoadFields` before record fetch methods.
#[derive(Debug, Clone)]
pub struct SetLoadFields {
    /// Records reading more distinct fields than this are exempt.
    pub field_threshold: usize,
}

impl Default for SetLoadFields {
    fn default() -> Self {
        Self::new()
    }
}

impl SetLoadFields {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            field_threshold: DEFAULT_FIELD_THRESHOLD,
        }
    }

    /// Sets the field-count threshold.
    #[must_use]
    pub fn field_threshold(mut self, threshold: usize) -> Self {
        self.field_threshold = threshold;
        self
    }
}

impl Rule for SetLoadFields {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &SET_LOAD_FIELDS
    }

    fn interests(&self) -> &'static [Interest] {
        &[Interest::Node(NodeKind::Procedure)]
    }

    fn check_node(&self, ctx: &mut NodeContext<'_>) -> Result<(), RuleError> {
        let unit = ctx.unit;
        if unit
            .enclosing_object(ctx.node)
            .is_some_and(|object| is_object_obsolete(unit, object))
        {
            return Ok(());
        }
        let Some(body) = unit.body(ctx.node) else {
            return Ok(());
        };

        let exempt = exempt_records(unit, body, self.field_threshold);

        let mut tracker = LoadTracker {
            unit,
            body,
            exempt: &exempt,
            states: HashMap::new(),
            findings: Vec::new(),
        };
        tracker.visit(body);

        for finding in tracker.findings {
            let name = unit.symbol(finding.record).name.clone();
            ctx.report_at(finding.call, vec![name, finding.method]);
        }
        Ok(())
    }
}

/// Load state of one record variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    NotLoaded,
    Loaded,
}

struct Finding {
    call: NodeId,
    record: SymbolId,
    method: String,
}

/// Non-temporary record variable behind an expression node.
fn tracked_record(unit: &CompilationUnit, expr: NodeId) -> Option<SymbolId> {
    let id = unit.resolve_symbol(expr)?;
    let symbol = unit.symbol(id);
    (symbol.is_record_variable() && !symbol.ty.temporary).then_some(id)
}

/// Record a built-in call operates on: the explicit receiver, or the
/// target of the enclosing `with`.
fn call_record(unit: &CompilationUnit, body: NodeId, invocation: NodeId) -> Option<(SymbolId, String)> {
    let (target, method) = builtin_call(unit, invocation)?;
    let receiver = match target.receiver {
        Some(receiver) => receiver,
        None => with_target(unit, invocation, body)?,
    };
    Some((tracked_record(unit, receiver)?, method.name.clone()))
}

/// First pass: records in `TransferFields` calls or reading many fields.
fn exempt_records(unit: &CompilationUnit, body: NodeId, threshold: usize) -> HashSet<SymbolId> {
    let mut exempt = HashSet::new();
    let mut fields: HashMap<SymbolId, HashSet<SymbolId>> = HashMap::new();

    for node in unit.descendants(body) {
        match unit.kind(node) {
            NodeKind::Invocation => {
                let Some((target, method)) = builtin_call(unit, node) else {
                    continue;
                };
                if !method.name.eq_ignore_ascii_case(TRANSFER_FIELDS) {
                    continue;
                }
                // Receiver and source are exempted independently; either may be temporary.
                let receiver = target.receiver.or_else(|| with_target(unit, node, body));
                exempt.extend(receiver.and_then(|r| tracked_record(unit, r)));
                let arguments = unit.children(node).iter().skip(1);
                exempt.extend(arguments.filter_map(|&arg| tracked_record(unit, arg)));
            }
            NodeKind::MemberAccess => {
                let (Some(receiver), Some(member)) = (unit.child(node, 0), unit.child(node, 1))
                else {
                    continue;
                };
                if let (Some(record), Some(field)) =
                    (tracked_record(unit, receiver), field_symbol(unit, member))
                {
                    fields.entry(record).or_default().insert(field);
                }
            }
            NodeKind::Identifier if !is_member_name(unit, node) => {
                let Some(field) = field_symbol(unit, node) else {
                    continue;
                };
                if let Some(record) =
                    with_target(unit, node, body).and_then(|t| tracked_record(unit, t))
                {
                    fields.entry(record).or_default().insert(field);
                }
            }
            _ => {}
        }
    }

    exempt.extend(
        fields
            .into_iter()
            .filter(|(_, used)| used.len() > threshold)
            .map(|(record, _)| record),
    );
    exempt
}

fn field_symbol(unit: &CompilationUnit, node: NodeId) -> Option<SymbolId> {
    unit.resolve_symbol(node)
        .filter(|&s| unit.symbol(s).kind == SymbolKind::Field)
}

/// Returns true for the `member` half of `receiver.member`.
fn is_member_name(unit: &CompilationUnit, node: NodeId) -> bool {
    unit.parent(node).is_some_and(|p| {
        unit.kind(p) == NodeKind::MemberAccess && unit.child(p, 1) == Some(node)
    })
}

/// Second pass: walks the body in evaluation order.
struct LoadTracker<'a> {
    unit: &'a CompilationUnit,
    body: NodeId,
    exempt: &'a HashSet<SymbolId>,
    states: HashMap<SymbolId, LoadState>,
    findings: Vec<Finding>,
}

impl LoadTracker<'_> {
    fn visit(&mut self, node: NodeId) {
        match self.unit.kind(node) {
            NodeKind::Assignment => {
                let target = self.unit.child(node, 0);
                for &child in self.unit.children(node).iter().skip(1) {
                    self.visit(child);
                }
                if let Some(target) = target {
                    self.visit(target);
                    self.reset_if_reassigned(target);
                }
            }
            NodeKind::Invocation => {
                for &child in self.unit.children(node) {
                    self.visit(child);
                }
                self.on_call(node);
            }
            _ => {
                for &child in self.unit.children(node) {
                    self.visit(child);
                }
            }
        }
    }

    fn reset_if_reassigned(&mut self, target: NodeId) {
        if self.unit.kind(target) != NodeKind::Identifier {
            return;
        }
        let Some(record) = tracked_record(self.unit, target) else {
            return;
        };
        if let Some(state) = self.states.get_mut(&record) {
            trace!("{} reassigned, load state reset", self.unit.symbol(record).name);
            *state = LoadState::NotLoaded;
        }
    }

    fn on_call(&mut self, invocation: NodeId) {
        let Some((record, method)) = call_record(self.unit, self.body, invocation) else {
            return;
        };
        let state = self.states.entry(record).or_insert(LoadState::NotLoaded);

        if is_one_of(&method, LOAD_FIELD_SETTERS) {
            *state = LoadState::Loaded;
        } else if is_one_of(&method, LOAD_FIELD_CLEARERS) {
            *state = LoadState::NotLoaded;
        } else if is_one_of(&method, FETCH_METHODS)
            && *state == LoadState::NotLoaded
            && !self.exempt.contains(&record)
        {
            self.findings.push(Finding {
                call: invocation,
                record,
                method,
            });
        }
    }
}
