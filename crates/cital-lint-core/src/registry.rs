//! Rule registry and dispatcher.
//!
//! The registry maps node and symbol kinds to the rules interested in them
//! and drives a single pass over a [`CompilationUnit`]. It owns no analysis
//! state: everything a rule computes lives on that rule's call stack.

use crate::context::{CancellationToken, NodeContext, SymbolContext};
use crate::descriptor::RULE_FAULT;
use crate::model::{CompilationUnit, NodeId, NodeKind, SymbolKind};
use crate::rule::{Interest, RuleBox, RuleError};
use crate::sink::{Diagnostic, DiagnosticLocation, DiagnosticSink};
use std::any::Any;
use std::collections::HashMap;
use std::path::Path;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Returned when a run stops because cancellation was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("analysis cancelled")]
pub struct Cancelled;

/// Registered rules, indexed by the kinds they observe.
#[derive(Default)]
pub struct Registry {
    rules: Vec<RuleBox>,
    by_node: HashMap<NodeKind, Vec<usize>>,
    by_symbol: HashMap<SymbolKind, Vec<usize>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule for every kind in its interests.
    pub fn register(&mut self, rule: RuleBox) {
        let index = self.rules.len();
        for interest in rule.interests() {
            let slot = match *interest {
                Interest::Node(kind) => self.by_node.entry(kind).or_default(),
                Interest::Symbol(kind) => self.by_symbol.entry(kind).or_default(),
            };
            // A rule listing the same kind twice still runs once per node.
            if !slot.contains(&index) {
                slot.push(index);
            }
        }
        debug!("Registered rule {} ({})", rule.code(), rule.name());
        self.rules.push(rule);
    }

    /// Registered rules in registration order.
    #[must_use]
    pub fn rules(&self) -> &[RuleBox] {
        &self.rules
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn node_handlers(&self, kind: NodeKind) -> &[usize] {
        self.by_node.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    fn symbol_handlers(&self, kind: SymbolKind) -> &[usize] {
        self.by_symbol.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Runs every registered rule over `unit`.
    ///
    /// Nodes are visited in pre-order, then symbols in declaration order.
    /// A rule that returns an error or panics produces a rule-fault
    /// diagnostic; the remaining rules and nodes are still processed.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the token is cancelled; the token is checked
    /// before each top-level node and before the symbol pass.
    pub fn run(
        &self,
        unit: &CompilationUnit,
        sink: &mut dyn DiagnosticSink,
        cancellation: &CancellationToken,
    ) -> Result<(), Cancelled> {
        self.run_in(Path::new(""), unit, sink, cancellation)
    }

    /// Like [`Registry::run`], resolving relative source paths against `source_root`.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the token is cancelled.
    pub fn run_in(
        &self,
        source_root: &Path,
        unit: &CompilationUnit,
        sink: &mut dyn DiagnosticSink,
        cancellation: &CancellationToken,
    ) -> Result<(), Cancelled> {
        let root = unit.root();
        if cancellation.is_cancelled() {
            return Err(Cancelled);
        }

        for node in unit.walk() {
            if unit.parent(node) == Some(root) && cancellation.is_cancelled() {
                return Err(Cancelled);
            }
            for &index in self.node_handlers(unit.kind(node)) {
                let rule = &self.rules[index];
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    let mut ctx = NodeContext::new(
                        unit,
                        node,
                        rule.descriptor(),
                        source_root,
                        sink,
                        cancellation,
                    );
                    rule.check_node(&mut ctx)
                }));
                if let Some(reason) = fault_reason(outcome) {
                    report_fault(unit, sink, rule.code(), Some(node), reason);
                }
            }
        }

        if cancellation.is_cancelled() {
            return Err(Cancelled);
        }

        for (symbol, data) in unit.symbols() {
            for &index in self.symbol_handlers(data.kind) {
                let rule = &self.rules[index];
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    let mut ctx = SymbolContext::new(
                        unit,
                        symbol,
                        rule.descriptor(),
                        source_root,
                        sink,
                        cancellation,
                    );
                    rule.check_symbol(&mut ctx)
                }));
                if let Some(reason) = fault_reason(outcome) {
                    report_fault(unit, sink, rule.code(), data.declaration, reason);
                }
            }
        }

        Ok(())
    }
}

fn fault_reason(outcome: Result<Result<(), RuleError>, Box<dyn Any + Send>>) -> Option<String> {
    match outcome {
        Ok(Ok(())) => None,
        Ok(Err(err)) => Some(err.to_string()),
        Err(payload) => Some(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

fn report_fault(
    unit: &CompilationUnit,
    sink: &mut dyn DiagnosticSink,
    code: &str,
    node: Option<NodeId>,
    reason: String,
) {
    warn!(
        "Rule {code} failed on {}: {reason}",
        unit.file_path().display()
    );
    let location = node.map_or(DiagnosticLocation::File, |n| {
        DiagnosticLocation::Span(unit.node(n).span)
    });
    sink.report(Diagnostic {
        rule_id: RULE_FAULT.id,
        location,
        args: vec![code.to_string(), reason],
        node,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::RuleDescriptor;
    use crate::model::{ObjectKind, Symbol, UnitBuilder};
    use crate::rule::Rule;
    use crate::sink::CollectingSink;
    use crate::types::Severity;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    static COUNTER: RuleDescriptor = RuleDescriptor {
        id: "TEST001",
        name: "counter",
        title: "Counts visits",
        message_format: "visited {0}",
        category: "Test",
        default_severity: Severity::Info,
        enabled_by_default: true,
    };

    static BROKEN: RuleDescriptor = RuleDescriptor {
        id: "TEST002",
        name: "broken",
        title: "Always fails",
        message_format: "never",
        category: "Test",
        default_severity: Severity::Error,
        enabled_by_default: true,
    };

    struct Counter(Arc<AtomicUsize>);

    impl Rule for Counter {
        fn descriptor(&self) -> &'static RuleDescriptor {
            &COUNTER
        }

        fn interests(&self) -> &'static [Interest] {
            &[
                Interest::Node(NodeKind::Exit),
                Interest::Node(NodeKind::Exit),
                Interest::Symbol(SymbolKind::GlobalVariable),
            ]
        }

        fn check_node(&self, ctx: &mut NodeContext<'_>) -> Result<(), RuleError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            ctx.report_at(ctx.node, vec!["node".to_string()]);
            Ok(())
        }

        fn check_symbol(&self, ctx: &mut SymbolContext<'_>) -> Result<(), RuleError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            ctx.report_symbol(vec!["symbol".to_string()]);
            Ok(())
        }
    }

    struct Broken {
        panic: bool,
    }

    impl Rule for Broken {
        fn descriptor(&self) -> &'static RuleDescriptor {
            &BROKEN
        }

        fn interests(&self) -> &'static [Interest] {
            &[Interest::Node(NodeKind::Exit)]
        }

        fn check_node(&self, _ctx: &mut NodeContext<'_>) -> Result<(), RuleError> {
            if self.panic {
                panic!("boom");
            }
            Err(RuleError::Shape("exit without parent".to_string()))
        }
    }

    fn unit() -> CompilationUnit {
        let mut b = UnitBuilder::new("a.al");
        let root = b.root();
        let obj = b.add(root, NodeKind::Object(ObjectKind::Codeunit));
        let proc = b.add_text(obj, NodeKind::Procedure, "P");
        let body = b.add(proc, NodeKind::Block);
        b.add(body, NodeKind::Exit);
        b.add(body, NodeKind::Exit);
        b.symbol(Symbol::new("G", SymbolKind::GlobalVariable));
        b.build().unwrap()
    }

    #[test]
    fn dispatches_each_match_once() {
        let visits = Arc::new(AtomicUsize::new(0));
        let mut registry = Registry::new();
        registry.register(Box::new(Counter(Arc::clone(&visits))));

        let mut sink = CollectingSink::new();
        registry
            .run(&unit(), &mut sink, &CancellationToken::new())
            .unwrap();

        assert_eq!(visits.load(Ordering::SeqCst), 3);
        let diags = sink.into_diagnostics();
        assert_eq!(diags.len(), 3);
        assert_eq!(diags[2].location, DiagnosticLocation::File);
    }

    #[test]
    fn faults_are_isolated() {
        let visits = Arc::new(AtomicUsize::new(0));
        let mut registry = Registry::new();
        registry.register(Box::new(Broken { panic: false }));
        registry.register(Box::new(Counter(Arc::clone(&visits))));

        let mut sink = CollectingSink::new();
        registry
            .run(&unit(), &mut sink, &CancellationToken::new())
            .unwrap();

        let diags = sink.into_diagnostics();
        let faults: Vec<_> = diags.iter().filter(|d| d.rule_id == "CIG9999").collect();
        assert_eq!(faults.len(), 2);
        assert_eq!(faults[0].args[0], "TEST002");
        assert!(faults[0].args[1].contains("exit without parent"));
        assert_eq!(visits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn panics_become_faults() {
        let mut registry = Registry::new();
        registry.register(Box::new(Broken { panic: true }));

        let mut sink = CollectingSink::new();
        registry
            .run(&unit(), &mut sink, &CancellationToken::new())
            .unwrap();

        let diags = sink.into_diagnostics();
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].args, vec!["TEST002".to_string(), "boom".to_string()]);
    }

    #[test]
    fn cancelled_run_stops() {
        let mut registry = Registry::new();
        registry.register(Box::new(Counter(Arc::new(AtomicUsize::new(0)))));
        let token = CancellationToken::new();
        token.cancel();

        let mut sink = CollectingSink::new();
        assert_eq!(registry.run(&unit(), &mut sink, &token), Err(Cancelled));
        assert!(sink.diagnostics().is_empty());
    }
}
