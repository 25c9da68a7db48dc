//! Context types for rule execution.

use crate::descriptor::RuleDescriptor;
use crate::model::{CompilationUnit, NodeId, SymbolId};
use crate::sink::{Diagnostic, DiagnosticLocation, DiagnosticSink};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation signal shared between the host and the engine.
///
/// The dispatcher checks it between top-level nodes; long-running rules may
/// poll it through their context.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Context handed to [`Rule::check_node`](crate::Rule::check_node).
pub struct NodeContext<'a> {
    /// Unit being analyzed.
    pub unit: &'a CompilationUnit,
    /// Node that triggered the handler.
    pub node: NodeId,
    descriptor: &'static RuleDescriptor,
    root: &'a Path,
    sink: &'a mut dyn DiagnosticSink,
    cancellation: &'a CancellationToken,
}

impl<'a> NodeContext<'a> {
    /// Creates a context for one handler invocation.
    pub fn new(
        unit: &'a CompilationUnit,
        node: NodeId,
        descriptor: &'static RuleDescriptor,
        root: &'a Path,
        sink: &'a mut dyn DiagnosticSink,
        cancellation: &'a CancellationToken,
    ) -> Self {
        Self {
            unit,
            node,
            descriptor,
            root,
            sink,
            cancellation,
        }
    }

    /// Descriptor of the rule being run.
    #[must_use]
    pub fn descriptor(&self) -> &'static RuleDescriptor {
        self.descriptor
    }

    /// Returns true once the host asked to stop.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Location of the unit's source file on disk.
    ///
    /// Relative model paths are taken relative to the analyzer root.
    #[must_use]
    pub fn source_path(&self) -> PathBuf {
        self.root.join(self.unit.file_path())
    }

    /// Reports a diagnostic at the span of `node`.
    pub fn report_at(&mut self, node: NodeId, args: Vec<String>) {
        let span = self.unit.node(node).span;
        emit(
            self.sink,
            self.descriptor,
            DiagnosticLocation::Span(span),
            Some(node),
            args,
        );
    }

    /// Reports a zero-length file-level diagnostic anchored to the current node.
    pub fn report_file_level(&mut self, args: Vec<String>) {
        emit(
            self.sink,
            self.descriptor,
            DiagnosticLocation::File,
            Some(self.node),
            args,
        );
    }
}

/// Context handed to [`Rule::check_symbol`](crate::Rule::check_symbol).
pub struct SymbolContext<'a> {
    /// Unit being analyzed.
    pub unit: &'a CompilationUnit,
    /// Symbol that triggered the handler.
    pub symbol: SymbolId,
    descriptor: &'static RuleDescriptor,
    root: &'a Path,
    sink: &'a mut dyn DiagnosticSink,
    cancellation: &'a CancellationToken,
}

impl<'a> SymbolContext<'a> {
    /// Creates a context for one handler invocation.
    pub fn new(
        unit: &'a CompilationUnit,
        symbol: SymbolId,
        descriptor: &'static RuleDescriptor,
        root: &'a Path,
        sink: &'a mut dyn DiagnosticSink,
        cancellation: &'a CancellationToken,
    ) -> Self {
        Self {
            unit,
            symbol,
            descriptor,
            root,
            sink,
            cancellation,
        }
    }

    /// Descriptor of the rule being run.
    #[must_use]
    pub fn descriptor(&self) -> &'static RuleDescriptor {
        self.descriptor
    }

    /// Returns true once the host asked to stop.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Location of the unit's source file on disk.
    ///
    /// Relative model paths are taken relative to the analyzer root.
    #[must_use]
    pub fn source_path(&self) -> PathBuf {
        self.root.join(self.unit.file_path())
    }

    /// Reports a diagnostic at the span of `node`.
    pub fn report_at(&mut self, node: NodeId, args: Vec<String>) {
        let span = self.unit.node(node).span;
        emit(
            self.sink,
            self.descriptor,
            DiagnosticLocation::Span(span),
            Some(node),
            args,
        );
    }

    /// Reports at the symbol's declaration, or file-level when it has none.
    pub fn report_symbol(&mut self, args: Vec<String>) {
        match self.unit.symbol(self.symbol).declaration {
            Some(node) => self.report_at(node, args),
            None => emit(
                self.sink,
                self.descriptor,
                DiagnosticLocation::File,
                None,
                args,
            ),
        }
    }
}

fn emit(
    sink: &mut dyn DiagnosticSink,
    descriptor: &'static RuleDescriptor,
    location: DiagnosticLocation,
    node: Option<NodeId>,
    args: Vec<String>,
) {
    sink.report(Diagnostic {
        rule_id: descriptor.id,
        location,
        args,
        node,
    });
}
