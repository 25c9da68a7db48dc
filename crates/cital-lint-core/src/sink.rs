//! Diagnostic sink.

use crate::model::{NodeId, Span};

/// Where a diagnostic points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLocation {
    /// A source span.
    Span(Span),
    /// Zero-length file-level marker.
    File,
}

/// Raw diagnostic emitted by a rule, before formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Code of the emitting rule.
    pub rule_id: &'static str,
    /// Location of the finding.
    pub location: DiagnosticLocation,
    /// Message template arguments.
    pub args: Vec<String>,
    /// Node the diagnostic is anchored to, used for allow directives.
    pub node: Option<NodeId>,
}

/// Receives diagnostics from rules.
///
/// The sink does not deduplicate; rules avoid double reporting themselves.
pub trait DiagnosticSink {
    /// Accepts one diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Sink that keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics collected so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes the sink.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}
