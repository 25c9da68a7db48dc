//! # cital-lint-core
//!
//! Core framework for linting AL business applications from a program
//! model (syntax tree plus resolved symbols) produced by the compiler.
//!
//! This crate provides the foundational traits and types for building
//! convention checks. It includes:
//!
//! - [`CompilationUnit`] and [`UnitBuilder`], the read-only program model
//! - [`Rule`] trait for rules that observe node and symbol kinds
//! - [`Registry`], the dispatcher that fans a unit out to rules
//! - [`Analyzer`] for orchestrating lint execution over a directory
//! - [`Violation`] for representing lint findings
//!
//! ## Example
//!
//! ```ignore
//! use cital_lint_core::Analyzer;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./build/models")
//!     .rule(SetLoadFields::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! result.print_report();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod descriptor;
pub mod model;
mod registry;
mod rule;
mod sink;
mod types;

/// Utility modules for rule implementations.
pub mod utils;

pub use analyzer::{load_unit, Analyzer, AnalyzerBuilder, AnalyzerError, MODEL_FILE_SUFFIX};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig};
pub use context::{CancellationToken, NodeContext, SymbolContext};
pub use descriptor::{RuleDescriptor, RULE_FAULT};
pub use model::{
    CompilationUnit, ModelError, NodeId, NodeKind, ObjectKind, Span, Symbol, SymbolId,
    SymbolKind, SyntaxNode, TypeDescriptor, TypeKind, UnitBuilder,
};
pub use registry::{Cancelled, Registry};
pub use rule::{Interest, Rule, RuleBox, RuleError};
pub use sink::{CollectingSink, Diagnostic, DiagnosticLocation, DiagnosticSink};
pub use types::{
    sort_violations, LintResult, Location, Severity, Violation, ViolationDiagnostic,
};
pub use utils::allowance::AllowCheck;
