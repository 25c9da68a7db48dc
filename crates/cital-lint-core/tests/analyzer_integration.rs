//! Integration tests for model discovery and the analysis pipeline.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use cital_lint_core::{
    Analyzer, AnalyzerError, CancellationToken, CompilationUnit, Config, Interest, NodeContext,
    NodeKind, ObjectKind, Rule, RuleDescriptor, RuleError, Severity, UnitBuilder,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

static NO_EXIT: RuleDescriptor = RuleDescriptor {
    id: "TEST0001",
    name: "no-exit",
    title: "Avoid exit statements",
    message_format: "Exit in '{0}'",
    category: "Design",
    default_severity: Severity::Warning,
    enabled_by_default: true,
};

struct NoExit;

impl Rule for NoExit {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &NO_EXIT
    }

    fn interests(&self) -> &'static [Interest] {
        &[Interest::Node(NodeKind::Exit)]
    }

    fn check_node(&self, ctx: &mut NodeContext<'_>) -> Result<(), RuleError> {
        let procedure = ctx
            .unit
            .first_ancestor_or_self(ctx.node, NodeKind::Procedure)
            .ok_or_else(|| RuleError::Shape("exit outside procedure".to_string()))?;
        let name = ctx.unit.node(procedure).text().to_string();
        ctx.report_at(ctx.node, vec![name]);
        Ok(())
    }
}

fn unit_with_exits(path: &str, allow: bool) -> CompilationUnit {
    let mut b = UnitBuilder::new(path);
    let root = b.root();
    let obj = b.add(root, NodeKind::Object(ObjectKind::Codeunit));
    for name in ["First", "Second"] {
        let proc = b.add_text(obj, NodeKind::Procedure, name);
        let body = b.add(proc, NodeKind::Block);
        b.add(body, NodeKind::Exit);
        if allow && name == "Second" {
            b.comment(proc, "// cital-lint: allow(no-exit) reason=\"early return\"");
        }
    }
    b.build().unwrap()
}

fn write_model(dir: &Path, relative: &str, unit: &CompilationUnit) {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, unit.to_json().unwrap()).unwrap();
}

#[test]
fn analyze_unit_formats_and_orders_violations() {
    let analyzer = Analyzer::builder().root(".").rule(NoExit).build().unwrap();
    let violations = analyzer
        .analyze_unit(&unit_with_exits("App/Foo.al", false))
        .unwrap();

    let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
    assert_eq!(messages, vec!["Exit in 'First'", "Exit in 'Second'"]);
    assert_eq!(violations[0].code, "TEST0001");
    assert_eq!(violations[0].severity, Severity::Warning);
    assert_eq!(violations[0].help.as_deref(), Some("Avoid exit statements"));
}

#[test]
fn allow_directive_drops_violation() {
    let analyzer = Analyzer::builder().root(".").rule(NoExit).build().unwrap();
    let violations = analyzer
        .analyze_unit(&unit_with_exits("App/Foo.al", true))
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].message, "Exit in 'First'");
}

#[test]
fn config_overrides_severity_and_disables() {
    let config = Config::parse("[rules.TEST0001]\nseverity = \"error\"\n").unwrap();
    let analyzer = Analyzer::builder()
        .root(".")
        .config(config)
        .rule(NoExit)
        .build()
        .unwrap();
    let violations = analyzer
        .analyze_unit(&unit_with_exits("App/Foo.al", false))
        .unwrap();
    assert!(violations.iter().all(|v| v.severity == Severity::Error));

    let config = Config::parse("[rules.no-exit]\nenabled = false\n").unwrap();
    let analyzer = Analyzer::builder()
        .root(".")
        .config(config)
        .rule(NoExit)
        .build()
        .unwrap();
    assert_eq!(analyzer.rule_count(), 0);
}

#[test]
fn analyze_discovers_models_and_skips_broken_files() {
    let dir = TempDir::new().unwrap();
    write_model(dir.path(), "b/Bar.model.json", &unit_with_exits("App/Bar.al", false));
    write_model(dir.path(), "a/Foo.model.json", &unit_with_exits("App/Foo.al", false));
    write_model(
        dir.path(),
        ".alpackages/Dep.model.json",
        &unit_with_exits("Dep.al", false),
    );
    fs::write(dir.path().join("broken.model.json"), "{ not json").unwrap();
    fs::write(dir.path().join("notes.json"), "{}").unwrap();

    let analyzer = Analyzer::builder()
        .root(dir.path())
        .rule(NoExit)
        .build()
        .unwrap();
    let result = analyzer.analyze().unwrap();

    assert_eq!(result.files_checked, 2);
    assert_eq!(result.violations.len(), 4);
    assert!(result.violations[0].location.file.ends_with("Bar.al"));

    let strict = Analyzer::builder()
        .root(dir.path())
        .rule(NoExit)
        .fail_on_load_error(true)
        .build()
        .unwrap();
    assert!(matches!(strict.analyze(), Err(AnalyzerError::Model { .. })));
}

#[test]
fn repeated_runs_are_identical() {
    let analyzer = Analyzer::builder().root(".").rule(NoExit).build().unwrap();
    let unit = unit_with_exits("App/Foo.al", false);
    let first = analyzer.analyze_unit(&unit).unwrap();
    let second = analyzer.analyze_unit(&unit).unwrap();
    assert_eq!(first, second);
}

#[test]
fn cancelled_analysis_returns_error() {
    let token = CancellationToken::new();
    let analyzer = Analyzer::builder()
        .root(".")
        .rule(NoExit)
        .cancellation(token.clone())
        .build()
        .unwrap();
    token.cancel();
    let result = analyzer.analyze_unit(&unit_with_exits("App/Foo.al", false));
    assert!(matches!(result, Err(AnalyzerError::Cancelled)));
}
