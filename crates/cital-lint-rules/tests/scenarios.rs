//! End-to-end runs of the built-in rules over model files on disk.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use cital_lint_core::{
    Analyzer, CompilationUnit, Config, NodeId, NodeKind, ObjectKind, Symbol, SymbolId, SymbolKind,
    TypeDescriptor, UnitBuilder,
};
use cital_lint_rules::{all_rules, rules_from_config, ProjectStructure, SetLoadFields};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn fetch(b: &mut UnitBuilder, parent: NodeId, record: SymbolId, method: &str) {
    let method = b.symbol(Symbol::builtin_method(method));
    let stmt = b.add(parent, NodeKind::ExpressionStatement);
    let call = b.add(stmt, NodeKind::Invocation);
    let access = b.add(call, NodeKind::MemberAccess);
    b.identifier(access, record);
    b.identifier(access, method);
}

/// `codeunit Foo` in `namespace`, whose procedure calls `Customer.Get()`.
fn codeunit(path: &Path, namespace: &str, fields_read: usize) -> CompilationUnit {
    let mut b = UnitBuilder::new(path);
    let root = b.root();
    b.add_text(root, NodeKind::Namespace, namespace);
    let object = b.add_text(root, NodeKind::Object(ObjectKind::Codeunit), "Foo");
    let procedure = b.add_text(object, NodeKind::Procedure, "Run");
    let body = b.add(procedure, NodeKind::Block);
    let customer = b.symbol(
        Symbol::new("Customer", SymbolKind::LocalVariable)
            .with_type(TypeDescriptor::record("Customer")),
    );
    fetch(&mut b, body, customer, "Get");
    for i in 0..fields_read {
        let field = b.symbol(Symbol::new(format!("Field{i}"), SymbolKind::Field));
        let access = b.add(body, NodeKind::MemberAccess);
        b.identifier(access, customer);
        b.identifier(access, field);
    }
    b.build().unwrap()
}

fn write_model(unit: &CompilationUnit, model_dir: &Path, name: &str) {
    fs::create_dir_all(model_dir).unwrap();
    fs::write(model_dir.join(name), unit.to_json().unwrap()).unwrap();
}

fn write_settings(project: &Path) {
    let settings = project.join(".AL-Go/settings.json");
    fs::create_dir_all(settings.parent().unwrap()).unwrap();
    fs::write(
        settings,
        r#"{ "type": "PTE", "appSourceCopMandatoryAffixes": ["CIG ProjectX"] }"#,
    )
    .unwrap();
}

#[test]
fn well_placed_file_only_reports_missing_set_load_fields() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("ProjectX");
    write_settings(&project);
    let source = project.join("App/Sales/Invoicing/Codeunit/Foo.al");
    let unit = codeunit(&source, "CIG.ProjectX.Sales.Invoicing", 0);
    write_model(&unit, &dir.path().join("models"), "Foo.model.json");

    let mut builder = Analyzer::builder().root(dir.path());
    for rule in all_rules() {
        builder = builder.rule_box(rule);
    }
    let result = builder.build().unwrap().analyze().unwrap();

    assert_eq!(result.files_checked, 1);
    let codes: Vec<_> = result.violations.iter().map(|v| v.code.as_str()).collect();
    assert_eq!(codes, vec!["CIG0011"]);
}

#[test]
fn moved_file_reports_one_structure_violation() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("ProjectX");
    write_settings(&project);
    let source = project.join("App/Codeunit/Foo.al");
    let unit = codeunit(&source, "CIG.ProjectX.Sales.Invoicing", 0);

    let analyzer = Analyzer::builder()
        .root(dir.path())
        .rule(ProjectStructure::new())
        .build()
        .unwrap();
    let violations = analyzer.analyze_unit(&unit).unwrap();

    assert_eq!(violations.len(), 1);
    assert!(violations[0].location.is_file_level());
    assert_eq!(
        violations[0].message,
        "Codeunit 'Foo.al' is not in the expected folder structure. \
         Expected: 'ProjectX/App/Sales/Invoicing/.../Codeunit/', actual: 'ProjectX/App/Codeunit/Foo.al'"
    );
}

#[test]
fn relative_model_paths_resolve_settings_under_root() {
    let dir = TempDir::new().unwrap();
    write_settings(&dir.path().join("ProjectX"));
    let unit = codeunit(Path::new("ProjectX/App/Codeunit/Foo.al"), "CIG.Other.Sales", 0);

    let analyzer = Analyzer::builder()
        .root(dir.path())
        .rule(ProjectStructure::new())
        .build()
        .unwrap();
    let violations = analyzer.analyze_unit(&unit).unwrap();

    assert_eq!(violations.len(), 1);
    assert!(violations[0]
        .message
        .contains("Expected: 'ProjectX/App/Sales/.../Codeunit/'"));
}

#[test]
fn config_applies_rule_options() {
    let unit = codeunit(Path::new("ProjectX/App/Sales/Codeunit/Foo.al"), "CIG.ProjectX.Sales", 4);

    let run = |toml: &str| {
        let config = Config::parse(toml).unwrap();
        let mut builder = Analyzer::builder().root(".").config(config.clone());
        for rule in rules_from_config(&config).unwrap() {
            builder = builder.rule_box(rule);
        }
        builder.build().unwrap().analyze_unit(&unit).unwrap()
    };

    let default = run("preset = \"minimal\"\n");
    assert!(default.iter().any(|v| v.code == "CIG0011"));

    let relaxed = run("preset = \"minimal\"\n[rules.set-load-fields]\nfield_threshold = 3\n");
    assert!(relaxed.iter().all(|v| v.code != "CIG0011"));

    let contoso = run("preset = \"minimal\"\n[rules.CIG0000]\norganization = \"Contoso\"\n");
    assert!(contoso.iter().any(|v| v.code == "CIG0000"));
}

#[test]
fn repeated_runs_produce_identical_results() {
    let dir = TempDir::new().unwrap();
    let models = dir.path().join("models");
    for name in ["A", "B", "C"] {
        let source = dir.path().join(format!("ProjectX/App/Codeunit/{name}.al"));
        let unit = codeunit(&source, "CIG.ProjectX.Sales", 0);
        write_model(&unit, &models, &format!("{name}.model.json"));
    }

    let analyze = || {
        let mut builder = Analyzer::builder().root(dir.path());
        for rule in all_rules() {
            builder = builder.rule_box(rule);
        }
        let result = builder.build().unwrap().analyze().unwrap();
        serde_json::to_string(&result).unwrap()
    };

    assert_eq!(analyze(), analyze());
}

#[test]
fn set_load_fields_rule_is_usable_without_presets() {
    let unit = codeunit(Path::new("Foo.al"), "CIG.ProjectX.Sales", 11);
    let analyzer = Analyzer::builder()
        .root(".")
        .rule(SetLoadFields::new())
        .build()
        .unwrap();
    assert!(analyzer.analyze_unit(&unit).unwrap().is_empty());
}
