//! Rule requiring captions on table fields.
//!
//! # Rationale
//!
//! Fields without a caption show their technical name on every page that
//! lists them, and that name is never translated.
//!
//! # Detected Patterns
//!
//! A field of a table with none of `Caption`, `CaptionClass` or `CaptionML`.
//! Fields with `ShowCaption = false` and obsolete fields are skipped.
//!
//! # Suppression
//!
//! - `// cital-lint: allow(missing-caption)` comment on the field

use crate::catalog::MISSING_CAPTION;
use crate::semantics::is_obsolete;
use cital_lint_core::{
    Interest, ObjectKind, Rule, RuleDescriptor, RuleError, SymbolContext, SymbolKind,
};

/// Rule code for missing-caption.
pub const CODE: &str = "CIG0002";

/// Rule name for missing-caption.
pub const NAME: &str = "missing-caption";

const CAPTION_PROPERTIES: &[&str] = &["Caption", "CaptionClass", "CaptionML"];

/// Requires a caption on every table field.
#[derive(Debug, Clone, Default)]
pub struct MissingCaption;

impl MissingCaption {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for MissingCaption {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &MISSING_CAPTION
    }

    fn interests(&self) -> &'static [Interest] {
        &[Interest::Symbol(SymbolKind::Field)]
    }

    fn check_symbol(&self, ctx: &mut SymbolContext<'_>) -> Result<(), RuleError> {
        let field = ctx.unit.symbol(ctx.symbol);
        let in_table = field
            .container
            .is_some_and(|c| ctx.unit.symbol(c).kind == SymbolKind::Object(ObjectKind::Table));
        if !in_table || is_obsolete(field) {
            return Ok(());
        }

        if field
            .property("ShowCaption")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("false"))
        {
            return Ok(());
        }
        if CAPTION_PROPERTIES.iter().any(|p| field.property(p).is_some()) {
            return Ok(());
        }

        let name = field.name.clone();
        ctx.report_symbol(vec![name]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::check;
    use cital_lint_core::{NodeKind, Symbol, UnitBuilder, Violation};

    fn check_fields(kind: ObjectKind, fields: Vec<Symbol>) -> Vec<Violation> {
        let mut b = UnitBuilder::new("App/Sales/Table/Customer.al");
        let root = b.root();
        let object = b.add(root, NodeKind::Object(kind));
        let table = b.symbol(Symbol::new("Customer", SymbolKind::Object(kind)));
        b.declare(object, table);
        for field in fields {
            let node = b.add_text(object, NodeKind::Field, field.name.clone());
            let id = b.symbol(field.in_container(table));
            b.declare(node, id);
        }
        check(MissingCaption::new(), &b.build().unwrap())
    }

    #[test]
    fn test_detects_field_without_caption() {
        let violations = check_fields(
            ObjectKind::Table,
            vec![Symbol::new("No.", SymbolKind::Field)],
        );
        assert_eq!(violations.len(), 1);
        insta::assert_snapshot!(violations[0].message, @"Field 'No.' has no Caption");
    }

    #[test]
    fn test_any_caption_property_is_enough() {
        let violations = check_fields(
            ObjectKind::Table,
            vec![
                Symbol::new("A", SymbolKind::Field).with_property("Caption", "A"),
                Symbol::new("B", SymbolKind::Field).with_property("captionclass", "'3,X'"),
                Symbol::new("C", SymbolKind::Field).with_property("CaptionML", "ENU=C"),
            ],
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_show_caption_false_and_obsolete_are_skipped() {
        let violations = check_fields(
            ObjectKind::Table,
            vec![
                Symbol::new("Hidden", SymbolKind::Field).with_property("ShowCaption", "false"),
                Symbol::new("Old", SymbolKind::Field).with_property("ObsoleteState", "Removed"),
                Symbol::new("Shown", SymbolKind::Field).with_property("ShowCaption", "true"),
            ],
        );
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("'Shown'"));
    }

    #[test]
    fn test_table_extension_fields_are_ignored() {
        let violations = check_fields(
            ObjectKind::TableExtension,
            vec![Symbol::new("Ext", SymbolKind::Field)],
        );
        assert!(violations.is_empty());
    }
}
