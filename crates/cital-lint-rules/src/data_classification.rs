//! Rule flagging the redundant `DataClassification = CustomerContent`.
//!
//! # Rationale
//!
//! `CustomerContent` is the default classification. Outside AppSource apps
//! spelling it out on tables and fields only adds noise.
//!
//! # Detected Patterns
//!
//! `DataClassification = CustomerContent` on a table or a field. Projects
//! whose AL-Go settings declare `"type": "AppSource App"` are skipped, as
//! are obsolete tables and fields.
//!
//! # Suppression
//!
//! - `// cital-lint: allow(redundant-data-classification)` comment on the table or field

use crate::catalog::REDUNDANT_DATA_CLASSIFICATION;
use crate::semantics::is_obsolete;
use crate::settings::{FsSettingsLocator, SettingsSource};
use cital_lint_core::{
    Interest, NodeKind, ObjectKind, Rule, RuleDescriptor, RuleError, SymbolContext, SymbolKind,
};

/// Rule code for redundant-data-classification.
pub const CODE: &str = "CIG0003";

/// Rule name for redundant-data-classification.
pub const NAME: &str = "redundant-data-classification";

const PROPERTY: &str = "DataClassification";
const DEFAULT_VALUE: &str = "CustomerContent";

/// Flags `DataClassification = CustomerContent` outside AppSource apps.
pub struct RedundantDataClassification {
    settings: Box<dyn SettingsSource>,
}

impl Default for RedundantDataClassification {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RedundantDataClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedundantDataClassification").finish_non_exhaustive()
    }
}

impl RedundantDataClassification {
    /// Creates a new rule that reads settings from disk.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: Box::new(FsSettingsLocator::new()),
        }
    }

    /// Replaces the settings source.
    #[must_use]
    pub fn with_settings(mut self, settings: impl SettingsSource + 'static) -> Self {
        self.settings = Box::new(settings);
        self
    }
}

impl Rule for RedundantDataClassification {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &REDUNDANT_DATA_CLASSIFICATION
    }

    fn interests(&self) -> &'static [Interest] {
        &[
            Interest::Symbol(SymbolKind::Field),
            Interest::Symbol(SymbolKind::Object(ObjectKind::Table)),
        ]
    }

    fn check_symbol(&self, ctx: &mut SymbolContext<'_>) -> Result<(), RuleError> {
        let unit = ctx.unit;
        let symbol = unit.symbol(ctx.symbol);
        if is_obsolete(symbol) {
            return Ok(());
        }
        let is_default = symbol
            .property(PROPERTY)
            .is_some_and(|v| v.trim() == DEFAULT_VALUE);
        if !is_default {
            return Ok(());
        }
        if self
            .settings
            .settings_for(&ctx.source_path())
            .is_some_and(|s| s.is_app_source())
        {
            return Ok(());
        }

        let property_node = symbol.declaration.and_then(|decl| {
            unit.children(decl).iter().copied().find(|&c| {
                unit.kind(c) == NodeKind::Property && unit.node(c).text_is(PROPERTY)
            })
        });
        let args = vec![symbol.name.clone()];
        match property_node {
            Some(node) => ctx.report_at(node, args),
            None => ctx.report_symbol(args),
        }
        Ok(())
    }
}
