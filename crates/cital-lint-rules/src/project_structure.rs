//! Rule checking that source files sit where their namespace and kind say.
//!
//! # Rationale
//!
//! Projects follow one layout so that objects can be found without search:
//!
//! ```text
//! <Project>/App/<Area>/<Feature>/.../<KindFolder>/<File>.al
//! <Project>/Test/<Area>/.../<KindFolder>/<File>.al
//! ```
//!
//! The namespace `CIG.<Project>.<Area>.<Feature>` names the same folders.
//! `<Project>` comes from the `appSourceCopMandatoryAffixes` entry
//! `"CIG <Project>"` in the AL-Go settings.
//!
//! # Detected Patterns
//!
//! - The file's parent folder is not the kind folder (`Codeunit`, `Page`,
//!   `TableExt`, ...). Codeunits with an `[EventSubscriber]` belong in `EventSub`.
//! - No area folder between `App`/`Test` and the kind folder.
//! - The namespace area (or feature) folder is missing, or out of order.
//! - The namespace does not start with the organization, or names a
//!   different project than the settings.
//!
//! Files outside an `App` or `Test` folder, and tooling folders such as
//! `.alpackages` or `Translations`, are skipped. Every finding is a single
//! file-level diagnostic per object.
//!
//! # Configuration
//!
//! - `organization`: first namespace segment and affix prefix (default `CIG`)
//!
//! # Suppression
//!
//! - `// cital-lint: allow(project-structure)` comment on the object

use crate::catalog::PROJECT_STRUCTURE;
use crate::settings::{FsSettingsLocator, SettingsSource};
use cital_lint_core::utils::paths::{file_name, normalize_separators, position_ignore_case, segments};
use cital_lint_core::{
    CompilationUnit, Interest, NodeContext, NodeId, NodeKind, ObjectKind, Rule, RuleDescriptor,
    RuleError,
};
use tracing::debug;

/// Rule code for project-structure.
pub const CODE: &str = "CIG0000";

/// Rule name for project-structure.
pub const NAME: &str = "project-structure";

/// Default organization token.
pub const DEFAULT_ORGANIZATION: &str = "CIG";

/// Folder names that mark the root of application and test sources.
const ANCHORS: &[&str] = &["App", "Test"];

/// Tooling folders directly below the anchor that are never checked.
const INFRA_FOLDERS: &[&str] = &[".vscode", ".alpackages", ".altestrunner", ".snapshots", "Translations"];

const EVENT_SUBSCRIBER: &str = "eventsubscriber";

/// Checks the folder placement of every object against its kind and namespace.
pub struct ProjectStructure {
    organization: String,
    settings: Box<dyn SettingsSource>,
}

impl Default for ProjectStructure {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProjectStructure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectStructure")
            .field("organization", &self.organization)
            .finish_non_exhaustive()
    }
}

impl ProjectStructure {
    /// Creates a new rule that reads settings from disk.
    #[must_use]
    pub fn new() -> Self {
        Self {
            organization: DEFAULT_ORGANIZATION.to_string(),
            settings: Box::new(FsSettingsLocator::new()),
        }
    }

    /// Sets the organization token.
    #[must_use]
    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = organization.into();
        self
    }

    /// Replaces the settings source.
    #[must_use]
    pub fn with_settings(mut self, settings: impl SettingsSource + 'static) -> Self {
        self.settings = Box::new(settings);
        self
    }
}

/// Expected kind folder for an object, with accepted alternatives.
fn kind_folders(unit: &CompilationUnit, object: NodeId, kind: ObjectKind) -> Option<&'static [&'static str]> {
    let folders: &'static [&'static str] = match kind {
        ObjectKind::Codeunit if has_event_subscriber(unit, object) => &["EventSub"],
        ObjectKind::Codeunit => &["Codeunit"],
        ObjectKind::Table => &["Table"],
        ObjectKind::TableExtension => &["TableExt", "TableExtension"],
        ObjectKind::Page => &["Page"],
        ObjectKind::PageExtension => &["PageExt", "PageExtension"],
        ObjectKind::Report => &["Report"],
        ObjectKind::ReportExtension => &["ReportExtension", "ReportExt"],
        ObjectKind::Query => &["Query"],
        ObjectKind::XmlPort => &["XmlPort"],
        ObjectKind::ControlAddIn => &["ControlAddIn"],
        ObjectKind::Profile => &["Profile"],
        ObjectKind::ProfileExtension => &["ProfileExtension"],
        ObjectKind::PageCustomization => &["PageCustomization"],
        ObjectKind::Interface => &["Interface"],
        ObjectKind::Enum => &["Enum"],
        ObjectKind::EnumExtension => &["EnumExtension", "EnumExt"],
        ObjectKind::PermissionSet => return None,
    };
    Some(folders)
}

fn has_event_subscriber(unit: &CompilationUnit, object: NodeId) -> bool {
    unit.descendants(object).any(|n| {
        unit.kind(n) == NodeKind::Attribute
            && unit
                .node(n)
                .text()
                .to_ascii_lowercase()
                .contains(EVENT_SUBSCRIBER)
    })
}

/// Namespace segments of the unit, if it declares one.
fn namespace_segments(unit: &CompilationUnit) -> Vec<String> {
    unit.find_first(NodeKind::Namespace)
        .map(|ns| {
            unit.node(ns)
                .text()
                .split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl Rule for ProjectStructure {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &PROJECT_STRUCTURE
    }

    fn interests(&self) -> &'static [Interest] {
        &[
            Interest::Node(NodeKind::Object(ObjectKind::Codeunit)),
            Interest::Node(NodeKind::Object(ObjectKind::Table)),
            Interest::Node(NodeKind::Object(ObjectKind::TableExtension)),
            Interest::Node(NodeKind::Object(ObjectKind::Page)),
            Interest::Node(NodeKind::Object(ObjectKind::PageExtension)),
            Interest::Node(NodeKind::Object(ObjectKind::PageCustomization)),
            Interest::Node(NodeKind::Object(ObjectKind::Report)),
            Interest::Node(NodeKind::Object(ObjectKind::ReportExtension)),
            Interest::Node(NodeKind::Object(ObjectKind::Query)),
            Interest::Node(NodeKind::Object(ObjectKind::XmlPort)),
            Interest::Node(NodeKind::Object(ObjectKind::ControlAddIn)),
            Interest::Node(NodeKind::Object(ObjectKind::Profile)),
            Interest::Node(NodeKind::Object(ObjectKind::ProfileExtension)),
            Interest::Node(NodeKind::Object(ObjectKind::Interface)),
            Interest::Node(NodeKind::Object(ObjectKind::Enum)),
            Interest::Node(NodeKind::Object(ObjectKind::EnumExtension)),
        ]
    }

    fn check_node(&self, ctx: &mut NodeContext<'_>) -> Result<(), RuleError> {
        let unit = ctx.unit;
        let kind = unit
            .kind(ctx.node)
            .object_kind()
            .ok_or_else(|| RuleError::Shape("object node without object kind".to_string()))?;

        let path = normalize_separators(unit.file_path());
        let all = segments(&path);
        let Some(anchor) = all
            .iter()
            .position(|s| ANCHORS.iter().any(|a| s.eq_ignore_ascii_case(a)))
        else {
            return Ok(());
        };
        let parts = &all[anchor + 1..];
        if parts
            .first()
            .is_some_and(|first| INFRA_FOLDERS.iter().any(|f| first.eq_ignore_ascii_case(f)))
        {
            debug!("Skipping tooling path {path}");
            return Ok(());
        }
        if parts.len() < 2 {
            return Ok(());
        }
        let Some(folders) = kind_folders(unit, ctx.node, kind) else {
            return Ok(());
        };

        // Parent folder index within `parts`; everything before it is area/feature.
        let parent_index = parts.len() - 2;
        let parent_is_kind = folders
            .iter()
            .any(|f| parts[parent_index].eq_ignore_ascii_case(f));
        let has_area = parent_index >= 1;

        let namespace = namespace_segments(unit);
        let area = namespace.get(2).map(String::as_str);
        let feature = namespace.get(3).map(String::as_str);

        let mut area_matches = true;
        let mut feature_matches = true;
        if let Some(area) = area {
            let area_index = position_ignore_case(parts, area, 0, parent_index);
            area_matches = area_index.is_some();
            if let Some(feature) = feature {
                let start = area_index.map_or(0, |i| i + 1);
                feature_matches = position_ignore_case(parts, feature, start, parent_index).is_some();
            }
        }

        let settings = self.settings.settings_for(&ctx.source_path());
        let project = settings
            .as_ref()
            .and_then(|s| s.project_name(&self.organization));

        let organization_matches = namespace
            .first()
            .map_or(true, |org| org.eq_ignore_ascii_case(&self.organization));
        let project_matches = match (namespace.get(1), project) {
            (Some(declared), Some(expected)) => declared.eq_ignore_ascii_case(expected),
            _ => true,
        };

        if parent_is_kind
            && has_area
            && area_matches
            && feature_matches
            && organization_matches
            && project_matches
        {
            return Ok(());
        }

        let anchor_name = all[anchor];
        let expected = match (area, feature) {
            (Some(area), Some(feature)) => format!("{anchor_name}/{area}/{feature}/.../{}/", folders[0]),
            (Some(area), None) => format!("{anchor_name}/{area}/.../{}/", folders[0]),
            _ => format!("{anchor_name}/<Area>/.../{}/", folders[0]),
        };
        let expected = format!("{}/{expected}", project.unwrap_or("<Project>"));
        let actual = all[anchor.saturating_sub(1)..].join("/");

        ctx.report_file_level(vec![
            kind.label().to_string(),
            file_name(unit.file_path()),
            expected,
            actual,
        ]);
        Ok(())
    }
}
