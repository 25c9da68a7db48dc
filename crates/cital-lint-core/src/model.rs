//! Program model consumed by rules.
//!
//! The model is produced by the host compiler (parser + binder) and handed
//! to the engine either in memory or as a JSON dump. The engine only ever
//! reads it.
//!
//! # Shape conventions
//!
//! Rules rely on a handful of child-order conventions:
//!
//! | Node | Children |
//! |------|----------|
//! | `Invocation` | `[callee, arguments...]` |
//! | `MemberAccess` | `[receiver, member]` |
//! | `Assignment` / `CompoundAssignment` | `[target, source]` (compound text is the operator, e.g. `+=`) |
//! | `With` | `[target, statements...]` |
//! | `PageField` | `[source expression, properties...]` |
//! | `Property` | `[value, nested properties...]`, text is the property name |
//! | `Procedure` / `Trigger` | attributes, parameters, variables, then the body `Block` |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Index of a node inside a [`CompilationUnit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a symbol inside a [`CompilationUnit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u32);

impl SymbolId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind of an application object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// `table`
    Table,
    /// `tableextension`
    TableExtension,
    /// `page`
    Page,
    /// `pageextension`
    PageExtension,
    /// `pagecustomization`
    PageCustomization,
    /// `codeunit`
    Codeunit,
    /// `report`
    Report,
    /// `reportextension`
    ReportExtension,
    /// `query`
    Query,
    /// `xmlport`
    XmlPort,
    /// `enum`
    Enum,
    /// `enumextension`
    EnumExtension,
    /// `interface`
    Interface,
    /// `controladdin`
    ControlAddIn,
    /// `profile`
    Profile,
    /// `profileextension`
    ProfileExtension,
    /// `permissionset`
    PermissionSet,
}

impl ObjectKind {
    /// Human-readable label used in messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Table => "Table",
            Self::TableExtension => "TableExtension",
            Self::Page => "Page",
            Self::PageExtension => "PageExtension",
            Self::PageCustomization => "PageCustomization",
            Self::Codeunit => "Codeunit",
            Self::Report => "Report",
            Self::ReportExtension => "ReportExtension",
            Self::Query => "Query",
            Self::XmlPort => "XmlPort",
            Self::Enum => "Enum",
            Self::EnumExtension => "EnumExtension",
            Self::Interface => "Interface",
            Self::ControlAddIn => "ControlAddIn",
            Self::Profile => "Profile",
            Self::ProfileExtension => "ProfileExtension",
            Self::PermissionSet => "PermissionSet",
        }
    }

    /// Returns true for pages and page extensions.
    #[must_use]
    pub fn is_page_like(self) -> bool {
        matches!(self, Self::Page | Self::PageExtension)
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Syntax node kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Root of a file.
    CompilationUnit,
    /// `namespace A.B.C;` with the dotted name as text.
    Namespace,
    /// Application object declaration.
    Object(ObjectKind),
    /// `procedure` declaration.
    Procedure,
    /// `trigger` declaration.
    Trigger,
    /// Procedure parameter.
    Parameter,
    /// Variable declaration.
    VariableDeclaration,
    /// `[Attribute(...)]` with the attribute name as text.
    Attribute,
    /// `Name = value;` with the property name as text.
    Property,
    /// `begin ... end` block.
    Block,
    /// `with X do ...`
    With,
    /// `if ... then ... else ...`
    If,
    /// `repeat ... until ...`
    Repeat,
    /// `while ... do ...`
    While,
    /// `for ... do ...`
    For,
    /// `exit(...)`
    Exit,
    /// Expression used as a statement.
    ExpressionStatement,
    /// `target := source`
    Assignment,
    /// `target += source` and friends.
    CompoundAssignment,
    /// Call expression.
    Invocation,
    /// `receiver.member`
    MemberAccess,
    /// Identifier reference.
    Identifier,
    /// Literal value.
    Literal,
    /// Binary expression with the operator as text.
    Binary,
    /// Table field declaration.
    Field,
    /// Page field (display) declaration.
    PageField,
    /// Anything else the rules do not care about.
    Other,
}

impl NodeKind {
    /// Returns true for loop statements.
    #[must_use]
    pub fn is_loop(self) -> bool {
        matches!(self, Self::Repeat | Self::While | Self::For)
    }

    /// Returns true for procedure and trigger declarations.
    #[must_use]
    pub fn is_code_block(self) -> bool {
        matches!(self, Self::Procedure | Self::Trigger)
    }

    /// Returns the object kind for object declarations.
    #[must_use]
    pub fn object_kind(self) -> Option<ObjectKind> {
        match self {
            Self::Object(kind) => Some(kind),
            _ => None,
        }
    }
}

/// Source span of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Byte offset in the file.
    pub offset: usize,
    /// Length in bytes.
    pub length: usize,
}

impl Span {
    /// Creates a span at the given line and column.
    #[must_use]
    pub fn at(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            offset: 0,
            length: 0,
        }
    }
}

/// Immutable syntax node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxNode {
    /// Kind tag.
    pub kind: NodeKind,
    /// Source span.
    #[serde(default)]
    pub span: Span,
    /// Parent node (none for the root).
    #[serde(default)]
    pub parent: Option<NodeId>,
    /// Ordered children.
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// Name, operator or literal value, depending on the kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Symbol this node refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolId>,
    /// Symbol this node declares.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declares: Option<SymbolId>,
    /// Leading comment trivia, verbatim.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl SyntaxNode {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            span: Span::default(),
            parent,
            children: Vec::new(),
            text: None,
            symbol: None,
            declares: None,
            comments: Vec::new(),
        }
    }

    /// Returns the node text, or an empty string.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Case-insensitive comparison of the node text.
    #[must_use]
    pub fn text_is(&self, expected: &str) -> bool {
        self.text().eq_ignore_ascii_case(expected)
    }
}

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// `Record`
    Record,
    /// `Text`
    Text,
    /// `Code`
    Code,
    /// `BigText`
    BigText,
    /// `TextBuilder`
    TextBuilder,
    /// `Integer`
    Integer,
    /// `Decimal`
    Decimal,
    /// `Boolean`
    Boolean,
    /// `Date`, `Time`, `DateTime`
    DateTime,
    /// `Enum`
    Enum,
    /// `Page`
    Page,
    /// `Report`
    Report,
    /// `Codeunit`
    Codeunit,
    /// `Query`
    Query,
    /// `XmlPort`
    XmlPort,
    /// `Interface`
    Interface,
    /// `DotNet`
    DotNet,
    /// Anything else.
    #[default]
    Other,
}

impl TypeKind {
    /// Returns true for string-like types.
    #[must_use]
    pub fn is_text(self) -> bool {
        matches!(self, Self::Text | Self::Code | Self::BigText)
    }
}

/// Declared type of a symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Type kind.
    pub kind: TypeKind,
    /// Object name for object-typed symbols (e.g. `"Sales Header"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// In-memory record storage.
    #[serde(default)]
    pub temporary: bool,
}

impl TypeDescriptor {
    /// Creates a descriptor of the given kind.
    #[must_use]
    pub fn of(kind: TypeKind) -> Self {
        Self {
            kind,
            name: None,
            temporary: false,
        }
    }

    /// Creates a persistent record type.
    #[must_use]
    pub fn record(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Record,
            name: Some(name.into()),
            temporary: false,
        }
    }

    /// Creates a temporary record type.
    #[must_use]
    pub fn temporary_record(name: impl Into<String>) -> Self {
        Self {
            temporary: true,
            ..Self::record(name)
        }
    }
}

/// Kind of a resolved symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// Object-level variable.
    GlobalVariable,
    /// Procedure-local variable.
    LocalVariable,
    /// Procedure parameter.
    Parameter,
    /// Table field.
    Field,
    /// Procedure, trigger or built-in method.
    Method,
    /// Application object.
    Object(ObjectKind),
}

impl SymbolKind {
    /// Returns true for globals, locals and parameters.
    #[must_use]
    pub fn is_variable(self) -> bool {
        matches!(
            self,
            Self::GlobalVariable | Self::LocalVariable | Self::Parameter
        )
    }
}

/// Resolved named entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Declared name.
    pub name: String,
    /// Symbol kind.
    pub kind: SymbolKind,
    /// Declared type.
    #[serde(default)]
    pub ty: TypeDescriptor,
    /// Enclosing method or object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<SymbolId>,
    /// `var` parameter.
    #[serde(default)]
    pub by_reference: bool,
    /// Platform-provided method (`Get`, `FindSet`, `CalcFields`, ...).
    #[serde(default)]
    pub builtin: bool,
    /// Declaring node, when the declaration is in this unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<NodeId>,
    /// Declared properties (`Caption`, `DataClassification`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl Symbol {
    /// Creates a symbol with no type, container or properties.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ty: TypeDescriptor::default(),
            container: None,
            by_reference: false,
            builtin: false,
            declaration: None,
            properties: BTreeMap::new(),
        }
    }

    /// Creates a platform-provided method symbol.
    #[must_use]
    pub fn builtin_method(name: impl Into<String>) -> Self {
        Self {
            builtin: true,
            ..Self::new(name, SymbolKind::Method)
        }
    }

    /// Sets the declared type.
    #[must_use]
    pub fn with_type(mut self, ty: TypeDescriptor) -> Self {
        self.ty = ty;
        self
    }

    /// Sets the containing symbol.
    #[must_use]
    pub fn in_container(mut self, container: SymbolId) -> Self {
        self.container = Some(container);
        self
    }

    /// Marks a parameter as passed by reference.
    #[must_use]
    pub fn by_reference(mut self) -> Self {
        self.by_reference = true;
        self
    }

    /// Adds a property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Looks up a property value by case-insensitive name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns true for record-typed variables.
    #[must_use]
    pub fn is_record_variable(&self) -> bool {
        self.kind.is_variable() && self.ty.kind == TypeKind::Record
    }
}

/// Errors raised while building or loading a [`CompilationUnit`].
#[derive(Debug, Error)]
pub enum ModelError {
    /// JSON model could not be decoded.
    #[error("invalid model JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The root id does not point at a node.
    #[error("model has no root node")]
    MissingRoot,

    /// A node id points outside the arena.
    #[error("node {referenced_by} references unknown node {node}")]
    DanglingNode {
        /// Missing node id.
        node: u32,
        /// Node holding the reference.
        referenced_by: u32,
    },

    /// A child's parent link does not point back at its parent.
    #[error("node {node} is listed under {expected} but its parent is {found:?}")]
    ParentMismatch {
        /// Child node id.
        node: u32,
        /// Parent listing the child.
        expected: u32,
        /// Parent recorded on the child.
        found: Option<u32>,
    },

    /// A node cannot be reached from the root, e.g. because it sits on a cycle.
    #[error("node {node} is not reachable from the root")]
    Unreachable {
        /// Detached node id.
        node: u32,
    },

    /// A node is listed as a child more than once.
    #[error("node {node} appears more than once in the tree")]
    SharedNode {
        /// Repeated node id.
        node: u32,
    },

    /// A symbol id points outside the symbol table.
    #[error("unknown symbol {symbol}")]
    DanglingSymbol {
        /// Missing symbol id.
        symbol: u32,
    },
}

/// One parsed and bound source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    file_path: PathBuf,
    #[serde(default = "root_id")]
    root: NodeId,
    nodes: Vec<SyntaxNode>,
    #[serde(default)]
    symbols: Vec<Symbol>,
}

fn root_id() -> NodeId {
    NodeId(0)
}

impl CompilationUnit {
    /// Decodes and validates a JSON model dump.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the model is inconsistent.
    pub fn from_json(content: &str) -> Result<Self, ModelError> {
        let unit: Self = serde_json::from_str(content)?;
        unit.validate()?;
        Ok(unit)
    }

    /// Encodes the model as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), ModelError> {
        let root = self.nodes.get(self.root.index()).ok_or(ModelError::MissingRoot)?;
        if root.parent.is_some() {
            return Err(ModelError::MissingRoot);
        }

        let symbol_ok = |id: Option<SymbolId>| match id {
            Some(id) if id.index() >= self.symbols.len() => {
                Err(ModelError::DanglingSymbol { symbol: id.0 })
            }
            _ => Ok(()),
        };

        for (index, node) in self.nodes.iter().enumerate() {
            let id = NodeId(to_u32(index));
            for &child in &node.children {
                let child_node = self.nodes.get(child.index()).ok_or(ModelError::DanglingNode {
                    node: child.0,
                    referenced_by: id.0,
                })?;
                if child_node.parent != Some(id) {
                    return Err(ModelError::ParentMismatch {
                        node: child.0,
                        expected: id.0,
                        found: child_node.parent.map(|p| p.0),
                    });
                }
            }
            symbol_ok(node.symbol)?;
            symbol_ok(node.declares)?;
        }

        self.check_tree_shape()?;

        for symbol in &self.symbols {
            symbol_ok(symbol.container)?;
            if let Some(decl) = symbol.declaration {
                if decl.index() >= self.nodes.len() {
                    return Err(ModelError::DanglingNode {
                        node: decl.0,
                        referenced_by: self.root.0,
                    });
                }
            }
        }

        Ok(())
    }

    /// Every node must be reached from the root exactly once, so walks
    /// over parent and child links terminate.
    fn check_tree_shape(&self) -> Result<(), ModelError> {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut seen[id.index()], true) {
                return Err(ModelError::SharedNode { node: id.0 });
            }
            stack.extend(self.nodes[id.index()].children.iter().copied());
        }
        match seen.iter().position(|&reached| !reached) {
            Some(index) => Err(ModelError::Unreachable {
                node: to_u32(index),
            }),
            None => Ok(()),
        }
    }

    /// Path of the source file this unit was built from.
    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this unit.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    /// Kind of the given node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    /// Children of the given node, in source order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// The `index`-th child of a node.
    #[must_use]
    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// Parent of the given node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Ancestors of a node, nearest first, excluding the node itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// The node followed by its ancestors.
    pub fn ancestors_and_self(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&n| self.parent(n))
    }

    /// Nearest ancestor (or the node itself) of the given kind.
    #[must_use]
    pub fn first_ancestor_or_self(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.ancestors_and_self(id).find(|&n| self.kind(n) == kind)
    }

    /// Nearest enclosing object declaration.
    #[must_use]
    pub fn enclosing_object(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors_and_self(id)
            .find(|&n| self.kind(n).object_kind().is_some())
    }

    /// Pre-order descendants of a node, excluding the node itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { unit: self, stack }
    }

    /// Pre-order walk starting at the node itself.
    #[must_use]
    pub fn descendants_and_self(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            unit: self,
            stack: vec![id],
        }
    }

    /// Every node in pre-order, starting at the root.
    #[must_use]
    pub fn walk(&self) -> Descendants<'_> {
        self.descendants_and_self(self.root)
    }

    /// Symbol referenced by a node.
    #[must_use]
    pub fn resolve_symbol(&self, id: NodeId) -> Option<SymbolId> {
        self.node(id).symbol
    }

    /// Symbol referenced by a node, dereferenced.
    #[must_use]
    pub fn resolved(&self, id: NodeId) -> Option<&Symbol> {
        self.resolve_symbol(id).map(|s| self.symbol(s))
    }

    /// Symbol declared by a node.
    #[must_use]
    pub fn declared_symbol(&self, id: NodeId) -> Option<SymbolId> {
        self.node(id).declares
    }

    /// Leading comments attached to a node.
    #[must_use]
    pub fn leading_comments(&self, id: NodeId) -> &[String] {
        &self.node(id).comments
    }

    /// Returns the symbol with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this unit.
    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    /// All symbols in declaration order.
    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId(to_u32(i)), s))
    }

    /// Symbols whose container is `container`.
    pub fn members_of(&self, container: SymbolId) -> impl Iterator<Item = (SymbolId, &Symbol)> + '_ {
        self.symbols()
            .filter(move |(_, s)| s.container == Some(container))
    }

    /// First node of the given kind in pre-order.
    #[must_use]
    pub fn find_first(&self, kind: NodeKind) -> Option<NodeId> {
        self.walk().find(|&n| self.kind(n) == kind)
    }

    /// Body block of a procedure or trigger.
    #[must_use]
    pub fn body(&self, code_block: NodeId) -> Option<NodeId> {
        self.children(code_block)
            .iter()
            .copied()
            .find(|&c| self.kind(c) == NodeKind::Block)
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    unit: &'a CompilationUnit,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.unit.children(id).iter().rev().copied());
        Some(id)
    }
}

#[allow(clippy::cast_possible_truncation)] // arenas never approach u32::MAX entries
fn to_u32(index: usize) -> u32 {
    index as u32
}

/// Incremental construction of a [`CompilationUnit`].
///
/// Nodes get a synthetic span whose line equals their id plus one, which
/// keeps diagnostics from hand-built models distinct and ordered.
#[derive(Debug)]
pub struct UnitBuilder {
    file_path: PathBuf,
    nodes: Vec<SyntaxNode>,
    symbols: Vec<Symbol>,
}

impl UnitBuilder {
    /// Starts a unit with a `CompilationUnit` root.
    #[must_use]
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        let mut root = SyntaxNode::new(NodeKind::CompilationUnit, None);
        root.span = Span::at(1, 1);
        Self {
            file_path: file_path.into(),
            nodes: vec![root],
            symbols: Vec::new(),
        }
    }

    /// Root node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Appends a node under `parent`.
    pub fn add(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(to_u32(self.nodes.len()));
        let mut node = SyntaxNode::new(kind, Some(parent));
        node.span = Span::at(self.nodes.len() + 1, 1);
        self.nodes.push(node);
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Appends a node carrying text under `parent`.
    pub fn add_text(&mut self, parent: NodeId, kind: NodeKind, text: impl Into<String>) -> NodeId {
        let id = self.add(parent, kind);
        let text = text.into();
        self.nodes[id.index()].span.length = text.len();
        self.nodes[id.index()].text = Some(text);
        id
    }

    /// Appends an identifier that resolves to `symbol`.
    pub fn identifier(&mut self, parent: NodeId, symbol: SymbolId) -> NodeId {
        let name = self.symbols[symbol.index()].name.clone();
        let id = self.add_text(parent, NodeKind::Identifier, name);
        self.resolve(id, symbol);
        id
    }

    /// Registers a symbol.
    pub fn symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(to_u32(self.symbols.len()));
        self.symbols.push(symbol);
        id
    }

    /// Records that `node` refers to `symbol`.
    pub fn resolve(&mut self, node: NodeId, symbol: SymbolId) -> &mut Self {
        self.nodes[node.index()].symbol = Some(symbol);
        self
    }

    /// Records that `node` declares `symbol`.
    pub fn declare(&mut self, node: NodeId, symbol: SymbolId) -> &mut Self {
        self.nodes[node.index()].declares = Some(symbol);
        self.symbols[symbol.index()].declaration = Some(node);
        self
    }

    /// Attaches a leading comment.
    pub fn comment(&mut self, node: NodeId, text: impl Into<String>) -> &mut Self {
        self.nodes[node.index()].comments.push(text.into());
        self
    }

    /// Overrides the span of a node.
    pub fn span(&mut self, node: NodeId, span: Span) -> &mut Self {
        self.nodes[node.index()].span = span;
        self
    }

    /// Finishes the unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is inconsistent.
    pub fn build(self) -> Result<CompilationUnit, ModelError> {
        let unit = CompilationUnit {
            file_path: self.file_path,
            root: NodeId(0),
            nodes: self.nodes,
            symbols: self.symbols,
        };
        unit.validate()?;
        Ok(unit)
    }
}
