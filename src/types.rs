//! Data types used throughout the symnav server.
//!
//! This module contains the "model" structs and enums that represent an
//! analyzed package (positions, syntax nodes, semantic objects and their
//! types) as well as the per-request results produced by definition
//! resolution.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::Location;

/// An analyzer-internal position.
///
/// Positions are unique across every file registered in a
/// [`FileSet`](crate::analysis::FileSet): a file with base `b` maps byte
/// offset `o` to `Pos(b + o)`.  `Pos(0)` is reserved as the invalid
/// position, which is what builtin objects carry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Pos(pub u32);

impl Pos {
    /// The invalid position.
    pub const NONE: Pos = Pos(0);

    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// The position `len` bytes after this one.
    pub fn advance(self, len: usize) -> Pos {
        Pos(self.0.saturating_add(len as u32))
    }
}

/// Identity of a syntax node inside one analyzed package.
///
/// The use and definition indexes are keyed by identifier identity, not by
/// name or position, mirroring how the analyzer records them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

/// Index of an [`Object`] in [`AnalyzedPackage::objects`](crate::analysis::AnalyzedPackage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

/// A range of analyzer positions; `end` is just past the last byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub pos: Pos,
    pub end: Pos,
}

impl Span {
    pub fn new(pos: Pos, end: Pos) -> Self {
        Self { pos, end }
    }

    /// Whether `pos` lies within the span.  The end is inclusive so that a
    /// cursor placed right after a token still counts as "on" it.
    pub fn encloses(&self, pos: Pos) -> bool {
        self.pos <= pos && pos <= self.end
    }
}

/// An identifier occurrence in the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub id: NodeId,
    pub name: String,
    pub pos: Pos,
}

impl Ident {
    /// Identifiers are single tokens, so the end is always `pos + len(name)`.
    pub fn end(&self) -> Pos {
        self.pos.advance(self.name.len())
    }
}

/// The syntactic constructs definition lookup distinguishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "camelCase")]
pub enum NodeKind {
    /// A bare identifier.
    Ident(Ident),
    /// A type declaration (`type Name ...`), carrying its name identifier.
    TypeSpec { name: Ident },
    /// Any other construct; `label` is a human readable node kind used in
    /// error messages (e.g. "CallExpr", "BlockStmt").
    Other { label: String },
}

/// A node in an analyzed syntax tree.  Nodes are never mutated once the
/// analyzer has produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub pos: Pos,
    pub end: Pos,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// A leaf node wrapping an identifier.
    pub fn ident(ident: Ident) -> Self {
        let (pos, end) = (ident.pos, ident.end());
        Self {
            kind: NodeKind::Ident(ident),
            pos,
            end,
            children: Vec::new(),
        }
    }

    /// A type declaration node.  The name identifier is also pushed as the
    /// first child so that a cursor on the name resolves to the identifier.
    pub fn type_spec(name: Ident, end: Pos, mut children: Vec<SyntaxNode>) -> Self {
        let pos = name.pos;
        children.insert(0, Self::ident(name.clone()));
        Self {
            kind: NodeKind::TypeSpec { name },
            pos,
            end,
            children,
        }
    }

    /// Same as [`SyntaxNode::type_spec`] but starting before the name, e.g.
    /// at the `type` keyword.
    pub fn type_spec_at(pos: Pos, name: Ident, end: Pos, children: Vec<SyntaxNode>) -> Self {
        let mut node = Self::type_spec(name, end, children);
        node.pos = pos;
        node
    }

    pub fn other(label: impl Into<String>, pos: Pos, end: Pos, children: Vec<SyntaxNode>) -> Self {
        Self {
            kind: NodeKind::Other {
                label: label.into(),
            },
            pos,
            end,
            children,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.pos, self.end)
    }

    /// Short description used in diagnostics.
    pub fn label(&self) -> &str {
        match &self.kind {
            NodeKind::Ident(_) => "Ident",
            NodeKind::TypeSpec { .. } => "TypeSpec",
            NodeKind::Other { label } => label,
        }
    }
}

/// What sort of entity an [`Object`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectKind {
    Var,
    Const,
    TypeName,
    Func,
    Method,
    Field,
    PkgName,
    Label,
    Builtin,
}

/// The scope an object was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectScope {
    /// Declared at package level; addressable from other packages.
    #[default]
    Package,
    /// Declared inside a function body.
    Local,
    /// Predeclared by the language (builtins).
    Universe,
}

/// A semantic entity an identifier refers to or introduces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    pub name: String,
    pub kind: ObjectKind,
    /// Declaration position; invalid for builtins.
    #[serde(default)]
    pub pos: Pos,
    /// The object's static type, when it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<Type>,
    /// Receiver or owning type name for methods and fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Import path of the declaring package, when it is not the package the
    /// object was recorded in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default)]
    pub scope: ObjectScope,
}

/// The object describing a named type: its name and where it is declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeName {
    pub name: String,
    /// Declaration position of the type's name; invalid for predeclared
    /// types such as `error`.
    #[serde(default)]
    pub pos: Pos,
    /// Exact end of the name, when the analyzer records one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Pos>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

/// A static type, reduced to the shapes definition lookup cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Type {
    Basic { name: String },
    Named(TypeName),
    Pointer { elem: Box<Type> },
    Slice { elem: Box<Type> },
    Map { key: Box<Type>, value: Box<Type> },
    Signature,
    Struct,
    Interface,
}

/// An identifier that was resolved to its declaring occurrence, paired with
/// the named type of the original identifier's static type (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundDeclaration {
    pub name: String,
    pub pos: Pos,
    pub type_name: Option<TypeName>,
}

impl FoundDeclaration {
    pub fn end(&self) -> Pos {
        self.pos.advance(self.name.len())
    }
}

/// Opaque cross-reference metadata attached to a resolved declaration.
pub type SymbolDescriptor = BTreeMap<String, serde_json::Value>;

/// One resolved declaration, as handed back to the operation handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolLocationInformation {
    /// Where the identifier is declared.
    pub location: Location,
    /// Where the identifier's type is declared.  `None` when the static
    /// type is not a named type with its own declaration site.
    pub type_location: Option<Location>,
    /// Enrichment metadata; `None` when enrichment failed or was disabled.
    pub symbol: Option<SymbolDescriptor>,
}
