/// Analyzed package model and the type-check collaborator.
///
/// The definition core never parses or type-checks source text itself.  It
/// consumes an [`AnalyzedPackage`]: a syntax tree per file, the use and
/// definition indexes, recorded static types, and the [`FileSet`] that maps
/// positions back to files.  A [`TypeChecker`] produces one for a request.
///
/// - [`fileset`]: analyzer position ↔ editor position mapping.
/// - [`builder`]: programmatic construction of analyzed packages.
/// - [`snapshot`]: a `TypeChecker` backed by analysis snapshots on disk.
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower_lsp::lsp_types::{Position, Url};

use crate::error::DefinitionError;
use crate::types::{Ident, NodeId, Object, ObjectId, Pos, Span, SyntaxNode, Type};

pub mod builder;
mod fileset;
pub mod snapshot;

pub use fileset::{FileSet, FileSetError, SourceFile};

/// Semantic indexes recorded by the analyzer for one package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypesInfo {
    /// Identifiers that refer to an object declared elsewhere.
    #[serde(default)]
    pub uses: HashMap<NodeId, ObjectId>,
    /// Identifiers that declare an object.  `None` marks a declaring
    /// occurrence with no object (e.g. the package clause name).
    #[serde(default)]
    pub defs: HashMap<NodeId, Option<ObjectId>>,
    /// Static types of expressions, keyed by identifier.
    #[serde(default)]
    pub types: HashMap<NodeId, Type>,
}

/// One file of an analyzed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedFile {
    pub uri: Url,
    pub root: SyntaxNode,
    /// Comment ranges; comments are not part of the syntax tree.
    #[serde(default)]
    pub comments: Vec<Span>,
}

/// The output of parsing and type-checking one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedPackage {
    pub import_path: String,
    pub name: String,
    pub fset: FileSet,
    pub files: Vec<AnalyzedFile>,
    #[serde(default)]
    pub objects: Vec<Object>,
    #[serde(default)]
    pub info: TypesInfo,
}

impl AnalyzedPackage {
    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.0 as usize)
    }

    /// The analyzed file containing `pos`.
    pub fn file_at(&self, pos: Pos) -> Option<&AnalyzedFile> {
        let source = self.fset.file(pos)?;
        self.files.iter().find(|f| f.uri == *source.uri())
    }

    pub fn file_by_uri(&self, uri: &Url) -> Option<&AnalyzedFile> {
        self.files.iter().find(|f| f.uri == *uri)
    }

    /// The static type of an identifier: the recorded expression type when
    /// there is one, otherwise the type of the object it uses or defines.
    pub fn type_of(&self, ident: &Ident) -> Option<&Type> {
        if let Some(ty) = self.info.types.get(&ident.id) {
            return Some(ty);
        }
        let id = self
            .info
            .uses
            .get(&ident.id)
            .copied()
            .or_else(|| self.info.defs.get(&ident.id).copied().flatten())?;
        self.object(id)?.ty.as_ref()
    }
}

/// Per-request context threaded into collaborator calls.
///
/// The token is cancelled when the client cancels the request (or the
/// request future is dropped); collaborators that block are expected to
/// check it.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub method: String,
    pub cancel: CancellationToken,
}

impl RequestContext {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// The type-check collaborator.
pub trait TypeChecker: Send + Sync {
    /// Produce the analyzed package owning `uri` and the analyzer position
    /// of `position` within it.
    ///
    /// Must fail with [`DefinitionError::InvalidNode`] when the position is
    /// not inside a syntactic construct (comments, past the end of a file).
    fn type_check(
        &self,
        ctx: &RequestContext,
        uri: &Url,
        position: Position,
    ) -> Result<(Arc<AnalyzedPackage>, Pos), DefinitionError>;
}
