//! Definition metadata.
//!
//! [`DefInfo`] answers "what is declared at this position": the declaring
//! package, and the declaration's path within that package (`Name` for
//! package-level declarations, `Parent.Name` for fields and methods).
//! Only package-level declarations have a cross-package identity; locals
//! are rejected.
use serde::Serialize;
use thiserror::Error;

use crate::analysis::AnalyzedPackage;
use crate::types::{NodeKind, Object, ObjectKind, ObjectScope, Pos, SyntaxNode};

/// Metadata describing a package-level declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Def {
    pub import_path: String,
    pub package_name: String,
    /// `Name`, or `Parent.Name` for fields and methods.
    pub path: String,
    pub kind: ObjectKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefsError {
    #[error("no declaration at position {0}")]
    NotFound(u32),
    #[error("{0} is not a package-level declaration")]
    Local(String),
    #[error("{0} is predeclared")]
    Universe(String),
}

/// The definition-info collaborator.
pub trait DefInfo: Send + Sync {
    /// Metadata for the declaration at `pos`.  `path_nodes` is the node
    /// chain enclosing the cursor, innermost first.
    fn def_info(
        &self,
        pkg: &AnalyzedPackage,
        path_nodes: &[&SyntaxNode],
        pos: Pos,
    ) -> Result<Def, RefsError>;
}

/// Computes [`Def`]s from object scopes recorded by the analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeDefInfo;

impl ScopeDefInfo {
    /// The object declared at `pos`: prefer a declaring occurrence in the
    /// definition index, otherwise any object recorded at that position.
    fn object_at(pkg: &AnalyzedPackage, pos: Pos) -> Option<&Object> {
        pkg.info
            .defs
            .values()
            .filter_map(|id| id.and_then(|id| pkg.object(id)))
            .find(|obj| obj.pos == pos)
            .or_else(|| pkg.objects.iter().find(|obj| obj.pos == pos))
    }

    /// Name of the innermost type declaration enclosing the cursor.
    fn enclosing_type(path_nodes: &[&SyntaxNode]) -> Option<String> {
        path_nodes.iter().find_map(|node| match &node.kind {
            NodeKind::TypeSpec { name } => Some(name.name.clone()),
            _ => None,
        })
    }
}

impl DefInfo for ScopeDefInfo {
    fn def_info(
        &self,
        pkg: &AnalyzedPackage,
        path_nodes: &[&SyntaxNode],
        pos: Pos,
    ) -> Result<Def, RefsError> {
        let obj = Self::object_at(pkg, pos).ok_or(RefsError::NotFound(pos.0))?;

        match obj.scope {
            ObjectScope::Local => return Err(RefsError::Local(obj.name.clone())),
            ObjectScope::Universe => return Err(RefsError::Universe(obj.name.clone())),
            ObjectScope::Package => {}
        }

        // A field declared in the file being edited may not carry its
        // owner; the cursor is then inside the owning type declaration.
        let parent = match (&obj.parent, obj.kind) {
            (Some(parent), _) => Some(parent.clone()),
            (None, ObjectKind::Field) => Self::enclosing_type(path_nodes),
            (None, _) => None,
        };
        let path = match parent {
            Some(parent) => format!("{}.{}", parent, obj.name),
            None => obj.name.clone(),
        };

        let import_path = obj
            .package
            .clone()
            .unwrap_or_else(|| pkg.import_path.clone());
        let package_name = if import_path == pkg.import_path {
            pkg.name.clone()
        } else {
            import_path
                .rsplit('/')
                .next()
                .unwrap_or(&import_path)
                .to_string()
        };

        Ok(Def {
            import_path,
            package_name,
            path,
            kind: obj.kind,
        })
    }
}
