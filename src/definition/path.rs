//! Position to syntax node resolution.
use crate::analysis::{AnalyzedFile, AnalyzedPackage};
use crate::error::DefinitionError;
use crate::types::{Pos, SyntaxNode};

/// The chain of nodes enclosing `pos`, innermost first.
///
/// Fails with [`DefinitionError::InvalidNode`] when no file of the package
/// contains `pos`, or when the position is outside the file's syntax tree.
pub fn path_nodes(pkg: &AnalyzedPackage, pos: Pos) -> Result<Vec<&SyntaxNode>, DefinitionError> {
    let file = pkg
        .file_at(pos)
        .ok_or_else(|| invalid_node(pkg, pos, "NoFile"))?;
    enclosing_path(file, pos).ok_or_else(|| invalid_node(pkg, pos, "NoNode"))
}

/// Walk down from the file root, always entering the first child that
/// encloses `pos`.
fn enclosing_path(file: &AnalyzedFile, pos: Pos) -> Option<Vec<&SyntaxNode>> {
    let mut node = &file.root;
    if !node.span().encloses(pos) {
        return None;
    }

    let mut path = vec![node];
    while let Some(child) = node.children.iter().find(|c| c.span().encloses(pos)) {
        path.push(child);
        node = child;
    }
    path.reverse();
    Some(path)
}

/// An `InvalidNode` error describing `label` at `pos`.
pub(crate) fn invalid_node(pkg: &AnalyzedPackage, pos: Pos, label: &str) -> DefinitionError {
    let (uri, line, character) = match pkg.fset.position(pos) {
        Some((uri, position)) => (uri.to_string(), position.line, position.character),
        None => (String::new(), 0, 0),
    };
    DefinitionError::InvalidNode {
        node: label.to_string(),
        uri,
        line,
        character,
    }
}
