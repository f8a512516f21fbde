//! Analyzer positions to editor locations.
use tower_lsp::lsp_types::{Location, Range};

use crate::analysis::FileSet;
use crate::types::{FoundDeclaration, Pos, TypeName};

/// The location spanning `[start, end)`.
///
/// `end` is clamped to the end of `start`'s file.  Returns `None` when
/// `start` is not in any registered file.
pub fn build_location(fset: &FileSet, start: Pos, end: Pos) -> Option<Location> {
    let file = fset.file(start)?;
    let file_end = file.pos(file.content().len());
    let end = end.clamp(start, file_end);

    let (uri, start) = fset.position(start)?;
    let (_, end) = fset.position(end)?;
    Some(Location {
        uri: uri.clone(),
        range: Range { start, end },
    })
}

/// The location of a resolved declaration's identifier.
pub fn declaration_location(fset: &FileSet, found: &FoundDeclaration) -> Option<Location> {
    build_location(fset, found.pos, found.end())
}

/// The location of a named type's declaration.
///
/// The analyzer does not always record where a type name ends, so unless
/// it did, the end is approximated as the start plus the length of the
/// name.
pub fn type_location(fset: &FileSet, type_name: &TypeName) -> Option<Location> {
    let end = type_name
        .end
        .unwrap_or_else(|| type_name.pos.advance(type_name.name.len()));
    build_location(fset, type_name.pos, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::{Position, Url};

    fn fset() -> FileSet {
        let mut fset = FileSet::new();
        fset.add_file(
            Url::parse("file:///ws/shop/cart.go").unwrap(),
            "package shop\n\ntype Cart struct{}\n",
        );
        fset
    }

    fn cart(end: Option<Pos>) -> TypeName {
        let fset = fset();
        let file = &fset.files()[0];
        let offset = file.content().find("Cart").unwrap();
        TypeName {
            name: "Cart".to_string(),
            pos: file.pos(offset),
            end,
            package: None,
        }
    }

    #[test]
    fn type_location_approximates_end_from_name() {
        let loc = type_location(&fset(), &cart(None)).unwrap();
        assert_eq!(
            loc.range.start,
            Position {
                line: 2,
                character: 5
            }
        );
        assert_eq!(
            loc.range.end,
            Position {
                line: 2,
                character: 9
            }
        );
    }

    #[test]
    fn type_location_prefers_recorded_end() {
        let start = cart(None).pos;
        let loc = type_location(&fset(), &cart(Some(start.advance(11)))).unwrap();
        assert_eq!(
            loc.range.end,
            Position {
                line: 2,
                character: 16
            }
        );
    }

    #[test]
    fn end_is_clamped_to_file() {
        let start = cart(None).pos;
        let loc = build_location(&fset(), start, Pos(10_000)).unwrap();
        assert_eq!(
            loc.range.end,
            Position {
                line: 3,
                character: 0
            }
        );
    }

    #[test]
    fn unknown_position_has_no_location() {
        assert!(build_location(&fset(), Pos(10_000), Pos(10_004)).is_none());
        assert!(build_location(&fset(), Pos::NONE, Pos(3)).is_none());
    }
}
