//! Identifier to declaration lookup.
use crate::analysis::AnalyzedPackage;
use crate::error::DefinitionError;
use crate::types::{FoundDeclaration, Ident, Object, Type, TypeName};

/// The object `ident` refers to, or failing that, the object it declares.
///
/// The use index is consulted first so that references resolve to the
/// referenced object; the definition index covers the declaring occurrence
/// itself.  A declaring occurrence recorded without an object counts as no
/// object.
pub fn object_of<'a>(pkg: &'a AnalyzedPackage, ident: &Ident) -> Option<&'a Object> {
    if let Some(id) = pkg.info.uses.get(&ident.id) {
        return pkg.object(*id);
    }
    let id = pkg.info.defs.get(&ident.id).copied().flatten()?;
    pkg.object(id)
}

/// Resolve `ident` to its declaration.
///
/// Returns `Ok(None)` for builtins: the object exists but has no source
/// position, so there is nothing to navigate to.
pub fn lookup_ident(
    pkg: &AnalyzedPackage,
    ident: &Ident,
) -> Result<Option<FoundDeclaration>, DefinitionError> {
    let obj = object_of(pkg, ident).ok_or(DefinitionError::NotFound)?;

    if !obj.pos.is_valid() {
        tracing::debug!(name = %obj.name, "skipping builtin without a source position");
        return Ok(None);
    }

    Ok(Some(FoundDeclaration {
        name: obj.name.clone(),
        pos: obj.pos,
        type_name: pkg.type_of(ident).and_then(type_lookup).cloned(),
    }))
}

/// The named type behind `ty`, looking through pointers.
///
/// Basic and composite types have no declaration of their own, and neither
/// do predeclared named types such as `error`; all of those yield `None`.
pub fn type_lookup(ty: &Type) -> Option<&TypeName> {
    match ty {
        Type::Named(name) if name.pos.is_valid() => Some(name),
        Type::Pointer { elem } => type_lookup(elem),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::builder::PackageBuilder;
    use crate::types::Pos;
    use tower_lsp::lsp_types::Url;

    fn named(name: &str, pos: u32) -> Type {
        Type::Named(TypeName {
            name: name.to_string(),
            pos: Pos(pos),
            end: None,
            package: None,
        })
    }

    #[test]
    fn pointer_to_named_resolves_to_named() {
        let ty = Type::Pointer {
            elem: Box::new(named("Cart", 42)),
        };
        assert_eq!(type_lookup(&ty).map(|t| t.name.as_str()), Some("Cart"));
    }

    #[test]
    fn basic_and_composite_types_have_no_declaration() {
        let basic = Type::Basic {
            name: "int".to_string(),
        };
        assert!(type_lookup(&basic).is_none());
        let slice = Type::Slice {
            elem: Box::new(named("Cart", 42)),
        };
        assert!(type_lookup(&slice).is_none());
    }

    #[test]
    fn predeclared_named_type_is_skipped() {
        assert!(type_lookup(&named("error", 0)).is_none());
    }

    #[test]
    fn declaring_occurrence_without_object_is_not_found() {
        let mut b = PackageBuilder::new("example.com/shop", "shop");
        let f = b.add_file(
            Url::parse("file:///ws/shop/cart.go").unwrap(),
            "package shop\n",
        );
        // The package clause name declares nothing.
        let name = b.ident(f, "shop", 0).unwrap();
        b.define(&name, None);
        let pkg = b.finish();

        assert_eq!(object_of(&pkg, &name), None);
        assert_eq!(lookup_ident(&pkg, &name), Err(DefinitionError::NotFound));
    }
}
