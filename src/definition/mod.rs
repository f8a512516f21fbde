/// Goto definition and goto type definition support.
///
/// Both requests share one resolution pipeline and differ only in which
/// location of each result they surface:
///
///   1. The type checker produces the analyzed package for the document and
///      the analyzer position of the cursor.
///   2. [`path`] finds the chain of syntax nodes enclosing the cursor.
///   3. The innermost node must be an identifier, or a type declaration (in
///      which case its name is used).  Anything else yields no results.
///   4. [`lookup`] maps the identifier to the object it uses or defines and
///      picks up the named type of the identifier's static type.
///   5. [`location`] turns analyzer positions into editor locations.
///   6. [`enrich`] attaches a symbol descriptor, best effort.
///
/// Known limitations:
///   - Builtins have no source position and are never navigable: the
///     result for them is empty rather than an error.
///   - Type declaration ranges are approximated as the type's name length
///     from its start unless the analyzer recorded an exact end.
///
/// - [`handler`]: the `definition` / `type_definition` entry points and
///   the shared pipeline.
pub mod enrich;
mod handler;
pub mod location;
pub mod lookup;
pub mod path;
