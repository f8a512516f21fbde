//! Programmatic construction of [`AnalyzedPackage`]s.
//!
//! Indexers and tests use [`PackageBuilder`] to register source files,
//! mint identifiers located by searching the source text, record objects in
//! the use/definition indexes, and attach a syntax tree to each file.
use tower_lsp::lsp_types::Url;

use super::{AnalyzedFile, AnalyzedPackage, FileSet, SourceFile, TypesInfo};
use crate::types::{Ident, NodeId, Object, ObjectId, Pos, Span, SyntaxNode, Type};

/// Handle to a file registered with a [`PackageBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileHandle {
    /// A file of the package, indexed into the builder's file list.
    Package(usize),
    /// A position-only file, indexed into the file set.
    External(usize),
}

#[derive(Debug)]
pub struct PackageBuilder {
    import_path: String,
    name: String,
    fset: FileSet,
    files: Vec<(Url, Option<SyntaxNode>, Vec<Span>)>,
    objects: Vec<Object>,
    info: TypesInfo,
    next_node: u32,
}

impl PackageBuilder {
    pub fn new(import_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            import_path: import_path.into(),
            name: name.into(),
            fset: FileSet::new(),
            files: Vec::new(),
            objects: Vec::new(),
            info: TypesInfo::default(),
            next_node: 1,
        }
    }

    /// Register a file of this package.
    pub fn add_file(&mut self, uri: Url, content: impl Into<String>) -> FileHandle {
        self.fset.add_file(uri.clone(), content);
        self.files.push((uri, None, Vec::new()));
        FileHandle::Package(self.files.len() - 1)
    }

    /// Register a file that only contributes positions (e.g. a dependency
    /// source objects are declared in) and has no syntax tree here.
    pub fn add_external_file(&mut self, uri: Url, content: impl Into<String>) -> FileHandle {
        self.fset.add_file(uri, content);
        FileHandle::External(self.fset.files().len() - 1)
    }

    fn source(&self, file: FileHandle) -> Option<&SourceFile> {
        match file {
            FileHandle::Package(index) => self.fset.file_by_uri(&self.files.get(index)?.0),
            FileHandle::External(index) => self.fset.files().get(index),
        }
    }

    fn entry(&mut self, file: FileHandle) -> Option<&mut (Url, Option<SyntaxNode>, Vec<Span>)> {
        match file {
            FileHandle::Package(index) => self.files.get_mut(index),
            FileHandle::External(_) => None,
        }
    }

    /// The span of the `nth` (zero-based) occurrence of `needle` in `file`.
    pub fn span_of(&self, file: FileHandle, needle: &str, nth: usize) -> Option<Span> {
        let source = self.source(file)?;
        let (offset, _) = source.content().match_indices(needle).nth(nth)?;
        Some(Span::new(
            source.pos(offset),
            source.pos(offset + needle.len()),
        ))
    }

    /// Position of the `nth` occurrence of `needle` in `file`.
    pub fn pos_of(&self, file: FileHandle, needle: &str, nth: usize) -> Option<Pos> {
        self.span_of(file, needle, nth).map(|span| span.pos)
    }

    /// End of the file's content.
    pub fn end_of(&self, file: FileHandle) -> Option<Pos> {
        let source = self.source(file)?;
        Some(source.pos(source.content().len()))
    }

    /// Mint an identifier node for the `nth` occurrence of `name`.
    pub fn ident(&mut self, file: FileHandle, name: &str, nth: usize) -> Option<Ident> {
        let pos = self.pos_of(file, name, nth)?;
        let id = NodeId(self.next_node);
        self.next_node += 1;
        Some(Ident {
            id,
            name: name.to_string(),
            pos,
        })
    }

    pub fn object(&mut self, object: Object) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() as u32 - 1)
    }

    /// Record `ident` as the declaring occurrence of `object`.
    pub fn define(&mut self, ident: &Ident, object: Option<ObjectId>) {
        self.info.defs.insert(ident.id, object);
    }

    /// Record `ident` as a reference to `object`.
    pub fn refer(&mut self, ident: &Ident, object: ObjectId) {
        self.info.uses.insert(ident.id, object);
    }

    /// Record the static type of `ident`.
    pub fn record_type(&mut self, ident: &Ident, ty: Type) {
        self.info.types.insert(ident.id, ty);
    }

    /// Mark the `nth` occurrence of `needle` as a comment.
    pub fn comment(&mut self, file: FileHandle, needle: &str, nth: usize) -> Option<Span> {
        let span = self.span_of(file, needle, nth)?;
        self.entry(file)?.2.push(span);
        Some(span)
    }

    /// Attach the syntax tree of `file`: a root node spanning the whole file
    /// with `children` as its top-level declarations.
    pub fn set_root(&mut self, file: FileHandle, children: Vec<SyntaxNode>) -> Option<()> {
        let source = self.source(file)?;
        let root = SyntaxNode::other(
            "File",
            source.pos(0),
            source.pos(source.content().len()),
            children,
        );
        self.entry(file)?.1 = Some(root);
        Some(())
    }

    pub fn finish(self) -> AnalyzedPackage {
        let fset = self.fset;
        let files = self
            .files
            .into_iter()
            .map(|(uri, root, comments)| {
                let root = root.unwrap_or_else(|| {
                    let (pos, end) = fset
                        .file_by_uri(&uri)
                        .map(|s| (s.pos(0), s.pos(s.content().len())))
                        .unwrap_or((Pos::NONE, Pos::NONE));
                    SyntaxNode::other("File", pos, end, Vec::new())
                });
                AnalyzedFile {
                    uri,
                    root,
                    comments,
                }
            })
            .collect();
        AnalyzedPackage {
            import_path: self.import_path,
            name: self.name,
            fset,
            files,
            objects: self.objects,
            info: self.info,
        }
    }
}
