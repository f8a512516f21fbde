/// `textDocument/definition` and `textDocument/typeDefinition`.
///
/// Both operations run [`Backend::handle_x_definition`] once and project
/// its results: `definition` keeps every declaration location,
/// `type_definition` keeps the type declaration locations of the results
/// that have one.
use std::path::PathBuf;

use tower_lsp::lsp_types::*;

use super::enrich::{Enricher, Enrichment};
use super::location::{declaration_location, type_location};
use super::lookup::lookup_ident;
use super::path::{invalid_node, path_nodes};
use crate::Backend;
use crate::analysis::{AnalyzedPackage, RequestContext};
use crate::error::DefinitionError;
use crate::symbol::find_package_func;
use crate::types::{Ident, NodeKind, Pos, SymbolLocationInformation, SyntaxNode};
use crate::util::is_uri;

impl Backend {
    /// Declaration locations for the identifier under the cursor.
    pub fn handle_definition(
        &self,
        ctx: &RequestContext,
        params: &TextDocumentPositionParams,
    ) -> Result<Vec<Location>, DefinitionError> {
        let res = self.handle_x_definition(ctx, params)?;
        Ok(res.into_iter().map(|info| info.location).collect())
    }

    /// Type declaration locations for the identifier under the cursor.
    pub fn handle_type_definition(
        &self,
        ctx: &RequestContext,
        params: &TextDocumentPositionParams,
    ) -> Result<Vec<Location>, DefinitionError> {
        let res = self.handle_x_definition(ctx, params)?;
        // Not everything with a definition also has a type definition.
        Ok(res
            .into_iter()
            .filter_map(|info| info.type_location)
            .collect())
    }

    /// Resolve the cursor to its declarations, with type locations and
    /// symbol descriptors.
    ///
    /// A cursor that is not on an identifier or type declaration (comments,
    /// strings, punctuation) yields an empty list, not an error.
    pub fn handle_x_definition(
        &self,
        ctx: &RequestContext,
        params: &TextDocumentPositionParams,
    ) -> Result<Vec<SymbolLocationInformation>, DefinitionError> {
        let uri = &params.text_document.uri;
        if !is_uri(uri, self.workspace_root().as_deref()) {
            return Err(DefinitionError::invalid_params(&ctx.method, uri));
        }

        match self.resolve_x_definition(ctx, uri, params.position) {
            Err(err) if err.is_invalid_node() => {
                tracing::debug!(method = %ctx.method, "{}", err);
                Ok(Vec::new())
            }
            other => other,
        }
    }

    fn resolve_x_definition(
        &self,
        ctx: &RequestContext,
        uri: &Url,
        position: Position,
    ) -> Result<Vec<SymbolLocationInformation>, DefinitionError> {
        let (pkg, pos) = self.type_checker.type_check(ctx, uri, position)?;

        let path = path_nodes(&pkg, pos)?;
        let Some(first) = path.first() else {
            return Err(invalid_node(&pkg, pos, "NoNode"));
        };
        match &first.kind {
            NodeKind::Ident(ident) => self.lookup_ident_definition(ctx, &pkg, &path, ident),
            // Clicking the `type` keyword resolves like clicking the name.
            NodeKind::TypeSpec { name } => self.lookup_ident_definition(ctx, &pkg, &path, name),
            NodeKind::Other { label } => Err(invalid_node(&pkg, pos, label)),
        }
    }

    fn lookup_ident_definition(
        &self,
        ctx: &RequestContext,
        pkg: &AnalyzedPackage,
        path: &[&SyntaxNode],
        ident: &Ident,
    ) -> Result<Vec<SymbolLocationInformation>, DefinitionError> {
        let Some(found) = lookup_ident(pkg, ident)? else {
            return Ok(Vec::new());
        };

        let Some(location) = declaration_location(&pkg.fset, &found) else {
            tracing::warn!(
                name = %found.name,
                pos = found.pos.0,
                "declaration position is not in the package's file set"
            );
            return Ok(Vec::new());
        };
        let type_location = found
            .type_name
            .as_ref()
            .and_then(|type_name| type_location(&pkg.fset, type_name));

        let enrichment = self.enrich(ctx, pkg, path, &found.name, found.pos);

        Ok(vec![SymbolLocationInformation {
            location,
            type_location,
            symbol: enrichment.descriptor,
        }])
    }

    fn enrich(
        &self,
        ctx: &RequestContext,
        pkg: &AnalyzedPackage,
        path: &[&SyntaxNode],
        name: &str,
        pos: Pos,
    ) -> Enrichment {
        let config = self.config();
        if !config.enrich {
            return Enrichment::skipped();
        }

        let find_package = find_package_func(config.find_package);
        let root_path = self.workspace_root().unwrap_or_else(PathBuf::new);
        let enricher = Enricher {
            def_info: self.def_info.as_ref(),
            describer: self.describer.as_ref(),
            cache: &self.package_cache,
            find_package: &find_package,
            root_path: &root_path,
        };

        let enrichment = enricher.enrich(ctx, pkg, path, pos);
        if let Some(err) = &enrichment.diagnostic {
            tracing::warn!(name = %name, "symbol enrichment failed: {}", err);
        }
        enrichment
    }
}
