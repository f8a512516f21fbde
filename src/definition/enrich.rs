//! Best-effort symbol descriptor enrichment.
//!
//! Enrichment never fails a request.  [`Enricher::enrich`] returns an
//! [`Enrichment`] carrying the descriptor when one could be computed and
//! the failure otherwise, which the caller logs.
use std::path::Path;

use thiserror::Error;

use crate::analysis::{AnalyzedPackage, RequestContext};
use crate::refs::{DefInfo, RefsError};
use crate::symbol::{FindPackageFunc, PackageCache, SymbolDescriber, SymbolError};
use crate::types::{Pos, SymbolDescriptor, SyntaxNode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrichError {
    #[error("definition info: {0}")]
    DefInfo(#[from] RefsError),
    #[error("describe symbol: {0}")]
    Describe(#[from] SymbolError),
}

/// Outcome of enriching one declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub descriptor: Option<SymbolDescriptor>,
    /// Why `descriptor` is absent, when it is absent because of a failure.
    pub diagnostic: Option<EnrichError>,
}

impl Enrichment {
    /// Enrichment was not attempted.
    pub fn skipped() -> Self {
        Self::default()
    }
}

impl From<Result<SymbolDescriptor, EnrichError>> for Enrichment {
    fn from(result: Result<SymbolDescriptor, EnrichError>) -> Self {
        match result {
            Ok(descriptor) => Enrichment {
                descriptor: Some(descriptor),
                diagnostic: None,
            },
            Err(err) => Enrichment {
                descriptor: None,
                diagnostic: Some(err),
            },
        }
    }
}

/// Everything enrichment needs besides the declaration itself.
pub struct Enricher<'a> {
    pub def_info: &'a dyn DefInfo,
    pub describer: &'a dyn SymbolDescriber,
    pub cache: &'a PackageCache,
    pub find_package: &'a FindPackageFunc,
    pub root_path: &'a Path,
}

impl Enricher<'_> {
    /// Describe the declaration at `pos`, reached from the cursor through
    /// `path_nodes`.
    pub fn enrich(
        &self,
        ctx: &RequestContext,
        pkg: &AnalyzedPackage,
        path_nodes: &[&SyntaxNode],
        pos: Pos,
    ) -> Enrichment {
        self.describe(ctx, pkg, path_nodes, pos).into()
    }

    fn describe(
        &self,
        ctx: &RequestContext,
        pkg: &AnalyzedPackage,
        path_nodes: &[&SyntaxNode],
        pos: Pos,
    ) -> Result<SymbolDescriptor, EnrichError> {
        let def = self.def_info.def_info(pkg, path_nodes, pos)?;
        let desc = self.describer.describe(
            ctx,
            pkg,
            self.cache,
            self.root_path,
            &def,
            self.find_package,
        )?;
        Ok(desc)
    }
}
