//! Error taxonomy for definition requests.
//!
//! [`DefinitionError`] covers every way a definition request can fail.
//! `InvalidNode` is the one soft condition: the operation handlers turn it
//! into an empty result instead of reporting it.  Enrichment failures have
//! their own error types ([`RefsError`](crate::refs::RefsError),
//! [`SymbolError`](crate::symbol::SymbolError)) and never become a
//! `DefinitionError`.
use thiserror::Error;
use tower_lsp::jsonrpc;
use tower_lsp::lsp_types::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// The request targets a document outside the addressable workspace.
    #[error("{method} not yet supported for out-of-workspace URI ({uri:?})")]
    InvalidParams { method: String, uri: String },

    /// The cursor is not on an identifier or type declaration.
    #[error("invalid node: {node} at {uri}:{line}:{character}")]
    InvalidNode {
        node: String,
        uri: String,
        line: u32,
        character: u32,
    },

    /// The identifier is not recorded in the use or definition index.
    #[error("definition not found")]
    NotFound,

    /// No analysis snapshot covers the requested document.
    #[error("no package found for {uri}")]
    NoPackage { uri: Url },

    #[error("request cancelled")]
    Cancelled,

    /// Any other failure reported by the type checker.
    #[error("{0}")]
    Analysis(String),
}

impl DefinitionError {
    pub fn invalid_params(method: &str, uri: &Url) -> Self {
        DefinitionError::InvalidParams {
            method: method.to_string(),
            uri: uri.to_string(),
        }
    }

    pub fn is_invalid_node(&self) -> bool {
        matches!(self, DefinitionError::InvalidNode { .. })
    }
}

impl From<DefinitionError> for jsonrpc::Error {
    fn from(err: DefinitionError) -> Self {
        match err {
            DefinitionError::InvalidParams { .. } => jsonrpc::Error::invalid_params(err.to_string()),
            DefinitionError::Cancelled => jsonrpc::Error {
                code: jsonrpc::ErrorCode::RequestCancelled,
                message: err.to_string().into(),
                data: None,
            },
            other => jsonrpc::Error {
                code: jsonrpc::ErrorCode::InternalError,
                message: other.to_string().into(),
                data: None,
            },
        }
    }
}
