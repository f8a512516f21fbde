/// LSP server trait implementation.
///
/// This module contains the `impl LanguageServer for Backend` block,
/// which handles the LSP protocol messages the server supports
/// (initialize, initialized, shutdown, definition, typeDefinition).
use tower_lsp::LanguageServer;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;

use crate::Backend;
use crate::analysis::RequestContext;

impl Backend {
    /// Load the snapshots of the configured index directory, if any.
    async fn load_index(&self) {
        let Some(dir) = self.config().index_dir else {
            self.log(
                MessageType::WARNING,
                "symnav: no index directory configured; definitions are unavailable".to_string(),
            )
            .await;
            return;
        };

        match self.snapshots.load_dir(&dir, &self.package_cache) {
            Ok(summary) => {
                for failure in &summary.failures {
                    self.log(MessageType::WARNING, format!("skipped {}", failure))
                        .await;
                }
                self.log(
                    MessageType::INFO,
                    format!(
                        "symnav initialized! Loaded {} package snapshot(s) from {}",
                        summary.loaded,
                        dir.display()
                    ),
                )
                .await;
            }
            Err(err) => {
                tracing::error!("{}", err);
                self.log(MessageType::ERROR, err.to_string()).await;
            }
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let workspace_root = params
            .root_uri
            .as_ref()
            .and_then(|uri| uri.to_file_path().ok());

        if let Some(root) = workspace_root
            && let Ok(mut wr) = self.workspace_root.lock()
        {
            *wr = Some(root);
        }

        if let Some(options) = params.initialization_options
            && let Ok(mut config) = self.config.lock()
            && let Err(err) = config.apply_initialization_options(options)
        {
            tracing::warn!("ignoring initialization options: {}", err);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                definition_provider: Some(OneOf::Left(true)),
                type_definition_provider: Some(TypeDefinitionProviderCapability::Simple(true)),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: self.name.clone(),
                version: Some(self.version.clone()),
            }),
            offset_encoding: None,
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.load_index().await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let ctx = RequestContext::new("textDocument/definition");
        let _cancel_on_drop = ctx.cancel.clone().drop_guard();

        let locations = self.handle_definition(&ctx, &params.text_document_position_params)?;
        Ok(Some(GotoDefinitionResponse::Array(locations)))
    }

    async fn goto_type_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let ctx = RequestContext::new("textDocument/typeDefinition");
        let _cancel_on_drop = ctx.cancel.clone().drop_guard();

        let locations = self.handle_type_definition(&ctx, &params.text_document_position_params)?;
        Ok(Some(GotoDefinitionResponse::Array(locations)))
    }
}
