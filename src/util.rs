/// Utility functions for the symnav server.
///
/// This module contains URI checks, UTF-16 column conversion, and a few
/// `Backend` helpers (client logging, workspace root access).
use std::path::{Path, PathBuf};

use tower_lsp::lsp_types::*;

use crate::Backend;

/// Whether `uri` names a file the server can address.
///
/// Only `file://` URIs carrying a path are accepted.  When `root` is
/// known the file must also live below it.
pub fn is_uri(uri: &Url, root: Option<&Path>) -> bool {
    if uri.scheme() != "file" {
        return false;
    }
    let Some(path) = uri_to_path(uri) else {
        return false;
    };
    match root {
        Some(root) => path.starts_with(root),
        None => true,
    }
}

/// Convert a `file://` URI to a filesystem path.
pub fn uri_to_path(uri: &Url) -> Option<PathBuf> {
    if uri.scheme() != "file" {
        return None;
    }
    uri.to_file_path().ok()
}

/// Convert a byte column within `line` to a UTF-16 column.
pub fn byte_col_to_utf16(line: &str, byte_col: usize) -> u32 {
    let byte_col = byte_col.min(line.len());
    line.char_indices()
        .take_while(|(idx, _)| *idx < byte_col)
        .map(|(_, ch)| ch.len_utf16() as u32)
        .sum()
}

/// Convert a UTF-16 column within `line` to a byte column, clamping to the
/// end of the line.
pub fn utf16_to_byte_col(line: &str, character: u32) -> usize {
    let mut units = 0u32;
    for (idx, ch) in line.char_indices() {
        if units >= character {
            return idx;
        }
        units += ch.len_utf16() as u32;
    }
    line.len()
}

impl Backend {
    pub(crate) async fn log(&self, typ: MessageType, message: String) {
        if let Some(client) = &self.client {
            client.log_message(typ, message).await;
        }
    }

    /// The workspace root recorded at `initialize`, if any.
    pub fn workspace_root(&self) -> Option<PathBuf> {
        self.workspace_root
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }
}
