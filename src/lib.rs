use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tower_lsp::Client;

pub mod analysis;
pub mod config;
mod definition;
pub mod error;
pub mod refs;
mod server;
pub mod symbol;
pub mod types;
mod util;

pub use definition::enrich::{EnrichError, Enrichment};
pub use definition::location::{build_location, declaration_location, type_location};
pub use definition::lookup::{lookup_ident, object_of, type_lookup};
pub use definition::path::path_nodes;
pub use util::{is_uri, uri_to_path};

use analysis::TypeChecker;
use analysis::snapshot::SnapshotTypeChecker;
use config::Config;
use refs::{DefInfo, ScopeDefInfo};
use symbol::{PackageCache, PackageDescriber, SymbolDescriber};

pub struct Backend {
    name: String,
    version: String,
    client: Option<Client>,
    workspace_root: Arc<Mutex<Option<PathBuf>>>,
    config: Arc<Mutex<Config>>,
    /// Snapshots loaded from the configured index directory.
    snapshots: Arc<SnapshotTypeChecker>,
    /// The type checker definition requests go through.  Defaults to
    /// `snapshots`.
    type_checker: Arc<dyn TypeChecker>,
    def_info: Arc<dyn DefInfo>,
    describer: Arc<dyn SymbolDescriber>,
    /// Package metadata consulted during enrichment.
    package_cache: Arc<PackageCache>,
}

impl Backend {
    pub fn new(client: Client, config: Config) -> Self {
        let mut backend = Self::with_config(config);
        backend.client = Some(client);
        backend
    }

    /// A backend with no client connection, for tests.
    pub fn new_test() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let snapshots = Arc::new(SnapshotTypeChecker::new());
        Self {
            name: "symnav".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            client: None,
            workspace_root: Arc::new(Mutex::new(None)),
            config: Arc::new(Mutex::new(config)),
            type_checker: snapshots.clone(),
            snapshots,
            def_info: Arc::new(ScopeDefInfo),
            describer: Arc::new(PackageDescriber),
            package_cache: Arc::new(PackageCache::new()),
        }
    }

    /// Route definition requests through `type_checker` instead of the
    /// snapshot index.
    pub fn with_type_checker(mut self, type_checker: Arc<dyn TypeChecker>) -> Self {
        self.type_checker = type_checker;
        self
    }

    pub fn with_def_info(mut self, def_info: Arc<dyn DefInfo>) -> Self {
        self.def_info = def_info;
        self
    }

    pub fn with_describer(mut self, describer: Arc<dyn SymbolDescriber>) -> Self {
        self.describer = describer;
        self
    }

    pub fn with_workspace_root(self, root: PathBuf) -> Self {
        if let Ok(mut wr) = self.workspace_root.lock() {
            *wr = Some(root);
        }
        self
    }

    /// A copy of the current configuration.
    pub fn config(&self) -> Config {
        self.config
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn snapshots(&self) -> &SnapshotTypeChecker {
        &self.snapshots
    }

    pub fn package_cache(&self) -> &PackageCache {
        &self.package_cache
    }
}
