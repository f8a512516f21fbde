/// Analysis snapshots.
///
/// An external indexer writes one JSON file per package into an index
/// directory.  Each snapshot holds the [`AnalyzedPackage`] itself plus the
/// metadata of the packages it imports, which is fed into the
/// [`PackageCache`] used during enrichment.
///
/// [`SnapshotTypeChecker`] answers `type_check` requests from the loaded
/// snapshots: it finds the package owning the document, converts the
/// editor position into an analyzer position and rejects positions that
/// do not land in the syntax tree (comments, past the end of the file).
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_lsp::lsp_types::{Position, Url};

use super::{AnalyzedPackage, FileSetError, RequestContext, TypeChecker};
use crate::error::DefinitionError;
use crate::symbol::{PackageCache, PackageInfo};
use crate::types::Pos;

/// On-disk shape of one snapshot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub package: AnalyzedPackage,
    /// Directory the package's sources live in.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Packages imported by `package`.
    #[serde(default)]
    pub imports: Vec<PackageInfo>,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid file positions in snapshot {path}: {source}")]
    InvalidFileSet {
        path: PathBuf,
        #[source]
        source: FileSetError,
    },
}

/// Outcome of loading an index directory.
#[derive(Debug, Default)]
pub struct LoadSummary {
    /// Number of snapshots loaded.
    pub loaded: usize,
    /// Snapshots that were skipped, with the reason.
    pub failures: Vec<SnapshotError>,
}

/// A [`TypeChecker`] serving precomputed analysis results.
#[derive(Debug, Default)]
pub struct SnapshotTypeChecker {
    packages: RwLock<Vec<Arc<AnalyzedPackage>>>,
}

impl SnapshotTypeChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_packages(packages: impl IntoIterator<Item = AnalyzedPackage>) -> Self {
        Self {
            packages: RwLock::new(packages.into_iter().map(Arc::new).collect()),
        }
    }

    /// Load every `*.json` snapshot in `dir`, registering each package and
    /// its imports in `cache`.  A snapshot that cannot be read, parsed or
    /// validated is skipped and reported in the summary; only an unreadable
    /// directory is an error.
    pub fn load_dir(&self, dir: &Path, cache: &PackageCache) -> Result<LoadSummary, SnapshotError> {
        let entries = std::fs::read_dir(dir).map_err(|source| SnapshotError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut summary = LoadSummary::default();
        for path in &paths {
            match Self::read_snapshot(path) {
                Ok(snapshot) => {
                    self.insert_snapshot(snapshot, cache);
                    summary.loaded += 1;
                }
                Err(err) => {
                    tracing::warn!("skipping snapshot: {}", err);
                    summary.failures.push(err);
                }
            }
        }
        tracing::info!(
            loaded = summary.loaded,
            skipped = summary.failures.len(),
            dir = %dir.display(),
            "loaded analysis snapshots"
        );
        Ok(summary)
    }

    /// Read and validate one snapshot file.
    pub fn read_snapshot(path: &Path) -> Result<Snapshot, SnapshotError> {
        let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: Snapshot =
            serde_json::from_str(&content).map_err(|source| SnapshotError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        snapshot
            .package
            .fset
            .validate()
            .map_err(|source| SnapshotError::InvalidFileSet {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(snapshot)
    }

    /// Add (or replace) a snapshot's package and register its metadata.
    pub fn insert_snapshot(&self, snapshot: Snapshot, cache: &PackageCache) {
        let Snapshot {
            package,
            dir,
            imports,
        } = snapshot;
        cache.insert(PackageInfo {
            import_path: package.import_path.clone(),
            name: package.name.clone(),
            dir: dir.unwrap_or_default(),
        });
        for import in imports {
            cache.insert(import);
        }
        self.insert(package);
    }

    /// Add (or replace) a package, keyed by import path.
    pub fn insert(&self, package: AnalyzedPackage) {
        let mut packages = self.packages.write();
        packages.retain(|p| p.import_path != package.import_path);
        packages.push(Arc::new(package));
    }

    pub fn len(&self) -> usize {
        self.packages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.read().is_empty()
    }

    fn package_for(&self, uri: &Url) -> Option<Arc<AnalyzedPackage>> {
        self.packages
            .read()
            .iter()
            .find(|p| p.file_by_uri(uri).is_some())
            .cloned()
    }
}

impl TypeChecker for SnapshotTypeChecker {
    fn type_check(
        &self,
        ctx: &RequestContext,
        uri: &Url,
        position: Position,
    ) -> Result<(Arc<AnalyzedPackage>, Pos), DefinitionError> {
        if ctx.is_cancelled() {
            return Err(DefinitionError::Cancelled);
        }

        let pkg = self
            .package_for(uri)
            .ok_or_else(|| DefinitionError::NoPackage { uri: uri.clone() })?;

        let invalid = |node: &str| DefinitionError::InvalidNode {
            node: node.to_string(),
            uri: uri.to_string(),
            line: position.line,
            character: position.character,
        };

        let pos = pkg
            .fset
            .pos_for(uri, position)
            .ok_or_else(|| invalid("EOF"))?;

        let file = pkg.file_by_uri(uri).ok_or_else(|| invalid("File"))?;
        if file.comments.iter().any(|c| c.pos <= pos && pos < c.end) {
            return Err(invalid("Comment"));
        }

        tracing::debug!(uri = %uri, pos = pos.0, package = %pkg.import_path, "type-checked");
        Ok((pkg, pos))
    }
}
