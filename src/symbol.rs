//! Symbol descriptors.
//!
//! A symbol descriptor is the cross-reference identity of a declaration:
//! which package declares it, under which name and container, and whether
//! that package is vendored.  Descriptors are computed from the
//! [`Def`](crate::refs::Def) metadata of a declaration together with the
//! package metadata found through a [`FindPackageFunc`].
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::analysis::{AnalyzedPackage, RequestContext};
use crate::config::FindPackageStrategy;
use crate::refs::Def;
use crate::types::SymbolDescriptor;

/// Metadata about a package, as cached for descriptor lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    pub import_path: String,
    pub name: String,
    #[serde(default)]
    pub dir: PathBuf,
}

/// Package metadata shared across requests.
///
/// Written when snapshots are loaded; definition requests only read it.
#[derive(Debug, Default)]
pub struct PackageCache {
    packages: RwLock<HashMap<String, PackageInfo>>,
}

impl PackageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, info: PackageInfo) {
        self.packages.write().insert(info.import_path.clone(), info);
    }

    pub fn get(&self, import_path: &str) -> Option<PackageInfo> {
        self.packages.read().get(import_path).cloned()
    }

    /// First cached package whose import path satisfies `pred`.
    pub fn find(&self, pred: impl Fn(&PackageInfo) -> bool) -> Option<PackageInfo> {
        self.packages.read().values().find(|p| pred(p)).cloned()
    }

    pub fn len(&self) -> usize {
        self.packages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.read().is_empty()
    }
}

/// A package found by a [`FindPackageFunc`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundPackage {
    pub info: PackageInfo,
    /// Whether the package was resolved through a `vendor/` directory.
    pub vendored: bool,
}

/// Package-resolution strategy: `(cache, import_path, root_path) -> package`.
pub type FindPackageFunc =
    Arc<dyn Fn(&PackageCache, &str, &Path) -> Option<FoundPackage> + Send + Sync>;

/// Build the package-resolution strategy selected in the configuration.
pub fn find_package_func(strategy: FindPackageStrategy) -> FindPackageFunc {
    match strategy {
        FindPackageStrategy::Exact => Arc::new(find_exact),
        FindPackageStrategy::Vendored => Arc::new(find_vendored),
    }
}

fn find_exact(cache: &PackageCache, import_path: &str, _root: &Path) -> Option<FoundPackage> {
    cache.get(import_path).map(|info| FoundPackage {
        info,
        vendored: false,
    })
}

/// Prefer a copy of the package vendored under the workspace root, and fall
/// back to the exact import path.
fn find_vendored(cache: &PackageCache, import_path: &str, root: &Path) -> Option<FoundPackage> {
    let suffix = format!("/vendor/{}", import_path);
    let vendored = cache.find(|p| {
        p.import_path.ends_with(&suffix) && (root.as_os_str().is_empty() || p.dir.starts_with(root))
    });
    match vendored {
        Some(info) => Some(FoundPackage {
            info,
            vendored: true,
        }),
        None => find_exact(cache, import_path, root),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("package {0:?} not found")]
    PackageNotFound(String),
    #[error("request cancelled")]
    Cancelled,
}

/// The describe-symbol collaborator.
pub trait SymbolDescriber: Send + Sync {
    fn describe(
        &self,
        ctx: &RequestContext,
        pkg: &AnalyzedPackage,
        cache: &PackageCache,
        root_path: &Path,
        def: &Def,
        find_package: &FindPackageFunc,
    ) -> Result<SymbolDescriptor, SymbolError>;
}

/// Describes symbols from cached package metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageDescriber;

impl SymbolDescriber for PackageDescriber {
    fn describe(
        &self,
        ctx: &RequestContext,
        pkg: &AnalyzedPackage,
        cache: &PackageCache,
        root_path: &Path,
        def: &Def,
        find_package: &FindPackageFunc,
    ) -> Result<SymbolDescriptor, SymbolError> {
        if ctx.is_cancelled() {
            return Err(SymbolError::Cancelled);
        }

        let mut found = find_package(cache, &def.import_path, root_path);
        if found.is_none() && def.import_path == pkg.import_path {
            // The requesting package is always addressable, cached or not.
            found = Some(FoundPackage {
                info: PackageInfo {
                    import_path: pkg.import_path.clone(),
                    name: pkg.name.clone(),
                    dir: PathBuf::new(),
                },
                vendored: false,
            });
        }
        let found = found.ok_or_else(|| SymbolError::PackageNotFound(def.import_path.clone()))?;

        let (container, name) = match def.path.rsplit_once('.') {
            Some((container, name)) => (container, name),
            None => ("", def.path.as_str()),
        };

        let mut desc = SymbolDescriptor::new();
        desc.insert("package".to_string(), json!(found.info.import_path));
        desc.insert("packageName".to_string(), json!(found.info.name));
        desc.insert("name".to_string(), json!(name));
        desc.insert("container".to_string(), json!(container));
        desc.insert("kind".to_string(), json!(def.kind));
        desc.insert(
            "id".to_string(),
            json!(format!("{}/-/{}", found.info.import_path, def.path)),
        );
        desc.insert("vendor".to_string(), json!(found.vendored));
        Ok(desc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> PackageCache {
        let cache = PackageCache::new();
        cache.insert(PackageInfo {
            import_path: "github.com/acme/log".to_string(),
            name: "log".to_string(),
            dir: PathBuf::from("/go/src/github.com/acme/log"),
        });
        cache.insert(PackageInfo {
            import_path: "example.com/app/vendor/github.com/acme/log".to_string(),
            name: "log".to_string(),
            dir: PathBuf::from("/ws/vendor/github.com/acme/log"),
        });
        cache
    }

    #[test]
    fn exact_strategy_ignores_vendor_copies() {
        let find = find_package_func(FindPackageStrategy::Exact);
        let found = find(&cache(), "github.com/acme/log", Path::new("/ws")).unwrap();
        assert_eq!(found.info.import_path, "github.com/acme/log");
        assert!(!found.vendored);
    }

    #[test]
    fn vendored_strategy_prefers_vendor_copy_under_root() {
        let find = find_package_func(FindPackageStrategy::Vendored);
        let found = find(&cache(), "github.com/acme/log", Path::new("/ws")).unwrap();
        assert_eq!(
            found.info.import_path,
            "example.com/app/vendor/github.com/acme/log"
        );
        assert!(found.vendored);

        let found = find(&cache(), "github.com/acme/log", Path::new("/other")).unwrap();
        assert!(!found.vendored);
    }

    #[test]
    fn unknown_package_is_not_found() {
        let find = find_package_func(FindPackageStrategy::Vendored);
        assert!(find(&cache(), "github.com/acme/missing", Path::new("/ws")).is_none());
    }
}
