//! Dependency graph extraction
//!
//! Classifies every import of a bundle as internal to the bundle, a
//! reference to another registry component (a peer), or an external
//! module, and derives the ordered, de-duplicated `peerComponents` list.
//!
//! Peer names are resolved from:
//! - file ownership: any file of any manifest item, addressed by its
//!   registry path (`registry/...`) or consumer path (`block/...`,
//!   `components/...`), with or without the `@/` alias and extension
//! - scope-qualified specifiers (`@kata-shadcn/button`)
//! - block paths (`registry/blocks/<name>/...`, `block/<name>`), resolved
//!   structurally so that a removed component is reported as a dangling
//!   peer instead of being mistaken for an external module

use std::collections::{BTreeMap, HashSet};

use super::bundle::{to_consumer_path, BundleFile, ComponentBundle};
use super::error::IndexError;
use super::imports::{is_relative, scan_imports};
use super::manifest::ManifestItem;

const ALIAS_PREFIX: &str = "@/";

/// What an import specifier points at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportTarget {
    /// Another file of the same bundle
    Internal,
    /// Another registry component, by canonical name
    Peer(String),
    /// A package or module outside the registry, normalized
    External(String),
}

/// Resolves import specifiers to registry component names
#[derive(Debug, Clone, Default)]
pub struct PeerResolver {
    scope: String,
    owners: BTreeMap<String, String>,
}

impl PeerResolver {
    /// Create a resolver with no known files
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            owners: BTreeMap::new(),
        }
    }

    /// Create a resolver knowing every file of the given items
    pub fn from_items<'a>(
        scope: impl Into<String>,
        items: impl IntoIterator<Item = &'a ManifestItem>,
    ) -> Self {
        let mut resolver = Self::new(scope);
        for item in items {
            for file in &item.files {
                resolver.register(&item.name, &super::bundle::normalize_path(&file.path));
            }
        }
        resolver
    }

    /// Record that `registry_path` belongs to component `name`
    pub fn register(&mut self, name: &str, registry_path: &str) {
        let consumer_path = to_consumer_path(registry_path);
        for path in [registry_path, consumer_path.as_str()] {
            let key = module_key(path);
            if let Some(dir) = key.strip_suffix("/index") {
                self.owners.insert(dir.to_string(), name.to_string());
            }
            self.owners.insert(key, name.to_string());
        }
    }

    /// Registry scope used for qualified specifiers
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Classify a single specifier imported by `file` of `bundle`
    pub fn classify(
        &self,
        bundle: &ComponentBundle,
        file: &BundleFile,
        specifier: &str,
    ) -> ImportTarget {
        // Bare package specifiers keep their spelling; paths are normalized.
        let (key, external) = if is_relative(specifier) {
            let Some(resolved) = resolve_relative(&file.registry_path, specifier) else {
                return ImportTarget::External(specifier.to_string());
            };
            let target = module_key(&resolved);
            let inside = bundle.files().iter().any(|f| {
                let own = module_key(&f.registry_path);
                own == target || own.strip_suffix("/index") == Some(target.as_str())
            });
            if inside {
                return ImportTarget::Internal;
            }
            (target.clone(), target)
        } else if let Some(name) = self.scoped_name(specifier) {
            return self.peer_or_internal(bundle, name);
        } else if let Some(aliased) = specifier.strip_prefix(ALIAS_PREFIX) {
            let key = module_key(aliased);
            (key.clone(), key)
        } else {
            (module_key(specifier), specifier.to_string())
        };

        if let Some(owner) = self.owners.get(&key) {
            return self.peer_or_internal(bundle, owner);
        }

        if let Some(name) = structural_block_name(&key) {
            return self.peer_or_internal(bundle, name);
        }

        ImportTarget::External(external)
    }

    /// Classify every import of every file, files in canonical order and
    /// imports in source order
    pub fn classify_bundle(&self, bundle: &ComponentBundle) -> Result<Vec<ImportTarget>, IndexError> {
        let mut targets = Vec::new();
        for file in bundle.files() {
            let specifiers =
                scan_imports(&file.content).map_err(|e| IndexError::MalformedImport {
                    component: bundle.name.clone(),
                    file: file.registry_path.clone(),
                    detail: e.to_string(),
                })?;

            for specifier in specifiers {
                targets.push(self.classify(bundle, file, &specifier));
            }
        }
        Ok(targets)
    }

    /// Peers declared through scope-qualified `registryDependencies`
    pub fn declared_peers<'a>(&'a self, item: &'a ManifestItem) -> impl Iterator<Item = &'a str> + 'a {
        item.registry_dependencies
            .iter()
            .filter_map(move |dep| self.scoped_name(dep))
            .filter(move |name| *name != item.name)
    }

    fn scoped_name<'a>(&self, specifier: &'a str) -> Option<&'a str> {
        if self.scope.is_empty() {
            return None;
        }
        let rest = specifier.strip_prefix(self.scope.as_str())?.strip_prefix('/')?;
        let name = rest.split('/').next().unwrap_or(rest);
        let name = name.strip_suffix(".json").unwrap_or(name);
        (!name.is_empty()).then_some(name)
    }

    fn peer_or_internal(&self, bundle: &ComponentBundle, name: &str) -> ImportTarget {
        if name == bundle.name {
            ImportTarget::Internal
        } else {
            ImportTarget::Peer(name.to_string())
        }
    }
}

/// Ordered, duplicate-free peer names from classified imports
pub fn extract_peers<'a>(
    targets: &'a [ImportTarget],
    declared: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut peers = Vec::new();

    let imported = targets.iter().filter_map(|t| match t {
        ImportTarget::Peer(name) => Some(name.as_str()),
        _ => None,
    });

    for name in imported.chain(declared) {
        if seen.insert(name) {
            peers.push(name.to_string());
        }
    }

    peers
}

/// Path without extension and without a trailing `/index`
fn module_key(path: &str) -> String {
    let (dir, last) = match path.rfind('/') {
        Some(i) => (&path[..=i], &path[i + 1..]),
        None => ("", path),
    };
    let stem = match last.rfind('.') {
        Some(0) | None => last,
        Some(i) => &last[..i],
    };
    format!("{dir}{stem}")
}

/// Resolve `./x` or `../x` against the directory of `from`; `None` when the
/// path climbs above the project root
fn resolve_relative(from: &str, specifier: &str) -> Option<String> {
    let mut segments: Vec<&str> = from.split('/').collect();
    segments.pop();

    for part in specifier.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    Some(segments.join("/"))
}

fn structural_block_name(key: &str) -> Option<&str> {
    let rest = key
        .strip_prefix("registry/blocks/")
        .or_else(|| key.strip_prefix("block/"))?;
    let name = rest.split('/').next()?;
    (!name.is_empty()).then_some(name)
}
