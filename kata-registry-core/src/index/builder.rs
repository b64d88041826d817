//! Index build orchestration
//!
//! Loads every buildable manifest item into a bundle, derives its entry on
//! the blocking pool, then orders and validates the whole set. Any failure
//! aborts the build; there is no partial index.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::bundle::ComponentBundle;
use super::category::{oversized_groups, CategoryMap, OversizedGroup, DEFAULT_CATEGORY_CAP};
use super::complexity;
use super::entry::{dedupe_tags, install_command, ComponentIndexEntry};
use super::error::IndexError;
use super::hasher::hash_bundle;
use super::manifest::{validate_name, ManifestItem, RegistryManifest};
use super::peers::{extract_peers, PeerResolver};
use super::registry::RegistryIndex;
use super::timestamps::{NoTimestamps, TimestampSource};

/// Default registry scope
pub const DEFAULT_SCOPE: &str = "@kata-shadcn";

/// Scaffolding items that are never published
pub const DEFAULT_TEMPLATES: [&str; 4] = [
    "hello-world",
    "example-form",
    "complex-component",
    "example-with-css",
];

/// One derived component with the sources it was derived from
#[derive(Debug, Clone)]
pub struct BuiltComponent {
    pub entry: ComponentIndexEntry,
    pub item: ManifestItem,
    pub bundle: ComponentBundle,
}

/// Counts and lint findings of a build
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub built: usize,
    pub skipped: usize,
    pub oversized: Vec<OversizedGroup>,
}

/// Result of a successful build
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub index: RegistryIndex,
    /// Components in index order
    pub components: Vec<BuiltComponent>,
    pub report: BuildReport,
}

/// Shared, read-only inputs of per-component derivation
struct DeriveContext {
    root: PathBuf,
    scope: String,
    resolver: PeerResolver,
    categories: Arc<CategoryMap>,
    timestamps: Arc<dyn TimestampSource>,
}

/// Builds a `RegistryIndex` from a manifest and the files it names
pub struct IndexBuilder {
    root: PathBuf,
    scope: String,
    templates: Vec<String>,
    category_cap: f64,
    categories: Arc<CategoryMap>,
    timestamps: Arc<dyn TimestampSource>,
}

impl IndexBuilder {
    /// Builder for a project root with the default scope and templates
    pub fn new(root: impl Into<PathBuf>, categories: CategoryMap) -> Self {
        Self {
            root: root.into(),
            scope: DEFAULT_SCOPE.to_string(),
            templates: DEFAULT_TEMPLATES.iter().map(|t| t.to_string()).collect(),
            category_cap: DEFAULT_CATEGORY_CAP,
            categories: Arc::new(categories),
            timestamps: Arc::new(NoTimestamps),
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_templates(mut self, templates: Vec<String>) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_category_cap(mut self, cap: f64) -> Self {
        self.category_cap = cap;
        self
    }

    pub fn with_timestamps(mut self, timestamps: Arc<dyn TimestampSource>) -> Self {
        self.timestamps = timestamps;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Derive, order and validate the index
    pub async fn build(&self, manifest: &RegistryManifest) -> Result<BuildOutput, IndexError> {
        let items: Vec<ManifestItem> = manifest.buildable_items(&self.templates).cloned().collect();
        let skipped = manifest.items.len() - items.len();

        for item in &items {
            validate_name(&item.name)?;
        }

        info!(
            "Building registry index: {} components ({} templates skipped)",
            items.len(),
            skipped
        );

        let context = Arc::new(DeriveContext {
            root: self.root.clone(),
            scope: self.scope.clone(),
            resolver: PeerResolver::from_items(&self.scope, &items),
            categories: Arc::clone(&self.categories),
            timestamps: Arc::clone(&self.timestamps),
        });

        let mut tasks = JoinSet::new();
        for (position, item) in items.into_iter().enumerate() {
            let context = Arc::clone(&context);
            tasks.spawn(async move {
                let name = item.name.clone();
                let result = tokio::task::spawn_blocking(move || derive_component(&context, item))
                    .await
                    .map_err(|e| IndexError::TaskFailed {
                        component: name,
                        detail: e.to_string(),
                    })
                    .and_then(|r| r);
                (position, result)
            });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let (position, result) = joined.map_err(|e| IndexError::TaskFailed {
                component: "<unknown>".to_string(),
                detail: e.to_string(),
            })?;
            results.push((position, result));
        }

        // Report the failure of the earliest manifest item, whatever finished first
        results.sort_by_key(|(position, _)| *position);
        let mut components = results
            .into_iter()
            .map(|(_, result)| result)
            .collect::<Result<Vec<_>, _>>()?;

        components.sort_by(|a, b| a.entry.name.cmp(&b.entry.name));
        let index = RegistryIndex::from_entries(components.iter().map(|c| c.entry.clone()).collect())?;

        let oversized = category_lint(&index, self.category_cap);
        let report = BuildReport {
            built: index.len(),
            skipped,
            oversized,
        };

        info!(
            "Registry index built: {} entries, {} categories",
            report.built,
            index.categories().len()
        );

        Ok(BuildOutput {
            index,
            components,
            report,
        })
    }
}

/// Derive one entry; runs on the blocking pool
fn derive_component(context: &DeriveContext, item: ManifestItem) -> Result<BuiltComponent, IndexError> {
    let bundle = ComponentBundle::load(&context.root, &item)?;

    let targets = context.resolver.classify_bundle(&bundle)?;
    let complexity = complexity::estimate(&bundle, &targets);
    let peer_components = extract_peers(&targets, context.resolver.declared_peers(&item));
    let content_hash = hash_bundle(&bundle);

    let paths: Vec<String> = bundle.files().iter().map(|f| f.registry_path.clone()).collect();
    let last_modified = context.timestamps.last_modified(&paths);

    debug!(
        "Derived {}: {} files, {} lines, {} peers",
        item.name,
        complexity.files,
        complexity.lines,
        peer_components.len()
    );

    let entry = ComponentIndexEntry {
        name: item.name.clone(),
        title: item.display_title().to_string(),
        description: item.description.clone(),
        category: context.categories.resolve(&item),
        install_command: install_command(&context.scope, &item.name),
        tags: dedupe_tags(&item.tags),
        complexity,
        content_hash,
        last_modified,
        peer_components,
    };

    Ok(BuiltComponent {
        entry,
        item,
        bundle,
    })
}

/// Warn about categories that exceed the cap; never fails the build
pub fn category_lint(index: &RegistryIndex, cap: f64) -> Vec<OversizedGroup> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for entry in index {
        *counts.entry(entry.category.clone()).or_default() += 1;
    }

    let oversized = oversized_groups(&counts, cap);
    for group in &oversized {
        warn!(
            "Category '{}' holds {} of {} components ({:.1}%, cap {:.0}%)",
            group.key,
            group.count,
            index.len(),
            group.percent,
            cap * 100.0
        );
    }
    oversized
}
