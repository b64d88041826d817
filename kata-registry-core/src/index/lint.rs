//! Registry lint checks
//!
//! Findings here are advisory and never fail a build. Unlike the build,
//! which stops at the first broken component, the lint reports every
//! finding it can see in one pass.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::bundle::normalize_path;
use super::category::{oversized_groups, CategoryMap};
use super::error::IndexError;
use super::manifest::{validate_name, RegistryManifest};

/// Source directory scanned for files no manifest item claims
pub const REGISTRY_SOURCE_DIR: &str = "registry";

const SOURCE_EXTENSIONS: [&str; 5] = ["tsx", "ts", "jsx", "js", "css"];

/// One lint finding
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LintFinding {
    /// A category holds more than its share of the registry
    OversizedCategory {
        category: String,
        count: usize,
        percent: f64,
    },
    /// A manifest item names a file that does not exist
    MissingSource { component: String, path: String },
    /// A source file under `registry/` that no item lists
    UnlistedFile { path: String },
    /// An item name that is not a valid slug
    InvalidName { component: String },
    /// An item name taken by an index artifact
    ReservedName { component: String },
    /// An item name that appears more than once
    DuplicateName { component: String },
}

impl std::fmt::Display for LintFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LintFinding::OversizedCategory {
                category,
                count,
                percent,
            } => write!(f, "category '{category}' has {count} components ({percent:.1}%)"),
            LintFinding::MissingSource { component, path } => {
                write!(f, "{component}: missing source {path}")
            }
            LintFinding::UnlistedFile { path } => write!(f, "{path} is not listed by any component"),
            LintFinding::InvalidName { component } => write!(f, "'{component}' is not a valid name"),
            LintFinding::ReservedName { component } => {
                write!(f, "'{component}' is reserved for an index file")
            }
            LintFinding::DuplicateName { component } => write!(f, "'{component}' is listed more than once"),
        }
    }
}

/// Run every check over the manifest and the project tree
pub fn lint(
    root: &Path,
    manifest: &RegistryManifest,
    categories: &CategoryMap,
    templates: &[String],
    cap: f64,
) -> Vec<LintFinding> {
    let mut findings = lint_names(manifest, templates);
    findings.extend(lint_sources(root, manifest));
    findings.extend(lint_categories(manifest, categories, templates, cap));
    findings
}

/// Invalid and repeated item names
pub fn lint_names(manifest: &RegistryManifest, templates: &[String]) -> Vec<LintFinding> {
    let mut seen = BTreeSet::new();
    let mut findings = Vec::new();

    for item in manifest.buildable_items(templates) {
        match validate_name(&item.name) {
            Ok(()) => {}
            Err(IndexError::ReservedName { .. }) => findings.push(LintFinding::ReservedName {
                component: item.name.clone(),
            }),
            Err(_) => findings.push(LintFinding::InvalidName {
                component: item.name.clone(),
            }),
        }
        if !seen.insert(item.name.as_str()) {
            findings.push(LintFinding::DuplicateName {
                component: item.name.clone(),
            });
        }
    }

    findings
}

/// Missing sources, and sources nobody lists
pub fn lint_sources(root: &Path, manifest: &RegistryManifest) -> Vec<LintFinding> {
    let mut findings = Vec::new();
    let mut listed = BTreeSet::new();

    for item in &manifest.items {
        for file in &item.files {
            let path = normalize_path(&file.path);
            if !root.join(&path).is_file() {
                findings.push(LintFinding::MissingSource {
                    component: item.name.clone(),
                    path: path.clone(),
                });
            }
            listed.insert(path);
        }
    }

    let source_dir = root.join(REGISTRY_SOURCE_DIR);
    let mut unlisted: Vec<String> = walkdir::WalkDir::new(&source_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path().is_file()
                && e.path()
                    .extension()
                    .map(|ext| SOURCE_EXTENSIONS.iter().any(|s| ext == *s))
                    .unwrap_or(false)
        })
        .filter_map(|e| {
            let relative = e.path().strip_prefix(root).ok()?;
            Some(normalize_path(&relative.to_string_lossy()))
        })
        .filter(|path| !listed.contains(path))
        .collect();
    unlisted.sort();

    findings.extend(unlisted.into_iter().map(|path| LintFinding::UnlistedFile { path }));
    findings
}

/// Categories above the cap, using the categories a build would assign
pub fn lint_categories(
    manifest: &RegistryManifest,
    categories: &CategoryMap,
    templates: &[String],
    cap: f64,
) -> Vec<LintFinding> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for item in manifest.buildable_items(templates) {
        *counts.entry(categories.resolve(item)).or_default() += 1;
    }

    oversized_groups(&counts, cap)
        .into_iter()
        .map(|group| LintFinding::OversizedCategory {
            category: group.key,
            count: group.count,
            percent: group.percent,
        })
        .collect()
}
