//! Component bundle loading
//!
//! A bundle is the set of source files that together implement one
//! installable component. Files are held in canonical order (sorted by
//! consumer path) so that every derivation over them is independent of
//! manifest or filesystem ordering.

use std::collections::BTreeSet;
use std::path::Path;

use super::error::IndexError;
use super::manifest::ManifestItem;

const BLOCKS_PREFIX: &str = "registry/blocks/";
const COMPONENTS_PREFIX: &str = "registry/components/";

/// One source file of a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    /// Path relative to the project root, forward slashes
    pub registry_path: String,
    /// Path the file is installed at on the consumer side
    pub consumer_path: String,
    /// Registry file type
    pub file_type: String,
    /// File contents
    pub content: String,
}

/// All files of one component, in canonical order
#[derive(Debug, Clone)]
pub struct ComponentBundle {
    pub name: String,
    files: Vec<BundleFile>,
}

impl ComponentBundle {
    /// Build a bundle from in-memory files, enforcing the bundle invariants
    pub fn new(name: impl Into<String>, mut files: Vec<BundleFile>) -> Result<Self, IndexError> {
        let name = name.into();

        if files.is_empty() {
            return Err(IndexError::EmptyBundle { component: name });
        }

        let mut seen = BTreeSet::new();
        for file in &files {
            if !seen.insert(file.consumer_path.as_str()) {
                return Err(IndexError::DuplicateFile {
                    component: name,
                    path: file.consumer_path.clone(),
                });
            }
        }

        files.sort_by(|a, b| a.consumer_path.cmp(&b.consumer_path));

        Ok(Self { name, files })
    }

    /// Read every file a manifest item lists, relative to the project root
    pub fn load(root: &Path, item: &ManifestItem) -> Result<Self, IndexError> {
        let mut files = Vec::with_capacity(item.files.len());

        for entry in &item.files {
            let registry_path = normalize_path(&entry.path);
            let source_path = root.join(&registry_path);

            if !source_path.is_file() {
                return Err(IndexError::MissingSource {
                    component: item.name.clone(),
                    path: source_path,
                });
            }

            let content =
                std::fs::read_to_string(&source_path).map_err(|source| IndexError::SourceRead {
                    component: item.name.clone(),
                    path: source_path.clone(),
                    source,
                })?;

            files.push(BundleFile {
                consumer_path: to_consumer_path(&registry_path),
                registry_path,
                file_type: entry.file_type.clone(),
                content,
            });
        }

        Self::new(item.name.clone(), files)
    }

    /// Files in canonical order
    pub fn files(&self) -> &[BundleFile] {
        &self.files
    }

    /// Whether a registry path belongs to this bundle
    pub fn contains_registry_path(&self, registry_path: &str) -> bool {
        self.files.iter().any(|f| f.registry_path == registry_path)
    }
}

/// Normalize a manifest path: forward slashes, no leading "./"
pub fn normalize_path(path: &str) -> String {
    let forward = path.replace('\\', "/");
    forward.trim_start_matches("./").to_string()
}

/// Map a registry source path to the path the consumer installs it at
///
/// `registry/blocks/about1/about1.tsx` becomes `block/about1.tsx` and
/// `registry/components/shared/logo.tsx` becomes `components/shared/logo.tsx`.
/// Other paths are kept as-is.
pub fn to_consumer_path(registry_path: &str) -> String {
    if let Some(rest) = registry_path.strip_prefix(BLOCKS_PREFIX) {
        let basename = rest.rsplit('/').next().unwrap_or(rest);
        return format!("block/{basename}");
    }
    if let Some(rest) = registry_path.strip_prefix(COMPONENTS_PREFIX) {
        return format!("components/{rest}");
    }
    registry_path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::manifest::ManifestFile;
    use tempfile::TempDir;

    fn file(registry_path: &str, content: &str) -> BundleFile {
        BundleFile {
            registry_path: registry_path.to_string(),
            consumer_path: to_consumer_path(registry_path),
            file_type: "registry:block".to_string(),
            content: content.to_string(),
        }
    }

    fn item(name: &str, paths: &[&str]) -> ManifestItem {
        ManifestItem {
            name: name.to_string(),
            item_type: "registry:block".to_string(),
            title: None,
            description: String::new(),
            category: None,
            tags: vec![],
            dependencies: vec![],
            registry_dependencies: vec![],
            files: paths
                .iter()
                .map(|p| ManifestFile {
                    path: p.to_string(),
                    file_type: "registry:block".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_consumer_paths() {
        assert_eq!(
            to_consumer_path("registry/blocks/about1/about1.tsx"),
            "block/about1.tsx"
        );
        assert_eq!(
            to_consumer_path("registry/components/shared/logo.tsx"),
            "components/shared/logo.tsx"
        );
        assert_eq!(to_consumer_path("lib/utils.ts"), "lib/utils.ts");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path("./registry\\blocks\\hero1\\hero1.tsx"),
            "registry/blocks/hero1/hero1.tsx"
        );
    }

    #[test]
    fn test_files_sorted_canonically() {
        let bundle = ComponentBundle::new(
            "card",
            vec![
                file("registry/blocks/card/z.tsx", ""),
                file("registry/blocks/card/a.tsx", ""),
            ],
        )
        .unwrap();

        let paths: Vec<&str> = bundle.files().iter().map(|f| f.consumer_path.as_str()).collect();
        assert_eq!(paths, vec!["block/a.tsx", "block/z.tsx"]);
    }

    #[test]
    fn test_empty_bundle_rejected() {
        let err = ComponentBundle::new("card", vec![]).unwrap_err();
        assert!(matches!(err, IndexError::EmptyBundle { .. }));
    }

    #[test]
    fn test_duplicate_consumer_path_rejected() {
        let err = ComponentBundle::new(
            "card",
            vec![
                file("registry/blocks/card/card.tsx", "a"),
                file("registry/blocks/other/card.tsx", "b"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, IndexError::DuplicateFile { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("registry/blocks/card");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("card.tsx"), "export const Card = 1;\n").unwrap();

        let bundle =
            ComponentBundle::load(temp_dir.path(), &item("card", &["registry/blocks/card/card.tsx"]))
                .unwrap();

        assert_eq!(bundle.files().len(), 1);
        assert_eq!(bundle.files()[0].consumer_path, "block/card.tsx");
        assert!(bundle.contains_registry_path("registry/blocks/card/card.tsx"));
    }

    #[test]
    fn test_load_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let err =
            ComponentBundle::load(temp_dir.path(), &item("card", &["registry/blocks/card/card.tsx"]))
                .unwrap_err();

        match err {
            IndexError::MissingSource { component, path } => {
                assert_eq!(component, "card");
                assert!(path.ends_with("registry/blocks/card/card.tsx"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
