//! Registry manifest parsing (registry.json)
//!
//! The manifest is the authoring source of the registry: it lists every
//! component with its display metadata and the source files that make up
//! its bundle. Everything else in the index is derived from these files.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::IndexError;

/// Default item type for components that do not declare one
pub const DEFAULT_ITEM_TYPE: &str = "registry:block";

/// Names taken by the index artifacts served next to the items
pub const RESERVED_NAMES: [&str; 3] = ["index", "index-compact", "component-index"];

/// The registry manifest (registry.json)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryManifest {
    /// JSON schema reference
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Registry name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Registry homepage URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    /// All authored components
    #[serde(default)]
    pub items: Vec<ManifestItem>,
}

/// One authored component
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestItem {
    /// Component slug
    pub name: String,

    /// Registry item type (e.g. "registry:block")
    #[serde(rename = "type", default = "default_item_type")]
    pub item_type: String,

    /// Display title (defaults to the name)
    #[serde(default)]
    pub title: Option<String>,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Explicit category; derived from the name when absent
    #[serde(default)]
    pub category: Option<String>,

    /// Free-form labels in authoring order
    #[serde(default)]
    pub tags: Vec<String>,

    /// npm packages the component needs
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Other registry items the component needs
    #[serde(default)]
    pub registry_dependencies: Vec<String>,

    /// Source files of the bundle
    #[serde(default)]
    pub files: Vec<ManifestFile>,
}

/// A source file reference inside a manifest item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFile {
    /// Path relative to the project root (e.g. "registry/blocks/hero1/hero1.tsx")
    pub path: String,

    /// File type (e.g. "registry:block", "registry:component")
    #[serde(rename = "type", default = "default_item_type")]
    pub file_type: String,
}

fn default_item_type() -> String {
    DEFAULT_ITEM_TYPE.to_string()
}

impl RegistryManifest {
    /// Load the manifest from a file path
    pub fn from_file(path: &Path) -> Result<Self, IndexError> {
        let content = std::fs::read_to_string(path).map_err(|source| IndexError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| IndexError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse the manifest from a JSON string
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Items that are not in the given template set
    pub fn buildable_items<'a>(
        &'a self,
        templates: &'a [String],
    ) -> impl Iterator<Item = &'a ManifestItem> + 'a {
        self.items
            .iter()
            .filter(move |item| !templates.iter().any(|t| t == &item.name))
    }
}

impl ManifestItem {
    /// Title to display, falling back to the name
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.name)
    }

    /// Explicit category, if a non-empty one was authored
    pub fn explicit_category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }
}

/// Validate a component slug: lowercase alphanumeric with hyphens, and not
/// one of the artifact names in [`RESERVED_NAMES`]
pub fn validate_name(name: &str) -> Result<(), IndexError> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if name.is_empty() || !valid_chars || name.starts_with('-') || name.ends_with('-') {
        return Err(IndexError::InvalidName {
            name: name.to_string(),
        });
    }

    if RESERVED_NAMES.contains(&name) {
        return Err(IndexError::ReservedName {
            name: name.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod manifest_tests {
    use super::*;

    fn sample_manifest() -> &'static str {
        r#"{
  "$schema": "https://ui.shadcn.com/schema/registry.json",
  "name": "shadcn-registry",
  "homepage": "https://example.com",
  "items": [
    {
      "name": "hello-world",
      "type": "registry:block",
      "title": "Hello World",
      "description": "Template item",
      "files": [{ "path": "registry/new-york/hello-world.tsx", "type": "registry:component" }]
    },
    {
      "name": "hero1",
      "type": "registry:block",
      "title": "Hero 1",
      "description": "A hero section",
      "dependencies": ["lucide-react"],
      "registryDependencies": ["button", "@kata-shadcn/logo"],
      "files": [{ "path": "registry/blocks/hero1/hero1.tsx", "type": "registry:block" }]
    },
    {
      "name": "logo",
      "files": [{ "path": "registry/components/shared/logo.tsx", "type": "registry:component" }]
    }
  ]
}"#
    }

    #[test]
    fn test_parse_manifest() {
        let manifest = RegistryManifest::from_json(sample_manifest()).unwrap();
        assert_eq!(manifest.items.len(), 3);
        assert_eq!(manifest.name.as_deref(), Some("shadcn-registry"));

        let hero = &manifest.items[1];
        assert_eq!(hero.dependencies, vec!["lucide-react"]);
        assert_eq!(hero.registry_dependencies, vec!["button", "@kata-shadcn/logo"]);
        assert_eq!(hero.files[0].file_type, "registry:block");
    }

    #[test]
    fn test_defaults_for_sparse_item() {
        let manifest = RegistryManifest::from_json(sample_manifest()).unwrap();
        let logo = &manifest.items[2];

        assert_eq!(logo.item_type, DEFAULT_ITEM_TYPE);
        assert_eq!(logo.display_title(), "logo");
        assert_eq!(logo.description, "");
        assert!(logo.explicit_category().is_none());
        assert!(logo.tags.is_empty());
    }

    #[test]
    fn test_buildable_items_skip_templates() {
        let manifest = RegistryManifest::from_json(sample_manifest()).unwrap();
        let templates = vec!["hello-world".to_string()];

        let names: Vec<&str> = manifest
            .buildable_items(&templates)
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["hero1", "logo"]);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("hero1").is_ok());
        assert!(validate_name("file-upload-form-1").is_ok());

        assert!(validate_name("").is_err());
        assert!(validate_name("Hero1").is_err());
        assert!(validate_name("hero_1").is_err());
        assert!(validate_name("-hero").is_err());
        assert!(validate_name("hero-").is_err());
    }

    #[test]
    fn test_artifact_names_are_reserved() {
        for name in RESERVED_NAMES {
            assert!(matches!(
                validate_name(name),
                Err(IndexError::ReservedName { .. })
            ));
        }
        assert!(validate_name("index1").is_ok());
        assert!(validate_name("search-index").is_ok());
    }

    #[test]
    fn test_empty_category_is_not_explicit() {
        let json = r#"{"items":[{"name":"cta1","category":"","files":[]}]}"#;
        let manifest = RegistryManifest::from_json(json).unwrap();
        assert!(manifest.items[0].explicit_category().is_none());
    }
}
