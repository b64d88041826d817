//! Index entry schema
//!
//! One `ComponentIndexEntry` per installable component. Field names are
//! serialized in camelCase exactly as clients consume them.

use serde::{Deserialize, Serialize};

use super::complexity::Complexity;

/// A row of the registry index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentIndexEntry {
    /// Unique slug, primary key of the index
    pub name: String,

    /// Display title
    pub title: String,

    /// Description
    pub description: String,

    /// Category (open taxonomy)
    pub category: String,

    /// Command that installs the component
    pub install_command: String,

    /// Free-form labels, authoring order
    #[serde(default)]
    pub tags: Vec<String>,

    /// Bundle size metrics
    pub complexity: Complexity,

    /// SHA-256 of the bundle's file set, lowercase hex
    pub content_hash: String,

    /// Date of the last change to the bundle, when history is available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,

    /// Other components this one imports
    #[serde(default)]
    pub peer_components: Vec<String>,
}

/// Install command for a component of the given scope
pub fn install_command(scope: &str, name: &str) -> String {
    format!("npx shadcn add {scope}/{name}")
}

impl ComponentIndexEntry {
    /// Registry URL of the full component payload
    pub fn url(&self) -> String {
        format!("/r/{}.json", self.name)
    }

    /// Check the install command against the name-derived form
    pub fn has_derived_install_command(&self, scope: &str) -> bool {
        self.install_command == install_command(scope, &self.name)
    }

    /// Whether the entry matches a lowercase query on name, description,
    /// category or tags
    pub fn matches(&self, query_lower: &str) -> bool {
        self.name.to_lowercase().contains(query_lower)
            || self.description.to_lowercase().contains(query_lower)
            || self.category.to_lowercase().contains(query_lower)
            || self
                .tags
                .iter()
                .any(|t| t.to_lowercase().contains(query_lower))
    }

    /// Truncate description to first line
    pub fn short_description(&self) -> &str {
        self.description
            .lines()
            .next()
            .unwrap_or(&self.description)
            .trim()
    }
}

/// Remove repeated tags, keeping the first occurrence
pub fn dedupe_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !out.contains(tag) {
            out.push(tag.clone());
        }
    }
    out
}
