//! Build artifacts
//!
//! A successful build renders to:
//! - `public/r/{name}.json`: the installable registry item, one per component
//! - `public/r/index.json`: agent discovery index
//! - `public/r/index-compact.json`: minified discovery index
//! - `lib/component-index.json`: the `ComponentIndexEntry[]` registry index
//!
//! Rendering happens in memory so the server can hand out exactly the bytes
//! the build writes. Writing is two-phase: every file is first staged as a
//! temporary file next to its target, and only once all of them are staged
//! are they renamed into place, item files first and the indexes last. A
//! failure while staging leaves the previous artifacts untouched. The
//! renames themselves are not one transaction; a rename failing part way
//! through leaves new items beside the previous indexes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use super::builder::{BuildOutput, BuiltComponent};
use super::entry::ComponentIndexEntry;

/// Schema reference embedded in every registry item
pub const REGISTRY_ITEM_SCHEMA: &str = "https://ui.shadcn.com/schema/registry-item.json";

/// Description embedded in the agent index
pub const AGENT_INDEX_DESCRIPTION: &str = "Machine-readable index of all available registry components. Fetch /r/{name}.json to get full source. Requires x-registry-token header.";

pub const AGENT_INDEX_FILE: &str = "index.json";
pub const COMPACT_INDEX_FILE: &str = "index-compact.json";
pub const COMPONENT_INDEX_FILE: &str = "component-index.json";

/// Installable payload of one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryItem {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub title: String,
    pub description: String,
    pub files: Vec<RegistryItemFile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub registry_dependencies: Vec<String>,
}

/// A file inside a registry item, addressed by consumer path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryItemFile {
    pub path: String,
    pub content: String,
    #[serde(rename = "type")]
    pub file_type: String,
}

impl RegistryItem {
    pub fn from_component(component: &BuiltComponent) -> Self {
        let item = &component.item;
        Self {
            schema: REGISTRY_ITEM_SCHEMA.to_string(),
            name: item.name.clone(),
            item_type: item.item_type.clone(),
            title: item.display_title().to_string(),
            description: item.description.clone(),
            files: component
                .bundle
                .files()
                .iter()
                .map(|f| RegistryItemFile {
                    path: f.consumer_path.clone(),
                    content: f.content.clone(),
                    file_type: f.file_type.clone(),
                })
                .collect(),
            dependencies: item.dependencies.clone(),
            registry_dependencies: item.registry_dependencies.clone(),
        }
    }
}

/// Discovery index for agents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIndex {
    #[serde(rename = "_description")]
    pub description: String,
    pub total: usize,
    pub items: Vec<AgentIndexItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIndexItem {
    pub name: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub url: String,
}

/// Minified discovery index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactIndex {
    pub total: usize,
    pub items: Vec<CompactIndexItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactIndexItem {
    pub name: String,
    pub category: String,
    pub url: String,
}

impl AgentIndex {
    pub fn from_entries(entries: &[ComponentIndexEntry]) -> Self {
        Self {
            description: AGENT_INDEX_DESCRIPTION.to_string(),
            total: entries.len(),
            items: entries
                .iter()
                .map(|e| AgentIndexItem {
                    name: e.name.clone(),
                    title: e.title.clone(),
                    description: e.description.clone(),
                    category: e.category.clone(),
                    url: e.url(),
                })
                .collect(),
        }
    }
}

impl CompactIndex {
    pub fn from_entries(entries: &[ComponentIndexEntry]) -> Self {
        Self {
            total: entries.len(),
            items: entries
                .iter()
                .map(|e| CompactIndexItem {
                    name: e.name.clone(),
                    category: e.category.clone(),
                    url: e.url(),
                })
                .collect(),
        }
    }
}

/// Serialized artifacts of one build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedArtifacts {
    /// Registry item JSON by component name
    pub items: BTreeMap<String, String>,
    pub agent_index: String,
    pub compact_index: String,
    pub component_index: String,
}

impl RenderedArtifacts {
    /// Render every artifact of a build
    pub fn render(output: &BuildOutput) -> serde_json::Result<Self> {
        let mut items = BTreeMap::new();
        for component in &output.components {
            let item = RegistryItem::from_component(component);
            items.insert(item.name.clone(), pretty(&item)?);
        }

        let entries = output.index.entries();
        Ok(Self {
            items,
            agent_index: pretty(&AgentIndex::from_entries(entries))?,
            compact_index: serde_json::to_string(&CompactIndex::from_entries(entries))? + "\n",
            component_index: output.index.to_json_pretty()?,
        })
    }

    /// Write everything; returns the number of files written
    pub fn write(&self, public_dir: &Path, lib_dir: &Path) -> Result<usize> {
        std::fs::create_dir_all(public_dir)
            .with_context(|| format!("Failed to create {}", public_dir.display()))?;
        std::fs::create_dir_all(lib_dir)
            .with_context(|| format!("Failed to create {}", lib_dir.display()))?;

        let staged = self.stage(public_dir, lib_dir)?;
        let written = staged.len();
        for file in staged {
            file.commit()?;
        }

        Ok(written)
    }

    /// Stage every file in commit order; nothing is visible until committed
    fn stage(&self, public_dir: &Path, lib_dir: &Path) -> Result<Vec<StagedFile>> {
        let mut staged = Vec::with_capacity(self.items.len() + 3);
        for (name, json) in &self.items {
            staged.push(StagedFile::new(&public_dir.join(format!("{name}.json")), json)?);
        }
        staged.push(StagedFile::new(&lib_dir.join(COMPONENT_INDEX_FILE), &self.component_index)?);
        staged.push(StagedFile::new(&public_dir.join(AGENT_INDEX_FILE), &self.agent_index)?);
        staged.push(StagedFile::new(&public_dir.join(COMPACT_INDEX_FILE), &self.compact_index)?);
        Ok(staged)
    }
}

/// Fully written temporary file waiting to be renamed over its target.
/// Dropping it without committing removes the temporary file.
struct StagedFile {
    tmp: NamedTempFile,
    path: PathBuf,
}

impl StagedFile {
    fn new(path: &Path, contents: &str) -> Result<Self> {
        let parent = path
            .parent()
            .with_context(|| format!("No parent directory for {}", path.display()))?;

        let mut tmp = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;
        tmp.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to stage {}", path.display()))?;
        tmp.flush()?;

        Ok(Self {
            tmp,
            path: path.to_path_buf(),
        })
    }

    fn commit(self) -> Result<()> {
        let Self { tmp, path } = self;
        tmp.persist(&path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        debug!("Wrote {}", path.display());
        Ok(())
    }
}

fn pretty<T: Serialize>(value: &T) -> serde_json::Result<String> {
    Ok(serde_json::to_string_pretty(value)? + "\n")
}

/// Replace `path` with `contents` without exposing a half-written file
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    StagedFile::new(path, contents)?.commit()
}
