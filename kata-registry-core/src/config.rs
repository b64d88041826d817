//! Project configuration (kata-registry.yaml)
//!
//! Every field is optional; a missing file means all defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::gate::DEFAULT_GATE_PREFIX;
use crate::index::{DEFAULT_CATEGORY_CAP, DEFAULT_SCOPE, DEFAULT_TEMPLATES};

/// Default config file name, relative to the project root
pub const DEFAULT_CONFIG_FILE: &str = "kata-registry.yaml";

/// Project configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RegistryConfig {
    /// Authoring manifest
    pub manifest: PathBuf,

    /// Output directory for registry items and discovery indexes
    pub public_dir: PathBuf,

    /// Output directory for component-index.json
    pub lib_dir: PathBuf,

    /// Segment to category map
    pub category_map: PathBuf,

    /// Scope used in install commands and qualified imports
    pub scope: String,

    /// Manifest items that are never published
    pub templates: Vec<String>,

    /// Largest share of the index one category may hold before the lint warns
    pub category_cap: f64,

    /// Path prefix guarded by the access gate
    pub gate_prefix: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("registry.json"),
            public_dir: PathBuf::from("public/r"),
            lib_dir: PathBuf::from("lib"),
            category_map: PathBuf::from("lib/category-collapse.json"),
            scope: DEFAULT_SCOPE.to_string(),
            templates: DEFAULT_TEMPLATES.iter().map(|t| t.to_string()).collect(),
            category_cap: DEFAULT_CATEGORY_CAP,
            gate_prefix: DEFAULT_GATE_PREFIX.to_string(),
        }
    }
}

impl RegistryConfig {
    /// Load from a specific path; a missing file yields the defaults
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
        let config: Self = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `kata-registry.yaml` from a project root
    pub fn load(root: &Path) -> Result<Self> {
        Self::load_from_path(&root.join(DEFAULT_CONFIG_FILE))
    }

    fn validate(&self) -> Result<()> {
        if !(self.category_cap > 0.0 && self.category_cap <= 1.0) {
            anyhow::bail!(
                "category_cap must be in (0, 1], got {}",
                self.category_cap
            );
        }
        if !self.gate_prefix.starts_with('/')
            || self.gate_prefix.ends_with('/')
            || self.gate_prefix.contains(':')
        {
            anyhow::bail!(
                "gate_prefix must be a path like '/r' (leading '/', no trailing '/'), got '{}'",
                self.gate_prefix
            );
        }
        Ok(())
    }

    /// Config paths resolved against a project root
    pub fn paths(&self, root: &Path) -> ProjectPaths {
        ProjectPaths {
            root: root.to_path_buf(),
            manifest: root.join(&self.manifest),
            public_dir: root.join(&self.public_dir),
            lib_dir: root.join(&self.lib_dir),
            category_map: root.join(&self.category_map),
        }
    }
}

/// Absolute locations of the project's inputs and outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub manifest: PathBuf,
    pub public_dir: PathBuf,
    pub lib_dir: PathBuf,
    pub category_map: PathBuf,
}
