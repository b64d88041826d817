//! Project loading shared by the commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use kata_registry_core::config::{ProjectPaths, RegistryConfig};
use kata_registry_core::index::{
    BuildOutput, CategoryMap, GitTimestamps, IndexBuilder, NoTimestamps, RegistryManifest,
    TimestampSource,
};

/// A registry project: root, config and resolved paths
#[derive(Debug, Clone)]
pub struct Project {
    pub config: RegistryConfig,
    pub paths: ProjectPaths,
}

impl Project {
    /// Load the project at `root`, with an optional explicit config file
    pub fn load(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("Project root not found: {}", root.display()))?;

        let config = match config_path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                RegistryConfig::load_from_path(path)?
            }
            None => RegistryConfig::load(&root)?,
        };
        debug!("Loaded project config: {:?}", config);

        let paths = config.paths(&root);
        Ok(Self { config, paths })
    }

    pub fn root(&self) -> &PathBuf {
        &self.paths.root
    }

    pub fn manifest(&self) -> Result<RegistryManifest> {
        Ok(RegistryManifest::from_file(&self.paths.manifest)?)
    }

    pub fn categories(&self) -> Result<CategoryMap> {
        Ok(CategoryMap::from_file(&self.paths.category_map)?)
    }

    pub fn builder(&self) -> Result<IndexBuilder> {
        let timestamps: Arc<dyn TimestampSource> = match GitTimestamps::detect(self.root()) {
            Some(git) => Arc::new(git),
            None => Arc::new(NoTimestamps),
        };

        Ok(IndexBuilder::new(self.root(), self.categories()?)
            .with_scope(&self.config.scope)
            .with_templates(self.config.templates.clone())
            .with_category_cap(self.config.category_cap)
            .with_timestamps(timestamps))
    }

    /// Build the index in memory
    pub async fn build(&self) -> Result<BuildOutput> {
        let manifest = self.manifest()?;
        let output = self
            .builder()?
            .build(&manifest)
            .await
            .context("Registry index build failed")?;
        Ok(output)
    }
}
