//! The served registry snapshot

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::index::{BuildOutput, RenderedArtifacts};

/// One immutable, fully rendered build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySnapshot {
    artifacts: RenderedArtifacts,
}

impl RegistrySnapshot {
    pub fn new(artifacts: RenderedArtifacts) -> Self {
        Self { artifacts }
    }

    /// Render a build into a servable snapshot
    pub fn from_build(output: &BuildOutput) -> serde_json::Result<Self> {
        Ok(Self::new(RenderedArtifacts::render(output)?))
    }

    /// Registry item JSON for a component
    pub fn item(&self, name: &str) -> Option<&str> {
        self.artifacts.items.get(name).map(String::as_str)
    }

    pub fn agent_index(&self) -> &str {
        &self.artifacts.agent_index
    }

    pub fn compact_index(&self) -> &str {
        &self.artifacts.compact_index
    }

    pub fn component_index(&self) -> &str {
        &self.artifacts.component_index
    }

    pub fn len(&self) -> usize {
        self.artifacts.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.items.is_empty()
    }
}

/// Holds the current snapshot; readers clone the `Arc`, writers swap it
#[derive(Debug, Default)]
pub struct RegistryStore {
    current: RwLock<Arc<RegistrySnapshot>>,
}

impl RegistryStore {
    pub fn new(snapshot: RegistrySnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot in effect right now
    pub async fn current(&self) -> Arc<RegistrySnapshot> {
        Arc::clone(&*self.current.read().await)
    }

    /// Swap in a new snapshot
    pub async fn replace(&self, snapshot: RegistrySnapshot) {
        let entries = snapshot.len();
        *self.current.write().await = Arc::new(snapshot);
        info!("Serving new registry snapshot ({} components)", entries);
    }

    /// Swap in a new snapshot unless it is identical; returns whether it changed
    pub async fn replace_if_changed(&self, snapshot: RegistrySnapshot) -> bool {
        if *self.current().await == snapshot {
            return false;
        }
        self.replace(snapshot).await;
        true
    }
}
