//! Registry Index - build the component catalog from authored bundles
//!
//! Turns the authoring manifest (`registry.json`) and the source files it
//! names into a content-addressed, machine-readable catalog.
//!
//! # Overview
//!
//! For every component the builder derives:
//! - complexity (`files`, `lines`, `dependencies`)
//! - a SHA-256 content hash over the bundle's files
//! - the peer components it imports
//! - its category, install command and last-modified date
//!
//! The resulting `RegistryIndex` is sorted by name and closed over peer
//! references. It is produced whole or not at all.
//!
//! # Architecture
//!
//! ```text
//! registry.json ──► ComponentBundle (per item)
//!                        │
//!                        ├── Complexity
//!                        ├── content hash
//!                        └── peerComponents
//!                        │
//!                        ▼
//!                  RegistryIndex (validated)
//!                        │
//!                        ▼
//!     public/r/{name}.json, public/r/index.json,
//!     public/r/index-compact.json, lib/component-index.json
//! ```

mod artifacts;
mod builder;
mod bundle;
mod category;
mod complexity;
mod entry;
mod error;
mod hasher;
mod imports;
mod lint;
mod manifest;
mod peers;
mod registry;
mod timestamps;

pub use artifacts::{
    write_atomic, AgentIndex, AgentIndexItem, CompactIndex, CompactIndexItem, RegistryItem,
    RegistryItemFile, RenderedArtifacts, AGENT_INDEX_FILE, COMPACT_INDEX_FILE,
    COMPONENT_INDEX_FILE, REGISTRY_ITEM_SCHEMA,
};
pub use builder::{
    category_lint, BuildOutput, BuildReport, BuiltComponent, IndexBuilder, DEFAULT_SCOPE,
    DEFAULT_TEMPLATES,
};
pub use bundle::{normalize_path, to_consumer_path, BundleFile, ComponentBundle};
pub use category::{
    bootstrap, cap_count, derive_segment, oversized_groups, title_case, CategoryMap,
    OversizedGroup, DEFAULT_CATEGORY_CAP,
};
pub use complexity::{count_lines, estimate, Complexity};
pub use entry::{install_command, ComponentIndexEntry};
pub use error::IndexError;
pub use hasher::{hash_bundle, hash_files, is_valid_hash, HASH_LEN};
pub use imports::scan_imports;
pub use lint::{lint, LintFinding};
pub use manifest::{validate_name, ManifestFile, ManifestItem, RegistryManifest, RESERVED_NAMES};
pub use peers::{extract_peers, ImportTarget, PeerResolver};
pub use registry::RegistryIndex;
pub use timestamps::{GitTimestamps, NoTimestamps, TimestampSource};

#[cfg(test)]
mod tests;
