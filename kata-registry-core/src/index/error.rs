//! Registry index error types with clear, actionable messages

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while deriving or validating the registry index.
///
/// Every variant is fatal to the build: the index is either produced whole
/// or not at all.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Failed to read the authoring manifest
    #[error("Failed to read registry manifest from {path}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the authoring manifest
    #[error("Failed to parse registry manifest {path} (invalid JSON or unexpected shape)")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Item name is not a valid slug
    #[error("Component name '{name}' must be lowercase alphanumeric with hyphens and cannot start or end with a hyphen")]
    InvalidName { name: String },

    /// Item name collides with an index artifact
    #[error("Component name '{name}' is reserved for a registry index file.\n\nRename the component in registry.json.")]
    ReservedName { name: String },

    /// A manifest item lists no files at all
    #[error("Component '{component}' has no files.\n\nEvery component needs at least one entry file in registry.json.")]
    EmptyBundle { component: String },

    /// A manifest item lists the same file twice
    #[error("Component '{component}' lists file '{path}' more than once")]
    DuplicateFile { component: String, path: String },

    /// A source file named by the manifest does not exist
    #[error("Missing source for component '{component}': {path}\n\nFix registry.json or restore the missing file.")]
    MissingSource { component: String, path: PathBuf },

    /// A source file exists but could not be read
    #[error("Failed to read source for component '{component}': {path}")]
    SourceRead {
        component: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An import statement could not be interpreted
    #[error("Unparseable import in component '{component}' ({file}): {detail}")]
    MalformedImport {
        component: String,
        file: String,
        detail: String,
    },

    /// Two entries share a name
    #[error("Duplicate component name '{name}' in registry index")]
    DuplicateName { name: String },

    /// An entry references a peer that is not part of the index
    #[error("Component '{component}' references peer '{peer}', which is not in the registry.\n\nAdd '{peer}' to registry.json or remove the import.")]
    DanglingPeer { component: String, peer: String },

    /// A content hash is not 64 lowercase hex characters
    #[error("Component '{component}' has malformed content hash '{hash}' (expected 64 lowercase hex characters)")]
    MalformedHash { component: String, hash: String },

    /// Failed to read or parse the category collapse map
    #[error("Category collapse map {path} is invalid: {detail}\n\nRun 'kata-registry bootstrap-categories' to generate it.")]
    CategoryMap { path: PathBuf, detail: String },

    /// A derivation task panicked or was cancelled
    #[error("Derivation task for component '{component}' did not complete: {detail}")]
    TaskFailed { component: String, detail: String },
}

impl IndexError {
    /// Name of the component the error is about, when there is one
    pub fn component(&self) -> Option<&str> {
        match self {
            IndexError::EmptyBundle { component }
            | IndexError::DuplicateFile { component, .. }
            | IndexError::MissingSource { component, .. }
            | IndexError::SourceRead { component, .. }
            | IndexError::MalformedImport { component, .. }
            | IndexError::DanglingPeer { component, .. }
            | IndexError::MalformedHash { component, .. }
            | IndexError::TaskFailed { component, .. } => Some(component),
            IndexError::InvalidName { name }
            | IndexError::ReservedName { name }
            | IndexError::DuplicateName { name } => Some(name),
            IndexError::ManifestRead { .. }
            | IndexError::ManifestParse { .. }
            | IndexError::CategoryMap { .. } => None,
        }
    }
}
