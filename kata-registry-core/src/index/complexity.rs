//! Complexity estimation for a component bundle

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::bundle::ComponentBundle;
use super::peers::ImportTarget;

/// Size metrics of one bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Complexity {
    /// Number of files (always at least one)
    pub files: usize,
    /// Total newline-delimited lines across all files
    pub lines: usize,
    /// Distinct imports that leave the bundle (packages and peers)
    pub dependencies: usize,
}

/// Derive complexity from a bundle and its classified imports
pub fn estimate(bundle: &ComponentBundle, imports: &[ImportTarget]) -> Complexity {
    let lines = bundle.files().iter().map(|f| count_lines(&f.content)).sum();

    let dependencies = imports
        .iter()
        .filter(|t| !matches!(t, ImportTarget::Internal))
        .collect::<HashSet<_>>()
        .len();

    Complexity {
        files: bundle.files().len(),
        lines,
        dependencies,
    }
}

/// Count lines; an unterminated final line still counts, an empty file has none
pub fn count_lines(content: &str) -> usize {
    if content.is_empty() {
        return 0;
    }
    let newlines = content.matches('\n').count();
    if content.ends_with('\n') {
        newlines
    } else {
        newlines + 1
    }
}
