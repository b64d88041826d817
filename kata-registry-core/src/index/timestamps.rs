//! Last-modified dates for bundles
//!
//! The index only carries `lastModified` when a real history source is
//! available. Without one the field is omitted, never defaulted.

use chrono::DateTime;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Supplies the date a set of files last changed
pub trait TimestampSource: Send + Sync {
    /// ISO-8601 date (`YYYY-MM-DD`) of the latest change to any of the
    /// paths, relative to the project root
    fn last_modified(&self, paths: &[String]) -> Option<String>;
}

/// No history available
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTimestamps;

impl TimestampSource for NoTimestamps {
    fn last_modified(&self, _paths: &[String]) -> Option<String> {
        None
    }
}

/// Dates from the last git commit touching the paths
#[derive(Debug, Clone)]
pub struct GitTimestamps {
    root: PathBuf,
}

impl GitTimestamps {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Use git only when `root` is inside a work tree
    pub fn detect(root: &Path) -> Option<Self> {
        let output = Command::new("git")
            .arg("-C")
            .arg(root)
            .args(["rev-parse", "--is-inside-work-tree"])
            .output()
            .ok()?;

        if output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "true" {
            Some(Self::new(root))
        } else {
            debug!("No git work tree at {:?}; lastModified will be omitted", root);
            None
        }
    }
}

impl TimestampSource for GitTimestamps {
    fn last_modified(&self, paths: &[String]) -> Option<String> {
        if paths.is_empty() {
            return None;
        }

        let output = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(["log", "-1", "--format=%cI", "--"])
            .args(paths)
            .output()
            .ok()?;

        if !output.status.success() {
            debug!(
                "git log failed for {:?}: {}",
                paths,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }

        parse_commit_date(String::from_utf8_lossy(&output.stdout).trim())
    }
}

/// Reduce a strict ISO-8601 commit timestamp to its date
pub fn parse_commit_date(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
}
