//! The registry index artifact and its queries
//!
//! A `RegistryIndex` is an immutable snapshot: entries sorted by name,
//! names unique, every peer reference closed over the index. It can only be
//! constructed through validation.

use serde::Serialize;
use std::collections::{BTreeSet, HashSet, VecDeque};

use super::entry::ComponentIndexEntry;
use super::error::IndexError;
use super::hasher::is_valid_hash;

/// Validated, name-ordered sequence of index entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RegistryIndex {
    entries: Vec<ComponentIndexEntry>,
}

impl RegistryIndex {
    /// Sort and validate entries into an index
    pub fn from_entries(mut entries: Vec<ComponentIndexEntry>) -> Result<Self, IndexError> {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        validate(&entries)?;
        Ok(Self { entries })
    }

    /// Parse and validate a serialized `ComponentIndexEntry[]`
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let entries: Vec<ComponentIndexEntry> = serde_json::from_str(content)?;
        Ok(Self::from_entries(entries)?)
    }

    /// Pretty JSON with a trailing newline
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)? + "\n")
    }

    pub fn entries(&self) -> &[ComponentIndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by name
    pub fn get(&self, name: &str) -> Option<&ComponentIndexEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Case-insensitive search over name, description, category and tags
    pub fn search(&self, query: &str) -> Vec<&ComponentIndexEntry> {
        let query_lower = query.to_lowercase();
        self.entries.iter().filter(|e| e.matches(&query_lower)).collect()
    }

    /// Entries of one category (exact match)
    pub fn filter_by_category(&self, category: &str) -> Vec<&ComponentIndexEntry> {
        self.entries.iter().filter(|e| e.category == category).collect()
    }

    /// Sorted distinct categories
    pub fn categories(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|e| e.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Every component reachable from `name` through peer references
    ///
    /// Breadth-first with a visited set, so cycles terminate. The start
    /// component is never part of the result, even when a cycle leads back
    /// to it. Returns `None` for unknown names.
    pub fn transitive_peers(&self, name: &str) -> Option<Vec<&str>> {
        let start = self.get(name)?;

        let mut visited: HashSet<&str> = HashSet::from([start.name.as_str()]);
        let mut queue: VecDeque<&ComponentIndexEntry> = VecDeque::from([start]);
        let mut reachable = Vec::new();

        while let Some(entry) = queue.pop_front() {
            for peer in &entry.peer_components {
                if !visited.insert(peer.as_str()) {
                    continue;
                }
                reachable.push(peer.as_str());
                if let Some(next) = self.get(peer) {
                    queue.push_back(next);
                }
            }
        }

        Some(reachable)
    }

    /// Entries that list `name` as a peer
    pub fn dependents(&self, name: &str) -> Vec<&ComponentIndexEntry> {
        self.entries
            .iter()
            .filter(|e| e.peer_components.iter().any(|p| p == name))
            .collect()
    }
}

impl<'a> IntoIterator for &'a RegistryIndex {
    type Item = &'a ComponentIndexEntry;
    type IntoIter = std::slice::Iter<'a, ComponentIndexEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Check the global invariants over name-sorted entries
fn validate(entries: &[ComponentIndexEntry]) -> Result<(), IndexError> {
    for pair in entries.windows(2) {
        if pair[0].name == pair[1].name {
            return Err(IndexError::DuplicateName {
                name: pair[0].name.clone(),
            });
        }
    }

    for entry in entries {
        if !is_valid_hash(&entry.content_hash) {
            return Err(IndexError::MalformedHash {
                component: entry.name.clone(),
                hash: entry.content_hash.clone(),
            });
        }
    }

    let names: HashSet<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    for entry in entries {
        for peer in &entry.peer_components {
            if !names.contains(peer.as_str()) {
                return Err(IndexError::DanglingPeer {
                    component: entry.name.clone(),
                    peer: peer.clone(),
                });
            }
        }
    }

    Ok(())
}
