//! Category derivation and the category-collapse map
//!
//! Components without an explicit category are grouped by the segment of
//! their name (`hero12` -> `hero`, `file-upload-form-1` -> `file`). The
//! collapse map (lib/category-collapse.json) folds segments into display
//! categories.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::error::IndexError;
use super::manifest::ManifestItem;

/// Default share of the index a single category may hold before the lint warns
pub const DEFAULT_CATEGORY_CAP: f64 = 0.15;

/// Segment to category mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryMap {
    pub segments: BTreeMap<String, String>,
}

impl CategoryMap {
    /// Load the map from a JSON object of string values
    pub fn from_file(path: &Path) -> Result<Self, IndexError> {
        if !path.exists() {
            return Err(IndexError::CategoryMap {
                path: path.to_path_buf(),
                detail: "file not found".to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| IndexError::CategoryMap {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

        Self::from_json(&content).map_err(|detail| IndexError::CategoryMap {
            path: path.to_path_buf(),
            detail,
        })
    }

    /// Parse the map; it must be a JSON object whose values are all strings
    pub fn from_json(content: &str) -> Result<Self, String> {
        let raw: serde_json::Value = serde_json::from_str(content).map_err(|e| e.to_string())?;

        let object = raw
            .as_object()
            .ok_or_else(|| "must be a JSON object".to_string())?;

        let mut segments = BTreeMap::new();
        for (key, value) in object {
            let category = value.as_str().ok_or_else(|| {
                format!("values must be strings; key \"{key}\" is not a string")
            })?;
            segments.insert(key.clone(), category.to_string());
        }

        Ok(Self { segments })
    }

    /// Category of a manifest item
    ///
    /// Resolution order:
    /// 1. Explicit non-empty category from the manifest
    /// 2. Collapse map entry for the name's segment
    /// 3. The segment itself
    pub fn resolve(&self, item: &ManifestItem) -> String {
        if let Some(category) = item.explicit_category() {
            return category.to_string();
        }
        let segment = derive_segment(&item.name);
        self.segments
            .get(segment)
            .cloned()
            .unwrap_or_else(|| segment.to_string())
    }

    /// Serialize as pretty JSON with a trailing newline
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        Ok(serde_json::to_string_pretty(self)? + "\n")
    }
}

/// Name segment used for category grouping
///
/// Takes the part before the first hyphen and strips trailing digits; falls
/// back to the part before the hyphen when nothing is left.
pub fn derive_segment(name: &str) -> &str {
    let before_hyphen = name.split('-').next().unwrap_or(name);
    let stripped = before_hyphen
        .trim_end_matches(|c: char| c.is_ascii_digit())
        .trim_end_matches('-');
    if stripped.is_empty() {
        before_hyphen
    } else {
        stripped
    }
}

/// Uppercase first letter, lowercase rest
pub fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// A group holding more than its share of the index
#[derive(Debug, Clone, PartialEq)]
pub struct OversizedGroup {
    pub key: String,
    pub count: usize,
    pub percent: f64,
}

/// Maximum number of entries a group may hold
pub fn cap_count(total: usize, cap: f64) -> usize {
    (total as f64 * cap).ceil() as usize
}

/// Groups whose count exceeds `ceil(total * cap)`, largest first
pub fn oversized_groups(counts: &BTreeMap<String, usize>, cap: f64) -> Vec<OversizedGroup> {
    let total: usize = counts.values().sum();
    let limit = cap_count(total, cap);

    let mut oversized: Vec<OversizedGroup> = counts
        .iter()
        .filter(|(_, count)| **count > limit)
        .map(|(key, count)| OversizedGroup {
            key: key.clone(),
            count: *count,
            percent: 100.0 * *count as f64 / total as f64,
        })
        .collect();

    oversized.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    oversized
}

/// Suggested collapse map for a set of item names
///
/// Every segment maps to its title-cased form, meant as a starting point for
/// hand-editing. Returns the map and the segment counts.
pub fn bootstrap<'a>(names: impl IntoIterator<Item = &'a str>) -> (CategoryMap, BTreeMap<String, usize>) {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for name in names {
        *counts.entry(derive_segment(name).to_string()).or_default() += 1;
    }

    let segments = counts
        .keys()
        .map(|segment| (segment.clone(), title_case(segment)))
        .collect();

    (CategoryMap { segments }, counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, category: Option<&str>) -> ManifestItem {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "category": category,
            "files": []
        }))
        .unwrap()
    }

    #[test]
    fn test_derive_segment() {
        assert_eq!(derive_segment("hero12"), "hero");
        assert_eq!(derive_segment("file-upload-form-1"), "file");
        assert_eq!(derive_segment("application-shell3"), "application");
        assert_eq!(derive_segment("project5e"), "project5e");
        assert_eq!(derive_segment("404"), "404");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("hero"), "Hero");
        assert_eq!(title_case("CTA"), "Cta");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_resolve_order() {
        let map = CategoryMap::from_json(r#"{"hero": "Heroes"}"#).unwrap();

        assert_eq!(map.resolve(&item("hero3", Some("Landing"))), "Landing");
        assert_eq!(map.resolve(&item("hero3", Some(""))), "Heroes");
        assert_eq!(map.resolve(&item("hero3", None)), "Heroes");
        assert_eq!(map.resolve(&item("pricing2", None)), "pricing");
    }

    #[test]
    fn test_from_json_rejects_bad_shapes() {
        assert!(CategoryMap::from_json("[]").unwrap_err().contains("object"));
        assert!(CategoryMap::from_json(r#"{"hero": 1}"#)
            .unwrap_err()
            .contains("\"hero\""));
        assert!(CategoryMap::from_json("not json").is_err());
    }

    #[test]
    fn test_from_file_missing() {
        let err = CategoryMap::from_file(Path::new("/nonexistent/category-collapse.json")).unwrap_err();
        assert!(matches!(err, IndexError::CategoryMap { .. }));
    }

    #[test]
    fn test_oversized_groups() {
        let mut counts = BTreeMap::new();
        counts.insert("hero".to_string(), 5);
        for i in 0..15 {
            counts.insert(format!("cat{i}"), 1);
        }

        // total 20, cap 15% -> limit 3
        let oversized = oversized_groups(&counts, DEFAULT_CATEGORY_CAP);
        assert_eq!(oversized.len(), 1);
        assert_eq!(oversized[0].key, "hero");
        assert_eq!(oversized[0].count, 5);
        assert!((oversized[0].percent - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bootstrap() {
        let (map, counts) = bootstrap(["hero1", "hero2", "cta10", "file-upload-form-1"]);
        assert_eq!(counts["hero"], 2);
        assert_eq!(map.segments["hero"], "Hero");
        assert_eq!(map.segments["file"], "File");
        assert_eq!(map.segments.len(), 3);
    }
}
