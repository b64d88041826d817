//! `kata-registry bootstrap-categories`

use anyhow::{Context, Result};
use std::collections::BTreeMap;

use kata_registry_core::index::{bootstrap, oversized_groups, write_atomic};

use crate::project::Project;

pub fn execute(project: &Project, force: bool) -> Result<()> {
    let target = &project.paths.category_map;
    if target.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it.",
            target.display()
        );
    }

    let manifest = project.manifest()?;
    let names = manifest
        .buildable_items(&project.config.templates)
        .map(|item| item.name.as_str());
    let (map, counts) = bootstrap(names);

    print_summary(&counts, project.config.category_cap);

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    write_atomic(target, &map.to_json_pretty()?)?;

    println!(
        "Wrote {} with {} segments. Edit it to merge segments into categories.",
        target.display(),
        map.segments.len()
    );
    Ok(())
}

fn print_summary(counts: &BTreeMap<String, usize>, cap: f64) {
    let total: usize = counts.values().sum();
    println!("Total components: {total}");
    println!("Unique segments: {}", counts.len());

    for group in oversized_groups(counts, cap) {
        println!(
            "Segment \"{}\" has {} components ({:.1}%); above {:.0}%.",
            group.key,
            group.count,
            group.percent,
            cap * 100.0
        );
    }
}
