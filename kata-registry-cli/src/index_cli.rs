//! Index inspection commands: search, show, graph, lint

use anyhow::{Context, Result};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use kata_registry_core::index::{lint, ComponentIndexEntry, LintFinding, RegistryIndex};

use crate::project::Project;

/// Table row for search results
#[derive(Tabled)]
struct SearchResultRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Files")]
    files: usize,
    #[tabled(rename = "Lines")]
    lines: usize,
    #[tabled(rename = "Peers")]
    peers: usize,
    #[tabled(rename = "Description")]
    description: String,
}

/// Table row for the peer graph
#[derive(Tabled)]
struct GraphRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Peers")]
    peers: String,
    #[tabled(rename = "Used By")]
    dependents: String,
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max - 3).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

fn join_or_dash(names: &[&str]) -> String {
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}

/// Entries matching an optional query and category
pub fn select<'a>(
    index: &'a RegistryIndex,
    query: Option<&str>,
    category: Option<&str>,
) -> Vec<&'a ComponentIndexEntry> {
    let mut results: Vec<&ComponentIndexEntry> = match query {
        Some(q) => index.search(q),
        None => index.entries().iter().collect(),
    };

    if let Some(category) = category {
        results.retain(|entry| entry.category.eq_ignore_ascii_case(category));
    }

    results
}

pub async fn execute_search(
    project: &Project,
    query: Option<&str>,
    category: Option<&str>,
    json_output: bool,
) -> Result<()> {
    let output = project.build().await?;
    let results = select(&output.index, query, category);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No components found.");
        return Ok(());
    }

    println!("Found {} component(s):\n", results.len());

    let table_rows: Vec<SearchResultRow> = results
        .iter()
        .map(|entry| SearchResultRow {
            name: entry.name.clone(),
            category: entry.category.clone(),
            files: entry.complexity.files,
            lines: entry.complexity.lines,
            peers: entry.peer_components.len(),
            description: truncate(entry.short_description(), 50),
        })
        .collect();

    let table = Table::new(&table_rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();

    println!("{table}");
    Ok(())
}

pub async fn execute_show(project: &Project, name: &str, json_output: bool) -> Result<()> {
    let output = project.build().await?;
    let entry = output
        .index
        .get(name)
        .with_context(|| format!("Component '{name}' not found in registry"))?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(entry)?);
        return Ok(());
    }

    println!("Component:  {}", entry.name);
    println!("Title:      {}", entry.title);
    println!("Category:   {}", entry.category);
    println!("Install:    {}", entry.install_command);
    println!(
        "Complexity: {} files, {} lines, {} dependencies",
        entry.complexity.files, entry.complexity.lines, entry.complexity.dependencies
    );
    println!("Hash:       {}", entry.content_hash);
    if let Some(date) = &entry.last_modified {
        println!("Modified:   {date}");
    }
    if !entry.tags.is_empty() {
        println!("Tags:       {}", entry.tags.join(", "));
    }
    if !entry.peer_components.is_empty() {
        println!("Peers:      {}", entry.peer_components.join(", "));
    }
    if !entry.description.is_empty() {
        println!();
        println!("{}", entry.description);
    }

    Ok(())
}

pub async fn execute_graph(project: &Project, name: Option<&str>, json_output: bool) -> Result<()> {
    let output = project.build().await?;
    let index = &output.index;

    let entries: Vec<&ComponentIndexEntry> = match name {
        Some(name) => vec![index
            .get(name)
            .with_context(|| format!("Component '{name}' not found in registry"))?],
        None => index.entries().iter().collect(),
    };

    if json_output {
        let graph: Vec<serde_json::Value> = entries
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "name": entry.name,
                    "peerComponents": entry.peer_components,
                    "transitivePeers": index.transitive_peers(&entry.name).unwrap_or_default(),
                    "dependents": index
                        .dependents(&entry.name)
                        .iter()
                        .map(|d| d.name.as_str())
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&graph)?);
        return Ok(());
    }

    let table_rows: Vec<GraphRow> = entries
        .iter()
        .map(|entry| {
            let peers = index.transitive_peers(&entry.name).unwrap_or_default();
            let dependents: Vec<&str> = index
                .dependents(&entry.name)
                .iter()
                .map(|d| d.name.as_str())
                .collect();
            GraphRow {
                name: entry.name.clone(),
                peers: join_or_dash(&peers),
                dependents: join_or_dash(&dependents),
            }
        })
        .collect();

    let table = Table::new(&table_rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();

    println!("{table}");
    Ok(())
}

pub fn execute_lint(project: &Project, json_output: bool, strict: bool) -> Result<()> {
    let manifest = project.manifest()?;
    let categories = project.categories()?;

    let findings: Vec<LintFinding> = lint(
        project.root(),
        &manifest,
        &categories,
        &project.config.templates,
        project.config.category_cap,
    );

    if json_output {
        println!("{}", serde_json::to_string_pretty(&findings)?);
    } else if findings.is_empty() {
        println!("No lint findings.");
    } else {
        println!("{} finding(s):\n", findings.len());
        for finding in &findings {
            println!("  - {finding}");
        }
    }

    if strict && !findings.is_empty() {
        anyhow::bail!("Lint found {} issue(s)", findings.len());
    }

    Ok(())
}
