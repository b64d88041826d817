//! `kata-registry build`

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use kata_registry_core::index::RenderedArtifacts;

use crate::project::Project;

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Derive and validate the index without writing anything
    #[clap(long)]
    pub dry_run: bool,

    /// Print the build report as JSON
    #[clap(long)]
    pub json: bool,
}

pub async fn execute(project: &Project, args: BuildArgs) -> Result<()> {
    let output = project.build().await?;
    let rendered = RenderedArtifacts::render(&output).context("Failed to render artifacts")?;

    let written = if args.dry_run {
        info!("Dry run: no artifacts written");
        0
    } else {
        rendered.write(&project.paths.public_dir, &project.paths.lib_dir)?
    };

    if args.json {
        let report = serde_json::json!({
            "built": output.report.built,
            "skipped": output.report.skipped,
            "written": written,
            "categories": output.index.categories(),
            "oversizedCategories": output
                .report
                .oversized
                .iter()
                .map(|g| serde_json::json!({"category": g.key, "count": g.count, "percent": g.percent}))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Built {} components. Skipped {} templates. Index: {} entries.",
            output.report.built,
            output.report.skipped,
            output.index.len()
        );
        if !args.dry_run {
            println!(
                "Wrote {} files to {} and {}",
                written,
                project.paths.public_dir.display(),
                project.paths.lib_dir.display()
            );
        }
        for group in &output.report.oversized {
            println!(
                "Category \"{}\" has {} components ({:.1}%); max {:.0}% allowed.",
                group.key,
                group.count,
                group.percent,
                project.config.category_cap * 100.0
            );
        }
    }

    Ok(())
}
