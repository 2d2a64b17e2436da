use std::path::PathBuf;

use anyhow::Result;
use colored::*;
use serde::Serialize;

#[derive(Serialize)]
struct WildcardSummary {
    key: String,
    options: usize,
}

pub fn run(data: Option<PathBuf>, json: bool) -> Result<()> {
    let tc = super::open(data)?;
    tc.templates().load(false);

    let summary: Vec<WildcardSummary> = tc
        .templates()
        .read()
        .iter()
        .map(|(key, options)| WildcardSummary {
            key: format!("__{}__", key),
            options: options.len(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", "Wildcards".bold());
    println!("{}", "=".repeat(50));
    for dir in tc.templates().dirs() {
        let marker = if dir.is_dir() { "✓".green() } else { "✗".red() };
        println!("  {} {}", marker, dir.display().to_string().dimmed());
    }
    println!();

    if summary.is_empty() {
        println!("{}", "No wildcards found.".yellow());
        return Ok(());
    }

    for entry in &summary {
        println!("  {} ({})", entry.key.cyan(), entry.options);
    }
    println!();
    println!("{} wildcards", summary.len().to_string().cyan());

    Ok(())
}
