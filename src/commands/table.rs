use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::*;

use tagcomplete::TableKind;

pub fn run(data: Option<PathBuf>, name: String, file: Option<String>, json: bool) -> Result<()> {
    let tc = super::open(data)?;
    let count = tc
        .load_table_named(&name, file.as_deref())
        .with_context(|| format!("Failed to load table '{}'", name))?;
    let table = name.parse::<TableKind>()?;
    let records = tc.store().read(table);

    if json {
        println!("{}", serde_json::to_string_pretty(&*records)?);
        return Ok(());
    }

    println!("{}", format!("Table: {}", table).bold());
    println!("{}", "=".repeat(50));
    if records.is_empty() {
        println!("{}", "No records loaded.".yellow());
        return Ok(());
    }

    for record in records.iter() {
        let post_count = record.post_count.as_deref().unwrap_or("-");
        println!("  {} [{}]", record.text.cyan(), post_count.dimmed());
    }
    println!();
    println!("{} records", count.to_string().cyan());

    Ok(())
}
