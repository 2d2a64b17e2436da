use std::path::PathBuf;

use anyhow::Result;
use colored::*;
use serde_json::json;

use tagcomplete::{TableKind, TagRecord};

use crate::SearchArgs;

pub fn run(data: Option<PathBuf>, args: SearchArgs) -> Result<()> {
    let tc = super::open(data)?;
    let state = tc.config();

    if let Some(file) = args.translate.as_deref().or(state.translate_file.as_deref()) {
        tc.load_translate(Some(file))?;
    }

    let main = args
        .main
        .or_else(|| state.main_file.clone())
        .or_else(|| tc.paths().main_files().into_iter().next());
    let extra = args.extra.or_else(|| state.extra_file.clone());
    tc.load_table(TableKind::Main, main.as_deref())?;
    tc.load_table(TableKind::Extra, extra.as_deref())?;

    if args.restrict_alias {
        tc.set_config("restrictAlias", &json!(true))?;
    }
    if let Some(max) = args.max {
        tc.set_config("maxCount", &json!(max))?;
    }
    for (option, enabled) in [
        ("enable_embeddings", args.embeddings || state.enable_embeddings),
        ("enable_loras", args.loras || state.enable_loras),
        ("enable_wildcards", args.wildcards || state.enable_wildcards),
    ] {
        if enabled {
            tc.set_config(option, &json!(true))?;
        }
    }

    let categories = (!args.categories.is_empty()).then_some(args.categories.as_slice());
    let results = tc.search(&args.term, categories);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!("{}", "Tag Search".bold());
    println!("{}", "=".repeat(50));
    println!("Query: {}", args.term.dimmed());
    println!();

    if results.is_empty() {
        println!("{}", "No matching tags found.".yellow());
        return Ok(());
    }

    for (i, record) in results.iter().enumerate() {
        print_record(i + 1, record);
    }
    println!();
    println!("{} results", results.len().to_string().cyan());

    Ok(())
}

fn print_record(rank: usize, record: &TagRecord) {
    let count = match record.post_count.as_deref() {
        Some(count) if record.numeric_post_count().is_some() => count.green(),
        Some(sentinel) => sentinel.magenta(),
        None => "-".dimmed(),
    };

    let text = if record.is_alias() {
        record.text.yellow()
    } else {
        record.text.cyan().bold()
    };

    let mut line = format!("  {}. {} [{}]", rank, text, count);
    if let Some(name) = record.category_name.as_deref() {
        line.push_str(&format!(" {}", name.dimmed()));
    }
    if let Some(translate) = record.translate.as_deref() {
        line.push_str(&format!(" ({})", translate));
    }
    println!("{}", line);
}
