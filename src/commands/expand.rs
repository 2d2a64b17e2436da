use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use colored::*;
use serde::Serialize;

#[derive(Serialize)]
struct Expansion {
    seed: u64,
    input: String,
    output: String,
}

pub fn run(
    data: Option<PathBuf>,
    text: Option<String>,
    file: Option<PathBuf>,
    seed: u64,
    json: bool,
) -> Result<()> {
    let input = match (text, file) {
        (_, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("Failed to read template {}", path.display()))?,
        (Some(text), None) => text,
        (None, None) => bail!("Provide template text or --file"),
    };

    let tc = super::open(data)?;
    let stats = tc.templates().load(false);
    if stats.failed > 0 && !json {
        eprintln!(
            "{}",
            format!("{} wildcard files could not be read", stats.failed).yellow()
        );
    }

    let output = tc.expand(&input, seed);

    if json {
        let expansion = Expansion {
            seed,
            input,
            output,
        };
        println!("{}", serde_json::to_string_pretty(&expansion)?);
    } else {
        println!("{}", output);
    }

    Ok(())
}
