use std::path::PathBuf;

use anyhow::Result;
use colored::*;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileLists {
    main_files: Vec<String>,
    extra_files: Vec<String>,
    translate_files: Vec<String>,
}

pub fn run(data: Option<PathBuf>, json: bool) -> Result<()> {
    let paths = super::data_paths(data);
    let lists = FileLists {
        main_files: paths.main_files(),
        extra_files: paths.extra_files(),
        translate_files: paths.translate_files(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&lists)?);
        return Ok(());
    }

    println!("{}", "Data Files".bold());
    println!("{}", "=".repeat(50));
    println!("Root: {}", paths.root.display().to_string().dimmed());

    for (title, files) in [
        ("Main", &lists.main_files),
        ("Extra", &lists.extra_files),
        ("Translate", &lists.translate_files),
    ] {
        println!();
        println!("{}", title.bold());
        if files.is_empty() {
            println!("  {}", "(none)".dimmed());
        }
        for file in files {
            println!("  {}", file.cyan());
        }
    }

    Ok(())
}
