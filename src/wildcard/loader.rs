//! Wildcard directory loader
//!
//! `.txt` files contribute one key (relative path without extension), one
//! option per line. `.yaml`/`.yml` files contribute nested keys joined with
//! `/`. Files are visited in sorted order and the first definition of a key
//! wins, across files and across directories.

use std::fs;
use std::path::Path;

use serde_yaml::Value;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::set::WildcardSet;
use crate::core::error::{Error, Result};

/// Counters for one directory load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub files: usize,
    pub keys: usize,
    pub duplicates: usize,
    pub failed: usize,
}

impl LoadStats {
    pub fn merge(&mut self, other: LoadStats) {
        self.files += other.files;
        self.keys += other.keys;
        self.duplicates += other.duplicates;
        self.failed += other.failed;
    }
}

/// Load every wildcard file below `dir` into `set`
pub fn load_dir(set: &mut WildcardSet, dir: &Path) -> LoadStats {
    let mut stats = LoadStats::default();

    if !dir.is_dir() {
        debug!("Wildcard directory {} not found, skipping", dir.display());
        return stats;
    }

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let result = match ext.as_deref() {
            Some("txt") => load_txt(set, dir, path),
            Some("yaml") | Some("yml") => load_yaml(set, path),
            _ => continue,
        };

        stats.files += 1;
        match result {
            Ok((added, skipped)) => {
                stats.keys += added;
                stats.duplicates += skipped;
            }
            Err(e) => {
                warn!("Skipping wildcard file: {}", e);
                stats.failed += 1;
            }
        }
    }

    debug!(
        "Loaded {} wildcard keys from {} ({} files, {} duplicates)",
        stats.keys,
        dir.display(),
        stats.files,
        stats.duplicates
    );

    stats
}

/// Non-blank, non-`#` lines of a wildcard text body
pub fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(String::from)
        .collect()
}

/// Flatten a YAML document into `set`; returns (added, duplicates)
pub fn parse_yaml(set: &mut WildcardSet, content: &str, path: &Path) -> Result<(usize, usize)> {
    let doc: Value =
        serde_yaml::from_str(content).map_err(|e| Error::parse(path, e.to_string()))?;

    let mut counts = (0, 0);
    match doc {
        Value::Mapping(map) => {
            for (key, value) in map {
                if let Some(key) = scalar_text(&key) {
                    flatten(set, key, value, &mut counts);
                }
            }
        }
        Value::Null => {}
        _ => return Err(Error::parse(path, "top level must be a mapping")),
    }

    Ok(counts)
}

fn load_txt(set: &mut WildcardSet, root: &Path, path: &Path) -> Result<(usize, usize)> {
    let content = read_text(path)?;
    let rel = path.strip_prefix(root).unwrap_or(path).with_extension("");
    let key = rel.to_string_lossy().into_owned();

    if set.insert(&key, parse_lines(&content)) {
        Ok((1, 0))
    } else {
        Ok((0, 1))
    }
}

fn load_yaml(set: &mut WildcardSet, path: &Path) -> Result<(usize, usize)> {
    let content = read_text(path)?;
    parse_yaml(set, &content, path)
}

fn flatten(set: &mut WildcardSet, key: String, value: Value, counts: &mut (usize, usize)) {
    let options = match value {
        Value::Mapping(map) => {
            for (child, value) in map {
                if let Some(child) = scalar_text(&child) {
                    flatten(set, format!("{}/{}", key, child), value, counts);
                }
            }
            return;
        }
        Value::Sequence(items) => items.iter().filter_map(scalar_text).collect(),
        Value::Tagged(tagged) => return flatten(set, key, tagged.value, counts),
        Value::Null => return,
        scalar => scalar_text(&scalar).into_iter().collect(),
    };

    if set.insert(&key, options) {
        counts.0 += 1;
    } else {
        counts.1 += 1;
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// UTF-8, falling back to Latin-1
fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::SourceNotFound {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    })
}
