//! Source parsers: CSV tag rows, model filenames, wildcard keys, translations
//!
//! Every parser produces plain [`TagRecord`]s; the store never sees raw rows.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use tracing::{debug, warn};

use super::category::CategoryMap;
use super::record::{TagRecord, ALIAS, EMBEDDING, LORA, WILDCARD};
use crate::core::error::{Error, Result};

/// Tag → comma-joined translation string
pub type Translations = HashMap<String, String>;

/// Minimum CSV columns: tag, category, postCount, aliases
const MIN_FIELDS: usize = 4;

/// Read headerless CSV rows from a file.
///
/// Rows that fail to decode are logged and skipped.
pub fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let file = File::open(path).map_err(|e| Error::SourceNotFound {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        match record {
            Ok(record) => {
                let row: Vec<String> = record.iter().map(String::from).collect();
                if row.iter().any(|field| !field.is_empty()) {
                    rows.push(row);
                }
            }
            Err(e) => {
                let err = Error::parse(path, format!("row {}: {}", line + 1, e));
                warn!("{}", err);
            }
        }
    }

    Ok(rows)
}

/// Turn `tag,category,postCount,aliases` rows into main and alias records
pub fn parse_tag_rows(rows: &[Vec<String>], categories: &CategoryMap) -> Vec<TagRecord> {
    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0;

    for row in rows {
        if row.len() < MIN_FIELDS {
            skipped += 1;
            continue;
        }

        let tag = row[0].as_str();
        if tag.is_empty() {
            skipped += 1;
            continue;
        }

        let category = non_empty(&row[1]);
        let post_count = non_empty(&row[2]);

        let mut main = TagRecord::plain(tag);
        main.category = category.clone();
        main.post_count = post_count;
        records.push(main);

        for alias in row[3].split(',').filter(|a| !a.is_empty()) {
            records.push(TagRecord {
                term: alias.to_string(),
                text: format!("{} => {}", alias, tag),
                value: tag.to_string(),
                category: category.clone(),
                post_count: Some(ALIAS.to_string()),
                category_name: None,
                site: None,
                translate: None,
                wildcard_value: None,
            });
        }
    }

    for record in &mut records {
        categories.apply(record);
    }

    if skipped > 0 {
        debug!("Skipped {} short or empty tag rows", skipped);
    }

    records
}

/// Embedding filenames become `embedding:<stem>` suggestions
pub fn parse_embeddings(files: &[String]) -> Vec<TagRecord> {
    files
        .iter()
        .map(|file| strip_extension(file))
        .filter(|name| !name.is_empty())
        .map(|name| TagRecord {
            value: format!("embedding:{}", name),
            post_count: Some(EMBEDDING.to_string()),
            category_name: Some(EMBEDDING.to_string()),
            ..TagRecord::plain(name)
        })
        .collect()
}

/// LoRA filenames become `<lora:<stem>:1>` suggestions
pub fn parse_loras(files: &[String]) -> Vec<TagRecord> {
    files
        .iter()
        .map(|file| strip_extension(file))
        .filter(|name| !name.is_empty())
        .map(|name| TagRecord {
            value: format!("<lora:{}:1>", name),
            post_count: Some(LORA.to_string()),
            category_name: Some(LORA.to_string()),
            ..TagRecord::plain(name)
        })
        .collect()
}

/// One `__key__` suggestion per loaded wildcard, carrying its options
pub fn wildcard_records<'a, I>(entries: I) -> Vec<TagRecord>
where
    I: IntoIterator<Item = (&'a String, &'a Vec<String>)>,
{
    entries
        .into_iter()
        .map(|(key, options)| TagRecord {
            category_name: Some(WILDCARD.to_string()),
            wildcard_value: Some(options.join(",")),
            ..TagRecord::plain(format!("__{}__", key))
        })
        .collect()
}

/// Read `tag,translation[,more...]` rows into a lookup table
pub fn read_translations(path: &Path) -> Result<Translations> {
    let rows = read_csv_rows(path)?;
    Ok(parse_translations(&rows))
}

pub fn parse_translations(rows: &[Vec<String>]) -> Translations {
    let mut translations = Translations::new();

    for row in rows {
        let Some((tag, rest)) = row.split_first() else {
            continue;
        };
        if tag.is_empty() {
            continue;
        }

        let joined = rest
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(",");

        if !joined.is_empty() {
            translations.entry(tag.clone()).or_insert(joined);
        }
    }

    translations
}

/// Attach (or clear) translations on records matched by term
pub fn apply_translations(records: &mut [TagRecord], translations: &Translations) {
    for record in records {
        record.translate = translations.get(&record.term).cloned();
    }
}

/// Drop the final extension of a filename, keeping any directory part
fn strip_extension(file: &str) -> String {
    let base_start = file.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    match file[base_start..].rfind('.') {
        Some(dot) if dot > 0 => file[..base_start + dot].to_string(),
        _ => file.to_string(),
    }
}

fn non_empty(field: &str) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}
