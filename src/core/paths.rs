//! Data path management
//!
//! Handles data root detection and tag/translate/wildcard file discovery.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::config::{Config, NO_TRANSLATE};

/// Environment variable for data root configuration
pub const DATA_PATH_ENV: &str = "TAGCOMPLETE_DATA_PATH";

pub const CATEGORY_MAP_FILE: &str = "category_map.csv";

/// Prefix that marks a tag file as an "extra" list
const EXTRA_PREFIX: &str = "extra";

/// Data paths wrapper that combines config and resolved directories
pub struct DataPaths {
    pub root: PathBuf,
    pub tags: PathBuf,
    pub translate: PathBuf,
    pub category_map: PathBuf,
    pub wildcard_dirs: Vec<PathBuf>,
    pub embeddings: PathBuf,
    pub loras: PathBuf,
    pub config: Config,
}

impl DataPaths {
    /// Create DataPaths from environment variable or current directory.
    pub fn new() -> Self {
        Self::from_root(get_data_root())
    }

    pub fn from_root(root: PathBuf) -> Self {
        let config = Config::load(&root);
        Self::from_root_with_config(root, config)
    }

    pub fn from_root_with_config(root: PathBuf, config: Config) -> Self {
        let wildcard_dirs = config
            .wildcard_dirs
            .iter()
            .map(|dir| root.join(dir))
            .collect();

        Self {
            tags: root.join("tags"),
            translate: root.join("translate"),
            category_map: root.join(CATEGORY_MAP_FILE),
            embeddings: root.join(&config.embeddings_dir),
            loras: root.join(&config.loras_dir),
            wildcard_dirs,
            root,
            config,
        }
    }

    /// Main tag files: every `tags/*.csv` not prefixed with "extra"
    pub fn main_files(&self) -> Vec<String> {
        csv_files(&self.tags)
            .into_iter()
            .filter(|name| !is_extra(name))
            .collect()
    }

    /// Extra tag files: `tags/extra*.csv`
    pub fn extra_files(&self) -> Vec<String> {
        csv_files(&self.tags)
            .into_iter()
            .filter(|name| is_extra(name))
            .collect()
    }

    /// Translate files, led by the "None" choice
    pub fn translate_files(&self) -> Vec<String> {
        let mut files = vec![NO_TRANSLATE.to_string()];
        files.extend(csv_files(&self.translate));
        files
    }

    pub fn tag_file(&self, filename: &str) -> PathBuf {
        self.tags.join(filename)
    }

    pub fn translate_file(&self, filename: &str) -> PathBuf {
        self.translate.join(filename)
    }

    /// Wildcard directories that exist, in priority order
    pub fn existing_wildcard_dirs(&self) -> Vec<PathBuf> {
        self.wildcard_dirs
            .iter()
            .filter(|dir| dir.is_dir())
            .cloned()
            .collect()
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn is_extra(filename: &str) -> bool {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|stem| stem.starts_with(EXTRA_PREFIX))
        .unwrap_or(false)
}

/// Sorted names of the `.csv` files directly inside `dir`
fn csv_files(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut files: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().map(|e| e == "csv").unwrap_or(false))
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
        .collect();

    files.sort();
    files
}

/// Get data root path from environment variable or current directory.
/// Priority: TAGCOMPLETE_DATA_PATH env var > current directory
pub fn get_data_root() -> PathBuf {
    if let Ok(path) = std::env::var(DATA_PATH_ENV) {
        let data_path = PathBuf::from(&path);
        if data_path.exists() {
            return data_path;
        }
        warn!(
            "{} is set to '{}' but path does not exist. Falling back to current directory.",
            DATA_PATH_ENV, path
        );
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_lists() {
        let dir = tempfile::tempdir().unwrap();
        let tags = dir.path().join("tags");
        let translate = dir.path().join("translate");
        fs::create_dir_all(&tags).unwrap();
        fs::create_dir_all(&translate).unwrap();
        for name in ["danbooru.csv", "e621.csv", "extra-quality.csv", "notes.txt"] {
            fs::write(tags.join(name), "").unwrap();
        }
        fs::write(translate.join("ja.csv"), "").unwrap();

        let paths = DataPaths::from_root_with_config(dir.path().to_path_buf(), Config::default());
        assert_eq!(paths.main_files(), vec!["danbooru.csv", "e621.csv"]);
        assert_eq!(paths.extra_files(), vec!["extra-quality.csv"]);
        assert_eq!(paths.translate_files(), vec!["None", "ja.csv"]);
    }

    #[test]
    fn test_missing_dirs_are_empty() {
        let paths = DataPaths::from_root_with_config(
            PathBuf::from("/tmp/nonexistent-tagcomplete"),
            Config::default(),
        );
        assert!(paths.main_files().is_empty());
        assert!(paths.existing_wildcard_dirs().is_empty());
        assert_eq!(paths.translate_files(), vec!["None"]);
    }
}
