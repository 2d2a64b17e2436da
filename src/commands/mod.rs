pub mod expand;
pub mod files;
pub mod search;
pub mod table;
pub mod wildcards;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tagcomplete::core::paths::get_data_root;
use tagcomplete::{DataPaths, TagComplete};

/// Data paths for `--data`, else the environment/current directory
pub fn data_paths(data: Option<PathBuf>) -> DataPaths {
    DataPaths::from_root(data.unwrap_or_else(get_data_root))
}

/// Open the data root without loading any table yet
pub fn open(data: Option<PathBuf>) -> Result<TagComplete> {
    let paths = data_paths(data);
    let root = paths.root.display().to_string();
    TagComplete::open(paths).with_context(|| format!("Failed to open data root {}", root))
}
