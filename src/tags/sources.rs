//! Model filename providers for the embeddings and LoRA tables

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Model file extensions recognised when walking directories
const MODEL_EXTENSIONS: &[&str] = &["safetensors", "pt", "pth", "bin", "ckpt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Embeddings,
    Loras,
}

/// Supplies model filenames on demand
pub trait ModelFileSource: Send + Sync {
    fn filenames(&self, kind: ModelKind) -> Vec<String>;
}

/// Walks one directory per model kind
#[derive(Debug, Clone)]
pub struct DirectoryModelSource {
    embeddings: PathBuf,
    loras: PathBuf,
}

impl DirectoryModelSource {
    pub fn new(embeddings: impl Into<PathBuf>, loras: impl Into<PathBuf>) -> Self {
        Self {
            embeddings: embeddings.into(),
            loras: loras.into(),
        }
    }
}

impl ModelFileSource for DirectoryModelSource {
    fn filenames(&self, kind: ModelKind) -> Vec<String> {
        match kind {
            ModelKind::Embeddings => model_files(&self.embeddings),
            ModelKind::Loras => model_files(&self.loras),
        }
    }
}

/// Fixed lists handed over by a host application
#[derive(Debug, Clone, Default)]
pub struct StaticModelSource {
    pub embeddings: Vec<String>,
    pub loras: Vec<String>,
}

impl ModelFileSource for StaticModelSource {
    fn filenames(&self, kind: ModelKind) -> Vec<String> {
        match kind {
            ModelKind::Embeddings => self.embeddings.clone(),
            ModelKind::Loras => self.loras.clone(),
        }
    }
}

/// Relative `/`-separated paths of model files below `root`
fn model_files(root: &Path) -> Vec<String> {
    if !root.is_dir() {
        return Vec::new();
    }

    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| MODEL_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .filter_map(|e| {
            let rel = e.path().strip_prefix(root).ok()?;
            Some(rel.to_string_lossy().replace('\\', "/"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        let loras = dir.path().join("loras");
        fs::create_dir_all(loras.join("styles")).unwrap();
        fs::write(loras.join("detail.safetensors"), "").unwrap();
        fs::write(loras.join("styles/ink.pt"), "").unwrap();
        fs::write(loras.join("readme.txt"), "").unwrap();

        let source = DirectoryModelSource::new(dir.path().join("embeddings"), &loras);
        assert_eq!(
            source.filenames(ModelKind::Loras),
            vec!["detail.safetensors", "styles/ink.pt"]
        );
        assert!(source.filenames(ModelKind::Embeddings).is_empty());
    }
}
