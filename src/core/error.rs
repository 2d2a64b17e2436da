//! Error types for tag loading, configuration and wildcard resolution

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A tag, translate or wildcard source could not be opened
    #[error("source not found: {}", path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row or file was readable but malformed
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlobPattern { pattern: String, message: String },

    /// The category map is required before any search is meaningful
    #[error("failed to load category map {}: {message}", path.display())]
    CategoryMap { path: PathBuf, message: String },

    #[error("unknown config option '{0}'")]
    UnknownOption(String),

    #[error("invalid value for '{option}': {value}")]
    InvalidValue { option: String, value: String },

    #[error("unknown table '{0}'")]
    UnknownTable(String),
}

impl Error {
    pub fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether the loaders should log and continue instead of failing
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound { .. } | Self::Parse { .. } | Self::InvalidGlobPattern { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_kinds() {
        let missing = Error::SourceNotFound {
            path: PathBuf::from("tags/missing.csv"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(missing.is_recoverable());
        assert!(Error::parse("a.yaml", "bad indent").is_recoverable());

        let category = Error::CategoryMap {
            path: PathBuf::from("category_map.csv"),
            message: "missing".to_string(),
        };
        assert!(!category.is_recoverable());
        assert!(!Error::UnknownOption("colour".to_string()).is_recoverable());
    }

    #[test]
    fn test_display_includes_path() {
        let err = Error::parse("wildcards/bad.yaml", "unexpected mapping");
        let message = err.to_string();
        assert!(message.contains("wildcards/bad.yaml"));
        assert!(message.contains("unexpected mapping"));
    }
}
