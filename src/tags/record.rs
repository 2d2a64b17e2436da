//! Tag records and the tables they live in

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::Error;

/// `postCount` sentinel marking an alternate spelling of a canonical tag
pub const ALIAS: &str = "Alias";
pub const EMBEDDING: &str = "Embedding";
pub const LORA: &str = "LoRA";
pub const WILDCARD: &str = "Wildcard";

/// A single suggestion candidate
///
/// Serializes to the JSON shape the completion frontend consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRecord {
    /// Search key, never empty
    pub term: String,
    /// Dropdown text, e.g. `kitty => cat` for aliases
    pub text: String,
    /// Inserted on selection
    pub value: String,
    pub category: Option<String>,
    /// Popularity count, or one of the sentinels above
    pub post_count: Option<String>,
    pub category_name: Option<String>,
    pub site: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wildcard_value: Option<String>,
}

impl TagRecord {
    /// Record whose term, text and value are all the same string
    pub fn plain(term: impl Into<String>) -> Self {
        let term = term.into();
        Self {
            text: term.clone(),
            value: term.clone(),
            term,
            category: None,
            post_count: None,
            category_name: None,
            site: None,
            translate: None,
            wildcard_value: None,
        }
    }

    pub fn is_alias(&self) -> bool {
        self.post_count.as_deref() == Some(ALIAS)
    }

    /// Numeric popularity, if `postCount` is a non-negative integer.
    ///
    /// Counts too large for `u64` saturate.
    pub fn numeric_post_count(&self) -> Option<u64> {
        let count = self.post_count.as_deref()?;
        if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(count.parse().unwrap_or(u64::MAX))
    }

    /// Individual translations (the stored string is comma-joined)
    pub fn translations(&self) -> impl Iterator<Item = &str> {
        self.translate
            .as_deref()
            .into_iter()
            .flat_map(|t| t.split(','))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Named tables inside the tag store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Main,
    Extra,
    Embeddings,
    Loras,
    Wildcards,
}

impl TableKind {
    /// All tables in result-merge order
    pub const ALL: [TableKind; 5] = [
        TableKind::Main,
        TableKind::Extra,
        TableKind::Embeddings,
        TableKind::Loras,
        TableKind::Wildcards,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Main => 0,
            Self::Extra => 1,
            Self::Embeddings => 2,
            Self::Loras => 3,
            Self::Wildcards => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Extra => "extra",
            Self::Embeddings => "embeddings",
            Self::Loras => "loras",
            Self::Wildcards => "wildcards",
        }
    }

    /// Tables populated from CSV tag files
    pub fn is_csv(self) -> bool {
        matches!(self, Self::Main | Self::Extra)
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "main" => Ok(Self::Main),
            "extra" => Ok(Self::Extra),
            "embeddings" => Ok(Self::Embeddings),
            "loras" => Ok(Self::Loras),
            "wildcards" => Ok(Self::Wildcards),
            _ => Err(Error::UnknownTable(s.to_string())),
        }
    }
}
