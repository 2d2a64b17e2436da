//! Category map: short category code to display name and origin site

use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::{info, warn};

use super::record::TagRecord;
use crate::core::error::{Error, Result};

/// Display name and site for one category code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInfo {
    pub name: Option<String>,
    pub site: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryRow {
    category: Option<String>,
    description: Option<String>,
    site: Option<String>,
}

/// Immutable code → (name, site) table
#[derive(Debug, Clone, Default)]
pub struct CategoryMap {
    entries: HashMap<String, CategoryInfo>,
}

impl CategoryMap {
    /// Load `category_map.csv`. Failure here is fatal for the caller.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| Error::CategoryMap {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let map = Self::from_reader(file).map_err(|e| Error::CategoryMap {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        info!("Loaded {} categories from {}", map.len(), path.display());
        Ok(map)
    }

    /// Parse CSV with a `category,description,site` header
    pub fn from_reader<R: Read>(reader: R) -> std::result::Result<Self, csv::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = HashMap::new();
        for row in csv_reader.deserialize::<CategoryRow>() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping malformed category row: {}", e);
                    continue;
                }
            };

            let code = match row.category.filter(|c| !c.is_empty()) {
                Some(code) => code,
                None => continue,
            };

            entries.insert(
                code,
                CategoryInfo {
                    name: row.description.filter(|d| !d.is_empty()),
                    site: row.site.filter(|s| !s.is_empty()),
                },
            );
        }

        Ok(Self { entries })
    }

    pub fn get(&self, code: &str) -> Option<&CategoryInfo> {
        self.entries.get(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Derive `categoryName` and `site` from the record's category code
    pub fn apply(&self, record: &mut TagRecord) {
        let info = record.category.as_deref().and_then(|code| self.get(code));
        record.category_name = info.and_then(|i| i.name.clone());
        record.site = info.and_then(|i| i.site.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "category,description,site\n\
        0,General,danbooru\n\
        1,Artist,danbooru\n\
        7,General,e621\n\
        ,Orphan,nowhere\n";

    #[test]
    fn test_parse_category_map() {
        let map = CategoryMap::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(map.len(), 3);
        let artist = map.get("1").unwrap();
        assert_eq!(artist.name.as_deref(), Some("Artist"));
        assert_eq!(artist.site.as_deref(), Some("danbooru"));
    }

    #[test]
    fn test_apply_mapping() {
        let map = CategoryMap::from_reader(SAMPLE.as_bytes()).unwrap();

        let mut record = TagRecord::plain("cat");
        record.category = Some("7".to_string());
        map.apply(&mut record);
        assert_eq!(record.category_name.as_deref(), Some("General"));
        assert_eq!(record.site.as_deref(), Some("e621"));

        record.category = Some("99".to_string());
        map.apply(&mut record);
        assert_eq!(record.category_name, None);
        assert_eq!(record.site, None);
    }

    #[test]
    fn test_missing_file_fails_fast() {
        let result = CategoryMap::load(Path::new("/tmp/nonexistent/category_map.csv"));
        assert!(matches!(result, Err(Error::CategoryMap { .. })));
    }
}
