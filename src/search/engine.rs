//! Search Engine - filter, rank and cap tag records across all tables
//!
//! Pipeline: substring/alias match → category filter → stable multi-key sort
//! → `maxCount` cap.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use crate::core::config::ConfigState;
use crate::tags::{TableKind, TagRecord, TagStore};

/// Case-insensitive set of accepted `categoryName`s
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    names: Option<HashSet<String>>,
}

impl CategoryFilter {
    /// An absent or empty list accepts every record
    pub fn new<S: AsRef<str>>(names: Option<&[S]>) -> Self {
        let names: Option<HashSet<String>> = names
            .map(|list| list.iter().map(|n| n.as_ref().to_lowercase()).collect())
            .filter(|set: &HashSet<String>| !set.is_empty());
        Self { names }
    }

    pub fn accepts(&self, record: &TagRecord) -> bool {
        match &self.names {
            None => true,
            Some(names) => record
                .category_name
                .as_deref()
                .map(|name| names.contains(&name.to_lowercase()))
                .unwrap_or(false),
        }
    }
}

/// Search engine over a shared tag store
pub struct SearchEngine<'a> {
    store: &'a TagStore,
}

impl<'a> SearchEngine<'a> {
    pub fn new(store: &'a TagStore) -> Self {
        Self { store }
    }

    /// Ranked records matching `term`, gated by `config`
    pub fn search<S: AsRef<str>>(
        &self,
        term: &str,
        categories: Option<&[S]>,
        config: &ConfigState,
    ) -> Vec<TagRecord> {
        if !config.enable {
            return Vec::new();
        }

        let filter = CategoryFilter::new(categories);
        let mut results = Vec::new();

        for kind in TableKind::ALL {
            let table = self.store.read(kind);
            results.extend(
                table
                    .iter()
                    .filter(|r| matches_term(r, term, config.restrict_alias))
                    .filter(|r| filter.accepts(r))
                    .cloned(),
            );
        }

        let matched = results.len();
        results.sort_by(compare_rank);

        if let Some(limit) = config.limit() {
            results.truncate(limit);
        }

        debug!(
            "search '{}': {} matched, {} returned",
            term,
            matched,
            results.len()
        );

        results
    }
}

/// Substring match on term or translation; exact only for restricted aliases.
///
/// Matching is literal and case-sensitive.
pub fn matches_term(record: &TagRecord, term: &str, restrict_alias: bool) -> bool {
    if restrict_alias && record.is_alias() {
        return record.term == term
            || record.translate.as_deref() == Some(term)
            || record.translations().any(|t| t == term);
    }

    record.term.contains(term)
        || record
            .translate
            .as_deref()
            .map(|t| t.contains(term))
            .unwrap_or(false)
}

/// Numeric post counts first (descending), then other post counts as text
/// (ascending, missing as ""), then term (ascending)
pub fn compare_rank(a: &TagRecord, b: &TagRecord) -> Ordering {
    let by_count = match (a.numeric_post_count(), b.numeric_post_count()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a
            .post_count
            .as_deref()
            .unwrap_or("")
            .cmp(b.post_count.as_deref().unwrap_or("")),
    };

    by_count.then_with(|| a.term.cmp(&b.term))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::record::{ALIAS, EMBEDDING};

    fn record(term: &str, post_count: Option<&str>) -> TagRecord {
        TagRecord {
            post_count: post_count.map(String::from),
            ..TagRecord::plain(term)
        }
    }

    fn alias(term: &str, tag: &str) -> TagRecord {
        TagRecord {
            text: format!("{} => {}", term, tag),
            value: tag.to_string(),
            post_count: Some(ALIAS.to_string()),
            ..TagRecord::plain(term)
        }
    }

    fn terms(records: &[TagRecord]) -> Vec<&str> {
        records.iter().map(|r| r.term.as_str()).collect()
    }

    fn unlimited() -> ConfigState {
        ConfigState {
            max_count: 0,
            ..ConfigState::default()
        }
    }

    #[test]
    fn test_numeric_outranks_sentinels() {
        let store = TagStore::new();
        store.replace(TableKind::Main, vec![record("cat_ears", Some("5"))]);
        store.replace(
            TableKind::Embeddings,
            vec![record("cat_style", Some(EMBEDDING))],
        );
        store.replace(TableKind::Extra, vec![record("catgirl", Some("90000"))]);

        let results = SearchEngine::new(&store).search::<&str>("cat", None, &unlimited());
        assert_eq!(terms(&results), vec!["catgirl", "cat_ears", "cat_style"]);
    }

    #[test]
    fn test_oversized_count_stays_numeric() {
        let huge = record("cat_huge", Some("184467440737095516160"));
        let sentinel = record("cat_alias", Some(ALIAS));
        let small = record("cat_small", Some("3"));

        assert_eq!(compare_rank(&huge, &sentinel), Ordering::Less);
        assert_eq!(compare_rank(&huge, &small), Ordering::Less);
    }

    #[test]
    fn test_non_numeric_order_and_tiebreak() {
        let store = TagStore::new();
        store.replace(
            TableKind::Main,
            vec![
                record("b_tag", Some("LoRA")),
                record("a_tag", Some("LoRA")),
                record("c_tag", None),
                record("d_tag", Some("Alias")),
                record("e_tag", Some("10")),
                record("f_tag", Some("10")),
            ],
        );

        let results = SearchEngine::new(&store).search::<&str>("_tag", None, &unlimited());
        assert_eq!(
            terms(&results),
            vec!["e_tag", "f_tag", "c_tag", "d_tag", "a_tag", "b_tag"]
        );
    }

    #[test]
    fn test_literal_case_sensitive_match() {
        let store = TagStore::new();
        store.replace(
            TableKind::Main,
            vec![
                record("long_hair", Some("10")),
                record("longhair", Some("5")),
                record("Long_Hair", Some("1")),
                record("100%_orange", Some("1")),
            ],
        );
        let engine = SearchEngine::new(&store);

        assert_eq!(
            terms(&engine.search::<&str>("g_h", None, &unlimited())),
            vec!["long_hair"]
        );
        assert_eq!(
            terms(&engine.search::<&str>("%_", None, &unlimited())),
            vec!["100%_orange"]
        );
    }

    #[test]
    fn test_restrict_alias_exact_only() {
        let store = TagStore::new();
        store.replace(
            TableKind::Main,
            vec![record("cat", Some("100")), alias("kitty", "cat"), alias("kittycat", "cat")],
        );
        let engine = SearchEngine::new(&store);

        let mut config = unlimited();
        config.restrict_alias = true;
        let results = engine.search::<&str>("kitty", None, &config);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].value, "cat");
        assert_eq!(results[0].post_count.as_deref(), Some("Alias"));

        config.restrict_alias = false;
        assert_eq!(engine.search::<&str>("kitty", None, &config).len(), 2);
    }

    #[test]
    fn test_translate_match() {
        let store = TagStore::new();
        let mut cat = record("cat", Some("100"));
        cat.translate = Some("猫,ねこ".to_string());
        let mut kitty = alias("kitty", "cat");
        kitty.translate = Some("子猫".to_string());
        store.replace(TableKind::Main, vec![cat, kitty]);
        let engine = SearchEngine::new(&store);

        let mut config = unlimited();
        assert_eq!(terms(&engine.search::<&str>("猫", None, &config)), vec!["cat", "kitty"]);

        config.restrict_alias = true;
        assert_eq!(terms(&engine.search::<&str>("猫", None, &config)), vec!["cat"]);
        assert_eq!(terms(&engine.search::<&str>("子猫", None, &config)), vec!["kitty"]);
    }

    #[test]
    fn test_category_filter() {
        let store = TagStore::new();
        let mut general = record("red_hair", Some("10"));
        general.category_name = Some("General".to_string());
        let mut artist = record("red_artist", Some("20"));
        artist.category_name = Some("Artist".to_string());
        store.replace(TableKind::Main, vec![general, artist, record("red", None)]);
        let engine = SearchEngine::new(&store);

        let results = engine.search("red", Some(&["general"][..]), &unlimited());
        assert_eq!(terms(&results), vec!["red_hair"]);

        let empty: [&str; 0] = [];
        assert_eq!(engine.search("red", Some(&empty[..]), &unlimited()).len(), 3);
    }

    #[test]
    fn test_result_cap() {
        let store = TagStore::new();
        store.replace(
            TableKind::Main,
            (1..=5)
                .map(|i| record(&format!("tag{}", i), Some(&i.to_string())))
                .collect(),
        );

        let config = ConfigState {
            max_count: 2,
            ..ConfigState::default()
        };
        let results = SearchEngine::new(&store).search::<&str>("tag", None, &config);
        assert_eq!(terms(&results), vec!["tag5", "tag4"]);
    }

    #[test]
    fn test_disabled_or_empty_store() {
        let store = TagStore::new();
        let engine = SearchEngine::new(&store);
        assert!(engine.search::<&str>("cat", None, &unlimited()).is_empty());

        store.replace(TableKind::Main, vec![record("cat", Some("1"))]);
        let config = ConfigState {
            enable: false,
            ..unlimited()
        };
        assert!(engine.search::<&str>("cat", None, &config).is_empty());
    }
}
