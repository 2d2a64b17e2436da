//! Wildcard key → option list mapping with glob and suffix lookup

use std::collections::BTreeMap;

use tracing::debug;

use super::syntax::WILDCARD_RE;
use crate::core::error::Error;

/// Lowercase, `\` → `/`, space → `-`
pub fn normalize_key(name: &str) -> String {
    name.replace('\\', "/").replace(' ', "-").to_lowercase()
}

#[derive(Debug, Clone, Default)]
pub struct WildcardSet {
    entries: BTreeMap<String, Vec<String>>,
}

impl WildcardSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the normalized key is already taken; returns whether it was added
    pub fn insert(&mut self, key: &str, options: Vec<String>) -> bool {
        let key = normalize_key(key);
        if self.entries.contains_key(&key) {
            debug!("Wildcard '{}' already loaded, keeping first", key);
            return false;
        }
        self.entries.insert(key, options);
        true
    }

    pub fn get(&self, key: &str) -> Option<&Vec<String>> {
        self.entries.get(&normalize_key(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Options for a reference name.
    ///
    /// Exact key first; a name containing `*` is a glob over all keys; a bare
    /// name with no `/` also matches any `<dir>/<name>` key.
    pub fn resolve(&self, name: &str) -> Option<Vec<&str>> {
        let key = normalize_key(name);

        if let Some(options) = self.entries.get(&key) {
            return Some(options.iter().map(String::as_str).collect());
        }

        if key.contains('*') {
            return self.resolve_glob(&key);
        }

        if !key.contains('/') {
            return self.resolve_glob(&format!("*/{}", key));
        }

        None
    }

    /// Concatenated options of every resolvable reference inside `text`
    pub fn options_in(&self, text: &str) -> Vec<&str> {
        WILDCARD_RE
            .captures_iter(text)
            .filter_map(|caps| self.resolve(&caps[1]))
            .flatten()
            .collect()
    }

    fn resolve_glob(&self, pattern: &str) -> Option<Vec<&str>> {
        let matcher = match glob::Pattern::new(pattern) {
            Ok(matcher) => matcher,
            Err(e) => {
                let err = Error::InvalidGlobPattern {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                };
                debug!("{}", err);
                return None;
            }
        };

        let options: Vec<&str> = self
            .entries
            .iter()
            .filter(|(key, _)| matcher.matches(key))
            .flat_map(|(_, options)| options.iter().map(String::as_str))
            .collect();

        if options.is_empty() {
            None
        } else {
            Some(options)
        }
    }
}

impl<K: AsRef<str>> FromIterator<(K, Vec<String>)> for WildcardSet {
    fn from_iter<I: IntoIterator<Item = (K, Vec<String>)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (key, options) in iter {
            set.insert(key.as_ref(), options);
        }
        set
    }
}
