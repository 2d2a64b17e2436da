//! Tagcomplete context: owns the tables, wildcards and runtime toggles
//!
//! Every collaborator-facing operation goes through [`TagComplete`]. Load
//! failures of individual sources are logged and leave the affected table
//! empty; only a missing category map stops construction.

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{info, warn};

use crate::core::config::{ConfigOption, ConfigState, NO_TRANSLATE};
use crate::core::error::Result;
use crate::core::paths::DataPaths;
use crate::search::SearchEngine;
use crate::tags::loader::{self, Translations};
use crate::tags::{
    CategoryMap, DirectoryModelSource, ModelFileSource, ModelKind, TableKind, TagRecord, TagStore,
};
use crate::wildcard::TemplateEngine;

pub struct TagComplete {
    paths: DataPaths,
    categories: CategoryMap,
    models: Box<dyn ModelFileSource>,
    store: TagStore,
    templates: TemplateEngine,
    state: RwLock<ConfigState>,
    translations: RwLock<Translations>,
}

impl TagComplete {
    /// Open a data root. Nothing is loaded until [`TagComplete::load`].
    pub fn open(paths: DataPaths) -> Result<Self> {
        let categories = CategoryMap::load(&paths.category_map)?;
        let models = DirectoryModelSource::new(&paths.embeddings, &paths.loras);
        Ok(Self::with_parts(paths, categories, Box::new(models)))
    }

    pub fn with_parts(
        paths: DataPaths,
        categories: CategoryMap,
        models: Box<dyn ModelFileSource>,
    ) -> Self {
        let state = paths.config.initial_state();
        let templates = TemplateEngine::new(paths.wildcard_dirs.clone());

        Self {
            paths,
            categories,
            models,
            store: TagStore::new(),
            templates,
            state: RwLock::new(state),
            translations: RwLock::new(Translations::new()),
        }
    }

    /// Load every source selected or enabled in the current state
    pub fn load(&self) -> Result<()> {
        let state = self.config();

        if state.translate_file.is_some() {
            self.load_translate(state.translate_file.as_deref())?;
        }
        if let Some(file) = state.main_file.as_deref() {
            self.load_table(TableKind::Main, Some(file))?;
        }
        if let Some(file) = state.extra_file.as_deref() {
            self.load_table(TableKind::Extra, Some(file))?;
        }

        self.templates.load(false);

        for (kind, enabled) in [
            (TableKind::Embeddings, state.enable_embeddings),
            (TableKind::Loras, state.enable_loras),
            (TableKind::Wildcards, state.enable_wildcards),
        ] {
            if enabled {
                self.load_table(kind, None)?;
            }
        }

        info!("Tagcomplete ready: {} records", self.store.total_len());
        Ok(())
    }

    /// Drop all loaded data; file selections and toggles are kept
    pub fn unload(&self) {
        for kind in TableKind::ALL {
            self.store.clear(kind);
        }
        self.templates.unload();
        self.translations.write().clear();
    }

    pub fn reload(&self) -> Result<()> {
        self.unload();
        self.load()
    }

    /// (Re)load one table from its source; returns the record count.
    ///
    /// `file` names a CSV under `tags/` and is only used by main and extra.
    /// A missing or malformed file clears the table instead of failing.
    pub fn load_table(&self, table: TableKind, file: Option<&str>) -> Result<usize> {
        let records = match table {
            TableKind::Main | TableKind::Extra => {
                let Some(file) = file else {
                    self.unload_table(table);
                    return Ok(0);
                };
                self.select_file(table, Some(file.to_string()));
                let records = self.read_tag_file(file);
                recover(records, &format!("Clearing {} table", table))?
            }
            TableKind::Embeddings => {
                loader::parse_embeddings(&self.models.filenames(ModelKind::Embeddings))
            }
            TableKind::Loras => loader::parse_loras(&self.models.filenames(ModelKind::Loras)),
            TableKind::Wildcards => {
                self.templates.load(false);
                loader::wildcard_records(self.templates.read().iter())
            }
        };

        let count = records.len();
        self.store.replace(table, records);
        Ok(count)
    }

    /// [`TagComplete::load_table`] for a table given by name, e.g. `"extra"`
    pub fn load_table_named(&self, table: &str, file: Option<&str>) -> Result<usize> {
        self.load_table(table.parse::<TableKind>()?, file)
    }

    /// Load already-split CSV rows into `table`
    pub fn load_rows(&self, table: TableKind, rows: &[Vec<String>]) -> usize {
        let mut records = loader::parse_tag_rows(rows, &self.categories);
        if table.is_csv() {
            loader::apply_translations(&mut records, &self.translations.read());
        }

        let count = records.len();
        self.store.replace(table, records);
        count
    }

    pub fn unload_table(&self, table: TableKind) {
        self.store.clear(table);
        if table.is_csv() {
            self.select_file(table, None);
        }
    }

    /// Switch the translation file and re-apply it to main and extra.
    ///
    /// `None`, `""` and `"None"` clear all translations.
    pub fn load_translate(&self, file: Option<&str>) -> Result<usize> {
        let file = file.filter(|name| !name.is_empty() && *name != NO_TRANSLATE);

        let translations = match file {
            Some(name) => {
                let path = self.paths.translate_file(name);
                recover(loader::read_translations(&path), "Translations not loaded")?
            }
            None => Translations::new(),
        };

        for kind in [TableKind::Main, TableKind::Extra] {
            self.store
                .update(kind, |records| loader::apply_translations(records, &translations));
        }

        let count = translations.len();
        *self.translations.write() = translations;
        self.state.write().set_translate_file(file.map(String::from));

        info!("Loaded {} translations", count);
        Ok(count)
    }

    /// Apply a named option; source toggles load or clear their table
    pub fn set_config(&self, option: &str, value: &Value) -> Result<()> {
        let option: ConfigOption = option.parse()?;

        let state = {
            let mut state = self.state.write();
            state.set(option, value)?;
            state.clone()
        };

        let toggled = match option {
            ConfigOption::EnableEmbeddings => Some((TableKind::Embeddings, state.enable_embeddings)),
            ConfigOption::EnableLoras => Some((TableKind::Loras, state.enable_loras)),
            ConfigOption::EnableWildcards => Some((TableKind::Wildcards, state.enable_wildcards)),
            _ => None,
        };

        if let Some((kind, enabled)) = toggled {
            if enabled {
                if kind == TableKind::Wildcards {
                    self.templates.load(true);
                }
                self.load_table(kind, None)?;
            } else {
                self.store.clear(kind);
            }
        }

        Ok(())
    }

    /// Ranked suggestions for `term`
    pub fn search<S: AsRef<str>>(&self, term: &str, categories: Option<&[S]>) -> Vec<TagRecord> {
        let state = self.state.read();
        SearchEngine::new(&self.store).search(term, categories, &state)
    }

    /// Expand template text against the loaded wildcards
    pub fn expand(&self, text: &str, seed: u64) -> String {
        self.templates.expand(text, seed)
    }

    /// Snapshot of the runtime toggles
    pub fn config(&self) -> ConfigState {
        self.state.read().clone()
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    pub fn store(&self) -> &TagStore {
        &self.store
    }

    pub fn templates(&self) -> &TemplateEngine {
        &self.templates
    }

    fn read_tag_file(&self, file: &str) -> Result<Vec<TagRecord>> {
        let rows = loader::read_csv_rows(&self.paths.tag_file(file))?;
        let mut records = loader::parse_tag_rows(&rows, &self.categories);
        loader::apply_translations(&mut records, &self.translations.read());
        Ok(records)
    }

    fn select_file(&self, table: TableKind, file: Option<String>) {
        let mut state = self.state.write();
        match table {
            TableKind::Main => state.set_main_file(file),
            TableKind::Extra => state.set_extra_file(file),
            _ => {}
        }
    }
}

/// Log a recoverable source error and fall back to an empty value
fn recover<T: Default>(result: Result<T>, context: &str) -> Result<T> {
    match result {
        Err(e) if e.is_recoverable() => {
            warn!("{}: {}", context, e);
            Ok(T::default())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Config, CONFIG_FILE};
    use crate::core::error::Error;
    use crate::tags::StaticModelSource;
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const CATEGORIES: &str = "category,description,site\n0,General,danbooru\n4,Character,danbooru\n";

    fn data_root() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("tags")).unwrap();
        fs::create_dir_all(root.join("translate")).unwrap();
        fs::create_dir_all(root.join("wildcards/animals")).unwrap();

        fs::write(root.join("category_map.csv"), CATEGORIES).unwrap();
        fs::write(
            root.join("tags/danbooru.csv"),
            "1girl,0,5000,\ncat,0,100,\"kitty,neko\"\ncat_ears,0,800,\nhatsune_miku,4,300,miku\n",
        )
        .unwrap();
        fs::write(root.join("tags/extra-quality.csv"), "masterpiece,5,,\n").unwrap();
        fs::write(root.join("translate/ja.csv"), "cat,猫\ncat_ears,猫耳\n").unwrap();
        fs::write(root.join("wildcards/colors.txt"), "red\nblue\ngreen\n").unwrap();
        fs::write(root.join("wildcards/animals/cat.txt"), "tabby\n").unwrap();
        dir
    }

    fn write_config(root: &Path, json: &str) {
        fs::write(root.join(CONFIG_FILE), json).unwrap();
    }

    fn open(root: &Path) -> TagComplete {
        TagComplete::open(DataPaths::from_root(root.to_path_buf())).unwrap()
    }

    fn rows(lines: &[&[&str]]) -> Vec<Vec<String>> {
        lines
            .iter()
            .map(|fields| fields.iter().map(|f| f.to_string()).collect())
            .collect()
    }

    fn terms(records: &[TagRecord]) -> Vec<&str> {
        records.iter().map(|r| r.term.as_str()).collect()
    }

    #[test]
    fn test_open_requires_category_map() {
        let dir = tempfile::tempdir().unwrap();
        let result = TagComplete::open(DataPaths::from_root(dir.path().to_path_buf()));
        assert!(matches!(result, Err(Error::CategoryMap { .. })));
    }

    #[test]
    fn test_alias_round_trip() {
        let dir = data_root();
        let tc = open(dir.path());
        tc.load_rows(TableKind::Main, &rows(&[&["cat", "0", "100", "kitty"]]));
        tc.set_config("restrictAlias", &json!(true)).unwrap();

        let results = tc.search::<&str>("kitty", None);
        assert!(results
            .iter()
            .any(|r| r.value == "cat" && r.post_count.as_deref() == Some("Alias")));
    }

    #[test]
    fn test_load_from_config() {
        let dir = data_root();
        write_config(
            dir.path(),
            r#"{"mainFile": "danbooru.csv", "extraFile": "extra-quality.csv",
                "translateFile": "ja.csv", "enableWildcards": true}"#,
        );
        let tc = open(dir.path());
        tc.load().unwrap();

        assert_eq!(tc.store().len(TableKind::Main), 7);
        assert_eq!(tc.store().len(TableKind::Extra), 1);
        assert_eq!(tc.store().len(TableKind::Wildcards), 2);

        assert_eq!(terms(&tc.search::<&str>("猫", None)), vec!["cat_ears", "cat"]);

        let miku = tc.search::<&str>("miku", None);
        assert_eq!(miku[0].category_name.as_deref(), Some("Character"));
        assert_eq!(miku[1].text, "miku => hatsune_miku");

        let wildcards = tc.search::<&str>("__col", None);
        assert_eq!(wildcards[0].term, "__colors__");
        assert_eq!(wildcards[0].wildcard_value.as_deref(), Some("red,blue,green"));

        assert_eq!(tc.expand("a __cat__", 1), "a tabby");
    }

    #[test]
    fn test_missing_tag_file_clears_table() {
        let dir = data_root();
        let tc = open(dir.path());
        assert_eq!(tc.load_table(TableKind::Main, Some("danbooru.csv")).unwrap(), 7);
        assert_eq!(tc.load_table(TableKind::Main, Some("missing.csv")).unwrap(), 0);
        assert!(tc.store().read(TableKind::Main).is_empty());
        assert_eq!(tc.config().main_file.as_deref(), Some("missing.csv"));

        tc.load_table(TableKind::Main, Some("danbooru.csv")).unwrap();
        tc.unload_table(TableKind::Main);
        assert!(tc.store().read(TableKind::Main).is_empty());
        assert_eq!(tc.config().main_file, None);
    }

    #[test]
    fn test_translate_switch() {
        let dir = data_root();
        let tc = open(dir.path());
        tc.load_table(TableKind::Main, Some("danbooru.csv")).unwrap();

        assert_eq!(tc.load_translate(Some("ja.csv")).unwrap(), 2);
        assert_eq!(tc.search::<&str>("猫耳", None)[0].term, "cat_ears");
        assert_eq!(tc.config().translate_file.as_deref(), Some("ja.csv"));

        assert_eq!(tc.load_translate(Some(NO_TRANSLATE)).unwrap(), 0);
        assert_eq!(tc.load_translate(Some("missing.csv")).unwrap(), 0);
        assert!(tc.search::<&str>("猫", None).is_empty());
        assert_eq!(tc.config().translate_file, None);
    }

    #[test]
    fn test_model_toggles() {
        let dir = data_root();
        let paths = DataPaths::from_root_with_config(dir.path().to_path_buf(), Config::default());
        let models = StaticModelSource {
            embeddings: vec!["easynegative.safetensors".to_string()],
            loras: vec!["styles/ink_wash.safetensors".to_string()],
        };
        let tc = TagComplete::with_parts(paths, CategoryMap::default(), Box::new(models));

        tc.set_config("enable_loras", &json!(true)).unwrap();
        let loras = tc.search::<&str>("ink", None);
        assert_eq!(loras[0].value, "<lora:styles/ink_wash:1>");
        assert_eq!(loras[0].post_count.as_deref(), Some("LoRA"));

        tc.set_config("enable_embeddings", &json!(true)).unwrap();
        assert_eq!(
            tc.search("easy", Some(&["embedding"][..]))[0].value,
            "embedding:easynegative"
        );

        tc.set_config("enable_loras", &json!(false)).unwrap();
        assert!(tc.search::<&str>("ink", None).is_empty());
    }

    #[test]
    fn test_cap_and_disable() {
        let dir = data_root();
        let tc = open(dir.path());
        tc.load_table(TableKind::Main, Some("danbooru.csv")).unwrap();

        tc.set_config("maxCount", &json!(2)).unwrap();
        assert_eq!(
            terms(&tc.search::<&str>("a", None)),
            vec!["cat_ears", "hatsune_miku"]
        );

        tc.set_config("enable", &json!(false)).unwrap();
        assert!(tc.search::<&str>("a", None).is_empty());

        assert!(matches!(
            tc.set_config("colour", &json!(true)),
            Err(Error::UnknownOption(_))
        ));
    }

    #[test]
    fn test_reload_picks_up_changes() {
        let dir = data_root();
        write_config(dir.path(), r#"{"mainFile": "danbooru.csv"}"#);
        let tc = open(dir.path());
        tc.load().unwrap();
        assert_ne!(tc.expand("__colors__", 0), "__colors__");

        fs::write(dir.path().join("tags/danbooru.csv"), "dog,0,10,\n").unwrap();
        fs::write(dir.path().join("wildcards/sizes.txt"), "big\n").unwrap();
        tc.reload().unwrap();

        assert_eq!(terms(&tc.search::<&str>("", None)), vec!["dog"]);
        assert_eq!(tc.expand("__sizes__", 0), "big");
    }

    #[test]
    fn test_load_table_by_name() {
        let dir = data_root();
        let tc = open(dir.path());

        assert_eq!(tc.load_table_named("Extra", Some("extra-quality.csv")).unwrap(), 1);
        assert_eq!(tc.config().extra_file.as_deref(), Some("extra-quality.csv"));
        assert_eq!(tc.load_table_named("wildcards", None).unwrap(), 2);

        assert!(matches!(
            tc.load_table_named("models", None),
            Err(Error::UnknownTable(_))
        ));
    }

    #[test]
    fn test_recover_only_source_errors() {
        let missing: Result<Vec<TagRecord>> = Err(Error::parse("tags/bad.csv", "row 3"));
        assert!(recover(missing, "Clearing main table").unwrap().is_empty());

        let fatal: Result<Vec<TagRecord>> = Err(Error::CategoryMap {
            path: "category_map.csv".into(),
            message: "missing".to_string(),
        });
        assert!(matches!(
            recover(fatal, "Clearing main table"),
            Err(Error::CategoryMap { .. })
        ));
    }

    #[test]
    fn test_load_walks_wildcards_once() {
        let dir = data_root();
        write_config(dir.path(), r#"{"enableWildcards": true}"#);
        let tc = open(dir.path());
        tc.load().unwrap();
        assert_eq!(tc.store().len(TableKind::Wildcards), 2);

        fs::write(dir.path().join("wildcards/sizes.txt"), "big\n").unwrap();
        tc.load_table(TableKind::Wildcards, None).unwrap();
        assert_eq!(tc.store().len(TableKind::Wildcards), 2);

        tc.set_config("enable_wildcards", &json!(true)).unwrap();
        assert_eq!(tc.store().len(TableKind::Wildcards), 3);
    }
}
