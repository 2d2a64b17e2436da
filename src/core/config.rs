//! Tagcomplete configuration module
//!
//! Startup settings are read from `tagcomplete.json` in the data root.
//! Missing or malformed files fall back to defaults; nothing is written back.
//! At runtime the toggles live in [`ConfigState`], which only changes through
//! its setters.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

use super::error::{Error, Result};

/// Settings file inside the data root
pub const CONFIG_FILE: &str = "tagcomplete.json";
pub const CONFIG_VERSION: u32 = 1;

/// Default cap on search results
pub const DEFAULT_MAX_COUNT: i64 = 50;

/// Translate file name meaning "no translation"
pub const NO_TRANSLATE: &str = "None";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_true")]
    pub enable: bool,

    #[serde(default)]
    pub enable_embeddings: bool,

    #[serde(default)]
    pub enable_loras: bool,

    #[serde(default)]
    pub enable_wildcards: bool,

    #[serde(default = "default_max_count")]
    pub max_count: i64,

    #[serde(default)]
    pub restrict_alias: bool,

    #[serde(default)]
    pub main_file: Option<String>,

    #[serde(default)]
    pub extra_file: Option<String>,

    #[serde(default)]
    pub translate_file: Option<String>,

    /// Wildcard directories in priority order, relative to the data root
    #[serde(default = "default_wildcard_dirs")]
    pub wildcard_dirs: Vec<String>,

    #[serde(default = "default_embeddings_dir")]
    pub embeddings_dir: String,

    #[serde(default = "default_loras_dir")]
    pub loras_dir: String,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_true() -> bool {
    true
}

fn default_max_count() -> i64 {
    DEFAULT_MAX_COUNT
}

fn default_wildcard_dirs() -> Vec<String> {
    vec!["wildcards".to_string()]
}

fn default_embeddings_dir() -> String {
    "models/embeddings".to_string()
}

fn default_loras_dir() -> String {
    "models/loras".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            enable: true,
            enable_embeddings: false,
            enable_loras: false,
            enable_wildcards: false,
            max_count: DEFAULT_MAX_COUNT,
            restrict_alias: false,
            main_file: None,
            extra_file: None,
            translate_file: None,
            wildcard_dirs: default_wildcard_dirs(),
            embeddings_dir: default_embeddings_dir(),
            loras_dir: default_loras_dir(),
        }
    }
}

impl Config {
    pub fn load(data_root: &Path) -> Self {
        let config_path = data_root.join(CONFIG_FILE);

        if !config_path.exists() {
            debug!("No {} in {}, using defaults", CONFIG_FILE, data_root.display());
            return Self::default();
        }

        match Self::load_from_file(&config_path) {
            Ok(config) => {
                if config.version > CONFIG_VERSION {
                    warn!(
                        "Config version {} is newer than supported version {}",
                        config.version, CONFIG_VERSION
                    );
                }
                config
            }
            Err(e) => {
                warn!("Failed to load {}: {}. Using defaults.", config_path.display(), e);
                Self::default()
            }
        }
    }

    fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Runtime toggles seeded from this config
    pub fn initial_state(&self) -> ConfigState {
        ConfigState {
            enable: self.enable,
            enable_embeddings: self.enable_embeddings,
            enable_loras: self.enable_loras,
            enable_wildcards: self.enable_wildcards,
            max_count: self.max_count,
            restrict_alias: self.restrict_alias,
            main_file: self.main_file.clone(),
            extra_file: self.extra_file.clone(),
            translate_file: self
                .translate_file
                .clone()
                .filter(|name| name != NO_TRANSLATE),
        }
    }
}

/// Options accepted by `set_config`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOption {
    Enable,
    EnableEmbeddings,
    EnableLoras,
    EnableWildcards,
    MaxCount,
    RestrictAlias,
}

impl ConfigOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enable => "enable",
            Self::EnableEmbeddings => "enable_embeddings",
            Self::EnableLoras => "enable_loras",
            Self::EnableWildcards => "enable_wildcards",
            Self::MaxCount => "maxCount",
            Self::RestrictAlias => "restrictAlias",
        }
    }
}

impl FromStr for ConfigOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "enable" => Ok(Self::Enable),
            "enable_embeddings" => Ok(Self::EnableEmbeddings),
            "enable_loras" => Ok(Self::EnableLoras),
            "enable_wildcards" => Ok(Self::EnableWildcards),
            "maxCount" | "max_count" => Ok(Self::MaxCount),
            "restrictAlias" | "restrict_alias" => Ok(Self::RestrictAlias),
            other => Err(Error::UnknownOption(other.to_string())),
        }
    }
}

/// Process-wide toggles consumed by search and the source loaders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigState {
    pub enable: bool,
    pub enable_embeddings: bool,
    pub enable_loras: bool,
    pub enable_wildcards: bool,
    /// Result cap; zero or negative means unlimited
    pub max_count: i64,
    pub restrict_alias: bool,
    pub main_file: Option<String>,
    pub extra_file: Option<String>,
    pub translate_file: Option<String>,
}

impl Default for ConfigState {
    fn default() -> Self {
        Config::default().initial_state()
    }
}

impl ConfigState {
    /// Apply a loosely typed option value, as received from a transport layer
    pub fn set(&mut self, option: ConfigOption, value: &Value) -> Result<()> {
        match option {
            ConfigOption::Enable => self.set_enable(as_bool(option, value)?),
            ConfigOption::EnableEmbeddings => self.set_enable_embeddings(as_bool(option, value)?),
            ConfigOption::EnableLoras => self.set_enable_loras(as_bool(option, value)?),
            ConfigOption::EnableWildcards => self.set_enable_wildcards(as_bool(option, value)?),
            ConfigOption::MaxCount => self.set_max_count(as_int(option, value)?),
            ConfigOption::RestrictAlias => self.set_restrict_alias(as_bool(option, value)?),
        }
        Ok(())
    }

    pub fn set_enable(&mut self, enabled: bool) {
        self.enable = enabled;
    }

    pub fn set_enable_embeddings(&mut self, enabled: bool) {
        self.enable_embeddings = enabled;
    }

    pub fn set_enable_loras(&mut self, enabled: bool) {
        self.enable_loras = enabled;
    }

    pub fn set_enable_wildcards(&mut self, enabled: bool) {
        self.enable_wildcards = enabled;
    }

    pub fn set_max_count(&mut self, count: i64) {
        self.max_count = count;
    }

    pub fn set_restrict_alias(&mut self, enabled: bool) {
        self.restrict_alias = enabled;
    }

    pub fn set_main_file(&mut self, filename: Option<String>) {
        self.main_file = filename;
    }

    pub fn set_extra_file(&mut self, filename: Option<String>) {
        self.extra_file = filename;
    }

    pub fn set_translate_file(&mut self, filename: Option<String>) {
        self.translate_file = filename.filter(|name| !name.is_empty() && name != NO_TRANSLATE);
    }

    /// Result cap as a usable limit
    pub fn limit(&self) -> Option<usize> {
        if self.max_count > 0 {
            Some(self.max_count as usize)
        } else {
            None
        }
    }
}

fn as_bool(option: ConfigOption, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        other => Err(invalid(option, other)),
    }
}

fn as_int(option: ConfigOption, value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| invalid(option, value)),
        Value::String(s) => s.trim().parse().map_err(|_| invalid(option, value)),
        Value::Null => Ok(0),
        other => Err(invalid(option, other)),
    }
}

fn invalid(option: ConfigOption, value: &Value) -> Error {
    Error::InvalidValue {
        option: option.as_str().to_string(),
        value: value.to_string(),
    }
}
