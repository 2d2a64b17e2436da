//! Tag tables for autocomplete
//!
//! # Components
//!
//! - `record`: suggestion records and table names
//! - `category`: category code → display name/site
//! - `loader`: CSV, model, wildcard and translation parsers
//! - `sources`: model filename providers
//! - `store`: lock-per-table record store

pub mod category;
pub mod loader;
pub mod record;
pub mod sources;
pub mod store;

pub use category::{CategoryInfo, CategoryMap};
pub use loader::Translations;
pub use record::{TableKind, TagRecord};
pub use sources::{DirectoryModelSource, ModelFileSource, ModelKind, StaticModelSource};
pub use store::TagStore;
