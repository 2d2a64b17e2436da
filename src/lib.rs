//! Tag autocomplete search and wildcard prompt expansion
//!
//! [`TagComplete`] is the entry point: it owns the tag tables, the wildcard
//! templates and the runtime toggles for one data root.

pub mod core;
pub mod search;
pub mod service;
pub mod tags;
pub mod wildcard;

pub use crate::core::{Config, ConfigOption, ConfigState, DataPaths, Error, Result};
pub use service::TagComplete;
pub use tags::{TableKind, TagRecord};
pub use wildcard::TemplateEngine;
