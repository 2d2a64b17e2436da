//! Wildcard templates for prompt generation
//!
//! # Components
//!
//! - `set`: loaded key → options mapping and reference lookup
//! - `loader`: `.txt`/`.yaml` directory reader
//! - `syntax`: comments, quantifiers and the template parser
//! - `select`: weights and multi-select
//! - `engine`: seeded multi-pass expansion

pub mod engine;
pub mod loader;
pub mod select;
pub mod set;
pub mod syntax;

pub use engine::{TemplateEngine, MAX_PASSES};
pub use loader::LoadStats;
pub use set::{normalize_key, WildcardSet};
