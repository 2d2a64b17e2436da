//! Configuration, data paths and the shared error type

pub mod config;
pub mod error;
pub mod paths;

pub use config::{Config, ConfigOption, ConfigState};
pub use error::{Error, Result};
pub use paths::DataPaths;
