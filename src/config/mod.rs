//! Configuration loading and resolution.
pub(crate) mod apply;
mod loader;
pub mod types;


pub use apply::resolve_config;
pub use loader::{DEFAULT_CONFIG_FILES, load_config};
pub use types::{ConfigFile, DurationValue, LoadConfig};

#[cfg(test)]
pub(crate) use loader::load_config_file;
