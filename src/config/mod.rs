//! Config module.
//! Provides configuration types, default paths and XML loading for the CLI.
//! The filesystem operations themselves take no configuration.

pub mod paths;
pub mod types;
pub mod xml;

pub use paths::{CONFIG_ENV_VAR, default_config_path, path_has_symlink_ancestor, resolve_config_path};
pub use types::{Config, LogLevel};
pub use xml::{load_config, load_config_from_xml_path};
