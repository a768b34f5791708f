//! Configuration loading for the CLI.
//!
//! Values are merged with the precedence command-line flag, then `-S key=value`
//! override, then config file, then built-in default.

mod builder;
mod defaults;
mod file;
mod models;

pub use builder::build_config;
pub use models::AppConfig;
