//! Configuration module for tundra.
//!
//! Handles warehouse connection configuration, environment variables, and
//! the TOML settings file.

mod settings;
mod warehouse;

pub use settings::{
    expand_env_vars, AnnotationSettings, ContextSettings, LoggingSettings, MergeSettings,
    Settings, SettingsError, WarehouseSettings, WorkerSettings,
};
pub use warehouse::{ConfigError, WarehouseConfig, SNOWFLAKE_DRIVER};
