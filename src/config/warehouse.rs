//! Warehouse connection configuration.
//!
//! Supports configuration via environment variables:
//! - `SNOWFLAKE_ACCOUNT`: Account identifier (e.g. `xy12345.eu-west-1`)
//! - `SNOWFLAKE_USER`: Login name
//! - `SNOWFLAKE_PASSWORD`: Password
//! - `SNOWFLAKE_WAREHOUSE`: Virtual warehouse (optional)
//! - `SNOWFLAKE_DATABASE`: Database name
//! - `SNOWFLAKE_SCHEMA`: Schema to introspect
//! - `SNOWFLAKE_ROLE`: Role (optional)

use std::env;
use std::fmt;

use urlencoding::encode;

use super::settings::WarehouseSettings;

/// Error type for warehouse configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Missing required setting: warehouse.{0}")]
    MissingSetting(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Driver name the worker uses for Snowflake.
pub const SNOWFLAKE_DRIVER: &str = "snowflake";

/// Warehouse connection parameters.
///
/// Built once at startup and passed to the introspector.
#[derive(Clone, PartialEq, Eq)]
pub struct WarehouseConfig {
    /// Account identifier.
    pub account: String,
    /// Login name.
    pub user: String,
    /// Password.
    pub password: String,
    /// Virtual warehouse.
    pub warehouse: Option<String>,
    /// Database name.
    pub database: String,
    /// Schema to introspect.
    pub schema: String,
    /// Role.
    pub role: Option<String>,
}

impl fmt::Debug for WarehouseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarehouseConfig")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("warehouse", &self.warehouse)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl WarehouseConfig {
    /// Load configuration from environment variables.
    ///
    /// Required: `SNOWFLAKE_ACCOUNT`, `SNOWFLAKE_USER`, `SNOWFLAKE_PASSWORD`,
    /// `SNOWFLAKE_DATABASE`, `SNOWFLAKE_SCHEMA`.
    ///
    /// Optional: `SNOWFLAKE_WAREHOUSE`, `SNOWFLAKE_ROLE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            account: required_env("SNOWFLAKE_ACCOUNT")?,
            user: required_env("SNOWFLAKE_USER")?,
            password: required_env("SNOWFLAKE_PASSWORD")?,
            warehouse: optional_env("SNOWFLAKE_WAREHOUSE"),
            database: required_env("SNOWFLAKE_DATABASE")?,
            schema: required_env("SNOWFLAKE_SCHEMA")?,
            role: optional_env("SNOWFLAKE_ROLE"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Build from the `[warehouse]` section of the settings file.
    ///
    /// String values have `${VAR}` references already expanded.
    pub fn from_settings(settings: &WarehouseSettings) -> Result<Self, ConfigError> {
        fn required(
            value: &Option<String>,
            name: &'static str,
        ) -> Result<String, ConfigError> {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingSetting(name))
        }

        let resolved = settings
            .resolved()
            .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;

        let config = Self {
            account: required(&resolved.account, "account")?,
            user: required(&resolved.user, "user")?,
            password: required(&resolved.password, "password")?,
            warehouse: resolved.warehouse.filter(|v| !v.is_empty()),
            database: required(&resolved.database, "database")?,
            schema: required(&resolved.schema, "schema")?,
            role: resolved.role.filter(|v| !v.is_empty()),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.account.contains('/') || self.account.contains('@') {
            return Err(ConfigError::InvalidConfig(format!(
                "account identifier '{}' must not contain '/' or '@'",
                self.account
            )));
        }
        Ok(())
    }

    /// Build the worker connection string.
    ///
    /// Format: `user:password@account/database/schema?warehouse=W&role=R`.
    /// Every component except the account is percent-encoded.
    pub fn to_connection_string(&self) -> String {
        let mut dsn = format!(
            "{}:{}@{}/{}/{}",
            encode(&self.user),
            encode(&self.password),
            self.account,
            encode(&self.database),
            encode(&self.schema)
        );

        let mut params = Vec::new();
        if let Some(warehouse) = &self.warehouse {
            params.push(format!("warehouse={}", encode(warehouse)));
        }
        if let Some(role) = &self.role {
            params.push(format!("role={}", encode(role)));
        }

        if !params.is_empty() {
            dsn.push('?');
            dsn.push_str(&params.join("&"));
        }
        dsn
    }

    /// Get the driver name for the worker.
    pub fn driver_name(&self) -> &'static str {
        SNOWFLAKE_DRIVER
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}
