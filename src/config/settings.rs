//! TOML-based configuration for tundra.
//!
//! Supports a config file (tundra.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [warehouse]
//! account = "${SNOWFLAKE_ACCOUNT}"
//! user = "${SNOWFLAKE_USER}"
//! password = "${SNOWFLAKE_PASSWORD}"
//! warehouse = "COMPUTE_WH"
//! database = "SALES"
//! schema = "PUBLIC"
//! role = "ANALYST"
//!
//! [annotations]
//! path = "metadata/db_schema.yml"
//!
//! [context]
//! include_annotations = false
//! max_chars = 12000
//!
//! [merge]
//! qualify_custom_keys = false
//!
//! [worker]
//! path = "./tundra-worker"
//! timeout_secs = 30
//!
//! [logging]
//! level = "info"
//! file = "logs/tundra.log"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::{ContextRenderer, KeyPolicy, MergeOptions};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Warehouse connection.
    pub warehouse: WarehouseSettings,

    /// Annotation document location.
    pub annotations: AnnotationSettings,

    /// Schema context rendering.
    pub context: ContextSettings,

    /// Catalog merge behaviour.
    pub merge: MergeSettings,

    /// Worker configuration.
    pub worker: WorkerSettings,

    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Warehouse connection settings.
///
/// Every value supports `${ENV_VAR}` expansion.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct WarehouseSettings {
    pub account: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub warehouse: Option<String>,
    pub database: Option<String>,
    pub schema: Option<String>,
    pub role: Option<String>,
}

impl WarehouseSettings {
    /// True if no warehouse value is configured at all.
    pub fn is_empty(&self) -> bool {
        self.account.is_none()
            && self.user.is_none()
            && self.password.is_none()
            && self.warehouse.is_none()
            && self.database.is_none()
            && self.schema.is_none()
            && self.role.is_none()
    }

    /// Copy with environment variables expanded in every value.
    pub fn resolved(&self) -> Result<Self, SettingsError> {
        fn expand(value: &Option<String>) -> Result<Option<String>, SettingsError> {
            value.as_deref().map(expand_env_vars).transpose()
        }

        Ok(Self {
            account: expand(&self.account)?,
            user: expand(&self.user)?,
            password: expand(&self.password)?,
            warehouse: expand(&self.warehouse)?,
            database: expand(&self.database)?,
            schema: expand(&self.schema)?,
            role: expand(&self.role)?,
        })
    }
}

/// Annotation document settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnnotationSettings {
    /// Path to the YAML annotation document.
    pub path: PathBuf,
}

impl Default for AnnotationSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("metadata/db_schema.yml"),
        }
    }
}

/// Context rendering settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ContextSettings {
    /// Include column types/descriptions next to column names.
    pub include_annotations: bool,

    /// Upper bound on the rendered context size.
    pub max_chars: Option<usize>,
}

impl ContextSettings {
    pub fn renderer(&self) -> ContextRenderer {
        ContextRenderer {
            include_annotations: self.include_annotations,
            max_chars: self.max_chars,
        }
    }
}

/// Merge settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MergeSettings {
    /// Qualify bare custom table names with the warehouse schema before
    /// merging, so `orders` matches `PUBLIC.ORDERS`. Matching is then
    /// case-insensitive.
    pub qualify_custom_keys: bool,
}

impl MergeSettings {
    /// Merge options for a warehouse schema.
    pub fn options(&self, schema: &str) -> MergeOptions {
        let key_policy = if self.qualify_custom_keys {
            KeyPolicy::QualifyBareNames {
                schema: schema.to_string(),
            }
        } else {
            KeyPolicy::Literal
        };
        MergeOptions { key_policy }
    }
}

/// Worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Path to worker binary.
    pub path: Option<String>,

    /// Timeout for each worker request, in seconds.
    pub timeout_secs: u64,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            path: None,
            timeout_secs: 30,
        }
    }
}

impl WorkerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the worker binary path.
    ///
    /// Returns the configured path, or the first existing candidate from the
    /// usual locations.
    pub fn worker_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.path {
            let expanded = expand_env_vars(path).ok()?;
            return Some(PathBuf::from(expanded));
        }

        let candidates = ["tundra-worker", "./tundra-worker", "./worker/tundra-worker"];

        for candidate in candidates {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Some(path);
            }
        }

        // Try PATH
        if let Ok(output) = std::process::Command::new("which")
            .arg("tundra-worker")
            .output()
        {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Some(PathBuf::from(path));
                }
            }
        }

        None
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level filter (`RUST_LOG` takes precedence).
    pub level: String,

    /// Also append log lines to this file.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `TUNDRA_CONFIG`
    /// 2. `./tundra.toml`
    /// 3. `~/.config/tundra/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("TUNDRA_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("tundra.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tundra").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept as-is.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name = if chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut name = String::new();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                name.push(ch);
            }
            name
        } else {
            let mut name = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_alphanumeric() || ch == '_' {
                    name.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            if name.is_empty() {
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
