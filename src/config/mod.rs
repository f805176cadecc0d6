//! On-disk configuration: a small YAML file in the user's home directory
//! holding the database location and the default identity used when the
//! CLI flags are omitted.

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_tenant")]
    pub default_tenant: String,
    pub default_user: Option<String>,
    #[serde(default = "default_role")]
    pub default_role: String,
}

fn default_tenant() -> String {
    "default".to_string()
}

fn default_role() -> String {
    "employee".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            default_tenant: default_tenant(),
            default_user: None,
            default_role: default_role(),
        }
    }
}

impl Config {
    /// Standard configuration directory for the platform.
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".stafftime")
    }

    /// Full path of the config file.
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("stafftime.conf")
    }

    /// Full path of the SQLite database.
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("stafftime.sqlite")
    }

    /// Load configuration from file, or defaults if none exists yet.
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_yaml::from_str(&content)
                .map_err(|e| AppError::Config(format!("failed to parse {}: {e}", path.display())))
        } else {
            Ok(Config::default())
        }
    }

    /// Create the config directory, write the config file and create an
    /// empty database file if missing. `is_test` skips the config write so
    /// test runs never touch the user's real configuration.
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<PathBuf> {
        let db_path = match custom_db {
            Some(name) => {
                let p = PathBuf::from(&name);
                if p.is_absolute() {
                    p
                } else {
                    Self::config_dir().join(p)
                }
            }
            None => Self::database_file(),
        };

        if !is_test {
            fs::create_dir_all(Self::config_dir())?;

            let config = Config {
                database: db_path.to_string_lossy().to_string(),
                ..Config::default()
            };

            let yaml = serde_yaml::to_string(&config)
                .map_err(|e| AppError::Config(format!("failed to serialize configuration: {e}")))?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        Ok(db_path)
    }
}
