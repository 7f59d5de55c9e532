//! # Application Configuration
//!
//! Where the register lives and how money and reports look.
//!
//! ## Configuration Sources (in priority order)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Loading                                │
//! │                                                                         │
//! │  1. Command-line flags (--db, highest priority)                        │
//! │     └── applied in main.rs after loading                               │
//! │                                                                         │
//! │  2. Environment variables                                              │
//! │     └── TILL_DB_PATH, TILL_REPORTS_DIR,                                │
//! │         TILL_STORE_NAME, TILL_CURRENCY_SYMBOL                          │
//! │                                                                         │
//! │  3. Config file (--config or platform default)                         │
//! │     ~/.config/till/till.toml (Linux)                                   │
//! │     ~/Library/Application Support/com.till.register/till.toml (macOS)  │
//! │                                                                         │
//! │  4. Defaults (lowest priority)                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Config File
//! ```toml
//! # till.toml
//! database_path = "/srv/loja/till.db"
//! store_name = "Ousadia Vest"
//!
//! [currency]
//! symbol = "R$"
//! decimal_separator = ","
//! thousands_separator = "."
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{CliError, CliResult};
use till_core::CurrencyFormat;

const DB_FILE: &str = "till.db";
const CONFIG_FILE: &str = "till.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file holding the register state.
    pub database_path: PathBuf,

    /// Where closing reports are written. Defaults to `reports/` next to the
    /// database.
    pub reports_dir: Option<PathBuf>,

    /// Printed at the top of every closing report.
    pub store_name: String,

    pub currency: CurrencyFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: default_database_path(),
            reports_dir: None,
            store_name: "Ousadia Vest".to_string(),
            currency: CurrencyFormat::brl(),
        }
    }
}

impl AppConfig {
    /// Loads defaults, then the config file (if present), then environment
    /// overrides, and validates the result.
    pub fn load(config_path: Option<PathBuf>) -> CliResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> CliResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `TILL_*` environment variables.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("TILL_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = PathBuf::from(path);
        }

        if let Some(dir) = lookup("TILL_REPORTS_DIR") {
            self.reports_dir = Some(PathBuf::from(dir));
        }

        if let Some(name) = lookup("TILL_STORE_NAME") {
            self.store_name = name;
        }

        if let Some(symbol) = lookup("TILL_CURRENCY_SYMBOL") {
            self.currency.symbol = symbol;
        }
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.store_name.trim().is_empty() {
            return Err(CliError::InvalidConfig("store_name must not be empty".into()));
        }

        if self.currency.symbol.trim().is_empty() {
            return Err(CliError::InvalidConfig(
                "currency.symbol must not be empty".into(),
            ));
        }

        let (decimal, thousands) = (
            self.currency.decimal_separator,
            self.currency.thousands_separator,
        );
        if decimal == thousands {
            return Err(CliError::InvalidConfig(format!(
                "decimal and thousands separators must differ, both are '{decimal}'"
            )));
        }
        if decimal.is_ascii_digit() || thousands.is_ascii_digit() {
            return Err(CliError::InvalidConfig(
                "separators must not be digits".into(),
            ));
        }

        Ok(())
    }

    /// Reports directory, falling back to `reports/` beside the database.
    pub fn reports_dir(&self) -> PathBuf {
        match &self.reports_dir {
            Some(dir) => dir.clone(),
            None => self
                .database_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("reports"),
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "till", "register")
}

/// Platform data directory, or the working directory when there is none.
fn default_database_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join(DB_FILE))
        .unwrap_or_else(|| PathBuf::from(DB_FILE))
}
