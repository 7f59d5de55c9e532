//! # CLI Error Type
//!
//! Unified error type for `till` subcommands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in till                                   │
//! │                                                                         │
//! │  Subcommand                                                            │
//! │       │                                                                 │
//! │       ├── CoreError  (rejected operation, state unchanged)  ──┐        │
//! │       ├── DbError    (could not load / import)              ──┤        │
//! │       ├── bad money text, bad config, I/O                   ──┤        │
//! │       │                                                       ▼        │
//! │       │                                                   CliError     │
//! │       │                                                       │        │
//! │       ▼                                                       ▼        │
//! │  Success (+ optional save warning)              "erro: ..." exit 1     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed *save* is not a `CliError`: the operation already happened and
//! the session reports it as a warning next to the result.

use std::path::PathBuf;
use thiserror::Error;
use till_core::{CoreError, MoneyParseError};
use till_db::DbError;

#[derive(Debug, Error)]
pub enum CliError {
    /// The register rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Loading, importing or connecting failed.
    #[error(transparent)]
    Db(#[from] DbError),

    /// A money argument could not be read.
    #[error("Invalid amount: {0}")]
    Money(#[from] MoneyParseError),

    /// No product id (or id prefix) matched.
    #[error("No product matches '{0}'")]
    UnknownProduct(String),

    /// An id prefix matched more than one product.
    #[error("'{prefix}' matches {count} products, type more of the id")]
    AmbiguousProduct { prefix: String, count: usize },

    /// Importing over a register that already has data.
    #[error("The database already holds register data, pass --replace to overwrite it")]
    ImportWouldOverwrite,

    /// Configuration file could not be parsed.
    #[error("Config file {path} is invalid: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration values are inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
