//! # till: Operator Terminal
//!
//! Command line front end for the register.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    till Startup                                         │
//! │                                                                         │
//! │  1. Parse flags (clap)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. Initialize tracing (stderr, RUST_LOG or --verbose)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. Load AppConfig (defaults → till.toml → TILL_* → --db)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  4. Open database + run migrations                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  5. Load register state → run subcommand → save                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```bash
//! till add "Camisa" -q 2 --cost 10 --price 25
//! till stage 3f2a
//! till finalize
//! till close
//! ```

mod cli;
mod commands;
mod config;
mod error;
mod prompt;
mod report;
mod session;

use anyhow::Context as _;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::commands::Context;
use crate::config::AppConfig;
use crate::session::Session;
use till_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let mut config = AppConfig::load(cli.config.clone()).context("loading configuration")?;
    if let Some(db) = cli.db.clone() {
        config.database_path = db;
    }

    if let Some(dir) = config.database_path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating data directory {}", dir.display()))?;
        }
    }

    info!(
        db = %config.database_path.display(),
        store = %config.store_name,
        "Starting till"
    );

    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    let mut session = Session::open(db).await?;

    let ctx = Context {
        config,
        assume_yes: cli.yes,
    };
    let result = commands::run(cli.command, &mut session, &ctx).await;

    session.close().await;
    Ok(result?)
}

/// Logs go to stderr so they never mix with command output.
///
/// `RUST_LOG` wins; otherwise only warnings, or register and database
/// activity with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "info,till=debug,sqlx=warn"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
