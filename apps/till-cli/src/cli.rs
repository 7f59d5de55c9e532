//! Command line definition.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "till", version)]
#[command(about = "Stock and cash register for a single shop terminal")]
pub struct Cli {
    /// SQLite database file (overrides the config file).
    #[arg(long, env = "TILL_DB_PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Config file (default: platform config dir, till.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Answer yes to every confirmation.
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Log register and database activity to stderr.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a product to the catalog.
    Add(ProductArgs),

    /// Overwrite a product; omitted fields keep their value.
    Edit(EditArgs),

    /// Remove a product permanently.
    Delete {
        /// Product id or a unique prefix of it.
        id: String,
    },

    /// List products, those in stock first.
    List {
        /// Only names containing this text (any case).
        term: Option<String>,
    },

    /// Put one unit of a product in the cart.
    Stage {
        /// Product id or a unique prefix of it.
        id: String,
    },

    /// Take an item out of the cart and back into stock.
    Unstage {
        /// Position as shown by `till cart`, starting at 1.
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        position: u64,
    },

    /// Show the cart.
    Cart,

    /// Commit the cart as a sale.
    Finalize,

    /// Close the day and write the closing report.
    Close,

    /// Show cash and stock figures.
    Cash,

    /// Import an export of the old browser register.
    ImportLegacy {
        /// JSON file with the storage keys.
        file: PathBuf,

        /// Overwrite a register that already has data.
        #[arg(long)]
        replace: bool,
    },
}

#[derive(Args, Debug)]
pub struct ProductArgs {
    pub name: String,

    /// Units in stock.
    #[arg(long, short = 'q', allow_hyphen_values = true)]
    pub quantity: i64,

    /// Purchase cost, e.g. 10,00.
    #[arg(long, allow_hyphen_values = true)]
    pub cost: String,

    /// Sale price, e.g. 25,00.
    #[arg(long, allow_hyphen_values = true)]
    pub price: String,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Product id or a unique prefix of it.
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, short = 'q', allow_hyphen_values = true)]
    pub quantity: Option<i64>,

    #[arg(long, allow_hyphen_values = true)]
    pub cost: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub price: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "till", "--yes", "add", "Camisa", "-q", "2", "--cost", "10", "--price", "25,00",
        ])
        .unwrap();

        assert!(cli.yes);
        match cli.command {
            Command::Add(args) => {
                assert_eq!(args.name, "Camisa");
                assert_eq!(args.quantity, 2);
                assert_eq!(args.price, "25,00");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unstage_position_starts_at_one() {
        assert!(Cli::try_parse_from(["till", "unstage", "0"]).is_err());
        assert!(Cli::try_parse_from(["till", "unstage", "1"]).is_ok());
    }
}
