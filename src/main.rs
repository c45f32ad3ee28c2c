//! # Price Harness CLI (`prh`)
//!
//! The `prh` binary ingests supermarket price lists into a local catalog and
//! compares shopping lists against it, either directly or through the HTTP
//! server.
//!
//! ## Usage
//!
//! ```bash
//! prh --config ./config/prh.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `prh init` | Create the SQLite database and run schema migrations |
//! | `prh ingest <file> --supermarket <id>` | Extract a price list and merge it into the catalog |
//! | `prh compare [list.json] --item NAME[:QTY[:BRAND]]` | Compare a shopping list across supermarkets |
//! | `prh supermarkets` | List known supermarkets |
//! | `prh products <id>` | List one supermarket's catalog |
//! | `prh serve` | Start the HTTP API server |
//!
//! ## Examples
//!
//! ```bash
//! prh init --config ./config/prh.toml
//! prh ingest ./flyers/bompreco.pdf --supermarket bompreco
//! prh compare --item "Arroz Tipo 1:2" --item "Feijão Carioca"
//! RUST_LOG=price_harness=debug prh compare list.json --json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use price_harness::{compare_cmd, config, ingest, migrate, server};

/// Price Harness CLI: supermarket price-list ingestion and shopping-list
/// comparison.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/prh.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "prh",
    about = "Price Harness — supermarket price catalog and shopping-list comparison",
    version,
    long_about = "Price Harness extracts (product, price, promotion) entries from supermarket \
    price lists (text, CSV, PDF, XLSX), keeps the latest price per product and supermarket, \
    and compares shopping lists across supermarkets via a CLI and an HTTP API."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/prh.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the `prices` table. Running it
    /// more than once is safe.
    Init,

    /// Extract a price-list document and merge it into the catalog.
    ///
    /// The document is parsed best-effort: lines that do not yield a
    /// product and a price are counted as skipped. Nothing is written if
    /// the document cannot be decoded.
    Ingest {
        /// Price-list file (.txt, .csv, .pdf, .xlsx).
        file: PathBuf,

        /// Supermarket identifier the prices belong to.
        #[arg(long)]
        supermarket: String,

        /// Override the content type inferred from the file extension.
        #[arg(long)]
        content_type: Option<String>,
    },

    /// Compare a shopping list across all known supermarkets.
    Compare {
        /// JSON file holding an array of `{name, quantity, brand}` items.
        list: Option<PathBuf>,

        /// Add an item as `NAME[:QTY[:BRAND]]` (repeatable).
        #[arg(long = "item", value_parser = compare_cmd::parse_item)]
        items: Vec<price_harness::models::ShoppingItem>,

        /// Print the comparison as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List known supermarkets.
    Supermarkets,

    /// List the catalog of one supermarket.
    Products {
        supermarket: String,

        /// Print the listing as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP API server.
    ///
    /// Binds to the address configured in `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ingest {
            file,
            supermarket,
            content_type,
        } => {
            ingest::run_ingest(&cfg, &file, &supermarket, content_type.as_deref()).await?;
        }
        Commands::Compare { list, items, json } => {
            compare_cmd::run_compare(&cfg, list.as_deref(), items, json).await?;
        }
        Commands::Supermarkets => {
            compare_cmd::run_supermarkets(&cfg).await?;
        }
        Commands::Products { supermarket, json } => {
            compare_cmd::run_products(&cfg, &supermarket, json).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
