//! # storefront: Tienda Command-Line Client
//!
//! Browse the catalog, manage the persisted cart, place orders and run the
//! admin order desk from a terminal.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize Logging                                                 │
//! │     • tracing-subscriber with env filter                               │
//! │     • Default: info,tienda=debug; override with RUST_LOG               │
//! │                                                                         │
//! │  2. Load Configuration                                                 │
//! │     • defaults → storefront.toml (or --config) → TIENDA_* env          │
//! │                                                                         │
//! │  3. Run Subcommand                                                     │
//! │     • on failure: user-facing message on stderr, exit code 1           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

use tienda_client::ClientConfig;

mod commands;

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Tienda storefront client - catalog, cart, checkout and admin", long_about = None)]
struct Cli {
    /// Config file (default: platform config dir / storefront.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List products
    Products {
        /// Only this category ("todos" for all)
        #[arg(long)]
        category: Option<String>,

        /// Case-insensitive text in the product name
        #[arg(long, default_value = "")]
        search: String,

        /// default | precio-asc | precio-desc | nombre | stock
        #[arg(long, default_value = "default")]
        sort: String,
    },

    /// List product categories
    Categories,

    /// Show or change the cart
    #[command(subcommand)]
    Cart(CartCommand),

    /// Place an order with the current cart
    Checkout {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        address: String,
    },

    /// Order management
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand)]
pub(crate) enum CartCommand {
    /// Show cart lines and total
    Show,

    /// Add a product by id
    Add {
        id: i64,

        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        qty: i64,
    },

    /// Change a line's quantity by a delta (removes it at 0 or below)
    Qty {
        id: i64,

        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },

    /// Remove a product from the cart
    Remove { id: i64 },

    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
pub(crate) enum AdminCommand {
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        user: String,

        #[arg(short, long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Dashboard numbers
    Stats,

    /// List orders, newest first
    Orders {
        /// pendiente | en_preparacion | enviado | entregado | cancelado | 1-5
        #[arg(long)]
        status: Option<String>,

        /// Order number, customer name or email
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Show one order with its items
    Show { id: i64 },

    /// Change an order's status (wire value or menu number 1-5)
    SetStatus { id: i64, status: String },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tienda=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = ClientConfig::load(cli.config).context("loading storefront configuration")?;

    if let Err(err) = commands::run(cli.command, &config).await {
        error!(code = ?err.code(), error = %err, "Command failed");
        eprintln!("{}", err.user_message());
        std::process::exit(1);
    }

    Ok(())
}
