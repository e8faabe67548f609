//! Brewhouse CLI - accounts, cart and orders from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Create an account (logs in immediately)
//! brewhouse register -n "Ana Silva" -e ana@example.com -p "(11) 91234-5678" \
//!     -a "Rua A, 100, São Paulo" --password 'Abcdef1!'
//!
//! # Log in / out
//! brewhouse login -e ana@example.com --password 'Abcdef1!'
//! brewhouse logout
//!
//! # Shop
//! brewhouse cart add Cappuccino 12.50 --size Grande
//! brewhouse cart checkout
//! brewhouse orders
//! ```
//!
//! # Commands
//!
//! - `register`, `login`, `logout`, `whoami` - Account session
//! - `cart add|remove|list|clear|checkout` - Cart ledger
//! - `orders` - Placed orders
//! - `sweep` - Delete expired store entries
//!
//! State lives in the JSON file named by `BREWHOUSE_STORE_PATH`. Logins go
//! to `BREWHOUSE_AUTH_ENDPOINT` when it is set, otherwise they are checked
//! offline against the single account in the store.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use secrecy::SecretString;

mod commands;

use commands::{CliError, Workspace, account, cart};

#[derive(Parser)]
#[command(name = "brewhouse")]
#[command(author, version, about = "Brewhouse coffee shop client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and log in
    Register {
        /// Full name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Phone number
        #[arg(short, long)]
        phone: String,

        /// Street address
        #[arg(short, long)]
        address: String,

        /// Password
        #[arg(long, env = "BREWHOUSE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log in
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(long, env = "BREWHOUSE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Show the logged-in customer
    Whoami,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// List placed orders
    Orders,
    /// Delete expired entries from the store
    Sweep,
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a drink
    Add {
        /// Drink name
        name: String,

        /// Unit price, e.g. 12.50
        price: Decimal,

        /// Cup size
        #[arg(short, long, default_value = "")]
        size: String,

        /// Milk choice
        #[arg(short, long, default_value = "")]
        milk: String,

        /// Quantity (non-positive values count as 1)
        #[arg(short, long, allow_negative_numbers = true)]
        quantity: Option<i64>,
    },
    /// Remove a line by its number in `cart list`
    Remove {
        /// Line number, starting at 1
        line: usize,
    },
    /// Show the cart
    List,
    /// Empty the cart
    Clear,
    /// Place the order
    Checkout,
}

/// Log filter used when `RUST_LOG` is unset. Command failures are logged
/// under this binary's own target and must always reach the terminal.
const DEFAULT_LOG_FILTER: &str = "brewhouse=info,brewhouse_storefront=warn,security=warn";

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), CliError> = run(cli).await;

    if let Err(e) = result {
        report_failure(&e);
        std::process::exit(1);
    }
}

fn report_failure(e: &CliError) {
    tracing::error!("Command failed: {e}");
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let workspace = Workspace::open()?;

    match cli.command {
        Commands::Register {
            name,
            email,
            phone,
            address,
            password,
        } => {
            let args = account::RegisterArgs {
                name,
                email,
                phone,
                address,
                password: SecretString::from(password),
            };
            account::register(&workspace, args).await?;
        }
        Commands::Login { email, password } => {
            account::login(&workspace, &email, &SecretString::from(password)).await?;
        }
        Commands::Logout => account::logout(&workspace)?,
        Commands::Whoami => account::whoami(&workspace)?,
        Commands::Cart { action } => match action {
            CartAction::Add {
                name,
                price,
                size,
                milk,
                quantity,
            } => cart::add(
                &workspace,
                &cart::AddArgs {
                    name,
                    price,
                    size,
                    milk,
                    quantity,
                },
            )?,
            CartAction::Remove { line } => cart::remove(&workspace, line)?,
            CartAction::List => cart::list(&workspace),
            CartAction::Clear => cart::clear(&workspace)?,
            CartAction::Checkout => cart::checkout(&workspace)?,
        },
        Commands::Orders => cart::orders(&workspace),
        Commands::Sweep => report_sweep(workspace.sweep()),
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn report_sweep(swept: usize) {
    println!("Removed {swept} expired entr{}.", if swept == 1 { "y" } else { "ies" });
}
