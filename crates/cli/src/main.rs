//! Copperleaf CLI - drive the storefront client from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! copperleaf products
//!
//! # Build a cart
//! copperleaf cart add 3
//! copperleaf cart set 3 2
//! copperleaf cart show
//!
//! # Sessions
//! copperleaf auth login ada -p secret
//! copperleaf auth whoami
//!
//! # Pay
//! copperleaf checkout
//! ```
//!
//! # Commands
//!
//! - `products` - List the catalog
//! - `cart` - Inspect and edit the cart
//! - `auth` - Log in, register, log out, show the session
//! - `checkout` - Submit the cart for payment
//! - `orders` - List all payment orders (admin)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use copperleaf_storefront::config::ClientConfig;
use copperleaf_storefront::state::Storefront;

mod commands;

#[derive(Parser)]
#[command(name = "copperleaf")]
#[command(author, version, about = "Copperleaf storefront shell")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the product catalog
    Products {
        /// Drop the cached list and refetch
        #[arg(long)]
        refresh: bool,
    },
    /// Inspect and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the session
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Submit the cart for payment
    Checkout,
    /// List all payment orders (admin only)
    Orders,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart lines and total
    Show,
    /// Add one unit of a product
    Add {
        /// Product id from `copperleaf products`
        product_id: i32,
    },
    /// Set a line to an absolute quantity
    Set {
        product_id: i32,
        quantity: u32,
    },
    /// Remove a line
    Remove {
        product_id: i32,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum AuthAction {
    /// Exchange credentials for a session
    Login {
        username: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account and log it in
    Register {
        username: String,

        #[arg(short, long)]
        password: String,

        /// Request the admin role
        #[arg(long)]
        admin: bool,
    },
    /// End the session
    Logout,
    /// Show the current session
    Whoami,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let mut store = Storefront::new(config)?;

    match cli.command {
        Commands::Products { refresh } => commands::catalog::list(&store, refresh).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&store),
            CartAction::Add { product_id } => commands::cart::add(&mut store, product_id).await?,
            CartAction::Set {
                product_id,
                quantity,
            } => commands::cart::set(&mut store, product_id, quantity),
            CartAction::Remove { product_id } => commands::cart::remove(&mut store, product_id),
            CartAction::Clear => commands::cart::clear(&mut store),
        },
        Commands::Auth { action } => match action {
            AuthAction::Login { username, password } => {
                commands::auth::login(&mut store, &username, password).await?;
            }
            AuthAction::Register {
                username,
                password,
                admin,
            } => {
                commands::auth::register(&mut store, &username, password, admin).await?;
            }
            AuthAction::Logout => commands::auth::logout(&mut store),
            AuthAction::Whoami => commands::auth::whoami(&mut store).await?,
        },
        Commands::Checkout => commands::cart::checkout(&mut store).await,
        Commands::Orders => commands::orders::list(&store).await?,
    }
    Ok(())
}
