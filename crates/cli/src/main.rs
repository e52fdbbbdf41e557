//! Fashion Store cart CLI - drive a file-backed cart from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Add two red medium shirts
//! fashion-cart add --id p1 --title Shirt --price 20 --quantity 2 --color red --size M
//!
//! # Adjust and inspect
//! fashion-cart inc --id p1 --color red --size M
//! fashion-cart list
//!
//! # Hand the cart to the Checkout Service
//! fashion-cart checkout --customer-id user_2abc --email shopper@example.com
//! ```
//!
//! # Commands
//!
//! - `list` - Show cart lines and totals
//! - `add` / `remove` / `inc` / `dec` / `clear` - Mutate the cart
//! - `checkout` - Create a checkout session and print the redirect URL

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use fashion_store_cart::{CartStore, FileStorage};
use fashion_store_core::VariantKey;
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "fashion-cart")]
#[command(author, version, about = "Fashion Store cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show cart lines and totals
    List,
    /// Add a product variant to the cart
    Add(AddArgs),
    /// Remove a line from the cart
    Remove(VariantArgs),
    /// Increase a line's quantity by one
    Inc(VariantArgs),
    /// Decrease a line's quantity by one (removes it at zero)
    Dec(VariantArgs),
    /// Empty the cart
    Clear,
    /// Create a checkout session for the current cart
    Checkout(CheckoutArgs),
}

/// Variant identity of a cart line.
#[derive(Args)]
struct VariantArgs {
    /// Product ID
    #[arg(long)]
    id: String,

    /// Selected color
    #[arg(long)]
    color: Option<String>,

    /// Selected size
    #[arg(long)]
    size: Option<String>,
}

impl VariantArgs {
    fn key(&self) -> VariantKey {
        VariantKey::from_parts(self.id.as_str(), self.color.as_deref(), self.size.as_deref())
    }
}

#[derive(Args)]
struct AddArgs {
    #[command(flatten)]
    variant: VariantArgs,

    /// Product title
    #[arg(long)]
    title: String,

    /// Unit price
    #[arg(long)]
    price: Decimal,

    /// Number of units
    #[arg(short, long, default_value_t = 1)]
    quantity: u32,

    /// Product media URLs
    #[arg(long)]
    media: Vec<String>,
}

#[derive(Args)]
struct CheckoutArgs {
    /// Identity provider user ID
    #[arg(long)]
    customer_id: String,

    /// Customer email address
    #[arg(short, long)]
    email: String,

    /// Customer display name
    #[arg(short, long)]
    name: Option<String>,

    /// Empty the cart once the checkout session is created
    #[arg(long)]
    clear: bool,
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fashion_store_cli=info,fashion_store_cart=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::from_env()?;
    let mut cart = CartStore::open(FileStorage::new(&config.cart_dir));
    tracing::debug!(dir = %config.cart_dir.display(), lines = cart.len(), "Cart loaded");

    match cli.command {
        Commands::List => commands::cart::list(&cart),
        Commands::Add(args) => commands::cart::add(
            &mut cart,
            commands::cart::NewLine {
                key: args.variant.key(),
                title: args.title,
                price: args.price,
                quantity: args.quantity,
                media: args.media,
            },
        ),
        Commands::Remove(args) => commands::cart::remove(&mut cart, &args.key()),
        Commands::Inc(args) => commands::cart::increase(&mut cart, &args.key()),
        Commands::Dec(args) => commands::cart::decrease(&mut cart, &args.key()),
        Commands::Clear => cart.clear(),
        Commands::Checkout(args) => {
            commands::checkout::run(
                &config,
                &mut cart,
                commands::checkout::CustomerArgs {
                    id: args.customer_id,
                    email: args.email,
                    name: args.name,
                },
                args.clear,
            )
            .await?;
        }
    }
    Ok(())
}
