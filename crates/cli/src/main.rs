//! King Burger CLI - cart and checkout from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Put two burgers in the cart
//! kb-cli cart add --id burger-1 --name "Classic" --price 75.00
//! kb-cli cart add --id burger-1 --name "Classic" --price 75.00
//!
//! # Store the token issued by the login flow
//! kb-cli session set-token eyJhbGciOi...
//!
//! # Check out and print the payment URL
//! kb-cli checkout --payment-type card
//!
//! # Past orders
//! kb-cli orders --status paid --page 1
//! ```
//!
//! # Commands
//!
//! - `cart` - List, add, remove and clear cart lines
//! - `session` - Store or clear the bearer token
//! - `checkout` - Create an order and start payment
//! - `orders` - Page through previous orders

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use kingburger_checkout::{Checkout, CheckoutConfig, FileStore};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::checkout::CheckoutArgs;
use commands::orders::OrdersArgs;

#[derive(Parser)]
#[command(name = "kb-cli")]
#[command(author, version, about = "King Burger cart and checkout")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Manage the login session
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Place an order for the cart and start payment
    Checkout(CheckoutArgs),
    /// List previous orders
    Orders(OrdersArgs),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CheckoutConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kingburger_checkout=info,kingburger_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match CheckoutConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &CheckoutConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(FileStore::new(config.data_dir.clone()));
    let checkout = Checkout::from_config(store, config)?;

    match cli.command {
        Commands::Cart { action } => commands::cart::run(checkout.cart(), action)?,
        Commands::Session { action } => commands::session::run(checkout.session(), action)?,
        Commands::Checkout(args) => commands::checkout::run(&checkout, args).await?,
        Commands::Orders(args) => commands::orders::run(&checkout, args).await?,
    }
    Ok(())
}
