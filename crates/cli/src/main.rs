//! Greengrocer CLI - shop the cart backend from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (persists the session for later commands)
//! grocer login alice -p secret
//!
//! # Show the cart and its bill
//! grocer cart show
//!
//! # Update quantities
//! grocer cart add Apple
//! grocer cart remove Apple
//! grocer cart clear
//!
//! # Session info / sign out
//! grocer whoami
//! grocer logout
//! ```
//!
//! # Environment Variables
//!
//! - `GREENGROCER_API_URL` - Base URL of the cart backend
//! - `GREENGROCER_CREDENTIALS_PATH` - Where to persist the session

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;

use greengrocer_client::config::ClientConfig;
use greengrocer_client::session::Session;

mod commands;

#[derive(Parser)]
#[command(name = "grocer")]
#[command(author, version, about = "Greengrocer shopping cart client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to the cart backend
    Login {
        /// Username to sign in with
        username: String,

        /// Password (prefer an env var or prompt in scripts)
        #[arg(short, long)]
        password: String,
    },
    /// Sign out, discarding the persisted session
    Logout,
    /// Show the identity of the current session
    Whoami,
    /// Inspect and update the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show current quantities and the bill
    Show,
    /// Add one unit of an item (Apple, Banana, Melon, Lime)
    Add {
        /// Item name, case-insensitive
        item: String,
    },
    /// Remove one unit of an item
    Remove {
        /// Item name, case-insensitive
        item: String,
    },
    /// Remove everything from the cart
    Clear,
}

#[tokio::main]
async fn main() {
    // Initialize tracing; default to info for our crates if RUST_LOG is unset
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "greengrocer=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let session = Session::new(&config);

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&session, &username, SecretString::from(password)).await?;
        }
        Commands::Logout => commands::auth::logout(&session),
        Commands::Whoami => commands::auth::whoami(&session),
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&session).await?,
            CartAction::Add { item } => commands::cart::add(&session, &item).await?,
            CartAction::Remove { item } => commands::cart::remove(&session, &item).await?,
            CartAction::Clear => commands::cart::clear(&session).await?,
        },
    }
    Ok(())
}
