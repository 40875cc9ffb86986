//! ProductHub CLI - command-line client for the catalog API.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (stores the credential in ~/.producthub.json)
//! producthub login -e ana@example.com -p secret1
//!
//! # List products, saving the filters for next time
//! producthub products list --category Lighting --max-price 50
//!
//! # List again with the saved filters, sorted by price
//! producthub products list --sort price --desc
//!
//! # Create, update and delete
//! producthub products create --name Lamp --image https://images.unsplash.com/lamp \
//!     --description "Warm light for late nights" --category Lighting --price 24.50 --quantity 3
//! producthub products update 42 --quantity 0 --status "Out of Stock"
//! producthub products delete 42
//! ```
//!
//! # Commands
//!
//! - `login`, `signup` - Authenticate and store the credential
//! - `logout` - Forget the credential
//! - `status` - Show whether a credential and filters are stored
//! - `products list|create|update|delete` - Manage the catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;
mod config;
mod storage;

use commands::auth::AuthKind;
use commands::products::{ListArgs, ProductArgs};
use commands::{CliError, Client};
use config::CliConfig;

#[derive(Parser)]
#[command(name = "producthub")]
#[command(author, version, about = "ProductHub catalog CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the credential
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and store the credential
    Signup {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored credential
    Logout,
    /// Show the stored session
    Status,
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products (restores saved filters when none are given)
    List(ListArgs),
    /// Create a product
    Create(ProductArgs),
    /// Update a product
    Update {
        /// Product id
        id: i64,
        #[command(flatten)]
        fields: ProductArgs,
    },
    /// Delete a product
    Delete {
        /// Product id
        id: i64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "producthub=warn,producthub_dashboard=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = CliConfig::from_env()?;
    let mut client = Client::connect(&config).await?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::authenticate(&mut client, AuthKind::Login, email, password).await?;
        }
        Commands::Signup { email, password } => {
            commands::auth::authenticate(&mut client, AuthKind::Signup, email, password).await?;
        }
        Commands::Logout => commands::auth::logout(&mut client).await?,
        Commands::Status => commands::auth::status(&client).await?,
        Commands::Products { action } => match action {
            ProductsAction::List(args) => commands::products::list(&client, args).await?,
            ProductsAction::Create(fields) => commands::products::create(&client, fields).await?,
            ProductsAction::Update { id, fields } => {
                commands::products::update(&client, id, fields).await?;
            }
            ProductsAction::Delete { id } => commands::products::delete(&client, id).await?,
        },
    }
    Ok(())
}
