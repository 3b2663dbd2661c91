//! BakeAPI CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bakeapi-cli migrate
//!
//! # Load fixtures, wiping existing data first
//! bakeapi-cli seed fixtures/seed.yaml --clear
//!
//! # Create a user
//! bakeapi-cli user create -e paul@example.com -p 'croissant123' -b "Chez Paul"
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Load users and products from a YAML file
//! - `user create` - Create a user

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bakeapi-cli")]
#[command(author, version, about = "BakeAPI CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load users and products from a YAML fixture file
    Seed {
        /// Path to the fixture file
        file: String,

        /// Delete all existing users and products first
        #[arg(long)]
        clear: bool,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Login email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Bakery display name
        #[arg(short, long)]
        bakery: Option<String>,
    },
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
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file, clear } => commands::seed::run(&file, clear).await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                password,
                bakery,
            } => {
                commands::user::create(&email, &password, bakery.as_deref()).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seed_with_clear() {
        let cli = Cli::try_parse_from(["bakeapi-cli", "seed", "fixtures/seed.yaml", "--clear"])
            .expect("valid arguments");
        assert!(matches!(
            cli.command,
            Commands::Seed { ref file, clear: true } if file == "fixtures/seed.yaml"
        ));
    }

    #[test]
    fn test_parse_user_create() {
        let cli = Cli::try_parse_from([
            "bakeapi-cli", "user", "create", "-e", "paul@example.com", "-p", "croissant123",
        ])
        .expect("valid arguments");
        let Commands::User {
            action: UserAction::Create { email, bakery, .. },
        } = cli.command
        else {
            panic!("expected user create");
        };
        assert_eq!(email, "paul@example.com");
        assert!(bakery.is_none());
    }
}
