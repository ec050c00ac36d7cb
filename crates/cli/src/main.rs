//! Papelería CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! papeleria-cli migrate
//!
//! # Create a confirmed admin account
//! papeleria-cli user create-admin -e admin@example.com -n "Admin" -p 'una-contraseña-larga'
//!
//! # Give an existing account the admin role
//! papeleria-cli user promote -e cliente@example.com
//!
//! # Insert demo catalog data
//! papeleria-cli seed
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "papeleria-cli")]
#[command(author, version, about = "Papelería CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage shop accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Insert demo categories, suppliers and products
    Seed,
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a confirmed admin account
    CreateAdmin {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
    /// Give an existing account the admin role
    Promote {
        /// Email address of the account
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "papeleria_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::CreateAdmin {
                email,
                name,
                password,
            } => {
                let id = commands::user::create_admin(&email, &name, &password).await?;
                tracing::info!(user_id = %id, "Admin account ready");
            }
            UserAction::Promote { email } => commands::user::promote(&email).await?,
        },
        Commands::Seed => commands::seed::run().await?,
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
    fn test_parses_create_admin() {
        let cli = Cli::try_parse_from([
            "papeleria-cli",
            "user",
            "create-admin",
            "-e",
            "admin@example.com",
            "-n",
            "Admin",
            "-p",
            "contraseña-segura",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::User {
                action: UserAction::CreateAdmin { .. }
            })
        ));
    }
}
