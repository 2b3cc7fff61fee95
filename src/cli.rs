//! CLI argument parsing, validation, and startup helpers.

use clap::{Parser, Subcommand};
use tracing::{error, info};

use crate::db::Database;
use crate::service::create_account;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "authkit", about = "Authkit command line utilities")]
pub struct Args {
    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create a superuser in a SQLite database
    #[command(alias = "csu")]
    CreateSuperuser(CreateSuperuserArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct CreateSuperuserArgs {
    /// Path to SQLite database file
    #[arg(short, long, default_value = "authkit.db")]
    pub database: String,

    /// Superuser email
    #[arg(long, value_parser = non_empty)]
    pub email: String,

    /// Superuser username
    #[arg(long, value_parser = non_empty)]
    pub username: String,

    /// Superuser password. Prefer the AUTHKIT_PASSWORD env var over the flag
    #[arg(long, env = "AUTHKIT_PASSWORD", hide_env_values = true, value_parser = non_empty)]
    pub password: String,
}

fn non_empty(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("value cannot be empty".to_string());
    }
    Ok(s.to_string())
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

/// Handle the create-superuser command.
pub async fn handle_create_superuser(db: Database, args: &CreateSuperuserArgs) {
    match create_account(&db, &args.email, &args.username, &args.password, true).await {
        Ok(user) => {
            println!(
                "Superuser created successfully: id={}, email={}, username={}",
                user.id, user.email, user.username
            );
        }
        Err(e) => {
            error!(error = %e, "Failed to create superuser");
            std::process::exit(1);
        }
    }
}
