//! CLI administration tool for qrlink.
//!
//! Manages dashboard accounts, shows scan statistics and checks the database
//! without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin admin -- user create
//! cargo run --bin admin -- user list
//! cargo run --bin admin -- user delete alice@example.com
//! cargo run --bin admin -- stats
//! cargo run --bin admin -- db check
//! cargo run --bin admin -- db purge-sessions
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use qrlink::application::services::auth_service::{
    Registration, hash_password, validate_registration,
};
use qrlink::domain::entities::NewUser;
use qrlink::domain::repositories::{SessionRepository, UserRepository};
use qrlink::infrastructure::persistence::{PgSessionRepository, PgUserRepository};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage dashboard accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Show link and scan statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create an account
    Create {
        #[arg(short, long)]
        username: Option<String>,

        #[arg(short, long)]
        email: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all accounts
    List,

    /// Delete an account and all of its links
    Delete {
        /// Account ID or email
        id_or_email: String,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,

    /// Apply pending migrations
    Migrate,

    /// Delete expired login sessions
    PurgeSessions,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgUserRepository::new(Arc::new(pool.clone())));

    match action {
        UserAction::Create {
            username,
            email,
            yes,
        } => create_user(repo, username, email, yes).await,
        UserAction::List => list_users(repo).await,
        UserAction::Delete { id_or_email } => delete_user(repo, id_or_email).await,
    }
}

/// Creates an account with interactive prompts for missing fields.
///
/// The password is always read interactively and stored as an Argon2id hash.
async fn create_user(
    repo: Arc<PgUserRepository>,
    username: Option<String>,
    email: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "👤 Create account".bright_blue().bold());
    println!();

    let username = match username {
        Some(u) => u,
        None => Input::new().with_prompt("Username").interact_text()?,
    };
    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;

    let (username, email) = validate_registration(&Registration {
        username,
        email,
        password: password.clone(),
    })
    .map_err(|e| anyhow::anyhow!("{}", e))?;

    if repo
        .exists(&username, &email)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
    {
        anyhow::bail!("Username or email already registered");
    }

    println!();
    println!("  Username: {}", username.cyan());
    println!("  Email:    {}", email.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this account?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let password_hash = hash_password(&password).map_err(|e| anyhow::anyhow!("{}", e))?;
    let user = repo
        .create(NewUser {
            username,
            email,
            password_hash,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create account: {}", e))?;

    println!(
        "{} (id {})",
        "✅ Account created".green().bold(),
        user.id.to_string().bright_white()
    );
    println!();

    Ok(())
}

async fn list_users(repo: Arc<PgUserRepository>) -> Result<()> {
    println!("{}", "📋 Accounts".bright_blue().bold());
    println!();

    let users = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list accounts: {}", e))?;

    if users.is_empty() {
        println!("{}", "  No accounts found".yellow());
        println!();
        println!(
            "  Create one with: {} admin user create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<5} {:<20} {:<32} {:<20}",
        "ID".bright_white().bold(),
        "Username".bright_white().bold(),
        "Email".bright_white().bold(),
        "Created".bright_white().bold()
    );
    println!("  {}", "─".repeat(80).bright_black());

    for user in &users {
        println!(
            "  {:<5} {:<20} {:<32} {}",
            user.id.to_string().bright_black(),
            user.username.cyan(),
            user.email,
            user.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black()
        );
    }

    println!();
    println!("  Total: {}", users.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Deletes an account by ID or email. Links cascade with it.
async fn delete_user(repo: Arc<PgUserRepository>, id_or_email: String) -> Result<()> {
    println!("{}", "🗑  Delete account".bright_blue().bold());
    println!();

    let user = match id_or_email.parse::<i64>() {
        Ok(id) => repo.find_by_id(id).await,
        Err(_) => repo.find_by_email(&id_or_email.to_lowercase()).await,
    }
    .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
    .context("Account not found")?;

    println!("  Username: {}", user.username.cyan());
    println!("  Email:    {}", user.email);
    println!();
    println!(
        "{}",
        "⚠️  All of this account's links will be deleted. Printed QR codes will stop working."
            .red()
            .bold()
    );
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Delete this account?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    repo.delete(user.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete account: {}", e))?;

    println!("{}", "✅ Account deleted".green().bold());
    println!();

    Ok(())
}

async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let users_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let (links_count, active_count, scans_count): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*)::bigint,
            COUNT(*) FILTER (WHERE active)::bigint,
            COALESCE(SUM(scan_count), 0)::bigint
        FROM short_links
        "#,
    )
    .fetch_one(pool)
    .await?;

    let sessions_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE expires_at > NOW()")
            .fetch_one(pool)
            .await?;

    println!(
        "  Accounts:        {}",
        users_count.to_string().bright_green().bold()
    );
    println!(
        "  Links:           {} ({} active)",
        links_count.to_string().bright_green().bold(),
        active_count.to_string().green()
    );
    println!(
        "  Scans:           {}",
        scans_count.to_string().bright_green().bold()
    );
    println!(
        "  Active sessions: {}",
        sessions_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
        DbAction::Migrate => {
            sqlx::migrate!("./migrations")
                .run(pool)
                .await
                .context("Failed to run migrations")?;

            println!("{}", "✅ Migrations applied".green().bold());
        }
        DbAction::PurgeSessions => {
            let repo = PgSessionRepository::new(Arc::new(pool.clone()));
            let removed = repo
                .purge_expired()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to purge sessions: {}", e))?;

            println!(
                "{} {}",
                "✅ Expired sessions removed:".green().bold(),
                removed.to_string().bright_white()
            );
        }
    }

    Ok(())
}
