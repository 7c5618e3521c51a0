//! devmetrics CLI - runs the owner/repository sync job.

mod commands;
mod config;
mod progress;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "devmetrics")]
#[command(version)]
#[command(about = "Incremental GitHub owner/repository sync with commit backfill")]
#[command(
    long_about = "devmetrics keeps a local database of GitHub accounts and their repositories \
up to date. Owners refreshed within the last week are skipped; repositories seen for the \
first time are backfilled with their historical commits when they are old enough."
)]
#[command(after_long_help = r#"EXAMPLES
    Sync every configured owner and repository:
        $ devmetrics

    Sync two extra owners on top of the configured ones:
        $ devmetrics --owner bitcoin --owner ethereum

    Create or upgrade the database schema:
        $ devmetrics migrate up

CONFIGURATION
    devmetrics reads configuration from:
      1. ~/.config/devmetrics/config.toml (or $XDG_CONFIG_HOME/devmetrics/config.toml)
      2. ./devmetrics.toml
      3. The file given with --config
      4. Environment variables (DEVMETRICS_* prefix, e.g., DEVMETRICS_GITHUB_TOKEN)
      5. .env file in current directory

ENVIRONMENT VARIABLES
    DEVMETRICS_DATABASE_URL     Database connection string (default: ~/.local/state/devmetrics/devmetrics.db)
    DEVMETRICS_GITHUB_TOKEN     GitHub personal access token
    DEVMETRICS_TARGETS_OWNERS   Comma-separated owners to sync
    DEVMETRICS_TARGETS_REPOS    Comma-separated "owner/name" repositories to sync
"#)]
struct Cli {
    /// Extra config file (TOML), layered over the default locations
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Additional owner to sync (repeatable)
    #[arg(long = "owner", value_name = "OWNER")]
    owners: Vec<String>,

    /// Additional "owner/name" repository to sync (repeatable)
    #[arg(long = "repo", value_name = "OWNER/NAME")]
    repos: Vec<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Drop all tables and reapply migrations
    Fresh,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Progress bars own the terminal in TTY mode; only warnings and errors
    // are logged there.
    let default_filter = if Term::stdout().is_term() {
        "devmetrics=warn,devmetrics_cli=warn"
    } else {
        "devmetrics=info,devmetrics_cli=info"
    };
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(default_filter),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let Some(cli) = parse_cli(std::env::args_os()) else {
        return;
    };

    if let Err(e) = run(cli).await {
        tracing::error!("{}", e);
    }
}

/// Parse arguments without exiting the process.
///
/// Help, version, and usage errors are printed the way clap prints them;
/// the caller then has nothing to run.
fn parse_cli<I, T>(args: I) -> Option<Cli>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Some(cli),
        Err(e) => {
            if let Err(io) = e.print() {
                tracing::error!("Failed to print usage: {}", io);
            }
            None
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::load(cli.config.as_deref());

    let database_url = config
        .database_url()
        .ok_or("Could not determine a database URL; set [database] url")?;
    ensure_sqlite_dir(&database_url)?;

    match cli.command {
        Some(Commands::Migrate { action }) => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        None => {
            let targets = config.targets.to_targets(&cli.owners, &cli.repos);
            commands::sync::handle_sync(&config, targets, &database_url).await?;
        }
    }

    Ok(())
}

/// Ensure the database directory exists for SQLite.
fn ensure_sqlite_dir(database_url: &str) -> std::io::Result<()> {
    let Some(db_path) = sqlite_path(database_url) else {
        return Ok(());
    };

    if db_path.is_relative() && !db_path.as_os_str().is_empty() {
        tracing::warn!(
            "Database path '{}' is relative - behavior depends on current directory. \
             Consider using an absolute path.",
            db_path.display()
        );
    }

    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// File path of a `sqlite://` URL, without query parameters.
fn sqlite_path(database_url: &str) -> Option<&Path> {
    let rest = database_url.strip_prefix("sqlite://")?;
    let path = rest.split('?').next().unwrap_or(rest);
    Some(Path::new(path))
}
