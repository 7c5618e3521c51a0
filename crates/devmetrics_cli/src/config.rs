//! Configuration file support for devmetrics.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. Environment variables (prefixed with `DEVMETRICS_`, e.g., `DEVMETRICS_GITHUB_TOKEN`)
//! 2. A file passed with `--config`
//! 3. Local config file (./devmetrics.toml)
//! 4. XDG config file (~/.config/devmetrics/config.toml)
//! 5. Built-in defaults
//!
//! The database URL defaults to `sqlite://~/.local/state/devmetrics/devmetrics.db` on Linux
//! (using the XDG state directory) if not explicitly configured.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "postgres://localhost/devmetrics"
//!
//! [github]
//! token = "ghp_..."  # or use DEVMETRICS_GITHUB_TOKEN env var
//! max_retries = 5  # retries while GitHub answers 403/429
//! max_backoff_secs = 60
//!
//! [sync]
//! freshness_days = 7
//! first_page_size = 99
//! refresh_page_size = 25
//! backfill_cutoff_year = 2014
//! commit_horizon_year = 2020
//! pace_minutes = 0.0667
//! clone_transport = "https"  # or "ssh"
//! workdir = "/var/tmp/devmetrics"
//! requests_per_second = 5  # 0 disables the limiter
//!
//! [targets]
//! owners = ["bitcoin", "ethereum"]
//! repos = ["satoshi/bitcoin-core-archive"]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use devmetrics::platform::rate_limits;
use devmetrics::retry::{INITIAL_BACKOFF_MS, MAX_BACKOFF_MS, MAX_RETRIES, RetryConfig};
use devmetrics::sync::{
    CloneTransport, DEFAULT_BACKFILL_CUTOFF_YEAR, DEFAULT_COMMIT_HORIZON_YEAR,
    DEFAULT_FIRST_PAGE_SIZE, DEFAULT_FRESHNESS_DAYS, DEFAULT_MAX_LOG_ENTRIES, DEFAULT_PACE,
    DEFAULT_REFRESH_PAGE_SIZE, DEFAULT_UNREACHABLE_OWNERS, SyncOptions, SyncTargets,
};
use directories::ProjectDirs;
use serde::Deserialize;

const APP_NAME: &str = "devmetrics";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// GitHub configuration.
    pub github: GitHubConfig,
    /// Sync tunables.
    pub sync: SyncConfig,
    /// Owners and repositories to sync.
    pub targets: TargetsConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Supports sqlite:// and postgres:// schemes.
    pub url: Option<String>,
}

/// GitHub configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token.
    /// Can also be set via DEVMETRICS_GITHUB_TOKEN environment variable.
    pub token: Option<String>,
    /// Retries per request while GitHub signals rate limiting.
    pub max_retries: usize,
    /// Upper bound on the backoff between those retries.
    pub max_backoff_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            max_retries: MAX_RETRIES,
            max_backoff_secs: MAX_BACKOFF_MS / 1000,
        }
    }
}

impl GitHubConfig {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig::new(
            StdDuration::from_millis(INITIAL_BACKOFF_MS),
            StdDuration::from_secs(self.max_backoff_secs.max(1)),
            self.max_retries,
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub freshness_days: i64,
    pub first_page_size: u32,
    pub refresh_page_size: u32,
    pub backfill_cutoff_year: i32,
    pub commit_horizon_year: i32,
    /// Sleep after each synced owner, in minutes.
    pub pace_minutes: f64,
    pub max_log_entries: usize,
    pub unreachable_owners: Vec<String>,
    pub clone_transport: CloneTransport,
    /// Parent directory for backfill checkouts.
    pub workdir: Option<PathBuf>,
    /// GitHub API requests per second; 0 disables the limiter.
    pub requests_per_second: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            freshness_days: DEFAULT_FRESHNESS_DAYS,
            first_page_size: DEFAULT_FIRST_PAGE_SIZE,
            refresh_page_size: DEFAULT_REFRESH_PAGE_SIZE,
            backfill_cutoff_year: DEFAULT_BACKFILL_CUTOFF_YEAR,
            commit_horizon_year: DEFAULT_COMMIT_HORIZON_YEAR,
            pace_minutes: DEFAULT_PACE.as_secs_f64() / 60.0,
            max_log_entries: DEFAULT_MAX_LOG_ENTRIES,
            unreachable_owners: DEFAULT_UNREACHABLE_OWNERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            clone_transport: CloneTransport::default(),
            workdir: None,
            requests_per_second: rate_limits::GITHUB_DEFAULT_RPS,
        }
    }
}

/// Target sets. `owners` are synced in full; `repos` ("owner/name") only
/// cover the named repositories.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TargetsConfig {
    pub owners: Vec<String>,
    pub repos: Vec<String>,
}

impl SyncConfig {
    /// Build the library's [`SyncOptions`] from these settings.
    pub fn to_sync_options(&self) -> SyncOptions {
        let pace = match StdDuration::try_from_secs_f64(self.pace_minutes * 60.0) {
            Ok(pace) => pace,
            Err(e) => {
                tracing::warn!(
                    "Invalid pace_minutes {}: {}; using default",
                    self.pace_minutes,
                    e
                );
                DEFAULT_PACE
            }
        };

        SyncOptions {
            freshness: chrono::Duration::days(self.freshness_days.max(0)),
            first_page_size: self.first_page_size,
            refresh_page_size: self.refresh_page_size,
            backfill_cutoff_year: self.backfill_cutoff_year,
            commit_horizon_year: self.commit_horizon_year,
            pace,
            max_log_entries: self.max_log_entries,
            unreachable_owners: self.unreachable_owners.iter().cloned().collect(),
            clone_transport: self.clone_transport,
            workdir: self.workdir.clone(),
        }
    }
}

impl TargetsConfig {
    /// Configured targets followed by the ones given on the command line.
    pub fn to_targets(&self, extra_owners: &[String], extra_repos: &[String]) -> SyncTargets {
        SyncTargets::new(
            self.owners.iter().chain(extra_owners).cloned(),
            self.repos.iter().chain(extra_repos).cloned(),
        )
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// A missing or unreadable file falls back to the built-in defaults.
    pub fn load(extra: Option<&Path>) -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("devmetrics.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./devmetrics.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        if let Some(path) = extra {
            tracing::debug!("Loading config from {:?}", path);
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        // e.g., DEVMETRICS_DATABASE_URL -> database.url
        builder = builder.add_source(env_source());

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// The `mode=rwc` parameter creates the SQLite file if it doesn't exist.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("devmetrics.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    pub fn github_token(&self) -> Option<String> {
        self.github.token.clone().filter(|t| !t.trim().is_empty())
    }

    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/devmetrics` or `~/.local/state/devmetrics`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}

/// `DEVMETRICS_` environment source. Target lists are comma-separated.
fn env_source() -> Environment {
    Environment::with_prefix("DEVMETRICS")
        .separator("_")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("targets.owners")
        .with_list_parse_key("targets.repos")
}
