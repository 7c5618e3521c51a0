//! The sync job: refresh every configured owner and backfill new repositories.

use std::sync::Arc;

use console::{Term, style};
use devmetrics::github::GitHubClient;
use devmetrics::platform::ApiRateLimiter;
use devmetrics::sync::{SyncTally, SyncTargets, Synchronizer};
use devmetrics::vcs::Git2CommitSource;

use crate::config::Config;
use crate::progress::ProgressReporter;

/// Run one sync batch over `targets`.
///
/// Owner-level failures are part of the tally, not errors; only setup
/// problems (missing token, unreachable database) are returned.
pub async fn handle_sync(
    config: &Config,
    targets: SyncTargets,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if targets.is_empty() {
        tracing::warn!("No owners or repositories configured; nothing to sync");
        return Ok(());
    }

    let token = config
        .github_token()
        .ok_or("GitHub token not configured. Set [github] token or DEVMETRICS_GITHUB_TOKEN")?;

    let rps = config.sync.requests_per_second;
    let limiter = (rps > 0).then(|| ApiRateLimiter::new(rps));
    let host = GitHubClient::new(&token, limiter)?.with_retry(config.github.to_retry_config());

    let db = devmetrics::connect_and_migrate(database_url).await?;

    let options = config.sync.to_sync_options();
    tracing::debug!(?options, "Sync options");

    let reporter = Arc::new(ProgressReporter::new());
    let engine = Synchronizer::new(host, Git2CommitSource::new(), db.clone(), options)
        .with_progress(reporter.as_callback());

    let tally = engine.run(&targets).await;
    reporter.finish();

    report_tally(&tally);

    db.close().await?;
    Ok(())
}

fn report_tally(tally: &SyncTally) {
    tracing::info!(
        synced = tally.synced,
        skipped = tally.skipped,
        failed = tally.failed,
        repos_created = tally.repos_created,
        repos_updated = tally.repos_updated,
        commits = tally.commits,
        "Sync finished"
    );
    for (owner, reason) in &tally.failures {
        tracing::warn!(owner = %owner, reason = %reason, "Owner not synced");
    }

    if Term::stdout().is_term() {
        println!(
            "\n{} {} owners synced, {} skipped, {} failed",
            style("Done:").bold().green(),
            tally.synced,
            tally.skipped,
            tally.failed
        );
        println!(
            "      {} repos created, {} updated, {} commits backfilled",
            tally.repos_created, tally.repos_updated, tally.commits
        );
        for (owner, reason) in &tally.failures {
            println!("  {} {}: {}", style("✗").red(), owner, reason);
        }
    }
}
