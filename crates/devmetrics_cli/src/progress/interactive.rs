use std::sync::Mutex;
use std::time::Duration;

use devmetrics::sync::SyncProgress;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

#[derive(Default)]
struct ProgressState {
    /// Owners done out of the batch.
    batch_bar: Option<ProgressBar>,
    /// Spinner for the owner currently being synced.
    owner_bar: Option<ProgressBar>,
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            state: Mutex::new(ProgressState::default()),
        }
    }

    /// Spinner for one owner, placed above the batch bar.
    fn create_owner_bar(&self, state: &ProgressState, owner: &str) -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        let bar = if let Some(ref batch_bar) = state.batch_bar {
            self.multi.insert_before(batch_bar, bar)
        } else {
            self.multi.add(bar)
        };
        bar.set_style(Self::spinner_style());
        bar.set_prefix(format!("{:16}", owner));
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }

    fn set_owner_message(state: &ProgressState, msg: String) {
        if let Some(ref pb) = state.owner_bar {
            pb.set_message(msg);
        }
    }

    fn finish_owner(state: &mut ProgressState, msg: String) {
        if let Some(pb) = state.owner_bar.take() {
            pb.finish_with_message(msg);
        }
    }

    pub fn handle(&self, event: SyncProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            SyncProgress::BatchStarted { total } => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::bar_style());
                pb.set_prefix(format!("{:16}", "owners"));
                state.batch_bar = Some(pb);
            }

            SyncProgress::OwnerStarted { owner } => {
                let pb = self.create_owner_bar(&state, &owner);
                pb.set_message("Checking...");
                state.owner_bar = Some(pb);
            }

            SyncProgress::OwnerSkipped { owner, reason } => {
                if state.owner_bar.is_none() {
                    let pb = self.create_owner_bar(&state, &owner);
                    state.owner_bar = Some(pb);
                }
                Self::finish_owner(&mut state, format!("skipped ({})", reason));
            }

            SyncProgress::FetchingRepos { first_fetch, .. } => {
                let msg = if first_fetch {
                    "Fetching all repositories..."
                } else {
                    "Fetching recent pushes..."
                };
                Self::set_owner_message(&state, msg.to_string());
            }

            SyncProgress::FetchedPage {
                page, total_so_far, ..
            } => {
                Self::set_owner_message(
                    &state,
                    format!("Page {} ({} repos)", page, total_so_far),
                );
            }

            SyncProgress::BackfillStarted { repo, .. } => {
                Self::set_owner_message(&state, format!("Cloning {}...", repo));
            }

            SyncProgress::BackfillComplete { repo, inserted, .. } => {
                Self::set_owner_message(&state, format!("{}: {} commits", repo, inserted));
            }

            SyncProgress::OwnerSynced { stats, .. } => {
                Self::finish_owner(
                    &mut state,
                    format!(
                        "{} repos, {} new, {} commits",
                        stats.discovered, stats.created, stats.commits
                    ),
                );
            }

            SyncProgress::OwnerFailed { error, .. } => {
                Self::finish_owner(&mut state, format!("failed: {}", error));
            }

            SyncProgress::Pacing { delay, .. } => {
                if let Some(ref pb) = state.batch_bar {
                    pb.set_message(format!("waiting {:?}", delay));
                }
            }

            SyncProgress::OwnerDone { done, .. } => {
                if let Some(ref pb) = state.batch_bar {
                    pb.set_position(done as u64);
                    pb.set_message(String::new());
                }
            }

            SyncProgress::BatchComplete {
                synced,
                skipped,
                failed,
            } => {
                if let Some(ref pb) = state.batch_bar {
                    pb.finish_with_message(format!(
                        "{} synced, {} skipped, {} failed",
                        synced, skipped, failed
                    ));
                }
            }

            _ => {}
        }
    }

    pub fn finish(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pb) = state.owner_bar.take()
            && !pb.is_finished()
        {
            pb.finish();
        }
        if let Some(ref pb) = state.batch_bar
            && !pb.is_finished()
        {
            pb.finish();
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}
