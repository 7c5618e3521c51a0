use std::time::Duration;

use super::super::progress::{ProgressCallback, SyncProgress, emit};

/// Sleep between owners to stay under upstream rate limits.
pub(super) async fn pace(owner: &str, delay: Duration, on_progress: Option<&ProgressCallback>) {
    if delay.is_zero() {
        return;
    }
    emit(
        on_progress,
        SyncProgress::Pacing {
            owner: owner.to_string(),
            delay,
        },
    );
    tokio::time::sleep(delay).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_pace_sleeps_for_delay() {
        let start = tokio::time::Instant::now();
        pace("acme", Duration::from_secs(4), None).await;
        assert!(start.elapsed() >= Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_returns_immediately() {
        let start = tokio::time::Instant::now();
        pace("acme", Duration::ZERO, None).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
