//! Expired-session reaper.
//!
//! [`SessionReaper`] runs as a background task that sleeps until the earliest
//! stored expiration, evicts everything stale in one batch, then reschedules
//! from the store's new minimum. It never polls on a fixed interval: with no
//! sessions stored it parks until [`SessionManager`] signals a creation. The
//! loop exits gracefully when the provided [`CancellationToken`] is cancelled.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use warden_core::types::Timestamp;

use super::manager::SessionManager;

/// Retry delay applied when a sweep or schedule query fails.
const CLEANUP_RETRY: Duration = Duration::from_secs(120);

/// Slack added past the earliest expiration so the batch delete always
/// catches the session that triggered the wake-up.
const WAKE_SLACK: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// SessionReaper
// ---------------------------------------------------------------------------

/// Background service that evicts expired sessions on a deadline basis.
pub struct SessionReaper {
    sessions: Arc<SessionManager>,
}

impl SessionReaper {
    /// Create a new reaper over the given session manager.
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    /// Run the reaper loop until cancelled.
    ///
    /// An immediate sweep at startup catches sessions that expired while the
    /// server was down.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut next_wake = self.sweep().await;

        loop {
            let sleep_for = next_wake.map(time_until);

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Session reaper cancelled");
                    break;
                }
                _ = self.sessions.created_notified() => {
                    next_wake = self.reschedule(next_wake).await;
                }
                _ = tokio::time::sleep(sleep_for.unwrap_or(Duration::ZERO)),
                        if sleep_for.is_some() => {
                    next_wake = self.sweep().await;
                }
            }
        }
    }

    /// Evict expired sessions and return the next deadline, if any.
    async fn sweep(&self) -> Option<Timestamp> {
        match self.sessions.cleanup(false).await {
            Ok(outcome) => {
                if !outcome.removed.is_empty() {
                    tracing::info!(count = outcome.removed.len(), "Reaped expired sessions");
                }
                outcome.next_expiry
            }
            Err(e) => {
                tracing::error!(error = %e, "Session cleanup failed, retrying later");
                Some(retry_deadline())
            }
        }
    }

    /// Recompute the earliest deadline after a session was created.
    async fn reschedule(&self, current: Option<Timestamp>) -> Option<Timestamp> {
        match self.sessions.next_expiry().await {
            Ok(expiry) => expiry,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read next session expiry");
                // Keep the stale deadline rather than park forever; the next
                // sweep will resynchronize against the store.
                current.or_else(|| Some(retry_deadline()))
            }
        }
    }
}

fn retry_deadline() -> Timestamp {
    Utc::now() + chrono::Duration::seconds(CLEANUP_RETRY.as_secs() as i64)
}

fn time_until(deadline: Timestamp) -> Duration {
    let now = Utc::now();
    if deadline <= now {
        return Duration::ZERO;
    }
    (deadline - now).to_std().unwrap_or(Duration::ZERO) + WAKE_SLACK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_until_past_deadline_is_zero() {
        let past = Utc::now() - chrono::Duration::seconds(30);
        assert_eq!(time_until(past), Duration::ZERO);
    }

    #[test]
    fn test_time_until_includes_slack() {
        let ahead = Utc::now() + chrono::Duration::seconds(60);
        let wait = time_until(ahead);
        assert!(wait > Duration::from_secs(59));
        assert!(wait <= Duration::from_secs(61) + WAKE_SLACK);
    }
}
