use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::state::SharedState;

/// Periodically drop rate-limiter entries whose window has passed, until
/// shutdown is signaled.
pub fn spawn_limiter_cleanup(
    state: SharedState,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let period = state
        .submission_limiter
        .window()
        .max(Duration::from_secs(1));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    state.submission_limiter.cleanup();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::debug!("Rate limiter cleanup stopped");
    })
}
