use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::api::ApiClient;

/// Handle to a running session keepalive loop.
///
/// The handle is the only way to cancel the loop: dropping it detaches
/// the task, which keeps running until its own refresh fails.
#[derive(Debug)]
pub struct KeepaliveHandle {
    task: JoinHandle<()>,
}

impl KeepaliveHandle {
    /// Cancel the loop. Safe to call more than once; a no-op once the
    /// loop has already stopped.
    pub fn stop(&self) {
        self.task.abort();
    }

    /// Whether the loop has ended, via `stop` or its own failure
    pub fn is_stopped(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn the keepalive task: refresh the session every `period`, and on
/// the first failure fire `on_session_lost` and stop ticking.
pub(crate) fn spawn<F>(client: ApiClient, period: Duration, on_session_lost: F) -> KeepaliveHandle
where
    F: FnOnce() + Send + 'static,
{
    let task = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval yields immediately on the first tick; consume it so
        // the first refresh happens a full period after start
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match client.try_refresh().await {
                Ok(()) => debug!("keepalive renewed access token"),
                Err(e) => {
                    warn!(error = %e, "keepalive refresh failed, session lost");
                    on_session_lost();
                    return;
                }
            }
        }
    });

    KeepaliveHandle { task }
}
