//! Heartbeat loop for mounted shared-resource viewers
//!
//! Re-registers the session on a fixed interval for as long as the viewer
//! stays mounted, so the coordinator's eviction timeout never fires for a
//! live viewer. Stopping is idempotent and never fails, even with the
//! network gone: a lost heartbeat only makes the server side evict us,
//! which is the designed backstop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, trace};

use crate::coordinator::AdmissionClient;

/// Handle owning a running heartbeat task
pub struct HeartbeatHandle {
    shutdown: watch::Sender<bool>,
}

impl HeartbeatHandle {
    /// Stop the heartbeat loop. Safe to call any number of times.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }
}

impl Drop for HeartbeatHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawn the heartbeat loop for a registered session.
///
/// The mount has already registered once before calling this; the first
/// re-register happens one full interval later.
pub fn spawn(
    client: Arc<dyn AdmissionClient>,
    session_id: String,
    interval: Duration,
) -> HeartbeatHandle {
    let (shutdown, mut shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // interval fires immediately on the first tick; the mount-time
        // registration already covered that beat
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    trace!(session_id, "heartbeat");
                    let _ = client.register(&session_id).await;
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        debug!(session_id, "heartbeat stopped");
    });

    HeartbeatHandle { shutdown }
}
