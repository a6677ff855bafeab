use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::debug;

use crate::auth::SessionStore;

const SWEEP_INTERVAL_SECS: u64 = 600;

/// Periodically drops expired admin sessions and abandoned logins.
pub fn start(sessions: SessionStore, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(SWEEP_INTERVAL_SECS));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = sessions.purge_expired();
                    if removed > 0 {
                        debug!(removed, "Expired sessions purged");
                    }
                }
                _ = shutdown.recv() => break,
            }
        }
    })
}
