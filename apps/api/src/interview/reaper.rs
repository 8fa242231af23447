//! Session reaper: evicts sessions idle longer than the configured TTL.
//! Runs beside the manager; the state machine knows nothing about it.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::interview::store::SessionStore;

/// Spawns the eviction loop. Returns `None` when `ttl` is zero (reaper disabled).
pub fn spawn_reaper(
    store: Arc<SessionStore>,
    ttl: Duration,
    interval: Duration,
) -> Option<JoinHandle<()>> {
    if ttl.is_zero() {
        info!("Session reaper disabled (SESSION_TTL_SECS=0)");
        return None;
    }
    let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::weeks(52 * 100));

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let evicted = store.evict_idle(ttl).await;
            if evicted > 0 {
                info!("Session reaper evicted {evicted} idle session(s)");
            } else {
                debug!("Session reaper: nothing to evict");
            }
        }
    }))
}
