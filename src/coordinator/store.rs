//! Active-session store for the shared splat renderer
//!
//! A keyed map of session id → last-heartbeat timestamp with lazy eviction.
//! A session is active iff its last heartbeat is younger than the eviction
//! timeout. Removal has two paths, explicit unregister and timeout
//! eviction, because unload notifications are best-effort and may never
//! arrive.
//!
//! The count is advisory and eventually consistent: it gates a soft
//! admission threshold, not a correctness-critical limit, so a plain mutex
//! over a `HashMap` is the whole story.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Point-in-time view of the store, for the stats endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    /// Sessions currently within the heartbeat window
    pub active_sessions: usize,
    /// Registrations (including heartbeat refreshes) since startup
    pub registered_total: u64,
    /// Sessions removed by timeout eviction since startup
    pub evicted_total: u64,
    /// Sessions removed by explicit unregister since startup
    pub unregistered_total: u64,
    /// Seconds since the store was created
    pub uptime_secs: u64,
}

/// Authoritative session tracking for one shared renderer
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Instant>>,
    eviction_timeout: Duration,
    registered_total: AtomicU64,
    evicted_total: AtomicU64,
    unregistered_total: AtomicU64,
    started_at: Instant,
}

impl SessionStore {
    pub fn new(eviction_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            eviction_timeout,
            registered_total: AtomicU64::new(0),
            evicted_total: AtomicU64::new(0),
            unregistered_total: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    /// Idempotent upsert of the session's heartbeat timestamp.
    ///
    /// Expired entries are evicted first, so the returned active count is
    /// self-correcting even when explicit unregisters never arrive. The
    /// count includes the registering session itself.
    pub fn register(&self, session_id: &str) -> usize {
        self.register_at(session_id, Instant::now())
    }

    /// Idempotent delete; succeeds whether or not the session exists.
    pub fn unregister(&self, session_id: &str) {
        let removed = self.sessions.lock().remove(session_id).is_some();
        if removed {
            self.unregistered_total.fetch_add(1, Ordering::Relaxed);
            debug!(session_id, "session unregistered");
        }
    }

    /// Active count without refreshing any session.
    pub fn active_sessions(&self) -> usize {
        self.active_at(Instant::now())
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            active_sessions: self.active_sessions(),
            registered_total: self.registered_total.load(Ordering::Relaxed),
            evicted_total: self.evicted_total.load(Ordering::Relaxed),
            unregistered_total: self.unregistered_total.load(Ordering::Relaxed),
            uptime_secs: self.started_at.elapsed().as_secs(),
        }
    }

    fn register_at(&self, session_id: &str, now: Instant) -> usize {
        let mut sessions = self.sessions.lock();
        Self::evict_expired(&mut sessions, now, self.eviction_timeout, &self.evicted_total);

        let fresh = sessions.insert(session_id.to_string(), now).is_none();
        self.registered_total.fetch_add(1, Ordering::Relaxed);
        if fresh {
            info!(session_id, active = sessions.len(), "session registered");
        }

        sessions.len()
    }

    fn active_at(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.lock();
        Self::evict_expired(&mut sessions, now, self.eviction_timeout, &self.evicted_total);
        sessions.len()
    }

    fn evict_expired(
        sessions: &mut HashMap<String, Instant>,
        now: Instant,
        timeout: Duration,
        evicted_total: &AtomicU64,
    ) {
        let before = sessions.len();
        sessions.retain(|_, last| now.duration_since(*last) < timeout);
        let evicted = before - sessions.len();
        if evicted > 0 {
            evicted_total.fetch_add(evicted as u64, Ordering::Relaxed);
            debug!(evicted, remaining = sessions.len(), "evicted stale sessions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(60);

    #[test]
    fn register_is_idempotent() {
        let store = SessionStore::new(TIMEOUT);
        let t0 = Instant::now();

        assert_eq!(store.register_at("a", t0), 1);
        // Same session within the window: refreshed, not duplicated
        assert_eq!(store.register_at("a", t0 + Duration::from_secs(10)), 1);
        assert_eq!(store.register_at("b", t0 + Duration::from_secs(11)), 2);
    }

    #[test]
    fn unregister_is_idempotent() {
        let store = SessionStore::new(TIMEOUT);
        store.register("a");
        store.unregister("a");
        store.unregister("a");
        store.unregister("never-registered");
        assert_eq!(store.active_sessions(), 0);
    }

    #[test]
    fn eviction_without_explicit_unregister() {
        let store = SessionStore::new(TIMEOUT);
        let t0 = Instant::now();

        store.register_at("stale", t0);
        store.register_at("live", t0 + TIMEOUT);

        // "stale" missed every heartbeat; the next register must not count it
        let count = store.register_at("new", t0 + TIMEOUT + Duration::from_secs(1));
        assert_eq!(count, 2);
    }

    #[test]
    fn heartbeat_keeps_session_alive() {
        let store = SessionStore::new(TIMEOUT);
        let t0 = Instant::now();

        store.register_at("a", t0);
        store.register_at("a", t0 + TIMEOUT / 2);
        // Past the original deadline, but the refresh moved it
        assert_eq!(store.register_at("b", t0 + TIMEOUT), 2);
    }

    #[test]
    fn boundary_is_exclusive() {
        // A heartbeat exactly `timeout` old is expired
        let store = SessionStore::new(TIMEOUT);
        let t0 = Instant::now();
        store.register_at("a", t0);
        assert_eq!(store.active_at(t0 + TIMEOUT), 0);
    }

    #[test]
    fn stats_track_removal_paths() {
        let store = SessionStore::new(TIMEOUT);
        let t0 = Instant::now();

        store.register_at("evicts", t0);
        store.register_at("leaves", t0 + Duration::from_secs(1));
        store.unregister("leaves");
        store.register_at("new", t0 + TIMEOUT + Duration::from_secs(2));

        let stats = store.stats();
        assert_eq!(stats.evicted_total, 1);
        assert_eq!(stats.unregistered_total, 1);
        assert_eq!(stats.registered_total, 3);
    }
}
