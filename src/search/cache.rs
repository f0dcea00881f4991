//! # Session Cache
//!
//! Bounded, idle-expiring store of search sessions.
//!
//! - `put(session)` - store, expiring idle sessions and evicting the least
//!   recently accessed ones beyond capacity
//! - `get(id)` - look up and mark accessed; idle sessions are expired on the
//!   spot
//! - `evict_expired()` - drop every idle session
//!
//! # Invariants
//!
//! - All bookkeeping happens under one lock, so a lookup either sees a whole
//!   session or none, and the access it records is ordered before any
//!   eviction that follows
//! - Callers get `Arc` handles; eviction never invalidates a handle in use

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use super::clock::Clock;
use super::session::SearchSession;

/// Expiry and capacity policy. Eviction order is least recently accessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCacheConfig {
    /// Sessions idle for longer than this are dropped
    pub idle_timeout: Duration,
    /// Maximum number of live sessions
    pub capacity: usize,
}

impl Default for SessionCacheConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::hours(1),
            capacity: 1000,
        }
    }
}

/// Passive counters, reported by `/about` and the session sweeper
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Sessions dropped for idleness
    pub expirations: u64,
    /// Sessions dropped for capacity
    pub evictions: u64,
}

struct Entry {
    session: Arc<SearchSession>,
    /// Position in the recency order
    tick: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, Entry>,
    /// tick -> session id, oldest access first
    recency: BTreeMap<u64, String>,
    next_tick: u64,
    stats: CacheStats,
}

impl CacheState {
    fn bump(&mut self) -> u64 {
        let tick = self.next_tick;
        self.next_tick += 1;
        tick
    }

    fn remove(&mut self, id: &str) -> Option<Entry> {
        let entry = self.entries.remove(id)?;
        self.recency.remove(&entry.tick);
        Some(entry)
    }

    fn expire_idle(&mut self, now: DateTime<Utc>, idle_timeout: Duration) -> usize {
        let idle: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| is_idle(&e.session, now, idle_timeout))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &idle {
            self.remove(id);
            debug!(search_id = %id, "search session expired");
        }
        self.stats.expirations += idle.len() as u64;
        idle.len()
    }

    fn evict_over_capacity(&mut self, capacity: usize) {
        while self.entries.len() > capacity {
            let oldest = match self.recency.iter().next() {
                Some((_, id)) => id.clone(),
                None => break,
            };
            self.remove(&oldest);
            self.stats.evictions += 1;
            debug!(search_id = %oldest, "search session evicted");
        }
    }
}

fn is_idle(session: &SearchSession, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
    now - session.last_accessed_at() > idle_timeout
}

/// Shared session cache. Constructed per service (or per test) with its own
/// clock; never global.
pub struct SessionCache {
    config: SessionCacheConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState>,
}

impl SessionCache {
    pub fn new(config: SessionCacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn config(&self) -> &SessionCacheConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // Bookkeeping stays consistent even if a holder panicked mid-update:
        // every mutation keeps `entries` and `recency` in step before
        // anything that can panic.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store a session, replacing any session with the same id
    pub fn put(&self, session: SearchSession) -> Arc<SearchSession> {
        let now = self.clock.now();
        let session = Arc::new(session);
        let mut state = self.lock();

        state.expire_idle(now, self.config.idle_timeout);
        state.remove(session.id());
        let tick = state.bump();
        state.recency.insert(tick, session.id().to_string());
        state.entries.insert(
            session.id().to_string(),
            Entry {
                session: Arc::clone(&session),
                tick,
            },
        );
        state.evict_over_capacity(self.config.capacity);

        session
    }

    /// Look up a session and record the access. Returns `None` for unknown,
    /// evicted, or idle sessions.
    pub fn get(&self, id: &str) -> Option<Arc<SearchSession>> {
        let now = self.clock.now();
        let mut state = self.lock();

        let idle = match state.entries.get(id) {
            Some(entry) => is_idle(&entry.session, now, self.config.idle_timeout),
            None => {
                state.stats.misses += 1;
                return None;
            }
        };

        if idle {
            state.remove(id);
            state.stats.expirations += 1;
            state.stats.misses += 1;
            debug!(search_id = %id, "search session expired");
            return None;
        }

        let tick = state.bump();
        let entry = state.entries.get_mut(id)?;
        let old_tick = std::mem::replace(&mut entry.tick, tick);
        entry.session.touch(now);
        let session = Arc::clone(&entry.session);
        state.recency.remove(&old_tick);
        state.recency.insert(tick, id.to_string());
        state.stats.hits += 1;

        Some(session)
    }

    /// Drop every idle session, returning how many were dropped
    pub fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        self.lock().expire_idle(now, self.config.idle_timeout)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryExpression;
    use crate::search::clock::ManualClock;

    fn cache(capacity: usize) -> (Arc<ManualClock>, SessionCache) {
        let clock = Arc::new(ManualClock::default());
        let config = SessionCacheConfig {
            idle_timeout: Duration::minutes(10),
            capacity,
        };
        (clock.clone(), SessionCache::new(config, clock))
    }

    fn session(id: &str, now: DateTime<Utc>) -> SearchSession {
        SearchSession::new(id, "c", QueryExpression::new(), vec![], 3, now)
    }

    #[test]
    fn test_put_then_get() {
        let (clock, cache) = cache(10);
        cache.put(session("a", clock.now()));
        let found = cache.get("a").unwrap();
        assert_eq!(found.total_count(), 3);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_unknown_id_is_miss() {
        let (_, cache) = cache(10);
        assert!(cache.get("nope").is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_idle_session_expires_on_get() {
        let (clock, cache) = cache(10);
        cache.put(session("a", clock.now()));
        clock.advance(Duration::minutes(11));
        assert!(cache.get("a").is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_access_refreshes_idle_clock() {
        let (clock, cache) = cache(10);
        cache.put(session("a", clock.now()));
        clock.advance(Duration::minutes(8));
        assert!(cache.get("a").is_some());
        clock.advance(Duration::minutes(8));
        assert!(cache.get("a").is_some());
    }

    #[test]
    fn test_exactly_timeout_is_not_idle() {
        let (clock, cache) = cache(10);
        cache.put(session("a", clock.now()));
        clock.advance(Duration::minutes(10));
        assert!(cache.get("a").is_some());
    }

    #[test]
    fn test_capacity_evicts_least_recently_accessed() {
        let (clock, cache) = cache(2);
        cache.put(session("a", clock.now()));
        cache.put(session("b", clock.now()));
        // "a" becomes most recently used
        assert!(cache.get("a").is_some());
        cache.put(session("c", clock.now()));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_evict_expired_sweeps_only_idle() {
        let (clock, cache) = cache(10);
        cache.put(session("old", clock.now()));
        clock.advance(Duration::minutes(6));
        cache.put(session("new", clock.now()));
        clock.advance(Duration::minutes(6));

        assert_eq!(cache.evict_expired(), 1);
        assert!(cache.get("new").is_some());
        assert!(cache.get("old").is_none());
    }

    #[test]
    fn test_handle_survives_eviction() {
        let (clock, cache) = cache(1);
        cache.put(session("a", clock.now()));
        let held = cache.get("a").unwrap();
        cache.put(session("b", clock.now()));
        assert!(cache.get("a").is_none());
        assert_eq!(held.id(), "a");
    }

    #[test]
    fn test_concurrent_gets_and_puts() {
        let (clock, cache) = cache(50);
        let cache = Arc::new(cache);
        cache.put(session("shared", clock.now()));

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let cache = Arc::clone(&cache);
                let clock = Arc::clone(&clock);
                std::thread::spawn(move || {
                    for i in 0..20 {
                        cache.put(session(&format!("w{}-{}", worker, i), clock.now()));
                        let shared = cache.get("shared");
                        assert!(shared.map(|s| s.total_count() == 3).unwrap_or(true));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.len() <= 50);
    }
}
