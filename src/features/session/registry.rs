use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tokio::time::interval;
use uuid::Uuid;

use crate::features::session::session::MarkerSession;

/// Server-held map sessions, keyed by an opaque UUID handed to the client.
///
/// Each session sits behind its own async mutex, so its board is mutated by
/// one request or resolution task at a time.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    started: Instant,
}

struct SessionEntry {
    session: Arc<Mutex<MarkerSession>>,
    /// Seconds since registry start at last access
    last_seen: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            started: Instant::now(),
        }
    }

    fn elapsed_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    pub async fn insert(&self, session: MarkerSession) -> Uuid {
        let id = Uuid::new_v4();
        let entry = SessionEntry {
            session: Arc::new(Mutex::new(session)),
            last_seen: AtomicU64::new(self.elapsed_secs()),
        };
        self.sessions.write().await.insert(id, entry);
        tracing::debug!("Created map session {}", id);
        id
    }

    /// Look up a session, refreshing its idle clock.
    pub async fn get(&self, id: &Uuid) -> Option<Arc<Mutex<MarkerSession>>> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(id)?;
        entry.last_seen.store(self.elapsed_secs(), Ordering::Relaxed);
        Some(Arc::clone(&entry.session))
    }

    pub async fn remove(&self, id: &Uuid) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for longer than `ttl`; returns how many went.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let now = self.elapsed_secs();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            now.saturating_sub(entry.last_seen.load(Ordering::Relaxed)) <= ttl.as_secs()
        });
        before - sessions.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Background worker that evicts idle map sessions
pub struct SessionSweeper {
    registry: Arc<SessionRegistry>,
    idle_ttl: Duration,
    sweep_interval: Duration,
}

impl SessionSweeper {
    pub fn new(registry: Arc<SessionRegistry>, idle_ttl: Duration, sweep_interval: Duration) -> Self {
        Self {
            registry,
            idle_ttl,
            sweep_interval,
        }
    }

    /// Run the sweeper in a background loop
    pub async fn run(&self) {
        tracing::info!(
            "Starting session sweeper (ttl: {}s, interval: {}s)",
            self.idle_ttl.as_secs(),
            self.sweep_interval.as_secs()
        );

        let mut interval = interval(self.sweep_interval);

        loop {
            interval.tick().await;

            let evicted = self.registry.evict_idle(self.idle_ttl).await;
            if evicted > 0 {
                tracing::info!("Evicted {} idle map sessions", evicted);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::geofence::{Geofence, LatLng};
    use crate::shared::constants::{DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG};

    fn new_session() -> MarkerSession {
        MarkerSession::new(Geofence::new(
            LatLng::new(DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG),
            1.5,
        ))
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let registry = SessionRegistry::new();
        let id = registry.insert(new_session()).await;

        assert!(registry.get(&id).await.is_some());
        assert_eq!(registry.len().await, 1);

        assert!(registry.remove(&id).await);
        assert!(registry.get(&id).await.is_none());
        assert!(!registry.remove(&id).await);
    }

    #[tokio::test]
    async fn test_evict_idle_keeps_fresh_sessions() {
        let registry = SessionRegistry::new();
        let id = registry.insert(new_session()).await;

        let evicted = registry.evict_idle(Duration::from_secs(3600)).await;
        assert_eq!(evicted, 0);
        assert!(registry.get(&id).await.is_some());
    }
}
