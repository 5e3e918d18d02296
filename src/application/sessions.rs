use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::settlement::SettlementLedger;

/// Cart and settlement progress of one shopper.
#[derive(Debug, Default)]
pub struct ShoppingSession {
    pub cart: Cart,
    pub ledger: SettlementLedger,
}

pub type SessionHandle = Arc<Mutex<ShoppingSession>>;

/// Sessions untouched for this long are dropped when the next one is created.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

struct SessionEntry {
    handle: SessionHandle,
    last_seen: Instant,
}

/// In-memory registry of open sessions.
///
/// Each session sits behind its own async mutex, so requests for one session
/// run one after another (a checkout holds it across its stock calls) while
/// different sessions never block each other. Sessions idle for longer than
/// `idle_timeout` are swept on `create`; a session whose mutex is held is
/// never swept.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            idle_timeout,
        }
    }

    pub fn create(&self) -> Uuid {
        let now = Instant::now();
        self.expire_idle(now);

        let id = Uuid::new_v4();
        self.sessions.write().insert(
            id,
            SessionEntry {
                handle: SessionHandle::default(),
                last_seen: now,
            },
        );
        id
    }

    /// Look a session up and mark it as used.
    pub fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write();
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(entry.handle.clone())
    }

    pub fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Drop every session last used more than `idle_timeout` before `now`.
    /// Returns how many were dropped.
    fn expire_idle(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, entry| {
            now.saturating_duration_since(entry.last_seen) < self.idle_timeout
                || entry.handle.try_lock().is_err()
        });
        let expired = before - sessions.len();
        if expired > 0 {
            log::debug!("{} idle session(s) expired", expired);
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_get_remove() {
        let store = SessionStore::default();
        let id = store.create();

        assert!(store.get(id).is_some());
        assert_eq!(store.len(), 1);
        assert!(store.remove(id));
        assert!(store.get(id).is_none());
        assert!(!store.remove(id));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn clones_share_the_same_sessions() {
        let store = SessionStore::default();
        let id = store.create();
        let other = store.clone();

        let handle = other.get(id).expect("session visible through clone");
        assert!(handle.lock().await.cart.is_empty());
    }

    #[test]
    fn creating_a_session_sweeps_idle_ones() {
        let store = SessionStore::new(Duration::from_millis(10));
        let stale = store.create();

        std::thread::sleep(Duration::from_millis(30));
        let fresh = store.create();

        assert!(store.get(stale).is_none());
        assert!(store.get(fresh).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn recently_used_sessions_survive_a_sweep() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create();

        assert_eq!(store.expire_idle(Instant::now() + Duration::from_secs(30)), 0);
        assert_eq!(store.expire_idle(Instant::now() + Duration::from_secs(90)), 1);
        assert!(store.get(id).is_none());
    }

    #[tokio::test]
    async fn a_session_in_use_is_never_swept() {
        let store = SessionStore::new(Duration::from_secs(60));
        let busy = store.create();
        let idle = store.create();

        let handle = store.get(busy).expect("session");
        let _guard = handle.lock().await;
        let expired = store.expire_idle(Instant::now() + Duration::from_secs(120));

        assert_eq!(expired, 1);
        assert!(store.get(busy).is_some());
        assert!(store.get(idle).is_none());
    }
}
