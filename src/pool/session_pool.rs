//! The pool proper: per-key FIFO lists with a bounded fan-out
//!
//! Each (host, port, proxy) key owns an insertion-ordered list of live
//! sessions. At the cap the oldest session is handed back out rather than
//! opening another one; with the default cap of 1 that means one shared
//! session per destination. Bulk teardown uses an explicit snapshot-drain:
//! the live map is swapped out first and every session is detached before
//! any close runs, so nothing re-entering the pool can observe a
//! half-mutated map.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::PoolConfig;
use crate::error::SessionError;
use crate::pool::session::{BoxedTransport, Session};
use crate::types::SessionKey;

/// Pool of shared sessions keyed by (host, port, proxy).
///
/// # Examples
///
/// ```
/// use http_reuse::{HostPort, ProxyServer, SessionKey, SessionPool};
///
/// let mut pool = SessionPool::default();
/// let key = SessionKey::new(HostPort::new("www.example.com", 443), ProxyServer::direct());
///
/// let first = pool.get(&key);
/// let second = pool.get(&key);
/// // Default cap of 1: the single existing session is always reused.
/// assert_eq!(first.id(), second.id());
///
/// pool.remove(&first);
/// assert!(!pool.has_session(&key));
/// ```
#[derive(Debug)]
pub struct SessionPool {
    sessions: HashMap<SessionKey, VecDeque<Arc<Session>>>,
    max_sessions_per_key: usize,
}

impl SessionPool {
    /// Create a pool with the given configuration.
    #[must_use]
    pub fn new(config: &PoolConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            max_sessions_per_key: config.max_sessions_per_key.get(),
        }
    }

    /// The configured per-destination session cap.
    #[must_use]
    pub const fn max_sessions_per_key(&self) -> usize {
        self.max_sessions_per_key
    }

    /// Total number of live sessions across all keys.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.values().map(VecDeque::len).sum()
    }

    /// Whether any session exists for `key`.
    #[must_use]
    pub fn has_session(&self, key: &SessionKey) -> bool {
        self.sessions.contains_key(key)
    }

    /// Get a session for `key`, creating one if necessary.
    ///
    /// When the key's list is at the cap, the oldest session is popped,
    /// handed out again, and re-homed at the back of the list. Otherwise a
    /// fresh session is created. The list never exceeds the cap after
    /// insertion.
    pub fn get(&mut self, key: &SessionKey) -> Arc<Session> {
        let list = self.sessions.entry(key.clone()).or_default();

        let session = if list.len() >= self.max_sessions_per_key {
            // At capacity: reuse the oldest session for this destination.
            list.pop_front()
        } else {
            None
        };

        let session = session.unwrap_or_else(|| {
            debug!("Creating new session for {}", key);
            Arc::new(Session::new(key.clone()))
        });

        session.set_in_pool(true);
        list.push_back(Arc::clone(&session));
        debug_assert!(list.len() <= self.max_sessions_per_key);
        session
    }

    /// Create a session for a brand-new destination from an
    /// already-connected transport.
    ///
    /// Caller contract: no session exists for `key` yet. The session is
    /// pooled first and then initialized; on an initialization error it
    /// stays in the pool in a partially-initialized state. The handle is
    /// returned in both cases so the caller, seeing the error, can decide
    /// whether to [`remove`](Self::remove) it.
    pub fn get_session_from_socket(
        &mut self,
        key: &SessionKey,
        transport: BoxedTransport,
        is_secure: bool,
        cert_error: Option<SessionError>,
    ) -> (Arc<Session>, Result<(), SessionError>) {
        let list = self.sessions.entry(key.clone()).or_default();
        debug_assert!(
            list.is_empty(),
            "get_session_from_socket called for a destination that already has sessions"
        );

        let session = Arc::new(Session::new(key.clone()));
        session.set_in_pool(true);
        list.push_back(Arc::clone(&session));

        let result = session.initialize_with_socket(transport, is_secure, cert_error);
        if let Err(err) = &result {
            warn!("Session for {} failed to initialize: {}", key, err);
        }
        (session, result)
    }

    /// Remove `session` from its key's list and mark it detached.
    ///
    /// An empty list is deleted from the map, never left behind. Removing
    /// a session the pool does not hold is a caller bug.
    pub fn remove(&mut self, session: &Arc<Session>) {
        session.set_in_pool(false);

        let Some(list) = self.sessions.get_mut(session.key()) else {
            debug_assert!(false, "removing a session for an unknown key");
            return;
        };
        let len_before = list.len();
        list.retain(|pooled| !Arc::ptr_eq(pooled, session));
        debug_assert_eq!(
            list.len() + 1,
            len_before,
            "removing a session the pool does not hold"
        );
        if list.is_empty() {
            self.sessions.remove(session.key());
        }
    }

    /// Close every pooled session with [`SessionError::Aborted`].
    ///
    /// Used when the network or the TLS configuration changes underneath
    /// the pool: existing sessions are no longer trustworthy, but callers
    /// still holding handles observe the close rather than a dangling
    /// session.
    pub fn close_current_sessions(&mut self) {
        let drained = self.take_all_sessions();
        info!("Closing {} current session(s)", drained.len());
        close_drained_sessions(drained);
    }

    /// Close every pooled session on pool teardown.
    pub fn close_all_sessions(&mut self) {
        let drained = self.take_all_sessions();
        debug!("Closing all {} session(s) on teardown", drained.len());
        close_drained_sessions(drained);
    }

    /// The network changed; current sessions are bound to dead routes.
    pub fn on_ip_address_change(&mut self) {
        info!("IP address changed; dropping all current sessions");
        self.close_current_sessions();
    }

    /// The TLS configuration changed; current sessions were negotiated
    /// under the old one.
    pub fn on_ssl_config_change(&mut self) {
        info!("SSL config changed; dropping all current sessions");
        self.close_current_sessions();
    }

    /// Snapshot-and-clear: swap the live map out atomically so that close
    /// callbacks re-entering the pool can never observe a partially
    /// drained map.
    fn take_all_sessions(&mut self) -> Vec<Arc<Session>> {
        std::mem::take(&mut self.sessions)
            .into_values()
            .flatten()
            .collect()
    }
}

impl Default for SessionPool {
    fn default() -> Self {
        Self::new(&PoolConfig::default())
    }
}

/// Detach every drained session before closing any of them, so a close
/// observed through a shared handle already reports "not in pool".
fn close_drained_sessions(sessions: Vec<Arc<Session>>) {
    for session in &sessions {
        session.set_in_pool(false);
    }
    for session in sessions {
        session.close_session_on_error(SessionError::Aborted);
    }
}
