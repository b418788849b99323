//! The shared session handle
//!
//! A `Session` is a reference-counted handle to one multiplexed
//! connection. The pool and any number of transactions share it; the
//! handle's own state (pool membership, closed flag, transport slot) uses
//! interior mutability so every holder observes closes immediately.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::error::SessionError;
use crate::types::{SessionId, SessionKey};

/// Bound for the transport a session carries. The connection layer passes
/// any already-connected byte stream; this crate never performs I/O on it.
pub trait SessionTransport: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> SessionTransport for T {}

/// An owned, type-erased transport.
pub type BoxedTransport = Box<dyn SessionTransport>;

#[derive(Default)]
struct SessionState {
    transport: Option<BoxedTransport>,
    secure: bool,
    error: Option<SessionError>,
}

/// One pooled session.
///
/// Created only by the pool; obtained via [`SessionPool::get`] or
/// [`SessionPool::get_session_from_socket`].
///
/// [`SessionPool::get`]: crate::SessionPool::get
/// [`SessionPool::get_session_from_socket`]: crate::SessionPool::get_session_from_socket
pub struct Session {
    id: SessionId,
    key: SessionKey,
    in_pool: AtomicBool,
    closed: AtomicBool,
    state: Mutex<SessionState>,
}

impl Session {
    pub(crate) fn new(key: SessionKey) -> Self {
        Self {
            id: SessionId::new(),
            key,
            in_pool: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Unique identifier of this session.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// The (host, port, proxy) key this session serves.
    #[must_use]
    pub const fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Whether the pool currently holds this session.
    #[must_use]
    pub fn is_in_pool(&self) -> bool {
        self.in_pool.load(Ordering::SeqCst)
    }

    pub(crate) fn set_in_pool(&self, in_pool: bool) {
        self.in_pool.store(in_pool, Ordering::SeqCst);
    }

    /// Whether the session has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Whether a transport has been attached and is still held.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.lock_state().transport.is_some()
    }

    /// Whether the attached transport was secure.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.lock_state().secure
    }

    /// The terminal error, once the session is closed or failed to
    /// initialize.
    #[must_use]
    pub fn error(&self) -> Option<SessionError> {
        self.lock_state().error.clone()
    }

    /// Attach an already-connected transport.
    ///
    /// `cert_error` forwards a certificate error the connection layer
    /// observed during the handshake; for a secure session it is recorded
    /// and returned, leaving the session partially initialized (the caller
    /// decides whether to remove it from the pool).
    pub(crate) fn initialize_with_socket(
        &self,
        transport: BoxedTransport,
        is_secure: bool,
        cert_error: Option<SessionError>,
    ) -> Result<(), SessionError> {
        let mut state = self.lock_state();
        state.transport = Some(transport);
        state.secure = is_secure;
        if is_secure && let Some(err) = cert_error {
            state.error = Some(err.clone());
            debug!("Session {} failed to initialize: {}", self.id, err);
            return Err(err);
        }
        debug!("Session {} initialized for {}", self.id, self.key);
        Ok(())
    }

    /// Close the session, dropping its transport and recording `error` as
    /// the terminal status. Idempotent; the first error wins.
    pub fn close_session_on_error(&self, error: SessionError) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut state = self.lock_state();
        state.transport = None;
        if state.error.is_none() {
            state.error = Some(error.clone());
        }
        debug!("Session {} for {} closed: {}", self.id, self.key, error);
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("in_pool", &self.is_in_pool())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HostPort, ProxyServer};

    fn key() -> SessionKey {
        SessionKey::new(HostPort::new("www.example.com", 443), ProxyServer::direct())
    }

    fn transport() -> BoxedTransport {
        let (client, _server) = tokio::io::duplex(64);
        Box::new(client)
    }

    #[test]
    fn fresh_session_is_neither_pooled_nor_closed() {
        let session = Session::new(key());
        assert!(!session.is_in_pool());
        assert!(!session.is_closed());
        assert!(!session.is_initialized());
        assert!(session.error().is_none());
    }

    #[test]
    fn initialize_attaches_transport() {
        let session = Session::new(key());
        session
            .initialize_with_socket(transport(), true, None)
            .unwrap();
        assert!(session.is_initialized());
        assert!(session.is_secure());
        assert!(session.error().is_none());
    }

    #[test]
    fn initialize_with_cert_error_records_it() {
        let session = Session::new(key());
        let err = session
            .initialize_with_socket(
                transport(),
                true,
                Some(SessionError::CertificateError("expired".to_string())),
            )
            .unwrap_err();
        assert_eq!(err, SessionError::CertificateError("expired".to_string()));
        assert_eq!(session.error(), Some(err));
        // Partially initialized: the transport is still attached.
        assert!(session.is_initialized());
    }

    #[test]
    fn cert_error_is_ignored_for_insecure_sessions() {
        let session = Session::new(key());
        session
            .initialize_with_socket(
                transport(),
                false,
                Some(SessionError::CertificateError("expired".to_string())),
            )
            .unwrap();
        assert!(session.error().is_none());
    }

    #[test]
    fn close_drops_transport_and_keeps_first_error() {
        let session = Session::new(key());
        session
            .initialize_with_socket(transport(), false, None)
            .unwrap();

        session.close_session_on_error(SessionError::Aborted);
        assert!(session.is_closed());
        assert!(!session.is_initialized());
        assert_eq!(session.error(), Some(SessionError::Aborted));

        session.close_session_on_error(SessionError::ConnectionClosed);
        assert_eq!(session.error(), Some(SessionError::Aborted));
    }
}
