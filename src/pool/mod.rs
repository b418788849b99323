//! Shared session pool
//!
//! Long-lived multiplexed sessions are pooled per (host, port, proxy) key
//! with a configurable per-destination cap. The pool owns a strong
//! reference for the lifetime of membership; callers hold their own
//! clones of the shared handle.

mod session;
mod session_pool;

pub use session::{BoxedTransport, Session, SessionTransport};
pub use session_pool::SessionPool;
