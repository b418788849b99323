//! Connection and credential reuse layer for an HTTP/SPDY client stack.
//!
//! Given a target origin, this crate decides whether to rewrite or bypass the
//! destination ([`HostMappingRules`], [`ProxyBypassRules`]), remembers
//! authentication credentials for the origin's protection space
//! ([`AuthCache`]), and hands out shared multiplexed sessions scoped to a
//! (host, port, proxy) key with a bounded per-destination fan-out
//! ([`SessionPool`]).
//!
//! All components are synchronous, in-memory data structures designed to be
//! owned by a single network-session context; the transport that sessions
//! carry is opaque to this crate and is supplied by the connection layer.

pub mod auth;
pub mod bypass;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod mapping;
mod pattern;
pub mod pool;
pub mod types;

pub use auth::{AuthCache, AuthCacheEntry};
pub use bypass::{BypassRule, ProxyBypassRules};
pub use config::{Config, load_config, load_config_with_fallback};
pub use error::{RuleParseError, SessionError, ValidationError};
pub use mapping::HostMappingRules;
pub use pool::{BoxedTransport, Session, SessionPool, SessionTransport};
pub use types::{HostPort, Origin, ProxyServer, SessionId, SessionKey};
