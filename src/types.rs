//! Core domain types: origins, host/port pairs, and session keys
//!
//! These newtypes keep the partition keys used by the auth cache and the
//! session pool from being mixed up with plain strings elsewhere in the
//! embedding stack.

use derive_more::{AsRef, Display, From, Into};
use std::fmt;
use url::Url;
use uuid::Uuid;

use crate::error::RuleParseError;

/// A logical {scheme, host, port} tuple identifying a server.
///
/// Derived from a URL by discarding path, query, and fragment; the port is
/// the effective port (scheme default when none is explicit). Origins
/// partition authentication realms: two URLs on the same origin may share
/// credentials, two URLs on different origins never do.
///
/// # Examples
///
/// ```
/// use http_reuse::Origin;
/// use url::Url;
///
/// let url = Url::parse("http://www.example.com/dir/index.html").unwrap();
/// let origin = Origin::from_url(&url).unwrap();
/// assert_eq!(origin.to_string(), "http://www.example.com:80");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    scheme: String,
    host: String,
    port: u16,
}

impl Origin {
    /// Create an origin from its parts. Scheme and host are lowercased.
    #[must_use]
    pub fn new(scheme: &str, host: &str, port: u16) -> Self {
        Self {
            scheme: scheme.to_ascii_lowercase(),
            host: host.to_ascii_lowercase(),
            port,
        }
    }

    /// Derive the origin of a URL, if it has a host and a known port.
    #[must_use]
    pub fn from_url(url: &Url) -> Option<Self> {
        let host = url.host_str()?;
        let port = url.port_or_known_default()?;
        Some(Self::new(url.scheme(), host, port))
    }

    /// The lowercase scheme.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The lowercase host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The effective port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// A mutable (host, port) destination, the unit host mapping rules rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostPort {
    host: String,
    port: u16,
}

impl HostPort {
    /// Create a new host/port pair.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The hostname (or IP literal).
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    pub(crate) fn set_host(&mut self, host: String) {
        self.host = host;
    }

    pub(crate) fn set_port(&mut self, port: u16) {
        self.port = port;
    }
}

impl fmt::Display for HostPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Opaque identifier for the proxy used to reach a destination.
///
/// The pool treats this as a plain partition key; `"direct://"` is the
/// conventional value for unproxied connections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Into, AsRef)]
pub struct ProxyServer(String);

impl ProxyServer {
    /// Proxy identifier for a direct (unproxied) connection.
    #[must_use]
    pub fn direct() -> Self {
        Self("direct://".to_string())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProxyServer {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Composite key partitioning pooled sessions: destination host/port plus
/// the proxy used to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    host_port: HostPort,
    proxy: ProxyServer,
}

impl SessionKey {
    /// Create a new session key.
    #[must_use]
    pub const fn new(host_port: HostPort, proxy: ProxyServer) -> Self {
        Self { host_port, proxy }
    }

    /// The destination host/port.
    #[must_use]
    pub const fn host_port(&self) -> &HostPort {
        &self.host_port
    }

    /// The proxy identifier.
    #[must_use]
    pub const fn proxy(&self) -> &ProxyServer {
        &self.proxy
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} via {}", self.host_port, self.proxy)
    }
}

/// Unique identifier for a pooled session, used in log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a new unique session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Split a `host[:port]` string, handling bracketed IPv6 literals.
///
/// Returns the host without brackets and the explicit port, if any. A bare
/// IPv6 literal without brackets is accepted as a host with no port (its
/// colons are not mistaken for a port separator).
pub(crate) fn parse_host_and_port(input: &str) -> Result<(String, Option<u16>), RuleParseError> {
    if input.is_empty() {
        return Err(RuleParseError::InvalidHostPort(input.to_string()));
    }

    if let Some(rest) = input.strip_prefix('[') {
        let Some((host, after)) = rest.split_once(']') else {
            return Err(RuleParseError::InvalidHostPort(input.to_string()));
        };
        if host.is_empty() {
            return Err(RuleParseError::InvalidHostPort(input.to_string()));
        }
        return match after.strip_prefix(':') {
            None if after.is_empty() => Ok((host.to_string(), None)),
            None => Err(RuleParseError::InvalidHostPort(input.to_string())),
            Some(port) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| RuleParseError::InvalidPort(port.to_string()))?;
                Ok((host.to_string(), Some(port)))
            }
        };
    }

    match input.rsplit_once(':') {
        // More than one colon and no brackets: a bare IPv6 literal.
        Some((host, _)) if host.contains(':') => Ok((input.to_string(), None)),
        Some((host, port)) => {
            if host.is_empty() {
                return Err(RuleParseError::InvalidHostPort(input.to_string()));
            }
            let port = port
                .parse::<u16>()
                .map_err(|_| RuleParseError::InvalidPort(port.to_string()))?;
            Ok((host.to_string(), Some(port)))
        }
        None => Ok((input.to_string(), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_from_url_uses_effective_port() {
        let url = Url::parse("https://Example.COM/a/b?q=1").unwrap();
        let origin = Origin::from_url(&url).unwrap();
        assert_eq!(origin.scheme(), "https");
        assert_eq!(origin.host(), "example.com");
        assert_eq!(origin.port(), 443);
    }

    #[test]
    fn origin_from_url_keeps_explicit_port() {
        let url = Url::parse("http://example.com:8080/").unwrap();
        let origin = Origin::from_url(&url).unwrap();
        assert_eq!(origin.port(), 8080);
    }

    #[test]
    fn origin_ignores_path_and_query() {
        let a = Origin::from_url(&Url::parse("http://example.com/x").unwrap()).unwrap();
        let b = Origin::from_url(&Url::parse("http://example.com/y?z").unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn origin_from_url_without_host() {
        let url = Url::parse("data:text/plain,hello").unwrap();
        assert!(Origin::from_url(&url).is_none());
    }

    #[test]
    fn session_key_display() {
        let key = SessionKey::new(HostPort::new("www.example.com", 443), ProxyServer::direct());
        assert_eq!(key.to_string(), "www.example.com:443 via direct://");
    }

    #[test]
    fn parse_host_and_port_plain() {
        assert_eq!(
            parse_host_and_port("example.com").unwrap(),
            ("example.com".to_string(), None)
        );
        assert_eq!(
            parse_host_and_port("example.com:8080").unwrap(),
            ("example.com".to_string(), Some(8080))
        );
    }

    #[test]
    fn parse_host_and_port_ipv6() {
        assert_eq!(
            parse_host_and_port("[::1]").unwrap(),
            ("::1".to_string(), None)
        );
        assert_eq!(
            parse_host_and_port("[::1]:80").unwrap(),
            ("::1".to_string(), Some(80))
        );
        // Bare IPv6 literal: colons are not a port separator.
        assert_eq!(
            parse_host_and_port("fe80::1").unwrap(),
            ("fe80::1".to_string(), None)
        );
    }

    #[test]
    fn parse_host_and_port_rejects_bad_ports() {
        assert!(matches!(
            parse_host_and_port("example.com:http"),
            Err(RuleParseError::InvalidPort(_))
        ));
        assert!(matches!(
            parse_host_and_port("example.com:70000"),
            Err(RuleParseError::InvalidPort(_))
        ));
        assert!(matches!(
            parse_host_and_port("[::1"),
            Err(RuleParseError::InvalidHostPort(_))
        ));
        assert!(matches!(
            parse_host_and_port(""),
            Err(RuleParseError::InvalidHostPort(_))
        ));
    }
}
