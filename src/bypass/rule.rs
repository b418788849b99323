//! The three kinds of proxy bypass rule
//!
//! A closed sum type: hostname patterns (with optional scheme and port
//! filters), the `<local>` rule for unqualified and loopback hosts, and
//! CIDR blocks for IP-literal destinations. `Display` produces the
//! canonical string form, which reparses to an equal rule.

use ipnet::IpNet;
use std::fmt;
use std::net::IpAddr;
use url::{Host, Url};

use crate::pattern::matches_pattern;

/// One parsed bypass rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BypassRule {
    /// Wildcard hostname pattern with optional scheme and port filters.
    HostnamePattern {
        /// Lowercase scheme the URL must use, when present.
        scheme: Option<String>,
        /// Lowercase wildcard pattern matched against the URL host.
        hostname_pattern: String,
        /// Effective port the URL must use, when present.
        port: Option<u16>,
    },
    /// The `<local>` rule: loopback addresses and hosts without a dot.
    Local,
    /// CIDR block matched against IP-literal hosts, with an optional
    /// scheme filter.
    IpBlock {
        scheme: Option<String>,
        block: IpNet,
    },
}

impl BypassRule {
    /// Whether a URL to `url` should bypass the proxy under this rule.
    #[must_use]
    pub fn matches(&self, url: &Url) -> bool {
        match self {
            Self::HostnamePattern {
                scheme,
                hostname_pattern,
                port,
            } => {
                if let Some(scheme) = scheme
                    && url.scheme() != scheme.as_str()
                {
                    return false;
                }
                if let Some(port) = port
                    && url.port_or_known_default() != Some(*port)
                {
                    return false;
                }
                let Some(host) = url.host_str() else {
                    return false;
                };
                matches_pattern(hostname_pattern, &host.to_ascii_lowercase())
            }
            Self::Local => {
                let Some(host) = url.host_str() else {
                    return false;
                };
                if host == "127.0.0.1" || host == "[::1]" {
                    return true;
                }
                // Unqualified hostnames are considered local.
                !host.contains('.')
            }
            Self::IpBlock { scheme, block } => {
                if let Some(scheme) = scheme
                    && url.scheme() != scheme.as_str()
                {
                    return false;
                }
                let addr = match url.host() {
                    Some(Host::Ipv4(a)) => IpAddr::V4(a),
                    Some(Host::Ipv6(a)) => IpAddr::V6(a),
                    _ => return false,
                };
                block.contains(&addr)
            }
        }
    }
}

impl fmt::Display for BypassRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostnamePattern {
                scheme,
                hostname_pattern,
                port,
            } => {
                if let Some(scheme) = scheme {
                    write!(f, "{}://", scheme)?;
                }
                f.write_str(hostname_pattern)?;
                if let Some(port) = port {
                    write!(f, ":{}", port)?;
                }
                Ok(())
            }
            Self::Local => f.write_str("<local>"),
            Self::IpBlock { scheme, block } => {
                if let Some(scheme) = scheme {
                    write!(f, "{}://", scheme)?;
                }
                write!(f, "{}", block)
            }
        }
    }
}
