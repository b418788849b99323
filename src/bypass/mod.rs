//! Proxy bypass rules: which destinations skip the proxy entirely
//!
//! The rule-list grammar comes from proxy configuration formats: tokens
//! separated by `,` or `;`, each one of `<local>`, a CIDR block, an IP
//! literal, or a wildcard hostname pattern, optionally prefixed with a
//! scheme filter (`http://`) and suffixed with a port filter (`:8080`).
//! Evaluation is a plain OR across all rules.

mod rule;

pub use rule::BypassRule;

use ipnet::IpNet;
use tracing::warn;
use url::Url;

use crate::error::RuleParseError;
use crate::types::parse_host_and_port;

/// An ordered list of bypass rules.
///
/// Order is irrelevant for [`matches`](Self::matches) (pure OR) but
/// significant for structural equality.
///
/// # Examples
///
/// ```
/// use http_reuse::ProxyBypassRules;
/// use url::Url;
///
/// let mut rules = ProxyBypassRules::new();
/// rules.parse_from_string("<local>; *.example.com; 10.0.0.0/8");
///
/// assert!(rules.matches(&Url::parse("http://localhost/").unwrap()));
/// assert!(rules.matches(&Url::parse("http://www.example.com/").unwrap()));
/// assert!(rules.matches(&Url::parse("http://10.1.2.3/").unwrap()));
/// assert!(!rules.matches(&Url::parse("http://example.org/").unwrap()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyBypassRules {
    rules: Vec<BypassRule>,
}

impl ProxyBypassRules {
    /// Create an empty rule list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The parsed rules, in registration order.
    #[must_use]
    pub fn rules(&self) -> &[BypassRule] {
        &self.rules
    }

    /// Whether a request for `url` should bypass the proxy.
    #[must_use]
    pub fn matches(&self, url: &Url) -> bool {
        self.rules.iter().any(|rule| rule.matches(url))
    }

    /// Replace all rules with the ones parsed from `raw`.
    ///
    /// Tokens are separated by `,` or `;`; a malformed token is logged and
    /// skipped without aborting the rest.
    pub fn parse_from_string(&mut self, raw: &str) {
        self.parse_from_string_internal(raw, false);
    }

    /// Like [`parse_from_string`](Self::parse_from_string), but bare
    /// hostnames are widened to suffix matches (`"example.com"` behaves as
    /// `"*example.com"`), emulating the semantics of legacy proxy
    /// configuration formats.
    pub fn parse_from_string_using_suffix_matching(&mut self, raw: &str) {
        self.parse_from_string_internal(raw, true);
    }

    fn parse_from_string_internal(&mut self, raw: &str, use_hostname_suffix_matching: bool) {
        self.rules.clear();
        for token in raw.split([',', ';']) {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            if let Err(err) = self.add_rule_from_string_internal(token, use_hostname_suffix_matching)
            {
                warn!("Skipping invalid proxy bypass rule '{}': {}", token, err);
            }
        }
    }

    /// Parse and append one rule.
    pub fn add_rule_from_string(&mut self, raw: &str) -> Result<(), RuleParseError> {
        self.add_rule_from_string_internal(raw, false)
    }

    /// Parse and append one rule with hostname suffix matching.
    pub fn add_rule_from_string_using_suffix_matching(
        &mut self,
        raw: &str,
    ) -> Result<(), RuleParseError> {
        self.add_rule_from_string_internal(raw, true)
    }

    /// Append the `<local>` rule.
    pub fn add_rule_to_bypass_local(&mut self) {
        self.rules.push(BypassRule::Local);
    }

    /// Append a hostname pattern rule directly.
    pub fn add_rule_for_hostname(
        &mut self,
        scheme: Option<&str>,
        hostname_pattern: &str,
        port: Option<u16>,
    ) -> Result<(), RuleParseError> {
        if hostname_pattern.is_empty() {
            return Err(RuleParseError::EmptyHostnamePattern);
        }
        self.rules.push(BypassRule::HostnamePattern {
            scheme: scheme.map(str::to_ascii_lowercase),
            hostname_pattern: hostname_pattern.to_ascii_lowercase(),
            port,
        });
        Ok(())
    }

    fn add_rule_from_string_internal(
        &mut self,
        raw: &str,
        use_hostname_suffix_matching: bool,
    ) -> Result<(), RuleParseError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(RuleParseError::Empty);
        }

        if raw.eq_ignore_ascii_case("<local>") {
            self.rules.push(BypassRule::Local);
            return Ok(());
        }

        // Optional "<scheme>://" prefix becomes a scheme filter.
        let (scheme, rest) = match raw.find("://") {
            Some(pos) => {
                let scheme = &raw[..pos];
                if !is_valid_scheme(scheme) {
                    return Err(RuleParseError::InvalidScheme(scheme.to_string()));
                }
                (Some(scheme.to_ascii_lowercase()), &raw[pos + 3..])
            }
            None => (None, raw),
        };
        if rest.is_empty() {
            return Err(RuleParseError::EmptyHostnamePattern);
        }

        // A forward slash means a CIDR block; a bad one fails the token.
        if rest.contains('/') {
            let block: IpNet = rest
                .parse()
                .map_err(|_| RuleParseError::InvalidCidr(rest.to_string()))?;
            self.rules.push(BypassRule::IpBlock { scheme, block });
            return Ok(());
        }

        // An IP literal may not be in canonical form ("0x7f.1", mixed-case
        // hex IPv6); run it through URL canonicalization before pinning a
        // hostname pattern to it.
        if let Ok((host, port)) = parse_host_and_port(rest)
            && let Some(canonical) = canonicalize_ip_literal(&host)
        {
            return self.add_rule_for_hostname(scheme.as_deref(), &canonical, port);
        }

        // Otherwise: <hostname-pattern>[:<port>].
        let (pattern, port) = match rest.rsplit_once(':') {
            Some((pattern, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| RuleParseError::InvalidPort(port.to_string()))?;
                (pattern, Some(port))
            }
            None => (rest, None),
        };
        if pattern.is_empty() {
            return Err(RuleParseError::EmptyHostnamePattern);
        }

        let mut pattern = pattern.to_string();
        // A leading dot is legacy notation for a subdomain match.
        if pattern.starts_with('.') {
            pattern.insert(0, '*');
        }
        if use_hostname_suffix_matching && !pattern.starts_with('*') {
            pattern.insert(0, '*');
        }

        self.add_rule_for_hostname(scheme.as_deref(), &pattern, port)
    }
}

/// Scheme filters must look like URL schemes: an ASCII letter followed by
/// letters, digits, `+`, `-`, or `.`.
fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Canonicalize `host` through URL parsing, returning the canonical form
/// only when it is an IP literal (IPv6 literals come back bracketed).
fn canonicalize_ip_literal(host: &str) -> Option<String> {
    let bracketed = if host.contains(':') {
        format!("[{}]", host)
    } else {
        host.to_string()
    };
    let url = Url::parse(&format!("http://{}/", bracketed)).ok()?;
    match url.host()? {
        url::Host::Ipv4(_) | url::Host::Ipv6(_) => Some(url.host_str()?.to_string()),
        url::Host::Domain(_) => None,
    }
}
