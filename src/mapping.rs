//! Host mapping rules: `MAP`/`EXCLUDE` rewriting of destination hosts
//!
//! Rules are typically sourced from a command-line flag or a config file as
//! a comma-separated string, e.g.
//! `"MAP *.example.com proxy.example.com:80, EXCLUDE www.internal"`.
//! Exclusions always win: an excluded host is left alone even when a later
//! `MAP` rule would match it.

use tracing::warn;

use crate::error::RuleParseError;
use crate::pattern::matches_pattern;
use crate::types::{HostPort, parse_host_and_port};

/// A single `MAP` rule: pattern, replacement host, optional replacement port.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MapRule {
    /// Lowercase wildcard pattern matched against the destination host.
    hostname_pattern: String,
    replacement_host: String,
    /// When `None`, the original port is kept.
    replacement_port: Option<u16>,
}

/// A single `EXCLUDE` rule suppressing any rewrite for matching hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ExclusionRule {
    hostname_pattern: String,
}

/// Ordered set of host mapping rules.
///
/// # Examples
///
/// ```
/// use http_reuse::{HostMappingRules, HostPort};
///
/// let mut rules = HostMappingRules::new();
/// rules.set_rules_from_string("MAP *.example.com mirror.example.com:8080");
///
/// let mut target = HostPort::new("www.example.com", 80);
/// assert!(rules.rewrite_host(&mut target));
/// assert_eq!(target.host(), "mirror.example.com");
/// assert_eq!(target.port(), 8080);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostMappingRules {
    exclusion_rules: Vec<ExclusionRule>,
    map_rules: Vec<MapRule>,
}

impl HostMappingRules {
    /// Create an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and add one rule.
    ///
    /// Accepted forms (keyword is case-insensitive):
    /// - `MAP <hostname_pattern> <host>[:<port>]`
    /// - `EXCLUDE <hostname_pattern>`
    ///
    /// Malformed input fails without modifying the rule set.
    pub fn add_rule_from_string(&mut self, rule: &str) -> Result<(), RuleParseError> {
        let tokens: Vec<&str> = rule.split_whitespace().collect();
        let Some(keyword) = tokens.first() else {
            return Err(RuleParseError::Empty);
        };

        match keyword.to_ascii_lowercase().as_str() {
            "exclude" => {
                if tokens.len() != 2 {
                    return Err(RuleParseError::TokenCount {
                        expected: 2,
                        actual: tokens.len(),
                    });
                }
                self.exclusion_rules.push(ExclusionRule {
                    hostname_pattern: tokens[1].to_ascii_lowercase(),
                });
                Ok(())
            }
            "map" => {
                if tokens.len() != 3 {
                    return Err(RuleParseError::TokenCount {
                        expected: 3,
                        actual: tokens.len(),
                    });
                }
                let (replacement_host, replacement_port) = parse_host_and_port(tokens[2])?;
                self.map_rules.push(MapRule {
                    hostname_pattern: tokens[1].to_ascii_lowercase(),
                    replacement_host,
                    replacement_port,
                });
                Ok(())
            }
            other => Err(RuleParseError::UnknownKeyword(other.to_string())),
        }
    }

    /// Replace all rules with the ones parsed from a comma-separated string.
    ///
    /// A failing sub-rule is logged and skipped; it never aborts the rest
    /// of the set.
    pub fn set_rules_from_string(&mut self, rules: &str) {
        self.exclusion_rules.clear();
        self.map_rules.clear();

        for piece in rules.split(',') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            if let Err(err) = self.add_rule_from_string(piece) {
                warn!("Skipping invalid host mapping rule '{}': {}", piece, err);
            }
        }
    }

    /// Rewrite `host_port` according to the first matching `MAP` rule.
    ///
    /// Returns `false` either when an `EXCLUDE` rule matches (the pair is
    /// left alone on purpose) or when no rule matches at all; returns
    /// `true` only when a rewrite was applied. Exclusions are evaluated
    /// before any map rule.
    pub fn rewrite_host(&self, host_port: &mut HostPort) -> bool {
        let host = host_port.host().to_ascii_lowercase();

        for rule in &self.exclusion_rules {
            if matches_pattern(&rule.hostname_pattern, &host) {
                return false;
            }
        }

        for rule in &self.map_rules {
            if matches_pattern(&rule.hostname_pattern, &host) {
                host_port.set_host(rule.replacement_host.clone());
                if let Some(port) = rule.replacement_port {
                    host_port.set_port(port);
                }
                return true;
            }
        }

        false
    }
}
