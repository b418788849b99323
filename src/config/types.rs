//! Configuration type definitions
//!
//! All sections default sensibly, so an empty TOML document is a valid
//! configuration (no mapping rules, no bypass rules, pool cap of 1).

use serde::{Deserialize, Serialize};

use crate::bypass::ProxyBypassRules;
use crate::constants;
use crate::error::ValidationError;
use crate::mapping::HostMappingRules;

/// Top-level configuration for the reuse layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host mapping (`MAP`/`EXCLUDE`) rules.
    pub host_mapping: HostMappingConfig,
    /// Proxy bypass rules.
    pub bypass: BypassConfig,
    /// Session pool settings.
    pub pool: PoolConfig,
}

impl Config {
    /// Build the host mapping rules from the configured string.
    ///
    /// Invalid sub-rules are logged and skipped by the rule engine.
    #[must_use]
    pub fn host_mapping_rules(&self) -> HostMappingRules {
        let mut rules = HostMappingRules::new();
        rules.set_rules_from_string(&self.host_mapping.rules);
        rules
    }

    /// Build the proxy bypass rules from the configured string.
    #[must_use]
    pub fn bypass_rules(&self) -> ProxyBypassRules {
        let mut rules = ProxyBypassRules::new();
        if self.bypass.use_suffix_matching {
            rules.parse_from_string_using_suffix_matching(&self.bypass.rules);
        } else {
            rules.parse_from_string(&self.bypass.rules);
        }
        rules
    }
}

/// Host mapping section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostMappingConfig {
    /// Comma-separated `MAP`/`EXCLUDE` rules.
    pub rules: String,
}

/// Proxy bypass section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BypassConfig {
    /// Bypass rules separated by `,` or `;`.
    pub rules: String,
    /// Widen bare hostnames to suffix matches, for compatibility with
    /// legacy proxy configuration formats.
    pub use_suffix_matching: bool,
}

/// Session pool section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Cap on live sessions per (host, port, proxy) key.
    pub max_sessions_per_key: MaxSessionsPerKey,
}

/// Validated per-destination session cap; must be at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MaxSessionsPerKey(usize);

impl MaxSessionsPerKey {
    /// Create a cap after validation.
    pub const fn try_new(value: usize) -> Result<Self, ValidationError> {
        if value == 0 {
            Err(ValidationError::ZeroSessionCap)
        } else {
            Ok(Self(value))
        }
    }

    /// Get the raw value.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for MaxSessionsPerKey {
    fn default() -> Self {
        Self(constants::pool::DEFAULT_MAX_SESSIONS_PER_KEY)
    }
}

impl std::fmt::Display for MaxSessionsPerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for MaxSessionsPerKey {
    type Error = ValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl<'de> Deserialize<'de> for MaxSessionsPerKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = usize::deserialize(deserializer)?;
        Self::try_new(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_a_valid_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.pool.max_sessions_per_key.get(), 1);
    }

    #[test]
    fn sections_deserialize() {
        let config: Config = toml::from_str(
            r#"
            [host_mapping]
            rules = "MAP *.example.com mirror:80"

            [bypass]
            rules = "<local>; 10.0.0.0/8"
            use_suffix_matching = true

            [pool]
            max_sessions_per_key = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.host_mapping.rules, "MAP *.example.com mirror:80");
        assert!(config.bypass.use_suffix_matching);
        assert_eq!(config.pool.max_sessions_per_key.get(), 4);
    }

    #[test]
    fn zero_session_cap_is_rejected() {
        let result: Result<Config, _> = toml::from_str("[pool]\nmax_sessions_per_key = 0\n");
        assert!(result.is_err());
        assert_eq!(
            MaxSessionsPerKey::try_new(0),
            Err(ValidationError::ZeroSessionCap)
        );
    }

    #[test]
    fn config_builds_rule_engines() {
        let config: Config = toml::from_str(
            r#"
            [host_mapping]
            rules = "MAP foo.com bar.com:99"

            [bypass]
            rules = "*.example.com"
            "#,
        )
        .unwrap();

        let mapping = config.host_mapping_rules();
        let mut target = crate::types::HostPort::new("foo.com", 80);
        assert!(mapping.rewrite_host(&mut target));
        assert_eq!(target, crate::types::HostPort::new("bar.com", 99));

        let bypass = config.bypass_rules();
        assert_eq!(bypass.rules().len(), 1);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config: Config = toml::from_str(
            r#"
            [bypass]
            rules = "<local>"
            "#,
        )
        .unwrap();
        let serialized = toml::to_string(&config).unwrap();
        let reparsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config, reparsed);
    }
}
