//! Integration tests for configuration loading
//!
//! Loads full TOML documents from disk and checks the built rule engines
//! and pool behave per the configured values.

use std::io::Write;

use http_reuse::{HostPort, SessionPool, load_config, load_config_with_fallback};

#[test]
fn full_config_drives_all_three_components() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[host_mapping]
rules = "MAP *.foo.com foo-proxy:80, EXCLUDE www.internal"

[bypass]
rules = "<local>; *.corp.example.com; 10.0.0.0/8"

[pool]
max_sessions_per_key = 2
"#
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();

    let mapping = config.host_mapping_rules();
    let mut target = HostPort::new("a.foo.com", 443);
    assert!(mapping.rewrite_host(&mut target));
    assert_eq!(target, HostPort::new("foo-proxy", 80));

    let bypass = config.bypass_rules();
    assert_eq!(bypass.rules().len(), 3);
    assert!(bypass.matches(&url::Url::parse("http://10.3.3.3/").unwrap()));

    let pool = SessionPool::new(&config.pool);
    assert_eq!(pool.max_sessions_per_key(), 2);
}

#[test]
fn defaults_apply_when_sections_are_missing() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[bypass]\nrules = \"<local>\"").unwrap();

    let config = load_config(file.path()).unwrap();
    assert!(config.host_mapping.rules.is_empty());
    assert!(!config.bypass.use_suffix_matching);
    assert_eq!(config.pool.max_sessions_per_key.get(), 1);
}

#[test]
fn fallback_returns_defaults_for_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.toml");
    let config = load_config_with_fallback(&path).unwrap();
    assert_eq!(config.pool.max_sessions_per_key.get(), 1);
    assert!(config.bypass_rules().rules().is_empty());
}

#[test]
fn invalid_pool_cap_fails_the_load() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[pool]\nmax_sessions_per_key = 0").unwrap();
    assert!(load_config(file.path()).is_err());
}

#[test]
fn bad_rule_strings_load_but_produce_trimmed_rule_sets() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[bypass]
rules = "*.good.com, 10.0.0.0/notbits"
"#
    )
    .unwrap();

    // Loading succeeds; the broken token is dropped at parse time.
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.bypass_rules().rules().len(), 1);
}
