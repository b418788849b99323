//! Configuration loading from TOML files
//!
//! The reuse layer is embedded, so loading stays minimal: read a TOML
//! file, or fall back to defaults when the file does not exist.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use super::types::Config;

/// Load configuration from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
    Ok(config)
}

/// Load configuration from a TOML file, falling back to defaults when the
/// file does not exist. A malformed existing file is still an error.
pub fn load_config_with_fallback(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        info!(
            "Config file '{}' not found; using defaults",
            path.display()
        );
        return Ok(Config::default());
    }
    load_config(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_an_error_without_fallback() {
        assert!(load_config("/nonexistent/http-reuse.toml").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config_with_fallback("/nonexistent/http-reuse.toml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn malformed_file_is_an_error_even_with_fallback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is not toml [").unwrap();
        assert!(load_config_with_fallback(file.path()).is_err());
    }

    #[test]
    fn valid_file_loads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pool]\nmax_sessions_per_key = 2").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.pool.max_sessions_per_key.get(), 2);
    }
}
