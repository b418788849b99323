//! Configuration module
//!
//! Types and loading for the reuse layer's configuration: rule strings
//! for host mapping and proxy bypass, and the session pool cap.

mod loading;
mod types;

pub use loading::{load_config, load_config_with_fallback};
pub use types::{BypassConfig, Config, HostMappingConfig, MaxSessionsPerKey, PoolConfig};
