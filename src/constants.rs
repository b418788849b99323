//! Constants used throughout the reuse layer
//!
//! This module centralizes cache and pool caps so the limits are
//! documented in one place rather than scattered as magic numbers.

/// Authentication cache limits
pub mod auth {
    /// Maximum number of realm entries kept in one cache instance.
    ///
    /// The cap is cache-wide, not per-origin. When a new protection space
    /// would exceed it, the oldest entry (by insertion order) is evicted.
    pub const MAX_REALM_ENTRIES: usize = 10;

    /// Maximum number of known paths recorded per realm entry.
    ///
    /// Once an entry's path list is full, additional paths are simply not
    /// recorded; existing paths are never evicted to make room.
    pub const MAX_PATHS_PER_REALM_ENTRY: usize = 10;
}

/// Session pool limits
pub mod pool {
    /// Default cap on live sessions per (host, port, proxy) key.
    ///
    /// A cap of 1 means a destination's single existing session is always
    /// reused instead of opening another one.
    pub const DEFAULT_MAX_SESSIONS_PER_KEY: usize = 1;
}
