//! HTTP authentication cache
//!
//! Retains credentials per protection space so a transaction layer can
//! answer repeat 401/407 challenges without asking the user again.

mod cache;

pub use cache::{AuthCache, AuthCacheEntry};
