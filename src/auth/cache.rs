//! Realm-entry storage and protection-space lookup
//!
//! Entries are keyed by (origin, realm, scheme) and carry the set of known
//! path prefixes approximating the RFC 2617 protection space: once a server
//! challenges for `/dir/a.html`, credentials are assumed valid for
//! everything under `/dir/`.

use std::collections::VecDeque;
use tracing::{debug, warn};

use crate::constants::auth::{MAX_PATHS_PER_REALM_ENTRY, MAX_REALM_ENTRIES};
use crate::types::Origin;

/// One (origin, realm, scheme) protection space with its credentials.
///
/// Entries are owned by the [`AuthCache`]; references into it follow the
/// usual borrow rules and cannot outlive the next mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCacheEntry {
    origin: Origin,
    realm: String,
    scheme: String,
    auth_challenge: String,
    username: String,
    password: String,
    nonce_count: u32,
    /// Known parent directories, newest first. Bounded by
    /// [`MAX_PATHS_PER_REALM_ENTRY`].
    paths: VecDeque<String>,
}

impl AuthCacheEntry {
    fn new(origin: Origin, realm: &str, scheme: &str) -> Self {
        Self {
            origin,
            realm: realm.to_string(),
            scheme: scheme.to_string(),
            auth_challenge: String::new(),
            username: String::new(),
            password: String::new(),
            nonce_count: 0,
            paths: VecDeque::new(),
        }
    }

    /// The origin this protection space belongs to.
    #[must_use]
    pub const fn origin(&self) -> &Origin {
        &self.origin
    }

    /// The server-chosen realm string (case-sensitive).
    #[must_use]
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// The authentication scheme, lowercase by caller convention.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The challenge string last received for this space.
    #[must_use]
    pub fn auth_challenge(&self) -> &str {
        &self.auth_challenge
    }

    /// The cached username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The cached password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Pre-increment and return the digest nonce-use counter.
    ///
    /// Monotonic for the life of the entry; reset only when the entry's
    /// stale challenge is replaced.
    pub fn increment_nonce_count(&mut self) -> u32 {
        self.nonce_count += 1;
        self.nonce_count
    }

    /// The known paths (parent directories), newest first.
    #[must_use]
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Record the parent directory of `path` as part of this protection
    /// space. Duplicates are ignored; once the list is at capacity, new
    /// paths are not recorded.
    fn add_path(&mut self, path: &str) {
        let parent = parent_directory(path);
        if self.has_exact_path(&parent) {
            return;
        }
        if self.paths.len() >= MAX_PATHS_PER_REALM_ENTRY {
            debug!(
                "Path list for realm '{}' at {} is full; not recording '{}'",
                self.realm, self.origin, parent
            );
            return;
        }
        self.paths.push_front(parent);
    }

    fn has_exact_path(&self, dir: &str) -> bool {
        self.paths.iter().any(|p| p == dir)
    }

    /// Whether any known path encloses the directory `dir`.
    fn has_enclosing_path(&self, dir: &str) -> bool {
        self.paths.iter().any(|p| is_enclosing_path(p, dir))
    }
}

/// Everything up to and including the last `/` of `path`; `/` for
/// malformed paths with no slash at all.
fn parent_directory(path: &str) -> String {
    match path.rfind('/') {
        Some(i) => path[..=i].to_string(),
        None => "/".to_string(),
    }
}

/// Whether `container` (a directory ending in `/`) is a prefix of `path`.
fn is_enclosing_path(container: &str, path: &str) -> bool {
    debug_assert!(container.is_empty() || container.ends_with('/'));
    (container.is_empty() && path.is_empty())
        || (!container.is_empty() && path.starts_with(container))
}

/// Bounded cache of authentication realm entries.
///
/// Realm and scheme are compared case-sensitively everywhere; callers are
/// expected to lowercase the scheme. At most one entry exists per
/// (origin, realm, scheme) triple.
///
/// # Examples
///
/// ```
/// use http_reuse::{AuthCache, Origin};
///
/// let mut cache = AuthCache::new();
/// let origin = Origin::new("http", "www.example.com", 80);
/// cache.add(&origin, "Staging", "basic", "Basic realm=Staging", "alice", "s3cret", "/dir/a.html");
///
/// let entry = cache.lookup_by_path(&origin, "/dir/b.html").unwrap();
/// assert_eq!(entry.username(), "alice");
/// assert!(cache.lookup_by_path(&origin, "/other/").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthCache {
    /// Insertion-ordered; the front is the oldest and is evicted first.
    entries: Vec<AuthCacheEntry>,
}

impl AuthCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of realm entries currently cached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact-match lookup by (origin, realm, scheme).
    pub fn lookup(
        &mut self,
        origin: &Origin,
        realm: &str,
        scheme: &str,
    ) -> Option<&mut AuthCacheEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.origin == *origin && e.realm == realm && e.scheme == scheme)
    }

    /// Protection-space lookup: the first entry (in list order) for
    /// `origin` whose known paths enclose `path`.
    ///
    /// When several entries' protection spaces overlap, the first one
    /// found wins; there is no tie-break by specificity.
    pub fn lookup_by_path(&mut self, origin: &Origin, path: &str) -> Option<&mut AuthCacheEntry> {
        let parent = parent_directory(path);
        self.entries
            .iter_mut()
            .find(|e| e.origin == *origin && e.has_enclosing_path(&parent))
    }

    /// Insert or update the entry for (origin, realm, scheme).
    ///
    /// An existing entry is updated in place: challenge and credentials
    /// are replaced and `path` joins the known-path list (deduplicated,
    /// capped); the nonce counter is untouched. A new entry may evict the
    /// oldest one when the cache is at [`MAX_REALM_ENTRIES`].
    #[allow(clippy::too_many_arguments)]
    pub fn add(
        &mut self,
        origin: &Origin,
        realm: &str,
        scheme: &str,
        auth_challenge: &str,
        username: &str,
        password: &str,
        path: &str,
    ) -> &mut AuthCacheEntry {
        let index = match self
            .entries
            .iter()
            .position(|e| e.origin == *origin && e.realm == realm && e.scheme == scheme)
        {
            Some(index) => index,
            None => {
                if self.entries.len() >= MAX_REALM_ENTRIES {
                    let evicted = self.entries.remove(0);
                    warn!(
                        "Auth cache full; evicting oldest entry (realm '{}' at {})",
                        evicted.realm, evicted.origin
                    );
                }
                self.entries
                    .push(AuthCacheEntry::new(origin.clone(), realm, scheme));
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[index];
        entry.auth_challenge = auth_challenge.to_string();
        entry.username = username.to_string();
        entry.password = password.to_string();
        entry.add_path(path);
        entry
    }

    /// Remove the entry for (origin, realm, scheme), but only when the
    /// stored credentials equal the given ones exactly.
    ///
    /// A mismatch leaves the cache untouched: a caller must not be able to
    /// erase credentials it does not already know.
    pub fn remove(
        &mut self,
        origin: &Origin,
        realm: &str,
        scheme: &str,
        username: &str,
        password: &str,
    ) -> bool {
        let Some(index) = self
            .entries
            .iter()
            .position(|e| e.origin == *origin && e.realm == realm && e.scheme == scheme)
        else {
            return false;
        };
        let entry = &self.entries[index];
        if entry.username != username || entry.password != password {
            return false;
        }
        self.entries.remove(index);
        true
    }

    /// Replace the challenge of an existing entry and restart its nonce
    /// counter. Returns `false` when no entry matches.
    pub fn update_stale_challenge(
        &mut self,
        origin: &Origin,
        realm: &str,
        scheme: &str,
        auth_challenge: &str,
    ) -> bool {
        match self.lookup(origin, realm, scheme) {
            Some(entry) => {
                entry.auth_challenge = auth_challenge.to_string();
                entry.nonce_count = 0;
                true
            }
            None => false,
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
