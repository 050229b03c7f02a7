use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, SystemTime};

use crate::config::CacheConfig;
use crate::entry::Entry;

/// Truncates a key for logging so large keys don't flood the trace output
fn truncate_key_for_log(key: &str) -> String {
    const MAX_LOG_CHARS: usize = 16;
    if key.chars().count() <= MAX_LOG_CHARS {
        key.to_string()
    } else {
        let head: String = key.chars().take(MAX_LOG_CHARS).collect();
        format!("{}...", head)
    }
}

/// Internal shared state for the cache
struct CacheInner {
    entries: RwLock<HashMap<String, Entry>>,
}

/// Thread-safe in-memory string cache with optional per-entry deadlines
///
/// A single reader/writer lock guards the whole map: `get`, `keys`,
/// `contains_key` and `len` share the read lock and run concurrently with each
/// other, while `put`, `put_till` and `put_for` take the write lock exclusively.
///
/// Expiration is lazy. An entry whose deadline has passed is invisible to
/// reads and to [`Cache::keys`], but it stays in the map until the same key is
/// written again. There is no background sweeper and no delete operation, so
/// the number of stored entries never shrinks.
///
/// Cloning a `Cache` is cheap and yields a handle onto the same entries.
///
/// # Example
///
/// ```rust
/// use std::time::{Duration, SystemTime};
/// use tillcache_core::Cache;
///
/// let cache = Cache::new();
/// cache.put_till("b", "2", SystemTime::now() - Duration::from_secs(1));
/// assert_eq!(cache.get("b"), None);
///
/// // A later put clears the old deadline
/// cache.put("b", "3");
/// assert_eq!(cache.get("b").as_deref(), Some("3"));
/// ```
#[derive(Clone)]
pub struct Cache {
    inner: Arc<CacheInner>,
}

impl Cache {
    /// Creates a new empty cache with default configuration
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a new empty cache with custom configuration
    ///
    /// # Example
    ///
    /// ```rust
    /// use tillcache_core::{Cache, CacheConfig};
    ///
    /// let cache = Cache::with_config(CacheConfig::new().with_initial_capacity(1024));
    /// assert!(cache.is_empty());
    /// ```
    pub fn with_config(config: CacheConfig) -> Self {
        tracing::debug!(
            initial_capacity = config.initial_capacity,
            "creating cache"
        );

        // The capacity is only a hint; skip it rather than abort on overflow
        let mut entries = HashMap::new();
        if let Err(err) = entries.try_reserve(config.initial_capacity) {
            tracing::warn!(
                initial_capacity = config.initial_capacity,
                error = %err,
                "initial capacity not reserved"
            );
        }

        let inner = Arc::new(CacheInner {
            entries: RwLock::new(entries),
        });

        Self { inner }
    }

    // Every write is a single `insert`, so a panic elsewhere while the lock
    // was held cannot leave the map half-updated. Recover the guard instead of
    // propagating the poison.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Entry>> {
        self.inner
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Entry>> {
        self.inner
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Retrieves a value by key
    ///
    /// Returns `None` if the key was never written or its deadline has passed.
    /// Expired entries are left in place.
    pub fn get(&self, key: &str) -> Option<String> {
        let entries = self.read();
        let entry = entries.get(key)?;

        if entry.is_expired() {
            return None;
        }

        Some(entry.value().to_string())
    }

    /// Stores a value that never expires
    ///
    /// Overwrites any previous entry for `key`, including its deadline.
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key.into(), Entry::new(value, None));
    }

    /// Stores a value that expires at `deadline`
    ///
    /// `deadline` may be a [`SystemTime`] or `None`; `None` behaves exactly like
    /// [`Cache::put`]. A deadline at or before the current time is still
    /// stored, but the entry is invisible from the next read on.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::{Duration, SystemTime};
    /// use tillcache_core::Cache;
    ///
    /// let cache = Cache::new();
    /// cache.put_till("c", "3", SystemTime::now() + Duration::from_secs(3600));
    /// cache.put_till("d", "4", None);
    ///
    /// assert_eq!(cache.get("c").as_deref(), Some("3"));
    /// assert_eq!(cache.get("d").as_deref(), Some("4"));
    /// ```
    pub fn put_till(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        deadline: impl Into<Option<SystemTime>>,
    ) {
        self.insert(key.into(), Entry::new(value, deadline.into()));
    }

    /// Stores a value that expires `ttl` from now
    ///
    /// A zero `ttl` stores an already expired entry. If the deadline cannot be
    /// represented as a `SystemTime`, the entry never expires.
    pub fn put_for(&self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) {
        let deadline = SystemTime::now().checked_add(ttl);
        self.put_till(key, value, deadline);
    }

    fn insert(&self, key: String, entry: Entry) {
        tracing::trace!(
            key = %truncate_key_for_log(&key),
            expiring = entry.deadline().is_some(),
            "put"
        );

        self.write().insert(key, entry);
    }

    /// Returns all keys that are not expired
    ///
    /// The order is unspecified and may differ between calls.
    pub fn keys(&self) -> Vec<String> {
        let entries = self.read();
        let now = SystemTime::now();

        entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Checks if a key exists and is not expired
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.read()
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    /// Returns the number of stored entries (including expired ones)
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if nothing has ever been stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").field("len", &self.len()).finish()
    }
}
