/// Construction options for a [`Cache`](crate::Cache)
///
/// # Example
///
/// ```rust
/// use tillcache_core::CacheConfig;
///
/// let config = CacheConfig::default()
///     .with_initial_capacity(1024);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Number of entries the backing map is pre-allocated for (default: 0).
    ///
    /// This is an allocation hint only; the cache grows past it freely.
    pub initial_capacity: usize,
}

impl CacheConfig {
    /// Creates a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial capacity of the backing map
    ///
    /// # Example
    ///
    /// ```rust
    /// use tillcache_core::CacheConfig;
    ///
    /// let config = CacheConfig::new().with_initial_capacity(10_000);
    /// assert_eq!(config.initial_capacity, 10_000);
    /// ```
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}
