//! # Tillcache Core
//!
//! A minimal in-memory string key-value cache with optional per-entry deadlines.
//!
//! ## Features
//!
//! - Thread-safe storage behind a single reader/writer lock
//! - Entries either live forever (`put`) or until a wall-clock deadline (`put_till`)
//! - Expiration is checked lazily on read; expired entries are hidden, not removed
//! - Cheap cloneable handle: clones share the same entries
//!
//! ## Example
//!
//! ```rust
//! use std::time::{Duration, SystemTime};
//! use tillcache_core::Cache;
//!
//! let cache = Cache::new();
//!
//! // Never expires
//! cache.put("user:123", "John Doe");
//!
//! // Expires in one hour
//! cache.put_till("session:abc", "token", SystemTime::now() + Duration::from_secs(3600));
//!
//! assert_eq!(cache.get("user:123").as_deref(), Some("John Doe"));
//! assert!(cache.keys().contains(&"session:abc".to_string()));
//! assert_eq!(cache.get("missing"), None);
//! ```

mod cache;
mod config;
mod entry;

pub use cache::Cache;
pub use config::CacheConfig;
