//! In-process cache for record-store reads.
//!
//! [`BoundedTtlCache`] holds at most `max_entries` values, each for at most
//! `ttl`. Reads that miss go to the record store through
//! [`BoundedTtlCache::get_or_set`]; writes invalidate by exact key or by
//! substring pattern using the names in [`keys`].
//!
//! # Example
//!
//! ```
//! use helperbase_storage::cache::{BoundedTtlCache, CacheConfig};
//! use std::time::Duration;
//!
//! let cache: BoundedTtlCache<u32> = BoundedTtlCache::new(
//!     CacheConfig::new().with_ttl(Duration::from_secs(300)).with_max_entries(2),
//! );
//! cache.set("a", 1);
//! cache.set("b", 2);
//! assert_eq!(cache.get("a"), Some(1));
//! cache.set("c", 3);
//! assert_eq!(cache.get("b"), None);
//! ```

pub mod bounded;
pub mod clock;
pub mod keys;
pub mod stats;

pub use bounded::{BoundedTtlCache, CacheConfig};
pub use clock::{CacheClock, ManualClock, SystemClock};
pub use stats::CacheStats;
