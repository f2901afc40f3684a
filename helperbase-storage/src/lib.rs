//! Helperbase Storage
//!
//! The bounded TTL cache used in front of the record store, and the record
//! store itself.

pub mod cache;
pub mod store;

pub use cache::{
    keys, BoundedTtlCache, CacheClock, CacheConfig, CacheStats, ManualClock, SystemClock,
};
pub use store::{InMemoryRecordStore, RecordStore};
