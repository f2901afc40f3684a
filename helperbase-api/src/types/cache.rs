//! Cache administration API types

use helperbase_storage::CacheStats;
use serde::{Deserialize, Serialize};

/// Snapshot of the record cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CacheStatsResponse {
    pub size: usize,
    pub max_size: usize,
    pub ttl_secs: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub hit_rate: f64,
    /// Current keys, most recently used first
    pub keys: Vec<String>,
}

impl CacheStatsResponse {
    pub fn new(stats: CacheStats, keys: Vec<String>) -> Self {
        Self {
            size: stats.size,
            max_size: stats.max_size,
            ttl_secs: stats.ttl.as_secs(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            hit_rate: stats.hit_rate(),
            keys,
        }
    }
}

/// Remove every cached key containing `pattern`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct InvalidateCacheRequest {
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct InvalidateCacheResponse {
    pub removed: usize,
}
