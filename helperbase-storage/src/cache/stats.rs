//! Cache usage statistics.

use std::time::Duration;

/// Point-in-time snapshot of cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries currently held, including any not yet found to be expired.
    pub size: usize,
    /// Capacity bound.
    pub max_size: usize,
    /// Entry time-to-live.
    pub ttl: Duration,
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses, expired reads included.
    pub misses: u64,
    /// Number of entries dropped to make room.
    pub evictions: u64,
    /// Number of entries dropped because their TTL elapsed.
    pub expirations: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty_stats = CacheStats::default();
        assert!((empty_stats.hit_rate() - 0.0).abs() < 0.001);
    }
}
