use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct CacheStat {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub size: usize,
}

impl std::fmt::Display for CacheStat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hits: {:>8}, misses: {:>8}, hit_rate: {:>6.2}%, size: {:>8}",
            self.hits,
            self.misses,
            self.hit_rate * 100.0,
            self.size
        )
    }
}

/// Hit/miss counters of a caching resolver.
///
/// All counters use `Ordering::Relaxed`: they are independent and only need
/// to be updated atomically.
#[derive(Debug, Default)]
pub struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheCounters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, size: usize) -> CacheStat {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStat {
            hits,
            misses,
            hit_rate: if total == 0 {
                0.0
            } else {
                hits as f64 / total as f64
            },
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_hit_rate() {
        let counters = CacheCounters::new();
        assert_eq!(counters.snapshot(0).hit_rate, 0.0);

        counters.record_miss();
        counters.record_hit();
        counters.record_hit();
        counters.record_hit();
        let stat = counters.snapshot(1);
        assert_eq!(stat.hits, 3);
        assert_eq!(stat.misses, 1);
        assert_eq!(stat.hit_rate, 0.75);
        assert_eq!(
            stat.to_string(),
            "hits:        3, misses:        1, hit_rate:  75.00%, size:        1"
        );
    }
}
