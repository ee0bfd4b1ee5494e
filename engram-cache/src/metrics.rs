//! Cache observability counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters for cache behavior.
///
/// Best-effort cache writes swallow their errors by contract; the
/// write-failure counter is what keeps that path observable, so tests (and
/// metric exporters) can assert on it instead of scraping log lines.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    write_failures: AtomicU64,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    /// Hit rate in `[0.0, 1.0]`; zero when nothing has been read yet.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let metrics = CacheMetrics::new();
        for _ in 0..8 {
            metrics.record_hit();
        }
        for _ in 0..2 {
            metrics.record_miss();
        }
        assert!((metrics.hit_rate() - 0.8).abs() < 1e-9);
        assert_eq!(metrics.hit_rate(), 0.8);
    }

    #[test]
    fn test_empty_rate_is_zero() {
        assert_eq!(CacheMetrics::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_write_failures_count() {
        let metrics = CacheMetrics::new();
        metrics.record_write_failure();
        metrics.record_write_failure();
        assert_eq!(metrics.write_failures(), 2);
    }
}
