//! Cache connection settings.

use std::time::Duration;

/// Configuration for the Redis-backed cache tier.
///
/// Every field has a default; none of them is required for the mediator
/// contract, which is testable against [`crate::MemoryCacheTier`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Connection target, `redis://[:credential@]host:port` form.
    pub url: String,
    /// Logical database index selected after connect.
    pub database: i64,
    /// Retry ceiling for command-level retry and reconnect attempts.
    pub max_retries: usize,
    /// Base delay for exponential backoff between retries.
    pub backoff_base: Duration,
    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,
    /// Timeout for an individual command round-trip.
    pub command_timeout: Duration,
    /// When false, commands issued while the tier is unreachable fail fast
    /// with `Unavailable` instead of waiting out the retry schedule.
    pub queue_when_offline: bool,
    /// When true, the first command establishes the connection instead of
    /// the constructor.
    pub lazy_connect: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            database: 0,
            max_retries: 3,
            backoff_base: Duration::from_millis(50),
            connect_timeout: Duration::from_secs(2),
            command_timeout: Duration::from_secs(1),
            queue_when_offline: true,
            lazy_connect: false,
        }
    }
}

impl CacheSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_database(mut self, database: i64) -> Self {
        self.database = database;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_queue_when_offline(mut self, queue: bool) -> Self {
        self.queue_when_offline = queue;
        self
    }

    pub fn with_lazy_connect(mut self, lazy: bool) -> Self {
        self.lazy_connect = lazy;
        self
    }
}
