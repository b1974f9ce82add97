use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;

/// Decides when a [`SingleUseGuard`](crate::SingleUseGuard) sweeps expired
/// entries out of its ledger.
///
/// `should_cleanup` is consulted after every successful consume.
#[async_trait]
pub trait CleanupStrategy: Send + Sync {
    /// Whether a sweep should run now.
    async fn should_cleanup(&self) -> bool;

    /// Resets internal state after a sweep was started.
    async fn mark_as_cleaned(&self);
}

/// Sweeps after `count_threshold` consumes or `time_threshold` elapsed,
/// whichever comes first.
pub struct HybridCleanupStrategy {
    count_threshold: u32,
    time_threshold: Duration,
    consume_count: AtomicU32,
    started: Instant,
    last_cleanup_ms: AtomicU64,
}

impl HybridCleanupStrategy {
    /// Creates a strategy with the given thresholds.
    ///
    /// ```
    /// use std::time::Duration;
    /// use action_nonce::HybridCleanupStrategy;
    ///
    /// // Sweep every 500 consumes or every 10 minutes
    /// let strategy = HybridCleanupStrategy::new(500, Duration::from_secs(600));
    /// ```
    pub fn new(count_threshold: u32, time_threshold: Duration) -> Self {
        Self {
            count_threshold,
            time_threshold,
            consume_count: AtomicU32::new(0),
            started: Instant::now(),
            last_cleanup_ms: AtomicU64::new(0),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

#[async_trait]
impl CleanupStrategy for HybridCleanupStrategy {
    async fn should_cleanup(&self) -> bool {
        let count = self.consume_count.fetch_add(1, Ordering::SeqCst) + 1;
        if count >= self.count_threshold {
            return true;
        }

        let since_last = self
            .elapsed_ms()
            .saturating_sub(self.last_cleanup_ms.load(Ordering::SeqCst));
        u128::from(since_last) >= self.time_threshold.as_millis()
    }

    async fn mark_as_cleaned(&self) {
        self.consume_count.store(0, Ordering::SeqCst);
        self.last_cleanup_ms
            .store(self.elapsed_ms(), Ordering::SeqCst);
    }
}

impl Default for HybridCleanupStrategy {
    /// 100 consumes or 5 minutes.
    fn default() -> Self {
        Self::new(100, Duration::from_secs(300))
    }
}

/// Type alias for boxed cleanup strategies to reduce verbosity.
pub type BoxedCleanupStrategy = Box<dyn CleanupStrategy>;
