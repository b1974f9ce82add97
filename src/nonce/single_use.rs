use std::fmt::Display;
use std::sync::Arc;

use super::cleanup::{BoxedCleanupStrategy, HybridCleanupStrategy};
use super::ledger::{MemoryLedger, TokenLedger};
use super::time_utils::expiry_after;
use super::{NonceError, NonceManager};

/// Adds single-use semantics on top of a [`NonceManager`].
///
/// A token is accepted by [`consume`](Self::consume) at most once: the first
/// successful call records it in the ledger and later calls return `false`.
///
/// The ledger is keyed on `pepper ‖ digest ‖ salt`, not on the raw token.
/// The expiry field is not covered by the digest, so a copy of a consumed
/// token with a rewritten expiry still counts as consumed. Two consequences:
///
/// - With a deterministic digest (HMAC-SHA256) every token for the same
///   action, identity, object and salt shares one key. Use a fresh salt per
///   issued token (see [`random_salt`](crate::random_salt)) when several
///   may be outstanding at once.
/// - Entries are kept until the consumed token's expiry, but never longer
///   than the manager's configured TTL from the moment of consumption.
///   Protection against rewritten expiries lasts as long as the entry does.
///
/// # Example
///
/// ```rust
/// use action_nonce::{NonceManager, SingleUseGuard};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), action_nonce::NonceError> {
/// let manager = Arc::new(NonceManager::with_secret(b"secret")?);
/// let guard = SingleUseGuard::new(Arc::clone(&manager));
///
/// let token = manager.create("checkout", "alice", 99, "")?;
/// assert!(guard.consume(token.as_str(), "checkout", "alice", 99, "").await?);
/// assert!(!guard.consume(token.as_str(), "checkout", "alice", 99, "").await?);
/// # Ok(())
/// # }
/// ```
pub struct SingleUseGuard<L: TokenLedger> {
    manager: Arc<NonceManager>,
    ledger: Arc<L>,
    cleanup_strategy: BoxedCleanupStrategy,
}

impl SingleUseGuard<MemoryLedger> {
    /// Creates a guard backed by a fresh [`MemoryLedger`].
    pub fn new(manager: Arc<NonceManager>) -> Self {
        Self {
            manager,
            ledger: Arc::new(MemoryLedger::new()),
            cleanup_strategy: Box::new(HybridCleanupStrategy::default()),
        }
    }
}

impl<L: TokenLedger + 'static> SingleUseGuard<L> {
    /// Replaces the ledger backend.
    ///
    /// Call [`TokenLedger::init`] (or [`init`](Self::init)) before use.
    pub fn with_ledger<T: TokenLedger + 'static>(self, ledger: Arc<T>) -> SingleUseGuard<T> {
        SingleUseGuard {
            manager: self.manager,
            ledger,
            cleanup_strategy: self.cleanup_strategy,
        }
    }

    /// Replaces the automatic cleanup strategy.
    pub fn with_cleanup_strategy(mut self, strategy: BoxedCleanupStrategy) -> Self {
        self.cleanup_strategy = strategy;
        self
    }

    /// Initializes the ledger backend.
    pub async fn init(&self) -> Result<(), NonceError> {
        self.ledger.init().await
    }

    /// Validates `token` and marks it consumed.
    ///
    /// Returns `Ok(true)` exactly once per valid token. Invalid, expired and
    /// already-consumed tokens give `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Failures that say nothing about the token are returned as errors:
    /// ledger failures, clock failures from the time provider, and digest
    /// primitive failures (`CryptoError`).
    pub async fn consume(
        &self,
        token: &str,
        action: &str,
        identity: impl Display,
        object_id: impl Display,
        salt: &str,
    ) -> Result<bool, NonceError> {
        let verified = match self.manager.verify(token, action, identity, object_id, salt) {
            Ok(verified) => verified,
            Err(e) if e.is_rejection() => {
                tracing::debug!(action, reason = e.code(), "rejected nonce: {}", e);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let now = self.manager.now()?;
        let expires_at = verified.expiry.min(expiry_after(now, self.retention_secs()?)?);

        match self
            .ledger
            .mark_used(&verified.replay_key, expires_at, now)
            .await
        {
            Ok(()) => {}
            Err(NonceError::DuplicateNonce) => {
                tracing::debug!(action, reason = "duplicate_nonce", "replayed nonce");
                return Ok(false);
            }
            Err(e) => return Err(e),
        }

        self.maybe_trigger_cleanup().await;
        Ok(true)
    }

    /// Removes ledger entries for tokens that have expired.
    pub async fn cleanup_expired(&self) -> Result<usize, NonceError> {
        let now = self.manager.now()?;
        self.ledger.cleanup_expired(now).await
    }

    /// Returns the underlying manager.
    pub fn manager(&self) -> &Arc<NonceManager> {
        &self.manager
    }

    /// Returns the ledger backend.
    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    fn retention_secs(&self) -> Result<i64, NonceError> {
        i64::try_from(self.manager.config().ttl.as_secs())
            .map_err(|_| NonceError::InvalidConfig("ttl out of range".to_string()))
    }

    async fn maybe_trigger_cleanup(&self) {
        if self.cleanup_strategy.should_cleanup().await {
            self.spawn_background_cleanup();
            self.cleanup_strategy.mark_as_cleaned().await;
        }
    }

    fn spawn_background_cleanup(&self) {
        let now = match self.manager.now() {
            Ok(now) => now,
            Err(e) => {
                tracing::warn!("Skipping ledger cleanup: {}", e);
                return;
            }
        };
        let ledger = Arc::clone(&self.ledger);

        tokio::spawn(async move {
            match ledger.cleanup_expired(now).await {
                Ok(removed) => tracing::debug!(removed, "ledger cleanup finished"),
                Err(e) => tracing::warn!("Background cleanup failed: {}", e),
            }
        });
    }
}
