//! Pluggable ledgers recording consumed tokens.
//!
//! The token scheme itself is stateless: a token stays valid until its expiry
//! no matter how often it is presented. A ledger adds single-use semantics by
//! remembering which tokens have already been accepted. Entries live until
//! the consumed token's expiry, capped by the guard at the configured TTL.

use crate::NonceError;
use async_trait::async_trait;

mod memory;
pub use memory::MemoryLedger;

#[cfg(feature = "sqlite-ledger")]
mod sqlite;
#[cfg(feature = "sqlite-ledger")]
pub use sqlite::SqliteLedger;

/// A consumed token and its bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// The token's replay key: the token with its expiry field removed
    pub key: String,
    /// Unix timestamp at which the token expires
    pub expires_at: i64,
    /// Unix timestamp at which the token was consumed
    pub used_at: i64,
}

/// Statistics about a ledger backend.
#[derive(Debug, Clone)]
pub struct LedgerStats {
    /// Number of keys currently recorded
    pub total_records: usize,
    /// Additional backend-specific information
    pub backend_info: String,
}

/// Abstract storage for consumed tokens.
///
/// Tokens are recorded by replay key rather than verbatim. The expiry field
/// of a token is not covered by its digest, so two tokens differing only
/// there must count as the same token.
///
/// # Available Implementations
///
/// - [`MemoryLedger`] - Always available, in-memory HashMap-based ledger
/// - `SqliteLedger` - Available with the `sqlite-ledger` feature
///
/// # Thread Safety
///
/// All methods are async and must be safe to call concurrently. In
/// particular `mark_used` must be atomic: of two concurrent calls for the
/// same token exactly one succeeds.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Optional backend initialization (create tables, open connections).
    async fn init(&self) -> Result<(), NonceError> {
        Ok(())
    }

    /// Records `key` as consumed at `used_at`, to be kept until `expires_at`.
    ///
    /// Returns `Err(NonceError::DuplicateNonce)` if it was already recorded.
    async fn mark_used(&self, key: &str, expires_at: i64, used_at: i64) -> Result<(), NonceError>;

    /// Returns the entry for `key`, if recorded.
    async fn get(&self, key: &str) -> Result<Option<LedgerEntry>, NonceError>;

    /// True if `key` has been consumed.
    async fn is_used(&self, key: &str) -> Result<bool, NonceError> {
        Ok(self.get(key).await?.is_some())
    }

    /// Drops every entry whose expiry is strictly before `now`.
    ///
    /// Returns the number of entries removed.
    async fn cleanup_expired(&self, now: i64) -> Result<usize, NonceError>;

    /// Returns backend statistics.
    async fn get_stats(&self) -> Result<LedgerStats, NonceError>;
}
