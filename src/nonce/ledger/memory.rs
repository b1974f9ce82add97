//! In-memory ledger backend.

use super::{LedgerEntry, LedgerStats, TokenLedger};
use crate::NonceError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A HashMap-backed ledger for single-instance deployments and tests.
///
/// Data is lost on restart. That is acceptable when the restart takes longer
/// than the token TTL, or when losing single-use guarantees across a restart
/// is tolerable.
///
/// # Example
///
/// ```rust
/// use action_nonce::ledger::{MemoryLedger, TokenLedger};
///
/// # async fn example() -> Result<(), action_nonce::NonceError> {
/// let ledger = MemoryLedger::new();
/// ledger.mark_used("key", 4600, 1000).await?;
/// assert!(ledger.is_used("key").await?);
/// assert!(ledger.mark_used("key", 4600, 1001).await.is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryLedger {
    data: Arc<RwLock<HashMap<String, LedgerEntry>>>,
}

impl MemoryLedger {
    /// Creates a new in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger with room for `capacity` tokens.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::with_capacity(capacity))),
        }
    }
}

#[async_trait]
impl TokenLedger for MemoryLedger {
    async fn mark_used(&self, key: &str, expires_at: i64, used_at: i64) -> Result<(), NonceError> {
        let mut data = self.data.write().await;
        match data.entry(key.to_string()) {
            Entry::Occupied(_) => Err(NonceError::DuplicateNonce),
            Entry::Vacant(slot) => {
                slot.insert(LedgerEntry {
                    key: key.to_string(),
                    expires_at,
                    used_at,
                });
                Ok(())
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Option<LedgerEntry>, NonceError> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn cleanup_expired(&self, now: i64) -> Result<usize, NonceError> {
        let mut data = self.data.write().await;
        let initial_count = data.len();
        data.retain(|_, entry| entry.expires_at >= now);
        Ok(initial_count - data.len())
    }

    async fn get_stats(&self) -> Result<LedgerStats, NonceError> {
        let data = self.data.read().await;
        let key_bytes: usize = data.keys().map(String::len).sum();
        Ok(LedgerStats {
            total_records: data.len(),
            backend_info: format!("In-memory HashMap ledger (~{} key bytes)", key_bytes),
        })
    }
}
