// Token construction
pub mod codec;
pub mod pepper;
pub mod spice;

// Core architecture components
mod config;
mod error;
mod manager;
mod time_utils;

// Digest algorithms
pub mod digest;

// Single-use ledger and cleanup
pub mod cleanup;
pub mod ledger;
mod single_use;

// Core components exports
pub use config::{ConfigPreset, MAX_TIME_WIDTH, MIN_TIME_WIDTH, NonceConfig};
pub use error::NonceError;
pub use manager::{NonceManager, TimeProviderFn};

// Digest algorithm exports
pub use digest::DigestAlgorithm;
#[cfg(feature = "algo-hmac-sha256")]
pub use digest::{DefaultDigestAlgorithm, create_default_algorithm};

// Ledger and cleanup exports
pub use cleanup::{BoxedCleanupStrategy, CleanupStrategy, HybridCleanupStrategy};
pub use ledger::{LedgerEntry, LedgerStats, MemoryLedger, TokenLedger};
pub use single_use::SingleUseGuard;
