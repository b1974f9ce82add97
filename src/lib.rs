//! # Action Nonce
//!
//! Short-lived, tamper-resistant nonce tokens bound to an action, a user
//! identity and a target object. They protect state-changing requests such as
//! form submissions against cross-user forgery and limit replay to a TTL.
//!
//! ## Token Layout
//!
//! A token is a single opaque string with no delimiters:
//!
//! ```text
//! pepper ‖ digest ‖ encoded_expiry ‖ salt
//! ```
//!
//! - **Pepper**: a fixed-length tag derived from the identity, so tokens
//!   issued to another user are rejected up front
//! - **Digest**: a keyed one-way hash of `action ‖ identity ‖ object_id`
//! - **Encoded expiry**: the expiry timestamp, zero-padded to a fixed width
//!   and digit-substituted into the alphabet `a b c d $ f g h . j`
//! - **Salt**: a caller-supplied suffix binding the token to a context,
//!   e.g. a specific form
//!
//! Field boundaries are derived from the configured widths alone.
//!
//! ## Quick Start
//!
//! ```rust
//! use action_nonce::NonceManager;
//!
//! # fn example() -> Result<(), action_nonce::NonceError> {
//! let manager = NonceManager::with_secret(b"server secret")?;
//!
//! // Embed the token in the edit form for post 7, owned by user 42.
//! let token = manager.create("edit-post", 42, 7, "edit-form")?;
//!
//! // On submission, check it against the same parameters.
//! assert!(manager.validate(token.as_str(), "edit-post", 42, 7, "edit-form"));
//!
//! // Any other action, user, object or salt is rejected.
//! assert!(!manager.validate(token.as_str(), "delete-post", 42, 7, "edit-form"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Single Use
//!
//! Tokens are stateless and valid until they expire. Wrap the manager in a
//! [`SingleUseGuard`] to reject a token after its first acceptance:
//!
//! ```rust
//! use action_nonce::{NonceManager, SingleUseGuard};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), action_nonce::NonceError> {
//! let manager = Arc::new(NonceManager::with_secret(b"server secret")?);
//! let guard = SingleUseGuard::new(Arc::clone(&manager));
//!
//! let token = manager.create("transfer", "alice", 1, "")?;
//! assert!(guard.consume(token.as_str(), "transfer", "alice", 1, "").await?);
//! assert!(!guard.consume(token.as_str(), "transfer", "alice", 1, "").await?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! [`NonceConfig::default()`] reads `ACTION_NONCE_TTL`,
//! `ACTION_NONCE_PEPPER_LENGTH` and `ACTION_NONCE_TIME_WIDTH`; presets and
//! JSON loading are also available.
//!
//! ## Architecture
//!
//! - **[`NonceManager`]**: issues and validates tokens
//! - **[`codec`]**, **[`pepper`]**, **[`spice`]**: the token's framing primitives
//! - **[`digest::DigestAlgorithm`]**: pluggable keyed hash (HMAC-SHA256 by default)
//! - **[`SingleUseGuard`]** and **[`ledger`]**: optional replay ledger
//! - **[`NonceError`]**: error type for creation, configuration and ledgers

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod nonce;

// Re-export commonly used types
pub use nonce::{
    ConfigPreset, DigestAlgorithm, HybridCleanupStrategy, NonceConfig, NonceError, NonceManager,
    SingleUseGuard, codec, digest, ledger, pepper, spice,
};

/// An issued nonce token.
///
/// Serializes as a plain string so it can be embedded in any request body.
///
/// # Example
///
/// ```rust
/// use action_nonce::NonceManager;
///
/// let manager = NonceManager::with_secret(b"secret").unwrap();
/// let token = manager.create("edit", 42, 7, "xyz").unwrap();
///
/// #[derive(serde::Serialize)]
/// struct EditForm {
///     title: String,
///     nonce: action_nonce::NonceToken,
/// }
///
/// let form = EditForm {
///     title: "Hello".to_string(),
///     nonce: token,
/// };
/// let json = serde_json::to_string(&form).unwrap();
/// assert!(json.contains("xyz\""));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NonceToken(String);

impl NonceToken {
    pub(crate) fn new(value: String) -> Self {
        Self(value)
    }

    /// The token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NonceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonceToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<NonceToken> for String {
    fn from(token: NonceToken) -> Self {
        token.0
    }
}

/// Generates a random 32-character hex salt, e.g. one per rendered form.
#[cfg(feature = "default-generators")]
pub fn random_salt() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
