use thiserror::Error;

/// Error types that can occur while issuing or checking nonce tokens.
///
/// [`NonceManager::validate`](crate::NonceManager::validate) never surfaces
/// these to the caller: every failure there folds into `false`. They are
/// returned by token creation, configuration checks, the digit codec, and the
/// single-use ledger.
///
/// # Error Categories
///
/// - **Format Errors**: `FormatError`, `MalformedToken`
/// - **Validation Failures**: `SaltMismatch`, `PepperMismatch`, `InvalidDigest`, `ExpiredNonce`
/// - **Ledger Errors**: `DuplicateNonce`, `StorageError`
/// - **System Errors**: `InvalidConfig`, `CryptoError`
///
/// # Example
///
/// ```rust
/// use action_nonce::{NonceError, codec};
///
/// match codec::encode_digits("12a4") {
///     Ok(encoded) => println!("encoded: {encoded}"),
///     Err(NonceError::FormatError(msg)) => println!("rejected: {msg}"),
///     Err(e) => println!("other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum NonceError {
    /// A value could not be encoded into, or decoded from, the substituted
    /// digit alphabet.
    ///
    /// # When This Occurs
    ///
    /// - Encoding a string that contains anything other than `0`-`9`
    /// - Decoding a time field containing a symbol outside the alphabet
    /// - An expiry that is negative or wider than the configured time field
    #[error("Format error: {0}")]
    FormatError(String),

    /// The token is too short to hold its fixed-width fields.
    #[error("Malformed token")]
    MalformedToken,

    /// The token does not end with the expected salt.
    #[error("Salt mismatch")]
    SaltMismatch,

    /// The token does not start with the pepper derived for the identity.
    ///
    /// Usually means the token was issued to a different user.
    #[error("Pepper mismatch")]
    PepperMismatch,

    /// The embedded digest does not verify against the signed payload.
    ///
    /// # When This Occurs
    ///
    /// - The action, identity or object id differs from the one the token was issued for
    /// - The token was tampered with
    /// - The issuing and validating managers use different secrets
    #[error("Invalid digest")]
    InvalidDigest,

    /// The expiry embedded in the token has passed.
    #[error("Nonce expired")]
    ExpiredNonce,

    /// The token was already consumed by a single-use ledger.
    #[error("Nonce already used")]
    DuplicateNonce,

    /// The configuration was rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A ledger backend operation failed.
    ///
    /// # Resolution
    ///
    /// - Check database file permissions and disk space
    /// - Ensure the ledger was initialized with `init()`
    #[error("Storage error: {0}")]
    StorageError(String),

    /// A cryptographic or clock operation failed.
    #[error("Crypto error: {0}")]
    CryptoError(String),
}

impl NonceError {
    /// Short machine-readable code for the error, used in log fields.
    pub fn code(&self) -> &'static str {
        match self {
            NonceError::FormatError(_) => "format_error",
            NonceError::MalformedToken => "malformed_token",
            NonceError::SaltMismatch => "salt_mismatch",
            NonceError::PepperMismatch => "pepper_mismatch",
            NonceError::InvalidDigest => "invalid_digest",
            NonceError::ExpiredNonce => "expired_nonce",
            NonceError::DuplicateNonce => "duplicate_nonce",
            NonceError::InvalidConfig(_) => "invalid_config",
            NonceError::StorageError(_) => "storage_error",
            NonceError::CryptoError(_) => "crypto_error",
        }
    }

    /// Returns true for the failures that mean "this token is not valid", as
    /// opposed to a bug or an infrastructure fault.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            NonceError::FormatError(_)
                | NonceError::MalformedToken
                | NonceError::SaltMismatch
                | NonceError::PepperMismatch
                | NonceError::InvalidDigest
                | NonceError::ExpiredNonce
                | NonceError::DuplicateNonce
        )
    }
}

#[cfg(feature = "sqlite-ledger")]
impl From<rusqlite::Error> for NonceError {
    fn from(err: rusqlite::Error) -> Self {
        NonceError::StorageError(err.to_string())
    }
}
