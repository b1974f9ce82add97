//! Pluggable one-way digest algorithms for the signed payload.
//!
//! The token embeds `hash(action ‖ identity ‖ object_id)`. Validation never
//! recomputes and compares strings itself; it asks the algorithm to verify,
//! so salted algorithms such as Argon2 work as well as deterministic MACs.
//! HMAC-SHA256 is the default.

use crate::NonceError;

/// A keyed one-way hash used to bind a token to its payload.
///
/// # Implementation Notes
///
/// - `verify` must use constant-time comparison
/// - `verify` must treat malformed digests as a mismatch, not a panic
/// - Implementations must be `Send + Sync` so a manager can be shared
///
/// # Example
///
/// ```rust
/// # use action_nonce::digest::DigestAlgorithm;
/// # use action_nonce::NonceError;
/// struct Reversed;
///
/// impl DigestAlgorithm for Reversed {
///     fn name(&self) -> &'static str {
///         "reversed"
///     }
///
///     fn hash(&self, plaintext: &str) -> Result<String, NonceError> {
///         Ok(plaintext.chars().rev().collect())
///     }
///
///     fn verify(&self, plaintext: &str, digest: &str) -> Result<(), NonceError> {
///         if self.hash(plaintext)? == digest {
///             Ok(())
///         } else {
///             Err(NonceError::InvalidDigest)
///         }
///     }
/// }
/// ```
pub trait DigestAlgorithm: Send + Sync {
    /// Short identifier such as "hmac-sha256", used in logs.
    fn name(&self) -> &'static str;

    /// Computes the digest string for `plaintext`.
    fn hash(&self, plaintext: &str) -> Result<String, NonceError>;

    /// Checks `digest` against `plaintext`.
    ///
    /// Returns `Err(NonceError::InvalidDigest)` on mismatch.
    fn verify(&self, plaintext: &str, digest: &str) -> Result<(), NonceError>;
}

#[cfg(feature = "algo-hmac-sha256")]
pub mod hmac_sha256 {
    //! HMAC-SHA256 digest algorithm implementation.

    use super::DigestAlgorithm;
    use crate::NonceError;
    use base64::Engine;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    /// Base64 HMAC-SHA256 keyed with a server secret.
    ///
    /// Digests are always 44 characters.
    ///
    /// # Example
    ///
    /// ```rust
    /// use action_nonce::digest::hmac_sha256::HmacSha256Digest;
    /// use action_nonce::digest::DigestAlgorithm;
    ///
    /// let algorithm = HmacSha256Digest::new(b"my_secret_key");
    /// let digest = algorithm.hash("edit427")?;
    /// algorithm.verify("edit427", &digest)?;
    /// # Ok::<(), action_nonce::NonceError>(())
    /// ```
    pub struct HmacSha256Digest {
        key: Vec<u8>,
    }

    impl HmacSha256Digest {
        /// Create a new HMAC-SHA256 algorithm with the given key.
        pub fn new(key: &[u8]) -> Self {
            Self { key: key.to_vec() }
        }

        fn create_hmac(&self) -> Result<Hmac<Sha256>, NonceError> {
            Hmac::<Sha256>::new_from_slice(&self.key)
                .map_err(|e| NonceError::CryptoError(format!("Invalid HMAC key: {e}")))
        }
    }

    impl DigestAlgorithm for HmacSha256Digest {
        fn name(&self) -> &'static str {
            "hmac-sha256"
        }

        fn hash(&self, plaintext: &str) -> Result<String, NonceError> {
            let mut mac = self.create_hmac()?;
            mac.update(plaintext.as_bytes());
            let digest = mac.finalize().into_bytes();
            Ok(base64::engine::general_purpose::STANDARD.encode(digest))
        }

        fn verify(&self, plaintext: &str, digest: &str) -> Result<(), NonceError> {
            let expected = base64::engine::general_purpose::STANDARD
                .decode(digest)
                .map_err(|_| NonceError::InvalidDigest)?;

            let mut mac = self.create_hmac()?;
            mac.update(plaintext.as_bytes());

            // Constant-time comparison
            mac.verify_slice(&expected)
                .map_err(|_| NonceError::InvalidDigest)
        }
    }

}

#[cfg(feature = "algo-argon2")]
pub mod argon2id {
    //! Argon2id password-hash digest algorithm implementation.

    use super::DigestAlgorithm;
    use crate::NonceError;
    use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
    use argon2::{Algorithm, Argon2, Params, Version};

    /// Argon2id PHC-string digests keyed with a server secret.
    ///
    /// Every call to `hash` draws a fresh random salt, so two tokens for the
    /// same payload carry different digests. Hashing is deliberately slow;
    /// tune `Params` to the request budget.
    ///
    /// # Example
    ///
    /// ```rust
    /// use action_nonce::digest::argon2id::Argon2Digest;
    /// use action_nonce::digest::DigestAlgorithm;
    /// use argon2::Params;
    ///
    /// let params = Params::new(1024, 1, 1, None).unwrap();
    /// let algorithm = Argon2Digest::with_params(b"secret", params);
    /// let digest = algorithm.hash("edit427")?;
    /// algorithm.verify("edit427", &digest)?;
    /// # Ok::<(), action_nonce::NonceError>(())
    /// ```
    pub struct Argon2Digest {
        secret: Vec<u8>,
        params: Params,
    }

    impl Argon2Digest {
        /// Argon2id with the crate's default cost parameters.
        pub fn new(secret: &[u8]) -> Self {
            Self::with_params(secret, Params::default())
        }

        /// Argon2id with explicit cost parameters.
        pub fn with_params(secret: &[u8], params: Params) -> Self {
            Self {
                secret: secret.to_vec(),
                params,
            }
        }

        fn hasher(&self) -> Result<Argon2<'_>, NonceError> {
            Argon2::new_with_secret(
                &self.secret,
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            )
            .map_err(|e| NonceError::CryptoError(format!("Invalid Argon2 secret: {e}")))
        }
    }

    impl DigestAlgorithm for Argon2Digest {
        fn name(&self) -> &'static str {
            "argon2id"
        }

        fn hash(&self, plaintext: &str) -> Result<String, NonceError> {
            let salt_bytes: [u8; 16] = rand::random();
            let salt = SaltString::encode_b64(&salt_bytes)
                .map_err(|e| NonceError::CryptoError(format!("Salt encoding failed: {e}")))?;
            self.hasher()?
                .hash_password(plaintext.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| NonceError::CryptoError(format!("Argon2 hashing failed: {e}")))
        }

        fn verify(&self, plaintext: &str, digest: &str) -> Result<(), NonceError> {
            let parsed = PasswordHash::new(digest).map_err(|_| NonceError::InvalidDigest)?;
            self.hasher()?
                .verify_password(plaintext.as_bytes(), &parsed)
                .map_err(|_| NonceError::InvalidDigest)
        }
    }

}

/// Type alias for the default digest algorithm.
#[cfg(feature = "algo-hmac-sha256")]
pub type DefaultDigestAlgorithm = hmac_sha256::HmacSha256Digest;

/// Create the default digest algorithm with the given key.
#[cfg(feature = "algo-hmac-sha256")]
pub fn create_default_algorithm(key: &[u8]) -> DefaultDigestAlgorithm {
    hmac_sha256::HmacSha256Digest::new(key)
}
