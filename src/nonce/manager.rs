use crate::NonceToken;
use crate::nonce::codec::{decode_timestamp, encode_timestamp};
use crate::nonce::config::NonceConfig;
use crate::nonce::digest::DigestAlgorithm;
use crate::nonce::error::NonceError;
use crate::nonce::pepper::derive_pepper;
use crate::nonce::spice::{check_pepper, check_salt, spice, unspice};
use crate::nonce::time_utils::{current_timestamp, expiry_after, is_expired};
use std::fmt::Display;

/// A function that provides the current Unix timestamp in seconds.
pub type TimeProviderFn = Box<dyn Fn() -> Result<i64, NonceError> + Send + Sync>;

/// Outcome of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VerifiedToken {
    /// Expiry decoded from the time field
    pub expiry: i64,
    /// `pepper ‖ digest ‖ salt`: every field the digest and the caller's
    /// arguments pin down. The time field is left out because rewriting it
    /// does not break verification.
    pub replay_key: String,
}

/// Issues and validates action-bound nonce tokens.
///
/// A token is `pepper ‖ digest ‖ encoded_expiry ‖ salt`:
///
/// - `pepper`: the identity's derived tag, `pepper_length` characters
/// - `digest`: the algorithm's digest of `action ‖ identity ‖ object_id`
/// - `encoded_expiry`: the expiry timestamp, zero-padded to `time_width`
///   digits and passed through the digit codec
/// - `salt`: the caller's salt, verbatim
///
/// The manager holds no mutable state, so one instance can be shared behind
/// an `Arc` by any number of threads or tasks.
///
/// # Example
///
/// ```rust
/// use action_nonce::NonceManager;
///
/// let manager = NonceManager::with_secret(b"server secret")?;
/// let token = manager.create("delete-post", 42, 1337, "form-a")?;
///
/// assert!(manager.validate(token.as_str(), "delete-post", 42, 1337, "form-a"));
/// assert!(!manager.validate(token.as_str(), "delete-post", 43, 1337, "form-a"));
/// # Ok::<(), action_nonce::NonceError>(())
/// ```
pub struct NonceManager {
    algorithm: Box<dyn DigestAlgorithm>,
    config: NonceConfig,
    time_provider: TimeProviderFn,
}

impl NonceManager {
    /// Creates a manager over `algorithm`, rejecting unusable configurations.
    ///
    /// Soft warnings from [`NonceConfig::validate`] are logged, not returned.
    pub fn new<A>(algorithm: A, config: NonceConfig) -> Result<Self, NonceError>
    where
        A: DigestAlgorithm + 'static,
    {
        config.check()?;
        for warning in config.validate() {
            tracing::warn!("{}", warning);
        }
        Ok(Self {
            algorithm: Box::new(algorithm),
            config,
            time_provider: Box::new(current_timestamp),
        })
    }

    /// Creates a manager using HMAC-SHA256 over `secret` and the default
    /// configuration.
    #[cfg(feature = "algo-hmac-sha256")]
    pub fn with_secret(secret: &[u8]) -> Result<Self, NonceError> {
        Self::new(
            crate::nonce::digest::create_default_algorithm(secret),
            NonceConfig::default(),
        )
    }

    /// Sets a custom time provider function.
    ///
    /// ```rust
    /// use action_nonce::NonceManager;
    ///
    /// let manager = NonceManager::with_secret(b"key")?.with_time_provider(|| Ok(1000));
    /// assert_eq!(manager.now()?, 1000);
    /// # Ok::<(), action_nonce::NonceError>(())
    /// ```
    pub fn with_time_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Result<i64, NonceError> + Send + Sync + 'static,
    {
        self.time_provider = Box::new(provider);
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &NonceConfig {
        &self.config
    }

    /// Returns the digest algorithm's name.
    pub fn algorithm_name(&self) -> &'static str {
        self.algorithm.name()
    }

    /// Current time according to the configured time provider.
    pub fn now(&self) -> Result<i64, NonceError> {
        (self.time_provider)()
    }

    /// Issues a token valid for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns an error if the clock fails, the digest algorithm fails, or the
    /// expiry does not fit the time field. These indicate a configuration
    /// problem rather than bad input.
    pub fn create(
        &self,
        action: &str,
        identity: impl Display,
        object_id: impl Display,
        salt: &str,
    ) -> Result<NonceToken, NonceError> {
        // `check()` guarantees the TTL fits an i64.
        let ttl = i64::try_from(self.config.ttl.as_secs())
            .map_err(|_| NonceError::InvalidConfig("ttl out of range".to_string()))?;
        self.create_with_ttl(action, identity, object_id, ttl, salt)
    }

    /// Issues a token valid for `ttl_seconds` from now.
    ///
    /// A negative TTL issues a token that is already expired.
    pub fn create_with_ttl(
        &self,
        action: &str,
        identity: impl Display,
        object_id: impl Display,
        ttl_seconds: i64,
        salt: &str,
    ) -> Result<NonceToken, NonceError> {
        let identity = identity.to_string();
        let expiry = expiry_after(self.now()?, ttl_seconds)?;
        let encoded_time = encode_timestamp(expiry, self.config.time_width)?;

        let payload = signed_payload(action, &identity, &object_id.to_string());
        let mut body = self.algorithm.hash(&payload)?;
        body.push_str(&encoded_time);

        tracing::trace!(
            action,
            expiry,
            algorithm = self.algorithm.name(),
            "issued nonce"
        );

        Ok(NonceToken::new(spice(
            &body,
            &identity,
            salt,
            self.config.pepper_length,
        )))
    }

    /// Checks whether `token` is a live token for this action, identity,
    /// object and salt.
    ///
    /// Every failure (wrong salt, foreign identity, truncated or tampered
    /// token, expiry passed) yields `false`; the reason is logged at debug
    /// level.
    pub fn validate(
        &self,
        token: &str,
        action: &str,
        identity: impl Display,
        object_id: impl Display,
        salt: &str,
    ) -> bool {
        match self.verify(token, action, identity, object_id, salt) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(action, reason = e.code(), "rejected nonce: {}", e);
                false
            }
        }
    }

    /// Runs the full check and returns the token's expiry and replay key.
    pub(crate) fn verify(
        &self,
        token: &str,
        action: &str,
        identity: impl Display,
        object_id: impl Display,
        salt: &str,
    ) -> Result<VerifiedToken, NonceError> {
        let identity = identity.to_string();
        let pepper_length = self.config.pepper_length;

        if !check_salt(token, salt) {
            return Err(NonceError::SaltMismatch);
        }
        if !check_pepper(token, &identity, pepper_length) {
            return Err(NonceError::PepperMismatch);
        }

        let stripped = unspice(token, &identity, salt, pepper_length);
        let time_start = stripped
            .len()
            .checked_sub(self.config.time_width)
            .ok_or(NonceError::MalformedToken)?;
        if !stripped.is_char_boundary(time_start) {
            return Err(NonceError::MalformedToken);
        }
        let (digest_part, encoded_time) = stripped.split_at(time_start);

        let expiry = decode_timestamp(encoded_time)?;

        let payload = signed_payload(action, &identity, &object_id.to_string());
        self.algorithm.verify(&payload, digest_part)?;

        if is_expired(expiry, self.now()?) {
            return Err(NonceError::ExpiredNonce);
        }

        let mut replay_key = derive_pepper(&identity, pepper_length);
        replay_key.push_str(digest_part);
        replay_key.push_str(salt);
        Ok(VerifiedToken { expiry, replay_key })
    }
}

fn signed_payload(action: &str, identity: &str, object_id: &str) -> String {
    let mut payload = String::with_capacity(action.len() + identity.len() + object_id.len());
    payload.push_str(action);
    payload.push_str(identity);
    payload.push_str(object_id);
    payload
}
