use crate::nonce::codec::encode_timestamp;
use crate::nonce::error::NonceError;
use crate::nonce::pepper::PEPPER_DIGEST_LEN;
use crate::nonce::time_utils::{current_timestamp, expiry_after};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Smallest accepted time field width: enough for any current Unix timestamp.
pub const MIN_TIME_WIDTH: usize = 10;
/// Largest accepted time field width: every value still fits an `i64`.
pub const MAX_TIME_WIDTH: usize = 18;

/// Predefined configuration presets for common use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Production-ready configuration.
    ///
    /// - TTL: 1 hour (long enough to fill in a form)
    /// - Pepper length: 8
    /// - Time width: 12
    Production,

    /// Development-friendly configuration.
    ///
    /// - TTL: 24 hours (tokens survive a working day of reloads)
    /// - Pepper length: 6
    /// - Time width: 12
    Development,

    /// High-security configuration.
    ///
    /// - TTL: 10 minutes
    /// - Pepper length: 16
    /// - Time width: 12
    HighSecurity,

    /// Load configuration from environment variables.
    ///
    /// Reads configuration from:
    /// - `ACTION_NONCE_TTL`: TTL in seconds (default: 3600)
    /// - `ACTION_NONCE_PEPPER_LENGTH`: pepper characters (default: 8)
    /// - `ACTION_NONCE_TIME_WIDTH`: encoded time field width (default: 12)
    FromEnv,
}

/// Configuration for nonce issuance and validation.
///
/// # Environment Variables
///
/// `NonceConfig::default()` honours:
/// - `ACTION_NONCE_TTL`: TTL in seconds (default: 3600)
/// - `ACTION_NONCE_PEPPER_LENGTH`: pepper characters (default: 8)
/// - `ACTION_NONCE_TIME_WIDTH`: encoded time field width (default: 12)
///
/// # Example
///
/// ```rust
/// use action_nonce::NonceConfig;
/// use std::time::Duration;
///
/// let config = NonceConfig {
///     ttl: Duration::from_secs(1800),
///     pepper_length: 10,
///     time_width: 12,
/// };
/// assert!(config.check().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceConfig {
    /// Lifetime of newly issued tokens
    #[serde(with = "duration_secs")]
    pub ttl: Duration,
    /// Characters of identity pepper prefixed to each token
    pub pepper_length: usize,
    /// Width of the encoded expiry field
    pub time_width: usize,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Default for NonceConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(env_or("ACTION_NONCE_TTL", 3600)),
            pepper_length: env_or("ACTION_NONCE_PEPPER_LENGTH", 8),
            time_width: env_or("ACTION_NONCE_TIME_WIDTH", 12),
        }
    }
}

impl NonceConfig {
    /// Parses a configuration from JSON.
    ///
    /// ```rust
    /// use action_nonce::NonceConfig;
    ///
    /// let config = NonceConfig::from_json(
    ///     r#"{ "ttl": 600, "pepper_length": 6, "time_width": 12 }"#,
    /// )?;
    /// assert_eq!(config.ttl.as_secs(), 600);
    /// # Ok::<(), action_nonce::NonceError>(())
    /// ```
    pub fn from_json(json: &str) -> Result<Self, NonceError> {
        serde_json::from_str(json)
            .map_err(|e| NonceError::InvalidConfig(format!("invalid JSON config: {e}")))
    }

    /// Rejects configurations that cannot produce verifiable tokens.
    ///
    /// The TTL is checked against the system clock: an expiry issued now must
    /// fit in `time_width` digits. A failing clock is reported as
    /// `CryptoError`.
    pub fn check(&self) -> Result<(), NonceError> {
        if self.pepper_length > PEPPER_DIGEST_LEN {
            return Err(NonceError::InvalidConfig(format!(
                "pepper_length {} exceeds the {PEPPER_DIGEST_LEN}-character identity digest",
                self.pepper_length
            )));
        }
        if !(MIN_TIME_WIDTH..=MAX_TIME_WIDTH).contains(&self.time_width) {
            return Err(NonceError::InvalidConfig(format!(
                "time_width {} must be between {MIN_TIME_WIDTH} and {MAX_TIME_WIDTH}",
                self.time_width
            )));
        }
        let ttl = i64::try_from(self.ttl.as_secs()).map_err(|_| {
            NonceError::InvalidConfig(format!("ttl of {}s is out of range", self.ttl.as_secs()))
        })?;

        let fits = expiry_after(current_timestamp()?, ttl)
            .and_then(|expiry| encode_timestamp(expiry, self.time_width))
            .is_ok();
        if !fits {
            return Err(NonceError::InvalidConfig(format!(
                "ttl of {ttl}s overflows a {}-digit time field",
                self.time_width
            )));
        }
        Ok(())
    }

    /// Validates the configuration and returns any warnings.
    ///
    /// # Returns
    ///
    /// A vector of warning messages for potentially problematic settings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.ttl.as_secs() < 60 {
            warnings.push("Very short TTL (< 1 minute) may expire forms mid-edit".to_string());
        }
        if self.ttl.as_secs() > 7 * 24 * 3600 {
            warnings.push("Long TTL (> 7 days) widens the replay window".to_string());
        }

        if self.pepper_length == 0 {
            warnings.push(
                "Pepper disabled (length 0): identity is only bound through the digest"
                    .to_string(),
            );
        } else if self.pepper_length < 4 {
            warnings.push("Short pepper (< 4 characters) rejects foreign tokens poorly".to_string());
        }

        warnings
    }

    /// Returns a summary of the current configuration.
    pub fn summary(&self) -> String {
        format!(
            "NonceConfig {{ TTL: {}s, Pepper: {} chars, Time Width: {} }}",
            self.ttl.as_secs(),
            self.pepper_length,
            self.time_width,
        )
    }
}

impl From<ConfigPreset> for NonceConfig {
    fn from(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Production => Self {
                ttl: Duration::from_secs(3600),
                pepper_length: 8,
                time_width: 12,
            },
            ConfigPreset::Development => Self {
                ttl: Duration::from_secs(24 * 3600),
                pepper_length: 6,
                time_width: 12,
            },
            ConfigPreset::HighSecurity => Self {
                ttl: Duration::from_secs(600),
                pepper_length: 16,
                time_width: 12,
            },
            ConfigPreset::FromEnv => Self::default(),
        }
    }
}
