//! Time utilities for safe timestamp handling.
//!
//! These avoid the panicking `SystemTime` conversions and keep expiry
//! arithmetic overflow-free.

use crate::nonce::error::NonceError;
use std::time::{SystemTime, UNIX_EPOCH};

/// Get current timestamp in seconds since Unix epoch.
///
/// In the extremely rare case where system time is before Unix epoch,
/// it returns an error instead of panicking.
pub(crate) fn current_timestamp() -> Result<i64, NonceError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| NonceError::CryptoError("System time is before Unix epoch".to_string()))
        .and_then(|d| {
            i64::try_from(d.as_secs())
                .map_err(|_| NonceError::CryptoError("System time out of range".to_string()))
        })
}

/// Computes `now + ttl_seconds`, rejecting overflow.
pub(crate) fn expiry_after(now: i64, ttl_seconds: i64) -> Result<i64, NonceError> {
    now.checked_add(ttl_seconds).ok_or_else(|| {
        NonceError::FormatError(format!("expiry {now} + {ttl_seconds} overflows"))
    })
}

/// A token stays valid through its expiry second inclusive.
pub(crate) fn is_expired(expiry: i64, now: i64) -> bool {
    now > expiry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_timestamp() {
        let ts = current_timestamp().unwrap();
        // Should be a reasonable timestamp (after year 2020)
        assert!(ts > 1577836800);
    }

    #[test]
    fn test_expiry_after() {
        assert_eq!(expiry_after(1000, 3600).unwrap(), 4600);
        assert_eq!(expiry_after(1000, -1).unwrap(), 999);
        assert!(expiry_after(i64::MAX, 1).is_err());
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        assert!(!is_expired(4600, 4599));
        assert!(!is_expired(4600, 4600));
        assert!(is_expired(4600, 4601));
    }
}
