//! Per-identity pepper derivation.
//!
//! The pepper is a binding tag, not a secret: it lets validation reject a
//! token issued to another identity before any digest work is done.

use sha2::{Digest, Sha256};

/// Number of characters in the hex identity digest the pepper is cut from.
pub const PEPPER_DIGEST_LEN: usize = 64;

/// Derives the pepper for `identity`: the trailing `length` characters of the
/// hex SHA-256 digest of its string form.
///
/// Lengths above [`PEPPER_DIGEST_LEN`] yield the whole digest.
///
/// ```rust
/// use action_nonce::pepper::derive_pepper;
///
/// let pepper = derive_pepper("42", 6);
/// assert_eq!(pepper.len(), 6);
/// assert_eq!(pepper, derive_pepper("42", 6));
/// assert_eq!(derive_pepper("42", 0), "");
/// ```
pub fn derive_pepper(identity: &str, length: usize) -> String {
    let digest = hex::encode(Sha256::digest(identity.as_bytes()));
    let start = digest.len().saturating_sub(length);
    digest[start..].to_string()
}
