//! Salt and pepper framing around a payload.
//!
//! A spiced string is `pepper ‖ payload ‖ salt`. The salt is a caller-chosen
//! suffix; the pepper is a prefix derived from the identity. Comparisons are
//! byte-exact, and every slicing helper refuses to cut inside a UTF-8
//! character so untrusted input can never cause a panic.

use crate::nonce::pepper::derive_pepper;

/// Appends `salt` to `payload`.
pub fn salt(payload: &str, salt: &str) -> String {
    let mut out = String::with_capacity(payload.len() + salt.len());
    out.push_str(payload);
    out.push_str(salt);
    out
}

/// Prefixes `payload` with the pepper derived for `identity`.
pub fn pepper(payload: &str, identity: &str, length: usize) -> String {
    let mut out = derive_pepper(identity, length);
    out.push_str(payload);
    out
}

/// Produces `pepper ‖ payload ‖ salt`.
///
/// ```rust
/// use action_nonce::spice;
///
/// let spiced = spice::spice("body", "42", "xyz", 6);
/// assert!(spice::check_spice(&spiced, "42", "xyz", 6));
/// assert_eq!(spice::unspice(&spiced, "42", "xyz", 6), "body");
/// ```
pub fn spice(payload: &str, identity: &str, salt_value: &str, length: usize) -> String {
    pepper(&salt(payload, salt_value), identity, length)
}

/// True iff `s` ends with exactly `salt`.
pub fn check_salt(s: &str, salt: &str) -> bool {
    s.as_bytes().ends_with(salt.as_bytes())
}

/// True iff `s` starts with the pepper derived for `identity`.
pub fn check_pepper(s: &str, identity: &str, length: usize) -> bool {
    s.as_bytes()
        .starts_with(derive_pepper(identity, length).as_bytes())
}

/// Both [`check_salt`] and [`check_pepper`].
pub fn check_spice(s: &str, identity: &str, salt: &str, length: usize) -> bool {
    check_salt(s, salt) && check_pepper(s, identity, length)
}

/// Removes the trailing `salt.len()` bytes without checking them.
///
/// Floors at the empty string. If the cut would split a character, `s` is
/// returned unchanged: such a string cannot carry `salt` as a suffix.
pub fn unsalt<'a>(s: &'a str, salt: &str) -> &'a str {
    let cut = s.len().saturating_sub(salt.len());
    s.get(..cut).unwrap_or(s)
}

/// Removes the pepper prefix if it matches, otherwise returns `s` unchanged.
pub fn unpepper<'a>(s: &'a str, identity: &str, length: usize) -> &'a str {
    let pepper = derive_pepper(identity, length);
    s.strip_prefix(pepper.as_str()).unwrap_or(s)
}

/// [`unpepper`] followed by [`unsalt`].
pub fn unspice<'a>(s: &'a str, identity: &str, salt: &str, length: usize) -> &'a str {
    unsalt(unpepper(s, identity, length), salt)
}
