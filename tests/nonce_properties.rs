//! End-to-end properties of issued tokens.
//!
//! Run with: cargo test --test nonce_properties

#![cfg(feature = "algo-hmac-sha256")]

use action_nonce::digest::hmac_sha256::HmacSha256Digest;
use action_nonce::{DigestAlgorithm, NonceConfig, NonceManager, SingleUseGuard, codec, spice};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

const SECRET: &[u8] = b"integration_secret";
const PEPPER_LENGTH: usize = 6;
const TIME_WIDTH: usize = 12;

fn config() -> NonceConfig {
    NonceConfig {
        ttl: Duration::from_secs(3600),
        pepper_length: PEPPER_LENGTH,
        time_width: TIME_WIDTH,
    }
}

fn manager_with_clock() -> (NonceManager, Arc<AtomicI64>) {
    let clock = Arc::new(AtomicI64::new(1000));
    let reader = Arc::clone(&clock);
    let manager = NonceManager::new(HmacSha256Digest::new(SECRET), config())
        .unwrap()
        .with_time_provider(move || Ok(reader.load(Ordering::SeqCst)));
    (manager, clock)
}

#[test]
fn test_codec_round_trip_many_lengths() {
    let mut digits = String::new();
    for i in 0..64 {
        digits.push(char::from_digit((i * 7 % 10) as u32, 10).unwrap());
        let encoded = codec::encode_digits(&digits).unwrap();
        assert!(encoded.chars().all(|c| codec::ALPHABET.contains(&c)));
        assert_eq!(codec::decode_digits(&encoded).unwrap(), digits);
    }
}

#[test]
fn test_create_validate_agreement() {
    let manager = NonceManager::new(HmacSha256Digest::new(SECRET), config()).unwrap();

    let cases: &[(&str, &str, &str, &str)] = &[
        ("edit", "42", "7", "xyz"),
        ("delete", "alice@example.com", "post-1", ""),
        ("", "", "", ""),
        ("publish", "user with spaces", "obj$.", "salt$with.symbols"),
        ("r\u{e9}sum\u{e9}", "\u{4e2d}\u{6587}", "\u{1F600}", "\u{e9}"),
    ];

    for &(action, identity, object_id, salt) in cases {
        let token = manager.create(action, identity, object_id, salt).unwrap();
        assert!(
            manager.validate(token.as_str(), action, identity, object_id, salt),
            "token for {action:?}/{identity:?} should validate"
        );
    }
}

#[test]
fn test_expiry_boundary() {
    let (manager, _clock) = manager_with_clock();

    let expired = manager.create_with_ttl("edit", 42, 7, -1, "xyz").unwrap();
    assert!(!manager.validate(expired.as_str(), "edit", 42, 7, "xyz"));

    let long_lived = manager
        .create_with_ttl("edit", 42, 7, 365 * 24 * 3600, "xyz")
        .unwrap();
    assert!(manager.validate(long_lived.as_str(), "edit", 42, 7, "xyz"));
}

#[test]
fn test_tamper_sensitivity_in_digest_region() {
    let (manager, _clock) = manager_with_clock();
    let token = manager.create("edit", 42, 7, "xyz").unwrap().into_string();

    let digest_len = HmacSha256Digest::new(SECRET).hash("x").unwrap().len();
    let digest_region = PEPPER_LENGTH..PEPPER_LENGTH + digest_len;

    for index in digest_region {
        let mut bytes = token.clone().into_bytes();
        bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();
        assert!(
            !manager.validate(&tampered, "edit", 42, 7, "xyz"),
            "flipping byte {index} should invalidate the token"
        );
    }
}

#[test]
fn test_garbled_time_field_is_rejected() {
    let (manager, _clock) = manager_with_clock();
    let token = manager.create("edit", 42, 7, "xyz").unwrap().into_string();
    let time_start = token.len() - "xyz".len() - TIME_WIDTH;

    let mut garbled = token.clone();
    garbled.replace_range(time_start..time_start + 1, "9");
    assert!(!manager.validate(&garbled, "edit", 42, 7, "xyz"));

    let mut truncated = token.clone();
    truncated.replace_range(time_start..time_start + TIME_WIDTH, "");
    assert!(!manager.validate(&truncated, "edit", 42, 7, "xyz"));
}

#[test]
fn test_time_field_is_obfuscated_not_authenticated() {
    // The digest covers action, identity and object only. A rewritten time
    // field that still decodes is accepted; single-use and short TTLs bound
    // the exposure.
    let (manager, clock) = manager_with_clock();
    let token = manager.create("edit", 42, 7, "xyz").unwrap().into_string();
    let time_start = token.len() - "xyz".len() - TIME_WIDTH;

    let mut extended = token.clone();
    extended.replace_range(time_start..time_start + TIME_WIDTH, "aaaaaaaa.aaa");

    clock.store(5000, Ordering::SeqCst);
    assert!(!manager.validate(&token, "edit", 42, 7, "xyz"));
    assert!(manager.validate(&extended, "edit", 42, 7, "xyz"));
}

#[tokio::test]
async fn test_single_use_survives_time_field_rewrites() {
    let (manager, _clock) = manager_with_clock();
    let manager = Arc::new(manager);
    let guard = SingleUseGuard::new(Arc::clone(&manager));

    let token = manager.create("edit", 42, 7, "xyz").unwrap().into_string();
    assert!(guard.consume(&token, "edit", 42, 7, "xyz").await.unwrap());
    assert!(!guard.consume(&token, "edit", 42, 7, "xyz").await.unwrap());

    let time_start = token.len() - "xyz".len() - TIME_WIDTH;
    let last = time_start + TIME_WIDTH - 1;
    let mut replays_accepted = 0;
    for symbol in ["b", "c", "d", "$", "f"] {
        let mut rewritten = token.clone();
        rewritten.replace_range(last..last + 1, symbol);
        assert_ne!(rewritten, token);
        if guard.consume(&rewritten, "edit", 42, 7, "xyz").await.unwrap() {
            replays_accepted += 1;
        }
    }
    assert_eq!(replays_accepted, 0);
}

#[test]
fn test_identity_binding() {
    let (manager, _clock) = manager_with_clock();
    let token = manager.create("edit", "alice", 7, "xyz").unwrap();

    assert!(manager.validate(token.as_str(), "edit", "alice", 7, "xyz"));
    assert!(!manager.validate(token.as_str(), "edit", "bob", 7, "xyz"));
}

#[test]
fn test_salt_mismatch() {
    let (manager, _clock) = manager_with_clock();
    let token = manager.create("edit", 42, 7, "form-a").unwrap();

    assert!(!manager.validate(token.as_str(), "edit", 42, 7, "form-b"));
    assert!(!manager.validate(token.as_str(), "edit", 42, 7, ""));
}

#[test]
fn test_concrete_scenario() {
    let (manager, clock) = manager_with_clock();

    let token = manager.create_with_ttl("edit", 42, 7, 3600, "xyz").unwrap();
    assert!(token.as_str().ends_with("xyz"));

    let stripped = spice::unspice(token.as_str(), "42", "xyz", PEPPER_LENGTH);
    let time_field = &stripped[stripped.len() - TIME_WIDTH..];
    assert_eq!(codec::decode_timestamp(time_field).unwrap(), 4600);

    assert!(manager.validate(token.as_str(), "edit", 42, 7, "xyz"));

    clock.store(5000, Ordering::SeqCst);
    assert!(!manager.validate(token.as_str(), "edit", 42, 7, "xyz"));
}

#[test]
fn test_different_secrets_do_not_cross_validate() {
    let issuer = NonceManager::new(HmacSha256Digest::new(b"one"), config()).unwrap();
    let other = NonceManager::new(HmacSha256Digest::new(b"two"), config()).unwrap();

    let token = issuer.create("edit", 42, 7, "xyz").unwrap();
    assert!(issuer.validate(token.as_str(), "edit", 42, 7, "xyz"));
    assert!(!other.validate(token.as_str(), "edit", 42, 7, "xyz"));
}

#[test]
fn test_concurrent_create_and_validate() {
    let manager = Arc::new(NonceManager::new(HmacSha256Digest::new(SECRET), config()).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|thread| {
            let manager = Arc::clone(&manager);
            std::thread::spawn(move || {
                for i in 0..100 {
                    let token = manager.create("edit", thread, i, "salt").unwrap();
                    assert!(manager.validate(token.as_str(), "edit", thread, i, "salt"));
                    assert!(!manager.validate(token.as_str(), "edit", thread, i + 1, "salt"));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[cfg(feature = "algo-argon2")]
#[test]
fn test_argon2_tokens() {
    use action_nonce::digest::argon2id::Argon2Digest;

    let params = argon2::Params::new(1024, 1, 1, None).unwrap();
    let manager = NonceManager::new(Argon2Digest::with_params(SECRET, params), config()).unwrap();

    let first = manager.create("edit", 42, 7, "xyz").unwrap();
    let second = manager.create("edit", 42, 7, "xyz").unwrap();
    assert_ne!(first, second);

    assert!(manager.validate(first.as_str(), "edit", 42, 7, "xyz"));
    assert!(manager.validate(second.as_str(), "edit", 42, 7, "xyz"));
    assert!(!manager.validate(first.as_str(), "edit", 43, 7, "xyz"));
    assert!(!manager.validate(first.as_str(), "view", 42, 7, "xyz"));
}
