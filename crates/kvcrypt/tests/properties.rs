//! Behavioural properties of the public encrypt/decrypt API.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use kvcrypt::crypto::{cipher, derive_key, generate_salt, MIN_ENVELOPE_LEN};
use kvcrypt::{decrypt, encrypt, CryptoError, Envelope};

fn plaintexts() -> Vec<String> {
    vec![
        String::new(),
        "a".into(),
        "hello world".into(),
        "Grüße, 世界! 🔐🗝️".into(),
        "line one\nline two\r\n\ttabbed\0nul".into(),
        "x".repeat(64 * 1024),
    ]
}

#[test]
fn round_trip_for_varied_plaintexts_and_secrets() {
    for secret in ["s", "mySecret123", "pass phrase with spaces", "🔑"] {
        for plaintext in plaintexts() {
            let encoded = encrypt(&plaintext, secret).unwrap();
            assert_eq!(decrypt(&encoded, secret).unwrap(), plaintext);
        }
    }
}

#[test]
fn empty_plaintext_scenario() {
    let encoded = encrypt("", "s").unwrap();
    assert_eq!(decrypt(&encoded, "s").unwrap(), "");
}

#[test]
fn hello_world_scenario() {
    let encoded = encrypt("hello world", "mySecret123").unwrap();
    let body = encoded.strip_prefix("AES256:").expect("AES256: prefix");
    assert!(STANDARD.decode(body).is_ok(), "body must be base64: {body}");

    assert_eq!(decrypt(&encoded, "mySecret123").unwrap(), "hello world");
    assert_eq!(
        decrypt(&encoded, "wrongSecret").unwrap_err(),
        CryptoError::Integrity
    );
}

#[test]
fn same_input_encrypts_differently() {
    let a = encrypt("same plaintext", "same secret").unwrap();
    let b = encrypt("same plaintext", "same secret").unwrap();
    assert_ne!(a, b);
    assert_eq!(decrypt(&a, "same secret").unwrap(), "same plaintext");
    assert_eq!(decrypt(&b, "same secret").unwrap(), "same plaintext");
}

#[test]
fn wrong_secret_always_fails() {
    let pairs = [
        ("secret", "Secret"),
        ("secret", "secret "),
        ("a", "b"),
        ("long secret value", "long secret valuf"),
    ];
    for (right, wrong) in pairs {
        let encoded = encrypt("payload", right).unwrap();
        assert_eq!(decrypt(&encoded, wrong).unwrap_err(), CryptoError::Integrity);
    }
}

#[test]
fn flipping_any_envelope_byte_fails_integrity() {
    let encoded = encrypt("k", "tamper-secret").unwrap();
    let packed = STANDARD.decode(&encoded["AES256:".len()..]).unwrap();

    // One bit per byte, rotating through bit positions, covers salt, nonce,
    // ciphertext and tag.
    for i in 0..packed.len() {
        let mut tampered = packed.clone();
        tampered[i] ^= 1 << (i % 8);
        let forged = format!("AES256:{}", STANDARD.encode(&tampered));
        assert_eq!(
            decrypt(&forged, "tamper-secret").unwrap_err(),
            CryptoError::Integrity,
            "byte {i} flip was not detected"
        );
    }
}

#[test]
fn unknown_prefix_is_format_error() {
    let err = decrypt("not-a-valid-prefix...", "s").unwrap_err();
    assert!(matches!(err, CryptoError::Format(_)));

    let encoded = encrypt("v", "s").unwrap();
    let relabelled = encoded.replacen("AES256:", "AES128:", 1);
    assert!(matches!(decrypt(&relabelled, "s"), Err(CryptoError::Format(_))));
}

#[test]
fn plaintext_that_was_never_encrypted_is_format_error() {
    assert!(matches!(decrypt("hello world", "s"), Err(CryptoError::Format(_))));
    assert!(matches!(decrypt("", "s"), Err(CryptoError::Format(_))));
}

#[test]
fn truncated_envelope_is_format_error() {
    let short = STANDARD.encode(vec![0u8; MIN_ENVELOPE_LEN - 1]);
    let err = decrypt(&format!("AES256:{short}"), "s").unwrap_err();
    assert!(matches!(err, CryptoError::Format(_)));
}

#[test]
fn empty_secret_is_rejected() {
    assert_eq!(encrypt("v", "").unwrap_err(), CryptoError::EmptySecret);
    let encoded = encrypt("v", "s").unwrap();
    assert_eq!(decrypt(&encoded, "").unwrap_err(), CryptoError::EmptySecret);
}

#[test]
fn authenticated_non_utf8_is_encoding_error() {
    let salt = generate_salt();
    let key = derive_key("s", &salt).unwrap();
    let envelope = cipher::seal(&[0xC3, 0x28], &key, salt).unwrap();
    drop(key);

    assert_eq!(
        decrypt(&envelope.encode(), "s").unwrap_err(),
        CryptoError::Encoding
    );
}

#[test]
fn errors_never_mention_the_secret() {
    let secret = "do-not-leak-me";
    let encoded = encrypt("v", "other").unwrap();
    let inputs = [encoded.as_str(), "garbage", "AES256:***"];
    for input in inputs {
        let err = decrypt(input, secret).unwrap_err();
        assert!(!err.to_string().contains(secret));
        assert!(!format!("{err:?}").contains(secret));
    }
}

#[test]
fn decoded_envelope_re_encodes_identically() {
    let encoded = encrypt("stable", "s").unwrap();
    let envelope = Envelope::decode(&encoded).unwrap();
    assert_eq!(envelope.encode(), encoded);
}

#[test]
fn concurrent_calls_are_independent() {
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                scope.spawn(move || {
                    let plaintext = format!("value-{i}");
                    let secret = format!("secret-{i}");
                    let encoded = encrypt(&plaintext, &secret).unwrap();
                    assert_eq!(decrypt(&encoded, &secret).unwrap(), plaintext);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    });
}
