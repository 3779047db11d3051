// ares-core/tests/hashing.rs
// ============================================================================
// Module: Content Identity Tests
// Description: Tests for canonical digests, labels, and self-verification.
// ============================================================================
//! ## Overview
//! Validates that digests are stable over canonical JSON, that persisted
//! algorithm labels round-trip, and that digests re-verify reread bytes.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use ares_core::DEFAULT_HASH_ALGORITHM;
use ares_core::HashAlgorithm;
use ares_core::hashing::canonical_json_bytes;
use serde_json::json;

/// Verifies key order never changes a canonical digest.
#[test]
fn canonical_digest_ignores_key_order() {
    let first = DEFAULT_HASH_ALGORITHM
        .digest_canonical(&json!({"kind": "code", "lang": "rust"}))
        .unwrap();
    let second = DEFAULT_HASH_ALGORITHM
        .digest_canonical(&json!({"lang": "rust", "kind": "code"}))
        .unwrap();
    assert_eq!(first, second);
}

/// Verifies byte digests are lowercase hex of the expected width.
#[test]
fn byte_digest_is_lowercase_hex() {
    let digest = DEFAULT_HASH_ALGORITHM.digest_bytes(b"proof of work");
    assert_eq!(digest.value.len(), 64);
    assert!(digest.value.chars().all(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_uppercase()));
}

/// Verifies digests re-verify the bytes they were computed over.
#[test]
fn digest_verifies_its_own_bytes() {
    let bytes = canonical_json_bytes(&json!({"status": "passed"})).unwrap();
    let digest = DEFAULT_HASH_ALGORITHM.digest_bytes(&bytes);
    assert!(digest.verify_bytes(&bytes));
    assert!(!digest.verify_bytes(b"tampered row"));
}

/// Verifies algorithm labels round-trip through persistence form.
#[test]
fn algorithm_labels_round_trip() {
    let label = HashAlgorithm::Sha256.label();
    assert_eq!(label, "sha256");
    assert_eq!(HashAlgorithm::from_label(label), Some(HashAlgorithm::Sha256));
    assert_eq!(HashAlgorithm::from_label("md5"), None);
}

/// Verifies structured and raw encodings of the same text differ.
#[test]
fn json_and_byte_payloads_digest_differently() {
    let as_json = DEFAULT_HASH_ALGORITHM.digest_canonical(&json!("report")).unwrap();
    let as_bytes = DEFAULT_HASH_ALGORITHM.digest_bytes(b"report");
    assert_ne!(as_json, as_bytes);
}
