// ares-core/src/core/hashing.rs
// ============================================================================
// Module: ARES Content Identity
// Description: Canonical digests for artifacts, verdicts, and stored rows.
// Purpose: Give evidence one identity rule shared by dedup, audit, and stores.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Everything ARES needs to recognize "the same content" goes through this
//! module: artifact duplicate detection in the proof collector, verdict and
//! criteria audit hashes, and the integrity check durable stores run on
//! every load. Structured payloads are digested over their RFC 8785 (JCS)
//! canonical JSON form so recomputation is stable across runs; binary
//! payloads are digested as raw bytes. Digests persist with a stable
//! algorithm label and can re-verify themselves against reread bytes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Hash Algorithm
// ============================================================================

/// Supported digest algorithms for ARES content identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256 hashing (FIPS-friendly default).
    Sha256,
}

/// Default hash algorithm for ARES.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

impl HashAlgorithm {
    /// Returns the stable label persisted alongside digests.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }

    /// Parses a persisted algorithm label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "sha256" => Some(Self::Sha256),
            _ => None,
        }
    }

    /// Digests raw bytes.
    #[must_use]
    pub fn digest_bytes(self, bytes: &[u8]) -> HashDigest {
        let value = match self {
            Self::Sha256 => {
                Sha256::digest(bytes).iter().map(|byte| format!("{byte:02x}")).collect()
            }
        };
        HashDigest {
            algorithm: self,
            value,
        }
    }

    /// Digests the RFC 8785 canonical JSON form of a value.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Canonicalization`] when serialization fails.
    pub fn digest_canonical<T: Serialize + ?Sized>(
        self,
        value: &T,
    ) -> Result<HashDigest, HashError> {
        Ok(self.digest_bytes(&canonical_json_bytes(value)?))
    }
}

// ============================================================================
// SECTION: Hash Digest
// ============================================================================

/// Deterministic content identity: an algorithm plus its hex-encoded digest.
///
/// # Invariants
/// - `value` is lowercase hex; equal values under the same algorithm mean
///   equal content for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashDigest {
    /// Hash algorithm identifier.
    pub algorithm: HashAlgorithm,
    /// Lowercase hex-encoded digest bytes.
    pub value: String,
}

impl HashDigest {
    /// Returns true when recomputing over `bytes` reproduces this digest.
    ///
    /// Stores call this on load so tampered or corrupted rows fail closed.
    #[must_use]
    pub fn verify_bytes(&self, bytes: &[u8]) -> bool {
        self.algorithm.digest_bytes(bytes).value == self.value
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when computing canonical digests.
#[derive(Debug, Error)]
pub enum HashError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Canonical JSON
// ============================================================================

/// Returns canonical JSON bytes for a serializable value using RFC 8785.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}
