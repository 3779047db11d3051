// ares-core/src/core/evidence.rs
// ============================================================================
// Module: ARES Evidence Model
// Description: Artifacts and tool-call records submitted as proof of work.
// Purpose: Provide append-only, hash-addressed evidence types for tasks.
// Dependencies: serde, serde_json, crate::core::hashing
// ============================================================================

//! ## Overview
//! Evidence is everything an agent submits while executing a task: artifacts
//! (code blobs, reports, logs) and tool-call records. Both are append-only and
//! immutable once recorded. Artifact hashes are computed by the core on append
//! so duplicate detection is uniform across payload encodings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::hashing::HashAlgorithm;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::identifiers::ArtifactId;
use crate::core::identifiers::TaskId;
use crate::core::identifiers::ToolCallId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Artifacts
// ============================================================================

/// Artifact payload encoding.
///
/// # Invariants
/// - Payload bytes and JSON values are opaque to the core except for hashing
///   and predicate evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ArtifactPayload {
    /// Raw bytes payload.
    Bytes(Vec<u8>),
    /// Structured JSON payload.
    Json(Value),
}

impl ArtifactPayload {
    /// Returns true when the payload carries no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Bytes(bytes) => bytes.is_empty(),
            Self::Json(value) => value.is_null(),
        }
    }

    /// Computes the canonical content hash for the payload.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when JSON canonicalization fails.
    pub fn content_hash(&self, algorithm: HashAlgorithm) -> Result<HashDigest, HashError> {
        match self {
            Self::Bytes(bytes) => Ok(algorithm.digest_bytes(bytes)),
            Self::Json(value) => algorithm.digest_canonical(value),
        }
    }
}

/// A piece of evidence attached to a task.
///
/// # Invariants
/// - Append-only per task; never mutated, never deleted while the task is not
///   terminal.
/// - `hash` is the canonical content hash of `payload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Artifact identifier.
    pub id: ArtifactId,
    /// Owning task identifier.
    pub task_id: TaskId,
    /// Artifact kind label (`code`, `test_report`, `retry`, ...).
    pub kind: String,
    /// Artifact payload.
    pub payload: ArtifactPayload,
    /// Canonical content hash of the payload.
    pub hash: HashDigest,
    /// Submission timestamp supplied by the caller.
    pub submitted_at: Timestamp,
}

/// Artifact kind used to count retries in behavior monitoring.
pub const RETRY_ARTIFACT_KIND: &str = "retry";

// ============================================================================
// SECTION: Tool Calls
// ============================================================================

/// Terminal outcome of a recorded tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ToolCallOutcome {
    /// Structured result value returned by the tool.
    Result(Value),
    /// Error string reported by the tool.
    Error(String),
}

impl ToolCallOutcome {
    /// Returns true when the outcome is an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Validation verdict for a single tool call.
///
/// # Invariants
/// - Set exactly once by the tool-call validator's structural pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum CallValidation {
    /// The call passed every structural check.
    Valid,
    /// The call failed a structural check; the reason is a stable tag.
    Invalid(String),
    /// The call has not been validated.
    Unchecked,
}

/// A recorded invocation of an external capability during a task.
///
/// # Invariants
/// - Append-only per task; `validation` transitions away from
///   [`CallValidation::Unchecked`] at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Tool-call identifier.
    pub id: ToolCallId,
    /// Owning task identifier.
    pub task_id: TaskId,
    /// Invoked tool name.
    pub tool_name: String,
    /// Structured arguments reported for the invocation.
    pub arguments: Value,
    /// Terminal outcome reported for the invocation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ToolCallOutcome>,
    /// Invocation start timestamp.
    pub started_at: Timestamp,
    /// Invocation finish timestamp.
    pub finished_at: Timestamp,
    /// Structural validation verdict.
    pub validation: CallValidation,
}
