// ares-core/src/core/verdict.rs
// ============================================================================
// Module: ARES Verdict Model
// Description: Immutable verification outcomes with component sub-scores.
// Purpose: Record the single terminal judgement produced for each task.
// Dependencies: serde, crate::core::hashing
// ============================================================================

//! ## Overview
//! A verdict is the single immutable outcome of verification for a task. It
//! carries the four component sub-scores, the weighted overall score, and an
//! ordered list of stable reason tags. Verdicts are deterministic functions of
//! their inputs; equal evidence yields bit-for-bit equal verdicts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashAlgorithm;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::identifiers::TaskId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Terminal verification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictOutcome {
    /// The task satisfied its acceptance criteria.
    Pass,
    /// The task failed verification.
    Fail,
}

impl VerdictOutcome {
    /// Returns true for a passing outcome.
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

// ============================================================================
// SECTION: Sub-Scores
// ============================================================================

/// Component sub-scores produced by the four validators.
///
/// # Invariants
/// - Every score lies in `[0, 1]` and is rounded to four decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    /// Completion verifier score.
    pub completion: f64,
    /// Tool-call validator score.
    pub tool_usage: f64,
    /// Proof-of-work collector score.
    pub evidence: f64,
    /// Behavior monitor score.
    pub behavior: f64,
}

impl SubScores {
    /// Returns sub-scores of zero for timed-out or aborted verifications.
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            completion: 0.0,
            tool_usage: 0.0,
            evidence: 0.0,
            behavior: 0.0,
        }
    }
}

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// The single immutable outcome of verification for a task.
///
/// # Invariants
/// - Exactly one verdict exists per task in a terminal verified/failed state.
/// - `reasons` order is completion, tool usage, evidence, behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Judged task identifier.
    pub task_id: TaskId,
    /// Terminal outcome.
    pub outcome: VerdictOutcome,
    /// Component sub-scores.
    pub sub_scores: SubScores,
    /// Weighted overall score in `[0, 1]`.
    pub overall: f64,
    /// Ordered stable reason tags.
    pub reasons: Vec<String>,
    /// Production timestamp supplied by the caller.
    pub produced_at: Timestamp,
}

impl Verdict {
    /// Computes the canonical hash of the verdict for audit parity checks.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when canonicalization fails.
    pub fn canonical_hash(&self, algorithm: HashAlgorithm) -> Result<HashDigest, HashError> {
        algorithm.digest_canonical(self)
    }
}
