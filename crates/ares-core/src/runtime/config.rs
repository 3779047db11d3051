// ares-core/src/runtime/config.rs
// ============================================================================
// Module: ARES Runtime Configuration
// Description: Immutable scoring, enforcement, and deadline constants.
// Purpose: Fix verification semantics at startup; no runtime mutation.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every tunable the verification pipeline depends on lives here: aggregation
//! weights, pass thresholds, the scorer's smoothing factor, tier boundaries,
//! operational deadlines, and the transient-I/O retry policy. Values are set
//! once at startup (defaults mirror the product constants) and never change
//! while the core is running, so verdicts stay deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Verification
// ============================================================================

/// Aggregation weights applied to the four component sub-scores.
///
/// # Invariants
/// - Weights are non-negative and sum to 1.0 after config validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight of the completion sub-score.
    pub completion: f64,
    /// Weight of the tool-usage sub-score.
    pub tool_usage: f64,
    /// Weight of the evidence sub-score.
    pub evidence: f64,
    /// Weight of the behavior sub-score.
    pub behavior: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            completion: 0.4,
            tool_usage: 0.3,
            evidence: 0.2,
            behavior: 0.1,
        }
    }
}

/// Verification coordinator settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Aggregation weights for the overall score.
    pub weights: ScoreWeights,
    /// Minimum overall score required to pass.
    pub pass_threshold: f64,
    /// Minimum completion sub-score required to pass.
    pub completion_gate: f64,
    /// Soft verification deadline in milliseconds of elapsed wall time.
    pub deadline_ms: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            pass_threshold: 0.75,
            completion_gate: 0.8,
            deadline_ms: 30_000,
        }
    }
}

// ============================================================================
// SECTION: Scoring
// ============================================================================

/// Reliability tier boundaries.
///
/// # Invariants
/// - Score boundaries are ordered `probation_score < watch_score < good_score`.
/// - Failure boundaries are ordered `watch <= probation <= quarantine`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierBounds {
    /// Minimum score for the Good tier.
    pub good_score: f64,
    /// Minimum score for the Watch tier.
    pub watch_score: f64,
    /// Minimum score for the Probation tier.
    pub probation_score: f64,
    /// Consecutive failures that force at least Watch.
    pub watch_failures: u32,
    /// Consecutive failures that force at least Probation.
    pub probation_failures: u32,
    /// Consecutive failures that force Quarantine.
    pub quarantine_failures: u32,
    /// Minimum score to leave Quarantine.
    pub quarantine_exit_score: f64,
    /// Trailing consecutive successes required to leave Quarantine.
    pub quarantine_exit_successes: u32,
}

impl Default for TierBounds {
    fn default() -> Self {
        Self {
            good_score: 0.9,
            watch_score: 0.75,
            probation_score: 0.5,
            watch_failures: 2,
            probation_failures: 3,
            quarantine_failures: 5,
            quarantine_exit_score: 0.6,
            quarantine_exit_successes: 5,
        }
    }
}

/// Reliability scorer settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// EWMA smoothing factor applied per verdict.
    pub ewma_alpha: f64,
    /// Tier boundaries.
    pub tiers: TierBounds,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            ewma_alpha: 0.1,
            tiers: TierBounds::default(),
        }
    }
}

// ============================================================================
// SECTION: Enforcement
// ============================================================================

/// Enforcement engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnforcementConfig {
    /// Throttle rate multiplier against the transport-owned baseline.
    pub throttle_rate: f64,
    /// Throttle lifetime in milliseconds.
    pub throttle_duration_ms: u64,
    /// Suspension lifetime in milliseconds.
    pub suspend_duration_ms: u64,
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            throttle_rate: 0.5,
            throttle_duration_ms: 3_600_000,
            suspend_duration_ms: 86_400_000,
        }
    }
}

// ============================================================================
// SECTION: Rollback and Retry
// ============================================================================

/// Rollback coordinator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackConfig {
    /// Restore handler deadline in milliseconds of elapsed wall time.
    pub restore_deadline_ms: u64,
}

impl Default for RollbackConfig {
    fn default() -> Self {
        Self {
            restore_deadline_ms: 60_000,
        }
    }
}

/// Bounded retry policy for transient store I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub attempts: u32,
    /// Backoff between attempts in milliseconds, doubled per retry.
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff_ms: 50,
        }
    }
}

// ============================================================================
// SECTION: Core Configuration
// ============================================================================

/// Immutable configuration for the ARES core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CoreConfig {
    /// Verification coordinator settings.
    #[serde(default)]
    pub verification: VerificationConfig,
    /// Reliability scorer settings.
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Enforcement engine settings.
    #[serde(default)]
    pub enforcement: EnforcementConfig,
    /// Rollback coordinator settings.
    #[serde(default)]
    pub rollback: RollbackConfig,
    /// Transient-I/O retry policy.
    #[serde(default)]
    pub retry: RetryConfig,
}
