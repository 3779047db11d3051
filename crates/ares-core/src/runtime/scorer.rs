// ares-core/src/runtime/scorer.rs
// ============================================================================
// Module: ARES Reliability Scorer
// Description: EWMA scoring and tier classification per verdict.
// Purpose: Update per-agent reliability state as verdicts arrive.
// Dependencies: crate::core, crate::runtime::config
// ============================================================================

//! ## Overview
//! The scorer folds each verdict into the agent's reliability state: an EWMA
//! update, a push into the recent ring, and a consecutive-failure update,
//! then recomputes the tier. Tier computation is a pure function of the
//! state and the configured bounds; Quarantine is sticky and demands a run of
//! trailing successes before release. Callers hold the per-agent lock.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::RecentOutcome;
use crate::core::ReliabilityState;
use crate::core::ReliabilityTier;
use crate::core::Timestamp;
use crate::core::VerdictOutcome;
use crate::runtime::config::ScoringConfig;
use crate::runtime::config::TierBounds;

// ============================================================================
// SECTION: Tier Transitions
// ============================================================================

/// A tier change produced by one verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierTransition {
    /// Tier before the verdict.
    pub from: ReliabilityTier,
    /// Tier after the verdict.
    pub to: ReliabilityTier,
}

// ============================================================================
// SECTION: Scoring
// ============================================================================

/// Applies one verdict to the reliability state.
///
/// Returns the tier transition when the verdict moved the agent between
/// tiers; the caller emits status events only on actual transitions.
pub fn apply_verdict(
    state: &mut ReliabilityState,
    outcome: VerdictOutcome,
    at: Timestamp,
    config: &ScoringConfig,
) -> Option<TierTransition> {
    let signal = if outcome.is_pass() { 1.0 } else { 0.0 };
    state.score = config
        .ewma_alpha
        .mul_add(signal, (1.0 - config.ewma_alpha) * state.score)
        .clamp(0.0, 1.0);

    state.push_recent(RecentOutcome {
        outcome,
        at,
    });

    if outcome.is_pass() {
        state.consecutive_failures = 0;
    } else {
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
    }

    let from = state.tier;
    let to = next_tier(state, &config.tiers);
    if from == to {
        return None;
    }
    state.tier = to;
    Some(TierTransition {
        from,
        to,
    })
}

// ============================================================================
// SECTION: Tier Computation
// ============================================================================

/// Computes the tier implied by the current reliability state.
///
/// Quarantine holds until the exit score is reached with enough trailing
/// successes; every other tier follows the score and failure boundaries
/// directly.
#[must_use]
pub fn next_tier(state: &ReliabilityState, bounds: &TierBounds) -> ReliabilityTier {
    if state.tier == ReliabilityTier::Quarantine {
        let trailing = u64::try_from(state.trailing_successes()).unwrap_or(u64::MAX);
        let released = state.score >= bounds.quarantine_exit_score
            && state.consecutive_failures == 0
            && trailing >= u64::from(bounds.quarantine_exit_successes);
        if !released {
            return ReliabilityTier::Quarantine;
        }
    }
    base_tier(state.score, state.consecutive_failures, bounds)
}

/// Computes the tier from score and consecutive failures alone.
fn base_tier(score: f64, consecutive_failures: u32, bounds: &TierBounds) -> ReliabilityTier {
    if score < bounds.probation_score || consecutive_failures >= bounds.quarantine_failures {
        ReliabilityTier::Quarantine
    } else if score < bounds.watch_score || consecutive_failures >= bounds.probation_failures {
        ReliabilityTier::Probation
    } else if score < bounds.good_score || consecutive_failures >= bounds.watch_failures {
        ReliabilityTier::Watch
    } else {
        ReliabilityTier::Good
    }
}
