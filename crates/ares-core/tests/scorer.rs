// ares-core/tests/scorer.rs
// ============================================================================
// Module: Reliability Scorer Tests
// Description: Tests for EWMA scoring and tier transitions.
// ============================================================================
//! ## Overview
//! Validates the EWMA update, the consecutive-failure counter, the tier
//! table, and Quarantine's sticky exit condition.

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

use ares_core::ReliabilityState;
use ares_core::ReliabilityTier;
use ares_core::Timestamp;
use ares_core::VerdictOutcome;
use ares_core::runtime::ScoringConfig;
use ares_core::runtime::apply_verdict;

/// Applies `count` verdicts of one outcome, returning the final state.
fn apply_many(state: &mut ReliabilityState, outcome: VerdictOutcome, count: u64) {
    let config = ScoringConfig::default();
    for step in 0..count {
        let _ = apply_verdict(state, outcome, Timestamp::Logical(step), &config);
    }
}

/// Verifies a clean agent's first failure lands exactly on 0.9.
#[test]
fn scorer_first_failure_from_clean_agent() {
    let mut state = ReliabilityState::new();
    let config = ScoringConfig::default();
    let transition =
        apply_verdict(&mut state, VerdictOutcome::Fail, Timestamp::Logical(1), &config);
    assert!((state.score - 0.9).abs() < 1e-12);
    assert_eq!(state.consecutive_failures, 1);
    assert_eq!(state.tier, ReliabilityTier::Good);
    assert!(transition.is_none());
}

/// Verifies passes reset the consecutive-failure counter.
#[test]
fn scorer_pass_resets_consecutive_failures() {
    let mut state = ReliabilityState::new();
    apply_many(&mut state, VerdictOutcome::Fail, 2);
    assert_eq!(state.consecutive_failures, 2);
    apply_many(&mut state, VerdictOutcome::Pass, 1);
    assert_eq!(state.consecutive_failures, 0);
}

/// Verifies two consecutive failures force at least Watch.
#[test]
fn scorer_two_failures_enter_watch() {
    let mut state = ReliabilityState::new();
    apply_many(&mut state, VerdictOutcome::Fail, 2);
    assert_eq!(state.tier, ReliabilityTier::Watch);
}

/// Verifies three consecutive failures force at least Probation.
#[test]
fn scorer_three_failures_enter_probation() {
    let mut state = ReliabilityState::new();
    apply_many(&mut state, VerdictOutcome::Fail, 3);
    assert_eq!(state.tier, ReliabilityTier::Probation);
}

/// Verifies the quarantine-escalation scenario's exact numbers.
#[test]
fn scorer_fifth_failure_enters_quarantine() {
    let mut state = ReliabilityState {
        score: 0.55,
        consecutive_failures: 4,
        tier: ReliabilityTier::Probation,
        ..ReliabilityState::new()
    };
    let config = ScoringConfig::default();
    let transition =
        apply_verdict(&mut state, VerdictOutcome::Fail, Timestamp::Logical(9), &config);
    assert!((state.score - 0.495).abs() < 1e-9);
    assert_eq!(state.consecutive_failures, 5);
    assert_eq!(state.tier, ReliabilityTier::Quarantine);
    let transition = transition.unwrap();
    assert_eq!(transition.from, ReliabilityTier::Probation);
    assert_eq!(transition.to, ReliabilityTier::Quarantine);
}

/// Verifies Quarantine holds until enough trailing successes accumulate.
#[test]
fn scorer_quarantine_requires_sustained_recovery() {
    let mut state = ReliabilityState {
        score: 0.4,
        consecutive_failures: 5,
        tier: ReliabilityTier::Quarantine,
        ..ReliabilityState::new()
    };
    // Four passes are not enough even though the score recovers.
    apply_many(&mut state, VerdictOutcome::Pass, 4);
    assert_eq!(state.tier, ReliabilityTier::Quarantine);

    // Enough passes lift the score past the exit bound and release the agent.
    apply_many(&mut state, VerdictOutcome::Pass, 6);
    assert!(state.score >= 0.6);
    assert_ne!(state.tier, ReliabilityTier::Quarantine);
}

/// Verifies the score stays inside the unit interval under long streaks.
#[test]
fn scorer_score_stays_in_unit_interval() {
    let mut state = ReliabilityState::new();
    apply_many(&mut state, VerdictOutcome::Fail, 200);
    assert!(state.score >= 0.0);
    apply_many(&mut state, VerdictOutcome::Pass, 200);
    assert!(state.score <= 1.0);
}

/// Verifies the recent ring never exceeds its window.
#[test]
fn scorer_recent_ring_is_bounded() {
    let mut state = ReliabilityState::new();
    apply_many(&mut state, VerdictOutcome::Pass, 200);
    assert_eq!(state.recent.len(), ares_core::RELIABILITY_WINDOW);
}
