// ares-core/src/core/reliability.rs
// ============================================================================
// Module: ARES Reliability Model
// Description: Per-agent reliability state and tier classification.
// Purpose: Track the EWMA score, recent outcomes, and the enforcement tier.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Reliability state is the scorer's view of an agent: an exponentially
//! weighted moving average of verdict outcomes, a bounded ring of recent
//! outcomes, a consecutive-failure counter, and the derived tier. The state is
//! mutated only by the scorer under the per-agent lock; tier computation is a
//! pure function so transitions replay deterministically.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;

use serde::Deserialize;
use serde::Serialize;

use crate::core::time::Timestamp;
use crate::core::verdict::VerdictOutcome;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Number of recent verdict outcomes retained per agent.
pub const RELIABILITY_WINDOW: usize = 50;

// ============================================================================
// SECTION: Tiers
// ============================================================================

/// Coarse reliability bucket driving enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReliabilityTier {
    /// Reliable agent; no enforcement pressure.
    #[default]
    Good,
    /// Early degradation; warnings issued.
    Watch,
    /// Sustained degradation; throttling applies.
    Probation,
    /// Severe degradation; the agent is suspended.
    Quarantine,
}

// ============================================================================
// SECTION: Recent Outcomes
// ============================================================================

/// One verdict outcome retained in the recent ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentOutcome {
    /// Verdict outcome.
    pub outcome: VerdictOutcome,
    /// Verdict production timestamp.
    pub at: Timestamp,
}

// ============================================================================
// SECTION: Reliability State
// ============================================================================

/// Per-agent reliability state mutated only by the scorer.
///
/// # Invariants
/// - `score` lies in `[0, 1]` at all times.
/// - `recent` never exceeds [`RELIABILITY_WINDOW`] entries; oldest drop first.
/// - `consecutive_failures` resets to zero on every passing verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityState {
    /// EWMA of recent verdict outcomes.
    pub score: f64,
    /// Ring of the most recent verdict outcomes, oldest first.
    pub recent: VecDeque<RecentOutcome>,
    /// Count of consecutive failing verdicts.
    pub consecutive_failures: u32,
    /// Current reliability tier.
    pub tier: ReliabilityTier,
}

impl Default for ReliabilityState {
    fn default() -> Self {
        Self {
            score: 1.0,
            recent: VecDeque::new(),
            consecutive_failures: 0,
            tier: ReliabilityTier::Good,
        }
    }
}

impl ReliabilityState {
    /// Creates the initial reliability state for a newly registered agent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts passing outcomes at the tail of the recent ring.
    #[must_use]
    pub fn trailing_successes(&self) -> usize {
        self.recent.iter().rev().take_while(|entry| entry.outcome.is_pass()).count()
    }

    /// Pushes an outcome into the recent ring, dropping the oldest entry.
    pub fn push_recent(&mut self, entry: RecentOutcome) {
        if self.recent.len() == RELIABILITY_WINDOW {
            self.recent.pop_front();
        }
        self.recent.push_back(entry);
    }
}
