// ares-core/src/runtime/enforcement.rs
// ============================================================================
// Module: ARES Enforcement Engine
// Description: Deterministic mapping from tier transitions to actions.
// Purpose: Issue graded enforcement and keep the status projection current.
// Dependencies: crate::core, crate::runtime::{config, scorer}
// ============================================================================

//! ## Overview
//! The enforcement engine is a deterministic table: entering Watch warns,
//! entering Probation throttles for an hour, entering Quarantine suspends for
//! a day, returning to Good issues a clearing warning, and a repeat failure
//! while staying in Probation escalates. Time-bounded actions coalesce while
//! an identical action is still in force so tier flapping cannot storm the
//! log. The agent's status is a projection of the action history and is
//! recomputed in the same save as every append.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AgentRecord;
use crate::core::AgentStatus;
use crate::core::EnforcementAction;
use crate::core::EnforcementKind;
use crate::core::ReliabilityTier;
use crate::core::Timestamp;
use crate::core::VerdictOutcome;
use crate::runtime::config::EnforcementConfig;
use crate::runtime::scorer::TierTransition;

// ============================================================================
// SECTION: Reason Tags
// ============================================================================

/// Reason tag issued when an agent returns to Good.
pub const REASON_CLEARED: &str = "cleared";

/// Reason tag for a repeat failure while staying in Probation.
pub const REASON_PROBATION_REPEAT: &str = "probation_repeat_failure";

/// Returns the reason tag for entering a tier.
const fn tier_reason(tier: ReliabilityTier) -> &'static str {
    match tier {
        ReliabilityTier::Good => REASON_CLEARED,
        ReliabilityTier::Watch => "tier:watch",
        ReliabilityTier::Probation => "tier:probation",
        ReliabilityTier::Quarantine => "tier:quarantine",
    }
}

// ============================================================================
// SECTION: Action Planning
// ============================================================================

/// Plans the enforcement actions implied by one verdict's tier movement.
///
/// `transition` is `None` when the agent stayed in its tier; a repeat failure
/// while staying in Probation still escalates.
#[must_use]
pub fn plan_actions(
    transition: Option<TierTransition>,
    tier: ReliabilityTier,
    outcome: VerdictOutcome,
    config: &EnforcementConfig,
    now: Timestamp,
) -> Vec<PlannedAction> {
    match transition {
        Some(change) => vec![action_for_entry(change.to, config, now)],
        None => {
            if tier == ReliabilityTier::Probation && !outcome.is_pass() {
                vec![PlannedAction {
                    kind: EnforcementKind::Escalate,
                    reason: REASON_PROBATION_REPEAT.to_string(),
                    expires_at: None,
                }]
            } else {
                Vec::new()
            }
        }
    }
}

/// One planned enforcement action awaiting coalescing and append.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedAction {
    /// Action kind and parameters.
    pub kind: EnforcementKind,
    /// Stable reason tag.
    pub reason: String,
    /// Expiry for time-bounded actions.
    pub expires_at: Option<Timestamp>,
}

/// Builds the action issued on entering a tier.
fn action_for_entry(
    tier: ReliabilityTier,
    config: &EnforcementConfig,
    now: Timestamp,
) -> PlannedAction {
    let kind = match tier {
        ReliabilityTier::Good | ReliabilityTier::Watch => EnforcementKind::Warn,
        ReliabilityTier::Probation => EnforcementKind::Throttle {
            rate: config.throttle_rate,
        },
        ReliabilityTier::Quarantine => EnforcementKind::Suspend {
            duration_ms: config.suspend_duration_ms,
        },
    };
    let expires_at = match tier {
        ReliabilityTier::Good | ReliabilityTier::Watch => None,
        ReliabilityTier::Probation => Some(now.plus_millis(config.throttle_duration_ms)),
        ReliabilityTier::Quarantine => Some(now.plus_millis(config.suspend_duration_ms)),
    };
    PlannedAction {
        kind,
        reason: tier_reason(tier).to_string(),
        expires_at,
    }
}

// ============================================================================
// SECTION: Action Application
// ============================================================================

/// Appends planned actions to the agent record and refreshes the status
/// projection.
///
/// Time-bounded actions coalesce: a planned throttle or suspension is skipped
/// while an identical-kind, same-reason action is still in force. Returns the
/// actions actually appended.
pub fn apply_actions(
    record: &mut AgentRecord,
    planned: Vec<PlannedAction>,
    now: Timestamp,
) -> Vec<EnforcementAction> {
    let mut appended = Vec::new();
    for plan in planned {
        if coalesces(record, &plan, now) {
            continue;
        }
        let action = EnforcementAction {
            agent_id: record.agent.id.clone(),
            kind: plan.kind,
            reason: plan.reason,
            issued_at: now,
            expires_at: plan.expires_at,
        };
        record.actions.push(action.clone());
        appended.push(action);
    }
    if !appended.is_empty() {
        refresh_status(record, now);
    }
    appended
}

/// Returns true when a planned action duplicates one still in force.
fn coalesces(record: &AgentRecord, plan: &PlannedAction, now: Timestamp) -> bool {
    if plan.expires_at.is_none() {
        return false;
    }
    record.actions.iter().any(|action| {
        action.kind.label() == plan.kind.label()
            && action.reason == plan.reason
            && action.in_force(now)
            && action.expires_at.is_some()
    })
}

// ============================================================================
// SECTION: Status Projection
// ============================================================================

/// Recomputes the agent's projected status from the action history.
///
/// Retired agents keep their status; otherwise the newest decisive action
/// wins: a clearing warning projects Active, an in-force suspension projects
/// Suspended, and an in-force throttle projects Throttled.
pub fn refresh_status(record: &mut AgentRecord, now: Timestamp) {
    if record.agent.status == AgentStatus::Retired {
        return;
    }
    record.agent.status = project_status(&record.actions, now);
}

/// Projects the operational status from the enforcement history.
#[must_use]
pub fn project_status(actions: &[EnforcementAction], now: Timestamp) -> AgentStatus {
    for action in actions.iter().rev() {
        match &action.kind {
            EnforcementKind::Warn if action.reason == REASON_CLEARED => {
                return AgentStatus::Active;
            }
            EnforcementKind::Suspend {
                ..
            } if action.in_force(now) => {
                return AgentStatus::Suspended;
            }
            EnforcementKind::Throttle {
                ..
            } if action.in_force(now) => {
                return AgentStatus::Throttled;
            }
            _ => {}
        }
    }
    AgentStatus::Active
}
