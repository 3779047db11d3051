// ares-core/src/core/enforcement.rs
// ============================================================================
// Module: ARES Enforcement Model
// Description: Graded enforcement actions issued on tier transitions.
// Purpose: Record the append-only enforcement history per agent.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Enforcement actions are the graded responses issued when an agent's
//! reliability tier changes. The action log is append-only; the agent's
//! status field is a projection of the latest non-expired action and is
//! recomputed whenever an action is appended.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AgentId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Action Kinds
// ============================================================================

/// Graded enforcement response.
///
/// # Invariants
/// - `Throttle` carries a dimensionless rate multiplier against a baseline
///   owned by the transport.
/// - `Suspend` carries a duration in the deployment's time unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnforcementKind {
    /// Advisory warning delivered to observers.
    Warn,
    /// Rate reduction applied to the agent's task intake.
    Throttle {
        /// Multiplier applied to the externally provided baseline rate.
        rate: f64,
    },
    /// Temporary suspension of the agent.
    Suspend {
        /// Suspension length in milliseconds.
        duration_ms: u64,
    },
    /// Escalation to external operators via the event fabric.
    Escalate,
}

impl EnforcementKind {
    /// Returns a stable label for the action kind.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Throttle {
                ..
            } => "throttle",
            Self::Suspend {
                ..
            } => "suspend",
            Self::Escalate => "escalate",
        }
    }
}

// ============================================================================
// SECTION: Actions
// ============================================================================

/// One issued enforcement action.
///
/// # Invariants
/// - Append-only; never mutated after issuance.
/// - `expires_at` is set only for `Throttle` and `Suspend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnforcementAction {
    /// Targeted agent identifier.
    pub agent_id: AgentId,
    /// Action kind and parameters.
    pub kind: EnforcementKind,
    /// Stable reason tag for the action.
    pub reason: String,
    /// Issuance timestamp.
    pub issued_at: Timestamp,
    /// Expiry timestamp for time-bounded actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
}

impl EnforcementAction {
    /// Returns true when the action is still in force at `now`.
    #[must_use]
    pub fn in_force(&self, now: Timestamp) -> bool {
        self.expires_at.is_none_or(|expiry| now.is_before(expiry))
    }
}
