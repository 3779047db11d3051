// ares-core/src/core/agent.rs
// ============================================================================
// Module: ARES Agent Model
// Description: Registered agents, status projections, and behavior windows.
// Purpose: Provide the per-agent aggregate persisted by agent stores.
// Dependencies: serde, crate::core::{enforcement, reliability}
// ============================================================================

//! ## Overview
//! An agent is an external AI worker observed by ARES. The agent aggregate
//! bundles the agent row, the behavior-monitor window, and the append-only
//! enforcement history so a single load/save is sufficient for every mutation
//! performed under the per-agent lock.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::collections::VecDeque;

use serde::Deserialize;
use serde::Serialize;

use crate::core::enforcement::EnforcementAction;
use crate::core::identifiers::AgentId;
use crate::core::reliability::ReliabilityState;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Number of completed-task samples retained by the behavior monitor.
pub const BEHAVIOR_WINDOW: usize = 100;

// ============================================================================
// SECTION: Agent Status
// ============================================================================

/// Operational status projected from the enforcement history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// The agent may take new tasks.
    #[default]
    Active,
    /// The agent is rate-limited by an in-force throttle.
    Throttled,
    /// The agent is suspended by an in-force suspension.
    Suspended,
    /// The agent has been explicitly retired.
    Retired,
}

impl AgentStatus {
    /// Returns a stable label for the status.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Throttled => "throttled",
            Self::Suspended => "suspended",
            Self::Retired => "retired",
        }
    }
}

// ============================================================================
// SECTION: Agents
// ============================================================================

/// A registered agent observed by ARES.
///
/// # Invariants
/// - `name` is unique across live agents.
/// - `reliability` is mutated only by the scorer; `status` only by the
///   enforcement engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Agent identifier.
    pub id: AgentId,
    /// Unique agent name.
    pub name: String,
    /// Declared capability labels.
    pub capabilities: BTreeSet<String>,
    /// Projected operational status.
    pub status: AgentStatus,
    /// Reliability state owned by the scorer.
    pub reliability: ReliabilityState,
}

// ============================================================================
// SECTION: Behavior Window
// ============================================================================

/// Statistics extracted from one completed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorSample {
    /// Task duration in the task's time unit.
    pub duration_ms: u64,
    /// Number of retry artifacts submitted.
    pub retries: u32,
    /// Number of tool calls that reported an error outcome.
    pub tool_errors: u32,
    /// Total number of recorded tool calls.
    pub tool_calls: u32,
}

impl BehaviorSample {
    /// Returns the tool-error rate for the sample, zero without calls.
    #[must_use]
    pub fn error_rate(&self) -> f64 {
        if self.tool_calls == 0 {
            0.0
        } else {
            f64::from(self.tool_errors) / f64::from(self.tool_calls)
        }
    }
}

/// Sliding window of completed-task samples for one agent.
///
/// # Invariants
/// - Holds at most [`BEHAVIOR_WINDOW`] samples; oldest drop first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BehaviorWindow {
    /// Retained samples, oldest first.
    pub samples: VecDeque<BehaviorSample>,
}

impl BehaviorWindow {
    /// Pushes a sample, dropping the oldest beyond the window size.
    pub fn push(&mut self, sample: BehaviorSample) {
        if self.samples.len() == BEHAVIOR_WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Returns the number of retained samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true when no samples are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// ============================================================================
// SECTION: Agent Aggregate
// ============================================================================

/// Persistence aggregate for one agent.
///
/// # Invariants
/// - Loaded and saved as a unit under the per-agent lock.
/// - `actions` is append-only in issuance order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// The agent row.
    pub agent: Agent,
    /// Behavior-monitor window.
    pub behavior: BehaviorWindow,
    /// Append-only enforcement history, oldest first.
    pub actions: Vec<EnforcementAction>,
}

impl AgentRecord {
    /// Creates the aggregate for a newly registered agent.
    #[must_use]
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            behavior: BehaviorWindow::default(),
            actions: Vec::new(),
        }
    }
}
