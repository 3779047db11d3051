// ares-core/src/core/task.rs
// ============================================================================
// Module: ARES Task Model
// Description: Tasks, the task state machine, and the task aggregate.
// Purpose: Provide the per-task persistence unit and legal state transitions.
// Dependencies: serde, crate::core::{criteria, evidence, snapshot, verdict}
// ============================================================================

//! ## Overview
//! A task is one unit of work submitted for verification, owned by a single
//! agent. The task aggregate bundles the task row with its append-only
//! evidence, its optional snapshot, and its verdict so a single load/save is
//! sufficient for every mutation performed under the per-task lock. State
//! transitions are centralized here; terminal tasks never change again.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::criteria::AcceptanceCriteria;
use crate::core::evidence::Artifact;
use crate::core::evidence::ToolCallRecord;
use crate::core::identifiers::AgentId;
use crate::core::identifiers::TaskId;
use crate::core::snapshot::RestoreRecord;
use crate::core::snapshot::Snapshot;
use crate::core::time::Timestamp;
use crate::core::verdict::Verdict;

// ============================================================================
// SECTION: Task State
// ============================================================================

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Created but not yet active.
    Pending,
    /// The agent is working and may submit evidence.
    InProgress,
    /// Completion was reported; verification is due.
    AwaitingVerification,
    /// Verification passed (terminal).
    Verified,
    /// Verification failed; rollback is due.
    Failed,
    /// Rollback has been driven (terminal).
    RolledBack,
}

impl TaskState {
    /// Returns true for terminal states.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified | Self::RolledBack)
    }

    /// Returns true when the transition from `self` to `next` is legal.
    #[must_use]
    pub const fn can_transition(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress | Self::RolledBack)
                | (Self::InProgress, Self::AwaitingVerification | Self::RolledBack)
                | (
                    Self::AwaitingVerification,
                    Self::Verified | Self::Failed | Self::RolledBack
                )
                | (Self::Failed, Self::RolledBack)
        )
    }

    /// Returns a stable label for the state.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::AwaitingVerification => "awaiting_verification",
            Self::Verified => "verified",
            Self::Failed => "failed",
            Self::RolledBack => "rolled_back",
        }
    }
}

// ============================================================================
// SECTION: Tasks
// ============================================================================

/// One unit of work submitted for verification.
///
/// # Invariants
/// - `criteria` is immutable after creation.
/// - `state` changes only through [`TaskState::can_transition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier.
    pub id: TaskId,
    /// Owning agent identifier.
    pub agent_id: AgentId,
    /// Human-readable description of the work.
    pub description: String,
    /// Acceptance criteria declared at creation.
    pub criteria: AcceptanceCriteria,
    /// Current lifecycle state.
    pub state: TaskState,
    /// Creation timestamp.
    pub created_at: Timestamp,
    /// Last update timestamp.
    pub updated_at: Timestamp,
}

// ============================================================================
// SECTION: Task Aggregate
// ============================================================================

/// Persistence aggregate for one task.
///
/// # Invariants
/// - Loaded and saved as a unit under the per-task lock.
/// - `artifacts` and `tool_calls` are append-only in submission order.
/// - A task in `Verified` or `Failed` has exactly one verdict; a task in
///   `RolledBack` after a failure has a restore record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// The task row.
    pub task: Task,
    /// Append-only artifact log, oldest first.
    pub artifacts: Vec<Artifact>,
    /// Append-only tool-call log, oldest first.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Pre-task snapshot, if captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,
    /// Restore record, written once by the rollback coordinator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_record: Option<RestoreRecord>,
    /// Verification verdict, written once by the coordinator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
    /// Why the task rolled back, when it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_reason: Option<String>,
}

impl TaskRecord {
    /// Creates the aggregate for a newly created task.
    #[must_use]
    pub const fn new(task: Task) -> Self {
        Self {
            task,
            artifacts: Vec::new(),
            tool_calls: Vec::new(),
            snapshot: None,
            restore_record: None,
            verdict: None,
            rollback_reason: None,
        }
    }

    /// Returns the artifact with the given identifier, if recorded.
    #[must_use]
    pub fn artifact(&self, id: &crate::core::identifiers::ArtifactId) -> Option<&Artifact> {
        self.artifacts.iter().find(|artifact| &artifact.id == id)
    }

    /// Returns the tool call with the given identifier, if recorded.
    #[must_use]
    pub fn tool_call(
        &self,
        id: &crate::core::identifiers::ToolCallId,
    ) -> Option<&ToolCallRecord> {
        self.tool_calls.iter().find(|call| &call.id == id)
    }
}
