// ares-core/src/core/event.rs
// ============================================================================
// Module: ARES Event Model
// Description: Fabric event payloads and topic addressing.
// Purpose: Provide owned, serializable events for real-time observers.
// Dependencies: serde, crate::core
// ============================================================================

//! ## Overview
//! Events are the owned payloads delivered through the event fabric. Each
//! event addresses exactly one topic: the task topic, the agent topic, or the
//! global system topic. Events never carry mutable references; observers
//! receive fully materialized values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::agent::AgentStatus;
use crate::core::enforcement::EnforcementAction;
use crate::core::identifiers::AgentId;
use crate::core::identifiers::ArtifactId;
use crate::core::identifiers::TaskId;
use crate::core::identifiers::ToolCallId;
use crate::core::task::TaskState;
use crate::core::time::Timestamp;
use crate::core::verdict::SubScores;
use crate::core::verdict::VerdictOutcome;

// ============================================================================
// SECTION: Topics
// ============================================================================

/// Topic an event is published under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Topic {
    /// Per-task topic (`task:<id>`).
    Task(TaskId),
    /// Per-agent topic (`agent:<id>`).
    Agent(AgentId),
    /// Global system topic.
    System,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task(id) => write!(f, "task:{id}"),
            Self::Agent(id) => write!(f, "agent:{id}"),
            Self::System => f.write_str("system"),
        }
    }
}

// ============================================================================
// SECTION: Events
// ============================================================================

/// Event payload delivered to fabric subscribers.
///
/// # Invariants
/// - Payloads are owned values; no variant carries a mutable reference.
/// - Events on a task or agent topic are published under that entity's lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// A task moved between lifecycle states.
    TaskStateChanged {
        /// Task identifier.
        task_id: TaskId,
        /// Owning agent identifier.
        agent_id: AgentId,
        /// Previous state.
        from: TaskState,
        /// New state.
        to: TaskState,
        /// Transition timestamp.
        at: Timestamp,
    },
    /// Verification produced a verdict for a task.
    VerdictProduced {
        /// Task identifier.
        task_id: TaskId,
        /// Owning agent identifier.
        agent_id: AgentId,
        /// Verdict outcome.
        outcome: VerdictOutcome,
        /// Component sub-scores.
        sub_scores: SubScores,
        /// Weighted overall score.
        overall: f64,
        /// Production timestamp.
        at: Timestamp,
    },
    /// An enforcement action was issued for an agent.
    EnforcementIssued {
        /// Targeted agent identifier.
        agent_id: AgentId,
        /// The issued action.
        action: EnforcementAction,
    },
    /// An agent's projected status changed.
    AgentStatusChanged {
        /// Agent identifier.
        agent_id: AgentId,
        /// New projected status.
        status: AgentStatus,
        /// Change timestamp.
        at: Timestamp,
    },
    /// An artifact was appended to a task.
    ArtifactRecorded {
        /// Task identifier.
        task_id: TaskId,
        /// Artifact identifier.
        artifact_id: ArtifactId,
        /// Artifact kind label.
        kind: String,
        /// Submission timestamp.
        at: Timestamp,
    },
    /// A tool call was recorded for a task.
    ToolCallRecorded {
        /// Task identifier.
        task_id: TaskId,
        /// Tool-call identifier.
        tool_call_id: ToolCallId,
        /// Invoked tool name.
        tool_name: String,
        /// Record timestamp.
        at: Timestamp,
    },
    /// A snapshot restore was attempted during rollback.
    SnapshotRestored {
        /// Task identifier.
        task_id: TaskId,
        /// True when the restore handler succeeded.
        success: bool,
        /// Failure reason tag when the restore failed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        /// Restore timestamp.
        at: Timestamp,
    },
}

impl Event {
    /// Returns the topic the event is published under.
    #[must_use]
    pub fn topic(&self) -> Topic {
        match self {
            Self::TaskStateChanged {
                task_id, ..
            }
            | Self::VerdictProduced {
                task_id, ..
            }
            | Self::ArtifactRecorded {
                task_id, ..
            }
            | Self::ToolCallRecorded {
                task_id, ..
            }
            | Self::SnapshotRestored {
                task_id, ..
            } => Topic::Task(task_id.clone()),
            Self::EnforcementIssued {
                agent_id, ..
            }
            | Self::AgentStatusChanged {
                agent_id, ..
            } => Topic::Agent(agent_id.clone()),
        }
    }

    /// Returns a stable label for the event variant.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::TaskStateChanged {
                ..
            } => "task_state_changed",
            Self::VerdictProduced {
                ..
            } => "verdict_produced",
            Self::EnforcementIssued {
                ..
            } => "enforcement_issued",
            Self::AgentStatusChanged {
                ..
            } => "agent_status_changed",
            Self::ArtifactRecorded {
                ..
            } => "artifact_recorded",
            Self::ToolCallRecorded {
                ..
            } => "tool_call_recorded",
            Self::SnapshotRestored {
                ..
            } => "snapshot_restored",
        }
    }
}
