// ares-core/src/core/snapshot.rs
// ============================================================================
// Module: ARES Snapshot Model
// Description: Pre-task state snapshots and restore records.
// Purpose: Capture opaque rollback state and the outcome of restore attempts.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A snapshot is the opaque pre-task state captured before work that may need
//! rollback. The core never interprets `opaque_state`; only the restore
//! handler registered for the snapshot's scope understands it. A restore
//! record is written exactly once per task and repeated restore calls report
//! the prior outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::TaskId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Snapshots
// ============================================================================

/// Opaque pre-task state captured for rollback.
///
/// # Invariants
/// - At most one snapshot exists per task.
/// - `opaque_state` is understood only by the restore handler for `scope`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Owning task identifier.
    pub task_id: TaskId,
    /// Scope selecting the restore handler.
    pub scope: String,
    /// Opaque state blob.
    pub opaque_state: Vec<u8>,
    /// Handler-specific restore key.
    pub restore_key: String,
    /// Capture timestamp supplied by the caller.
    pub captured_at: Timestamp,
}

// ============================================================================
// SECTION: Restore Records
// ============================================================================

/// Outcome of a restore attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum RestoreOutcome {
    /// The restore handler completed successfully.
    Restored,
    /// The restore handler failed or timed out; the reason is a stable tag.
    RestoreFailed(String),
}

impl RestoreOutcome {
    /// Returns true when the restore succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Restored)
    }
}

/// Record of the single restore attempt made for a task.
///
/// # Invariants
/// - Written at most once; later restore calls return this record unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreRecord {
    /// Outcome of the restore attempt.
    pub outcome: RestoreOutcome,
    /// Timestamp supplied when the restore was driven.
    pub restored_at: Timestamp,
}
