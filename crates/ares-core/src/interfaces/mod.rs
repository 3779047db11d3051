// ares-core/src/interfaces/mod.rs
// ============================================================================
// Module: ARES Interfaces
// Description: Backend-agnostic interfaces for storage, restore, and events.
// Purpose: Define the contract surfaces used by the ARES runtime.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how ARES integrates with persistence backends, restore
//! handlers, and event transports without embedding backend-specific details.
//! Implementations must be deterministic and fail closed on missing or
//! invalid data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::AgentId;
use crate::core::AgentRecord;
use crate::core::Event;
use crate::core::TaskId;
use crate::core::TaskRecord;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Persistence errors surfaced by task and agent stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error; retried with bounded backoff by the runtime.
    #[error("store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("store corruption: {0}")]
    Corrupt(String),
    /// Store data version is incompatible.
    #[error("store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Task Store
// ============================================================================

/// Task aggregate store for persistence.
///
/// Implementations must persist each aggregate atomically so the per-task
/// lock is the only writer coordination the runtime needs.
pub trait TaskStore {
    /// Loads a task aggregate by task identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load(&self, task_id: &TaskId) -> Result<Option<TaskRecord>, StoreError>;

    /// Saves a task aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when saving fails.
    fn save(&self, record: &TaskRecord) -> Result<(), StoreError>;

    /// Lists every stored task identifier in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list_ids(&self) -> Result<Vec<TaskId>, StoreError>;
}

// ============================================================================
// SECTION: Agent Store
// ============================================================================

/// Agent aggregate store for persistence.
pub trait AgentStore {
    /// Loads an agent aggregate by agent identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load(&self, agent_id: &AgentId) -> Result<Option<AgentRecord>, StoreError>;

    /// Saves an agent aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when saving fails.
    fn save(&self, record: &AgentRecord) -> Result<(), StoreError>;

    /// Finds an agent aggregate by unique name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when lookup fails.
    fn find_by_name(&self, name: &str) -> Result<Option<AgentRecord>, StoreError>;

    /// Lists every stored agent identifier in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list_ids(&self) -> Result<Vec<AgentId>, StoreError>;
}

// ============================================================================
// SECTION: Restore Handlers
// ============================================================================

/// Restore failure reported by a handler.
#[derive(Debug, Error)]
pub enum RestoreFault {
    /// The handler rejected or failed the restore; the reason is a stable tag.
    #[error("restore failed: {0}")]
    Failed(String),
}

/// External restore handler registered per snapshot scope at startup.
///
/// Handlers must be safe to call while the task lock is held and must be
/// idempotent with respect to the opaque state they receive.
pub trait RestoreHandler: Send + Sync {
    /// Restores the captured opaque state.
    ///
    /// # Errors
    ///
    /// Returns [`RestoreFault`] when the restore cannot be completed.
    fn restore(&self, restore_key: &str, opaque_state: &[u8]) -> Result<(), RestoreFault>;
}

// ============================================================================
// SECTION: Event Sink
// ============================================================================

/// Event sink receiving every core event.
///
/// Publishing must never block for long; slow observers are the sink's
/// problem and surface as per-subscription drop counters, not backpressure on
/// the core.
pub trait EventSink: Send + Sync {
    /// Publishes one event.
    fn publish(&self, event: Event);
}

/// Event sink that discards every event, for tests and headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn publish(&self, _event: Event) {}
}
