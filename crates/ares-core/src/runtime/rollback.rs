// ares-core/src/runtime/rollback.rs
// ============================================================================
// Module: ARES Rollback Coordinator
// Description: Restore-handler registry and deadline-bounded restore driving.
// Purpose: Restore pre-task snapshots on failure or cancellation.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Restore handlers are registered per snapshot scope at startup into an
//! explicit registry; there are no import-time side effects. Driving a
//! restore runs the handler on a watchdog thread so a hung handler cannot
//! stall the task lock past the configured deadline; exceeding it records
//! `RestoreFailed(timeout)`. Restores are attempted at most once per task and
//! never retried automatically.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::core::Snapshot;
use crate::core::snapshot::RestoreOutcome;
use crate::interfaces::RestoreFault;
use crate::interfaces::RestoreHandler;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Restore-handler registration errors.
#[derive(Debug, Error)]
pub enum RestoreRegistryError {
    /// A handler is already registered for the scope.
    #[error("restore handler already registered for scope {0}")]
    AlreadyRegistered(String),
}

// ============================================================================
// SECTION: Handler Registry
// ============================================================================

/// Registry of restore handlers keyed by snapshot scope.
#[derive(Default)]
pub struct RestoreHandlerRegistry {
    /// Registered handlers by scope.
    handlers: BTreeMap<String, Arc<dyn RestoreHandler>>,
}

impl RestoreHandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a scope.
    ///
    /// # Errors
    ///
    /// Returns [`RestoreRegistryError::AlreadyRegistered`] when the scope is
    /// taken.
    pub fn register(
        &mut self,
        scope: impl Into<String>,
        handler: Arc<dyn RestoreHandler>,
    ) -> Result<(), RestoreRegistryError> {
        let scope = scope.into();
        if self.handlers.contains_key(&scope) {
            return Err(RestoreRegistryError::AlreadyRegistered(scope));
        }
        self.handlers.insert(scope, handler);
        Ok(())
    }

    /// Returns the handler registered for a scope, if any.
    #[must_use]
    pub fn handler(&self, scope: &str) -> Option<Arc<dyn RestoreHandler>> {
        self.handlers.get(scope).cloned()
    }
}

// ============================================================================
// SECTION: Restore Driving
// ============================================================================

/// Drives the restore handler for a snapshot under a deadline.
///
/// The handler runs on its own thread; when the deadline expires the outcome
/// is `RestoreFailed(timeout)` and the abandoned handler result is discarded.
#[must_use]
pub fn drive_restore(
    snapshot: &Snapshot,
    registry: &RestoreHandlerRegistry,
    deadline_ms: u64,
) -> RestoreOutcome {
    let Some(handler) = registry.handler(&snapshot.scope) else {
        return RestoreOutcome::RestoreFailed(format!("unknown_scope:{}", snapshot.scope));
    };

    let restore_key = snapshot.restore_key.clone();
    let opaque_state = snapshot.opaque_state.clone();
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let result = handler.restore(&restore_key, &opaque_state);
        // A send failure only means the deadline already expired.
        let _ = sender.send(result);
    });

    match receiver.recv_timeout(Duration::from_millis(deadline_ms)) {
        Ok(Ok(())) => RestoreOutcome::Restored,
        Ok(Err(RestoreFault::Failed(reason))) => RestoreOutcome::RestoreFailed(reason),
        Err(_) => RestoreOutcome::RestoreFailed("timeout".to_string()),
    }
}
