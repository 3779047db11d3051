// ares-core/src/runtime/locks.rs
// ============================================================================
// Module: ARES Lock Registry
// Description: Keyed per-entity mutexes for task and agent serialization.
// Purpose: Serialize mutations per task and per agent without a global lock.
// Dependencies: std::sync
// ============================================================================

//! ## Overview
//! The runtime serializes all mutations of one task under that task's lock
//! and all reliability/enforcement updates of one agent under that agent's
//! lock. Locks are created lazily per key and shared through `Arc` so
//! distinct entities proceed in parallel. Lock ordering is fixed: when both
//! locks are needed the task lock is acquired before the agent lock, never
//! the reverse.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

// ============================================================================
// SECTION: Lock Registry
// ============================================================================

/// Lazily populated registry of per-key mutexes.
#[derive(Debug, Default)]
pub struct LockRegistry {
    /// Map from entity key to its shared mutex.
    locks: Mutex<BTreeMap<String, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    /// Creates an empty lock registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared mutex for a key, creating it on first use.
    ///
    /// The registry mutex guards only the map itself; callers lock the
    /// returned entity mutex for the duration of their critical section.
    #[must_use]
    pub fn entry(&self, key: &str) -> Arc<Mutex<()>> {
        let mut guard = match self.locks.lock() {
            Ok(guard) => guard,
            // A poisoned registry only means a panic happened while inserting
            // a fresh entry; the map itself is still structurally sound.
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.entry(key.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}
