// ares-core/src/runtime/stores.rs
// ============================================================================
// Module: ARES In-Memory Stores
// Description: Simple in-memory task and agent stores for tests and examples.
// Purpose: Provide deterministic store implementations without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides in-memory implementations of [`TaskStore`] and
//! [`AgentStore`] for tests and local demos. They preserve insertion order
//! and are not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::AgentId;
use crate::core::AgentRecord;
use crate::core::TaskId;
use crate::core::TaskRecord;
use crate::interfaces::AgentStore;
use crate::interfaces::StoreError;
use crate::interfaces::TaskStore;

// ============================================================================
// SECTION: In-Memory Task Store
// ============================================================================

/// In-memory task aggregate store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTaskStore {
    /// Aggregates keyed by task id, plus insertion order.
    inner: Arc<Mutex<(BTreeMap<String, TaskRecord>, Vec<TaskId>)>>,
}

impl InMemoryTaskStore {
    /// Creates a new in-memory task store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStore for InMemoryTaskStore {
    fn load(&self, task_id: &TaskId) -> Result<Option<TaskRecord>, StoreError> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| StoreError::Store("task store mutex poisoned".to_string()))?;
        Ok(guard.0.get(task_id.as_str()).cloned())
    }

    fn save(&self, record: &TaskRecord) -> Result<(), StoreError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| StoreError::Store("task store mutex poisoned".to_string()))?;
        let key = record.task.id.as_str().to_string();
        if guard.0.insert(key, record.clone()).is_none() {
            guard.1.push(record.task.id.clone());
        }
        Ok(())
    }

    fn list_ids(&self) -> Result<Vec<TaskId>, StoreError> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| StoreError::Store("task store mutex poisoned".to_string()))?;
        Ok(guard.1.clone())
    }
}

// ============================================================================
// SECTION: In-Memory Agent Store
// ============================================================================

/// In-memory agent aggregate store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAgentStore {
    /// Aggregates keyed by agent id, plus insertion order.
    inner: Arc<Mutex<(BTreeMap<String, AgentRecord>, Vec<AgentId>)>>,
}

impl InMemoryAgentStore {
    /// Creates a new in-memory agent store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AgentStore for InMemoryAgentStore {
    fn load(&self, agent_id: &AgentId) -> Result<Option<AgentRecord>, StoreError> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| StoreError::Store("agent store mutex poisoned".to_string()))?;
        Ok(guard.0.get(agent_id.as_str()).cloned())
    }

    fn save(&self, record: &AgentRecord) -> Result<(), StoreError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| StoreError::Store("agent store mutex poisoned".to_string()))?;
        let key = record.agent.id.as_str().to_string();
        if guard.0.insert(key, record.clone()).is_none() {
            guard.1.push(record.agent.id.clone());
        }
        Ok(())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<AgentRecord>, StoreError> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| StoreError::Store("agent store mutex poisoned".to_string()))?;
        Ok(guard.0.values().find(|record| record.agent.name == name).cloned())
    }

    fn list_ids(&self) -> Result<Vec<AgentId>, StoreError> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| StoreError::Store("agent store mutex poisoned".to_string()))?;
        Ok(guard.1.clone())
    }
}
