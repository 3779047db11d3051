// ares-core/tests/stores.rs
// ============================================================================
// Module: In-Memory Store Tests
// Description: Tests for the in-memory task and agent stores.
// ============================================================================
//! ## Overview
//! Ensures the in-memory stores return saved aggregates, preserve insertion
//! order, and fail closed on missing entries.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeSet;

use ares_core::AcceptanceCriteria;
use ares_core::Agent;
use ares_core::AgentId;
use ares_core::AgentRecord;
use ares_core::AgentStatus;
use ares_core::AgentStore;
use ares_core::InMemoryAgentStore;
use ares_core::InMemoryTaskStore;
use ares_core::ReliabilityState;
use ares_core::Task;
use ares_core::TaskId;
use ares_core::TaskRecord;
use ares_core::TaskState;
use ares_core::TaskStore;
use ares_core::Timestamp;

/// Builds a sample task aggregate.
fn sample_task(id: &str) -> TaskRecord {
    TaskRecord::new(Task {
        id: TaskId::new(id),
        agent_id: AgentId::new("agent-1"),
        description: "sample work".to_string(),
        criteria: AcceptanceCriteria::default(),
        state: TaskState::Pending,
        created_at: Timestamp::Logical(0),
        updated_at: Timestamp::Logical(0),
    })
}

/// Builds a sample agent aggregate.
fn sample_agent(id: &str, name: &str) -> AgentRecord {
    AgentRecord::new(Agent {
        id: AgentId::new(id),
        name: name.to_string(),
        capabilities: BTreeSet::new(),
        status: AgentStatus::Active,
        reliability: ReliabilityState::new(),
    })
}

/// Verifies saving then loading a task aggregate succeeds.
#[test]
fn task_store_save_and_load_roundtrip() {
    let store = InMemoryTaskStore::new();
    let record = sample_task("task-1");
    store.save(&record).unwrap();
    assert_eq!(store.load(&TaskId::new("task-1")).unwrap(), Some(record));
}

/// Verifies loading a missing task returns None.
#[test]
fn task_store_returns_none_for_missing_task() {
    let store = InMemoryTaskStore::new();
    assert!(store.load(&TaskId::new("missing")).unwrap().is_none());
}

/// Verifies identifiers list in insertion order across resaves.
#[test]
fn task_store_lists_ids_in_insertion_order() {
    let store = InMemoryTaskStore::new();
    store.save(&sample_task("task-b")).unwrap();
    store.save(&sample_task("task-a")).unwrap();
    store.save(&sample_task("task-b")).unwrap();
    let ids: Vec<String> =
        store.list_ids().unwrap().iter().map(|id| id.as_str().to_string()).collect();
    assert_eq!(ids, vec!["task-b".to_string(), "task-a".to_string()]);
}

/// Verifies agent lookup by unique name.
#[test]
fn agent_store_finds_agents_by_name() {
    let store = InMemoryAgentStore::new();
    store.save(&sample_agent("agent-1", "athena")).unwrap();
    store.save(&sample_agent("agent-2", "hermes")).unwrap();
    let found = store.find_by_name("hermes").unwrap().unwrap();
    assert_eq!(found.agent.id, AgentId::new("agent-2"));
    assert!(store.find_by_name("nobody").unwrap().is_none());
}
