// system-tests/src/lib.rs
// ============================================================================
// Module: ARES System Test Harness
// Description: Shared harness wiring the core, SQLite store, and fabric.
// Purpose: Give scenario tests one production-shaped assembly to drive.
// Dependencies: ares-core, ares-fabric, ares-store-sqlite, tempfile
// ============================================================================

//! ## Overview
//! The harness assembles the core service exactly as a host would: a durable
//! `SQLite` store in a temporary directory, the event fabric as the sink, a
//! registered search tool schema, and one succeeding plus one failing restore
//! handler.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use ares_core::AcceptanceCriteria;
use ares_core::ArtifactId;
use ares_core::ArtifactPayload;
use ares_core::ArtifactRequirement;
use ares_core::Core;
use ares_core::CoreConfig;
use ares_core::NewArtifact;
use ares_core::NewToolCall;
use ares_core::RestoreFault;
use ares_core::RestoreHandler;
use ares_core::RestoreHandlerRegistry;
use ares_core::SchemaId;
use ares_core::Timestamp;
use ares_core::ToolCallId;
use ares_core::ToolCallOutcome;
use ares_core::ToolExpectation;
use ares_core::ToolSchemaRegistry;
use ares_fabric::EventFabric;
use ares_store_sqlite::SqliteStore;
use ares_store_sqlite::SqliteStoreConfig;
use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// SECTION: Restore Handlers
// ============================================================================

/// Restore handler that always succeeds.
struct OkHandler;

impl RestoreHandler for OkHandler {
    fn restore(&self, _restore_key: &str, _opaque_state: &[u8]) -> Result<(), RestoreFault> {
        Ok(())
    }
}

/// Restore handler that always fails with a fixed reason.
struct LockedHandler;

impl RestoreHandler for LockedHandler {
    fn restore(&self, _restore_key: &str, _opaque_state: &[u8]) -> Result<(), RestoreFault> {
        Err(RestoreFault::Failed("locked".to_string()))
    }
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Core service assembled over the durable store and the fabric.
pub type SystemCore = Core<SqliteStore, SqliteStore, EventFabric>;

/// One assembled ARES instance backed by a temporary database.
pub struct SystemHarness {
    /// The core service under test.
    pub core: SystemCore,
    /// The fabric hosts subscribe through.
    pub fabric: EventFabric,
    /// Direct store handle for seeding and inspection.
    pub store: SqliteStore,
    /// Temporary directory keeping the database alive.
    _dir: TempDir,
}

/// Assembles a fresh system harness.
///
/// # Panics
///
/// Panics when the temporary store cannot be created; system tests treat
/// that as an environment failure.
#[must_use]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Harness construction failures are test-environment failures."
)]
pub fn harness() -> SystemHarness {
    let dir = TempDir::new().expect("create temp dir");
    let store_config = SqliteStoreConfig::for_path(dir.path().join("ares.db"));
    let store = SqliteStore::new(&store_config).expect("open sqlite store");

    let mut schemas = ToolSchemaRegistry::new();
    schemas
        .register(
            "search",
            SchemaId::new("search-v1"),
            &json!({
                "type": "object",
                "properties": {"query": {"type": "string"}},
                "required": ["query"]
            }),
        )
        .expect("register search schema");

    let mut restorers = RestoreHandlerRegistry::new();
    restorers.register("filesystem", Arc::new(OkHandler)).expect("register filesystem handler");
    restorers.register("locked_store", Arc::new(LockedHandler)).expect("register locked handler");

    let fabric = EventFabric::new();
    let core = Core::new(
        CoreConfig::default(),
        store.clone(),
        store.clone(),
        fabric.clone(),
        schemas,
        restorers,
    );
    SystemHarness {
        core,
        fabric,
        store,
        _dir: dir,
    }
}

// ============================================================================
// SECTION: Scenario Builders
// ============================================================================

/// Builds the criteria used by the concrete scenarios: required `code` and
/// `test_report` artifacts plus one to three `search` calls.
#[must_use]
pub fn scenario_criteria() -> AcceptanceCriteria {
    AcceptanceCriteria {
        required_artifacts: vec![
            ArtifactRequirement {
                kind: "code".to_string(),
                predicate: None,
            },
            ArtifactRequirement {
                kind: "test_report".to_string(),
                predicate: None,
            },
        ],
        tools: vec![ToolExpectation {
            tool_name: "search".to_string(),
            min_invocations: 1,
            max_invocations: 3,
            schema_id: SchemaId::new("search-v1"),
        }],
        ..AcceptanceCriteria::default()
    }
}

/// Builds a JSON artifact submission.
#[must_use]
pub fn artifact_input(id: &str, kind: &str, payload: Value, at: u64) -> NewArtifact {
    NewArtifact {
        id: ArtifactId::new(id),
        kind: kind.to_string(),
        payload: ArtifactPayload::Json(payload),
        submitted_at: Timestamp::Logical(at),
    }
}

/// Builds a well-formed search call submission.
#[must_use]
pub fn search_call_input(id: &str, at: u64) -> NewToolCall {
    NewToolCall {
        id: ToolCallId::new(id),
        tool_name: "search".to_string(),
        arguments: json!({"query": "rust"}),
        outcome: Some(ToolCallOutcome::Result(json!({"hits": 2}))),
        started_at: Timestamp::Logical(at),
        finished_at: Timestamp::Logical(at + 1),
    }
}

/// Builds a tool call for a tool outside the allowed set.
#[must_use]
pub fn shell_call_input(id: &str, at: u64) -> NewToolCall {
    NewToolCall {
        id: ToolCallId::new(id),
        tool_name: "shell".to_string(),
        arguments: json!({"cmd": "rm -rf target"}),
        outcome: Some(ToolCallOutcome::Result(json!({"status": 0}))),
        started_at: Timestamp::Logical(at),
        finished_at: Timestamp::Logical(at + 1),
    }
}
