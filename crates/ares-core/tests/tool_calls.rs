// ares-core/tests/tool_calls.rs
// ============================================================================
// Module: Tool-Call Validator Tests
// Description: Tests for structural call validation and usage aggregation.
// ============================================================================
//! ## Overview
//! Validates the fixed-order structural checks and the tool-usage score
//! including disallowed tools, missing required tools, and over-invocation.

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

use ares_core::AcceptanceCriteria;
use ares_core::CallValidation;
use ares_core::SchemaId;
use ares_core::TaskId;
use ares_core::Timestamp;
use ares_core::ToolCallId;
use ares_core::ToolCallOutcome;
use ares_core::ToolCallRecord;
use ares_core::ToolExpectation;
use ares_core::ToolSchemaRegistry;
use ares_core::runtime::assess_tool_usage;
use ares_core::runtime::validate_call;
use serde_json::Value;
use serde_json::json;

/// Builds a registry with a `search` schema requiring a string query.
fn search_registry() -> ToolSchemaRegistry {
    let mut registry = ToolSchemaRegistry::new();
    registry
        .register(
            "search",
            SchemaId::new("search-v1"),
            &json!({
                "type": "object",
                "properties": {"query": {"type": "string"}},
                "required": ["query"],
                "additionalProperties": false
            }),
        )
        .unwrap();
    registry
}

/// Builds a tool call with the provided shape.
fn call(id: &str, tool: &str, arguments: Value, validation: CallValidation) -> ToolCallRecord {
    ToolCallRecord {
        id: ToolCallId::new(id),
        task_id: TaskId::new("task-1"),
        tool_name: tool.to_string(),
        arguments,
        outcome: Some(ToolCallOutcome::Result(json!({"hits": 3}))),
        started_at: Timestamp::Logical(1),
        finished_at: Timestamp::Logical(2),
        validation,
    }
}

/// Builds criteria allowing `search` one to three times.
fn search_criteria() -> AcceptanceCriteria {
    AcceptanceCriteria {
        tools: vec![ToolExpectation {
            tool_name: "search".to_string(),
            min_invocations: 1,
            max_invocations: 3,
            schema_id: SchemaId::new("search-v1"),
        }],
        ..AcceptanceCriteria::default()
    }
}

/// Verifies a structurally sound call validates.
#[test]
fn validate_call_accepts_well_formed_call() {
    let registry = search_registry();
    let row = call("c-1", "search", json!({"query": "rust"}), CallValidation::Unchecked);
    assert_eq!(validate_call(&row, &registry), CallValidation::Valid);
}

/// Verifies schema mismatches fail closed.
#[test]
fn validate_call_rejects_schema_mismatch() {
    let registry = search_registry();
    let row = call("c-1", "search", json!({"query": 7}), CallValidation::Unchecked);
    assert_eq!(validate_call(&row, &registry), CallValidation::Invalid("schema_mismatch".into()));
}

/// Verifies tools without a registered schema never validate.
#[test]
fn validate_call_rejects_unregistered_tool() {
    let registry = search_registry();
    let row = call("c-1", "shell", json!({"cmd": "ls"}), CallValidation::Unchecked);
    assert_eq!(
        validate_call(&row, &registry),
        CallValidation::Invalid("unregistered_tool:shell".into())
    );
}

/// Verifies a call without a terminal outcome is invalid.
#[test]
fn validate_call_requires_outcome() {
    let registry = search_registry();
    let mut row = call("c-1", "search", json!({"query": "rust"}), CallValidation::Unchecked);
    row.outcome = None;
    assert_eq!(validate_call(&row, &registry), CallValidation::Invalid("missing_outcome".into()));
}

/// Verifies a finish time before the start time is invalid.
#[test]
fn validate_call_requires_ordered_timestamps() {
    let registry = search_registry();
    let mut row = call("c-1", "search", json!({"query": "rust"}), CallValidation::Unchecked);
    row.started_at = Timestamp::Logical(5);
    row.finished_at = Timestamp::Logical(4);
    assert_eq!(
        validate_call(&row, &registry),
        CallValidation::Invalid("finished_before_started".into())
    );
}

/// Verifies expected valid usage scores one.
#[test]
fn tool_usage_perfect_for_expected_valid_call() {
    let criteria = search_criteria();
    let calls = vec![call("c-1", "search", json!({"query": "rust"}), CallValidation::Valid)];
    let result = assess_tool_usage(&criteria, &calls);
    assert!((result.score - 1.0).abs() < f64::EPSILON);
    assert!(result.reasons.is_empty());
}

/// Verifies a disallowed tool zeroes the credit and tags the call.
#[test]
fn tool_usage_flags_disallowed_tool() {
    let criteria = search_criteria();
    let calls = vec![call("c-1", "shell", json!({"cmd": "ls"}), CallValidation::Unchecked)];
    let result = assess_tool_usage(&criteria, &calls);
    // One recorded call plus the missing required search.
    assert!(result.score.abs() < f64::EPSILON);
    assert!(result.reasons.contains(&"disallowed_tool:shell".to_string()));
    assert!(result.reasons.contains(&"missing_tool:search".to_string()));
}

/// Verifies missing required tools expand the denominator.
#[test]
fn tool_usage_counts_missing_required_tools() {
    let criteria = search_criteria();
    let result = assess_tool_usage(&criteria, &[]);
    assert!(result.score.abs() < f64::EPSILON);
    assert_eq!(result.reasons, vec!["missing_tool:search".to_string()]);
}

/// Verifies over-invocation is capped and tagged instead of credited.
#[test]
fn tool_usage_caps_over_invocation() {
    let criteria = AcceptanceCriteria {
        tools: vec![ToolExpectation {
            tool_name: "search".to_string(),
            min_invocations: 1,
            max_invocations: 2,
            schema_id: SchemaId::new("search-v1"),
        }],
        ..AcceptanceCriteria::default()
    };
    let calls = vec![
        call("c-1", "search", json!({"query": "a"}), CallValidation::Valid),
        call("c-2", "search", json!({"query": "b"}), CallValidation::Valid),
        call("c-3", "search", json!({"query": "c"}), CallValidation::Valid),
    ];
    let result = assess_tool_usage(&criteria, &calls);
    // Two credited out of three recorded.
    assert!((result.score - 0.6667).abs() < 1e-9);
    assert_eq!(result.reasons, vec!["over_invocation:search".to_string()]);
}

/// Verifies structurally invalid calls are tagged and not credited.
#[test]
fn tool_usage_excludes_invalid_calls() {
    let criteria = search_criteria();
    let calls = vec![
        call("c-1", "search", json!({"query": "a"}), CallValidation::Valid),
        call(
            "c-2",
            "search",
            json!({"query": 9}),
            CallValidation::Invalid("schema_mismatch".into()),
        ),
    ];
    let result = assess_tool_usage(&criteria, &calls);
    assert!((result.score - 0.5).abs() < f64::EPSILON);
    assert_eq!(result.reasons, vec!["invalid_call:search:schema_mismatch".to_string()]);
}
