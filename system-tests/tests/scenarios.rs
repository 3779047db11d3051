// system-tests/tests/scenarios.rs
// ============================================================================
// Module: End-to-End Scenario Tests
// Description: The concrete product scenarios over store, core, and fabric.
// ============================================================================
//! ## Overview
//! Drives the six concrete scenarios end to end: happy path, missing
//! artifact, disallowed tool, rollback success, rollback failure, and
//! quarantine escalation.

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

use ares_core::AgentStatus;
use ares_core::AgentStore;
use ares_core::EnforcementKind;
use ares_core::Event;
use ares_core::RecentOutcome;
use ares_core::ReliabilityTier;
use ares_core::RestoreOutcome;
use ares_core::TaskState;
use ares_core::Timestamp;
use ares_core::VerdictOutcome;
use ares_fabric::TopicPattern;
use serde_json::json;
use system_tests::artifact_input;
use system_tests::harness;
use system_tests::scenario_criteria;
use system_tests::search_call_input;
use system_tests::shell_call_input;

/// Scenario 1: full evidence passes with perfect sub-scores.
#[test]
fn scenario_happy_path() {
    let system = harness();
    let agent = system.core.register_agent("athena", BTreeSet::new()).unwrap();
    let task = system
        .core
        .create_task(&agent.id, "implement parser", scenario_criteria(), Timestamp::Logical(1))
        .unwrap();

    system
        .core
        .append_artifact(&task.id, artifact_input("a-1", "code", json!({"lang": "rust"}), 2))
        .unwrap();
    system
        .core
        .append_artifact(
            &task.id,
            artifact_input("a-2", "test_report", json!({"status": "passed"}), 3),
        )
        .unwrap();
    system.core.record_tool_call(&task.id, search_call_input("c-1", 4)).unwrap();

    let verdict = system.core.complete_task(&task.id, Timestamp::Logical(5)).unwrap();
    assert_eq!(verdict.outcome, VerdictOutcome::Pass);
    assert!((verdict.sub_scores.completion - 1.0).abs() < f64::EPSILON);
    assert!((verdict.sub_scores.tool_usage - 1.0).abs() < f64::EPSILON);
    assert!((verdict.sub_scores.evidence - 1.0).abs() < f64::EPSILON);
    assert!((verdict.sub_scores.behavior - 1.0).abs() < f64::EPSILON);
    assert!((verdict.overall - 1.0).abs() < f64::EPSILON);

    assert_eq!(system.core.get_task(&task.id).unwrap().state, TaskState::Verified);
    let reliability = system.core.get_reliability(&agent.id).unwrap();
    assert_eq!(reliability.tier, ReliabilityTier::Good);
    assert!(system.core.list_enforcement(&agent.id, None).unwrap().is_empty());
}

/// Scenario 2: a missing required artifact fails and dents reliability.
#[test]
fn scenario_missing_required_artifact() {
    let system = harness();
    let agent = system.core.register_agent("athena", BTreeSet::new()).unwrap();
    let task = system
        .core
        .create_task(&agent.id, "implement parser", scenario_criteria(), Timestamp::Logical(1))
        .unwrap();
    system
        .core
        .append_artifact(&task.id, artifact_input("a-1", "code", json!({"lang": "rust"}), 2))
        .unwrap();
    system.core.record_tool_call(&task.id, search_call_input("c-1", 3)).unwrap();

    let verdict = system.core.complete_task(&task.id, Timestamp::Logical(4)).unwrap();
    assert_eq!(verdict.outcome, VerdictOutcome::Fail);
    assert!((verdict.sub_scores.completion - 0.5).abs() < f64::EPSILON);
    assert!(verdict.reasons.contains(&"missing_artifact:test_report".to_string()));

    assert_eq!(system.core.get_task(&task.id).unwrap().state, TaskState::RolledBack);
    let reliability = system.core.get_reliability(&agent.id).unwrap();
    assert!((reliability.score - 0.9).abs() < 1e-12);
    assert_eq!(reliability.consecutive_failures, 1);
    assert_eq!(reliability.tier, ReliabilityTier::Good);
}

/// Scenario 3: a disallowed tool call fails verification outright.
#[test]
fn scenario_disallowed_tool() {
    let system = harness();
    let agent = system.core.register_agent("athena", BTreeSet::new()).unwrap();
    let task = system
        .core
        .create_task(&agent.id, "implement parser", scenario_criteria(), Timestamp::Logical(1))
        .unwrap();
    system
        .core
        .append_artifact(&task.id, artifact_input("a-1", "code", json!({"lang": "rust"}), 2))
        .unwrap();
    system
        .core
        .append_artifact(
            &task.id,
            artifact_input("a-2", "test_report", json!({"status": "passed"}), 3),
        )
        .unwrap();
    system.core.record_tool_call(&task.id, shell_call_input("c-1", 4)).unwrap();

    let verdict = system.core.complete_task(&task.id, Timestamp::Logical(5)).unwrap();
    assert_eq!(verdict.outcome, VerdictOutcome::Fail);
    assert!(verdict.reasons.contains(&"disallowed_tool:shell".to_string()));
    // One recorded disallowed call plus the missing required search tool.
    assert!(verdict.sub_scores.tool_usage.abs() < f64::EPSILON);
}

/// Scenario 4: a failing task restores its snapshot successfully.
#[test]
fn scenario_rollback_success() {
    let system = harness();
    let mut events = system.fabric.subscribe(TopicPattern::AnyTask, 64);
    let agent = system.core.register_agent("athena", BTreeSet::new()).unwrap();
    let task = system
        .core
        .create_task(&agent.id, "implement parser", scenario_criteria(), Timestamp::Logical(1))
        .unwrap();
    system
        .core
        .capture_snapshot(&task.id, "filesystem", vec![1, 2, 3], "ws-1", Timestamp::Logical(2))
        .unwrap();

    let verdict = system.core.complete_task(&task.id, Timestamp::Logical(3)).unwrap();
    assert_eq!(verdict.outcome, VerdictOutcome::Fail);

    let record = system.core.audit_task(&task.id).unwrap();
    assert_eq!(record.task.state, TaskState::RolledBack);
    assert_eq!(record.restore_record.unwrap().outcome, RestoreOutcome::Restored);

    let mut saw_restore = false;
    while let Some(event) = events.try_recv() {
        if let Event::SnapshotRestored {
            success,
            reason,
            ..
        } = event
        {
            assert!(success);
            assert!(reason.is_none());
            saw_restore = true;
        }
    }
    assert!(saw_restore);
}

/// Scenario 5: a failing restore handler is recorded without retry.
#[test]
fn scenario_rollback_failure() {
    let system = harness();
    let mut events = system.fabric.subscribe(TopicPattern::AnyTask, 64);
    let agent = system.core.register_agent("athena", BTreeSet::new()).unwrap();
    let task = system
        .core
        .create_task(&agent.id, "implement parser", scenario_criteria(), Timestamp::Logical(1))
        .unwrap();
    system
        .core
        .capture_snapshot(&task.id, "locked_store", vec![9], "ws-1", Timestamp::Logical(2))
        .unwrap();

    let verdict = system.core.complete_task(&task.id, Timestamp::Logical(3)).unwrap();
    assert_eq!(verdict.outcome, VerdictOutcome::Fail);

    let record = system.core.audit_task(&task.id).unwrap();
    assert_eq!(record.task.state, TaskState::RolledBack);
    assert_eq!(
        record.restore_record.unwrap().outcome,
        RestoreOutcome::RestoreFailed("locked".to_string())
    );

    let mut saw_restore = false;
    while let Some(event) = events.try_recv() {
        if let Event::SnapshotRestored {
            success,
            reason,
            ..
        } = event
        {
            assert!(!success);
            assert_eq!(reason.as_deref(), Some("locked"));
            saw_restore = true;
        }
    }
    assert!(saw_restore);
}

/// Scenario 6: the fifth consecutive failure suspends the agent once.
#[test]
fn scenario_quarantine_escalation() {
    let system = harness();
    let mut events = system.fabric.subscribe(TopicPattern::AnyAgent, 128);
    let agent = system.core.register_agent("athena", BTreeSet::new()).unwrap();

    // Seed the reliability state the scenario starts from.
    {
        let mut record = AgentStore::load(&system.store, &agent.id).unwrap().unwrap();
        record.agent.reliability.score = 0.55;
        record.agent.reliability.consecutive_failures = 4;
        record.agent.reliability.tier = ReliabilityTier::Probation;
        for step in 0..4_u64 {
            record.agent.reliability.recent.push_back(RecentOutcome {
                outcome: VerdictOutcome::Fail,
                at: Timestamp::Logical(step),
            });
        }
        AgentStore::save(&system.store, &record).unwrap();
    }

    let task = system
        .core
        .create_task(&agent.id, "failing work", scenario_criteria(), Timestamp::Logical(10))
        .unwrap();
    let verdict = system.core.complete_task(&task.id, Timestamp::Logical(11)).unwrap();
    assert_eq!(verdict.outcome, VerdictOutcome::Fail);

    let reliability = system.core.get_reliability(&agent.id).unwrap();
    assert!((reliability.score - 0.495).abs() < 1e-9);
    assert_eq!(reliability.consecutive_failures, 5);
    assert_eq!(reliability.tier, ReliabilityTier::Quarantine);

    let actions = system.core.list_enforcement(&agent.id, None).unwrap();
    assert!(actions.iter().any(|action| matches!(
        action.kind,
        EnforcementKind::Suspend { duration_ms } if duration_ms == 86_400_000
    )));
    assert_eq!(system.core.get_agent(&agent.id).unwrap().status, AgentStatus::Suspended);

    let mut suspended_events = 0;
    while let Some(event) = events.try_recv() {
        if matches!(
            event,
            Event::AgentStatusChanged {
                status: AgentStatus::Suspended,
                ..
            }
        ) {
            suspended_events += 1;
        }
    }
    assert_eq!(suspended_events, 1);
}
