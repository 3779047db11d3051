// ares-core/tests/completion.rs
// ============================================================================
// Module: Completion Verifier Tests
// Description: Tests for completion scoring against acceptance criteria.
// ============================================================================
//! ## Overview
//! Validates crediting, tie-break order, and the stable reason tags of the
//! completion verifier.

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
use ares_core::Artifact;
use ares_core::ArtifactId;
use ares_core::ArtifactPayload;
use ares_core::ArtifactPredicate;
use ares_core::ArtifactRequirement;
use ares_core::DEFAULT_HASH_ALGORITHM;
use ares_core::PredicateComparator;
use ares_core::TaskId;
use ares_core::Timestamp;
use ares_core::runtime::assess_completion;
use serde_json::Value;
use serde_json::json;

/// Builds an artifact with the provided kind and JSON payload.
fn artifact(id: &str, kind: &str, payload: Value, at: u64) -> Artifact {
    let payload = ArtifactPayload::Json(payload);
    let hash = payload.content_hash(DEFAULT_HASH_ALGORITHM).unwrap();
    Artifact {
        id: ArtifactId::new(id),
        task_id: TaskId::new("task-1"),
        kind: kind.to_string(),
        payload,
        hash,
        submitted_at: Timestamp::Logical(at),
    }
}

/// Builds criteria requiring the provided kinds without predicates.
fn criteria_for(kinds: &[&str]) -> AcceptanceCriteria {
    AcceptanceCriteria {
        required_artifacts: kinds
            .iter()
            .map(|kind| ArtifactRequirement {
                kind: (*kind).to_string(),
                predicate: None,
            })
            .collect(),
        ..AcceptanceCriteria::default()
    }
}

/// Verifies zero required kinds yield a perfect score with its tag.
#[test]
fn completion_no_requirements_scores_one() {
    let result = assess_completion(&AcceptanceCriteria::default(), &[]);
    assert!((result.score - 1.0).abs() < f64::EPSILON);
    assert_eq!(result.reasons, vec!["no_requirements".to_string()]);
}

/// Verifies full crediting over all required kinds.
#[test]
fn completion_credits_every_required_kind() {
    let criteria = criteria_for(&["code", "test_report"]);
    let artifacts = vec![
        artifact("a-1", "code", json!({"lang": "rust"}), 1),
        artifact("a-2", "test_report", json!({"status": "passed"}), 2),
    ];
    let result = assess_completion(&criteria, &artifacts);
    assert!((result.score - 1.0).abs() < f64::EPSILON);
    assert!(result.reasons.is_empty());
}

/// Verifies a missing required kind halves the score and tags the gap.
#[test]
fn completion_missing_required_kind_scores_half() {
    let criteria = criteria_for(&["code", "test_report"]);
    let artifacts = vec![artifact("a-1", "code", json!({"lang": "rust"}), 1)];
    let result = assess_completion(&criteria, &artifacts);
    assert!((result.score - 0.5).abs() < f64::EPSILON);
    assert_eq!(result.reasons, vec!["missing_artifact:test_report".to_string()]);
}

/// Verifies predicate failures are tagged separately from missing kinds.
#[test]
fn completion_predicate_failure_is_tagged() {
    let criteria = AcceptanceCriteria {
        required_artifacts: vec![ArtifactRequirement {
            kind: "test_report".to_string(),
            predicate: Some(ArtifactPredicate {
                pointer: "/status".to_string(),
                comparator: PredicateComparator::Equals,
                expected: Some(json!("passed")),
            }),
        }],
        ..AcceptanceCriteria::default()
    };
    let artifacts = vec![artifact("a-1", "test_report", json!({"status": "failed"}), 1)];
    let result = assess_completion(&criteria, &artifacts);
    assert!(result.score.abs() < f64::EPSILON);
    assert_eq!(result.reasons, vec!["predicate_failed:test_report".to_string()]);
}

/// Verifies the earlier-submitted artifact is credited on ties.
#[test]
fn completion_credits_earliest_satisfying_artifact() {
    let criteria = AcceptanceCriteria {
        required_artifacts: vec![ArtifactRequirement {
            kind: "report".to_string(),
            predicate: Some(ArtifactPredicate {
                pointer: "/ok".to_string(),
                comparator: PredicateComparator::Equals,
                expected: Some(json!(true)),
            }),
        }],
        ..AcceptanceCriteria::default()
    };
    let artifacts = vec![
        artifact("a-1", "report", json!({"ok": false}), 1),
        artifact("a-2", "report", json!({"ok": true}), 2),
        artifact("a-3", "report", json!({"ok": true}), 3),
    ];
    let result = assess_completion(&criteria, &artifacts);
    assert!((result.score - 1.0).abs() < f64::EPSILON);
    assert!(result.reasons.is_empty());
}

/// Verifies optional kinds surface as bonus tags without scoring weight.
#[test]
fn completion_optional_kinds_are_bonus_only() {
    let criteria = AcceptanceCriteria {
        required_artifacts: vec![ArtifactRequirement {
            kind: "code".to_string(),
            predicate: None,
        }],
        optional_kinds: vec!["log".to_string()],
        ..AcceptanceCriteria::default()
    };
    let artifacts = vec![
        artifact("a-1", "code", json!({"lang": "rust"}), 1),
        artifact("a-2", "log", json!({"lines": 12}), 2),
    ];
    let result = assess_completion(&criteria, &artifacts);
    assert!((result.score - 1.0).abs() < f64::EPSILON);
    assert_eq!(result.reasons, vec!["bonus:log".to_string()]);
}
