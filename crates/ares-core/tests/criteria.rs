// ares-core/tests/criteria.rs
// ============================================================================
// Module: Acceptance Criteria Tests
// Description: Tests for criteria validation and artifact predicates.
// ============================================================================
//! ## Overview
//! Validates fail-closed criteria checks and JSON-pointer predicate matching.

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
use ares_core::ArtifactPredicate;
use ares_core::ArtifactRequirement;
use ares_core::BehaviorBounds;
use ares_core::CriteriaError;
use ares_core::PredicateComparator;
use ares_core::SchemaId;
use ares_core::ToolExpectation;
use serde_json::json;

/// Builds a requirement without a predicate.
fn plain_requirement(kind: &str) -> ArtifactRequirement {
    ArtifactRequirement {
        kind: kind.to_string(),
        predicate: None,
    }
}

/// Verifies a well-formed criteria set validates.
#[test]
fn criteria_validate_accepts_well_formed() {
    let criteria = AcceptanceCriteria {
        required_artifacts: vec![plain_requirement("code"), plain_requirement("test_report")],
        optional_kinds: vec!["log".to_string()],
        tools: vec![ToolExpectation {
            tool_name: "search".to_string(),
            min_invocations: 1,
            max_invocations: 3,
            schema_id: SchemaId::new("search-v1"),
        }],
        bounds: Some(BehaviorBounds {
            max_duration_ms: Some(60_000),
            max_retries: Some(3),
        }),
    };
    criteria.validate().unwrap();
}

/// Verifies duplicate required kinds are rejected.
#[test]
fn criteria_validate_rejects_duplicate_kinds() {
    let criteria = AcceptanceCriteria {
        required_artifacts: vec![plain_requirement("code"), plain_requirement("code")],
        ..AcceptanceCriteria::default()
    };
    assert!(matches!(
        criteria.validate(),
        Err(CriteriaError::DuplicateArtifactKind(kind)) if kind == "code"
    ));
}

/// Verifies value-bearing predicates demand an expected value.
#[test]
fn criteria_validate_rejects_predicate_without_expected() {
    let criteria = AcceptanceCriteria {
        required_artifacts: vec![ArtifactRequirement {
            kind: "report".to_string(),
            predicate: Some(ArtifactPredicate {
                pointer: "/status".to_string(),
                comparator: PredicateComparator::Equals,
                expected: None,
            }),
        }],
        ..AcceptanceCriteria::default()
    };
    assert!(matches!(criteria.validate(), Err(CriteriaError::MissingExpectedValue(_))));
}

/// Verifies inverted invocation bounds are rejected.
#[test]
fn criteria_validate_rejects_inverted_tool_bounds() {
    let criteria = AcceptanceCriteria {
        tools: vec![ToolExpectation {
            tool_name: "search".to_string(),
            min_invocations: 3,
            max_invocations: 1,
            schema_id: SchemaId::new("search-v1"),
        }],
        ..AcceptanceCriteria::default()
    };
    assert!(matches!(criteria.validate(), Err(CriteriaError::InvertedInvocationBounds(_))));
}

/// Verifies a zero duration bound is rejected.
#[test]
fn criteria_validate_rejects_zero_duration_bound() {
    let criteria = AcceptanceCriteria {
        bounds: Some(BehaviorBounds {
            max_duration_ms: Some(0),
            max_retries: None,
        }),
        ..AcceptanceCriteria::default()
    };
    assert!(matches!(criteria.validate(), Err(CriteriaError::ZeroDurationBound)));
}

/// Verifies predicate comparators over structured payloads.
#[test]
fn predicate_comparators_match_expected_fields() {
    let payload = json!({"status": "passed", "summary": "all suites green"});

    let exists = ArtifactPredicate {
        pointer: "/status".to_string(),
        comparator: PredicateComparator::Exists,
        expected: None,
    };
    assert!(exists.matches(&payload));

    let equals = ArtifactPredicate {
        pointer: "/status".to_string(),
        comparator: PredicateComparator::Equals,
        expected: Some(json!("passed")),
    };
    assert!(equals.matches(&payload));

    let not_equals = ArtifactPredicate {
        pointer: "/status".to_string(),
        comparator: PredicateComparator::NotEquals,
        expected: Some(json!("failed")),
    };
    assert!(not_equals.matches(&payload));

    let contains = ArtifactPredicate {
        pointer: "/summary".to_string(),
        comparator: PredicateComparator::Contains,
        expected: Some(json!("green")),
    };
    assert!(contains.matches(&payload));
}

/// Verifies criteria audit hashes track content, not construction order.
#[test]
fn criteria_canonical_hash_tracks_content() {
    let criteria = AcceptanceCriteria {
        required_artifacts: vec![plain_requirement("code")],
        ..AcceptanceCriteria::default()
    };
    let same = criteria.clone();
    let first = criteria.canonical_hash(ares_core::DEFAULT_HASH_ALGORITHM).unwrap();
    let second = same.canonical_hash(ares_core::DEFAULT_HASH_ALGORITHM).unwrap();
    assert_eq!(first, second);

    let changed = AcceptanceCriteria {
        required_artifacts: vec![plain_requirement("test_report")],
        ..AcceptanceCriteria::default()
    };
    let third = changed.canonical_hash(ares_core::DEFAULT_HASH_ALGORITHM).unwrap();
    assert_ne!(first, third);
}

/// Verifies an unresolved pointer never matches.
#[test]
fn predicate_fails_on_missing_pointer() {
    let predicate = ArtifactPredicate {
        pointer: "/missing".to_string(),
        comparator: PredicateComparator::Exists,
        expected: None,
    };
    assert!(!predicate.matches(&json!({"status": "passed"})));
}
