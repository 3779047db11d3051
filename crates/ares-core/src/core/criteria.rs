// ares-core/src/core/criteria.rs
// ============================================================================
// Module: ARES Acceptance Criteria
// Description: Declarative completion contracts attached to tasks.
// Purpose: Describe required evidence, expected tool usage, and behavior bounds.
// Dependencies: serde, serde_json, crate::core::hashing
// ============================================================================

//! ## Overview
//! Acceptance criteria are the declarative contract a task must satisfy to
//! pass verification. They are validated at task creation and immutable
//! afterwards. Artifact predicates are small JSON-pointer comparisons applied
//! to structured payloads; byte payloads only satisfy existence checks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::hashing::HashAlgorithm;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::identifiers::SchemaId;

// ============================================================================
// SECTION: Artifact Predicates
// ============================================================================

/// Comparator applied to an artifact payload field.
///
/// # Invariants
/// - Variants are stable for serialization and audit replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateComparator {
    /// The referenced field must be present.
    Exists,
    /// The referenced field must equal the expected value.
    Equals,
    /// The referenced field must not equal the expected value.
    NotEquals,
    /// The referenced string field must contain the expected string.
    Contains,
}

/// Structural predicate evaluated against an artifact's JSON payload.
///
/// # Invariants
/// - `pointer` is a JSON pointer (RFC 6901); the empty pointer selects the root.
/// - `expected` is required for every comparator except [`PredicateComparator::Exists`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPredicate {
    /// JSON pointer selecting the field under comparison.
    pub pointer: String,
    /// Comparator applied to the selected field.
    pub comparator: PredicateComparator,
    /// Expected value for value-bearing comparators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
}

impl ArtifactPredicate {
    /// Evaluates the predicate against a structured payload.
    ///
    /// Returns false when the pointer does not resolve or when the comparator
    /// requires an expected value that is absent.
    #[must_use]
    pub fn matches(&self, payload: &Value) -> bool {
        let Some(field) = payload.pointer(&self.pointer) else {
            return false;
        };
        match self.comparator {
            PredicateComparator::Exists => true,
            PredicateComparator::Equals => {
                self.expected.as_ref().is_some_and(|expected| field == expected)
            }
            PredicateComparator::NotEquals => {
                self.expected.as_ref().is_some_and(|expected| field != expected)
            }
            PredicateComparator::Contains => match (field.as_str(), &self.expected) {
                (Some(actual), Some(Value::String(needle))) => actual.contains(needle.as_str()),
                _ => false,
            },
        }
    }
}

// ============================================================================
// SECTION: Criteria Components
// ============================================================================

/// Required artifact kind with an optional payload predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRequirement {
    /// Artifact kind that must be present.
    pub kind: String,
    /// Optional structural predicate a satisfying artifact must pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<ArtifactPredicate>,
}

/// Expected usage envelope for a single tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolExpectation {
    /// Tool name the expectation applies to.
    pub tool_name: String,
    /// Minimum number of invocations required.
    pub min_invocations: u32,
    /// Maximum number of invocations allowed.
    pub max_invocations: u32,
    /// Schema identifier registered for the tool's arguments.
    pub schema_id: SchemaId,
}

/// Behavioral bounds declared for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorBounds {
    /// Maximum task duration in the task's time unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration_ms: Option<u64>,
    /// Maximum number of retry artifacts tolerated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

// ============================================================================
// SECTION: Acceptance Criteria
// ============================================================================

/// Declarative completion contract for a task.
///
/// # Invariants
/// - Immutable after task creation.
/// - `required_artifacts` order is the evaluation and reason-tag order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AcceptanceCriteria {
    /// Ordered required artifact kinds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_artifacts: Vec<ArtifactRequirement>,
    /// Optional artifact kinds that never lower the completion score.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optional_kinds: Vec<String>,
    /// Expected tool-usage envelopes, one per allowed tool.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolExpectation>,
    /// Optional behavioral bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BehaviorBounds>,
}

impl AcceptanceCriteria {
    /// Returns true when the tool name is in the allowed set.
    #[must_use]
    pub fn allows_tool(&self, tool_name: &str) -> bool {
        self.tools.iter().any(|tool| tool.tool_name == tool_name)
    }

    /// Returns every artifact kind recognized by the criteria.
    #[must_use]
    pub fn recognized_kinds(&self) -> BTreeSet<&str> {
        self.required_artifacts
            .iter()
            .map(|requirement| requirement.kind.as_str())
            .chain(self.optional_kinds.iter().map(String::as_str))
            .collect()
    }

    /// Computes the canonical hash of the criteria for audit parity checks.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when canonicalization fails.
    pub fn canonical_hash(&self, algorithm: HashAlgorithm) -> Result<HashDigest, HashError> {
        algorithm.digest_canonical(self)
    }

    /// Validates the criteria at task creation time.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError`] when any component is malformed.
    pub fn validate(&self) -> Result<(), CriteriaError> {
        let mut required_kinds = BTreeSet::new();
        for requirement in &self.required_artifacts {
            if requirement.kind.is_empty() {
                return Err(CriteriaError::EmptyArtifactKind);
            }
            if !required_kinds.insert(requirement.kind.as_str()) {
                return Err(CriteriaError::DuplicateArtifactKind(requirement.kind.clone()));
            }
            if let Some(predicate) = &requirement.predicate {
                let needs_expected = !matches!(predicate.comparator, PredicateComparator::Exists);
                if needs_expected && predicate.expected.is_none() {
                    return Err(CriteriaError::MissingExpectedValue(requirement.kind.clone()));
                }
            }
        }

        let mut tool_names = BTreeSet::new();
        for tool in &self.tools {
            if tool.tool_name.is_empty() {
                return Err(CriteriaError::EmptyToolName);
            }
            if !tool_names.insert(tool.tool_name.as_str()) {
                return Err(CriteriaError::DuplicateTool(tool.tool_name.clone()));
            }
            if tool.max_invocations < tool.min_invocations {
                return Err(CriteriaError::InvertedInvocationBounds(tool.tool_name.clone()));
            }
        }

        if let Some(bounds) = &self.bounds {
            if bounds.max_duration_ms == Some(0) {
                return Err(CriteriaError::ZeroDurationBound);
            }
        }

        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Criteria validation errors surfaced at task creation.
#[derive(Debug, Error)]
pub enum CriteriaError {
    /// A required artifact kind is empty.
    #[error("required artifact kind must not be empty")]
    EmptyArtifactKind,
    /// A required artifact kind appears more than once.
    #[error("duplicate required artifact kind: {0}")]
    DuplicateArtifactKind(String),
    /// A value-bearing predicate has no expected value.
    #[error("predicate for kind {0} requires an expected value")]
    MissingExpectedValue(String),
    /// A tool expectation has an empty tool name.
    #[error("tool expectation name must not be empty")]
    EmptyToolName,
    /// A tool appears in more than one expectation.
    #[error("duplicate tool expectation: {0}")]
    DuplicateTool(String),
    /// A tool expectation allows fewer invocations than it requires.
    #[error("tool {0} declares max_invocations below min_invocations")]
    InvertedInvocationBounds(String),
    /// Behavior bounds declare a zero maximum duration.
    #[error("behavior bounds declare a zero maximum duration")]
    ZeroDurationBound,
}
