// ares-core/src/runtime/completion.rs
// ============================================================================
// Module: ARES Completion Verifier
// Description: Matches submitted artifacts against declared acceptance criteria.
// Purpose: Produce the completion sub-score and its unmet-requirement reasons.
// Dependencies: crate::core, crate::runtime::score
// ============================================================================

//! ## Overview
//! The completion verifier credits each required artifact kind with the first
//! appended artifact that satisfies its predicate; earlier submissions win
//! ties. The score is the credited fraction of required kinds. Optional kinds
//! never lower the score and surface as bonus tags when present. The verifier
//! is a pure function of the criteria and the artifact log.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AcceptanceCriteria;
use crate::core::Artifact;
use crate::core::ArtifactPayload;
use crate::core::ArtifactRequirement;
use crate::runtime::score::ComponentScore;

// ============================================================================
// SECTION: Completion Assessment
// ============================================================================

/// Assesses completion evidence against the acceptance criteria.
#[must_use]
pub fn assess_completion(
    criteria: &AcceptanceCriteria,
    artifacts: &[Artifact],
) -> ComponentScore {
    let mut reasons = Vec::new();

    if criteria.required_artifacts.is_empty() {
        reasons.push("no_requirements".to_string());
        push_bonus_tags(criteria, artifacts, &mut reasons);
        return ComponentScore::perfect(reasons);
    }

    let mut credited = 0_usize;
    for requirement in &criteria.required_artifacts {
        match credit_requirement(requirement, artifacts) {
            Credit::Satisfied => credited += 1,
            Credit::PredicateFailed => {
                reasons.push(format!("predicate_failed:{}", requirement.kind));
            }
            Credit::Missing => {
                reasons.push(format!("missing_artifact:{}", requirement.kind));
            }
        }
    }

    push_bonus_tags(criteria, artifacts, &mut reasons);

    #[allow(
        clippy::cast_precision_loss,
        reason = "Requirement counts are far below the f64 integer bound."
    )]
    let raw = credited as f64 / criteria.required_artifacts.len() as f64;
    ComponentScore::new(raw, reasons)
}

// ============================================================================
// SECTION: Crediting
// ============================================================================

/// Crediting outcome for one required kind.
enum Credit {
    /// An artifact satisfied the requirement.
    Satisfied,
    /// Artifacts of the kind exist but none passed the predicate.
    PredicateFailed,
    /// No artifact of the kind was submitted.
    Missing,
}

/// Finds the first artifact satisfying a requirement, in append order.
fn credit_requirement(requirement: &ArtifactRequirement, artifacts: &[Artifact]) -> Credit {
    let mut saw_kind = false;
    for artifact in artifacts {
        if artifact.kind != requirement.kind {
            continue;
        }
        saw_kind = true;
        if requirement_satisfied(requirement, artifact) {
            return Credit::Satisfied;
        }
    }
    if saw_kind { Credit::PredicateFailed } else { Credit::Missing }
}

/// Returns true when an artifact satisfies the requirement's predicate.
///
/// Byte payloads satisfy only predicate-free requirements; structural
/// predicates require a JSON payload.
fn requirement_satisfied(requirement: &ArtifactRequirement, artifact: &Artifact) -> bool {
    match &requirement.predicate {
        None => true,
        Some(predicate) => match &artifact.payload {
            ArtifactPayload::Json(value) => predicate.matches(value),
            ArtifactPayload::Bytes(_) => false,
        },
    }
}

/// Appends bonus tags for optional kinds that were submitted.
fn push_bonus_tags(
    criteria: &AcceptanceCriteria,
    artifacts: &[Artifact],
    reasons: &mut Vec<String>,
) {
    for kind in &criteria.optional_kinds {
        if artifacts.iter().any(|artifact| &artifact.kind == kind) {
            reasons.push(format!("bonus:{kind}"));
        }
    }
}
