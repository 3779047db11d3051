// ares-core/src/runtime/proof.rs
// ============================================================================
// Module: ARES Proof-of-Work Collector
// Description: Evidence-quality scoring over the task's artifact log.
// Purpose: Produce the evidence sub-score and its quality reasons.
// Dependencies: crate::core, crate::runtime::score
// ============================================================================

//! ## Overview
//! The collector inspects evidence structurally, not cryptographically. Each
//! artifact earns three unit marks: presence (non-empty payload),
//! distinctness (hash not seen earlier in the same task), and typing (kind
//! recognized by the criteria). Artifact quality is the mean of the three and
//! the task score is the mean over artifacts, zero when nothing was
//! submitted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::core::AcceptanceCriteria;
use crate::core::Artifact;
use crate::runtime::score::ComponentScore;

// ============================================================================
// SECTION: Evidence Assessment
// ============================================================================

/// Assesses evidence quality over the task's artifacts.
#[must_use]
pub fn assess_evidence(criteria: &AcceptanceCriteria, artifacts: &[Artifact]) -> ComponentScore {
    if artifacts.is_empty() {
        return ComponentScore::new(0.0, vec!["no_artifacts".to_string()]);
    }

    let recognized = criteria.recognized_kinds();
    let mut seen_hashes = BTreeSet::new();
    let mut reasons = Vec::new();
    let mut quality_sum = 0.0_f64;

    for artifact in artifacts {
        let presence = if artifact.payload.is_empty() {
            reasons.push(format!("empty_payload:{}", artifact.id));
            0.0
        } else {
            1.0
        };

        let distinct = if seen_hashes.insert(artifact.hash.value.clone()) {
            1.0
        } else {
            reasons.push(format!("duplicate_hash:{}", artifact.id));
            0.0
        };

        let typed = if recognized.contains(artifact.kind.as_str()) {
            1.0
        } else {
            reasons.push(format!("unknown_kind:{}", artifact.id));
            0.0
        };

        quality_sum += (presence + distinct + typed) / 3.0;
    }

    #[allow(
        clippy::cast_precision_loss,
        reason = "Artifact counts are far below the f64 integer bound."
    )]
    let raw = quality_sum / artifacts.len() as f64;
    ComponentScore::new(raw, reasons)
}
