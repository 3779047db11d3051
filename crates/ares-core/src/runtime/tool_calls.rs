// ares-core/src/runtime/tool_calls.rs
// ============================================================================
// Module: ARES Tool-Call Validator
// Description: Structural per-call validation and per-task usage aggregation.
// Purpose: Produce the tool-usage sub-score and its violation reasons.
// Dependencies: crate::core, crate::runtime::{schemas, score}
// ============================================================================

//! ## Overview
//! Tool calls are validated structurally when they are recorded: arguments
//! must match the tool's registered schema, a result or error must be
//! present, and the finish time must not precede the start time. Per-task
//! aggregation then scores valid, expected usage against everything recorded
//! plus every missing required tool. Over-invocation and disallowed tools
//! count as invalid instead of shrinking the denominator.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::AcceptanceCriteria;
use crate::core::CallValidation;
use crate::core::ToolCallRecord;
use crate::runtime::schemas::ArgumentCheck;
use crate::runtime::schemas::ToolSchemaRegistry;
use crate::runtime::score::ComponentScore;

// ============================================================================
// SECTION: Per-Call Validation
// ============================================================================

/// Validates one recorded call structurally.
///
/// Checks run in a fixed order and the first failure wins: schema match,
/// outcome presence, then timestamp ordering.
#[must_use]
pub fn validate_call(call: &ToolCallRecord, schemas: &ToolSchemaRegistry) -> CallValidation {
    match schemas.check_arguments(&call.tool_name, &call.arguments) {
        ArgumentCheck::Unregistered => {
            return CallValidation::Invalid(format!("unregistered_tool:{}", call.tool_name));
        }
        ArgumentCheck::Mismatch(_) => {
            return CallValidation::Invalid("schema_mismatch".to_string());
        }
        ArgumentCheck::Valid => {}
    }
    if call.outcome.is_none() {
        return CallValidation::Invalid("missing_outcome".to_string());
    }
    if call.finished_at.millis_since(call.started_at).is_none() {
        return CallValidation::Invalid("finished_before_started".to_string());
    }
    CallValidation::Valid
}

// ============================================================================
// SECTION: Per-Task Aggregation
// ============================================================================

/// Assesses recorded tool usage against the criteria's expectations.
#[must_use]
pub fn assess_tool_usage(
    criteria: &AcceptanceCriteria,
    calls: &[ToolCallRecord],
) -> ComponentScore {
    let mut reasons = Vec::new();

    // Valid-call counts per allowed tool, in call order.
    let mut valid_counts: BTreeMap<&str, u32> = BTreeMap::new();
    for call in calls {
        if !criteria.allows_tool(&call.tool_name) {
            reasons.push(format!("disallowed_tool:{}", call.tool_name));
            continue;
        }
        match &call.validation {
            CallValidation::Valid => {
                *valid_counts.entry(call.tool_name.as_str()).or_insert(0) += 1;
            }
            CallValidation::Invalid(reason) => {
                reasons.push(format!("invalid_call:{}:{reason}", call.tool_name));
            }
            CallValidation::Unchecked => {
                reasons.push(format!("unchecked_call:{}", call.tool_name));
            }
        }
    }

    let mut credited = 0_u32;
    let mut missing_required = 0_u32;
    for tool in &criteria.tools {
        let valid = valid_counts.get(tool.tool_name.as_str()).copied().unwrap_or(0);
        let recorded = calls.iter().filter(|call| call.tool_name == tool.tool_name).count();
        let recorded = u32::try_from(recorded).unwrap_or(u32::MAX);
        if recorded < tool.min_invocations {
            missing_required += 1;
            reasons.push(format!("missing_tool:{}", tool.tool_name));
        }
        if valid > tool.max_invocations {
            reasons.push(format!("over_invocation:{}", tool.tool_name));
            credited += tool.max_invocations;
        } else {
            credited += valid;
        }
    }

    let denominator = (calls.len() as u64 + u64::from(missing_required)).max(1);
    #[allow(
        clippy::cast_precision_loss,
        reason = "Call counts are far below the f64 integer bound."
    )]
    let raw = f64::from(credited) / denominator as f64;
    ComponentScore::new(raw, reasons)
}

/// Returns true when any reason marks a disallowed tool invocation.
#[must_use]
pub fn has_disallowed_call(reasons: &[String]) -> bool {
    reasons.iter().any(|reason| reason.starts_with("disallowed_tool:"))
}
