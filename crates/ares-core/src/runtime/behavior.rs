// ares-core/src/runtime/behavior.rs
// ============================================================================
// Module: ARES Behavior Monitor
// Description: Fixed-rule anomaly flags over per-agent sliding statistics.
// Purpose: Produce the behavior sub-score for the task under verification.
// Dependencies: crate::core, crate::runtime::score
// ============================================================================

//! ## Overview
//! The behavior monitor compares the task under verification against the
//! agent's sliding window of completed-task samples. Rules are fixed and
//! deterministic; there is no learning. A window below ten samples is
//! insufficient history: the score is exactly one, the only reason is the
//! insufficient-history tag, and no flag of any kind is raised. With enough
//! history, the three statistical rules and the declared bounds from the
//! acceptance criteria each cost a quarter of the score per raised flag.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::BehaviorBounds;
use crate::core::BehaviorSample;
use crate::core::BehaviorWindow;
use crate::core::RETRY_ARTIFACT_KIND;
use crate::core::TaskRecord;
use crate::core::Timestamp;
use crate::core::ToolCallOutcome;
use crate::runtime::score::ComponentScore;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum historical samples before any behavior flag may be raised.
const MIN_HISTORY_SAMPLES: usize = 10;

/// Score penalty per raised flag.
const FLAG_PENALTY: f64 = 0.25;

// ============================================================================
// SECTION: Sample Extraction
// ============================================================================

/// Builds the behavior sample for a task reaching verification.
#[must_use]
pub fn build_sample(record: &TaskRecord, completed_at: Timestamp) -> BehaviorSample {
    let duration_ms = completed_at.millis_since(record.task.created_at).unwrap_or(0);
    let retries = record
        .artifacts
        .iter()
        .filter(|artifact| artifact.kind == RETRY_ARTIFACT_KIND)
        .count();
    let tool_errors = record
        .tool_calls
        .iter()
        .filter(|call| call.outcome.as_ref().is_some_and(ToolCallOutcome::is_error))
        .count();
    BehaviorSample {
        duration_ms,
        retries: u32::try_from(retries).unwrap_or(u32::MAX),
        tool_errors: u32::try_from(tool_errors).unwrap_or(u32::MAX),
        tool_calls: u32::try_from(record.tool_calls.len()).unwrap_or(u32::MAX),
    }
}

// ============================================================================
// SECTION: Behavior Assessment
// ============================================================================

/// Assesses the current sample against the agent's history and the declared
/// bounds.
///
/// Insufficient history is an invariant, not a partial state: below the
/// sample minimum the score is one and every rule is skipped.
#[must_use]
pub fn assess_behavior(
    history: &BehaviorWindow,
    current: BehaviorSample,
    bounds: Option<BehaviorBounds>,
) -> ComponentScore {
    if history.len() < MIN_HISTORY_SAMPLES {
        return ComponentScore::perfect(vec!["behavior:insufficient_history".to_string()]);
    }

    let mut reasons = Vec::new();
    let mut flags = 0_u32;

    let durations: Vec<f64> =
        history.samples.iter().map(|sample| duration_as_f64(sample.duration_ms)).collect();
    let (mean, stddev) = mean_stddev(&durations);
    if duration_as_f64(current.duration_ms) > mean + 3.0 * stddev {
        reasons.push("over_duration".to_string());
        flags += 1;
    }

    let error_rates: Vec<f64> = history.samples.iter().map(BehaviorSample::error_rate).collect();
    let (mean_error, _) = mean_stddev(&error_rates);
    if current.error_rate() > mean_error + 0.2 {
        reasons.push("elevated_error_rate".to_string());
        flags += 1;
    }

    let retries: Vec<f64> =
        history.samples.iter().map(|sample| f64::from(sample.retries)).collect();
    let (mean_retries, _) = mean_stddev(&retries);
    if mean_retries >= 1.0 && f64::from(current.retries) > 2.0 * mean_retries {
        reasons.push("excessive_retries".to_string());
        flags += 1;
    }

    if let Some(bounds) = bounds {
        if bounds.max_duration_ms.is_some_and(|limit| current.duration_ms > limit) {
            reasons.push("duration_bound_exceeded".to_string());
            flags += 1;
        }
        if bounds.max_retries.is_some_and(|limit| current.retries > limit) {
            reasons.push("retry_bound_exceeded".to_string());
            flags += 1;
        }
    }

    ComponentScore::new(1.0 - FLAG_PENALTY * f64::from(flags), reasons)
}

// ============================================================================
// SECTION: Statistics
// ============================================================================

/// Widens a duration to `f64` for statistics.
#[allow(
    clippy::cast_precision_loss,
    reason = "Durations are far below the f64 integer bound."
)]
fn duration_as_f64(duration_ms: u64) -> f64 {
    duration_ms as f64
}

/// Computes the mean and population standard deviation of a series.
fn mean_stddev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    #[allow(
        clippy::cast_precision_loss,
        reason = "Window sizes are far below the f64 integer bound."
    )]
    let len = values.len() as f64;
    let mean = values.iter().sum::<f64>() / len;
    let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / len;
    (mean, variance.sqrt())
}
