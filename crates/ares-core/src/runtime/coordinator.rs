// ares-core/src/runtime/coordinator.rs
// ============================================================================
// Module: ARES Verification Coordinator
// Description: Parallel validator execution and verdict aggregation.
// Purpose: Produce exactly one deterministic verdict per verified task.
// Dependencies: crate::core, crate::runtime
// ============================================================================

//! ## Overview
//! The coordinator runs the four validators in parallel on OS threads; they
//! share no mutable state for a given task, so each thread receives the same
//! immutable input snapshot. A soft deadline bounds the wait: on expiry the
//! coordinator produces a failing verdict tagged `verification_timeout` and
//! discards late results. Aggregation weights, thresholds, and the reason
//! ordering (completion, tool usage, evidence, behavior) are fixed at
//! startup, so equal inputs yield bit-for-bit equal verdicts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use crate::core::AcceptanceCriteria;
use crate::core::Artifact;
use crate::core::BehaviorSample;
use crate::core::BehaviorWindow;
use crate::core::SubScores;
use crate::core::TaskId;
use crate::core::Timestamp;
use crate::core::ToolCallRecord;
use crate::core::Verdict;
use crate::core::VerdictOutcome;
use crate::runtime::behavior::assess_behavior;
use crate::runtime::completion::assess_completion;
use crate::runtime::config::VerificationConfig;
use crate::runtime::proof::assess_evidence;
use crate::runtime::score::ComponentScore;
use crate::runtime::score::round_score;
use crate::runtime::tool_calls::assess_tool_usage;
use crate::runtime::tool_calls::has_disallowed_call;

// ============================================================================
// SECTION: Verification Inputs
// ============================================================================

/// Immutable input snapshot for one verification.
///
/// # Invariants
/// - Values are owned; validators never reach back into shared state.
#[derive(Debug, Clone)]
pub struct VerificationInputs {
    /// Task under verification.
    pub task_id: TaskId,
    /// Acceptance criteria declared at creation.
    pub criteria: AcceptanceCriteria,
    /// Artifact log in append order.
    pub artifacts: Vec<Artifact>,
    /// Tool-call log in append order.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Agent behavior window excluding the task under verification.
    pub history: BehaviorWindow,
    /// Behavior sample extracted from the task under verification.
    pub current: BehaviorSample,
}

// ============================================================================
// SECTION: Validator Lanes
// ============================================================================

/// Stable index of each validator lane in reason order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lane {
    /// Completion verifier.
    Completion,
    /// Tool-call validator.
    ToolUsage,
    /// Proof-of-work collector.
    Evidence,
    /// Behavior monitor.
    Behavior,
}

/// Every lane in aggregation order.
const LANES: [Lane; 4] = [Lane::Completion, Lane::ToolUsage, Lane::Evidence, Lane::Behavior];

/// Runs one validator lane over the shared input snapshot.
fn run_lane(lane: Lane, inputs: &VerificationInputs) -> ComponentScore {
    match lane {
        Lane::Completion => assess_completion(&inputs.criteria, &inputs.artifacts),
        Lane::ToolUsage => assess_tool_usage(&inputs.criteria, &inputs.tool_calls),
        Lane::Evidence => assess_evidence(&inputs.criteria, &inputs.artifacts),
        Lane::Behavior => {
            assess_behavior(&inputs.history, inputs.current, inputs.criteria.bounds)
        }
    }
}

// ============================================================================
// SECTION: Verification
// ============================================================================

/// Runs the four validators in parallel and aggregates a verdict.
///
/// The soft deadline bounds the wait for validator results; on expiry a
/// failing verdict tagged `verification_timeout` is produced and late results
/// are discarded.
#[must_use]
pub fn run_verification(
    inputs: VerificationInputs,
    config: &VerificationConfig,
    produced_at: Timestamp,
) -> Verdict {
    let task_id = inputs.task_id.clone();
    let shared = Arc::new(inputs);
    let (sender, receiver) = mpsc::channel::<(usize, ComponentScore)>();

    for (index, lane) in LANES.iter().enumerate() {
        let lane = *lane;
        let inputs = Arc::clone(&shared);
        let sender = sender.clone();
        thread::spawn(move || {
            let score = run_lane(lane, &inputs);
            // A send failure only means the coordinator already timed out.
            let _ = sender.send((index, score));
        });
    }
    drop(sender);

    let deadline = Instant::now() + Duration::from_millis(config.deadline_ms);
    let mut results: [Option<ComponentScore>; 4] = [None, None, None, None];
    let mut collected = 0_usize;
    while collected < LANES.len() {
        let now = Instant::now();
        if now >= deadline {
            return timeout_verdict(task_id, produced_at);
        }
        match receiver.recv_timeout(deadline - now) {
            Ok((index, score)) => {
                if let Some(slot) = results.get_mut(index) {
                    if slot.replace(score).is_none() {
                        collected += 1;
                    }
                }
            }
            Err(_) => {
                return timeout_verdict(task_id, produced_at);
            }
        }
    }

    let [completion, tool_usage, evidence, behavior] = results;
    let Some(completion) = completion else {
        return timeout_verdict(task_id, produced_at);
    };
    let Some(tool_usage) = tool_usage else {
        return timeout_verdict(task_id, produced_at);
    };
    let Some(evidence) = evidence else {
        return timeout_verdict(task_id, produced_at);
    };
    let Some(behavior) = behavior else {
        return timeout_verdict(task_id, produced_at);
    };

    aggregate(task_id, &completion, &tool_usage, &evidence, &behavior, config, produced_at)
}

/// Aggregates component scores into the final verdict.
fn aggregate(
    task_id: TaskId,
    completion: &ComponentScore,
    tool_usage: &ComponentScore,
    evidence: &ComponentScore,
    behavior: &ComponentScore,
    config: &VerificationConfig,
    produced_at: Timestamp,
) -> Verdict {
    let weights = config.weights;
    let overall = round_score(
        weights.completion * completion.score
            + weights.tool_usage * tool_usage.score
            + weights.evidence * evidence.score
            + weights.behavior * behavior.score,
    );

    let disallowed = has_disallowed_call(&tool_usage.reasons);
    let outcome = if overall >= config.pass_threshold
        && completion.score >= config.completion_gate
        && !disallowed
    {
        VerdictOutcome::Pass
    } else {
        VerdictOutcome::Fail
    };

    let mut reasons = Vec::with_capacity(
        completion.reasons.len()
            + tool_usage.reasons.len()
            + evidence.reasons.len()
            + behavior.reasons.len(),
    );
    reasons.extend_from_slice(&completion.reasons);
    reasons.extend_from_slice(&tool_usage.reasons);
    reasons.extend_from_slice(&evidence.reasons);
    reasons.extend_from_slice(&behavior.reasons);

    Verdict {
        task_id,
        outcome,
        sub_scores: SubScores {
            completion: completion.score,
            tool_usage: tool_usage.score,
            evidence: evidence.score,
            behavior: behavior.score,
        },
        overall,
        reasons,
        produced_at,
    }
}

/// Builds the failing verdict produced when the soft deadline expires.
fn timeout_verdict(task_id: TaskId, produced_at: Timestamp) -> Verdict {
    Verdict {
        task_id,
        outcome: VerdictOutcome::Fail,
        sub_scores: SubScores::zeroed(),
        overall: 0.0,
        reasons: vec!["verification_timeout".to_string()],
        produced_at,
    }
}
