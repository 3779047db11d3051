// ares-core/tests/behavior.rs
// ============================================================================
// Module: Behavior Monitor Tests
// Description: Tests for fixed-rule anomaly flags over sliding windows.
// ============================================================================
//! ## Overview
//! Validates the insufficient-history path, the three statistical flags, and
//! the declared-bounds flags.

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

use ares_core::BehaviorBounds;
use ares_core::BehaviorSample;
use ares_core::BehaviorWindow;
use ares_core::runtime::assess_behavior;

/// Builds a sample with the provided duration and counters.
const fn sample(duration_ms: u64, retries: u32, tool_errors: u32, tool_calls: u32) -> BehaviorSample {
    BehaviorSample {
        duration_ms,
        retries,
        tool_errors,
        tool_calls,
    }
}

/// Builds a window holding `count` copies of a steady sample.
fn steady_window(count: usize) -> BehaviorWindow {
    let mut window = BehaviorWindow::default();
    for _ in 0..count {
        window.push(sample(1_000, 0, 0, 4));
    }
    window
}

/// Verifies a short history yields a perfect score with its tag.
#[test]
fn behavior_short_history_scores_one() {
    let result = assess_behavior(&steady_window(3), sample(1_000, 0, 0, 4), None);
    assert!((result.score - 1.0).abs() < f64::EPSILON);
    assert_eq!(result.reasons, vec!["behavior:insufficient_history".to_string()]);
}

/// Verifies short history suppresses every rule, retries included.
#[test]
fn behavior_short_history_suppresses_retry_flag() {
    let mut window = BehaviorWindow::default();
    for _ in 0..3 {
        window.push(sample(1_000, 2, 0, 4));
    }
    // A retry spike that would flag against a full window must not dent the
    // score while the insufficient-history tag is present.
    let result = assess_behavior(&window, sample(1_000, 10, 0, 4), None);
    assert!((result.score - 1.0).abs() < f64::EPSILON);
    assert_eq!(result.reasons, vec!["behavior:insufficient_history".to_string()]);
}

/// Verifies short history suppresses declared-bound flags as well.
#[test]
fn behavior_short_history_suppresses_bound_flags() {
    let bounds = BehaviorBounds {
        max_duration_ms: Some(2_000),
        max_retries: Some(1),
    };
    let result = assess_behavior(&steady_window(3), sample(5_000, 3, 0, 4), Some(bounds));
    assert!((result.score - 1.0).abs() < f64::EPSILON);
    assert_eq!(result.reasons, vec!["behavior:insufficient_history".to_string()]);
}

/// Verifies a steady task raises no flags with enough history.
#[test]
fn behavior_steady_task_raises_no_flags() {
    let result = assess_behavior(&steady_window(20), sample(1_000, 0, 0, 4), None);
    assert!((result.score - 1.0).abs() < f64::EPSILON);
    assert!(result.reasons.is_empty());
}

/// Verifies an outlier duration raises the duration flag.
#[test]
fn behavior_flags_outlier_duration() {
    let mut window = BehaviorWindow::default();
    for step in 0..20_u64 {
        window.push(sample(1_000 + (step % 3) * 10, 0, 0, 4));
    }
    let result = assess_behavior(&window, sample(50_000, 0, 0, 4), None);
    assert!((result.score - 0.75).abs() < f64::EPSILON);
    assert_eq!(result.reasons, vec!["over_duration".to_string()]);
}

/// Verifies retry spikes raise the retry flag once the mean is material.
#[test]
fn behavior_flags_excessive_retries() {
    let mut window = BehaviorWindow::default();
    for _ in 0..20 {
        window.push(sample(1_000, 2, 0, 4));
    }
    let result = assess_behavior(&window, sample(1_000, 5, 0, 4), None);
    assert!((result.score - 0.75).abs() < f64::EPSILON);
    assert_eq!(result.reasons, vec!["excessive_retries".to_string()]);
}

/// Verifies a quiet retry history never raises the retry flag.
#[test]
fn behavior_retry_flag_needs_material_mean() {
    let mut window = BehaviorWindow::default();
    for _ in 0..20 {
        window.push(sample(1_000, 0, 0, 4));
    }
    let result = assess_behavior(&window, sample(1_000, 1, 0, 4), None);
    assert!((result.score - 1.0).abs() < f64::EPSILON);
    assert!(result.reasons.is_empty());
}

/// Verifies an elevated error rate raises the error flag.
#[test]
fn behavior_flags_elevated_error_rate() {
    let result = assess_behavior(&steady_window(20), sample(1_000, 0, 2, 4), None);
    assert!((result.score - 0.75).abs() < f64::EPSILON);
    assert_eq!(result.reasons, vec!["elevated_error_rate".to_string()]);
}

/// Verifies declared bounds add their own flags with enough history.
#[test]
fn behavior_flags_declared_bound_violations() {
    let bounds = BehaviorBounds {
        max_duration_ms: Some(2_000),
        max_retries: Some(1),
    };
    let result = assess_behavior(&steady_window(20), sample(1_000, 3, 0, 4), Some(bounds));
    assert!((result.score - 0.75).abs() < f64::EPSILON);
    assert_eq!(result.reasons, vec!["retry_bound_exceeded".to_string()]);
}

/// Verifies an exceeded duration bound is flagged independently.
#[test]
fn behavior_flags_duration_bound_violation() {
    let mut window = BehaviorWindow::default();
    for step in 0..20_u64 {
        window.push(sample(1_800 + (step % 5) * 100, 0, 0, 4));
    }
    let bounds = BehaviorBounds {
        max_duration_ms: Some(2_300),
        max_retries: None,
    };
    let result = assess_behavior(&window, sample(2_400, 0, 0, 4), Some(bounds));
    assert!((result.score - 0.75).abs() < f64::EPSILON);
    assert_eq!(result.reasons, vec!["duration_bound_exceeded".to_string()]);
}

/// Verifies the score clamps at zero under many flags.
#[test]
fn behavior_score_clamps_at_zero() {
    let mut window = BehaviorWindow::default();
    for _ in 0..20 {
        window.push(sample(1_000, 2, 0, 4));
    }
    let bounds = BehaviorBounds {
        max_duration_ms: Some(1_500),
        max_retries: Some(1),
    };
    let result = assess_behavior(&window, sample(90_000, 20, 4, 4), Some(bounds));
    assert!(result.score.abs() < f64::EPSILON);
}
