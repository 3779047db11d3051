// ares-core/src/runtime/score.rs
// ============================================================================
// Module: ARES Score Primitives
// Description: Shared component-score type and numeric policy helpers.
// Purpose: Keep validator outputs uniform and numerically stable.
// Dependencies: (none)
// ============================================================================

//! ## Overview
//! Every validator returns a [`ComponentScore`]: a score in `[0, 1]` plus an
//! ordered list of stable reason tags. Scores are rounded to four decimal
//! places so recomputation over equal inputs is bit-for-bit identical.

// ============================================================================
// SECTION: Component Scores
// ============================================================================

/// Output of one validator for one task.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentScore {
    /// Score in `[0, 1]`, rounded to four decimal places.
    pub score: f64,
    /// Ordered stable reason tags.
    pub reasons: Vec<String>,
}

impl ComponentScore {
    /// Creates a component score, clamping and rounding the raw value.
    #[must_use]
    pub fn new(raw: f64, reasons: Vec<String>) -> Self {
        Self {
            score: round_score(clamp_unit(raw)),
            reasons,
        }
    }

    /// Creates a perfect score with the provided reasons.
    #[must_use]
    pub const fn perfect(reasons: Vec<String>) -> Self {
        Self {
            score: 1.0,
            reasons,
        }
    }
}

// ============================================================================
// SECTION: Numeric Policy
// ============================================================================

/// Clamps a raw score into the unit interval.
#[must_use]
pub fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Rounds a score to four decimal places for recomputation stability.
#[must_use]
pub fn round_score(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
