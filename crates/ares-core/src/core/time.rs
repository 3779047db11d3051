// ares-core/src/core/time.rs
// ============================================================================
// Module: ARES Time Model
// Description: Canonical timestamp representations for tasks and audit logs.
// Purpose: Provide deterministic, replayable time values across ARES records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! ARES records explicit time values supplied by hosts so verification and
//! scoring replay deterministically. The core never reads wall-clock time for
//! recorded state; operational deadlines are measured with monotonic elapsed
//! time that never enters audit records.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp used in ARES records and events.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads wall-clock time.
/// - Monotonicity within a task is a caller responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Timestamp {
    /// Unix epoch milliseconds.
    UnixMillis(i64),
    /// Monotonic logical time value.
    Logical(u64),
}

impl Timestamp {
    /// Returns the timestamp as unix milliseconds when available.
    #[must_use]
    pub const fn as_unix_millis(&self) -> Option<i64> {
        match self {
            Self::UnixMillis(value) => Some(*value),
            Self::Logical(_) => None,
        }
    }

    /// Returns the timestamp as logical time when available.
    #[must_use]
    pub const fn as_logical(&self) -> Option<u64> {
        match self {
            Self::UnixMillis(_) => None,
            Self::Logical(value) => Some(*value),
        }
    }

    /// Returns the non-negative distance from `earlier` to `self` in the
    /// shared unit of both timestamps.
    ///
    /// Returns `None` when the timestamps use different representations or
    /// when `earlier` is later than `self`.
    #[must_use]
    pub const fn millis_since(&self, earlier: Self) -> Option<u64> {
        match (earlier, *self) {
            (Self::UnixMillis(start), Self::UnixMillis(end)) => match end.checked_sub(start) {
                Some(delta) if delta >= 0 => Some(delta.unsigned_abs()),
                _ => None,
            },
            (Self::Logical(start), Self::Logical(end)) => {
                if end >= start { Some(end - start) } else { None }
            }
            _ => None,
        }
    }

    /// Returns a timestamp advanced by `millis` in the same representation.
    #[must_use]
    pub fn plus_millis(&self, millis: u64) -> Self {
        match self {
            Self::UnixMillis(value) => {
                Self::UnixMillis(value.saturating_add(i64::try_from(millis).unwrap_or(i64::MAX)))
            }
            Self::Logical(value) => Self::Logical(value.saturating_add(millis)),
        }
    }

    /// Returns true when `self` is strictly before `other`.
    ///
    /// Mixed representations compare `UnixMillis` before `Logical` so ordering
    /// stays total and deterministic.
    #[must_use]
    pub fn is_before(&self, other: Self) -> bool {
        *self < other
    }
}
