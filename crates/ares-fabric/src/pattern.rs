// ares-fabric/src/pattern.rs
// ============================================================================
// Module: ARES Topic Patterns
// Description: Subscription patterns over task, agent, and system topics.
// Purpose: Select which published topics a subscriber receives.
// Dependencies: ares-core, serde
// ============================================================================

//! ## Overview
//! Subscribers declare a topic pattern at subscription time. The grammar is
//! small and closed: `*` (everything), `system`, `task:*`, `task:<id>`,
//! `agent:*`, and `agent:<id>`. Matching is exact string semantics over the
//! canonical topic rendering; there is no general globbing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use ares_core::AgentId;
use ares_core::TaskId;
use ares_core::Topic;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Patterns
// ============================================================================

/// Subscription pattern over event topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum TopicPattern {
    /// Matches every topic.
    All,
    /// Matches the global system topic.
    System,
    /// Matches every task topic.
    AnyTask,
    /// Matches one task topic.
    Task(TaskId),
    /// Matches every agent topic.
    AnyAgent,
    /// Matches one agent topic.
    Agent(AgentId),
}

impl TopicPattern {
    /// Returns true when the pattern selects the topic.
    #[must_use]
    pub fn matches(&self, topic: &Topic) -> bool {
        match (self, topic) {
            (Self::All, _)
            | (Self::System, Topic::System)
            | (Self::AnyTask, Topic::Task(_))
            | (Self::AnyAgent, Topic::Agent(_)) => true,
            (Self::Task(want), Topic::Task(have)) => want == have,
            (Self::Agent(want), Topic::Agent(have)) => want == have,
            _ => false,
        }
    }
}

impl fmt::Display for TopicPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("*"),
            Self::System => f.write_str("system"),
            Self::AnyTask => f.write_str("task:*"),
            Self::Task(id) => write!(f, "task:{id}"),
            Self::AnyAgent => f.write_str("agent:*"),
            Self::Agent(id) => write!(f, "agent:{id}"),
        }
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Topic pattern parse errors.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The pattern text is not part of the grammar.
    #[error("invalid topic pattern: {0}")]
    Invalid(String),
}

impl FromStr for TopicPattern {
    type Err = PatternError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "*" => Ok(Self::All),
            "system" => Ok(Self::System),
            "task:*" => Ok(Self::AnyTask),
            "agent:*" => Ok(Self::AnyAgent),
            _ => {
                if let Some(id) = text.strip_prefix("task:") {
                    if id.is_empty() {
                        return Err(PatternError::Invalid(text.to_string()));
                    }
                    return Ok(Self::Task(TaskId::new(id)));
                }
                if let Some(id) = text.strip_prefix("agent:") {
                    if id.is_empty() {
                        return Err(PatternError::Invalid(text.to_string()));
                    }
                    return Ok(Self::Agent(AgentId::new(id)));
                }
                Err(PatternError::Invalid(text.to_string()))
            }
        }
    }
}
