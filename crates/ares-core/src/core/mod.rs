// ares-core/src/core/mod.rs
// ============================================================================
// Module: ARES Core Types
// Description: Canonical ARES data model and audit-log structures.
// Purpose: Provide stable, serializable types for agents, tasks, and verdicts.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! ARES core types define agents, tasks, acceptance criteria, evidence,
//! snapshots, verdicts, reliability state, enforcement actions, and fabric
//! events. These types are the canonical source of truth for any derived API
//! surfaces (HTTP, WebSocket, or SDKs).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod agent;
pub mod criteria;
pub mod enforcement;
pub mod event;
pub mod evidence;
pub mod hashing;
pub mod identifiers;
pub mod reliability;
pub mod snapshot;
pub mod task;
pub mod time;
pub mod verdict;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use agent::Agent;
pub use agent::AgentRecord;
pub use agent::AgentStatus;
pub use agent::BEHAVIOR_WINDOW;
pub use agent::BehaviorSample;
pub use agent::BehaviorWindow;
pub use criteria::AcceptanceCriteria;
pub use criteria::ArtifactPredicate;
pub use criteria::ArtifactRequirement;
pub use criteria::BehaviorBounds;
pub use criteria::CriteriaError;
pub use criteria::PredicateComparator;
pub use criteria::ToolExpectation;
pub use enforcement::EnforcementAction;
pub use enforcement::EnforcementKind;
pub use event::Event;
pub use event::Topic;
pub use evidence::Artifact;
pub use evidence::ArtifactPayload;
pub use evidence::CallValidation;
pub use evidence::RETRY_ARTIFACT_KIND;
pub use evidence::ToolCallOutcome;
pub use evidence::ToolCallRecord;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use identifiers::AgentId;
pub use identifiers::ArtifactId;
pub use identifiers::SchemaId;
pub use identifiers::TaskId;
pub use identifiers::ToolCallId;
pub use reliability::RELIABILITY_WINDOW;
pub use reliability::RecentOutcome;
pub use reliability::ReliabilityState;
pub use reliability::ReliabilityTier;
pub use snapshot::RestoreOutcome;
pub use snapshot::RestoreRecord;
pub use snapshot::Snapshot;
pub use task::Task;
pub use task::TaskRecord;
pub use task::TaskState;
pub use time::Timestamp;
pub use verdict::SubScores;
pub use verdict::Verdict;
pub use verdict::VerdictOutcome;
