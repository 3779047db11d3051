// ares-core/src/runtime/mod.rs
// ============================================================================
// Module: ARES Runtime
// Description: Validators, coordinator, scorer, enforcement, and the service.
// Purpose: Execute the verification pipeline over the canonical data model.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime hosts the stateless validator functions, the verification
//! coordinator, the rollback coordinator, the reliability scorer, the
//! enforcement engine, and the [`Core`] service that sequences them under the
//! per-task and per-agent locks.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod behavior;
pub mod completion;
pub mod config;
pub mod coordinator;
pub mod enforcement;
pub mod locks;
pub mod proof;
pub mod rollback;
pub mod schemas;
pub mod score;
pub mod scorer;
pub mod service;
pub mod stores;
pub mod tool_calls;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use behavior::assess_behavior;
pub use behavior::build_sample;
pub use completion::assess_completion;
pub use config::CoreConfig;
pub use config::EnforcementConfig;
pub use config::RetryConfig;
pub use config::RollbackConfig;
pub use config::ScoreWeights;
pub use config::ScoringConfig;
pub use config::TierBounds;
pub use config::VerificationConfig;
pub use coordinator::VerificationInputs;
pub use coordinator::run_verification;
pub use enforcement::PlannedAction;
pub use enforcement::apply_actions;
pub use enforcement::plan_actions;
pub use enforcement::project_status;
pub use locks::LockRegistry;
pub use proof::assess_evidence;
pub use rollback::RestoreHandlerRegistry;
pub use rollback::RestoreRegistryError;
pub use rollback::drive_restore;
pub use schemas::ArgumentCheck;
pub use schemas::SchemaRegistryError;
pub use schemas::ToolSchemaRegistry;
pub use score::ComponentScore;
pub use scorer::TierTransition;
pub use scorer::apply_verdict;
pub use scorer::next_tier;
pub use service::AppendOutcome;
pub use service::Core;
pub use service::CoreError;
pub use service::NewArtifact;
pub use service::NewToolCall;
pub use stores::InMemoryAgentStore;
pub use stores::InMemoryTaskStore;
pub use tool_calls::assess_tool_usage;
pub use tool_calls::validate_call;
