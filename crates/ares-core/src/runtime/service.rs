// ares-core/src/runtime/service.rs
// ============================================================================
// Module: ARES Core Service
// Description: The single canonical execution path for agent reliability.
// Purpose: Drive submission, verification, rollback, scoring, and enforcement.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The core service owns the stores, registries, lock maps, and the event
//! sink. All API surfaces (HTTP, WebSocket, SDKs) must call into these
//! methods to preserve invariance and auditability. Mutations of one task are
//! serialized under that task's lock, reliability updates under the agent's
//! lock, and the task lock is always acquired before the agent lock.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::core::AcceptanceCriteria;
use crate::core::Agent;
use crate::core::AgentId;
use crate::core::AgentRecord;
use crate::core::AgentStatus;
use crate::core::Artifact;
use crate::core::ArtifactId;
use crate::core::ArtifactPayload;
use crate::core::BehaviorSample;
use crate::core::CallValidation;
use crate::core::CriteriaError;
use crate::core::DEFAULT_HASH_ALGORITHM;
use crate::core::EnforcementAction;
use crate::core::Event;
use crate::core::HashAlgorithm;
use crate::core::ReliabilityState;
use crate::core::RestoreOutcome;
use crate::core::RestoreRecord;
use crate::core::Snapshot;
use crate::core::SubScores;
use crate::core::Task;
use crate::core::TaskId;
use crate::core::TaskRecord;
use crate::core::TaskState;
use crate::core::Timestamp;
use crate::core::ToolCallId;
use crate::core::ToolCallOutcome;
use crate::core::ToolCallRecord;
use crate::core::Verdict;
use crate::core::VerdictOutcome;
use crate::core::hashing::HashError;
use crate::interfaces::AgentStore;
use crate::interfaces::EventSink;
use crate::interfaces::StoreError;
use crate::interfaces::TaskStore;
use crate::runtime::behavior::build_sample;
use crate::runtime::config::CoreConfig;
use crate::runtime::coordinator::VerificationInputs;
use crate::runtime::coordinator::run_verification;
use crate::runtime::enforcement::apply_actions;
use crate::runtime::enforcement::plan_actions;
use crate::runtime::locks::LockRegistry;
use crate::runtime::rollback::RestoreHandlerRegistry;
use crate::runtime::rollback::drive_restore;
use crate::runtime::scorer::apply_verdict;
use crate::runtime::schemas::ToolSchemaRegistry;
use crate::runtime::tool_calls::validate_call;

// ============================================================================
// SECTION: Inputs
// ============================================================================

/// Client-supplied fields for a new tool-call record.
///
/// The core fills in the task binding and the structural validation verdict.
#[derive(Debug, Clone)]
pub struct NewToolCall {
    /// Tool-call identifier chosen by the client for idempotency.
    pub id: ToolCallId,
    /// Invoked tool name.
    pub tool_name: String,
    /// Structured arguments reported for the invocation.
    pub arguments: Value,
    /// Terminal outcome reported for the invocation, if any.
    pub outcome: Option<ToolCallOutcome>,
    /// Invocation start timestamp.
    pub started_at: Timestamp,
    /// Invocation finish timestamp.
    pub finished_at: Timestamp,
}

/// Client-supplied fields for a new artifact.
///
/// The core computes the canonical content hash on append.
#[derive(Debug, Clone)]
pub struct NewArtifact {
    /// Artifact identifier chosen by the client for idempotency.
    pub id: ArtifactId,
    /// Artifact kind label.
    pub kind: String,
    /// Artifact payload.
    pub payload: ArtifactPayload,
    /// Submission timestamp.
    pub submitted_at: Timestamp,
}

/// Result of an idempotent append or capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The record was appended.
    Appended,
    /// An identical record already existed; the call was a no-op.
    AlreadyExists,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors surfaced at the core API boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Unknown agent identifier.
    #[error("agent not found: {0}")]
    AgentNotFound(String),
    /// Unknown task identifier.
    #[error("task not found: {0}")]
    TaskNotFound(String),
    /// No verdict exists for the task.
    #[error("verdict not found for task: {0}")]
    VerdictNotFound(String),
    /// Agent name is empty.
    #[error("agent name must not be empty")]
    EmptyAgentName,
    /// Agent name is already registered.
    #[error("agent name already registered: {0}")]
    DuplicateAgentName(String),
    /// Acceptance criteria failed validation.
    #[error(transparent)]
    InvalidCriteria(#[from] CriteriaError),
    /// Criteria reference a tool without a registered schema.
    #[error("no schema registered for tool: {0}")]
    UnregisteredTool(String),
    /// Operation is incompatible with the task's state.
    #[error("operation {operation} not allowed in task state {state}")]
    IllegalTaskState {
        /// Rejected operation name.
        operation: &'static str,
        /// Task state at rejection time.
        state: &'static str,
    },
    /// Operation is incompatible with the agent's status.
    #[error("agent {agent} is {status}")]
    AgentInactive {
        /// Agent identifier.
        agent: String,
        /// Agent status at rejection time.
        status: &'static str,
    },
    /// A snapshot with different content was already captured.
    #[error("snapshot already captured for task: {0}")]
    SnapshotConflict(String),
    /// Store error after bounded retries.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Payload hashing failed.
    #[error(transparent)]
    Hash(#[from] HashError),
    /// A per-entity lock was poisoned by a panicking holder.
    #[error("entity lock poisoned")]
    LockPoisoned,
    /// The core is shutting down and rejects new work.
    #[error("shutting_down")]
    ShuttingDown,
}

// ============================================================================
// SECTION: Core Service
// ============================================================================

/// The ARES core service.
///
/// # Invariants
/// - All task mutations run under the per-task lock; reliability and
///   enforcement updates run under the per-agent lock.
/// - Lock ordering is task before agent, never the reverse.
pub struct Core<T, A, E> {
    /// Immutable runtime configuration.
    config: CoreConfig,
    /// Task aggregate store.
    tasks: T,
    /// Agent aggregate store.
    agents: A,
    /// Event sink receiving every core event.
    events: E,
    /// Tool schema registry populated at startup.
    schemas: ToolSchemaRegistry,
    /// Restore handler registry populated at startup.
    restorers: RestoreHandlerRegistry,
    /// Per-task lock registry.
    task_locks: LockRegistry,
    /// Per-agent lock registry.
    agent_locks: LockRegistry,
    /// Set once by shutdown; new work is rejected afterwards.
    shutting_down: AtomicBool,
    /// Hash algorithm for artifact content hashes.
    hash_algorithm: HashAlgorithm,
}

impl<T, A, E> Core<T, A, E>
where
    T: TaskStore,
    A: AgentStore,
    E: EventSink,
{
    /// Creates the core service from startup-time components.
    #[must_use]
    pub fn new(
        config: CoreConfig,
        tasks: T,
        agents: A,
        events: E,
        schemas: ToolSchemaRegistry,
        restorers: RestoreHandlerRegistry,
    ) -> Self {
        Self {
            config,
            tasks,
            agents,
            events,
            schemas,
            restorers,
            task_locks: LockRegistry::new(),
            agent_locks: LockRegistry::new(),
            shutting_down: AtomicBool::new(false),
            hash_algorithm: DEFAULT_HASH_ALGORITHM,
        }
    }

    /// Returns the immutable runtime configuration.
    #[must_use]
    pub const fn config(&self) -> &CoreConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Submission API
    // ------------------------------------------------------------------

    /// Registers a new agent under a unique name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] when the name is empty or taken, or on store
    /// failure.
    pub fn register_agent(
        &self,
        name: &str,
        capabilities: BTreeSet<String>,
    ) -> Result<Agent, CoreError> {
        self.guard()?;
        if name.is_empty() {
            return Err(CoreError::EmptyAgentName);
        }
        if self.with_retry(|| self.agents.find_by_name(name))?.is_some() {
            return Err(CoreError::DuplicateAgentName(name.to_string()));
        }
        let agent = Agent {
            id: AgentId::generate(),
            name: name.to_string(),
            capabilities,
            status: AgentStatus::Active,
            reliability: ReliabilityState::new(),
        };
        self.with_retry(|| self.agents.save(&AgentRecord::new(agent.clone())))?;
        info!(agent = %agent.id, name = %agent.name, "agent registered");
        Ok(agent)
    }

    /// Creates a task for an agent with immutable acceptance criteria.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] when the agent is missing or inactive, the
    /// criteria are malformed, or a referenced tool has no registered schema.
    pub fn create_task(
        &self,
        agent_id: &AgentId,
        description: &str,
        criteria: AcceptanceCriteria,
        now: Timestamp,
    ) -> Result<Task, CoreError> {
        self.guard()?;
        let agent = self.load_agent(agent_id)?;
        match agent.agent.status {
            AgentStatus::Active | AgentStatus::Throttled => {}
            AgentStatus::Suspended | AgentStatus::Retired => {
                return Err(CoreError::AgentInactive {
                    agent: agent_id.to_string(),
                    status: agent.agent.status.label(),
                });
            }
        }
        criteria.validate()?;
        for tool in &criteria.tools {
            let registered = self.schemas.schema_id(&tool.tool_name);
            if registered != Some(&tool.schema_id) {
                return Err(CoreError::UnregisteredTool(tool.tool_name.clone()));
            }
        }

        let task = Task {
            id: TaskId::generate(),
            agent_id: agent_id.clone(),
            description: description.to_string(),
            criteria,
            state: TaskState::Pending,
            created_at: now,
            updated_at: now,
        };
        self.with_retry(|| self.tasks.save(&TaskRecord::new(task.clone())))?;
        debug!(task = %task.id, agent = %agent_id, "task created");
        Ok(task)
    }

    /// Records a tool invocation, idempotent by tool-call identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] when the task is missing or past the evidence
    /// window, or on store failure.
    pub fn record_tool_call(
        &self,
        task_id: &TaskId,
        call: NewToolCall,
    ) -> Result<AppendOutcome, CoreError> {
        self.guard()?;
        let lock = self.task_locks.entry(task_id.as_str());
        let _held = lock.lock().map_err(|_| CoreError::LockPoisoned)?;

        let mut record = self.load_task(task_id)?;
        Self::require_evidence_window(&record, "record_tool_call")?;
        if record.tool_call(&call.id).is_some() {
            return Ok(AppendOutcome::AlreadyExists);
        }

        let mut pending = Vec::new();
        Self::ensure_in_progress(&mut record, call.finished_at, &mut pending);

        let mut row = ToolCallRecord {
            id: call.id,
            task_id: task_id.clone(),
            tool_name: call.tool_name,
            arguments: call.arguments,
            outcome: call.outcome,
            started_at: call.started_at,
            finished_at: call.finished_at,
            validation: CallValidation::Unchecked,
        };
        row.validation = validate_call(&row, &self.schemas);
        pending.push(Event::ToolCallRecorded {
            task_id: task_id.clone(),
            tool_call_id: row.id.clone(),
            tool_name: row.tool_name.clone(),
            at: row.finished_at,
        });
        record.tool_calls.push(row);

        self.with_retry(|| self.tasks.save(&record))?;
        self.publish_all(pending);
        Ok(AppendOutcome::Appended)
    }

    /// Appends an artifact, idempotent by artifact identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] when the task is missing or past the evidence
    /// window, or on hashing/store failure.
    pub fn append_artifact(
        &self,
        task_id: &TaskId,
        artifact: NewArtifact,
    ) -> Result<AppendOutcome, CoreError> {
        self.guard()?;
        let lock = self.task_locks.entry(task_id.as_str());
        let _held = lock.lock().map_err(|_| CoreError::LockPoisoned)?;

        let mut record = self.load_task(task_id)?;
        Self::require_evidence_window(&record, "append_artifact")?;
        if record.artifact(&artifact.id).is_some() {
            return Ok(AppendOutcome::AlreadyExists);
        }

        let mut pending = Vec::new();
        Self::ensure_in_progress(&mut record, artifact.submitted_at, &mut pending);

        let hash = artifact.payload.content_hash(self.hash_algorithm)?;
        let row = Artifact {
            id: artifact.id,
            task_id: task_id.clone(),
            kind: artifact.kind,
            payload: artifact.payload,
            hash,
            submitted_at: artifact.submitted_at,
        };
        pending.push(Event::ArtifactRecorded {
            task_id: task_id.clone(),
            artifact_id: row.id.clone(),
            kind: row.kind.clone(),
            at: row.submitted_at,
        });
        record.artifacts.push(row);

        self.with_retry(|| self.tasks.save(&record))?;
        self.publish_all(pending);
        Ok(AppendOutcome::Appended)
    }

    /// Captures the pre-task snapshot, at most once per task.
    ///
    /// Re-capturing identical content is an idempotent no-op; differing
    /// content is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SnapshotConflict`] when a different snapshot was
    /// already captured, and [`CoreError`] for missing tasks or store failure.
    pub fn capture_snapshot(
        &self,
        task_id: &TaskId,
        scope: &str,
        opaque_state: Vec<u8>,
        restore_key: &str,
        now: Timestamp,
    ) -> Result<AppendOutcome, CoreError> {
        self.guard()?;
        let lock = self.task_locks.entry(task_id.as_str());
        let _held = lock.lock().map_err(|_| CoreError::LockPoisoned)?;

        let mut record = self.load_task(task_id)?;
        Self::require_evidence_window(&record, "capture_snapshot")?;
        if let Some(existing) = &record.snapshot {
            if existing.scope == scope && existing.opaque_state == opaque_state {
                return Ok(AppendOutcome::AlreadyExists);
            }
            return Err(CoreError::SnapshotConflict(task_id.to_string()));
        }

        let mut pending = Vec::new();
        Self::ensure_in_progress(&mut record, now, &mut pending);
        record.snapshot = Some(Snapshot {
            task_id: task_id.clone(),
            scope: scope.to_string(),
            opaque_state,
            restore_key: restore_key.to_string(),
            captured_at: now,
        });

        self.with_retry(|| self.tasks.save(&record))?;
        self.publish_all(pending);
        Ok(AppendOutcome::Appended)
    }

    /// Marks a task complete and drives verification to a verdict.
    ///
    /// Re-entry on an already-judged task returns the stored verdict.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] when the task is missing, already cancelled, or
    /// on store failure.
    pub fn complete_task(&self, task_id: &TaskId, now: Timestamp) -> Result<Verdict, CoreError> {
        self.guard()?;
        let lock = self.task_locks.entry(task_id.as_str());
        let _held = lock.lock().map_err(|_| CoreError::LockPoisoned)?;

        let mut record = self.load_task(task_id)?;
        if let Some(verdict) = &record.verdict {
            return Ok(verdict.clone());
        }
        match record.task.state {
            TaskState::Pending | TaskState::InProgress => {
                let mut pending = Vec::new();
                Self::ensure_in_progress(&mut record, now, &mut pending);
                Self::transition(&mut record, TaskState::AwaitingVerification, now, &mut pending);
                self.with_retry(|| self.tasks.save(&record))?;
                self.publish_all(pending);
            }
            TaskState::AwaitingVerification => {}
            TaskState::Verified | TaskState::Failed | TaskState::RolledBack => {
                return Err(CoreError::IllegalTaskState {
                    operation: "complete_task",
                    state: record.task.state.label(),
                });
            }
        }
        self.verify_locked(&mut record, now)
    }

    /// Verifies a task awaiting verification; idempotent by task identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IllegalTaskState`] outside
    /// `AwaitingVerification` when no verdict exists yet.
    pub fn verify_task(&self, task_id: &TaskId, now: Timestamp) -> Result<Verdict, CoreError> {
        let lock = self.task_locks.entry(task_id.as_str());
        let _held = lock.lock().map_err(|_| CoreError::LockPoisoned)?;

        let mut record = self.load_task(task_id)?;
        if let Some(verdict) = &record.verdict {
            return Ok(verdict.clone());
        }
        if record.task.state != TaskState::AwaitingVerification {
            return Err(CoreError::IllegalTaskState {
                operation: "verify_task",
                state: record.task.state.label(),
            });
        }
        self.verify_locked(&mut record, now)
    }

    /// Cancels a non-terminal task and drives the rollback path.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IllegalTaskState`] for terminal tasks.
    pub fn cancel_task(
        &self,
        task_id: &TaskId,
        reason: &str,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        self.guard()?;
        let lock = self.task_locks.entry(task_id.as_str());
        let _held = lock.lock().map_err(|_| CoreError::LockPoisoned)?;

        let mut record = self.load_task(task_id)?;
        if record.task.state.is_terminal() {
            return Err(CoreError::IllegalTaskState {
                operation: "cancel_task",
                state: record.task.state.label(),
            });
        }
        self.rollback_locked(&mut record, format!("cancelled:{reason}"), now)
    }

    // ------------------------------------------------------------------
    // Query API
    // ------------------------------------------------------------------

    /// Returns the task row.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TaskNotFound`] for unknown identifiers.
    pub fn get_task(&self, task_id: &TaskId) -> Result<Task, CoreError> {
        Ok(self.load_task(task_id)?.task)
    }

    /// Returns the verdict for a judged task.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::VerdictNotFound`] when the task has no verdict.
    pub fn get_verdict(&self, task_id: &TaskId) -> Result<Verdict, CoreError> {
        self.load_task(task_id)?
            .verdict
            .ok_or_else(|| CoreError::VerdictNotFound(task_id.to_string()))
    }

    /// Returns the agent row.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AgentNotFound`] for unknown identifiers.
    pub fn get_agent(&self, agent_id: &AgentId) -> Result<Agent, CoreError> {
        Ok(self.load_agent(agent_id)?.agent)
    }

    /// Returns the agent's reliability state.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AgentNotFound`] for unknown identifiers.
    pub fn get_reliability(&self, agent_id: &AgentId) -> Result<ReliabilityState, CoreError> {
        Ok(self.load_agent(agent_id)?.agent.reliability)
    }

    /// Lists enforcement actions for an agent, optionally bounded below.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AgentNotFound`] for unknown identifiers.
    pub fn list_enforcement(
        &self,
        agent_id: &AgentId,
        since: Option<Timestamp>,
    ) -> Result<Vec<EnforcementAction>, CoreError> {
        let record = self.load_agent(agent_id)?;
        Ok(record
            .actions
            .into_iter()
            .filter(|action| since.is_none_or(|bound| !action.issued_at.is_before(bound)))
            .collect())
    }

    /// Lists a task's artifacts in append order, for audit queries.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TaskNotFound`] for unknown identifiers.
    pub fn list_artifacts(&self, task_id: &TaskId) -> Result<Vec<Artifact>, CoreError> {
        Ok(self.load_task(task_id)?.artifacts)
    }

    /// Lists a task's tool calls in append order, for audit queries.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TaskNotFound`] for unknown identifiers.
    pub fn list_tool_calls(&self, task_id: &TaskId) -> Result<Vec<ToolCallRecord>, CoreError> {
        Ok(self.load_task(task_id)?.tool_calls)
    }

    /// Returns the full task aggregate, for audit queries.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TaskNotFound`] for unknown identifiers.
    pub fn audit_task(&self, task_id: &TaskId) -> Result<TaskRecord, CoreError> {
        self.load_task(task_id)
    }

    // ------------------------------------------------------------------
    // Operator API
    // ------------------------------------------------------------------

    /// Retires an agent permanently.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AgentNotFound`] for unknown identifiers.
    pub fn retire_agent(&self, agent_id: &AgentId, now: Timestamp) -> Result<(), CoreError> {
        let lock = self.agent_locks.entry(agent_id.as_str());
        let _held = lock.lock().map_err(|_| CoreError::LockPoisoned)?;

        let mut record = self.load_agent(agent_id)?;
        if record.agent.status == AgentStatus::Retired {
            return Ok(());
        }
        record.agent.status = AgentStatus::Retired;
        self.with_retry(|| self.agents.save(&record))?;
        self.events.publish(Event::AgentStatusChanged {
            agent_id: agent_id.clone(),
            status: AgentStatus::Retired,
            at: now,
        });
        Ok(())
    }

    /// Stops accepting new work, drains in-flight verifications up to the
    /// grace period, and rolls back every remaining non-terminal task.
    ///
    /// Returns the number of tasks rolled back. A task whose verification
    /// still holds its lock when the grace expires is skipped and logged;
    /// the host closes the event fabric after this returns.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] on store failure while draining.
    pub fn shutdown(&self, grace_ms: u64, now: Timestamp) -> Result<usize, CoreError> {
        self.shutting_down.store(true, Ordering::SeqCst);
        let deadline = Instant::now() + Duration::from_millis(grace_ms);
        let mut rolled_back = 0_usize;
        for task_id in self.with_retry(|| self.tasks.list_ids())? {
            let lock = self.task_locks.entry(task_id.as_str());
            let Some(_held) = acquire_until(&lock, deadline) else {
                warn!(task = %task_id, "shutdown grace expired before task lock freed");
                continue;
            };
            let mut record = self.load_task(&task_id)?;
            if record.task.state.is_terminal() {
                continue;
            }
            self.rollback_locked(&mut record, "shutdown".to_string(), now)?;
            rolled_back += 1;
        }
        info!(rolled_back, "core shut down");
        Ok(rolled_back)
    }

    // ------------------------------------------------------------------
    // Internal: verification pipeline
    // ------------------------------------------------------------------

    /// Runs verification for a task already holding its lock.
    fn verify_locked(
        &self,
        record: &mut TaskRecord,
        now: Timestamp,
    ) -> Result<Verdict, CoreError> {
        let agent_id = record.task.agent_id.clone();
        let current = build_sample(record, now);

        let verdict = match self.with_retry(|| self.agents.load(&agent_id)) {
            Ok(Some(agent)) => {
                let inputs = VerificationInputs {
                    task_id: record.task.id.clone(),
                    criteria: record.task.criteria.clone(),
                    artifacts: record.artifacts.clone(),
                    tool_calls: record.tool_calls.clone(),
                    history: agent.behavior,
                    current,
                };
                run_verification(inputs, &self.config.verification, now)
            }
            Ok(None) => {
                return Err(CoreError::AgentNotFound(agent_id.to_string()));
            }
            Err(StoreError::Io(reason)) => {
                warn!(task = %record.task.id, reason = %reason, "verification input io failed");
                io_error_verdict(record.task.id.clone(), now)
            }
            Err(err) => return Err(CoreError::Store(err)),
        };

        record.verdict = Some(verdict.clone());
        let next_state = if verdict.outcome.is_pass() {
            TaskState::Verified
        } else {
            TaskState::Failed
        };
        let mut pending = Vec::new();
        Self::transition(record, next_state, now, &mut pending);
        pending.push(Event::VerdictProduced {
            task_id: record.task.id.clone(),
            agent_id: agent_id.clone(),
            outcome: verdict.outcome,
            sub_scores: verdict.sub_scores,
            overall: verdict.overall,
            at: now,
        });
        self.with_retry(|| self.tasks.save(record))?;
        self.publish_all(pending);
        info!(
            task = %record.task.id,
            outcome = verdict.outcome.label(),
            overall = verdict.overall,
            "verdict produced"
        );

        if !verdict.outcome.is_pass() {
            let reason = if record.snapshot.is_some() {
                "verification_failed".to_string()
            } else {
                "no_snapshot".to_string()
            };
            self.rollback_locked(record, reason, now)?;
        }

        self.score_and_enforce(&agent_id, verdict.outcome, current, now)?;
        Ok(verdict)
    }

    /// Drives the rollback path for a task already holding its lock.
    fn rollback_locked(
        &self,
        record: &mut TaskRecord,
        reason: String,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        if record.task.state == TaskState::RolledBack {
            return Ok(());
        }

        let mut pending = Vec::new();
        if let Some(snapshot) = record.snapshot.clone() {
            if record.restore_record.is_none() {
                let deadline_ms = self.config.rollback.restore_deadline_ms;
                let outcome = drive_restore(&snapshot, &self.restorers, deadline_ms);
                let success = outcome.is_success();
                let failure = match &outcome {
                    RestoreOutcome::Restored => None,
                    RestoreOutcome::RestoreFailed(tag) => Some(tag.clone()),
                };
                if let Some(tag) = &failure {
                    warn!(task = %record.task.id, reason = %tag, "snapshot restore failed");
                }
                record.restore_record = Some(RestoreRecord {
                    outcome,
                    restored_at: now,
                });
                pending.push(Event::SnapshotRestored {
                    task_id: record.task.id.clone(),
                    success,
                    reason: failure,
                    at: now,
                });
            }
        }

        record.rollback_reason = Some(reason);
        Self::transition(record, TaskState::RolledBack, now, &mut pending);
        self.with_retry(|| self.tasks.save(record))?;
        self.publish_all(pending);
        Ok(())
    }

    /// Applies scoring and enforcement for a verdict under the agent lock.
    fn score_and_enforce(
        &self,
        agent_id: &AgentId,
        outcome: VerdictOutcome,
        sample: BehaviorSample,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        let lock = self.agent_locks.entry(agent_id.as_str());
        let _held = lock.lock().map_err(|_| CoreError::LockPoisoned)?;

        let mut record = self.load_agent(agent_id)?;
        let previous_status = record.agent.status;
        let transition =
            apply_verdict(&mut record.agent.reliability, outcome, now, &self.config.scoring);
        record.behavior.push(sample);

        let planned = plan_actions(
            transition,
            record.agent.reliability.tier,
            outcome,
            &self.config.enforcement,
            now,
        );
        let appended = apply_actions(&mut record, planned, now);
        let new_status = record.agent.status;
        self.with_retry(|| self.agents.save(&record))?;

        for action in appended {
            info!(agent = %agent_id, action = action.kind.label(), "enforcement issued");
            self.events.publish(Event::EnforcementIssued {
                agent_id: agent_id.clone(),
                action,
            });
        }
        if new_status != previous_status {
            self.events.publish(Event::AgentStatusChanged {
                agent_id: agent_id.clone(),
                status: new_status,
                at: now,
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internal: helpers
    // ------------------------------------------------------------------

    /// Rejects new work once shutdown has begun.
    fn guard(&self) -> Result<(), CoreError> {
        if self.shutting_down.load(Ordering::SeqCst) {
            return Err(CoreError::ShuttingDown);
        }
        Ok(())
    }

    /// Loads a task aggregate or fails with `TaskNotFound`.
    fn load_task(&self, task_id: &TaskId) -> Result<TaskRecord, CoreError> {
        self.with_retry(|| self.tasks.load(task_id))?
            .ok_or_else(|| CoreError::TaskNotFound(task_id.to_string()))
    }

    /// Loads an agent aggregate or fails with `AgentNotFound`.
    fn load_agent(&self, agent_id: &AgentId) -> Result<AgentRecord, CoreError> {
        self.with_retry(|| self.agents.load(agent_id))?
            .ok_or_else(|| CoreError::AgentNotFound(agent_id.to_string()))
    }

    /// Retries an I/O-failing store operation with bounded backoff.
    fn with_retry<R>(
        &self,
        mut op: impl FnMut() -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut attempt = 1_u32;
        let mut backoff = self.config.retry.backoff_ms;
        loop {
            match op() {
                Err(StoreError::Io(reason)) if attempt < self.config.retry.attempts => {
                    debug!(attempt, reason = %reason, "transient store io, retrying");
                    thread::sleep(Duration::from_millis(backoff));
                    backoff = backoff.saturating_mul(2);
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Rejects evidence operations outside the Pending/InProgress window.
    fn require_evidence_window(
        record: &TaskRecord,
        operation: &'static str,
    ) -> Result<(), CoreError> {
        match record.task.state {
            TaskState::Pending | TaskState::InProgress => Ok(()),
            state => Err(CoreError::IllegalTaskState {
                operation,
                state: state.label(),
            }),
        }
    }

    /// Advances a pending task to in-progress on first activity.
    fn ensure_in_progress(record: &mut TaskRecord, now: Timestamp, pending: &mut Vec<Event>) {
        if record.task.state == TaskState::Pending {
            Self::transition(record, TaskState::InProgress, now, pending);
        }
    }

    /// Applies a legal state transition and stages its event.
    ///
    /// Illegal transitions are programmer errors caught upstream by the
    /// operation guards; they are ignored here rather than panicking.
    fn transition(
        record: &mut TaskRecord,
        to: TaskState,
        now: Timestamp,
        pending: &mut Vec<Event>,
    ) {
        let from = record.task.state;
        if !from.can_transition(to) {
            return;
        }
        record.task.state = to;
        record.task.updated_at = now;
        pending.push(Event::TaskStateChanged {
            task_id: record.task.id.clone(),
            agent_id: record.task.agent_id.clone(),
            from,
            to,
            at: now,
        });
    }

    /// Publishes staged events in causal order.
    fn publish_all(&self, events: Vec<Event>) {
        for event in events {
            self.events.publish(event);
        }
    }
}

// ============================================================================
// SECTION: Helper Functions
// ============================================================================

/// Tries to take an entity lock until the deadline, polling between tries.
///
/// Returns `None` when the deadline passes first or the lock is poisoned.
fn acquire_until(
    lock: &std::sync::Mutex<()>,
    deadline: Instant,
) -> Option<std::sync::MutexGuard<'_, ()>> {
    loop {
        match lock.try_lock() {
            Ok(guard) => return Some(guard),
            Err(std::sync::TryLockError::WouldBlock) => {
                if Instant::now() >= deadline {
                    return None;
                }
                thread::sleep(Duration::from_millis(10));
            }
            Err(std::sync::TryLockError::Poisoned(_)) => return None,
        }
    }
}

/// Builds the failing verdict recorded when store I/O exhausts its retries.
fn io_error_verdict(task_id: TaskId, produced_at: Timestamp) -> Verdict {
    Verdict {
        task_id,
        outcome: VerdictOutcome::Fail,
        sub_scores: SubScores::zeroed(),
        overall: 0.0,
        reasons: vec!["io_error".to_string()],
        produced_at,
    }
}
