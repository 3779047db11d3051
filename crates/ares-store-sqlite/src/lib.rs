// ares-store-sqlite/src/lib.rs
// ============================================================================
// Module: ARES SQLite Store Library
// Description: Durable task and agent aggregate store backed by SQLite.
// Purpose: Persist ARES aggregates with WAL durability and integrity hashes.
// Dependencies: ares-core, rusqlite
// ============================================================================

//! ## Overview
//! `ares-store-sqlite` provides the durable [`ares_core::TaskStore`] and
//! [`ares_core::AgentStore`] implementations. Aggregates are stored as
//! canonical JSON with content hashes verified on load; loads fail closed on
//! corruption. Each save is one transaction, so artifact, tool-call, and
//! enforcement sequences stay atomic with the rows that own them.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteJournalMode;
pub use store::SqliteStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteSyncMode;
