// ares-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Aggregate Store
// Description: Durable TaskStore/AgentStore backed by SQLite WAL.
// Purpose: Persist aggregate snapshots with deterministic serialization.
// Dependencies: ares-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements the durable stores using `SQLite`. Each save writes
//! a canonical JSON snapshot of the aggregate plus its SHA-256 hash in one
//! transaction; loads verify the hash and fail closed on corruption.
//! Insertion order is preserved through stable row identifiers so listing
//! replays aggregates in creation order across restarts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use ares_core::AgentId;
use ares_core::AgentRecord;
use ares_core::AgentStore;
use ares_core::StoreError;
use ares_core::TaskId;
use ares_core::TaskRecord;
use ares_core::TaskStore;
use ares_core::hashing::DEFAULT_HASH_ALGORITHM;
use ares_core::hashing::HashAlgorithm;
use ares_core::hashing::HashDigest;
use ares_core::hashing::canonical_json_bytes;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum aggregate snapshot size accepted by the store.
pub const MAX_RECORD_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` aggregate store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a config with defaults for the provided path.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteJournalMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or hash mismatch.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Store payload exceeded configured size limits.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "record exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed aggregate store with WAL support.
#[derive(Clone)]
pub struct SqliteStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens an `SQLite`-backed aggregate store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Saves one aggregate snapshot in a single transaction.
    fn save_record<R: Serialize>(
        &self,
        table: &str,
        key: &str,
        name: Option<&str>,
        record: &R,
    ) -> Result<(), SqliteStoreError> {
        let bytes = canonical_json_bytes(record)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        if bytes.len() > MAX_RECORD_BYTES {
            return Err(SqliteStoreError::TooLarge {
                max_bytes: MAX_RECORD_BYTES,
                actual_bytes: bytes.len(),
            });
        }
        let hash = DEFAULT_HASH_ALGORITHM.digest_bytes(&bytes);

        let mut guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("store mutex poisoned".to_string()))?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let sql = format!(
            "INSERT INTO {table} (entity_id, entity_name, record_json, record_hash, \
             hash_algorithm, saved_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             ON CONFLICT(entity_id) DO UPDATE SET \
             entity_name = excluded.entity_name, \
             record_json = excluded.record_json, \
             record_hash = excluded.record_hash, \
             hash_algorithm = excluded.hash_algorithm, \
             saved_at = excluded.saved_at"
        );
        let result = tx.execute(
            &sql,
            params![
                key,
                name,
                bytes,
                hash.value,
                hash.algorithm.label(),
                unix_millis()
            ],
        );
        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                return Err(SqliteStoreError::Invalid("entity name already exists".to_string()));
            }
            Err(err) => return Err(SqliteStoreError::Db(err.to_string())),
        }
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        Ok(())
    }

    /// Loads one aggregate snapshot, verifying the stored hash.
    fn load_record<R: DeserializeOwned>(
        &self,
        table: &str,
        key_column: &str,
        key: &str,
    ) -> Result<Option<R>, SqliteStoreError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("store mutex poisoned".to_string()))?;
        let sql = format!(
            "SELECT record_json, record_hash, hash_algorithm FROM {table} WHERE {key_column} = ?1"
        );
        let row = guard
            .query_row(&sql, params![key], |row| {
                let bytes: Vec<u8> = row.get(0)?;
                let hash_value: String = row.get(1)?;
                let hash_algorithm: String = row.get(2)?;
                Ok((bytes, hash_value, hash_algorithm))
            })
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);

        let Some((bytes, hash_value, hash_algorithm)) = row else {
            return Ok(None);
        };
        let Some(algorithm) = HashAlgorithm::from_label(&hash_algorithm) else {
            return Err(SqliteStoreError::Invalid(format!(
                "unsupported hash algorithm: {hash_algorithm}"
            )));
        };
        let stored = HashDigest {
            algorithm,
            value: hash_value,
        };
        if !stored.verify_bytes(&bytes) {
            return Err(SqliteStoreError::Corrupt(format!("hash mismatch for {table} row {key}")));
        }
        let record = serde_json::from_slice(&bytes)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        Ok(Some(record))
    }

    /// Lists entity identifiers in insertion order.
    fn list_keys(&self, table: &str) -> Result<Vec<String>, SqliteStoreError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("store mutex poisoned".to_string()))?;
        let sql = format!("SELECT entity_id FROM {table} ORDER BY rowid");
        let mut statement =
            guard.prepare(&sql).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(params![], |row| row.get::<_, String>(0))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut keys = Vec::new();
        for row in rows {
            keys.push(row.map_err(|err| SqliteStoreError::Db(err.to_string()))?);
        }
        Ok(keys)
    }
}

// ============================================================================
// SECTION: Trait Implementations
// ============================================================================

impl TaskStore for SqliteStore {
    fn load(&self, task_id: &TaskId) -> Result<Option<TaskRecord>, StoreError> {
        self.load_record("tasks", "entity_id", task_id.as_str()).map_err(StoreError::from)
    }

    fn save(&self, record: &TaskRecord) -> Result<(), StoreError> {
        self.save_record("tasks", record.task.id.as_str(), None, record)
            .map_err(StoreError::from)
    }

    fn list_ids(&self) -> Result<Vec<TaskId>, StoreError> {
        Ok(self
            .list_keys("tasks")
            .map_err(StoreError::from)?
            .into_iter()
            .map(TaskId::new)
            .collect())
    }
}

impl AgentStore for SqliteStore {
    fn load(&self, agent_id: &AgentId) -> Result<Option<AgentRecord>, StoreError> {
        self.load_record("agents", "entity_id", agent_id.as_str()).map_err(StoreError::from)
    }

    fn save(&self, record: &AgentRecord) -> Result<(), StoreError> {
        self.save_record(
            "agents",
            record.agent.id.as_str(),
            Some(record.agent.name.as_str()),
            record,
        )
        .map_err(StoreError::from)
    }

    fn find_by_name(&self, name: &str) -> Result<Option<AgentRecord>, StoreError> {
        self.load_record("agents", "entity_name", name).map_err(StoreError::from)
    }

    fn list_ids(&self) -> Result<Vec<AgentId>, StoreError> {
        Ok(self
            .list_keys("agents")
            .map_err(StoreError::from)?
            .into_iter()
            .map(AgentId::new)
            .collect())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Opens an `SQLite` connection with durable defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(connection)
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS tasks (
                    entity_id TEXT NOT NULL PRIMARY KEY,
                    entity_name TEXT,
                    record_json BLOB NOT NULL,
                    record_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL,
                    saved_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS agents (
                    entity_id TEXT NOT NULL PRIMARY KEY,
                    entity_name TEXT,
                    record_json BLOB NOT NULL,
                    record_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL,
                    saved_at INTEGER NOT NULL
                );
                CREATE UNIQUE INDEX IF NOT EXISTS idx_agents_name
                    ON agents (entity_name);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
