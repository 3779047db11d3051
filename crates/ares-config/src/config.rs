// ares-config/src/config.rs
// ============================================================================
// Module: ARES Configuration
// Description: Configuration loading and validation for ARES.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: ares-core, ares-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size limits. The
//! scoring weights, thresholds, smoothing factor, and tier boundaries are
//! immutable startup configuration: they are validated here once and never
//! mutated at runtime. Missing or invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use ares_core::CoreConfig;
use ares_core::ScoreWeights;
use ares_core::TierBounds;
use ares_store_sqlite::SqliteStoreConfig;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "ares.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "ARES_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Tolerance when checking that score weights sum to one.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;
/// Default per-subscription queue capacity for the event fabric.
const DEFAULT_FABRIC_CAPACITY: usize = 256;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Config file exceeds the size limit.
    #[error("config file too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual file size in bytes.
        actual_bytes: usize,
    },
    /// Config file failed to parse as TOML.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Config values failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Fabric Settings
// ============================================================================

/// Event fabric defaults exposed to hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricConfig {
    /// Default per-subscription queue capacity.
    pub default_capacity: usize,
}

impl Default for FabricConfig {
    fn default() -> Self {
        Self {
            default_capacity: DEFAULT_FABRIC_CAPACITY,
        }
    }
}

// ============================================================================
// SECTION: Configuration Model
// ============================================================================

/// Canonical `ares.toml` configuration model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AresConfig {
    /// Core pipeline constants.
    #[serde(default)]
    pub core: CoreConfig,
    /// Durable store settings.
    pub store: SqliteStoreConfig,
    /// Event fabric defaults.
    #[serde(default)]
    pub fabric: FabricConfig,
}

impl AresConfig {
    /// Builds an in-memory default config rooted at the provided store path.
    #[must_use]
    pub fn with_store_path(path: impl Into<PathBuf>) -> Self {
        Self {
            core: CoreConfig::default(),
            store: SqliteStoreConfig::for_path(path),
            fabric: FabricConfig::default(),
        }
    }

    /// Loads configuration from the default path or `ARES_CONFIG`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when reading, parsing, or validation fails.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = env::var(CONFIG_ENV_VAR)
            .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_NAME), PathBuf::from);
        Self::load(&path)
    }

    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when reading, parsing, or validation fails.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let metadata = fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        let actual_bytes = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if actual_bytes > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::TooLarge {
                max_bytes: MAX_CONFIG_FILE_SIZE,
                actual_bytes,
            });
        }
        let text = fs::read_to_string(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        Self::parse(&text)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every configured value, failing closed on the first issue.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_weights(&self.core.verification.weights)?;
        validate_unit_threshold("verification.pass_threshold", self.core.verification.pass_threshold)?;
        validate_unit_threshold("verification.completion_gate", self.core.verification.completion_gate)?;
        require_nonzero("verification.deadline_ms", self.core.verification.deadline_ms)?;

        let alpha = self.core.scoring.ewma_alpha;
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "scoring.ewma_alpha must be in (0, 1), got {alpha}"
            )));
        }
        validate_tier_bounds(&self.core.scoring.tiers)?;

        let rate = self.core.enforcement.throttle_rate;
        if !(rate > 0.0 && rate <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "enforcement.throttle_rate must be in (0, 1], got {rate}"
            )));
        }
        require_nonzero("enforcement.throttle_duration_ms", self.core.enforcement.throttle_duration_ms)?;
        require_nonzero("enforcement.suspend_duration_ms", self.core.enforcement.suspend_duration_ms)?;
        require_nonzero("rollback.restore_deadline_ms", self.core.rollback.restore_deadline_ms)?;

        if self.core.retry.attempts == 0 {
            return Err(ConfigError::Invalid("retry.attempts must be at least 1".to_string()));
        }
        if self.fabric.default_capacity == 0 {
            return Err(ConfigError::Invalid(
                "fabric.default_capacity must be at least 1".to_string(),
            ));
        }
        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store.path must not be empty".to_string()));
        }
        if self.store.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "store.busy_timeout_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Validates the verification score weights.
fn validate_weights(weights: &ScoreWeights) -> Result<(), ConfigError> {
    for (name, value) in [
        ("verification.weights.completion", weights.completion),
        ("verification.weights.tool_usage", weights.tool_usage),
        ("verification.weights.evidence", weights.evidence),
        ("verification.weights.behavior", weights.behavior),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::Invalid(format!("{name} must be in [0, 1], got {value}")));
        }
    }
    let sum = weights.completion + weights.tool_usage + weights.evidence + weights.behavior;
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ConfigError::Invalid(format!(
            "verification.weights must sum to 1.0, got {sum}"
        )));
    }
    Ok(())
}

/// Validates a threshold lies in the half-open unit interval.
fn validate_unit_threshold(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(ConfigError::Invalid(format!("{name} must be in (0, 1], got {value}")));
    }
    Ok(())
}

/// Rejects zero durations.
fn require_nonzero(name: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid(format!("{name} must be at least 1")));
    }
    Ok(())
}

/// Validates tier boundary ordering.
fn validate_tier_bounds(bounds: &TierBounds) -> Result<(), ConfigError> {
    if !(bounds.probation_score > 0.0
        && bounds.probation_score < bounds.watch_score
        && bounds.watch_score < bounds.good_score
        && bounds.good_score <= 1.0)
    {
        return Err(ConfigError::Invalid(
            "tier scores must satisfy 0 < probation < watch < good <= 1".to_string(),
        ));
    }
    if !(bounds.watch_failures <= bounds.probation_failures
        && bounds.probation_failures <= bounds.quarantine_failures
        && bounds.quarantine_failures >= 1)
    {
        return Err(ConfigError::Invalid(
            "tier failure bounds must satisfy watch <= probation <= quarantine >= 1".to_string(),
        ));
    }
    if !(bounds.quarantine_exit_score > 0.0 && bounds.quarantine_exit_score <= 1.0) {
        return Err(ConfigError::Invalid(
            "tiers.quarantine_exit_score must be in (0, 1]".to_string(),
        ));
    }
    if bounds.quarantine_exit_successes == 0 {
        return Err(ConfigError::Invalid(
            "tiers.quarantine_exit_successes must be at least 1".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// SECTION: Config Artifacts
// ============================================================================

/// Returns the canonical example `ares.toml` kept in sync by tests.
#[must_use]
pub fn config_toml_example() -> String {
    concat!(
        "# ARES configuration\n",
        "\n",
        "[store]\n",
        "path = \"ares.db\"\n",
        "busy_timeout_ms = 5000\n",
        "journal_mode = \"wal\"\n",
        "sync_mode = \"full\"\n",
        "\n",
        "[fabric]\n",
        "default_capacity = 256\n",
        "\n",
        "[core.verification]\n",
        "pass_threshold = 0.75\n",
        "completion_gate = 0.8\n",
        "deadline_ms = 30000\n",
        "\n",
        "[core.verification.weights]\n",
        "completion = 0.4\n",
        "tool_usage = 0.3\n",
        "evidence = 0.2\n",
        "behavior = 0.1\n",
        "\n",
        "[core.scoring]\n",
        "ewma_alpha = 0.1\n",
        "\n",
        "[core.scoring.tiers]\n",
        "good_score = 0.9\n",
        "watch_score = 0.75\n",
        "probation_score = 0.5\n",
        "watch_failures = 2\n",
        "probation_failures = 3\n",
        "quarantine_failures = 5\n",
        "quarantine_exit_score = 0.6\n",
        "quarantine_exit_successes = 5\n",
        "\n",
        "[core.enforcement]\n",
        "throttle_rate = 0.5\n",
        "throttle_duration_ms = 3600000\n",
        "suspend_duration_ms = 86400000\n",
        "\n",
        "[core.rollback]\n",
        "restore_deadline_ms = 60000\n",
        "\n",
        "[core.retry]\n",
        "attempts = 3\n",
        "backoff_ms = 50\n",
    )
    .to_string()
}
