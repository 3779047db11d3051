// ares-core/src/runtime/schemas.rs
// ============================================================================
// Module: ARES Tool Schema Registry
// Description: Startup-registered JSON schemas for tool arguments.
// Purpose: Validate recorded tool-call arguments against compiled schemas.
// Dependencies: jsonschema, serde_json
// ============================================================================

//! ## Overview
//! Tool schemas are registered once at startup into an explicit registry
//! keyed by tool name; there are no import-time side effects. Schemas are
//! compiled to validators at registration so a malformed schema fails the
//! startup path instead of a verification. Validation is draft 2020-12 and
//! fails closed: a tool without a registered schema never validates.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

use crate::core::SchemaId;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Tool schema registration errors.
#[derive(Debug, Error)]
pub enum SchemaRegistryError {
    /// The schema document failed to compile.
    #[error("invalid schema for tool {tool}: {reason}")]
    InvalidSchema {
        /// Tool name the schema was registered for.
        tool: String,
        /// Compiler-reported reason.
        reason: String,
    },
    /// A schema is already registered for the tool.
    #[error("schema already registered for tool {0}")]
    AlreadyRegistered(String),
}

// ============================================================================
// SECTION: Registry Entries
// ============================================================================

/// One compiled tool schema.
struct ToolSchema {
    /// Schema identifier declared at registration.
    schema_id: SchemaId,
    /// Compiled validator for the tool's arguments.
    validator: Arc<Validator>,
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Registry of compiled tool argument schemas, keyed by tool name.
#[derive(Default)]
pub struct ToolSchemaRegistry {
    /// Compiled schemas by tool name.
    schemas: BTreeMap<String, ToolSchema>,
}

impl ToolSchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers and compiles a schema for a tool.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaRegistryError`] when the tool already has a schema or
    /// when the schema document does not compile.
    pub fn register(
        &mut self,
        tool_name: impl Into<String>,
        schema_id: SchemaId,
        schema: &Value,
    ) -> Result<(), SchemaRegistryError> {
        let tool_name = tool_name.into();
        if self.schemas.contains_key(&tool_name) {
            return Err(SchemaRegistryError::AlreadyRegistered(tool_name));
        }
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(schema)
            .map_err(|err| SchemaRegistryError::InvalidSchema {
                tool: tool_name.clone(),
                reason: err.to_string(),
            })?;
        self.schemas.insert(tool_name, ToolSchema {
            schema_id,
            validator: Arc::new(validator),
        });
        Ok(())
    }

    /// Returns true when a schema is registered for the tool.
    #[must_use]
    pub fn contains(&self, tool_name: &str) -> bool {
        self.schemas.contains_key(tool_name)
    }

    /// Returns the schema identifier registered for the tool, if any.
    #[must_use]
    pub fn schema_id(&self, tool_name: &str) -> Option<&SchemaId> {
        self.schemas.get(tool_name).map(|schema| &schema.schema_id)
    }

    /// Checks tool arguments against the registered schema.
    #[must_use]
    pub fn check_arguments(&self, tool_name: &str, arguments: &Value) -> ArgumentCheck {
        let Some(schema) = self.schemas.get(tool_name) else {
            return ArgumentCheck::Unregistered;
        };
        match schema.validator.validate(arguments) {
            Ok(()) => ArgumentCheck::Valid,
            Err(err) => ArgumentCheck::Mismatch(err.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Check Results
// ============================================================================

/// Result of checking tool arguments against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentCheck {
    /// The arguments match the registered schema.
    Valid,
    /// The arguments do not match; the first failure is rendered as text.
    Mismatch(String),
    /// No schema is registered for the tool.
    Unregistered,
}
