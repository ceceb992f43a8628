//! # UI Message Protocol
//!
//! Flat JSON envelopes exchanged with the embedded UI.
//!
//! ### UI -> Host
//!
//! - `{"action": "set-schema", "objectIds": [...], "schema": {"name": "...", ...}}`
//! - `{"action": "clear-schema-all"}`
//! - `{"action": "set-hover", "objectIds": [...]}`
//! - `{"action": "set-select", "objectIds": [...]}`
//!
//! Any other `action` is accepted and ignored.
//!
//! ### Host -> UI
//!
//! - `object-selection`: `{"schemas": [...], "objIds": [...], "existingSchemas": [{"id": "...", "schema": {...}}]}`
//! - `object-schemas`: `[{"name": "...", "objectId": "...", ...}, ...]`

use serde::{Deserialize, Serialize};

use crate::{MapperError, MapperResult, ObjectId, Schema, SchemaAssignment};

/// Event name for selection pushes.
pub const OBJECT_SELECTION_EVENT: &str = "object-selection";

/// Event name for schema log pushes.
pub const OBJECT_SCHEMAS_EVENT: &str = "object-schemas";

/// Largest inbound envelope accepted, in bytes.
pub const MAX_MESSAGE_SIZE: usize = 1_048_576; // 1MB

/// Inbound action envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum InboundAction {
    /// Assign a schema to objects.
    #[serde(rename_all = "camelCase")]
    SetSchema {
        /// Target object IDs.
        object_ids: Vec<String>,
        /// Flattened schema choice.
        schema: SchemaAssignment,
    },
    /// Remove every assignment in the document.
    ClearSchemaAll,
    /// Replace the hover highlight.
    #[serde(rename_all = "camelCase")]
    SetHover {
        /// Objects under the pointer.
        #[serde(default)]
        object_ids: Vec<String>,
    },
    /// Replace the document selection.
    #[serde(rename_all = "camelCase")]
    SetSelect {
        /// Objects to select.
        #[serde(default)]
        object_ids: Vec<String>,
    },
    /// Unrecognized action, ignored.
    #[serde(other)]
    Unknown,
}

impl InboundAction {
    /// Decode an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::Protocol`] if the message is too large and
    /// [`MapperError::Serialization`] if it is not a valid envelope.
    pub fn parse(raw: &str) -> MapperResult<Self> {
        validate_message_size(raw)?;
        serde_json::from_str(raw).map_err(MapperError::Serialization)
    }

    /// Action name as it appears on the wire.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetSchema { .. } => "set-schema",
            Self::ClearSchemaAll => "clear-schema-all",
            Self::SetHover { .. } => "set-hover",
            Self::SetSelect { .. } => "set-select",
            Self::Unknown => "unknown",
        }
    }
}

/// Reject envelopes above [`MAX_MESSAGE_SIZE`].
///
/// # Errors
///
/// Returns [`MapperError::Protocol`] if the message is too large.
pub fn validate_message_size(raw: &str) -> MapperResult<()> {
    if raw.len() > MAX_MESSAGE_SIZE {
        return Err(MapperError::Protocol(format!(
            "message too large (max {MAX_MESSAGE_SIZE} bytes)"
        )));
    }
    Ok(())
}

/// An assignment already stored on a selected object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingSchema {
    /// Object carrying the assignment.
    pub id: ObjectId,
    /// Stored assignment.
    pub schema: SchemaAssignment,
}

/// Everything the UI needs to render the current selection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    /// Schemas every selected object can take.
    #[serde(rename = "schemas")]
    pub viable_schemas: Vec<Schema>,
    /// Selected object IDs in selection order.
    #[serde(rename = "objIds")]
    pub object_ids: Vec<ObjectId>,
    /// Assignments already present on the selection.
    #[serde(rename = "existingSchemas")]
    pub existing_schemas: Vec<ExistingSchema>,
}

/// Host-to-UI event.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    /// Selection changed.
    ObjectSelection(SelectionSnapshot),
    /// Assignments in the document changed.
    ObjectSchemas(Vec<SchemaAssignment>),
}

impl OutboundEvent {
    /// Event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ObjectSelection(_) => OBJECT_SELECTION_EVENT,
            Self::ObjectSchemas(_) => OBJECT_SCHEMAS_EVENT,
        }
    }

    /// JSON payload.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn payload(&self) -> MapperResult<String> {
        match self {
            Self::ObjectSelection(snapshot) => serde_json::to_string(snapshot),
            Self::ObjectSchemas(log) => serde_json::to_string(log),
        }
        .map_err(MapperError::Serialization)
    }
}
