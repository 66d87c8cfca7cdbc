//! Per-task directive codec.
//!
//! A task carries a self-contained snapshot of everything its dispatch and
//! wait phases need, serialized as JSON text. Tasks are persisted by an
//! external ledger and may be dispatched by a different process long after
//! they were created, so the format is plain structured text with stable
//! key names.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Decoded form of a task's directive payload.
///
/// Not every field is populated for every action; delete and cease tasks
/// only carry the runtime id and cluster name. Unpopulated fields are empty
/// strings and are left out of the encoded form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TaskDirective {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub runtime_id: String,
    /// Desired values as JSON text.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub values: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster_name: String,
    /// The job's serialized cluster description, carried through unchanged.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub raw_cluster_wrapper: String,
}

impl TaskDirective {
    /// Serialize the directive. Never fails for a directive built in memory.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse a serialized directive.
    ///
    /// Only a JSON object is a directive. Arrays would otherwise fill the
    /// fields by position.
    pub fn decode(payload: &str) -> Result<Self, CoreError> {
        let value: serde_json::Value = serde_json::from_str(payload)
            .map_err(|e| CoreError::MalformedDirective(format!("invalid task directive: {e}")))?;

        if !value.is_object() {
            return Err(CoreError::MalformedDirective(
                "invalid task directive: expected a JSON object".to_string(),
            ));
        }

        serde_json::from_value(value)
            .map_err(|e| CoreError::MalformedDirective(format!("invalid task directive: {e}")))
    }

    /// Fail unless the directive names the release and runtime it acts on.
    /// Dispatch and wait need both.
    pub fn require_target(&self) -> Result<(), CoreError> {
        if self.cluster_name.is_empty() {
            return Err(CoreError::MalformedDirective(
                "task directive has no cluster name".to_string(),
            ));
        }
        if self.runtime_id.is_empty() {
            return Err(CoreError::MalformedDirective(
                "task directive has no runtime id".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
