//! Conversion of desired values into the deployment backend's native
//! configuration format.
//!
//! Directives carry values as JSON text; the deployment backend consumes
//! YAML. Conversion happens before any backend write so a bad payload never
//! reaches the backend.

use crate::error::ProviderError;

/// Convert JSON `values` to YAML. Blank input converts to an empty document.
pub fn json_to_yaml(values: &str) -> Result<String, ProviderError> {
    if values.trim().is_empty() {
        return Ok(String::new());
    }

    let parsed: serde_json::Value = serde_json::from_str(values)
        .map_err(|e| ProviderError::MalformedDirective(format!("invalid values: {e}")))?;

    serde_yaml::to_string(&parsed)
        .map_err(|e| ProviderError::MalformedDirective(format!("unconvertible values: {e}")))
}
