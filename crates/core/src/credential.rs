use serde::{Deserialize, Serialize};

/// Credential used to reach a cluster runtime (for example a kubeconfig).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeCredential {
    pub runtime_credential_id: String,
    pub provider: String,
    /// Raw credential document.
    pub content: String,
}
