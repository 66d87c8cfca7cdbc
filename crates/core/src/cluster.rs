//! Desired cluster topology carried as a job directive.
//!
//! A job's directive is the serialized [`ClusterWrapper`] describing the
//! cluster the user wants. The splitter reads a handful of fields from it
//! ([`JobDirective`]) and forwards the raw text to the task so the wait
//! phase can re-decode the role list.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Top-level cluster record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cluster {
    pub cluster_id: String,
    /// Release name on the deployment backend.
    pub name: String,
    pub runtime_id: String,
    pub app_id: String,
    pub version_id: String,
    /// Target namespace.
    pub zone: String,
    /// Desired values as JSON text.
    pub env: String,
    pub description: String,
}

/// One role (workload group) of a cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterRole {
    pub role: String,
    pub replicas: u32,
    /// Ready replicas, filled in by `describe_details`.
    pub ready_replicas: u32,
}

/// Full description of a cluster: the cluster record plus its roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterWrapper {
    pub cluster: Cluster,
    pub cluster_roles: Vec<ClusterRole>,
}

impl ClusterWrapper {
    /// Parse a serialized cluster description.
    pub fn decode(raw: &str) -> Result<Self, CoreError> {
        serde_json::from_str(raw).map_err(|e| {
            CoreError::MalformedDirective(format!("invalid cluster description: {e}"))
        })
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Names of every role, in declaration order.
    pub fn role_names(&self) -> Vec<String> {
        self.cluster_roles.iter().map(|r| r.role.clone()).collect()
    }
}

/// The fields of a job directive the splitter needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobDirective {
    pub namespace: String,
    pub runtime_id: String,
    pub values: String,
    pub cluster_name: String,
}

impl JobDirective {
    /// Decode a job directive from its serialized cluster description.
    pub fn decode(raw: &str) -> Result<Self, CoreError> {
        let wrapper = ClusterWrapper::decode(raw)?;
        Ok(Self::from(&wrapper))
    }
}

impl From<&ClusterWrapper> for JobDirective {
    fn from(wrapper: &ClusterWrapper) -> Self {
        Self {
            namespace: wrapper.cluster.zone.clone(),
            runtime_id: wrapper.cluster.runtime_id.clone(),
            values: wrapper.cluster.env.clone(),
            cluster_name: wrapper.cluster.name.clone(),
        }
    }
}
