use serde::{Deserialize, Serialize};

use crate::action::JobAction;

/// A top-level cluster lifecycle request.
///
/// `directive` is the serialized [`ClusterWrapper`](crate::cluster::ClusterWrapper)
/// of the desired cluster. Jobs are read-only input to the splitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    #[serde(default)]
    pub cluster_id: String,
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub version_id: String,
    pub action: JobAction,
    pub directive: String,
    #[serde(default)]
    pub owner_path: String,
    #[serde(default)]
    pub runtime_id: String,
}
