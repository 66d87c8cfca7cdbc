//! Lifecycle actions shared by jobs and tasks.
//!
//! Jobs and tasks use the same enumeration: a task's action is the dispatch
//! key for exactly one backend operation. Only a subset of the actions the
//! surrounding system knows about can be split and dispatched by this
//! provider; the rest are rejected as unsupported.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::timeouts::{DEFAULT_DELETE_WAIT_TIMEOUT, DEFAULT_RELEASE_WAIT_TIMEOUT};

/// A cluster lifecycle action, used both as a job action and as a task
/// action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobAction {
    CreateCluster,
    UpgradeCluster,
    UpdateClusterEnv,
    RollbackCluster,
    DeleteClusters,
    CeaseClusters,
    StartClusters,
    StopClusters,
    RecoverClusters,
    ResizeCluster,
    AddClusterNodes,
    DeleteClusterNodes,
}

/// Every action, in declaration order.
pub const ALL_ACTIONS: [JobAction; 12] = [
    JobAction::CreateCluster,
    JobAction::UpgradeCluster,
    JobAction::UpdateClusterEnv,
    JobAction::RollbackCluster,
    JobAction::DeleteClusters,
    JobAction::CeaseClusters,
    JobAction::StartClusters,
    JobAction::StopClusters,
    JobAction::RecoverClusters,
    JobAction::ResizeCluster,
    JobAction::AddClusterNodes,
    JobAction::DeleteClusterNodes,
];

impl JobAction {
    /// The canonical wire name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateCluster => "CreateCluster",
            Self::UpgradeCluster => "UpgradeCluster",
            Self::UpdateClusterEnv => "UpdateClusterEnv",
            Self::RollbackCluster => "RollbackCluster",
            Self::DeleteClusters => "DeleteClusters",
            Self::CeaseClusters => "CeaseClusters",
            Self::StartClusters => "StartClusters",
            Self::StopClusters => "StopClusters",
            Self::RecoverClusters => "RecoverClusters",
            Self::ResizeCluster => "ResizeCluster",
            Self::AddClusterNodes => "AddClusterNodes",
            Self::DeleteClusterNodes => "DeleteClusterNodes",
        }
    }

    /// Default budget for waiting on the release status after dispatch.
    ///
    /// Removal of a release settles faster than an install or upgrade, which
    /// also has to pull images and schedule workloads.
    pub fn default_wait_timeout(self) -> Duration {
        match self {
            Self::DeleteClusters | Self::CeaseClusters => DEFAULT_DELETE_WAIT_TIMEOUT,
            _ => DEFAULT_RELEASE_WAIT_TIMEOUT,
        }
    }
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_ACTIONS
            .iter()
            .copied()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| CoreError::UnknownAction(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
