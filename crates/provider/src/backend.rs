//! Capability traits for the backends the orchestration core drives.
//!
//! Three collaborators sit behind these traits:
//!
//! - [`PackageStore`] serves versioned chart archives.
//! - [`DeploymentBackend`] installs, upgrades, rolls back, deletes and
//!   reports the status of a named release on one runtime.
//! - [`WorkloadBackend`] inspects the live workloads of a runtime.
//!
//! Implementations must be safe for concurrent use; the core shares them
//! through `Arc` and never mutates them.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use helmrp_core::cluster::ClusterWrapper;
use helmrp_core::credential::RuntimeCredential;

/// Errors reported by a backend capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The backend could not be reached (connection refused, reset, DNS).
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The requested object does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Any other backend-side failure.
    #[error("{0}")]
    Failed(String),
}

impl BackendError {
    /// Whether the message says the target is absent.
    ///
    /// Deployment backends report a missing release as free text, so the
    /// check is on the rendered message rather than the variant.
    pub fn is_absent(&self) -> bool {
        self.to_string().contains("not found")
    }
}

/// Lifecycle status of a release as reported by the deployment backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStatus {
    Unknown,
    Deployed,
    Deleted,
    Superseded,
    Failed,
    Deleting,
    PendingInstall,
    PendingUpgrade,
    PendingRollback,
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Deployed => "deployed",
            Self::Deleted => "deleted",
            Self::Superseded => "superseded",
            Self::Failed => "failed",
            Self::Deleting => "deleting",
            Self::PendingInstall => "pending_install",
            Self::PendingUpgrade => "pending_upgrade",
            Self::PendingRollback => "pending_rollback",
        };
        f.write_str(s)
    }
}

/// Source of versioned chart archives.
#[async_trait]
pub trait PackageStore: Send + Sync {
    /// Fetch the raw chart archive of an application version.
    async fn fetch_package(&self, version_id: &str) -> Result<Vec<u8>, BackendError>;
}

/// Release operations on a single runtime.
#[async_trait]
pub trait DeploymentBackend: Send + Sync {
    /// Install `chart` as release `name` into `namespace`.
    ///
    /// `values` is in the backend's native (YAML) configuration format.
    async fn install(
        &self,
        chart: &[u8],
        namespace: &str,
        values: &str,
        name: &str,
    ) -> Result<(), BackendError>;

    /// Upgrade release `name` to `chart` with new `values`.
    async fn update(&self, name: &str, chart: &[u8], values: &str) -> Result<(), BackendError>;

    /// Roll release `name` back to its previous revision.
    async fn rollback(&self, name: &str) -> Result<(), BackendError>;

    /// Delete release `name`. With `purge` the release history is removed
    /// as well.
    async fn delete(&self, name: &str, purge: bool) -> Result<(), BackendError>;

    /// Current status of release `name`.
    async fn status(&self, name: &str) -> Result<ReleaseStatus, BackendError>;

    /// Fail if a release called `name` already exists.
    async fn check_name_unique(&self, name: &str) -> Result<(), BackendError>;

    /// Whether `err` is connection-class and safe to retry by polling again.
    fn is_transient(&self, err: &BackendError) -> bool {
        matches!(err, BackendError::Unavailable(_))
    }
}

/// Workload inspection on a single runtime.
#[async_trait]
pub trait WorkloadBackend: Send + Sync {
    /// Block until every workload of `roles` in `namespace` is ready, or
    /// fail once `timeout` has elapsed.
    async fn wait_ready(
        &self,
        runtime_id: &str,
        namespace: &str,
        roles: &[String],
        timeout: Duration,
        interval: Duration,
    ) -> Result<(), BackendError>;

    /// Fill in live details (ready replicas and the like) of `cluster`.
    async fn describe_details(&self, cluster: &mut ClusterWrapper) -> Result<(), BackendError>;

    /// Check that `credential` grants access to `zone`, creating the zone
    /// when `need_create` is set and it does not exist.
    async fn validate_runtime(
        &self,
        zone: &str,
        credential: &RuntimeCredential,
        need_create: bool,
    ) -> Result<(), BackendError>;

    /// Zones (namespaces) reachable with `credential`.
    async fn list_zones(&self, credential: &RuntimeCredential) -> Result<Vec<String>, BackendError>;
}
