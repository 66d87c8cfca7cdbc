//! Per-action interpretation of release status while waiting on a task.
//!
//! Each poll asks the deployment backend for the release status and turns
//! the answer into a [`Verdict`] or a fatal error:
//!
//! | Action                       | Transient error | "not found" | Other error | Status                                   |
//! |------------------------------|-----------------|-------------|-------------|------------------------------------------|
//! | Create / Upgrade / Rollback  | pending         | fatal       | fatal       | failed → fatal, deployed → readiness wait |
//! | DeleteClusters               | pending         | done        | fatal       | deleted → done                           |
//! | CeaseClusters                | pending         | done        | **done**    | pending                                  |
//!
//! Cease is a best-effort purge: once the purge has been issued, any
//! backend error is taken to mean the release is already gone. Delete keeps
//! unexpected errors fatal. The two policies differ on purpose.

use std::sync::Arc;
use std::time::Duration;

use helmrp_core::action::JobAction;
use helmrp_core::cluster::ClusterWrapper;
use helmrp_core::directive::TaskDirective;
use helmrp_core::task::Task;

use crate::backend::{BackendError, DeploymentBackend, ReleaseStatus};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::registry::BackendRegistry;
use crate::wait::wait_until;

/// Outcome of one status poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Not settled yet; poll again.
    Pending,
    /// Terminal success.
    Done,
    /// The release is deployed; its workloads still have to become ready.
    Deployed,
}

/// Classify one status answer for `action`.
///
/// `is_transient` decides which backend errors are connection-class.
pub fn classify<F>(
    action: JobAction,
    cluster_name: &str,
    status: Result<ReleaseStatus, BackendError>,
    is_transient: F,
) -> Result<Verdict, ProviderError>
where
    F: Fn(&BackendError) -> bool,
{
    match action {
        JobAction::CreateCluster | JobAction::UpgradeCluster | JobAction::RollbackCluster => {
            match status {
                Err(e) if is_transient(&e) => Ok(Verdict::Pending),
                Err(e) => Err(e.into()),
                Ok(ReleaseStatus::Failed) => Err(ProviderError::ReleaseFailed {
                    cluster_name: cluster_name.to_string(),
                }),
                Ok(ReleaseStatus::Deployed) => Ok(Verdict::Deployed),
                Ok(_) => Ok(Verdict::Pending),
            }
        }
        JobAction::DeleteClusters => match status {
            Err(e) if is_transient(&e) => Ok(Verdict::Pending),
            Err(e) if e.is_absent() => {
                tracing::warn!(cluster_name, error = %e, "Waiting on a release that does not exist");
                Ok(Verdict::Done)
            }
            Err(e) => Err(e.into()),
            Ok(ReleaseStatus::Deleted) => Ok(Verdict::Done),
            Ok(_) => Ok(Verdict::Pending),
        },
        JobAction::CeaseClusters => match status {
            Err(e) if is_transient(&e) => Ok(Verdict::Pending),
            Err(e) => {
                if e.is_absent() {
                    tracing::warn!(cluster_name, error = %e, "Waiting on a release that does not exist");
                } else {
                    tracing::info!(cluster_name, error = %e, "Treating status error after purge as gone");
                }
                Ok(Verdict::Done)
            }
            Ok(_) => Ok(Verdict::Pending),
        },
        other => Err(ProviderError::unsupported(other)),
    }
}

/// Waits for dispatched tasks to settle.
pub struct StatusClassifier {
    registry: Arc<dyn BackendRegistry>,
    config: ProviderConfig,
}

impl StatusClassifier {
    pub fn new(registry: Arc<dyn BackendRegistry>, config: ProviderConfig) -> Self {
        Self { registry, config }
    }

    /// Poll the release of `task` until it reaches a terminal state.
    ///
    /// Uses the task's timeout override, or the action's release budget,
    /// and the configured poll interval.
    pub async fn wait(&self, task: &Task) -> Result<(), ProviderError> {
        let directive = task.decode_directive()?;
        directive.require_target()?;
        let deployment = self.registry.deployment(&directive.runtime_id)?;
        let timeout = task.timeout_or(self.config.release_timeout_for(task.action));

        tracing::debug!(
            task_id = %task.task_id,
            action = %task.action,
            cluster_name = %directive.cluster_name,
            timeout_secs = timeout.as_secs(),
            "Waiting for task to settle",
        );

        wait_until(
            || self.probe(task, &directive, deployment.as_ref()),
            timeout,
            self.config.wait_interval,
        )
        .await
    }

    /// One status poll. `Ok(true)` ends the wait.
    async fn probe(
        &self,
        task: &Task,
        directive: &TaskDirective,
        deployment: &dyn DeploymentBackend,
    ) -> Result<bool, ProviderError> {
        let status = deployment.status(&directive.cluster_name).await;
        if let Ok(code) = &status {
            tracing::debug!(
                task_id = %task.task_id,
                cluster_name = %directive.cluster_name,
                status = %code,
                "Release status",
            );
        }

        let verdict = classify(task.action, &directive.cluster_name, status, |e| {
            deployment.is_transient(e)
        })?;

        match verdict {
            Verdict::Pending => Ok(false),
            Verdict::Done => Ok(true),
            Verdict::Deployed => {
                self.wait_workload_ready(task, directive).await?;
                Ok(true)
            }
        }
    }

    /// Nested wait for the workloads of a deployed release.
    async fn wait_workload_ready(
        &self,
        task: &Task,
        directive: &TaskDirective,
    ) -> Result<(), ProviderError> {
        let cluster = ClusterWrapper::decode(&directive.raw_cluster_wrapper)?;
        let workload = self.registry.workload(&directive.runtime_id)?;
        let timeout = self.workload_ready_timeout(task);

        tracing::debug!(
            task_id = %task.task_id,
            cluster_name = %directive.cluster_name,
            roles = cluster.cluster_roles.len(),
            "Release deployed, waiting for workloads",
        );

        workload
            .wait_ready(
                &directive.runtime_id,
                &directive.namespace,
                &cluster.role_names(),
                timeout,
                self.config.wait_interval,
            )
            .await?;
        Ok(())
    }

    fn workload_ready_timeout(&self, task: &Task) -> Duration {
        task.timeout_or(self.config.workload_ready_timeout)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
