//! Subtask dispatch: one task, one backend operation.
//!
//! Dispatch starts the backend change and returns; observing completion is
//! the [`StatusClassifier`](crate::classifier::StatusClassifier)'s job.
//! Backend errors are returned unmodified and nothing is retried here.
//! Exactly-once execution is the caller's concern.

use std::sync::Arc;

use helmrp_core::action::JobAction;
use helmrp_core::directive::TaskDirective;
use helmrp_core::task::Task;

use crate::backend::{DeploymentBackend, PackageStore};
use crate::error::ProviderError;
use crate::registry::BackendRegistry;
use crate::values::json_to_yaml;

/// Starts the backend operation selected by a task's action.
pub struct SubtaskDispatcher {
    registry: Arc<dyn BackendRegistry>,
    packages: Arc<dyn PackageStore>,
}

impl SubtaskDispatcher {
    pub fn new(registry: Arc<dyn BackendRegistry>, packages: Arc<dyn PackageStore>) -> Self {
        Self { registry, packages }
    }

    /// Run the backend operation of `task`.
    ///
    /// A directive that does not decode, or that names no release or
    /// runtime, fails before any backend is resolved or called.
    pub async fn dispatch(&self, task: &Task) -> Result<(), ProviderError> {
        let directive = task.decode_directive()?;
        directive.require_target()?;

        let deployment = self.registry.deployment(&directive.runtime_id)?;

        match task.action {
            JobAction::CreateCluster => {
                let (chart, values) = self.chart_and_values(&directive).await?;

                tracing::debug!(
                    task_id = %task.task_id,
                    cluster_name = %directive.cluster_name,
                    namespace = %directive.namespace,
                    values = %values,
                    "Installing release",
                );

                deployment
                    .install(&chart, &directive.namespace, &values, &directive.cluster_name)
                    .await?;
            }
            JobAction::UpgradeCluster => {
                let (chart, values) = self.chart_and_values(&directive).await?;

                tracing::debug!(
                    task_id = %task.task_id,
                    cluster_name = %directive.cluster_name,
                    values = %values,
                    "Updating release",
                );

                deployment
                    .update(&directive.cluster_name, &chart, &values)
                    .await?;
            }
            JobAction::RollbackCluster => {
                tracing::debug!(task_id = %task.task_id, cluster_name = %directive.cluster_name, "Rolling back release");
                deployment.rollback(&directive.cluster_name).await?;
            }
            JobAction::DeleteClusters => {
                delete(deployment.as_ref(), task, &directive, false).await?;
            }
            JobAction::CeaseClusters => {
                delete(deployment.as_ref(), task, &directive, true).await?;
            }
            other => return Err(ProviderError::unsupported(other)),
        }

        tracing::info!(
            task_id = %task.task_id,
            action = %task.action,
            cluster_name = %directive.cluster_name,
            "Task dispatched",
        );
        Ok(())
    }

    /// Fetch the chart of the directive's version and convert its values.
    ///
    /// Values are converted before the chart is fetched, the reverse of the
    /// fetch-then-convert order, so a malformed payload fails without a
    /// package fetch.
    async fn chart_and_values(
        &self,
        directive: &TaskDirective,
    ) -> Result<(Vec<u8>, String), ProviderError> {
        let values = json_to_yaml(&directive.values)?;

        let chart = self
            .packages
            .fetch_package(&directive.version_id)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    version_id = %directive.version_id,
                    error = %e,
                    "Failed to fetch chart",
                );
            })?;

        Ok((chart, values))
    }
}

async fn delete(
    deployment: &dyn DeploymentBackend,
    task: &Task,
    directive: &TaskDirective,
    purge: bool,
) -> Result<(), ProviderError> {
    tracing::debug!(
        task_id = %task.task_id,
        cluster_name = %directive.cluster_name,
        purge,
        "Deleting release",
    );
    deployment.delete(&directive.cluster_name, purge).await?;
    Ok(())
}
