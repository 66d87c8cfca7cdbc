//! Upward surface of the runtime provider.
//!
//! [`RuntimeProvider`] bundles the splitter, dispatcher and status
//! classifier around one registry and package store, and adds the
//! read-only passthroughs that delegate straight to a backend.

use std::sync::Arc;

use helmrp_core::cluster::ClusterWrapper;
use helmrp_core::credential::RuntimeCredential;
use helmrp_core::job::Job;
use helmrp_core::task::{Task, TaskPlan};

use crate::backend::PackageStore;
use crate::classifier::StatusClassifier;
use crate::config::ProviderConfig;
use crate::dispatcher::SubtaskDispatcher;
use crate::error::{ProviderError, ProviderResult};
use crate::registry::{BackendRegistry, UNREGISTERED_RUNTIME};
use crate::splitter::JobSplitter;

/// Task orchestration entry point for one provider process.
pub struct RuntimeProvider {
    registry: Arc<dyn BackendRegistry>,
    splitter: JobSplitter,
    dispatcher: SubtaskDispatcher,
    classifier: StatusClassifier,
}

impl RuntimeProvider {
    pub fn new(
        registry: Arc<dyn BackendRegistry>,
        packages: Arc<dyn PackageStore>,
        config: ProviderConfig,
    ) -> Self {
        Self {
            splitter: JobSplitter::new(Arc::clone(&registry)),
            dispatcher: SubtaskDispatcher::new(Arc::clone(&registry), packages),
            classifier: StatusClassifier::new(Arc::clone(&registry), config),
            registry,
        }
    }

    // ---- orchestration ----

    /// Split `job` into a staged task plan.
    pub fn split_job(&self, job: &Job) -> ProviderResult<TaskPlan> {
        self.splitter.split(job).inspect_err(|e| {
            tracing::error!(job_id = %job.job_id, action = %job.action, error = %e, "Failed to split job");
        })
    }

    /// Start the backend operation of `task`. Errors are returned as the
    /// backend reported them.
    pub async fn dispatch_task(&self, task: &Task) -> ProviderResult<()> {
        self.dispatcher.dispatch(task).await.inspect_err(|e| {
            tracing::error!(
                task_id = %task.task_id,
                action = %task.action,
                error = %e,
                "Failed to dispatch task",
            );
        })
    }

    /// Wait until `task` reaches a terminal state.
    ///
    /// Failures, timeouts included, come back as
    /// [`ProviderError::TaskFailed`] naming the task, action and cluster.
    pub async fn wait_task(&self, task: &Task) -> ProviderResult<()> {
        match self.classifier.wait(task).await {
            Ok(()) => {
                tracing::info!(task_id = %task.task_id, action = %task.action, "Task completed");
                Ok(())
            }
            Err(source) => {
                let cluster_name = task
                    .decode_directive()
                    .map(|d| d.cluster_name)
                    .unwrap_or_default();

                tracing::error!(
                    task_id = %task.task_id,
                    action = %task.action,
                    cluster_name = %cluster_name,
                    error = %source,
                    "Task failed",
                );

                Err(ProviderError::TaskFailed {
                    task_id: task.task_id.clone(),
                    action: task.action,
                    cluster_name,
                    source: Box::new(source),
                })
            }
        }
    }

    /// Whether `err`, returned for `task`, may be retried with a fresh
    /// budget, judged by the task runtime's own transient-error check.
    /// Falls back to [`ProviderError::is_retryable`] when the runtime cannot
    /// be resolved.
    pub fn is_retryable(&self, task: &Task, err: &ProviderError) -> bool {
        let deployment = task
            .decode_directive()
            .ok()
            .and_then(|d| self.registry.deployment(&d.runtime_id).ok());

        match deployment {
            Some(deployment) => err.is_retryable_with(|e| deployment.is_transient(e)),
            None => err.is_retryable(),
        }
    }

    // ---- passthroughs ----

    /// Fail if the cluster's release name is already taken on its runtime.
    pub async fn check_name_unique(&self, cluster: &ClusterWrapper) -> ProviderResult<()> {
        let name = &cluster.cluster.name;
        let runtime_id = &cluster.cluster.runtime_id;

        let deployment = self.registry.deployment(runtime_id)?;
        deployment.check_name_unique(name).await.map_err(|e| {
            tracing::error!(
                cluster_name = %name,
                runtime_id = %runtime_id,
                error = %e,
                "Cluster name already exists in runtime",
            );
            e.into()
        })
    }

    /// Fill in live details of `cluster` from its runtime.
    pub async fn describe_cluster_details(
        &self,
        mut cluster: ClusterWrapper,
    ) -> ProviderResult<ClusterWrapper> {
        let workload = self.registry.workload(&cluster.cluster.runtime_id)?;
        workload.describe_details(&mut cluster).await?;
        Ok(cluster)
    }

    /// Check that `credential` can reach `zone` on `runtime_id`.
    pub async fn validate_runtime(
        &self,
        runtime_id: &str,
        zone: &str,
        credential: &RuntimeCredential,
        need_create: bool,
    ) -> ProviderResult<()> {
        let workload = self.registry.workload(runtime_id)?;
        workload
            .validate_runtime(zone, credential, need_create)
            .await?;
        Ok(())
    }

    /// Zones reachable with `credential`. The runtime may not exist yet, so
    /// the unregistered runtime's workload backend answers.
    pub async fn list_zones(
        &self,
        credential: &RuntimeCredential,
    ) -> ProviderResult<Vec<String>> {
        let workload = self.registry.workload(UNREGISTERED_RUNTIME)?;
        Ok(workload.list_zones(credential).await?)
    }

    /// Subnets are not a concept of this runtime.
    pub fn describe_subnets(&self) -> ProviderResult<Vec<String>> {
        Err(ProviderError::UnsupportedAction("DescribeSubnets".to_string()))
    }

    /// VPCs are not a concept of this runtime.
    pub fn describe_vpc(&self) -> ProviderResult<String> {
        Err(ProviderError::UnsupportedAction("DescribeVpc".to_string()))
    }
}
