//! Job → task plan splitting.
//!
//! Every supported action currently produces one stage holding one task.
//! `UpdateClusterEnv` is planned as an `UpgradeCluster` task: an environment
//! change is a redeploy with new values, so only the directive's values
//! tell the two apart once the task exists.

use std::sync::Arc;

use helmrp_core::action::JobAction;
use helmrp_core::cluster::JobDirective;
use helmrp_core::directive::TaskDirective;
use helmrp_core::job::Job;
use helmrp_core::task::{Task, TaskPlan};

use crate::error::ProviderError;
use crate::registry::BackendRegistry;

/// Builds task plans from jobs.
pub struct JobSplitter {
    registry: Arc<dyn BackendRegistry>,
}

impl JobSplitter {
    pub fn new(registry: Arc<dyn BackendRegistry>) -> Self {
        Self { registry }
    }

    /// Split `job` into a staged plan.
    ///
    /// Fails with [`ProviderError::MalformedDirective`] when the job
    /// directive does not decode and with [`ProviderError::UnsupportedAction`]
    /// for actions this provider does not handle. No task is produced on
    /// failure.
    pub fn split(&self, job: &Job) -> Result<TaskPlan, ProviderError> {
        let job_directive = self.job_directive(job)?;

        let (task_action, directive) = match job.action {
            JobAction::CreateCluster => (
                JobAction::CreateCluster,
                deploy_directive(job, &job_directive),
            ),
            JobAction::UpgradeCluster | JobAction::UpdateClusterEnv => (
                JobAction::UpgradeCluster,
                deploy_directive(job, &job_directive),
            ),
            JobAction::RollbackCluster => (
                JobAction::RollbackCluster,
                TaskDirective {
                    namespace: job_directive.namespace.clone(),
                    runtime_id: job_directive.runtime_id.clone(),
                    cluster_name: job_directive.cluster_name.clone(),
                    raw_cluster_wrapper: job.directive.clone(),
                    ..Default::default()
                },
            ),
            JobAction::DeleteClusters | JobAction::CeaseClusters => (
                job.action,
                TaskDirective {
                    runtime_id: job_directive.runtime_id.clone(),
                    cluster_name: job_directive.cluster_name.clone(),
                    ..Default::default()
                },
            ),
            other => return Err(ProviderError::unsupported(other)),
        };

        let task = Task::new(
            &job.job_id,
            &job.cluster_id,
            &job_directive.runtime_id,
            task_action,
            &directive,
            &job.owner_path,
        );

        tracing::debug!(
            job_id = %job.job_id,
            job_action = %job.action,
            task_id = %task.task_id,
            task_action = %task_action,
            cluster_name = %job_directive.cluster_name,
            "Split job into tasks",
        );

        Ok(TaskPlan::single(task))
    }

    /// Decode the job directive, filling in the runtime's zone when the
    /// directive names no namespace.
    fn job_directive(&self, job: &Job) -> Result<JobDirective, ProviderError> {
        let mut directive = JobDirective::decode(&job.directive)?;

        if directive.runtime_id.is_empty() {
            directive.runtime_id = job.runtime_id.clone();
        }

        if directive.namespace.is_empty() && !directive.runtime_id.is_empty() {
            match self.registry.resolve_runtime(&directive.runtime_id) {
                Ok(zone) => directive.namespace = zone,
                Err(e) => {
                    tracing::warn!(
                        job_id = %job.job_id,
                        runtime_id = %directive.runtime_id,
                        error = %e,
                        "Could not resolve runtime zone, leaving namespace empty",
                    );
                }
            }
        }

        Ok(directive)
    }
}

/// Directive of an install or upgrade: everything the chart deploy and the
/// readiness wait need.
fn deploy_directive(job: &Job, job_directive: &JobDirective) -> TaskDirective {
    TaskDirective {
        version_id: job.version_id.clone(),
        namespace: job_directive.namespace.clone(),
        runtime_id: job_directive.runtime_id.clone(),
        values: job_directive.values.clone(),
        cluster_name: job_directive.cluster_name.clone(),
        raw_cluster_wrapper: job.directive.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
