//! Tasks and the staged plan a job is split into.
//!
//! A [`TaskPlan`] is an ordered list of [`TaskLayer`]s. Tasks inside one
//! layer target independent clusters and may run concurrently; every task
//! of layer `i` must reach a terminal state before layer `i + 1` starts.
//! The plan does not enforce that ordering itself, the caller does.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::action::JobAction;
use crate::directive::TaskDirective;
use crate::error::CoreError;

/// Cluster id used for tasks whose cluster has not been assigned yet.
pub const PLACEHOLDER: &str = "<placeholder>";

/// One executable unit derived from a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub job_id: String,
    pub cluster_id: String,
    pub runtime_id: String,
    pub action: JobAction,
    /// Encoded [`TaskDirective`].
    pub directive: String,
    pub owner_path: String,
    /// Whether the ledger may retry this task after a failure.
    #[serde(default)]
    pub retry: bool,
    /// Per-task wait budget override in seconds. `None` or `0` means the
    /// action's default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Task {
    /// Build a new task with a freshly generated id.
    ///
    /// An empty `cluster_id` is replaced with [`PLACEHOLDER`].
    pub fn new(
        job_id: impl Into<String>,
        cluster_id: impl Into<String>,
        runtime_id: impl Into<String>,
        action: JobAction,
        directive: &TaskDirective,
        owner_path: impl Into<String>,
    ) -> Self {
        let cluster_id = cluster_id.into();
        Self {
            task_id: format!("task-{}", uuid::Uuid::new_v4().simple()),
            job_id: job_id.into(),
            cluster_id: if cluster_id.is_empty() {
                PLACEHOLDER.to_string()
            } else {
                cluster_id
            },
            runtime_id: runtime_id.into(),
            action,
            directive: directive.encode(),
            owner_path: owner_path.into(),
            retry: false,
            timeout_secs: None,
        }
    }

    /// Set a per-task wait budget, rounded up to whole seconds so a
    /// sub-second budget is not read back as "no override".
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
        self.timeout_secs = Some(secs);
        self
    }

    /// The task's wait budget, or `default` when it has no override.
    pub fn timeout_or(&self, default: Duration) -> Duration {
        match self.timeout_secs {
            Some(secs) if secs > 0 => Duration::from_secs(secs),
            _ => default,
        }
    }

    /// Decode this task's directive.
    pub fn decode_directive(&self) -> Result<TaskDirective, CoreError> {
        TaskDirective::decode(&self.directive)
    }
}

/// A set of tasks that may execute concurrently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLayer {
    pub tasks: Vec<Task>,
}

impl TaskLayer {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn single(task: Task) -> Self {
        Self { tasks: vec![task] }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Ordered stages of a job, indexed by stage number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPlan {
    layers: Vec<TaskLayer>,
}

impl TaskPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// A plan with one stage holding one task.
    pub fn single(task: Task) -> Self {
        Self {
            layers: vec![TaskLayer::single(task)],
        }
    }

    /// Append a stage that runs after every stage already in the plan.
    /// Empty layers are dropped.
    pub fn push_layer(&mut self, layer: TaskLayer) {
        if !layer.is_empty() {
            self.layers.push(layer);
        }
    }

    pub fn layers(&self) -> &[TaskLayer] {
        &self.layers
    }

    pub fn first(&self) -> Option<&TaskLayer> {
        self.layers.first()
    }

    pub fn layer(&self, stage: usize) -> Option<&TaskLayer> {
        self.layers.get(stage)
    }

    /// The stage that may start once `stage` has finished.
    pub fn next_after(&self, stage: usize) -> Option<&TaskLayer> {
        self.layers.get(stage + 1)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Total number of tasks across every stage.
    pub fn task_count(&self) -> usize {
        self.layers.iter().map(TaskLayer::len).sum()
    }

    /// All tasks in stage order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.layers.iter().flat_map(|layer| layer.tasks.iter())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
