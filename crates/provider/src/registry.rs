//! Resolution of backend capabilities per runtime id.
//!
//! The orchestration components receive a [`BackendRegistry`] at
//! construction time instead of reaching for process-wide configuration, so
//! tests can plug in fakes and one process can serve many runtimes.

use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::{BackendError, DeploymentBackend, WorkloadBackend};

/// Runtime id used when no runtime has been registered yet (for example
/// when listing the zones of a credential before creating the runtime).
pub const UNREGISTERED_RUNTIME: &str = "";

/// Factory of backend capabilities keyed by runtime id.
pub trait BackendRegistry: Send + Sync {
    /// Deployment capability of `runtime_id`.
    fn deployment(&self, runtime_id: &str) -> Result<Arc<dyn DeploymentBackend>, BackendError>;

    /// Workload capability of `runtime_id`.
    fn workload(&self, runtime_id: &str) -> Result<Arc<dyn WorkloadBackend>, BackendError>;

    /// Default zone (namespace) of `runtime_id`.
    fn resolve_runtime(&self, runtime_id: &str) -> Result<String, BackendError>;
}

/// One registered runtime.
#[derive(Clone)]
pub struct RuntimeEntry {
    pub zone: String,
    pub deployment: Arc<dyn DeploymentBackend>,
    pub workload: Arc<dyn WorkloadBackend>,
}

/// A [`BackendRegistry`] backed by a fixed map.
///
/// A fallback entry, when set, answers for every runtime id that has no
/// entry of its own, including [`UNREGISTERED_RUNTIME`].
#[derive(Clone, Default)]
pub struct StaticRegistry {
    runtimes: HashMap<String, RuntimeEntry>,
    fallback: Option<RuntimeEntry>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the capabilities of `runtime_id`.
    pub fn with_runtime(
        mut self,
        runtime_id: impl Into<String>,
        zone: impl Into<String>,
        deployment: Arc<dyn DeploymentBackend>,
        workload: Arc<dyn WorkloadBackend>,
    ) -> Self {
        self.runtimes.insert(
            runtime_id.into(),
            RuntimeEntry {
                zone: zone.into(),
                deployment,
                workload,
            },
        );
        self
    }

    /// Capabilities used for runtime ids without an entry.
    pub fn with_fallback(mut self, entry: RuntimeEntry) -> Self {
        self.fallback = Some(entry);
        self
    }

    /// Number of explicitly registered runtimes.
    pub fn len(&self) -> usize {
        self.runtimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runtimes.is_empty()
    }

    fn entry(&self, runtime_id: &str) -> Result<&RuntimeEntry, BackendError> {
        self.runtimes
            .get(runtime_id)
            .or(self.fallback.as_ref())
            .ok_or_else(|| BackendError::NotFound(format!("runtime [{runtime_id}]")))
    }
}

impl BackendRegistry for StaticRegistry {
    fn deployment(&self, runtime_id: &str) -> Result<Arc<dyn DeploymentBackend>, BackendError> {
        Ok(Arc::clone(&self.entry(runtime_id)?.deployment))
    }

    fn workload(&self, runtime_id: &str) -> Result<Arc<dyn WorkloadBackend>, BackendError> {
        Ok(Arc::clone(&self.entry(runtime_id)?.workload))
    }

    fn resolve_runtime(&self, runtime_id: &str) -> Result<String, BackendError> {
        Ok(self.entry(runtime_id)?.zone.clone())
    }
}
