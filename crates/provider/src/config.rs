use std::time::Duration;

use helmrp_core::action::JobAction;
use helmrp_core::timeouts::{DEFAULT_WAIT_INTERVAL, DEFAULT_WORKLOAD_READY_TIMEOUT};

use crate::error::ProviderError;

/// Wait policy of the orchestration core.
///
/// Defaults come from [`helmrp_core::timeouts`]; a task's own timeout
/// override still takes precedence over everything here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Delay between two status probes.
    pub wait_interval: Duration,
    /// Release wait budget for every action. `None` keeps the per-action
    /// defaults.
    pub release_timeout: Option<Duration>,
    /// Budget of the nested workload-readiness wait.
    pub workload_ready_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            wait_interval: DEFAULT_WAIT_INTERVAL,
            release_timeout: None,
            workload_ready_timeout: DEFAULT_WORKLOAD_READY_TIMEOUT,
        }
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                            | Default               |
    /// |------------------------------------|-----------------------|
    /// | `WAIT_TASK_INTERVAL_SECS`          | `3`                   |
    /// | `WAIT_RELEASE_TIMEOUT_SECS`        | per-action default    |
    /// | `WAIT_WORKLOAD_READY_TIMEOUT_SECS` | `900`                 |
    ///
    /// Values are whole seconds and must be greater than zero.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ProviderConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let wait_interval = read_secs(&lookup, "WAIT_TASK_INTERVAL_SECS")?
            .unwrap_or(defaults.wait_interval);

        let release_timeout = read_secs(&lookup, "WAIT_RELEASE_TIMEOUT_SECS")?;

        let workload_ready_timeout = read_secs(&lookup, "WAIT_WORKLOAD_READY_TIMEOUT_SECS")?
            .unwrap_or(defaults.workload_ready_timeout);

        Ok(Self {
            wait_interval,
            release_timeout,
            workload_ready_timeout,
        })
    }

    /// Release wait budget of `action` when the task has no override.
    pub fn release_timeout_for(&self, action: JobAction) -> Duration {
        self.release_timeout
            .unwrap_or_else(|| action.default_wait_timeout())
    }
}

fn read_secs<F>(lookup: &F, key: &str) -> Result<Option<Duration>, ProviderError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };

    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ProviderError::Config(format!("{key} must be a valid u64, got {raw:?}")))?;

    if secs == 0 {
        return Err(ProviderError::Config(format!(
            "{key} must be greater than zero"
        )));
    }

    Ok(Some(Duration::from_secs(secs)))
}
