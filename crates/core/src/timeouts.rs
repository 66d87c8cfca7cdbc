//! Default wait budgets for task completion polling.
//!
//! A task may carry its own timeout override; these apply when it does not.
//! The release-status wait and the nested workload-readiness wait have
//! separate budgets.

use std::time::Duration;

/// Budget for a create, upgrade or rollback release to reach a terminal
/// status.
pub const DEFAULT_RELEASE_WAIT_TIMEOUT: Duration = Duration::from_secs(600);

/// Budget for a delete or cease release to disappear.
pub const DEFAULT_DELETE_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Budget for the workloads of a deployed release to become ready.
pub const DEFAULT_WORKLOAD_READY_TIMEOUT: Duration = Duration::from_secs(900);

/// Delay between two consecutive status probes.
pub const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_secs(3);
