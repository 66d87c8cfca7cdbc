//! In-memory backends shared by the provider integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use helmrp_core::action::JobAction;
use helmrp_core::cluster::{Cluster, ClusterRole, ClusterWrapper};
use helmrp_core::credential::RuntimeCredential;
use helmrp_core::job::Job;
use helmrp_provider::backend::{
    BackendError, DeploymentBackend, PackageStore, ReleaseStatus, WorkloadBackend,
};
use helmrp_provider::config::ProviderConfig;
use helmrp_provider::registry::{RuntimeEntry, StaticRegistry};
use helmrp_provider::service::RuntimeProvider;

pub const RUNTIME_ID: &str = "rt-1";
pub const ZONE: &str = "blog";
pub const CLUSTER_NAME: &str = "wordpress";
pub const VERSION_ID: &str = "appv-1";
pub const VALUES: &str = r#"{"replicaCount":2}"#;
pub const CHART: &[u8] = b"wordpress-6.4.tgz";

/// A backend call observed by a fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Install {
        chart: Vec<u8>,
        namespace: String,
        values: String,
        name: String,
    },
    Update {
        name: String,
        chart: Vec<u8>,
        values: String,
    },
    Rollback {
        name: String,
    },
    Delete {
        name: String,
        purge: bool,
    },
    Status {
        name: String,
    },
    CheckNameUnique {
        name: String,
    },
    WaitReady {
        runtime_id: String,
        namespace: String,
        roles: Vec<String>,
        timeout: Duration,
    },
    DescribeDetails,
    ValidateRuntime {
        zone: String,
        need_create: bool,
    },
    ListZones,
    FetchPackage {
        version_id: String,
    },
}

/// Shared call log so ordering across fakes can be asserted.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().unwrap().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Deployment
// ---------------------------------------------------------------------------

/// Deployment backend answering status polls from a script.
///
/// Once the script has a single entry left, that entry repeats forever.
pub struct FakeDeployment {
    log: CallLog,
    statuses: Mutex<VecDeque<Result<ReleaseStatus, BackendError>>>,
    write_error: Mutex<Option<BackendError>>,
    existing: Vec<String>,
    transient_marker: Option<String>,
}

impl FakeDeployment {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            statuses: Mutex::new(VecDeque::from([Ok(ReleaseStatus::Deployed)])),
            write_error: Mutex::new(None),
            existing: Vec::new(),
            transient_marker: None,
        }
    }

    pub fn with_statuses(
        self,
        statuses: impl IntoIterator<Item = Result<ReleaseStatus, BackendError>>,
    ) -> Self {
        *self.statuses.lock().unwrap() = statuses.into_iter().collect();
        self
    }

    /// Make every write operation fail with `err`.
    pub fn failing_writes(self, err: BackendError) -> Self {
        *self.write_error.lock().unwrap() = Some(err);
        self
    }

    pub fn with_existing_release(mut self, name: &str) -> Self {
        self.existing.push(name.to_string());
        self
    }

    /// Also treat errors whose message contains `marker` as transient.
    pub fn treating_as_transient(mut self, marker: &str) -> Self {
        self.transient_marker = Some(marker.to_string());
        self
    }

    fn write(&self, call: Call) -> Result<(), BackendError> {
        self.log.push(call);
        match self.write_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DeploymentBackend for FakeDeployment {
    async fn install(
        &self,
        chart: &[u8],
        namespace: &str,
        values: &str,
        name: &str,
    ) -> Result<(), BackendError> {
        self.write(Call::Install {
            chart: chart.to_vec(),
            namespace: namespace.to_string(),
            values: values.to_string(),
            name: name.to_string(),
        })
    }

    async fn update(&self, name: &str, chart: &[u8], values: &str) -> Result<(), BackendError> {
        self.write(Call::Update {
            name: name.to_string(),
            chart: chart.to_vec(),
            values: values.to_string(),
        })
    }

    async fn rollback(&self, name: &str) -> Result<(), BackendError> {
        self.write(Call::Rollback {
            name: name.to_string(),
        })
    }

    async fn delete(&self, name: &str, purge: bool) -> Result<(), BackendError> {
        self.write(Call::Delete {
            name: name.to_string(),
            purge,
        })
    }

    async fn status(&self, name: &str) -> Result<ReleaseStatus, BackendError> {
        self.log.push(Call::Status {
            name: name.to_string(),
        });
        let mut statuses = self.statuses.lock().unwrap();
        if statuses.len() > 1 {
            statuses.pop_front().unwrap()
        } else {
            statuses
                .front()
                .cloned()
                .unwrap_or(Ok(ReleaseStatus::Unknown))
        }
    }

    fn is_transient(&self, err: &BackendError) -> bool {
        match &self.transient_marker {
            Some(marker) if err.to_string().contains(marker.as_str()) => true,
            _ => matches!(err, BackendError::Unavailable(_)),
        }
    }

    async fn check_name_unique(&self, name: &str) -> Result<(), BackendError> {
        self.log.push(Call::CheckNameUnique {
            name: name.to_string(),
        });
        if self.existing.iter().any(|n| n == name) {
            return Err(BackendError::Failed(format!("release [{name}] already exists")));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Workload
// ---------------------------------------------------------------------------

pub struct FakeWorkload {
    log: CallLog,
    ready: Result<(), BackendError>,
    zones: Vec<String>,
}

impl FakeWorkload {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ready: Ok(()),
            zones: vec!["default".into(), ZONE.into()],
        }
    }

    pub fn never_ready(mut self, err: BackendError) -> Self {
        self.ready = Err(err);
        self
    }
}

#[async_trait]
impl WorkloadBackend for FakeWorkload {
    async fn wait_ready(
        &self,
        runtime_id: &str,
        namespace: &str,
        roles: &[String],
        timeout: Duration,
        _interval: Duration,
    ) -> Result<(), BackendError> {
        self.log.push(Call::WaitReady {
            runtime_id: runtime_id.to_string(),
            namespace: namespace.to_string(),
            roles: roles.to_vec(),
            timeout,
        });
        self.ready.clone()
    }

    async fn describe_details(&self, cluster: &mut ClusterWrapper) -> Result<(), BackendError> {
        self.log.push(Call::DescribeDetails);
        for role in &mut cluster.cluster_roles {
            role.ready_replicas = role.replicas;
        }
        Ok(())
    }

    async fn validate_runtime(
        &self,
        zone: &str,
        _credential: &RuntimeCredential,
        need_create: bool,
    ) -> Result<(), BackendError> {
        self.log.push(Call::ValidateRuntime {
            zone: zone.to_string(),
            need_create,
        });
        if !need_create && !self.zones.iter().any(|z| z == zone) {
            return Err(BackendError::NotFound(format!("namespace [{zone}]")));
        }
        Ok(())
    }

    async fn list_zones(&self, credential: &RuntimeCredential) -> Result<Vec<String>, BackendError> {
        self.log.push(Call::ListZones);
        if credential.content.is_empty() {
            return Err(BackendError::Failed("empty credential".into()));
        }
        Ok(self.zones.clone())
    }
}

// ---------------------------------------------------------------------------
// Packages
// ---------------------------------------------------------------------------

pub struct FakePackages {
    log: CallLog,
    charts: HashMap<String, Vec<u8>>,
}

impl FakePackages {
    pub fn new(log: CallLog) -> Self {
        let mut charts = HashMap::new();
        charts.insert(VERSION_ID.to_string(), CHART.to_vec());
        Self { log, charts }
    }
}

#[async_trait]
impl PackageStore for FakePackages {
    async fn fetch_package(&self, version_id: &str) -> Result<Vec<u8>, BackendError> {
        self.log.push(Call::FetchPackage {
            version_id: version_id.to_string(),
        });
        self.charts
            .get(version_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("app version [{version_id}]")))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A provider wired to the given fakes, registered under [`RUNTIME_ID`] and
/// as the fallback runtime.
pub fn provider(deployment: FakeDeployment, workload: FakeWorkload, log: &CallLog) -> RuntimeProvider {
    provider_with_config(deployment, workload, log, test_config())
}

pub fn provider_with_config(
    deployment: FakeDeployment,
    workload: FakeWorkload,
    log: &CallLog,
    config: ProviderConfig,
) -> RuntimeProvider {
    let deployment: Arc<dyn DeploymentBackend> = Arc::new(deployment);
    let workload: Arc<dyn WorkloadBackend> = Arc::new(workload);
    let registry = StaticRegistry::new()
        .with_runtime(RUNTIME_ID, ZONE, Arc::clone(&deployment), Arc::clone(&workload))
        .with_fallback(RuntimeEntry {
            zone: "default".into(),
            deployment,
            workload,
        });
    RuntimeProvider::new(
        Arc::new(registry),
        Arc::new(FakePackages::new(log.clone())),
        config,
    )
}

/// One-second polling with short budgets.
pub fn test_config() -> ProviderConfig {
    ProviderConfig {
        wait_interval: Duration::from_secs(1),
        release_timeout: Some(Duration::from_secs(30)),
        workload_ready_timeout: Duration::from_secs(60),
    }
}

pub fn cluster() -> ClusterWrapper {
    ClusterWrapper {
        cluster: Cluster {
            cluster_id: "cl-1".into(),
            name: CLUSTER_NAME.into(),
            runtime_id: RUNTIME_ID.into(),
            zone: ZONE.into(),
            env: VALUES.into(),
            ..Default::default()
        },
        cluster_roles: vec![
            ClusterRole {
                role: "wordpress".into(),
                replicas: 2,
                ..Default::default()
            },
            ClusterRole {
                role: "mariadb".into(),
                replicas: 1,
                ..Default::default()
            },
        ],
    }
}

pub fn job(action: JobAction) -> Job {
    Job {
        job_id: "j-1".into(),
        cluster_id: "cl-1".into(),
        app_id: "app-1".into(),
        version_id: VERSION_ID.into(),
        action,
        directive: cluster().encode(),
        owner_path: "/org/usr-1".into(),
        runtime_id: RUNTIME_ID.into(),
    }
}
