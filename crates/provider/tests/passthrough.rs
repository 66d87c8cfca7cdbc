mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use helmrp_core::action::JobAction;
use helmrp_core::credential::RuntimeCredential;
use helmrp_provider::backend::{BackendError, DeploymentBackend, WorkloadBackend};
use helmrp_provider::error::ProviderError;
use helmrp_provider::registry::StaticRegistry;
use helmrp_provider::service::RuntimeProvider;

use common::*;

fn credential(content: &str) -> RuntimeCredential {
    RuntimeCredential {
        runtime_credential_id: "rc-1".into(),
        provider: "kubernetes".into(),
        content: content.into(),
    }
}

fn fixture() -> (RuntimeProvider, CallLog) {
    let log = CallLog::default();
    let provider = provider(
        FakeDeployment::new(log.clone()).with_existing_release("taken"),
        FakeWorkload::new(log.clone()),
        &log,
    );
    (provider, log)
}

// ---------------------------------------------------------------------------
// Name uniqueness
// ---------------------------------------------------------------------------

#[tokio::test]
async fn free_name_passes_uniqueness_check() {
    let (provider, log) = fixture();
    provider.check_name_unique(&cluster()).await.unwrap();
    assert_eq!(
        log.calls(),
        vec![Call::CheckNameUnique {
            name: CLUSTER_NAME.into()
        }]
    );
}

#[tokio::test]
async fn taken_name_is_rejected() {
    let (provider, _log) = fixture();
    let mut wrapper = cluster();
    wrapper.cluster.name = "taken".into();

    assert_matches!(
        provider.check_name_unique(&wrapper).await,
        Err(ProviderError::Backend(BackendError::Failed(msg))) if msg.contains("already exists")
    );
}

// ---------------------------------------------------------------------------
// Workload passthroughs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn describe_cluster_details_fills_ready_replicas() {
    let (provider, _log) = fixture();
    let described = provider.describe_cluster_details(cluster()).await.unwrap();

    assert_eq!(described.cluster, cluster().cluster);
    for role in &described.cluster_roles {
        assert_eq!(role.ready_replicas, role.replicas);
    }
}

#[tokio::test]
async fn validate_runtime_delegates_to_workload_backend() {
    let (provider, log) = fixture();

    provider
        .validate_runtime(RUNTIME_ID, ZONE, &credential("kubeconfig"), false)
        .await
        .unwrap();
    provider
        .validate_runtime(RUNTIME_ID, "new-zone", &credential("kubeconfig"), true)
        .await
        .unwrap();
    assert_matches!(
        provider
            .validate_runtime(RUNTIME_ID, "new-zone", &credential("kubeconfig"), false)
            .await,
        Err(ProviderError::Backend(BackendError::NotFound(_)))
    );

    assert_eq!(log.count(|c| matches!(c, Call::ValidateRuntime { .. })), 3);
}

#[tokio::test]
async fn list_zones_uses_unregistered_runtime() {
    let (provider, _log) = fixture();
    let zones = provider.list_zones(&credential("kubeconfig")).await.unwrap();
    assert_eq!(zones, vec!["default".to_string(), ZONE.to_string()]);

    assert_matches!(
        provider.list_zones(&credential("")).await,
        Err(ProviderError::Backend(_))
    );
}

#[tokio::test]
async fn list_zones_without_fallback_is_not_found() {
    let log = CallLog::default();
    let deployment: Arc<dyn DeploymentBackend> = Arc::new(FakeDeployment::new(log.clone()));
    let workload: Arc<dyn WorkloadBackend> = Arc::new(FakeWorkload::new(log.clone()));
    let registry = StaticRegistry::new().with_runtime(RUNTIME_ID, ZONE, deployment, workload);
    let provider = RuntimeProvider::new(
        Arc::new(registry),
        Arc::new(FakePackages::new(log.clone())),
        test_config(),
    );

    assert_matches!(
        provider.list_zones(&credential("kubeconfig")).await,
        Err(ProviderError::Backend(BackendError::NotFound(_)))
    );
    assert!(log.is_empty());
}

#[test]
fn subnets_and_vpcs_are_unsupported() {
    let (provider, _log) = fixture();
    assert_matches!(
        provider.describe_subnets(),
        Err(ProviderError::UnsupportedAction(name)) if name == "DescribeSubnets"
    );
    assert_matches!(
        provider.describe_vpc(),
        Err(ProviderError::UnsupportedAction(name)) if name == "DescribeVpc"
    );
}

// ---------------------------------------------------------------------------
// Registry-driven splitting
// ---------------------------------------------------------------------------

#[test]
fn split_resolves_zone_from_registry() {
    let (provider, _log) = fixture();
    let mut job = job(JobAction::CreateCluster);
    let mut wrapper = cluster();
    wrapper.cluster.zone.clear();
    job.directive = wrapper.encode();

    let plan = provider.split_job(&job).unwrap();
    let directive = plan.tasks().next().unwrap().decode_directive().unwrap();
    assert_eq!(directive.namespace, ZONE);
}

#[test]
fn split_uses_fallback_zone_for_unknown_runtime() {
    let (provider, _log) = fixture();
    let mut job = job(JobAction::RollbackCluster);
    let mut wrapper = cluster();
    wrapper.cluster.zone.clear();
    wrapper.cluster.runtime_id = "rt-other".into();
    job.directive = wrapper.encode();

    let plan = provider.split_job(&job).unwrap();
    let task = plan.tasks().next().unwrap();
    assert_eq!(task.runtime_id, "rt-other");
    assert_eq!(task.decode_directive().unwrap().namespace, "default");
}

#[test]
fn split_rejects_unsupported_job() {
    let (provider, _log) = fixture();
    assert_matches!(
        provider.split_job(&job(JobAction::ResizeCluster)),
        Err(ProviderError::UnsupportedAction(name)) if name == "ResizeCluster"
    );
}
