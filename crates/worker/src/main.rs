use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use helmrp_core::job::Job;
use helmrp_provider::backend::{BackendError, PackageStore};
use helmrp_provider::config::ProviderConfig;
use helmrp_provider::registry::StaticRegistry;
use helmrp_provider::service::RuntimeProvider;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Planning never fetches charts.
struct NoPackages;

#[async_trait]
impl PackageStore for NoPackages {
    async fn fetch_package(&self, version_id: &str) -> Result<Vec<u8>, BackendError> {
        Err(BackendError::Unavailable(format!(
            "no package store attached, cannot fetch [{version_id}]"
        )))
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "helmrp_worker=debug,helmrp_provider=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = ?e, "Worker failed");
        std::process::exit(1);
    }
}

/// Read a job from the first argument (or stdin) and print its task plan.
async fn run() -> anyhow::Result<()> {
    let config = ProviderConfig::from_env()?;
    tracing::info!(
        wait_interval_secs = config.wait_interval.as_secs(),
        workload_ready_timeout_secs = config.workload_ready_timeout.as_secs(),
        "Worker starting",
    );

    let raw = match std::env::args().nth(1) {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read job file {path}"))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read job from stdin")?;
            buf
        }
    };

    let job: Job = serde_json::from_str(&raw).context("invalid job document")?;

    let provider = RuntimeProvider::new(
        Arc::new(StaticRegistry::new()),
        Arc::new(NoPackages),
        config,
    );
    let plan = provider.split_job(&job)?;

    tracing::info!(
        job_id = %job.job_id,
        stages = plan.len(),
        tasks = plan.task_count(),
        "Job split",
    );
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
