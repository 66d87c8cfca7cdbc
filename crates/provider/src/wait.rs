//! Bounded polling primitive.
//!
//! [`wait_until`] repeatedly sleeps for `interval` and runs a probe until
//! the probe reports completion, reports an error, or the budget runs out.
//! The probe owns every retry decision: any error it returns stops the
//! wait immediately. The sleep and the probe are the only suspension
//! points.
//!
//! There is no cancellation channel in the loop itself. Callers that need
//! one wrap their probe with [`cancellable`].

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ProviderError;

/// Poll `probe` every `interval` until it returns `Ok(true)`.
///
/// - `Err(e)` from the probe is returned as is.
/// - `Ok(false)` keeps polling while less than `timeout` has elapsed, then
///   fails with [`ProviderError::Timeout`].
///
/// A probe that reports `false` N times before reporting `true` succeeds
/// exactly when `N * interval < timeout`.
pub async fn wait_until<F, Fut>(
    mut probe: F,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, ProviderError>>,
{
    let start = Instant::now();
    let mut attempt = 0u32;

    loop {
        tokio::time::sleep(interval).await;
        attempt += 1;

        if probe().await? {
            tracing::debug!(attempt, "Wait condition reached");
            return Ok(());
        }

        if start.elapsed() >= timeout {
            tracing::debug!(
                attempt,
                timeout_ms = timeout.as_millis() as u64,
                "Wait budget exhausted",
            );
            return Err(ProviderError::Timeout { timeout });
        }
    }
}

/// Wrap `probe` so that it fails with [`ProviderError::Cancelled`] once
/// `cancel` has been triggered, including while a probe call is in flight.
pub fn cancellable<F, Fut>(
    mut probe: F,
    cancel: CancellationToken,
) -> impl FnMut() -> std::pin::Pin<Box<dyn Future<Output = Result<bool, ProviderError>> + Send>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, ProviderError>> + Send + 'static,
{
    move || {
        let fut = probe();
        let cancel = cancel.clone();
        Box::pin(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ProviderError::Cancelled),
                result = fut => result,
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
