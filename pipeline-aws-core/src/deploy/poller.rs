//! Blocking wait for a deployment to reach a terminal status.

use std::time::Duration;

use tokio::time::{sleep, Instant};

use super::status::DeploymentStatusFetcher;
use crate::error::{StepError, StepResult};
use crate::types::DeploymentOutcome;

/// Fixed delay between two status requests.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// How long and how often to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    pub poll_interval: Duration,
    /// Stop retrying once this much time has elapsed. `None` waits forever.
    pub max_duration: Option<Duration>,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_duration: None,
        }
    }
}

impl WaitConfig {
    pub fn with_max_duration(max_duration: Duration) -> Self {
        Self {
            max_duration: Some(max_duration),
            ..Self::default()
        }
    }

    fn deadline_passed(&self, started: Instant) -> bool {
        self.max_duration
            .is_some_and(|max_duration| started.elapsed() > max_duration)
    }
}

/// Poll `fetcher` until the deployment reaches a terminal status.
///
/// The deadline is only checked between polls, so the wait can overrun it by up
/// to one poll interval. When the deadline passes first, `InProgress` is returned
/// and the caller decides how to report the timeout. Fetch errors are returned
/// unchanged and end the wait.
pub async fn wait_for_completion<F>(
    deployment_id: &str,
    fetcher: &F,
    config: &WaitConfig,
) -> StepResult<DeploymentOutcome>
where
    F: DeploymentStatusFetcher + ?Sized,
{
    let started = Instant::now();
    loop {
        let report = fetcher.fetch_status(deployment_id).await?;
        log::info!("Deployment {} status: {}", deployment_id, report.status);

        let outcome = report.outcome();
        if outcome.is_terminal() {
            return Ok(outcome);
        }
        if config.deadline_passed(started) {
            log::warn!(
                "Giving up on deployment {} after {:?}",
                deployment_id,
                started.elapsed()
            );
            return Ok(outcome);
        }
        sleep(config.poll_interval).await;
    }
}

/// Wait for the deployment and turn anything but success into an error.
pub async fn wait_for_deployment<F>(
    deployment_id: &str,
    fetcher: &F,
    config: &WaitConfig,
) -> StepResult<()>
where
    F: DeploymentStatusFetcher + ?Sized,
{
    match wait_for_completion(deployment_id, fetcher, config).await? {
        DeploymentOutcome::Succeeded => {
            log::info!("Deployment {} succeeded", deployment_id);
            Ok(())
        }
        DeploymentOutcome::Failed(message) => Err(StepError::DeploymentFailed {
            deployment_id: deployment_id.to_string(),
            message,
        }),
        DeploymentOutcome::Stopped => Err(StepError::DeploymentStopped(deployment_id.to_string())),
        DeploymentOutcome::InProgress => Err(StepError::TimeoutExceeded {
            deployment_id: deployment_id.to_string(),
            max_duration: config.max_duration.unwrap_or_default(),
        }),
    }
}
