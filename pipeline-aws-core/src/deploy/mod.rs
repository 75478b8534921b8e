//! CodeDeploy deployment tracking: status classification and the completion poller.

mod poller;
mod status;

pub use poller::{wait_for_completion, wait_for_deployment, WaitConfig, DEFAULT_POLL_INTERVAL};
pub use status::{DeploymentStatus, DeploymentStatusFetcher, StatusReport};
