//! Deployment status values and the capability used to fetch them.

use std::fmt;

use async_trait::async_trait;

use crate::error::StepResult;
use crate::types::DeploymentOutcome;

/// Deployment lifecycle states as reported by CodeDeploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentStatus {
    Created,
    Queued,
    InProgress,
    Baking,
    Ready,
    Succeeded,
    Failed,
    Stopped,
    /// A value this crate does not know about yet. Treated as non-terminal.
    Other(String),
}

impl DeploymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "Created",
            Self::Queued => "Queued",
            Self::InProgress => "InProgress",
            Self::Baking => "Baking",
            Self::Ready => "Ready",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Stopped => "Stopped",
            Self::Other(value) => value,
        }
    }
}

impl From<&str> for DeploymentStatus {
    fn from(value: &str) -> Self {
        match value {
            "Created" => Self::Created,
            "Queued" => Self::Queued,
            "InProgress" => Self::InProgress,
            "Baking" => Self::Baking,
            "Ready" => Self::Ready,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            "Stopped" => Self::Stopped,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One status observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub status: DeploymentStatus,
    pub error_message: Option<String>,
}

impl StatusReport {
    pub fn new(status: DeploymentStatus) -> Self {
        Self {
            status,
            error_message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: DeploymentStatus::Failed,
            error_message: Some(message.into()),
        }
    }

    pub fn outcome(&self) -> DeploymentOutcome {
        match self.status {
            DeploymentStatus::Succeeded => DeploymentOutcome::Succeeded,
            DeploymentStatus::Failed => DeploymentOutcome::Failed(
                self.error_message
                    .clone()
                    .unwrap_or_else(|| "no error message reported".to_string()),
            ),
            DeploymentStatus::Stopped => DeploymentOutcome::Stopped,
            _ => DeploymentOutcome::InProgress,
        }
    }
}

/// Anything that can report the current status of a deployment.
#[async_trait]
pub trait DeploymentStatusFetcher: Send + Sync {
    async fn fetch_status(&self, deployment_id: &str) -> StepResult<StatusReport>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_known_values() {
        for name in ["Created", "Queued", "InProgress", "Baking", "Ready", "Succeeded", "Failed", "Stopped"] {
            assert_eq!(DeploymentStatus::from(name).as_str(), name);
        }
        assert_eq!(
            DeploymentStatus::from("Paused"),
            DeploymentStatus::Other("Paused".to_string())
        );
    }

    #[test]
    fn test_outcome_classification() {
        assert_eq!(
            StatusReport::new(DeploymentStatus::Succeeded).outcome(),
            DeploymentOutcome::Succeeded
        );
        assert_eq!(
            StatusReport::failed("boom").outcome(),
            DeploymentOutcome::Failed("boom".to_string())
        );
        assert_eq!(
            StatusReport::new(DeploymentStatus::Stopped).outcome(),
            DeploymentOutcome::Stopped
        );
        assert_eq!(
            StatusReport::new(DeploymentStatus::Ready).outcome(),
            DeploymentOutcome::InProgress
        );
        assert_eq!(
            StatusReport::new(DeploymentStatus::Other("Paused".into())).outcome(),
            DeploymentOutcome::InProgress
        );
    }
}
