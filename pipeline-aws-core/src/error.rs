//! Error types shared by every pipeline step.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Classified failures surfaced to the host for logging and build-result mapping.
#[derive(Debug, Error)]
pub enum StepError {
    /// The parameter file suffix is neither `.json` nor `.yaml`.
    #[error("Unsupported parameter file extension: {0}")]
    UnsupportedExtension(String),

    /// Malformed JSON/YAML, or a mandatory field is missing.
    #[error("Invalid {format} content: {message}")]
    Format {
        format: &'static str,
        message: String,
    },

    /// An inline parameter without a `=` separator.
    #[error("Missing '=' in parameter '{0}'")]
    MalformedParameter(String),

    #[error("Deployment {deployment_id} failed: {message}")]
    DeploymentFailed {
        deployment_id: String,
        message: String,
    },

    #[error("Deployment {0} was stopped")]
    DeploymentStopped(String),

    /// The deadline elapsed before the deployment reached a terminal status.
    #[error("Deployment {deployment_id} did not complete within {max_duration:?}")]
    TimeoutExceeded {
        deployment_id: String,
        max_duration: Duration,
    },

    /// Opaque pass-through failure from an AWS API call.
    #[error("AWS API error: {0}")]
    Api(String),

    #[error("Invalid role assumption request: {0}")]
    InvalidRoleRequest(String),

    #[error("File not found in workspace: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StepError {
    /// Build a [`StepError::Format`] for content in the named format (`"JSON"`, `"YAML"`).
    pub fn format(format: &'static str, message: impl Into<String>) -> Self {
        Self::Format {
            format,
            message: message.into(),
        }
    }

    /// Wrap an AWS API failure message.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api(message.into())
    }

    /// Reject a role assumption request before it reaches STS.
    pub fn invalid_role_request(message: impl Into<String>) -> Self {
        Self::InvalidRoleRequest(message.into())
    }
}

pub type StepResult<T> = Result<T, StepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_message() {
        let err = StepError::format("JSON", "missing field `Key`");
        assert_eq!(
            err.to_string(),
            "Invalid JSON content: missing field `Key`"
        );
    }

    #[test]
    fn test_deployment_failed_message() {
        let err = StepError::DeploymentFailed {
            deployment_id: "d-ABC123".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Deployment d-ABC123 failed: boom");
    }
}
