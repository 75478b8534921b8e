//! AWS CodeDeploy client wrapper: creating deployments and reading their status.

use async_trait::async_trait;
use aws_sdk_codedeploy::error::DisplayErrorContext;
use aws_sdk_codedeploy::types::{
    BundleType, DeploymentInfo, RevisionLocation, RevisionLocationType, S3Location,
};
use aws_sdk_codedeploy::Client as CodeDeployApi;
use pipeline_aws_core::{
    DeploymentStatus, DeploymentStatusFetcher, StatusReport, StepError, StepResult,
};

/// An S3-hosted revision to roll out to a deployment group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDeploymentConfig {
    pub application_name: String,
    pub deployment_group_name: String,
    pub s3_bucket: String,
    pub s3_key: String,
    /// One of `zip`, `tar`, `tgz`, `YAML` or `JSON`.
    pub bundle_type: String,
    pub description: Option<String>,
    pub ignore_application_stop_failures: bool,
}

pub struct CodeDeployClient {
    client: CodeDeployApi,
}

impl CodeDeployClient {
    pub fn new(client: CodeDeployApi) -> Self {
        Self { client }
    }

    /// Start a deployment and return its id.
    pub async fn create_deployment(&self, config: &CreateDeploymentConfig) -> StepResult<String> {
        let location = S3Location::builder()
            .bucket(&config.s3_bucket)
            .key(&config.s3_key)
            .bundle_type(BundleType::from(config.bundle_type.as_str()))
            .build();
        let revision = RevisionLocation::builder()
            .revision_type(RevisionLocationType::S3)
            .s3_location(location)
            .build();

        let response = self
            .client
            .create_deployment()
            .application_name(&config.application_name)
            .deployment_group_name(&config.deployment_group_name)
            .revision(revision)
            .set_description(config.description.clone())
            .ignore_application_stop_failures(config.ignore_application_stop_failures)
            .send()
            .await
            .map_err(|e| {
                StepError::api(format!(
                    "CodeDeploy CreateDeployment failed for application '{}' group '{}': {}",
                    config.application_name,
                    config.deployment_group_name,
                    DisplayErrorContext(&e)
                ))
            })?;

        response
            .deployment_id()
            .map(str::to_string)
            .ok_or_else(|| StepError::api("CodeDeploy CreateDeployment returned no deployment id"))
    }
}

#[async_trait]
impl DeploymentStatusFetcher for CodeDeployClient {
    async fn fetch_status(&self, deployment_id: &str) -> StepResult<StatusReport> {
        let response = self
            .client
            .get_deployment()
            .deployment_id(deployment_id)
            .send()
            .await
            .map_err(|e| {
                StepError::api(format!(
                    "CodeDeploy GetDeployment failed for '{deployment_id}': {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        let info = response.deployment_info().ok_or_else(|| {
            StepError::api(format!(
                "CodeDeploy GetDeployment returned no deployment info for '{deployment_id}'"
            ))
        })?;
        Ok(status_report(info))
    }
}

fn status_report(info: &DeploymentInfo) -> StatusReport {
    let status = info.status().map_or_else(
        || DeploymentStatus::Other("Unknown".to_string()),
        |status| DeploymentStatus::from(status.as_str()),
    );
    let error_message = info
        .error_information()
        .and_then(|error| error.message())
        .map(str::to_string);
    StatusReport {
        status,
        error_message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_codedeploy::types::{DeploymentStatus as ApiStatus, ErrorInformation};

    #[test]
    fn test_failed_deployment_carries_error_message() {
        let info = DeploymentInfo::builder()
            .deployment_id("d-ABC123")
            .status(ApiStatus::Failed)
            .error_information(ErrorInformation::builder().message("boom").build())
            .build();
        assert_eq!(status_report(&info), StatusReport::failed("boom"));
    }

    #[test]
    fn test_in_progress_deployment() {
        let info = DeploymentInfo::builder()
            .status(ApiStatus::InProgress)
            .build();
        let report = status_report(&info);
        assert_eq!(report.status, DeploymentStatus::InProgress);
        assert_eq!(report.error_message, None);
    }

    #[test]
    fn test_missing_status_is_non_terminal() {
        let report = status_report(&DeploymentInfo::builder().build());
        assert!(!report.outcome().is_terminal());
    }
}
