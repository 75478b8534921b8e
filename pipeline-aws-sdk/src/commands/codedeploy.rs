//! CodeDeploy steps: create a deployment and wait for it to finish

use pipeline_aws_core::{wait_for_deployment, StepResult, WaitConfig};

use crate::aws::codedeploy::{CodeDeployClient, CreateDeploymentConfig};

impl super::service::PipelineStepsService {
    /// Start a deployment. With `wait` set, block until it finishes and fail
    /// the step unless it succeeded.
    pub async fn create_deployment(
        &self,
        config: &CreateDeploymentConfig,
        wait: Option<WaitConfig>,
    ) -> StepResult<String> {
        let client = CodeDeployClient::new(self.factory.codedeploy());
        let deployment_id = client.create_deployment(config).await?;
        log::info!(
            "Created deployment {} for {}/{} from s3://{}/{}",
            deployment_id,
            config.application_name,
            config.deployment_group_name,
            config.s3_bucket,
            config.s3_key
        );
        if let Some(wait) = wait {
            wait_for_deployment(&deployment_id, &client, &wait).await?;
        }
        Ok(deployment_id)
    }

    /// Poll an existing deployment until it finishes.
    ///
    /// Every non-success outcome is an error naming the deployment id.
    pub async fn wait_for_deployment(
        &self,
        deployment_id: &str,
        config: &WaitConfig,
    ) -> StepResult<()> {
        let client = CodeDeployClient::new(self.factory.codedeploy());
        wait_for_deployment(deployment_id, &client, config).await
    }
}
