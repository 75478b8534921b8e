//! Role assumption step

use pipeline_aws_core::{
    build_request, execute, AssumeRoleSpec, AssumedCredentials, RoleTarget, StepError, StepResult,
};

use crate::aws::sts::{caller_account_id, StsRoleAssumer};

impl super::service::PipelineStepsService {
    /// Resolve a bare role name to a target, asking STS for the caller's
    /// account when none is given and using the configured region.
    pub async fn role_target(
        &self,
        role_name: &str,
        account_id: Option<String>,
    ) -> StepResult<RoleTarget> {
        let account_id = match account_id {
            Some(account_id) => account_id,
            None => caller_account_id(&self.factory.sts()).await?,
        };
        let region = self
            .region()
            .ok_or_else(|| {
                StepError::invalid_role_request("a region is needed to build the role ARN")
            })?
            .to_string();
        Ok(RoleTarget::Named {
            role_name: role_name.to_string(),
            account_id,
            region,
        })
    }

    pub async fn assume_role(&self, spec: AssumeRoleSpec) -> StepResult<AssumedCredentials> {
        let request = build_request(spec)?;
        execute(&request, &StsRoleAssumer::new(self.factory.sts())).await
    }
}
