use async_trait::async_trait;
use aws_sdk_sts::error::DisplayErrorContext;
use aws_sdk_sts::types::{AssumedRoleUser, Credentials};
use aws_sdk_sts::Client as StsClient;
use chrono::DateTime;
use pipeline_aws_core::{
    AssumedCredentials, DirectAssumeRequest, FederatedAssumeRequest, RoleAssumer, StepError,
    StepResult,
};

/// Return the current caller account ID using STS GetCallerIdentity.
///
/// Used to synthesize a role ARN when only a role name is given.
pub async fn caller_account_id(client: &StsClient) -> StepResult<String> {
    let out = client
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| {
            StepError::api(format!(
                "STS GetCallerIdentity failed: {}",
                DisplayErrorContext(&e)
            ))
        })?;
    out.account()
        .map(str::to_string)
        .ok_or_else(|| StepError::api("STS GetCallerIdentity missing Account"))
}

/// [`RoleAssumer`] backed by the STS `AssumeRole` and `AssumeRoleWithSAML` calls.
pub struct StsRoleAssumer {
    client: StsClient,
}

impl StsRoleAssumer {
    pub fn new(client: StsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RoleAssumer for StsRoleAssumer {
    async fn assume_role(&self, request: &DirectAssumeRequest) -> StepResult<AssumedCredentials> {
        let out = self
            .client
            .assume_role()
            .role_arn(&request.role_arn)
            .role_session_name(&request.session_name)
            .set_external_id(request.external_id.clone())
            .set_policy(request.policy.clone())
            .set_duration_seconds(request.duration_seconds)
            .send()
            .await
            .map_err(|e| {
                StepError::api(format!(
                    "STS AssumeRole failed for '{}': {}",
                    request.role_arn,
                    DisplayErrorContext(&e)
                ))
            })?;
        to_assumed_credentials(out.credentials(), out.assumed_role_user())
    }

    async fn assume_role_with_saml(
        &self,
        request: &FederatedAssumeRequest,
    ) -> StepResult<AssumedCredentials> {
        let out = self
            .client
            .assume_role_with_saml()
            .role_arn(&request.role_arn)
            .principal_arn(&request.principal_arn)
            .saml_assertion(&request.saml_assertion)
            .set_policy(request.policy.clone())
            .set_duration_seconds(request.duration_seconds)
            .send()
            .await
            .map_err(|e| {
                StepError::api(format!(
                    "STS AssumeRoleWithSAML failed for '{}': {}",
                    request.role_arn,
                    DisplayErrorContext(&e)
                ))
            })?;
        to_assumed_credentials(out.credentials(), out.assumed_role_user())
    }
}

fn to_assumed_credentials(
    credentials: Option<&Credentials>,
    user: Option<&AssumedRoleUser>,
) -> StepResult<AssumedCredentials> {
    let credentials =
        credentials.ok_or_else(|| StepError::api("STS response contained no credentials"))?;
    let expiration = credentials.expiration();
    let expiration = DateTime::from_timestamp(expiration.secs(), expiration.subsec_nanos())
        .ok_or_else(|| StepError::api("STS credentials expiration is out of range"))?;
    Ok(AssumedCredentials {
        access_key_id: credentials.access_key_id().to_string(),
        secret_access_key: credentials.secret_access_key().to_string(),
        session_token: credentials.session_token().to_string(),
        expiration,
        assumed_role_user_id: user
            .map(|user| user.assumed_role_id().to_string())
            .unwrap_or_default(),
    })
}
