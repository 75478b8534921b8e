//! Building and executing direct or SAML-federated role assumption requests.

use async_trait::async_trait;

use super::arn::{build_role_arn, is_valid_role_arn};
use super::credentials::AssumedCredentials;
use crate::error::{StepError, StepResult};

/// Which role to assume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleTarget {
    /// A full role ARN, used verbatim.
    Arn(String),
    /// A bare role name; the ARN is synthesized from account and region.
    Named {
        role_name: String,
        account_id: String,
        region: String,
    },
}

impl RoleTarget {
    pub fn to_arn(&self) -> String {
        match self {
            Self::Arn(arn) => arn.clone(),
            Self::Named {
                role_name,
                account_id,
                region,
            } => build_role_arn(role_name, account_id, region),
        }
    }
}

/// Everything a caller can say about the role it wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleSpec {
    pub role: RoleTarget,
    pub session_name: String,
    pub external_id: Option<String>,
    pub policy: Option<String>,
    pub duration_seconds: Option<i32>,
    pub saml_assertion: Option<String>,
    pub principal_arn: Option<String>,
}

impl AssumeRoleSpec {
    pub fn new(role: RoleTarget, session_name: impl Into<String>) -> Self {
        Self {
            role,
            session_name: session_name.into(),
            external_id: None,
            policy: None,
            duration_seconds: None,
            saml_assertion: None,
            principal_arn: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectAssumeRequest {
    pub role_arn: String,
    pub session_name: String,
    pub external_id: Option<String>,
    pub policy: Option<String>,
    pub duration_seconds: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedAssumeRequest {
    pub role_arn: String,
    pub principal_arn: String,
    pub saml_assertion: String,
    pub policy: Option<String>,
    pub duration_seconds: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssumeRoleRequest {
    Direct(DirectAssumeRequest),
    Federated(FederatedAssumeRequest),
}

impl AssumeRoleRequest {
    pub fn role_arn(&self) -> &str {
        match self {
            Self::Direct(request) => &request.role_arn,
            Self::Federated(request) => &request.role_arn,
        }
    }
}

/// STS capability: exchange the current identity, or a SAML assertion, for role credentials.
#[async_trait]
pub trait RoleAssumer: Send + Sync {
    async fn assume_role(&self, request: &DirectAssumeRequest) -> StepResult<AssumedCredentials>;

    async fn assume_role_with_saml(
        &self,
        request: &FederatedAssumeRequest,
    ) -> StepResult<AssumedCredentials>;
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Turn a spec into the request for the matching STS path.
///
/// A non-empty SAML assertion selects the federated path and then requires a
/// principal ARN. Empty optional strings are dropped rather than sent.
pub fn build_request(spec: AssumeRoleSpec) -> StepResult<AssumeRoleRequest> {
    let role_arn = spec.role.to_arn();
    if role_arn.is_empty() {
        return Err(StepError::invalid_role_request("role ARN is empty"));
    }
    if !is_valid_role_arn(&role_arn) {
        log::warn!("Role ARN '{}' does not look like an IAM role ARN", role_arn);
    }

    let policy = non_empty(spec.policy);
    let external_id = non_empty(spec.external_id);
    let principal_arn = non_empty(spec.principal_arn);

    match non_empty(spec.saml_assertion) {
        Some(saml_assertion) => {
            let principal_arn = principal_arn.ok_or_else(|| {
                StepError::invalid_role_request(
                    "a SAML assertion requires the identity provider principal ARN",
                )
            })?;
            Ok(AssumeRoleRequest::Federated(FederatedAssumeRequest {
                role_arn,
                principal_arn,
                saml_assertion,
                policy,
                duration_seconds: spec.duration_seconds,
            }))
        }
        None => {
            if spec.session_name.is_empty() {
                return Err(StepError::invalid_role_request("session name is empty"));
            }
            Ok(AssumeRoleRequest::Direct(DirectAssumeRequest {
                role_arn,
                session_name: spec.session_name,
                external_id,
                policy,
                duration_seconds: spec.duration_seconds,
            }))
        }
    }
}

/// Send `request` through `assumer`. Service errors are returned unchanged.
pub async fn execute<R>(request: &AssumeRoleRequest, assumer: &R) -> StepResult<AssumedCredentials>
where
    R: RoleAssumer + ?Sized,
{
    log::info!("Assuming role {}", request.role_arn());
    let credentials = match request {
        AssumeRoleRequest::Direct(direct) => assumer.assume_role(direct).await?,
        AssumeRoleRequest::Federated(federated) => {
            assumer.assume_role_with_saml(federated).await?
        }
    };
    log::info!(
        "Assumed role as {} until {}",
        credentials.assumed_role_user_id,
        credentials.expiration
    );
    Ok(credentials)
}
