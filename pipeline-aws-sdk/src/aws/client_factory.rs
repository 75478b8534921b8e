//! Building authenticated SDK clients from region/profile hints.

use std::time::SystemTime;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use pipeline_aws_core::AssumedCredentials;

const ASSUMED_ROLE_PROVIDER: &str = "pipeline-aws-assumed-role";

/// Abstraction over environment-variable lookups so tests can supply their own values.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads the process environment. Empty values count as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|value| !value.is_empty())
    }
}

/// Where and as whom the clients talk to AWS.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientContext {
    pub region: Option<String>,
    pub profile: Option<String>,
    /// Custom endpoint, e.g. a local AWS emulator.
    pub endpoint_url: Option<String>,
}

impl ClientContext {
    /// Fill unset fields from `AWS_REGION`, `AWS_DEFAULT_REGION` and `AWS_PROFILE`.
    pub fn resolve<E: EnvSource + ?Sized>(self, env: &E) -> Self {
        let region = self
            .region
            .or_else(|| env.get("AWS_REGION"))
            .or_else(|| env.get("AWS_DEFAULT_REGION"));
        let profile = self.profile.or_else(|| env.get("AWS_PROFILE"));
        Self {
            region,
            profile,
            endpoint_url: self.endpoint_url,
        }
    }
}

/// Produces one client per AWS service from a shared SDK configuration.
#[derive(Debug, Clone)]
pub struct AwsClientFactory {
    config: SdkConfig,
}

impl AwsClientFactory {
    /// Load configuration using the standard credential provider chain,
    /// overridden by whatever `context` sets.
    pub async fn load(context: &ClientContext) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &context.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &context.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint_url) = &context.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        Self {
            config: loader.load().await,
        }
    }

    pub fn from_config(config: SdkConfig) -> Self {
        Self { config }
    }

    pub fn region(&self) -> Option<&str> {
        self.config.region().map(|region| region.as_ref())
    }

    /// Same settings, but authenticated with temporary role credentials.
    pub fn with_credentials(&self, credentials: &AssumedCredentials) -> Self {
        let provider = SharedCredentialsProvider::new(static_credentials(credentials));
        Self {
            config: self
                .config
                .to_builder()
                .credentials_provider(provider)
                .build(),
        }
    }

    pub fn codedeploy(&self) -> aws_sdk_codedeploy::Client {
        aws_sdk_codedeploy::Client::new(&self.config)
    }

    pub fn ecr(&self) -> aws_sdk_ecr::Client {
        aws_sdk_ecr::Client::new(&self.config)
    }

    pub fn elbv2(&self) -> aws_sdk_elasticloadbalancingv2::Client {
        aws_sdk_elasticloadbalancingv2::Client::new(&self.config)
    }

    pub fn sts(&self) -> aws_sdk_sts::Client {
        aws_sdk_sts::Client::new(&self.config)
    }
}

fn static_credentials(credentials: &AssumedCredentials) -> Credentials {
    Credentials::new(
        credentials.access_key_id.clone(),
        credentials.secret_access_key.clone(),
        Some(credentials.session_token.clone()),
        Some(SystemTime::from(credentials.expiration)),
        ASSUMED_ROLE_PROVIDER,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use std::collections::HashMap;

    struct MapEnv(HashMap<&'static str, &'static str>);

    impl EnvSource for MapEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|value| (*value).to_string())
        }
    }

    #[test]
    fn test_explicit_values_win_over_env() {
        let env = MapEnv(HashMap::from([
            ("AWS_REGION", "eu-west-1"),
            ("AWS_PROFILE", "ci"),
        ]));
        let context = ClientContext {
            region: Some("us-east-2".into()),
            profile: Some("deploy".into()),
            endpoint_url: None,
        }
        .resolve(&env);
        assert_eq!(context.region.as_deref(), Some("us-east-2"));
        assert_eq!(context.profile.as_deref(), Some("deploy"));
    }

    #[test]
    fn test_region_falls_back_to_default_region() {
        let env = MapEnv(HashMap::from([("AWS_DEFAULT_REGION", "cn-north-1")]));
        let context = ClientContext::default().resolve(&env);
        assert_eq!(context.region.as_deref(), Some("cn-north-1"));
        assert_eq!(context.profile, None);
    }

    #[test]
    fn test_aws_region_preferred_over_default_region() {
        let env = MapEnv(HashMap::from([
            ("AWS_REGION", "us-west-2"),
            ("AWS_DEFAULT_REGION", "us-east-1"),
        ]));
        let context = ClientContext::default().resolve(&env);
        assert_eq!(context.region.as_deref(), Some("us-west-2"));
    }

    #[test]
    fn test_static_credentials_carry_session_token() {
        let assumed = AssumedCredentials {
            access_key_id: "ASIAEXAMPLE".into(),
            secret_access_key: "secret".into(),
            session_token: "token".into(),
            expiration: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            assumed_role_user_id: "AROA:session".into(),
        };
        let credentials = static_credentials(&assumed);
        assert_eq!(credentials.access_key_id(), "ASIAEXAMPLE");
        assert_eq!(credentials.session_token(), Some("token"));
        assert!(credentials.expiry().is_some());
    }
}
