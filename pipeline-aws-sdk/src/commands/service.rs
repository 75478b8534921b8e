//! Pipeline Steps Service Layer
//!
//! This module provides the service interface that the host (CLI or another
//! automation server) drives. The service holds the client factory and exposes
//! one operation per pipeline step; each operation is a thin adapter over the
//! core components and the SDK wrappers.

use pipeline_aws_core::AssumedCredentials;

use crate::aws::client_factory::{AwsClientFactory, ClientContext};

/// Main service struct that holds the AWS client factory
pub struct PipelineStepsService {
    pub(crate) factory: AwsClientFactory,
}

impl PipelineStepsService {
    /// Create a new service instance.
    ///
    /// The SDK configuration is loaded with the default credential provider
    /// chain, overridden by the region, profile and endpoint in `context`.
    pub async fn new(context: &ClientContext) -> Self {
        Self {
            factory: AwsClientFactory::load(context).await,
        }
    }

    pub fn from_factory(factory: AwsClientFactory) -> Self {
        Self { factory }
    }

    /// A service whose clients authenticate with `credentials`.
    pub fn with_credentials(&self, credentials: &AssumedCredentials) -> Self {
        Self {
            factory: self.factory.with_credentials(credentials),
        }
    }

    pub fn region(&self) -> Option<&str> {
        self.factory.region()
    }

    // CodeDeploy steps are in codedeploy.rs
    // ECR steps are in ecr.rs
    // ELB steps are in elb.rs
    // Role assumption is in role.rs
}
