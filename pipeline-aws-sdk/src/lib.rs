//! AWS SDK integration for the pipeline steps.
//!
//! The adapters in [`aws`] implement the capability traits from
//! `pipeline-aws-core` on top of the official SDK clients, and
//! [`PipelineStepsService`] strings them together into the step operations
//! a host (such as the CLI) invokes.

pub mod aws;
pub mod commands;

pub use aws::client_factory::{AwsClientFactory, ClientContext, EnvSource, ProcessEnv};
pub use aws::codedeploy::{CodeDeployClient, CreateDeploymentConfig};
pub use aws::ecr::{
    decode_authorization_token, DeleteImagesConfig, DeleteImagesReport, EcrClient,
    EcrImagePages, EcrLogin, ImageDeleteFailure, ListImagesConfig,
};
pub use aws::elb::{ElbClient, TargetGroupConfig, TargetSpec};
pub use aws::sts::StsRoleAssumer;
pub use commands::PipelineStepsService;
