//! This crate provides the core logic behind the pipeline AWS steps:
//! - CloudFormation parameter and tag file parsing, merged with inline overrides
//! - CodeDeploy deployment status polling
//! - Continuation-token pagination
//! - Role assumption request building (direct and SAML federated)
//!
//! Nothing here talks to AWS directly. Each component is driven through a small
//! capability trait so the SDK-backed adapters live in a separate crate.

pub mod deploy;
mod error;
pub mod pagination;
pub mod parsing;
pub mod sts;
mod types;
pub mod workspace;

// Re-exports for a small, focused public API
pub use deploy::{
    wait_for_completion, wait_for_deployment, DeploymentStatus, DeploymentStatusFetcher,
    StatusReport, WaitConfig,
};
pub use error::{StepError, StepResult};
pub use pagination::{collect_all, Page, PageFetcher};
pub use parsing::{
    parse_file, parse_keep_params, parse_params, parse_tags, parse_with_overrides,
    ParameterFile, ParameterFileFormat, ParameterSource,
};
pub use sts::{
    build_request, build_role_arn, execute, is_valid_role_arn, AssumeRoleRequest, AssumeRoleSpec,
    AssumedCredentials, DirectAssumeRequest, FederatedAssumeRequest, RoleAssumer, RoleTarget,
};
pub use types::{DeploymentOutcome, ImageIdentifier, ParameterRecord, TagRecord};
pub use workspace::WorkspaceReader;
