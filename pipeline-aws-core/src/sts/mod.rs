//! Role assumption: ARN helpers, request building and execution through a [`RoleAssumer`].

mod arn;
mod credentials;
mod request;

pub use arn::{build_role_arn, is_valid_role_arn, partition_for_region, CHINA_REGION};
pub use credentials::AssumedCredentials;
pub use request::{
    build_request, execute, AssumeRoleRequest, AssumeRoleSpec, DirectAssumeRequest,
    FederatedAssumeRequest, RoleAssumer, RoleTarget,
};
