//! AWS SDK integration: client factory plus one adapter per service.

pub mod client_factory;
pub mod codedeploy;
pub mod ecr;
pub mod elb;
pub mod sts;
