//! Commands module - service layer for the pipeline step operations

mod codedeploy;
mod ecr;
mod elb;
mod role;
pub(crate) mod service;

pub use service::PipelineStepsService;
