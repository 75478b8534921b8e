//! CloudFormation parameter and tag file parsing (pure Rust)

pub mod overrides;
pub mod parameters;
pub mod tags;

pub use overrides::{parse_keep_params, parse_params, parse_with_overrides, ParameterSource};
pub use parameters::{parse_file, ParameterFile, ParameterFileFormat};
pub use tags::parse_tags;
