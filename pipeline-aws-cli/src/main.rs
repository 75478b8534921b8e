//! `pipeline-aws`: run a single AWS pipeline step from a CI job.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use pipeline_aws_sdk::TargetSpec;

mod steps;

#[derive(Parser, Debug)]
#[command(name = "pipeline-aws", version, about = "AWS steps for CI/CD pipelines")]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) global: GlobalArgs,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Args, Debug)]
pub(crate) struct GlobalArgs {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub(crate) verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub(crate) quiet: bool,

    /// AWS region (falls back to AWS_REGION, then AWS_DEFAULT_REGION)
    #[arg(long, global = true)]
    pub(crate) region: Option<String>,

    /// Named AWS profile (falls back to AWS_PROFILE)
    #[arg(long, global = true)]
    pub(crate) profile: Option<String>,

    /// Custom AWS endpoint URL
    #[arg(long, global = true)]
    pub(crate) endpoint_url: Option<String>,

    /// Workspace root that file arguments are resolved against
    #[arg(long, global = true, env = "PIPELINE_AWS_WORKSPACE", default_value = ".")]
    pub(crate) workspace: PathBuf,

    /// Run the step with credentials of this role
    #[arg(long, global = true)]
    pub(crate) assume_role_arn: Option<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Merge a parameter file with inline and keep-previous parameters
    ParseParams {
        /// Parameter file (.json or .yaml), relative to the workspace
        #[arg(long)]
        file: Option<String>,
        /// Inline parameter override
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        /// Parameter that keeps its previous value
        #[arg(long = "keep", value_name = "KEY")]
        keep_params: Vec<String>,
    },
    /// Parse a JSON tag file
    ParseTags {
        /// Tag file, relative to the workspace
        #[arg(long)]
        file: String,
    },
    /// Build a role ARN from a role name and account id
    RoleArn {
        #[arg(long)]
        role: String,
        #[arg(long)]
        account: String,
    },
    /// Check that an ARN looks like an IAM role ARN
    ValidateRoleArn { arn: String },
    /// Assume a role and print the credentials as shell exports
    AssumeRole(AssumeRoleArgs),
    /// Create a CodeDeploy deployment from an S3 revision
    Deploy(DeployArgs),
    /// Wait for a CodeDeploy deployment to finish
    WaitDeployment {
        #[arg(long)]
        deployment_id: String,
        /// Give up after this many minutes
        #[arg(long)]
        timeout_minutes: Option<u64>,
    },
    /// List the images of an ECR repository
    ListImages {
        #[arg(long)]
        repository: String,
        #[arg(long)]
        registry_id: Option<String>,
        #[arg(long, value_parser = ["TAGGED", "UNTAGGED", "ANY"])]
        tag_status: Option<String>,
    },
    /// Delete images from an ECR repository
    DeleteImages {
        #[arg(long)]
        repository: String,
        #[arg(long)]
        registry_id: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long = "digest")]
        digests: Vec<String>,
    },
    /// Print a docker login command for ECR
    EcrLogin {
        #[arg(long = "registry-id")]
        registry_ids: Vec<String>,
    },
    /// Register targets with an ELB target group
    RegisterTargets(TargetArgs),
    /// Deregister targets from an ELB target group
    DeregisterTargets(TargetArgs),
}

#[derive(Args, Debug)]
pub(crate) struct AssumeRoleArgs {
    /// Full role ARN
    #[arg(long, conflicts_with_all = ["role", "account"], required_unless_present = "role")]
    pub(crate) role_arn: Option<String>,
    /// Role name; the ARN is built from account and region
    #[arg(long)]
    pub(crate) role: Option<String>,
    /// Account of the role (defaults to the caller's account)
    #[arg(long, requires = "role")]
    pub(crate) account: Option<String>,
    #[arg(long)]
    pub(crate) session_name: Option<String>,
    #[arg(long)]
    pub(crate) external_id: Option<String>,
    /// Inline session policy (JSON)
    #[arg(long)]
    pub(crate) policy: Option<String>,
    #[arg(long)]
    pub(crate) duration_seconds: Option<i32>,
    /// Base64 SAML assertion; switches to AssumeRoleWithSAML
    #[arg(long, requires = "principal_arn")]
    pub(crate) saml_assertion: Option<String>,
    /// ARN of the SAML identity provider
    #[arg(long)]
    pub(crate) principal_arn: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct DeployArgs {
    #[arg(long)]
    pub(crate) application: String,
    #[arg(long)]
    pub(crate) deployment_group: String,
    #[arg(long)]
    pub(crate) s3_bucket: String,
    #[arg(long)]
    pub(crate) s3_key: String,
    #[arg(long, default_value = "zip", value_parser = ["zip", "tar", "tgz", "YAML", "JSON"])]
    pub(crate) bundle_type: String,
    #[arg(long)]
    pub(crate) description: Option<String>,
    #[arg(long)]
    pub(crate) ignore_application_stop_failures: bool,
    /// Wait for the deployment to finish
    #[arg(long)]
    pub(crate) wait: bool,
    /// Give up waiting after this many minutes
    #[arg(long, requires = "wait")]
    pub(crate) timeout_minutes: Option<u64>,
}

#[derive(Args, Debug)]
pub(crate) struct TargetArgs {
    #[arg(long)]
    pub(crate) target_group_arn: String,
    /// Target as `id` or `id:port`
    #[arg(long = "target", required = true)]
    pub(crate) targets: Vec<TargetSpec>,
}

fn init_logging(global: &GlobalArgs) {
    let level = if global.quiet {
        "warn"
    } else {
        match global.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.global);

    match steps::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
