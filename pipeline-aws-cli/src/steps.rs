//! Subcommand handlers. Each one gathers its inputs, calls into the core or
//! the service layer, and prints the result on stdout.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use pipeline_aws_core::{
    build_role_arn, is_valid_role_arn, parse_tags, parse_with_overrides, AssumeRoleSpec,
    ImageIdentifier, ParameterSource, RoleTarget, WaitConfig, WorkspaceReader,
};
use pipeline_aws_sdk::{
    ClientContext, CreateDeploymentConfig, DeleteImagesConfig, ListImagesConfig,
    PipelineStepsService, ProcessEnv, TargetGroupConfig,
};

use crate::{AssumeRoleArgs, Cli, Command, DeployArgs, GlobalArgs};

const SESSION_NAME_PREFIX: &str = "pipeline-aws";

fn default_session_name() -> String {
    format!("{}-{}", SESSION_NAME_PREFIX, chrono::Utc::now().timestamp())
}

fn wait_config(timeout_minutes: Option<u64>) -> WaitConfig {
    timeout_minutes.map_or_else(WaitConfig::default, |minutes| {
        WaitConfig::with_max_duration(Duration::from_secs(minutes.saturating_mul(60)))
    })
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    (!values.is_empty()).then_some(values)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn client_context(global: &GlobalArgs) -> ClientContext {
    ClientContext {
        region: global.region.clone(),
        profile: global.profile.clone(),
        endpoint_url: global.endpoint_url.clone(),
    }
    .resolve(&ProcessEnv)
}

/// Build the service, switching to role credentials when `--assume-role-arn` is set.
async fn service(global: &GlobalArgs) -> Result<PipelineStepsService> {
    let service = PipelineStepsService::new(&client_context(global)).await;
    let Some(role_arn) = &global.assume_role_arn else {
        return Ok(service);
    };
    let spec = AssumeRoleSpec::new(RoleTarget::Arn(role_arn.clone()), default_session_name());
    let credentials = service
        .assume_role(spec)
        .await
        .with_context(|| format!("Failed to assume role {role_arn}"))?;
    Ok(service.with_credentials(&credentials))
}

pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    let global = cli.global;
    let workspace = WorkspaceReader::new(&global.workspace);

    match cli.command {
        Command::ParseParams {
            file,
            params,
            keep_params,
        } => {
            let file = match file {
                Some(name) => Some(workspace.load_parameter_file(&name).await?),
                None => None,
            };
            let records = parse_with_overrides(ParameterSource {
                file,
                params: non_empty(params),
                keep_params: non_empty(keep_params),
            })?;
            print_json(&records)?;
        }
        Command::ParseTags { file } => {
            let content = workspace.read(&file).await?;
            print_json(&parse_tags(&content)?)?;
        }
        Command::RoleArn { role, account } => {
            let context = client_context(&global);
            let Some(region) = context.region else {
                bail!("A region is required to build the role ARN (use --region or AWS_REGION)");
            };
            println!("{}", build_role_arn(&role, &account, &region));
        }
        Command::ValidateRoleArn { arn } => {
            if is_valid_role_arn(&arn) {
                println!("valid");
            } else {
                println!("invalid");
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::AssumeRole(args) => assume_role(&global, args).await?,
        Command::Deploy(args) => deploy(&global, args).await?,
        Command::WaitDeployment {
            deployment_id,
            timeout_minutes,
        } => {
            service(&global)
                .await?
                .wait_for_deployment(&deployment_id, &wait_config(timeout_minutes))
                .await?;
        }
        Command::ListImages {
            repository,
            registry_id,
            tag_status,
        } => {
            let images = service(&global)
                .await?
                .list_images(&ListImagesConfig {
                    repository_name: repository,
                    registry_id,
                    tag_status,
                })
                .await?;
            print_json(&images)?;
        }
        Command::DeleteImages {
            repository,
            registry_id,
            tags,
            digests,
        } => {
            let image_ids: Vec<ImageIdentifier> = tags
                .into_iter()
                .map(ImageIdentifier::tagged)
                .chain(digests.into_iter().map(ImageIdentifier::by_digest))
                .collect();
            if image_ids.is_empty() {
                bail!("Nothing to delete: pass at least one --tag or --digest");
            }
            let report = service(&global)
                .await?
                .delete_images(&DeleteImagesConfig {
                    repository_name: repository,
                    registry_id,
                    image_ids,
                })
                .await?;
            print_json(&report)?;
        }
        Command::EcrLogin { registry_ids } => {
            let login = service(&global).await?.ecr_login(registry_ids).await?;
            println!("{}", login.docker_login_command());
        }
        Command::RegisterTargets(args) => {
            service(&global)
                .await?
                .register_targets(&TargetGroupConfig {
                    target_group_arn: args.target_group_arn,
                    targets: args.targets,
                })
                .await?;
        }
        Command::DeregisterTargets(args) => {
            service(&global)
                .await?
                .deregister_targets(&TargetGroupConfig {
                    target_group_arn: args.target_group_arn,
                    targets: args.targets,
                })
                .await?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn assume_role(global: &GlobalArgs, args: AssumeRoleArgs) -> Result<()> {
    let service = service(global).await?;
    let role = match (args.role_arn, args.role) {
        (Some(arn), _) => RoleTarget::Arn(arn),
        (None, Some(role)) => service.role_target(&role, args.account).await?,
        (None, None) => bail!("Either --role-arn or --role is required"),
    };
    let spec = AssumeRoleSpec {
        external_id: args.external_id,
        policy: args.policy,
        duration_seconds: args.duration_seconds,
        saml_assertion: args.saml_assertion,
        principal_arn: args.principal_arn,
        ..AssumeRoleSpec::new(
            role,
            args.session_name.unwrap_or_else(default_session_name),
        )
    };
    let credentials = service.assume_role(spec).await?;
    for (name, value) in credentials.env_vars() {
        println!("export {name}={value}");
    }
    Ok(())
}

async fn deploy(global: &GlobalArgs, args: DeployArgs) -> Result<()> {
    let config = CreateDeploymentConfig {
        application_name: args.application,
        deployment_group_name: args.deployment_group,
        s3_bucket: args.s3_bucket,
        s3_key: args.s3_key,
        bundle_type: args.bundle_type,
        description: args.description,
        ignore_application_stop_failures: args.ignore_application_stop_failures,
    };
    let service = service(global).await?;
    let deployment_id = service.create_deployment(&config, None).await?;
    println!("{deployment_id}");
    if args.wait {
        service
            .wait_for_deployment(&deployment_id, &wait_config(args.timeout_minutes))
            .await
            .with_context(|| format!("Waiting for deployment {deployment_id} failed"))?;
    }
    Ok(())
}
