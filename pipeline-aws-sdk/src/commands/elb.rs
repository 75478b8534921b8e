//! ELB steps: register and deregister targets

use pipeline_aws_core::StepResult;

use crate::aws::elb::{ElbClient, TargetGroupConfig};

fn describe_targets(config: &TargetGroupConfig) -> String {
    config
        .targets
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl super::service::PipelineStepsService {
    pub async fn register_targets(&self, config: &TargetGroupConfig) -> StepResult<()> {
        ElbClient::new(self.factory.elbv2())
            .register_targets(config)
            .await?;
        log::info!(
            "Registered [{}] with {}",
            describe_targets(config),
            config.target_group_arn
        );
        Ok(())
    }

    pub async fn deregister_targets(&self, config: &TargetGroupConfig) -> StepResult<()> {
        ElbClient::new(self.factory.elbv2())
            .deregister_targets(config)
            .await?;
        log::info!(
            "Deregistered [{}] from {}",
            describe_targets(config),
            config.target_group_arn
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_targets() {
        let config = TargetGroupConfig {
            target_group_arn: "tg".into(),
            targets: vec!["i-1:80".parse().unwrap(), "i-2".parse().unwrap()],
        };
        assert_eq!(describe_targets(&config), "i-1:80, i-2");
    }
}
