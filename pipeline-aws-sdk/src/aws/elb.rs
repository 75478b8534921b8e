//! Elastic Load Balancing v2 client wrapper: target (de)registration.

use std::fmt;
use std::str::FromStr;

use aws_sdk_elasticloadbalancingv2::error::DisplayErrorContext;
use aws_sdk_elasticloadbalancingv2::types::TargetDescription;
use aws_sdk_elasticloadbalancingv2::Client as ElbApi;
use pipeline_aws_core::{StepError, StepResult};

/// A target written as `id` or `id:port`. Lambda ARNs never carry a port.
///
/// IPv6 addresses take a port only in the bracketed `[addr]:port` form; a bare
/// address with more than one `:` is an id without a port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    pub id: String,
    pub port: Option<i32>,
}

fn parse_port(port: &str, target: &str) -> Result<i32, String> {
    port.parse::<i32>()
        .ok()
        .filter(|port| (1..=65535).contains(port))
        .ok_or_else(|| format!("invalid port in target '{target}'"))
}

impl TargetSpec {
    fn to_api(&self) -> StepResult<TargetDescription> {
        Ok(TargetDescription::builder()
            .id(&self.id)
            .set_port(self.port)
            .build())
    }

    fn without_port(id: &str) -> Self {
        Self {
            id: id.to_string(),
            port: None,
        }
    }

    fn parse_bracketed(s: &str) -> Result<Self, String> {
        let (address, rest) = s
            .strip_prefix('[')
            .and_then(|inner| inner.split_once(']'))
            .ok_or_else(|| format!("unterminated '[' in target '{s}'"))?;
        if address.is_empty() {
            return Err(format!("target id is empty in '{s}'"));
        }
        let port = match rest {
            "" => None,
            _ => {
                let port = rest
                    .strip_prefix(':')
                    .ok_or_else(|| format!("unexpected text after ']' in target '{s}'"))?;
                Some(parse_port(port, s)?)
            }
        };
        Ok(Self {
            id: address.to_string(),
            port,
        })
    }
}

impl FromStr for TargetSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("target id is empty".to_string());
        }
        if s.starts_with("arn:") {
            return Ok(Self::without_port(s));
        }
        if s.starts_with('[') {
            return Self::parse_bracketed(s);
        }
        if s.matches(':').count() > 1 {
            return Ok(Self::without_port(s));
        }
        match s.split_once(':') {
            None => Ok(Self::without_port(s)),
            Some((id, port)) => {
                let port = parse_port(port, s)?;
                if id.is_empty() {
                    return Err(format!("target id is empty in '{s}'"));
                }
                Ok(Self {
                    id: id.to_string(),
                    port: Some(port),
                })
            }
        }
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) if self.id.contains(':') => write!(f, "[{}]:{}", self.id, port),
            Some(port) => write!(f, "{}:{}", self.id, port),
            None => f.write_str(&self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetGroupConfig {
    pub target_group_arn: String,
    pub targets: Vec<TargetSpec>,
}

impl TargetGroupConfig {
    fn descriptions(&self) -> StepResult<Vec<TargetDescription>> {
        self.targets.iter().map(TargetSpec::to_api).collect()
    }
}

pub struct ElbClient {
    client: ElbApi,
}

impl ElbClient {
    pub fn new(client: ElbApi) -> Self {
        Self { client }
    }

    /// Register every target of `config` with its target group.
    pub async fn register_targets(&self, config: &TargetGroupConfig) -> StepResult<()> {
        self.client
            .register_targets()
            .target_group_arn(&config.target_group_arn)
            .set_targets(Some(config.descriptions()?))
            .send()
            .await
            .map_err(|e| {
                StepError::api(format!(
                    "ELB RegisterTargets failed for '{}': {}",
                    config.target_group_arn,
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }

    /// Deregister every target of `config` from its target group.
    pub async fn deregister_targets(&self, config: &TargetGroupConfig) -> StepResult<()> {
        self.client
            .deregister_targets()
            .target_group_arn(&config.target_group_arn)
            .set_targets(Some(config.descriptions()?))
            .send()
            .await
            .map_err(|e| {
                StepError::api(format!(
                    "ELB DeregisterTargets failed for '{}': {}",
                    config.target_group_arn,
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("i-0abc", "i-0abc", None)]
    #[case("i-0abc:8080", "i-0abc", Some(8080))]
    #[case("10.0.0.12:443", "10.0.0.12", Some(443))]
    #[case(
        "arn:aws:lambda:us-east-1:123456789012:function:handler:1",
        "arn:aws:lambda:us-east-1:123456789012:function:handler:1",
        None
    )]
    fn test_parse_target(#[case] input: &str, #[case] id: &str, #[case] port: Option<i32>) {
        let target: TargetSpec = input.parse().unwrap();
        assert_eq!(target.id, id);
        assert_eq!(target.port, port);
        assert_eq!(target.to_string(), input);
    }

    #[rstest]
    #[case("2001:db8::1", "2001:db8::1", None, "2001:db8::1")]
    #[case("[2001:db8::1]:443", "2001:db8::1", Some(443), "[2001:db8::1]:443")]
    #[case("[::1]", "::1", None, "::1")]
    #[case("fe80::1:8080", "fe80::1:8080", None, "fe80::1:8080")]
    fn test_parse_ipv6_target(
        #[case] input: &str,
        #[case] id: &str,
        #[case] port: Option<i32>,
        #[case] displayed: &str,
    ) {
        let target: TargetSpec = input.parse().unwrap();
        assert_eq!(target.id, id);
        assert_eq!(target.port, port);
        assert_eq!(target.to_string(), displayed);
    }

    #[rstest]
    #[case("")]
    #[case("[]:80")]
    #[case("[2001:db8::1")]
    #[case("[2001:db8::1]443")]
    #[case("[2001:db8::1]:0")]
    #[case("i-0abc:http")]
    #[case("i-0abc:0")]
    #[case("i-0abc:70000")]
    #[case(":80")]
    fn test_parse_target_rejects(#[case] input: &str) {
        assert!(input.parse::<TargetSpec>().is_err());
    }

    #[test]
    fn test_target_descriptions() {
        let config = TargetGroupConfig {
            target_group_arn: "arn:aws:elasticloadbalancing:us-east-1:123456789012:targetgroup/web/abc".into(),
            targets: vec!["i-1:80".parse().unwrap(), "i-2".parse().unwrap()],
        };
        let descriptions = config.descriptions().unwrap();
        assert_eq!(descriptions[0].id(), "i-1");
        assert_eq!(descriptions[0].port(), Some(80));
        assert_eq!(descriptions[1].port(), None);
    }
}
