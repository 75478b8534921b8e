//! Record and outcome types produced by the core components.

use serde::{Deserialize, Serialize};

/// One CloudFormation stack parameter.
///
/// Serializes with the CloudFormation field names so the records can be handed
/// straight to a `CreateStack`/`UpdateStack` style request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRecord {
    #[serde(rename = "ParameterKey")]
    pub key: String,
    #[serde(rename = "ParameterValue", default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "UsePreviousValue", default, skip_serializing_if = "Option::is_none")]
    pub use_previous_value: Option<bool>,
}

impl ParameterRecord {
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            use_previous_value: None,
        }
    }

    pub fn keep_previous(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            use_previous_value: Some(true),
        }
    }
}

/// One resource tag. Both fields are mandatory in tag files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Classification of a deployment status as seen by the poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentOutcome {
    /// Not terminal yet. Only surfaced when a deadline stopped the wait.
    InProgress,
    Succeeded,
    Failed(String),
    Stopped,
}

impl DeploymentOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// An ECR image reference, by tag and/or digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageIdentifier {
    #[serde(rename = "imageDigest", default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(rename = "imageTag", default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl ImageIdentifier {
    pub fn tagged(tag: impl Into<String>) -> Self {
        Self {
            digest: None,
            tag: Some(tag.into()),
        }
    }

    pub fn by_digest(digest: impl Into<String>) -> Self {
        Self {
            digest: Some(digest.into()),
            tag: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_record_json_omits_absent_fields() {
        let json = serde_json::to_string(&ParameterRecord::keep_previous("x")).unwrap();
        assert_eq!(json, r#"{"ParameterKey":"x","UsePreviousValue":true}"#);

        let json = serde_json::to_string(&ParameterRecord::with_value("foo", "bar")).unwrap();
        assert_eq!(json, r#"{"ParameterKey":"foo","ParameterValue":"bar"}"#);
    }

    #[test]
    fn test_outcome_terminality() {
        assert!(!DeploymentOutcome::InProgress.is_terminal());
        assert!(DeploymentOutcome::Succeeded.is_terminal());
        assert!(DeploymentOutcome::Failed("boom".into()).is_terminal());
        assert!(DeploymentOutcome::Stopped.is_terminal());
    }
}
