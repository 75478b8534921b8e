//! Tag files: a JSON array of `{"Key": .., "Value": ..}` objects.

use crate::error::{StepError, StepResult};
use crate::types::TagRecord;

/// Parse a JSON tag file. Both `Key` and `Value` are mandatory on every entry.
pub fn parse_tags(content: &[u8]) -> StepResult<Vec<TagRecord>> {
    serde_json::from_slice(content).map_err(|e| StepError::format("JSON", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        let content = br#"[{"Key": "Team", "Value": "platform"}, {"Key": "Env", "Value": "dev"}]"#;
        let tags = parse_tags(content).unwrap();
        assert_eq!(
            tags,
            vec![
                TagRecord {
                    key: "Team".into(),
                    value: "platform".into()
                },
                TagRecord {
                    key: "Env".into(),
                    value: "dev".into()
                },
            ]
        );
    }

    #[test]
    fn test_missing_value_is_format_error() {
        let err = parse_tags(br#"[{"Key": "Team"}]"#).unwrap_err();
        assert!(matches!(err, StepError::Format { .. }));
        assert!(err.to_string().contains("Value"));
    }

    #[test]
    fn test_missing_key_is_format_error() {
        let err = parse_tags(br#"[{"Value": "platform"}]"#).unwrap_err();
        assert!(err.to_string().contains("Key"));
    }

    #[test]
    fn test_object_root_is_format_error() {
        assert!(parse_tags(br#"{"Key": "Team", "Value": "x"}"#).is_err());
    }
}
