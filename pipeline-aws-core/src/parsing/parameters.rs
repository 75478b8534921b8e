//! Parameter files: a JSON array of CloudFormation parameter objects, or a YAML
//! mapping of parameter names to scalars and lists.

use std::path::Path;

use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

use crate::error::{StepError, StepResult};
use crate::types::ParameterRecord;

const PARAMETER_KEY: &str = "ParameterKey";
const PARAMETER_VALUE: &str = "ParameterValue";
const USE_PREVIOUS_VALUE: &str = "UsePreviousValue";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterFileFormat {
    Json,
    Yaml,
}

impl ParameterFileFormat {
    /// Pick the format from the file suffix. Only `.json` and `.yaml` are recognized.
    pub fn from_path(path: impl AsRef<Path>) -> StepResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("yaml") => Ok(Self::Yaml),
            _ => Err(StepError::UnsupportedExtension(
                path.display().to_string(),
            )),
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

/// A named parameter file whose content has already been read.
#[derive(Debug, Clone)]
pub struct ParameterFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl ParameterFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    pub fn format(&self) -> StepResult<ParameterFileFormat> {
        ParameterFileFormat::from_path(&self.name)
    }

    /// Dispatch on the file name, then parse.
    pub fn parse(&self) -> StepResult<Vec<ParameterRecord>> {
        let format = self.format()?;
        parse_file(&self.content, format)
    }
}

/// Parse parameter file content in the declared format, preserving input order.
pub fn parse_file(content: &[u8], format: ParameterFileFormat) -> StepResult<Vec<ParameterRecord>> {
    match format {
        ParameterFileFormat::Json => parse_json(content),
        ParameterFileFormat::Yaml => parse_yaml(content),
    }
}

fn parse_json(content: &[u8]) -> StepResult<Vec<ParameterRecord>> {
    let format = ParameterFileFormat::Json.name();
    let root: JsonValue =
        serde_json::from_slice(content).map_err(|e| StepError::format(format, e.to_string()))?;

    // A root that is not an array carries no parameters.
    let JsonValue::Array(entries) = root else {
        log::warn!("Parameter file root is not a JSON array, no parameters read");
        return Ok(Vec::new());
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| json_entry_to_record(index, entry))
        .collect()
}

fn json_entry_to_record(index: usize, entry: &JsonValue) -> StepResult<ParameterRecord> {
    let format = ParameterFileFormat::Json.name();
    let object = entry.as_object().ok_or_else(|| {
        StepError::format(format, format!("parameter entry {index} is not an object"))
    })?;

    let key = match object.get(PARAMETER_KEY) {
        Some(JsonValue::String(key)) if !key.is_empty() => key.clone(),
        Some(JsonValue::String(_)) => {
            return Err(StepError::format(
                format,
                format!("parameter entry {index} has an empty {PARAMETER_KEY}"),
            ))
        }
        Some(_) => {
            return Err(StepError::format(
                format,
                format!("parameter entry {index}: {PARAMETER_KEY} must be a string"),
            ))
        }
        None => {
            return Err(StepError::format(
                format,
                format!("parameter entry {index} is missing {PARAMETER_KEY}"),
            ))
        }
    };

    let value = match object.get(PARAMETER_VALUE) {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(value)) => Some(value.clone()),
        Some(JsonValue::Number(value)) => Some(value.to_string()),
        Some(JsonValue::Bool(value)) => Some(value.to_string()),
        Some(_) => {
            return Err(StepError::format(
                format,
                format!("parameter '{key}': {PARAMETER_VALUE} must be a scalar"),
            ))
        }
    };

    let use_previous_value = match object.get(USE_PREVIOUS_VALUE) {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::Bool(flag)) => Some(*flag),
        Some(_) => {
            return Err(StepError::format(
                format,
                format!("parameter '{key}': {USE_PREVIOUS_VALUE} must be a boolean"),
            ))
        }
    };

    Ok(ParameterRecord {
        key,
        value,
        use_previous_value,
    })
}

fn parse_yaml(content: &[u8]) -> StepResult<Vec<ParameterRecord>> {
    let format = ParameterFileFormat::Yaml.name();
    let root: YamlValue =
        serde_yaml::from_slice(content).map_err(|e| StepError::format(format, e.to_string()))?;

    let mapping = match root {
        YamlValue::Mapping(mapping) => mapping,
        YamlValue::Null => {
            return Err(StepError::format(format, "parameter document is empty"));
        }
        _ => {
            return Err(StepError::format(
                format,
                "expected a mapping of parameter names to values",
            ));
        }
    };

    mapping
        .iter()
        .map(|(key, value)| {
            let key = scalar_to_string(key)
                .filter(|key| !key.is_empty())
                .ok_or_else(|| {
                    StepError::format(format, "parameter names must be non-empty scalars")
                })?;
            let value = yaml_value_to_string(&key, value)?;
            Ok(ParameterRecord {
                key,
                value,
                use_previous_value: None,
            })
        })
        .collect()
}

/// Scalars map to their string form; lists are comma-joined without escaping.
fn yaml_value_to_string(key: &str, value: &YamlValue) -> StepResult<Option<String>> {
    let format = ParameterFileFormat::Yaml.name();
    match value {
        YamlValue::Null => Ok(None),
        YamlValue::Sequence(items) => {
            let parts = items
                .iter()
                .map(|item| {
                    scalar_to_string(item).ok_or_else(|| {
                        StepError::format(
                            format,
                            format!("parameter '{key}': list entries must be scalars"),
                        )
                    })
                })
                .collect::<StepResult<Vec<_>>>()?;
            Ok(Some(parts.join(",")))
        }
        other => scalar_to_string(other).map(Some).ok_or_else(|| {
            StepError::format(
                format,
                format!("parameter '{key}' must be a scalar or a list of scalars"),
            )
        }),
    }
}

fn scalar_to_string(value: &YamlValue) -> Option<String> {
    match value {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("params.json", Some(ParameterFileFormat::Json))]
    #[case("nested/dir/params.yaml", Some(ParameterFileFormat::Yaml))]
    #[case("params.yml", None)]
    #[case("params.JSON", None)]
    #[case("params.txt", None)]
    #[case("params", None)]
    fn test_format_from_path(#[case] path: &str, #[case] expected: Option<ParameterFileFormat>) {
        let result = ParameterFileFormat::from_path(path);
        match expected {
            Some(format) => assert_eq!(result.unwrap(), format),
            None => assert!(matches!(result, Err(StepError::UnsupportedExtension(_)))),
        }
    }

    #[test]
    fn test_json_copies_present_fields_in_order() {
        let content = br#"[
            {"ParameterKey": "TestParam", "ParameterValue": "TestValue"},
            {"ParameterKey": "KeepMe", "UsePreviousValue": true},
            {"ParameterKey": "Both", "ParameterValue": "v", "UsePreviousValue": false}
        ]"#;
        let records = parse_file(content, ParameterFileFormat::Json).unwrap();
        assert_eq!(
            records,
            vec![
                ParameterRecord::with_value("TestParam", "TestValue"),
                ParameterRecord::keep_previous("KeepMe"),
                ParameterRecord {
                    key: "Both".into(),
                    value: Some("v".into()),
                    use_previous_value: Some(false),
                },
            ]
        );
    }

    #[test]
    fn test_json_scalar_values_are_stringified() {
        let content = br#"[
            {"ParameterKey": "Port", "ParameterValue": 8080},
            {"ParameterKey": "Ratio", "ParameterValue": 0.5},
            {"ParameterKey": "Enabled", "ParameterValue": false}
        ]"#;
        let records = parse_file(content, ParameterFileFormat::Json).unwrap();
        assert_eq!(
            records,
            vec![
                ParameterRecord::with_value("Port", "8080"),
                ParameterRecord::with_value("Ratio", "0.5"),
                ParameterRecord::with_value("Enabled", "false"),
            ]
        );
    }

    #[rstest]
    #[case(r#"[{"ParameterKey": "Subnets", "ParameterValue": ["a", "b"]}]"#)]
    #[case(r#"[{"ParameterKey": "Tags", "ParameterValue": {"k": "v"}}]"#)]
    fn test_json_structured_value_is_format_error(#[case] content: &str) {
        let err = parse_file(content.as_bytes(), ParameterFileFormat::Json).unwrap_err();
        assert!(matches!(err, StepError::Format { format: "JSON", .. }));
        assert!(err.to_string().contains("ParameterValue"));
    }

    #[rstest]
    #[case(r#"{"ParameterKey": "foo", "ParameterValue": "bar"}"#)]
    #[case(r#""just a string""#)]
    #[case("42")]
    #[case("null")]
    fn test_json_non_array_root_is_empty(#[case] content: &str) {
        let records = parse_file(content.as_bytes(), ParameterFileFormat::Json).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_json_missing_key_is_format_error() {
        let content = br#"[{"ParameterValue": "orphan"}]"#;
        let err = parse_file(content, ParameterFileFormat::Json).unwrap_err();
        assert!(matches!(err, StepError::Format { format: "JSON", .. }));
        assert!(err.to_string().contains("ParameterKey"));
    }

    #[test]
    fn test_json_malformed_is_format_error() {
        let err = parse_file(b"[{", ParameterFileFormat::Json).unwrap_err();
        assert!(matches!(err, StepError::Format { format: "JSON", .. }));
    }

    #[test]
    fn test_yaml_scalar_value() {
        let records = parse_file(b"bar: foo\n", ParameterFileFormat::Yaml).unwrap();
        assert_eq!(records, vec![ParameterRecord::with_value("bar", "foo")]);
    }

    #[test]
    fn test_yaml_list_value_is_comma_joined() {
        let records = parse_file(b"bar:\n  - foo1\n  - foo2\n", ParameterFileFormat::Yaml).unwrap();
        assert_eq!(records, vec![ParameterRecord::with_value("bar", "foo1,foo2")]);
    }

    #[test]
    fn test_yaml_non_string_scalars_and_order() {
        let content = b"zeta: 3\nalpha: true\nmid: [1, two, false]\n";
        let records = parse_file(content, ParameterFileFormat::Yaml).unwrap();
        assert_eq!(
            records,
            vec![
                ParameterRecord::with_value("zeta", "3"),
                ParameterRecord::with_value("alpha", "true"),
                ParameterRecord::with_value("mid", "1,two,false"),
            ]
        );
    }

    #[test]
    fn test_yaml_null_value_has_neither_value_nor_previous_flag() {
        let records = parse_file(b"Key:\nOther: x\n", ParameterFileFormat::Yaml).unwrap();
        assert_eq!(
            records,
            vec![
                ParameterRecord {
                    key: "Key".into(),
                    value: None,
                    use_previous_value: None,
                },
                ParameterRecord::with_value("Other", "x"),
            ]
        );
    }

    #[test]
    fn test_yaml_embedded_commas_are_not_escaped() {
        let records = parse_file(b"subnets: ['a,b', c]\n", ParameterFileFormat::Yaml).unwrap();
        assert_eq!(records[0].value.as_deref(), Some("a,b,c"));
    }

    #[test]
    fn test_yaml_empty_document_is_error() {
        let err = parse_file(b"", ParameterFileFormat::Yaml).unwrap_err();
        assert!(matches!(err, StepError::Format { format: "YAML", .. }));
    }

    #[test]
    fn test_yaml_nested_mapping_is_error() {
        let err = parse_file(b"outer:\n  inner: x\n", ParameterFileFormat::Yaml).unwrap_err();
        assert!(err.to_string().contains("outer"));
    }

    #[test]
    fn test_parameter_file_rejects_extension_before_parsing() {
        let file = ParameterFile::new("params.txt", b"not even json".to_vec());
        assert!(matches!(
            file.parse(),
            Err(StepError::UnsupportedExtension(name)) if name == "params.txt"
        ));
    }
}
