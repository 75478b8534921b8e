//! Merging a parameter file with inline `KEY=VALUE` overrides and keep-lists.

use crate::error::{StepError, StepResult};
use crate::parsing::parameters::ParameterFile;
use crate::types::ParameterRecord;

/// The three parameter origins, each optional.
#[derive(Debug, Clone, Default)]
pub struct ParameterSource {
    pub file: Option<ParameterFile>,
    pub params: Option<Vec<String>>,
    pub keep_params: Option<Vec<String>>,
}

/// Concatenate file records, inline records and keep-records, in that order.
///
/// Duplicate keys across sources are kept as-is.
pub fn parse_with_overrides(source: ParameterSource) -> StepResult<Vec<ParameterRecord>> {
    let mut records = match &source.file {
        Some(file) => file.parse()?,
        None => Vec::new(),
    };
    if let Some(params) = &source.params {
        records.extend(parse_params(params)?);
    }
    if let Some(keep_params) = &source.keep_params {
        records.extend(parse_keep_params(keep_params));
    }
    Ok(records)
}

/// Parse `KEY=VALUE` strings, splitting on the first `=`.
pub fn parse_params<S: AsRef<str>>(params: &[S]) -> StepResult<Vec<ParameterRecord>> {
    params
        .iter()
        .map(|param| {
            let param = param.as_ref();
            match param.split_once('=') {
                Some((key, value)) if !key.is_empty() => {
                    Ok(ParameterRecord::with_value(key, value))
                }
                _ => Err(StepError::MalformedParameter(param.to_string())),
            }
        })
        .collect()
}

/// Turn each key into a record that keeps the stack's previous value.
pub fn parse_keep_params<S: AsRef<str>>(keys: &[S]) -> Vec<ParameterRecord> {
    keys.iter()
        .map(|key| ParameterRecord::keep_previous(key.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_params_preserve_order() {
        let records = parse_params(&["foo=bar", "baz=true"]).unwrap();
        assert_eq!(
            records,
            vec![
                ParameterRecord::with_value("foo", "bar"),
                ParameterRecord::with_value("baz", "true"),
            ]
        );
    }

    #[test]
    fn test_inline_param_splits_on_first_separator() {
        let records = parse_params(&["url=https://x?a=b", "empty="]).unwrap();
        assert_eq!(records[0].value.as_deref(), Some("https://x?a=b"));
        assert_eq!(records[1].value.as_deref(), Some(""));
    }

    #[test]
    fn test_missing_separator_fails_without_partial_result() {
        let err = parse_params(&["foo=bar", "broken"]).unwrap_err();
        assert!(matches!(err, StepError::MalformedParameter(p) if p == "broken"));
    }

    #[test]
    fn test_empty_key_is_malformed() {
        assert!(matches!(
            parse_params(&["=value"]),
            Err(StepError::MalformedParameter(_))
        ));
    }

    #[test]
    fn test_keep_params() {
        let records = parse_keep_params(&["x"]);
        assert_eq!(records, vec![ParameterRecord::keep_previous("x")]);
        assert!(records[0].value.is_none());
    }

    #[test]
    fn test_merge_inline_only() {
        let source = ParameterSource {
            params: Some(vec!["foo=bar".into(), "baz=true".into()]),
            ..Default::default()
        };
        let records = parse_with_overrides(source).unwrap();
        assert_eq!(
            records,
            vec![
                ParameterRecord::with_value("foo", "bar"),
                ParameterRecord::with_value("baz", "true"),
            ]
        );
    }

    #[test]
    fn test_merge_keeps_duplicates_in_source_order() {
        let source = ParameterSource {
            file: Some(ParameterFile::new("p.yaml", b"Env: dev\n".to_vec())),
            params: Some(vec!["Env=prod".into()]),
            keep_params: Some(vec!["Env".into()]),
        };
        let records = parse_with_overrides(source).unwrap();
        assert_eq!(
            records,
            vec![
                ParameterRecord::with_value("Env", "dev"),
                ParameterRecord::with_value("Env", "prod"),
                ParameterRecord::keep_previous("Env"),
            ]
        );
    }

    #[test]
    fn test_merge_empty_source() {
        assert!(parse_with_overrides(ParameterSource::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_merge_propagates_file_errors() {
        let source = ParameterSource {
            file: Some(ParameterFile::new("p.ini", Vec::new())),
            params: Some(vec!["a=b".into()]),
            ..Default::default()
        };
        assert!(matches!(
            parse_with_overrides(source),
            Err(StepError::UnsupportedExtension(_))
        ));
    }
}
