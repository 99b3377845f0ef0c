//! Pull a typed [`AnalysisResult`] out of loosely-structured model output.
//!
//! Model replies often wrap the JSON object in prose or markdown fences. A
//! greedy `{.*}` match breaks as soon as the prose itself contains braces, so
//! candidates are located with a brace-matching scan that understands JSON
//! string literals and escapes.

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::analysis::{AnalysisKind, AnalysisResult, Compatibility, DailyInsight, LifeMap};
use crate::validate::{SchemaViolation, validate_result};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    #[error("no JSON object found in response")]
    NoJsonObject,
    #[error("response does not match the {kind} shape: {source}")]
    Shape {
        kind: AnalysisKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("schema violations: {}", join_violations(.0))]
    Schema(Vec<SchemaViolation>),
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Iterate over every balanced `{...}` span in `text`, in order of their
/// opening brace.
///
/// Spans may nest: after yielding an outer object the scan continues from the
/// next opening brace, which can lie inside it.
pub fn balanced_objects(text: &str) -> impl Iterator<Item = &str> {
    text.match_indices('{')
        .filter_map(move |(start, _)| balanced_end(&text[start..]).map(|len| &text[start..start + len]))
}

/// Return the first balanced `{...}` span that decodes as a JSON object.
pub fn find_json_object(text: &str) -> Option<&str> {
    balanced_objects(text).find(|candidate| {
        serde_json::from_str::<serde_json::Value>(candidate)
            .map(|value| value.is_object())
            .unwrap_or(false)
    })
}

/// Length in bytes of the balanced object starting at `text[0] == '{'`.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + ch.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse free-form model text into a validated result of `kind`.
pub fn parse_analysis_text(kind: AnalysisKind, text: &str) -> Result<AnalysisResult, ParseError> {
    let object = find_json_object(text).ok_or(ParseError::NoJsonObject)?;
    let value: serde_json::Value =
        serde_json::from_str(object).map_err(|source| ParseError::Shape { kind, source })?;
    parse_analysis_value(kind, value)
}

/// Validate an already-decoded payload.
///
/// A JSON string is treated as model text and scanned for an embedded object,
/// since some backends relay the raw reply instead of decoding it.
pub fn parse_analysis_value(
    kind: AnalysisKind,
    value: serde_json::Value,
) -> Result<AnalysisResult, ParseError> {
    if let serde_json::Value::String(text) = &value {
        return parse_analysis_text(kind, text);
    }

    let result = match kind {
        AnalysisKind::DailyInsight => AnalysisResult::DailyInsight(decode::<DailyInsight>(kind, value)?),
        AnalysisKind::LifeMap => AnalysisResult::LifeMap(decode::<LifeMap>(kind, value)?),
        AnalysisKind::Compatibility => {
            AnalysisResult::Compatibility(decode::<Compatibility>(kind, value)?)
        }
    };

    validate_result(&result).map_err(ParseError::Schema)?;
    Ok(result)
}

fn decode<T: DeserializeOwned>(kind: AnalysisKind, value: serde_json::Value) -> Result<T, ParseError> {
    serde_json::from_value(value).map_err(|source| ParseError::Shape { kind, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn finds_object_surrounded_by_prose() {
        let text = "Sure! Here you go:\n{\"a\": 1}\nHope that helps.";
        assert_eq!(find_json_object(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn nested_objects_stay_balanced() {
        let text = "result: {\"outer\": {\"inner\": {\"x\": 1}}, \"y\": 2} trailing }";
        assert_eq!(
            find_json_object(text),
            Some("{\"outer\": {\"inner\": {\"x\": 1}}, \"y\": 2}")
        );
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let text = r#"{"note": "use } and { freely", "quote": "say \"hi\" }"}"#;
        assert_eq!(find_json_object(text), Some(text));
    }

    #[test]
    fn greedy_match_pitfall_is_avoided() {
        // A greedy `{.*}` match would swallow both objects plus the prose
        // between them and fail to decode.
        let text = "{\"first\": true} and later {\"second\": true}";
        assert_eq!(find_json_object(text), Some("{\"first\": true}"));
    }

    #[test]
    fn skips_non_json_brace_spans() {
        let text = "Reading {for you}: {\"ok\": 1}";
        assert_eq!(find_json_object(text), Some("{\"ok\": 1}"));
    }

    #[test]
    fn unbalanced_input_yields_nothing() {
        assert_eq!(find_json_object("{\"a\": 1, \"b\": 2"), None);
        assert_eq!(find_json_object("no braces at all"), None);
    }

    #[test]
    fn truncated_outer_object_falls_back_to_inner_span() {
        assert_eq!(find_json_object("{\"a\": {\"b\": 1}"), Some("{\"b\": 1}"));
    }

    #[test]
    fn multibyte_text_is_sliced_on_char_boundaries() {
        let text = "✨ 결과 ✨ {\"icon\": \"⚡\"} 🌙";
        assert_eq!(find_json_object(text), Some("{\"icon\": \"⚡\"}"));
    }

    #[test]
    fn parses_fenced_model_output() {
        let text = testing::in_markdown_fence(testing::COMPATIBILITY_JSON);
        let result = parse_analysis_text(AnalysisKind::Compatibility, &text).unwrap();
        assert_eq!(result.as_compatibility().unwrap().overall, 91);
    }

    #[test]
    fn missing_field_is_a_shape_error() {
        let err = parse_analysis_text(
            AnalysisKind::Compatibility,
            r#"{"work": 80, "relationship": 70}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::Shape { kind: AnalysisKind::Compatibility, .. }));
    }

    #[test]
    fn fractional_or_negative_scores_are_rejected() {
        let text = testing::COMPATIBILITY_JSON.replace("\"work\": 84", "\"work\": 84.5");
        assert!(parse_analysis_text(AnalysisKind::Compatibility, &text).is_err());

        let text = testing::COMPATIBILITY_JSON.replace("\"work\": 84", "\"work\": -3");
        assert!(parse_analysis_text(AnalysisKind::Compatibility, &text).is_err());
    }

    #[test]
    fn schema_violation_is_reported() {
        let text = testing::COMPATIBILITY_JSON.replace("\"overall\": 91", "\"overall\": 120");
        let err = parse_analysis_text(AnalysisKind::Compatibility, &text).unwrap_err();
        assert!(matches!(err, ParseError::Schema(_)));
        assert!(err.to_string().contains("overall = 120"));
    }

    #[test]
    fn string_value_is_scanned_as_text() {
        let value = serde_json::Value::String(format!("Analysis: {}", testing::LIFE_MAP_JSON));
        let result = parse_analysis_value(AnalysisKind::LifeMap, value).unwrap();
        assert_eq!(result.as_life_map().unwrap().personality_scores.openness, 88);
    }

    #[test]
    fn no_object_in_text() {
        let err = parse_analysis_text(AnalysisKind::DailyInsight, "I cannot help with that.")
            .unwrap_err();
        assert!(matches!(err, ParseError::NoJsonObject));
    }
}
