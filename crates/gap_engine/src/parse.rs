use serde::Deserialize;
use serde_json::Value;

use crate::AnalysisResult;

/// Field the service uses to wrap the model output as a string.
pub const RAW_OUTPUT_FIELD: &str = "raw_output";

const FENCE_OPEN_JSON: &str = "```json";
const FENCE: &str = "```";
const RESULT_FIELDS: [&str; 3] = ["matched", "missing", "suggestions"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("payload is not valid json after fence stripping: {0}")]
    InvalidJson(String),
    #[error("payload does not have the result shape: {0}")]
    UnexpectedShape(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawResult {
    matched: Option<Vec<String>>,
    missing: Option<Vec<String>>,
    suggestions: Option<Vec<String>>,
}

impl From<RawResult> for AnalysisResult {
    fn from(raw: RawResult) -> Self {
        Self {
            matched: raw.matched.unwrap_or_default(),
            missing: raw.missing.unwrap_or_default(),
            suggestions: raw.suggestions.unwrap_or_default(),
        }
    }
}

/// Removes every markdown fence token (```` ```json ```` and ```` ``` ````) and trims.
///
/// Tokens are matched in a single left-to-right scan, preferring the tagged form.
pub fn strip_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find(FENCE) {
        out.push_str(&rest[..at]);
        let token = if rest[at..].starts_with(FENCE_OPEN_JSON) {
            FENCE_OPEN_JSON
        } else {
            FENCE
        };
        rest = &rest[at + token.len()..];
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// Turns a decoded response body into an `AnalysisResult`.
///
/// A truthy `raw_output` field is the payload; otherwise the body itself is.
/// String payloads are fence-stripped and parsed, objects are decoded as-is.
/// Absent or `null` list fields become empty lists, but a body used as its
/// own payload must carry at least one result field.
pub fn extract_result(body: &Value) -> Result<AnalysisResult, ParseError> {
    let payload = match body.get(RAW_OUTPUT_FIELD).filter(|value| is_truthy(value)) {
        Some(raw) => raw,
        None => {
            if body.is_object() && !RESULT_FIELDS.iter().any(|field| body.get(field).is_some()) {
                return Err(ParseError::UnexpectedShape(format!(
                    "body has no {} and none of {}",
                    RAW_OUTPUT_FIELD,
                    RESULT_FIELDS.join(", ")
                )));
            }
            body
        }
    };

    let parsed;
    let value = match payload {
        Value::String(text) => {
            parsed = serde_json::from_str::<Value>(&strip_fences(text))
                .map_err(|err| ParseError::InvalidJson(err.to_string()))?;
            &parsed
        }
        other => other,
    };

    if !value.is_object() {
        return Err(ParseError::UnexpectedShape(format!(
            "expected an object, found {}",
            json_type(value)
        )));
    }
    RawResult::deserialize(value)
        .map(AnalysisResult::from)
        .map_err(|err| ParseError::UnexpectedShape(err.to_string()))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
