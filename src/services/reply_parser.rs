//! Best-effort decoding of free-text assistant replies.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::models::reflection::Reflection;

// ```json\n{...}``` or ```\n{...}```
static ACTIVITIES_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\n(.+?)```").expect("valid fence pattern"));

// The reflection assistant sometimes omits the newline after the fence.
static OBJECT_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```").expect("valid fence pattern")
});

/// Body of the first fenced code block, or the whole (trimmed) reply.
pub fn strip_code_fence(raw: &str) -> &str {
    let clean = raw.trim();
    ACTIVITIES_FENCE
        .captures(clean)
        .and_then(|captures| captures.get(1))
        .map(|body| body.as_str())
        .unwrap_or(clean)
}

/// The `activities` list of the reply's JSON object, or an empty list if the
/// reply is not shaped that way.
pub fn parse_activities(raw: &str) -> Vec<Value> {
    let body = strip_code_fence(raw);
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(mut fields)) => match fields.remove("activities") {
            Some(Value::Array(activities)) => activities,
            _ => Vec::new(),
        },
        Ok(_) => Vec::new(),
        Err(err) => {
            log::debug!("Assistant reply is not JSON: {}", err);
            Vec::new()
        }
    }
}

/// Decode a reflection reply. Anything that is not a JSON object is returned
/// verbatim in the `reflections` field.
pub fn parse_reflection(raw: &str) -> Reflection {
    let body = OBJECT_FENCE
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map(|body| body.as_str())
        .unwrap_or(raw);

    match serde_json::from_str::<Value>(body) {
        Ok(object @ Value::Object(_)) => serde_json::from_value(object).unwrap_or_else(|err| {
            log::debug!("Reflection object could not be decoded: {}", err);
            Reflection::from_raw_text(raw)
        }),
        Ok(_) => {
            log::debug!("Reflection reply is JSON but not an object");
            Reflection::from_raw_text(raw)
        }
        Err(err) => {
            log::debug!("Reflection reply is not JSON: {}", err);
            Reflection::from_raw_text(raw)
        }
    }
}
