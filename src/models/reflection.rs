use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ReflectRequest {
    #[serde(default, deserialize_with = "lenient::list")]
    pub activities: Vec<Value>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct HelpRequest {
    #[serde(default, deserialize_with = "lenient::text")]
    pub question: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub activities: Vec<Value>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HelpReply {
    pub reply: String,
}

/// Response shape of `/reflect/`. All four keys are always serialized.
///
/// Decoding never fails on field types: `null` reads as empty, a single
/// accomplishment is wrapped in a list and other scalars become text.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Reflection {
    #[serde(default, deserialize_with = "lenient::text")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub reflections: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub accomplishments: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub next_step: String,
}

impl Reflection {
    pub fn from_raw_text(raw: &str) -> Self {
        Self {
            reflections: raw.trim().to_string(),
            ..Default::default()
        }
    }
}

/// Field decoders that accept any JSON value.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => String::new(),
            Value::String(text) => text,
            other => other.to_string(),
        })
    }

    pub fn list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Value>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => Vec::new(),
            Value::Array(items) => items,
            other => vec![other],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reflection_coerces_field_types() {
        let reflection: Reflection = serde_json::from_value(json!({
            "summary": 42,
            "reflections": null,
            "accomplishments": "Saw the walls",
            "next_step": true
        }))
        .unwrap();

        assert_eq!(reflection.summary, "42");
        assert_eq!(reflection.reflections, "");
        assert_eq!(reflection.accomplishments, vec![json!("Saw the walls")]);
        assert_eq!(reflection.next_step, "true");
    }

    #[test]
    fn test_help_request_keeps_valid_fields() {
        let request: HelpRequest =
            serde_json::from_value(json!({ "question": "Where to eat?", "activities": null }))
                .unwrap();
        assert_eq!(request.question, "Where to eat?");
        assert!(request.activities.is_empty());
    }
}
