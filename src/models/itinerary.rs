use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::place::Place;

/// Form fields captured by `/load/` and consumed by `/gen/`.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ItineraryRequest {
    pub location: String,
    pub date: String,
    pub prompt: String,
    /// Raw JSON text of the hourly forecast, decoded lazily.
    pub hourly: String,
}

impl ItineraryRequest {
    pub fn hourly_forecast(&self) -> Vec<Value> {
        serde_json::from_str::<Vec<Value>>(&self.hourly).unwrap_or_default()
    }
}

/// Everything the itinerary assistant gets to see.
#[derive(Debug, Serialize, Clone)]
pub struct CombinedPayload {
    pub location: String,
    pub date: String,
    pub hourly_forecast: Vec<Value>,
    pub places: Vec<Place>,
    pub user_prompt: String,
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct Itinerary {
    pub combined_json: String,
    pub activities: Vec<Value>,
    pub places: Vec<Place>,
}

/// One-shot view of the schedule page, popped out of the session.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Schedule {
    pub combined_json: String,
    pub activities: Vec<Value>,
    pub places: Vec<Place>,
    pub location: String,
    pub date: String,
    pub prompt: String,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            combined_json: "{}".to_string(),
            activities: Vec::new(),
            places: Vec::new(),
            location: String::new(),
            date: String::new(),
            prompt: String::new(),
        }
    }
}

impl Schedule {
    /// Copy each activity's `weather_icon` into `expected_weather_code`,
    /// defaulting to an empty string.
    pub fn with_expected_weather(mut self) -> Self {
        for activity in self.activities.iter_mut() {
            if let Some(fields) = activity.as_object_mut() {
                let code = fields
                    .get("weather_icon")
                    .cloned()
                    .unwrap_or_else(|| Value::String(String::new()));
                fields.insert("expected_weather_code".to_string(), code);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hourly_forecast_decodes_array() {
        let request = ItineraryRequest {
            hourly: r#"[{"dt": 1, "temp": 21.5}, {"dt": 2}]"#.to_string(),
            ..Default::default()
        };
        assert_eq!(request.hourly_forecast().len(), 2);
    }

    #[test]
    fn test_hourly_forecast_degrades_to_empty() {
        for raw in ["", "not json", r#"{"dt": 1}"#, "42"] {
            let request = ItineraryRequest {
                hourly: raw.to_string(),
                ..Default::default()
            };
            assert!(request.hourly_forecast().is_empty(), "input {:?}", raw);
        }
    }

    #[test]
    fn test_expected_weather_code_is_copied_or_blank() {
        let schedule = Schedule {
            activities: vec![
                json!({ "time": "09:00", "weather_icon": "01d" }),
                json!({ "time": "12:00" }),
                json!("not an object"),
            ],
            ..Default::default()
        }
        .with_expected_weather();

        assert_eq!(schedule.activities[0]["expected_weather_code"], json!("01d"));
        assert_eq!(schedule.activities[1]["expected_weather_code"], json!(""));
        assert_eq!(schedule.activities[2], json!("not an object"));
    }

    #[test]
    fn test_default_schedule_has_empty_payload_object() {
        let schedule = Schedule::default();
        assert_eq!(schedule.combined_json, "{}");
        assert!(schedule.activities.is_empty());
        assert!(schedule.location.is_empty());
    }
}
