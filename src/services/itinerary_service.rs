use serde_json::Value;
use std::sync::Arc;

use crate::models::itinerary::{CombinedPayload, Itinerary, ItineraryRequest};
use crate::services::assistant_service::{AssistantClient, NO_RESPONSE};
use crate::services::places_service::PlacesSearch;
use crate::services::reply_parser::parse_activities;

pub const PLACE_CATEGORIES: &str = "tourist attractions, restaurants and museums";
pub const DEFAULT_MAX_PLACES: usize = 20;

pub fn places_query(location: &str) -> String {
    format!("{} in {}", PLACE_CATEGORIES, location)
}

/// Builds a day plan: nearby places, annotated, plus whatever the itinerary
/// assistant makes of them. Provider failures degrade to empty results.
#[derive(Clone)]
pub struct ItineraryService {
    assistant: Arc<dyn AssistantClient>,
    places: Arc<dyn PlacesSearch>,
    assistant_id: String,
    max_places: usize,
}

impl ItineraryService {
    pub fn new(
        assistant: Arc<dyn AssistantClient>,
        places: Arc<dyn PlacesSearch>,
        assistant_id: impl Into<String>,
        max_places: usize,
    ) -> Self {
        Self {
            assistant,
            places,
            assistant_id: assistant_id.into(),
            max_places,
        }
    }

    pub async fn assemble(&self, request: &ItineraryRequest) -> Itinerary {
        let query = places_query(&request.location);
        let mut places = match self.places.search_text(&query, self.max_places).await {
            Ok(places) => places,
            Err(err) => {
                log::warn!("Places search failed for '{}': {}", request.location, err);
                Vec::new()
            }
        };
        for place in places.iter_mut() {
            place.annotate();
        }

        let combined = CombinedPayload {
            location: request.location.clone(),
            date: request.date.clone(),
            hourly_forecast: request.hourly_forecast(),
            places,
            user_prompt: request.prompt.clone(),
        };

        let payload = serde_json::to_value(&combined).unwrap_or(Value::Null);
        let combined_json = payload.to_string();

        let raw = match self.assistant.ask(&self.assistant_id, &payload).await {
            Ok(raw) => raw,
            Err(err) => {
                log::warn!("Itinerary assistant call failed: {}", err);
                NO_RESPONSE.to_string()
            }
        };
        let activities = parse_activities(&raw);
        log::info!(
            "Assembled itinerary for '{}' on '{}': {} activities, {} places",
            request.location,
            request.date,
            activities.len(),
            combined.places.len()
        );

        Itinerary {
            combined_json,
            activities,
            places: combined.places,
        }
    }
}
