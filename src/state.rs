use std::sync::Arc;

use crate::config::Config;
use crate::db::session_store::SessionStore;
use crate::services::assistant_service::AssistantClient;
use crate::services::itinerary_service::ItineraryService;
use crate::services::places_service::PlacesSearch;
use crate::templates::Templates;

#[derive(Clone, Debug, Default)]
pub struct AssistantIds {
    pub itinerary: String,
    pub reflection: String,
    pub helper: String,
}

/// Shared application state, handed to handlers through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<dyn AssistantClient>,
    pub places: Arc<dyn PlacesSearch>,
    pub assistant_ids: AssistantIds,
    pub templates: Arc<Templates>,
    pub sessions: SessionStore,
    pub owm_key: String,
    pub max_places: usize,
}

impl AppState {
    pub fn new(
        assistant: Arc<dyn AssistantClient>,
        places: Arc<dyn PlacesSearch>,
        assistant_ids: AssistantIds,
        templates: Arc<Templates>,
        sessions: SessionStore,
        owm_key: impl Into<String>,
        max_places: usize,
    ) -> Self {
        Self {
            assistant,
            places,
            assistant_ids,
            templates,
            sessions,
            owm_key: owm_key.into(),
            max_places,
        }
    }

    pub fn from_config(
        config: &Config,
        assistant: Arc<dyn AssistantClient>,
        places: Arc<dyn PlacesSearch>,
        templates: Arc<Templates>,
    ) -> Self {
        Self::new(
            assistant,
            places,
            AssistantIds {
                itinerary: config.itinerary_assistant_id.clone(),
                reflection: config.reflection_assistant_id.clone(),
                helper: config.helper_assistant_id.clone(),
            },
            templates,
            SessionStore::new(config.session_ttl),
            config.owm_key.clone(),
            config.max_places,
        )
    }

    pub fn itinerary_service(&self) -> ItineraryService {
        ItineraryService::new(
            self.assistant.clone(),
            self.places.clone(),
            self.assistant_ids.itinerary.clone(),
            self.max_places,
        )
    }
}
