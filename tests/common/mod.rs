#![allow(dead_code)]

use actix_web::{cookie::Cookie, dev::ServiceResponse, web, App};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use dayplan_api::{
    db::session_store::SessionStore,
    middleware::session::{SessionMiddleware, SESSION_COOKIE},
    models::place::Place,
    routes,
    services::{
        assistant_service::{AssistantClient, AssistantError},
        places_service::{PlacesError, PlacesSearch},
    },
    state::{AppState, AssistantIds},
    templates::Templates,
};

pub const ITINERARY_ASSISTANT: &str = "asst_itinerary";
pub const REFLECTION_ASSISTANT: &str = "asst_reflection";
pub const HELPER_ASSISTANT: &str = "asst_helper";
pub const OWM_KEY: &str = "owm-test-key";

/// Replies per assistant id. An assistant without a reply fails the call.
#[derive(Default)]
pub struct ScriptedAssistant {
    replies: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedAssistant {
    pub fn reply(&self, assistant_id: &str, reply: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(assistant_id.to_string(), reply.to_string());
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssistantClient for ScriptedAssistant {
    async fn ask(&self, assistant_id: &str, payload: &Value) -> Result<String, AssistantError> {
        self.calls
            .lock()
            .unwrap()
            .push((assistant_id.to_string(), payload.clone()));
        self.replies
            .lock()
            .unwrap()
            .get(assistant_id)
            .cloned()
            .ok_or_else(|| AssistantError::Status {
                status: 500,
                message: "no scripted reply".to_string(),
            })
    }
}

#[derive(Default)]
pub struct ScriptedPlaces {
    places: Mutex<Option<Vec<Place>>>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl ScriptedPlaces {
    pub fn respond_with(&self, places: Vec<Place>) {
        *self.places.lock().unwrap() = Some(places);
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlacesSearch for ScriptedPlaces {
    async fn search_text(&self, query: &str, max_results: usize) -> Result<Vec<Place>, PlacesError> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));
        self.places
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| PlacesError::Status {
                status: 503,
                message: "no scripted places".to_string(),
            })
    }
}

pub struct TestApp {
    pub assistant: Arc<ScriptedAssistant>,
    pub places: Arc<ScriptedPlaces>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_owm_key(OWM_KEY)
    }

    pub fn with_owm_key(owm_key: &str) -> Self {
        let assistant = Arc::new(ScriptedAssistant::default());
        let places = Arc::new(ScriptedPlaces::default());
        let templates = Arc::new(Templates::new().expect("templates compile"));

        let state = AppState::new(
            assistant.clone(),
            places.clone(),
            AssistantIds {
                itinerary: ITINERARY_ASSISTANT.to_string(),
                reflection: REFLECTION_ASSISTANT.to_string(),
                helper: HELPER_ASSISTANT.to_string(),
            },
            templates,
            SessionStore::default(),
            owm_key,
            20,
        );

        Self {
            assistant,
            places,
            state,
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(SessionMiddleware::new(self.state.sessions.clone()))
            .app_data(web::Data::new(self.state.clone()))
            .configure(routes::configure)
    }
}

pub fn place(value: Value) -> Place {
    serde_json::from_value(value).expect("valid place")
}

pub fn session_cookie(resp: &ServiceResponse) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.into_owned())
}

pub fn location_header(resp: &ServiceResponse) -> String {
    resp.headers()
        .get(actix_web::http::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
