use std::future::{ready, Ready};
use std::sync::{Arc, OnceLock};

use actix_web::{
    dev::Payload, error::ErrorInternalServerError, Error, FromRequest, HttpMessage, HttpRequest,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::db::session_store::SessionStore;
use crate::models::itinerary::{Itinerary, ItineraryRequest, Schedule};
use crate::models::place::Place;

pub const FORM_DATA: &str = "form_data";
pub const COMBINED_JSON: &str = "combined_json";
pub const ACTIVITIES: &str = "activities";
pub const PLACES: &str = "places";
pub const LOCATION: &str = "location";
pub const DATE: &str = "date";
pub const PROMPT: &str = "prompt";

/// Handle on the current browser session, placed in the request by
/// [`SessionMiddleware`](crate::middleware::session::SessionMiddleware).
///
/// A request without a live session gets one only when something is first
/// written. Clones share the key, so the middleware sees a session created
/// by the handler. Values that fail to decode into the expected type read
/// as absent.
#[derive(Clone, Debug)]
pub struct Session {
    key: Arc<OnceLock<String>>,
    store: SessionStore,
}

impl Session {
    pub fn new(key: Option<String>, store: SessionStore) -> Self {
        Self {
            key: Arc::new(key.map(OnceLock::from).unwrap_or_default()),
            store,
        }
    }

    /// Key of the backing session, if one exists yet.
    pub fn key(&self) -> Option<&str> {
        self.key.get().map(String::as_str)
    }

    fn get<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        decode(name, self.store.get(self.key()?, name)?)
    }

    fn take<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        decode(name, self.store.remove(self.key()?, name)?)
    }

    fn set<T: Serialize>(&self, name: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => {
                let key = self.key.get_or_init(|| self.store.create());
                self.store.insert(key, name, value)
            }
            Err(err) => log::error!("Failed to store session key '{}': {}", name, err),
        }
    }

    pub fn form_data(&self) -> Option<ItineraryRequest> {
        self.get(FORM_DATA)
    }

    pub fn set_form_data(&self, form: &ItineraryRequest) {
        self.set(FORM_DATA, form)
    }

    pub fn set_combined_json(&self, combined_json: &str) {
        self.set(COMBINED_JSON, &combined_json)
    }

    pub fn take_combined_json(&self) -> Option<String> {
        self.take(COMBINED_JSON)
    }

    pub fn set_activities(&self, activities: &[Value]) {
        self.set(ACTIVITIES, &activities)
    }

    pub fn take_activities(&self) -> Option<Vec<Value>> {
        self.take(ACTIVITIES)
    }

    pub fn set_places(&self, places: &[Place]) {
        self.set(PLACES, &places)
    }

    pub fn take_places(&self) -> Option<Vec<Place>> {
        self.take(PLACES)
    }

    pub fn set_location(&self, location: &str) {
        self.set(LOCATION, &location)
    }

    pub fn take_location(&self) -> Option<String> {
        self.take(LOCATION)
    }

    pub fn set_date(&self, date: &str) {
        self.set(DATE, &date)
    }

    pub fn take_date(&self) -> Option<String> {
        self.take(DATE)
    }

    pub fn set_prompt(&self, prompt: &str) {
        self.set(PROMPT, &prompt)
    }

    pub fn take_prompt(&self) -> Option<String> {
        self.take(PROMPT)
    }

    /// Persist an assembled itinerary and the request it was built from for
    /// the schedule page.
    pub fn store_itinerary(&self, request: &ItineraryRequest, itinerary: &Itinerary) {
        self.set_combined_json(&itinerary.combined_json);
        self.set_activities(&itinerary.activities);
        self.set_places(&itinerary.places);
        self.set_location(&request.location);
        self.set_date(&request.date);
        self.set_prompt(&request.prompt);
    }

    /// Remove the schedule data from the session. Missing keys fall back to
    /// [`Schedule::default`].
    pub fn take_schedule(&self) -> Schedule {
        let defaults = Schedule::default();
        Schedule {
            combined_json: self.take_combined_json().unwrap_or(defaults.combined_json),
            activities: self.take_activities().unwrap_or_default(),
            places: self.take_places().unwrap_or_default(),
            location: self.take_location().unwrap_or_default(),
            date: self.take_date().unwrap_or_default(),
            prompt: self.take_prompt().unwrap_or_default(),
        }
    }
}

fn decode<T: DeserializeOwned>(name: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            log::warn!("Ignoring malformed session key '{}': {}", name, err);
            None
        }
    }
}

impl FromRequest for Session {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(session) = req.extensions().get::<Session>() {
            ready(Ok(session.clone()))
        } else {
            ready(Err(ErrorInternalServerError("Session middleware not installed")))
        }
    }
}
