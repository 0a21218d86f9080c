use actix_web::{http::header, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::middleware::session_context::Session;
use crate::models::itinerary::ItineraryRequest;
use crate::state::AppState;
use crate::templates::{LOADER_PAGE, SCHEDULE_PAGE};

pub const GENERATE_URL: &str = "/gen/";
pub const SCHEDULE_URL: &str = "/plan/";
pub const ENTRY_URL: &str = "/";

#[derive(Debug, Deserialize)]
pub struct LoadForm {
    #[serde(default)]
    location: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    prompt: String,
    #[serde(default = "empty_forecast")]
    hourly_forecast_input: String,
}

fn empty_forecast() -> String {
    "[]".to_string()
}

impl From<LoadForm> for ItineraryRequest {
    fn from(form: LoadForm) -> Self {
        Self {
            location: form.location,
            date: form.date,
            prompt: form.prompt.trim().to_string(),
            hourly: form.hourly_forecast_input,
        }
    }
}

#[derive(Serialize)]
struct LoaderContext {
    generate_url: &'static str,
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/*
    POST /load/
*/
pub async fn load(
    state: web::Data<AppState>,
    session: Session,
    form: web::Form<LoadForm>,
) -> impl Responder {
    let request = ItineraryRequest::from(form.into_inner());
    log::info!(
        "Itinerary requested for '{}' on '{}'",
        request.location,
        request.date
    );
    session.set_form_data(&request);

    state.templates.page(
        LOADER_PAGE,
        &LoaderContext {
            generate_url: GENERATE_URL,
        },
    )
}

/*
    GET /load/
*/
pub async fn back_to_form() -> impl Responder {
    redirect(ENTRY_URL)
}

/*
    GET /gen/
*/
pub async fn generate(state: web::Data<AppState>, session: Session) -> impl Responder {
    let Some(request) = session.form_data() else {
        log::info!(
            "No form data in session {}, back to the form",
            session.key().unwrap_or("<none>")
        );
        return redirect(ENTRY_URL);
    };

    let itinerary = state.itinerary_service().assemble(&request).await;
    session.store_itinerary(&request, &itinerary);

    redirect(SCHEDULE_URL)
}

/*
    GET /plan/
*/
pub async fn schedule(state: web::Data<AppState>, session: Session) -> impl Responder {
    // Popped, not read: a reload shows the empty page.
    let schedule = session.take_schedule().with_expected_weather();
    state.templates.page(SCHEDULE_PAGE, &schedule)
}
