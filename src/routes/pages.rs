use actix_web::{web, Responder};
use serde::Serialize;

use crate::state::AppState;
use crate::templates::{CHAT_PAGE, WEATHER_PAGE};

#[derive(Serialize)]
struct KeyContext<'a> {
    owm_key: &'a str,
}

/*
    GET /
*/
pub async fn chat_view(state: web::Data<AppState>) -> impl Responder {
    state.templates.page(
        CHAT_PAGE,
        &KeyContext {
            owm_key: &state.owm_key,
        },
    )
}

/*
    GET /weather/
*/
pub async fn weather_view(state: web::Data<AppState>) -> impl Responder {
    state.templates.page(
        WEATHER_PAGE,
        &KeyContext {
            owm_key: &state.owm_key,
        },
    )
}
