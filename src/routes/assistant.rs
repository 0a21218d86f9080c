use actix_web::{web, HttpResponse, Responder};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::models::reflection::{HelpReply, HelpRequest, ReflectRequest};
use crate::services::assistant_service::NO_RESPONSE;
use crate::services::reply_parser::parse_reflection;
use crate::state::AppState;

// These endpoints always answer 200, so a bad body is read as an empty one.
fn lenient_body<T: DeserializeOwned + Default>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap_or_else(|err| {
        log::debug!("Unreadable request body, using defaults: {}", err);
        T::default()
    })
}

async fn ask_or_sentinel(state: &AppState, assistant_id: &str, payload: serde_json::Value) -> String {
    match state.assistant.ask(assistant_id, &payload).await {
        Ok(raw) => raw,
        Err(err) => {
            log::warn!("Assistant {} call failed: {}", assistant_id, err);
            NO_RESPONSE.to_string()
        }
    }
}

/*
    POST /reflect/
*/
pub async fn reflect(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let input: ReflectRequest = lenient_body(&body);
    let raw = ask_or_sentinel(
        &state,
        &state.assistant_ids.reflection,
        json!({ "activities": input.activities }),
    )
    .await;

    HttpResponse::Ok().json(parse_reflection(&raw))
}

/*
    POST /help/
*/
pub async fn help(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let input: HelpRequest = lenient_body(&body);
    let raw = ask_or_sentinel(
        &state,
        &state.assistant_ids.helper,
        json!({ "question": input.question, "activities": input.activities }),
    )
    .await;

    HttpResponse::Ok().json(HelpReply {
        reply: raw.trim().to_string(),
    })
}
