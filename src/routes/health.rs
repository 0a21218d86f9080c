use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::HashMap;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

impl ServiceStatus {
    fn configured(what: &str, present: bool) -> Self {
        if present {
            ServiceStatus {
                status: "ok".to_string(),
                details: Some(format!("{} configured", what)),
            }
        } else {
            ServiceStatus {
                status: "error".to_string(),
                details: Some(format!("{} not configured", what)),
            }
        }
    }
}

/*
    GET /health
*/
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let ids = &state.assistant_ids;
    let mut services = HashMap::new();
    services.insert(
        "assistants".to_string(),
        ServiceStatus::configured(
            "Assistant IDs",
            !ids.itinerary.is_empty() && !ids.reflection.is_empty() && !ids.helper.is_empty(),
        ),
    );
    services.insert(
        "weather".to_string(),
        ServiceStatus::configured("OpenWeatherMap key", !state.owm_key.is_empty()),
    );
    services.insert(
        "sessions".to_string(),
        ServiceStatus {
            status: "ok".to_string(),
            details: Some(format!("{} active", state.sessions.len())),
        },
    );

    let degraded = services.values().any(|service| service.status != "ok");
    HttpResponse::Ok().json(HealthStatus {
        status: if degraded { "degraded" } else { "ok" }.to_string(),
        services,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
