use std::{sync::Arc, time::Duration};

use actix_web::{middleware::Logger, rt, web, App, HttpServer};
use env_logger::Env;
use tokio_util::sync::CancellationToken;

use dayplan_api::{
    config::Config,
    middleware::session::SessionMiddleware,
    routes,
    services::{assistant_service::OpenAiAssistantClient, places_service::GooglePlacesClient},
    state::AppState,
    templates::Templates,
};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

fn startup_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(err.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    log::info!("Application starting...");

    let config = Config::from_env().map_err(startup_error)?;
    let shutdown = CancellationToken::new();

    let assistant = OpenAiAssistantClient::new(&config.openai_api_key, &config.openai_base_url)
        .map_err(startup_error)?
        .with_poll_policy(config.assistant_poll.clone())
        .with_cancellation(shutdown.clone());
    let places = GooglePlacesClient::new(&config.places_api_key, &config.places_endpoint)
        .map_err(startup_error)?
        .with_page_delay(config.places_page_delay);
    let templates = Templates::new().map_err(startup_error)?;

    let state = AppState::from_config(
        &config,
        Arc::new(assistant),
        Arc::new(places),
        Arc::new(templates),
    );

    let sessions = state.sessions.clone();
    let sweeper_shutdown = shutdown.clone();
    rt::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            tokio::select! {
                _ = sweeper_shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let purged = sessions.purge_expired();
                    if purged > 0 {
                        log::info!("Purged {} expired session(s)", purged);
                    }
                }
            }
        }
    });

    // Let in-flight assistant polls stop as soon as shutdown begins.
    let signal_shutdown = shutdown.clone();
    rt::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_shutdown.cancel();
        }
    });

    log::info!("Attempting to bind to {}:{}", config.host, config.port);
    let server_state = state.clone();
    let result = HttpServer::new(move || {
        App::new()
            .wrap(SessionMiddleware::new(server_state.sessions.clone()))
            .wrap(Logger::default())
            .app_data(web::Data::new(server_state.clone()))
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    shutdown.cancel();
    log::info!("Server stopped");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use dayplan_api::config::ConfigError;

    #[test]
    fn test_startup_error_keeps_message() {
        let err = startup_error(ConfigError::Missing("OPENAI_API_KEY"));
        assert_eq!(err.kind(), std::io::ErrorKind::Other);
        assert_eq!(err.to_string(), "OPENAI_API_KEY must be set");
    }
}
