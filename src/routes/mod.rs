use actix_web::web;

pub mod assistant;
pub mod health;
pub mod itinerary;
pub mod pages;

/// Register every route of the planner.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/", web::get().to(pages::chat_view))
        .service(
            web::resource("/load/")
                .route(web::post().to(itinerary::load))
                .route(web::get().to(itinerary::back_to_form)),
        )
        .route("/gen/", web::get().to(itinerary::generate))
        .route("/plan/", web::get().to(itinerary::schedule))
        .route("/reflect/", web::post().to(assistant::reflect))
        .route("/help/", web::post().to(assistant::help))
        .route("/weather/", web::get().to(pages::weather_view));
}
