//! HTML pages, rendered with Handlebars from templates compiled into the
//! binary.

use actix_web::HttpResponse;
use handlebars::{Handlebars, TemplateError};
use serde::Serialize;

pub const CHAT_PAGE: &str = "chat";
pub const LOADER_PAGE: &str = "loader";
pub const SCHEDULE_PAGE: &str = "schedule";
pub const WEATHER_PAGE: &str = "weather";

const LAYOUT_PARTIAL: &str = "layout";

pub struct Templates {
    hbs: Handlebars<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, TemplateError> {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(false);
        hbs.register_partial(LAYOUT_PARTIAL, include_str!("../templates/layout.hbs"))?;
        hbs.register_template_string(CHAT_PAGE, include_str!("../templates/chat.hbs"))?;
        hbs.register_template_string(LOADER_PAGE, include_str!("../templates/loader.hbs"))?;
        hbs.register_template_string(SCHEDULE_PAGE, include_str!("../templates/schedule.hbs"))?;
        hbs.register_template_string(WEATHER_PAGE, include_str!("../templates/weather.hbs"))?;
        Ok(Self { hbs })
    }

    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<String, handlebars::RenderError> {
        self.hbs.render(name, context)
    }

    /// Render `name` into an HTML response, or a 500 if rendering fails.
    pub fn page<T: Serialize>(&self, name: &str, context: &T) -> HttpResponse {
        match self.render(name, context) {
            Ok(body) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(body),
            Err(err) => {
                log::error!("Failed to render page '{}': {}", name, err);
                HttpResponse::InternalServerError().body("Failed to render page")
            }
        }
    }
}
