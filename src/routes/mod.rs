use std::path::Path;

use actix_files as fs;
use actix_web::{web, HttpResponse, Responder};

use crate::models::AppState;
use crate::websocket::frames::FRAMES_ROUTE;

/// HTTP handler for the index page
pub async fn index(app_state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().body(format!(
        "{} is online. Active games: {}",
        app_state.config.bot_name,
        app_state.registry.len()
    ))
}

/// Configure the HTTP routes
pub fn configure_routes(cfg: &mut web::ServiceConfig, frames_dir: &Path) {
    cfg.service(web::resource("/ws").route(web::get().to(crate::websocket::ws_index)))
        .service(web::resource("/").route(web::get().to(index)))
        .service(fs::Files::new(FRAMES_ROUTE, frames_dir));
}
