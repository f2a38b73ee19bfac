pub mod frames;
pub mod handler;
pub mod hub;

use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::info;
use uuid::Uuid;

use crate::models::AppState;
use handler::GatewaySocket;

/// WebSocket connection handler
pub async fn ws_index(req: HttpRequest, stream: web::Payload, app_state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let id = Uuid::new_v4().to_string();
    info!("New WebSocket connection: {}", id);

    let socket = GatewaySocket { id, app_state: app_state.clone(), user: None };
    ws::start(socket, &req, stream)
}
