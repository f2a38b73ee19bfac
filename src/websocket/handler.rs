use actix::*;
use actix_web::web;
use actix_web_actors::ws;
use futures::channel::mpsc;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::commands::handle_incoming;
use crate::models::{AppState, ChatMessage, ClientMessage, ServerMessage, User};

/// One gateway client. Inbound frames become channel messages; bot output
/// for the channels it joined is streamed back.
pub struct GatewaySocket {
    pub id: String,
    pub app_state: web::Data<AppState>,
    pub user: Option<User>,
}

impl Actor for GatewaySocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        // Register the outbox with the hub and pump it into this socket
        let (outbox, inbox) = mpsc::unbounded::<ServerMessage>();
        self.app_state.hub.connect(&self.id, outbox);
        ctx.add_stream(inbox);
        info!("WebSocket connection started: {}", self.id);
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        self.app_state.hub.disconnect(&self.id);
        info!("WebSocket connection closed: {}", self.id);
        Running::Stop
    }
}

impl StreamHandler<ServerMessage> for GatewaySocket {
    fn handle(&mut self, msg: ServerMessage, ctx: &mut Self::Context) {
        debug!("Forwarding {} to {}", msg.message_type, self.id);
        self.send(&msg, ctx);
    }

    // The outbox only closes when the hub forgets this connection.
    fn finished(&mut self, _: &mut Self::Context) {}
}

// WebSocket message handler
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for GatewaySocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {}
            Ok(ws::Message::Text(text)) => {
                debug!("Received text message on {}: {}", self.id, text);
                match serde_json::from_str::<ClientMessage>(text.as_ref()) {
                    Ok(client_msg) => self.handle_message(client_msg, ctx),
                    Err(e) => {
                        warn!("Error parsing client message: {}", e);
                        self.send(&ServerMessage::error(format!("Invalid message format: {}", e)), ctx);
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                warn!("Binary messages are not supported");
                self.send(&ServerMessage::error("Binary messages are not supported"), ctx);
            }
            Ok(ws::Message::Close(reason)) => {
                info!("Connection closed: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            _ => {
                ctx.stop();
            }
        }
    }
}

impl GatewaySocket {
    fn send(&self, msg: &ServerMessage, ctx: &mut ws::WebsocketContext<Self>) {
        match serde_json::to_string(msg) {
            Ok(text) => ctx.text(text),
            Err(e) => warn!("Failed to serialize message for {}: {}", self.id, e),
        }
    }

    pub fn handle_message(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        match msg.message_type.as_str() {
            "identify" => self.handle_identify(msg, ctx),
            "join" => self.handle_join(msg, ctx),
            "leave" => self.handle_leave(msg, ctx),
            "message" => self.handle_chat(msg, ctx),
            _ => {
                info!("Unknown message type: {}", msg.message_type);
                self.send(&ServerMessage::error(format!("Unknown message type: {}", msg.message_type)), ctx);
            }
        }
    }

    fn handle_identify(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        let Some(author) = msg.author else {
            self.send(&ServerMessage::error("Identify requires an author"), ctx);
            return;
        };
        if author.id == self.app_state.config.bot_id {
            warn!("Connection {} tried to identify as the bot", self.id);
            self.send(&ServerMessage::error("That user id is reserved"), ctx);
            return;
        }
        info!("Connection {} identified as {}", self.id, author.id);
        self.app_state.hub.identify(&self.id, author.clone());
        self.user = Some(author);
        self.send(&ServerMessage::ack("identified", None), ctx);
    }

    fn handle_join(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        let Some(channel_id) = msg.channel_id else {
            self.send(&ServerMessage::error("No channel ID provided"), ctx);
            return;
        };
        self.app_state.hub.join(&self.id, &channel_id);
        self.send(&ServerMessage::ack("joined", Some(channel_id)), ctx);
    }

    fn handle_leave(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        let Some(channel_id) = msg.channel_id else {
            self.send(&ServerMessage::error("No channel ID provided"), ctx);
            return;
        };
        self.app_state.hub.leave(&self.id, &channel_id);
        self.send(&ServerMessage::ack("left", Some(channel_id)), ctx);
    }

    fn handle_chat(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        let Some(author) = self.user.clone() else {
            self.send(&ServerMessage::error("Identify before sending messages"), ctx);
            return;
        };
        let (Some(channel_id), Some(content)) = (msg.channel_id, msg.content) else {
            self.send(&ServerMessage::error("Messages require a channel ID and content"), ctx);
            return;
        };
        let chat = ChatMessage { id: Uuid::new_v4().to_string(), channel_id, author, content };
        handle_incoming(self.app_state.clone(), chat);
    }
}
