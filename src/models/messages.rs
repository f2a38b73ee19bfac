use serde::{Deserialize, Serialize};

use crate::models::user::User;

/// Message sent from a gateway client to the bot
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ClientMessage {
    pub message_type: String,
    pub channel_id: Option<String>,
    pub content: Option<String>,
    pub author: Option<User>,
}

/// Message pushed from the bot to gateway clients
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServerMessage {
    pub message_type: String,
    pub channel_id: Option<String>,
    pub message_id: Option<String>,
    pub content: Option<String>,
    pub attachment: Option<Attachment>,
    pub emoji: Option<String>,
    pub error: Option<String>,
}

/// A rendered frame attached to an outgoing message
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

impl ServerMessage {
    pub fn say(channel_id: &str, message_id: String, content: String, attachment: Option<Attachment>) -> Self {
        ServerMessage {
            message_type: "message".to_string(),
            channel_id: Some(channel_id.to_string()),
            message_id: Some(message_id),
            content: Some(content),
            attachment,
            emoji: None,
            error: None,
        }
    }

    pub fn reaction(channel_id: &str, message_id: &str, emoji: &str) -> Self {
        ServerMessage {
            message_type: "reaction".to_string(),
            channel_id: Some(channel_id.to_string()),
            message_id: Some(message_id.to_string()),
            content: None,
            attachment: None,
            emoji: Some(emoji.to_string()),
            error: None,
        }
    }

    pub fn ack(message_type: &str, channel_id: Option<String>) -> Self {
        ServerMessage {
            message_type: message_type.to_string(),
            channel_id,
            message_id: None,
            content: None,
            attachment: None,
            emoji: None,
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        ServerMessage {
            message_type: "error".to_string(),
            channel_id: None,
            message_id: None,
            content: None,
            attachment: None,
            emoji: None,
            error: Some(error.into()),
        }
    }
}
