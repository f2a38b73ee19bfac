use thiserror::Error;

pub type Result<T> = std::result::Result<T, BotError>;

/// Failures a command handler can surface to the dispatcher.
///
/// User mistakes (illegal moves, unknown cars) are not errors; they are
/// answered in-channel and the game goes on.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("failed to encode frame")]
    Encode(#[source] image::ImageError),

    #[error("failed to load sprite {path}")]
    Sprite {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write frame {name}")]
    FrameIo {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("saved game is unreadable: {0}")]
    SavedGame(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration value {key}={value}")]
    Config { key: &'static str, value: String },
}
