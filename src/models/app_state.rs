use std::sync::Arc;

use crate::config::BotConfig;
use crate::game::sprites::SpriteSheet;
use crate::models::User;
use crate::session::SessionRegistry;
use crate::storage::{open_store, KeyValueStore};
use crate::websocket::frames::FrameStore;
use crate::websocket::hub::Hub;

/// Application state shared between connections and running games
pub struct AppState {
    pub config: BotConfig,
    pub hub: Arc<Hub>,
    pub registry: SessionRegistry,
    pub sprites: SpriteSheet,
    pub store: Option<Arc<dyn KeyValueStore>>,
}

impl AppState {
    pub fn new(config: BotConfig, sprites: SpriteSheet) -> Self {
        let store = open_store(config.save_store);
        AppState::with_store(config, sprites, store)
    }

    pub fn with_store(config: BotConfig, sprites: SpriteSheet, store: Option<Arc<dyn KeyValueStore>>) -> Self {
        let hub = Arc::new(Hub::new(FrameStore::new(&config.frames_dir, config.frame_retention)));
        // The bot is a valid opponent: it plays chess as the AI.
        hub.register_user(User::bot(config.bot_id.clone(), config.bot_name.clone()));
        AppState { config, hub, registry: SessionRegistry::new(), sprites, store }
    }

    pub fn bot_user(&self) -> User {
        User::bot(self.config.bot_id.clone(), self.config.bot_name.clone())
    }
}
