#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use actix_rt::time::{sleep, timeout};
use actix_web::web;
use futures::channel::mpsc::{self, UnboundedReceiver};
use futures::StreamExt;
use uuid::Uuid;

use channel_games_bot::commands::handle_incoming;
use channel_games_bot::config::{BotConfig, GameTimings};
use channel_games_bot::game::sprites::SpriteSheet;
use channel_games_bot::models::{AppState, ChatMessage, ServerMessage, User};
use channel_games_bot::storage::{KeyValueStore, MemoryStore};

pub const CHANNEL: &str = "general";
const WAIT: Duration = Duration::from_secs(5);

/// Timings short enough for tests but long enough that a scripted reply
/// always lands inside the window.
pub fn quick_timings() -> GameTimings {
    GameTimings {
        challenge_timeout: Duration::from_secs(3),
        car_choice_timeout: Duration::from_secs(3),
        race_round_timeout: Duration::from_secs(3),
        race_early_end_min: Duration::from_millis(10),
        race_early_end_max: Duration::from_millis(10),
        chess_time_budget: Duration::from_secs(60),
        chess_ai_move_cost: Duration::from_millis(5),
    }
}

pub fn test_config(timings: GameTimings) -> BotConfig {
    BotConfig {
        frames_dir: std::env::temp_dir().join(format!("games-bot-test-{}", Uuid::new_v4())),
        timings,
        ..BotConfig::default()
    }
}

/// A bot with one observing gateway connection joined to [`CHANNEL`].
pub struct Harness {
    pub app: web::Data<AppState>,
    pub store: Option<Arc<MemoryStore>>,
    pub alice: User,
    pub bob: User,
    pub carol: User,
    observer: UnboundedReceiver<ServerMessage>,
}

impl Harness {
    pub fn new(timings: GameTimings) -> Self {
        Harness::build(test_config(timings), None)
    }

    pub fn with_store(timings: GameTimings) -> Self {
        Harness::build(test_config(timings), Some(Arc::new(MemoryStore::new())))
    }

    pub fn with_config(config: BotConfig) -> Self {
        Harness::build(config, None)
    }

    fn build(config: BotConfig, store: Option<Arc<MemoryStore>>) -> Self {
        let shared = store.clone().map(|store| store as Arc<dyn KeyValueStore>);
        let app = web::Data::new(AppState::with_store(config, SpriteSheet::placeholder(), shared));

        let (outbox, observer) = mpsc::unbounded();
        app.hub.connect("observer", outbox);
        app.hub.join("observer", CHANNEL);

        let alice = User::new("1", "alice");
        let bob = User::new("2", "bob");
        let carol = User::new("3", "carol");
        for user in [&alice, &bob, &carol] {
            app.hub.register_user(user.clone());
        }
        Harness { app, store, alice, bob, carol, observer }
    }

    pub fn bot(&self) -> User {
        self.app.bot_user()
    }

    /// Sends `content` into the channel as `author`, the way the gateway does.
    pub fn post(&self, author: &User, content: &str) -> ChatMessage {
        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            channel_id: CHANNEL.to_string(),
            author: author.clone(),
            content: content.to_string(),
        };
        handle_incoming(self.app.clone(), message.clone());
        message
    }

    /// Next bot output of any kind.
    pub async fn next(&mut self) -> ServerMessage {
        timeout(WAIT, self.observer.next())
            .await
            .expect("timed out waiting for bot output")
            .expect("observer disconnected")
    }

    /// Skips bot output until a message containing `needle` arrives.
    pub async fn wait_for(&mut self, needle: &str) -> ServerMessage {
        loop {
            let message = self.next().await;
            if message.content.as_deref().map_or(false, |content| content.contains(needle)) {
                return message;
            }
        }
    }

    /// Skips bot output until a reaction arrives.
    pub async fn wait_for_reaction(&mut self) -> ServerMessage {
        loop {
            let message = self.next().await;
            if message.message_type == "reaction" {
                return message;
            }
        }
    }

    /// Waits until no game holds the channel.
    pub async fn wait_until_idle(&self) {
        for _ in 0..500 {
            if self.app.registry.is_empty() {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("channel never became idle");
    }
}

/// The word inside the first pair of backticks, lower-cased.
pub fn quoted_word(content: &str) -> String {
    content.split('`').nth(1).unwrap_or_default().to_lowercase()
}
