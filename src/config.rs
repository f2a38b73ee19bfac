use std::env;
use std::path::PathBuf;
use std::time::Duration;

use log::info;

use crate::error::{BotError, Result};

/// Which backing store chess save/resume uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStoreKind {
    Off,
    Memory,
}

/// Deadlines and budgets used by the multiplayer games.
#[derive(Debug, Clone)]
pub struct GameTimings {
    pub challenge_timeout: Duration,
    pub car_choice_timeout: Duration,
    pub race_round_timeout: Duration,
    /// Range `[min, max)` of the random window in which `end` is accepted
    /// before the race word is shown.
    pub race_early_end_min: Duration,
    pub race_early_end_max: Duration,
    pub chess_time_budget: Duration,
    pub chess_ai_move_cost: Duration,
}

impl Default for GameTimings {
    fn default() -> Self {
        GameTimings {
            challenge_timeout: Duration::from_secs(30),
            car_choice_timeout: Duration::from_secs(30),
            race_round_timeout: Duration::from_secs(30),
            race_early_end_min: Duration::from_secs(1),
            race_early_end_max: Duration::from_secs(30),
            chess_time_budget: Duration::from_secs(15 * 60),
            chess_ai_move_cost: Duration::from_secs(5),
        }
    }
}

/// Process configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bind: String,
    pub prefix: String,
    pub bot_id: String,
    pub bot_name: String,
    pub assets_dir: PathBuf,
    pub frames_dir: PathBuf,
    pub save_store: SaveStoreKind,
    /// How long rendered frames stay on disk.
    pub frame_retention: Duration,
    pub timings: GameTimings,
}

impl Default for BotConfig {
    fn default() -> Self {
        BotConfig {
            bind: "127.0.0.1:8080".to_string(),
            prefix: "--".to_string(),
            bot_id: "xiao".to_string(),
            bot_name: "Xiao".to_string(),
            assets_dir: PathBuf::from("./assets"),
            frames_dir: PathBuf::from("./frames"),
            save_store: SaveStoreKind::Off,
            frame_retention: Duration::from_secs(10 * 60),
            timings: GameTimings::default(),
        }
    }
}

impl BotConfig {
    /// Builds the configuration from `BOT_*` variables, falling back to
    /// the defaults for anything unset. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        let mut config = BotConfig::default();
        if let Ok(bind) = env::var("BOT_BIND") {
            config.bind = bind;
        }
        if let Ok(prefix) = env::var("BOT_PREFIX") {
            if prefix.trim().is_empty() {
                return Err(BotError::Config { key: "BOT_PREFIX", value: prefix });
            }
            config.prefix = prefix;
        }
        if let Ok(id) = env::var("BOT_ID") {
            config.bot_id = id;
        }
        if let Ok(name) = env::var("BOT_NAME") {
            config.bot_name = name;
        }
        if let Ok(dir) = env::var("BOT_ASSETS_DIR") {
            config.assets_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("BOT_FRAMES_DIR") {
            config.frames_dir = PathBuf::from(dir);
        }
        if let Ok(store) = env::var("BOT_SAVE_STORE") {
            config.save_store = parse_store_kind(&store)?;
        }
        if let Ok(secs) = env::var("BOT_FRAME_RETENTION_SECS") {
            config.frame_retention = parse_retention(&secs)?;
        }
        info!(
            "Configuration loaded: bind={}, prefix={}, save_store={:?}",
            config.bind, config.prefix, config.save_store
        );
        Ok(config)
    }
}

fn parse_store_kind(value: &str) -> Result<SaveStoreKind> {
    match value.to_lowercase().as_str() {
        "off" | "" => Ok(SaveStoreKind::Off),
        "memory" => Ok(SaveStoreKind::Memory),
        _ => Err(BotError::Config { key: "BOT_SAVE_STORE", value: value.to_string() }),
    }
}

fn parse_retention(value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| BotError::Config { key: "BOT_FRAME_RETENTION_SECS", value: value.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_kind_parses_known_values() {
        assert_eq!(parse_store_kind("off").unwrap(), SaveStoreKind::Off);
        assert_eq!(parse_store_kind("MEMORY").unwrap(), SaveStoreKind::Memory);
        assert!(matches!(
            parse_store_kind("redis"),
            Err(BotError::Config { key: "BOT_SAVE_STORE", .. })
        ));
    }

    #[test]
    fn default_timings_are_sane() {
        let timings = GameTimings::default();
        assert_eq!(timings.chess_time_budget, Duration::from_millis(900_000));
        assert_eq!(timings.race_round_timeout, Duration::from_secs(30));
        assert!(timings.race_early_end_min < timings.race_early_end_max);
    }

    #[test]
    fn retention_is_whole_seconds() {
        assert_eq!(parse_retention(" 90 ").unwrap(), Duration::from_secs(90));
        assert!(parse_retention("ten minutes").is_err());
    }
}
