use std::fs;
use std::io;

use actix_web::{web, App, HttpServer};
use log::info;

use channel_games_bot::config::BotConfig;
use channel_games_bot::game::sprites::SpriteSheet;
use channel_games_bot::models::AppState;
use channel_games_bot::routes::configure_routes;

fn to_io(err: channel_games_bot::error::BotError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = BotConfig::from_env().map_err(to_io)?;
    let sprites = SpriteSheet::load(&config.assets_dir).map_err(to_io)?;
    fs::create_dir_all(&config.frames_dir)?;

    info!("Starting {} at ws://{}/ws (prefix `{}`)", config.bot_name, config.bind, config.prefix);

    let bind = config.bind.clone();
    let frames_dir = config.frames_dir.clone();
    let app_state = web::Data::new(AppState::new(config, sprites));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(|cfg| configure_routes(cfg, &frames_dir))
    })
    .bind(bind)?
    .run()
    .await
}
