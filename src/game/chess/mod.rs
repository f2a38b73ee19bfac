//! Chess between two users, or against the bot.
pub mod ai;
pub mod board_render;
pub mod save;

use std::time::{Duration, Instant};

use actix_web::web;
use chess::{BoardStatus, Color};
use log::{info, warn};

use crate::commands::resolve_user;
use crate::error::Result;
use crate::game::utils::{format_clock, get_board_status, parse_move};
use crate::models::{AppState, ChatMessage, ChessMatch, User};
use crate::session::{challenge, resolve, verify, Occupied};
use crate::websocket::frames::Frame;
use crate::websocket::hub::ChannelHandle;

use board_render::render_board;
use save::{save_key, SavedGame};

pub const NAME: &str = "chess";

/// How a save request was settled.
enum SaveOutcome {
    Saved,
    KeepPlaying,
}

fn millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// `chess <opponent>`
pub async fn run(app: web::Data<AppState>, msg: ChatMessage, args: Vec<String>) -> Result<()> {
    let channel = app.hub.channel(&msg.channel_id);
    let Some(opponent) = args.first().and_then(|raw| resolve_user(&app, raw)) else {
        channel.reply(&msg, "What user would you like to challenge? To play against AI, choose me.");
        return Ok(());
    };
    if opponent == msg.author {
        channel.reply(&msg, "You may not play against yourself.");
        return Ok(());
    }
    let _slot = match app.registry.acquire(&msg.channel_id, NAME) {
        Ok(slot) => slot,
        Err(Occupied(current)) => {
            channel.reply(&msg, &format!("Please wait until the current game of `{}` is finished.", current));
            return Ok(());
        }
    };
    play(&app, &channel, &msg.author, &opponent).await
}

/// `chess-delete`
pub async fn delete_saved(app: web::Data<AppState>, msg: ChatMessage, _args: Vec<String>) -> Result<()> {
    let channel = app.hub.channel(&msg.channel_id);
    let Some(store) = app.store.as_ref() else {
        channel.reply(&msg, "Saving chess games is not enabled.");
        return Ok(());
    };
    if store.del(&save_key(&msg.author.id))? {
        channel.reply(&msg, "Your saved game has been deleted.");
    } else {
        channel.reply(&msg, "You do not have a saved game.");
    }
    Ok(())
}

async fn play(app: &AppState, channel: &ChannelHandle, challenger: &User, opponent: &User) -> Result<()> {
    let timings = &app.config.timings;
    if !opponent.bot && !challenge(channel, opponent, timings.challenge_timeout).await.is_accepted() {
        return Ok(());
    }
    let mut game = restore_or_new(app, channel, challenger, opponent).await?;
    info!("Chess in {}: {} (white) vs {} (black)", channel.id(), game.white_player.id, game.black_player.id);

    loop {
        match game.status() {
            BoardStatus::Checkmate => {
                // The side to move is mated, so the other side made the last move.
                let winner = game.player(!game.side_to_move()).clone();
                let board = render_board(&app.sprites, &game.board, game.previous.as_ref())?;
                info!("Chess in {} won by checkmate: {}", channel.id(), winner.id);
                channel.send(format!("Checkmate! Congrats, {}!", winner), Some(Frame::new("chess.png", board)))?;
                return Ok(());
            }
            BoardStatus::Stalemate => {
                let board = render_board(&app.sprites, &game.board, game.previous.as_ref())?;
                channel.send("Stalemate! The game is a draw.", Some(Frame::new("chess.png", board)))?;
                return Ok(());
            }
            BoardStatus::Ongoing => {}
        }

        let side = game.side_to_move();
        let mover = game.player(side).clone();
        let remaining = game.remaining_ms(side);
        if remaining <= 0 {
            channel.say(format!("{} wins from timeout!", game.rival_of(&mover)));
            return Ok(());
        }

        if mover.bot {
            if let Some(mv) = ai::choose_move(&game.board) {
                game.apply(mv);
            }
            game.debit(side, millis(timings.chess_ai_move_cost));
            continue;
        }

        let board = render_board(&app.sprites, &game.board, game.previous.as_ref())?;
        let collector = channel.collector();
        channel.send(turn_prompt(&mover, game.in_check(), remaining), Some(Frame::new("chess.png", board)))?;
        let started = Instant::now();
        let turn = resolve(
            collector,
            |m| accepts_turn(channel, &game, &mover, m),
            Duration::from_millis(remaining as u64),
        )
        .await;
        let Some(turn) = turn else {
            info!("Chess in {}: {} ran out of time", channel.id(), mover.id);
            channel.say(format!("{} wins from timeout!", game.rival_of(&mover)));
            return Ok(());
        };

        match turn.normalized().as_str() {
            "end" => {
                channel.say(format!("{} forfeits. Congrats, {}!", turn.author, game.rival_of(&turn.author)));
                return Ok(());
            }
            "save" => match save_game(app, channel, &game, &turn.author).await? {
                SaveOutcome::Saved => {
                    let rival = game.rival_of(&turn.author);
                    channel.say(format!(
                        "Game saved! Use `{prefix}chess {rival}` to resume it.\n\
                         You do not have to use the same opponent to resume the game.\n\
                         If you want to delete your saved game, use `{prefix}chess-delete`.",
                        prefix = app.config.prefix,
                        rival = rival,
                    ));
                    return Ok(());
                }
                SaveOutcome::KeepPlaying => {
                    // The clock kept running while the save was refused.
                    game.debit(side, millis(started.elapsed()));
                    continue;
                }
            },
            _ => {
                game.debit(side, millis(started.elapsed()));
                if let Some((from, to)) = parse_move(&turn.content) {
                    game.play(from, to);
                }
            }
        }
    }
}

fn turn_prompt(mover: &User, in_check: bool, remaining_ms: i64) -> String {
    format!(
        "{}, what move do you want to make (ex. A1A2)? Type `end` to forfeit.\n\
         You can save your game by typing `save`.\n\
         _You are {}_\n\n\
         **Time Remaining: {}**",
        mover,
        if in_check { "**in check!**" } else { "not in check." },
        format_clock(remaining_ms),
    )
}

/// Turn filter: `end`/`save` from either player, or a legal move from the
/// player to move. Move-shaped attempts that are illegal get a ❌.
fn accepts_turn(channel: &ChannelHandle, game: &ChessMatch, mover: &User, m: &ChatMessage) -> bool {
    if !game.is_player(&m.author) {
        return false;
    }
    let choice = m.normalized();
    if choice == "end" || choice == "save" {
        return true;
    }
    if !m.is_from(mover) {
        return false;
    }
    let Some((from, to)) = parse_move(&m.content) else {
        return false;
    };
    if !game.is_legal(from, to) {
        channel.react(m, "❌");
        return false;
    }
    true
}

async fn restore_or_new(app: &AppState, channel: &ChannelHandle, challenger: &User, opponent: &User) -> Result<ChessMatch> {
    let budget = millis(app.config.timings.chess_time_budget);
    let fresh = ChessMatch::new(challenger.clone(), opponent.clone(), budget);
    let Some(store) = app.store.as_ref() else {
        return Ok(fresh);
    };
    let key = save_key(&challenger.id);
    let Some(raw) = store.get(&key)? else {
        return Ok(fresh);
    };
    let prompt = format!("{}, you have a saved game, do you want to resume it?", challenger);
    if !verify(channel, challenger, prompt, app.config.timings.challenge_timeout).await.is_accepted() {
        return Ok(fresh);
    }
    store.del(&key)?;
    match SavedGame::parse(&raw) {
        Ok((saved, board, color)) => {
            let (white, black) = match color {
                Color::White => (challenger.clone(), opponent.clone()),
                Color::Black => (opponent.clone(), challenger.clone()),
            };
            info!("Resuming saved chess game of {} ({})", challenger.id, get_board_status(&board));
            Ok(ChessMatch::resumed(board, white, black, saved.white_time, saved.black_time))
        }
        Err(err) => {
            warn!("Discarding saved chess game of {}: {}", challenger.id, err);
            channel.say("Your saved game could not be loaded, so a new game is starting.");
            Ok(fresh)
        }
    }
}

async fn save_game(app: &AppState, channel: &ChannelHandle, game: &ChessMatch, saver: &User) -> Result<SaveOutcome> {
    let Some(store) = app.store.as_ref() else {
        channel.say(format!("{}, saving games is not enabled. Keep playing!", saver));
        return Ok(SaveOutcome::KeepPlaying);
    };
    let key = save_key(&saver.id);
    if store.get(&key)?.is_some() {
        let prompt = format!("{}, you already have a saved game, do you want to overwrite it?", saver);
        if !verify(channel, saver, prompt, app.config.timings.challenge_timeout).await.is_accepted() {
            return Ok(SaveOutcome::KeepPlaying);
        }
    }
    let saver_color = game.color_of(saver).unwrap_or(Color::Black);
    let record = SavedGame::new(&game.board, game.white_time_ms, game.black_time_ms, saver_color);
    store.set(&key, &record.to_json()?)?;
    info!("Saved chess game for {}", saver.id);
    Ok(SaveOutcome::Saved)
}
