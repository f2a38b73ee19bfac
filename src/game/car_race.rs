//! Two-player typing race. Each round both racers race to retype a word;
//! the faster one moves their car a space. First to the finish line wins.
use std::time::Duration;

use actix_web::web;
use image::RgbaImage;
use log::info;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::commands::resolve_user;
use crate::error::Result;
use crate::game::sprites::{draw, draw_scaled, encode_png, SpriteSheet};
use crate::game::utils::list;
use crate::models::{AppState, ChatMessage, User};
use crate::session::{challenge, resolve, Occupied};
use crate::websocket::frames::Frame;
use crate::websocket::hub::ChannelHandle;

pub const NAME: &str = "car-race";
pub const FINISH_LINE: u8 = 7;
pub const WORDS: &[&str] = &["go", "zoom", "drive", "advance", "pedal", "vroom"];

const WELCOME: &str = "Welcome to `car-race`! Whenever a message pops up, type the word provided.\n\
Whoever types the word first advances their car!\n\
Either player can type `end` at any time to end the game.";

const CAR_START_X: i64 = -155;
const CAR_STEP_X: i64 = 92;
const OPPONENT_LANE_Y: i64 = 208;
const CHALLENGER_LANE_Y: i64 = 254;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Racer {
    Challenger,
    Opponent,
}

impl Racer {
    pub fn rival(self) -> Racer {
        match self {
            Racer::Challenger => Racer::Opponent,
            Racer::Opponent => Racer::Challenger,
        }
    }
}

/// Spaces travelled by each car.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RaceState {
    pub challenger_spaces: u8,
    pub opponent_spaces: u8,
}

impl RaceState {
    pub fn spaces(&self, racer: Racer) -> u8 {
        match racer {
            Racer::Challenger => self.challenger_spaces,
            Racer::Opponent => self.opponent_spaces,
        }
    }

    fn spaces_mut(&mut self, racer: Racer) -> &mut u8 {
        match racer {
            Racer::Challenger => &mut self.challenger_spaces,
            Racer::Opponent => &mut self.opponent_spaces,
        }
    }

    pub fn advance(&mut self, racer: Racer) {
        let spaces = self.spaces_mut(racer);
        *spaces = (*spaces + 1).min(FINISH_LINE);
    }

    /// `quitter` gives up; the rival is put on the finish line.
    pub fn forfeit(&mut self, quitter: Racer) {
        *self.spaces_mut(quitter.rival()) = FINISH_LINE;
    }

    pub fn is_finished(&self) -> bool {
        self.challenger_spaces >= FINISH_LINE || self.opponent_spaces >= FINISH_LINE
    }

    /// The racer strictly ahead, if any.
    pub fn leader(&self) -> Option<Racer> {
        match self.challenger_spaces.cmp(&self.opponent_spaces) {
            std::cmp::Ordering::Greater => Some(Racer::Challenger),
            std::cmp::Ordering::Less => Some(Racer::Opponent),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Commentary for the round after `last_winner` scored.
pub fn round_commentary(state: &RaceState, last_winner: Racer, winner_user: &User) -> String {
    match state.leader() {
        Some(leader) if leader == last_winner => format!("{} pulls ahead!", winner_user),
        Some(_) => format!("{} catches up!", winner_user),
        None => format!("{} ties it up!", winner_user),
    }
}

/// Draws the track with both cars; with `winner_car` set, adds the
/// celebration overlay.
pub fn render_race(
    sprites: &SpriteSheet,
    challenger_car: &RgbaImage,
    opponent_car: &RgbaImage,
    state: &RaceState,
    winner_car: Option<&RgbaImage>,
) -> Result<Vec<u8>> {
    let mut canvas = sprites.race_background.clone();
    let opponent_x = CAR_START_X + CAR_STEP_X * state.opponent_spaces as i64;
    draw(&mut canvas, opponent_car, opponent_x, OPPONENT_LANE_Y);
    let challenger_x = CAR_START_X + CAR_STEP_X * state.challenger_spaces as i64;
    draw(&mut canvas, challenger_car, challenger_x, CHALLENGER_LANE_Y);
    if let Some(car) = winner_car {
        draw_scaled(&mut canvas, &sprites.fireworks, 106, -48, 400, 283);
        draw_scaled(&mut canvas, &sprites.congrats, 182, 21, 250, 62);
        let (width, height) = car.dimensions();
        draw_scaled(&mut canvas, car, 152, 84, width * 3 / 2, height * 3 / 2);
    }
    encode_png(&canvas)
}

fn random_window(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    rand::thread_rng().gen_range(min..max)
}

/// `car-race <opponent> <car>`
pub async fn run(app: web::Data<AppState>, msg: ChatMessage, args: Vec<String>) -> Result<()> {
    let channel = app.hub.channel(&msg.channel_id);
    let Some(opponent) = args.first().and_then(|raw| resolve_user(&app, raw)) else {
        channel.reply(&msg, "What user would you like to challenge?");
        return Ok(());
    };
    let cars = app.sprites.car_names();
    let car = match args.get(1).map(|raw| raw.to_lowercase()) {
        Some(car) if cars.contains(&car) => car,
        _ => {
            channel.reply(&msg, &format!("What car do you want to use? Either {}.", list(&cars, "or")));
            return Ok(());
        }
    };
    if opponent.bot {
        channel.reply(&msg, "Bots may not be played against.");
        return Ok(());
    }
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
    race(&app, &channel, &msg.author, &opponent, &car).await
}

async fn race(app: &AppState, channel: &ChannelHandle, challenger: &User, opponent: &User, car: &str) -> Result<()> {
    let timings = &app.config.timings;
    if !challenge(channel, opponent, timings.challenge_timeout).await.is_accepted() {
        return Ok(());
    }

    let available: Vec<String> = app.sprites.car_names().into_iter().filter(|name| name != car).collect();
    let collector = channel.collector();
    channel.say(format!("{}, what car do you want to be? Either {}.", opponent, list(&available, "or")));
    let choice = resolve(
        collector,
        |m| m.is_from(opponent) && available.contains(&m.normalized()),
        timings.car_choice_timeout,
    )
    .await;
    let opponent_car_name = match choice {
        Some(m) => m.normalized(),
        None => available.choose(&mut rand::thread_rng()).cloned().unwrap_or_else(|| car.to_string()),
    };
    let challenger_car = app.sprites.car(car);
    let opponent_car = app.sprites.car(&opponent_car_name);
    info!("Race in {}: {} ({}) vs {} ({})", channel.id(), challenger.id, car, opponent.id, opponent_car_name);

    let racer_of = |user: &User| if user == challenger { Racer::Challenger } else { Racer::Opponent };
    let user_of = |racer: Racer| match racer {
        Racer::Challenger => challenger,
        Racer::Opponent => opponent,
    };
    let is_racer = |m: &ChatMessage| m.is_from(challenger) || m.is_from(opponent);

    let mut state = RaceState::default();
    let mut last_round_winner: Option<Racer> = None;
    let mut last_turn_timeout = false;
    while !state.is_finished() {
        let board = render_race(&app.sprites, challenger_car, opponent_car, &state, None)?;
        let text = match last_round_winner {
            Some(winner) => round_commentary(&state, winner, user_of(winner)),
            None => WELCOME.to_string(),
        };
        let collector = channel.collector();
        channel.send(format!("{}\nGet Ready...", text), Some(Frame::new("car-race.png", board)))?;

        let window = random_window(timings.race_early_end_min, timings.race_early_end_max);
        let early_end = resolve(collector, |m| is_racer(m) && m.normalized() == "end", window).await;
        if let Some(end) = early_end {
            state.forfeit(racer_of(&end.author));
            break;
        }

        let word = WORDS.choose(&mut rand::thread_rng()).copied().unwrap_or("go");
        let collector = channel.collector();
        channel.say(format!("TYPE `{}` NOW!", word.to_uppercase()));
        let turn = resolve(
            collector,
            |m| {
                let content = m.normalized();
                is_racer(m) && (content == "end" || content == word)
            },
            timings.race_round_timeout,
        )
        .await;
        let Some(turn) = turn else {
            if last_turn_timeout {
                info!("Race in {} abandoned", channel.id());
                channel.say("Game ended due to inactivity.");
                return Ok(());
            }
            channel.say("Come on, get your head in the game!");
            last_turn_timeout = true;
            continue;
        };
        let racer = racer_of(&turn.author);
        if turn.normalized() == "end" {
            state.forfeit(racer);
            break;
        }
        state.advance(racer);
        last_round_winner = Some(racer);
        last_turn_timeout = false;
    }

    let Some(winner) = state.leader() else {
        channel.say("The race ended in a tie.");
        return Ok(());
    };
    let winner_car = match winner {
        Racer::Challenger => challenger_car,
        Racer::Opponent => opponent_car,
    };
    let board = render_race(&app.sprites, challenger_car, opponent_car, &state, Some(winner_car))?;
    info!("Race in {} won by {}", channel.id(), user_of(winner).id);
    channel.send(format!("Congrats, {}!", user_of(winner)), Some(Frame::new("car-race-win.png", board)))?;
    Ok(())
}
