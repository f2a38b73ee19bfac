use std::str::FromStr;

use chess::{Board, Color};
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};
use crate::game::utils::{color_from_str, color_to_string};

/// Saved game record, stored as JSON under [`save_key`] of the saving user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    pub fen: String,
    pub black_time: i64,
    pub white_time: i64,
    /// Color the saving user was playing.
    pub color: String,
}

pub fn save_key(user_id: &str) -> String {
    format!("chess-{}", user_id)
}

impl SavedGame {
    pub fn new(board: &Board, white_time: i64, black_time: i64, saver_color: Color) -> Self {
        SavedGame { fen: board.to_string(), black_time, white_time, color: color_to_string(saver_color) }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses and validates a stored record.
    pub fn parse(raw: &str) -> Result<(SavedGame, Board, Color)> {
        let saved: SavedGame = serde_json::from_str(raw)?;
        let board = Board::from_str(&saved.fen)
            .map_err(|err| BotError::SavedGame(format!("bad position {:?}: {:?}", saved.fen, err)))?;
        let color = color_from_str(&saved.color)
            .ok_or_else(|| BotError::SavedGame(format!("unknown color {:?}", saved.color)))?;
        Ok((saved, board, color))
    }
}
