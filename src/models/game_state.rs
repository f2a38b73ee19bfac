use chess::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Square};

use crate::models::User;

/// State of one chess session.
#[derive(Debug, Clone)]
pub struct ChessMatch {
    pub board: Board,
    /// Position before the last move; drives the highlight.
    pub previous: Option<Board>,
    pub white_player: User,
    pub black_player: User,
    pub white_time_ms: i64,
    pub black_time_ms: i64,
}

impl ChessMatch {
    pub fn new(white_player: User, black_player: User, budget_ms: i64) -> Self {
        ChessMatch {
            board: Board::default(),
            previous: None,
            white_player,
            black_player,
            white_time_ms: budget_ms,
            black_time_ms: budget_ms,
        }
    }

    pub fn resumed(board: Board, white_player: User, black_player: User, white_time_ms: i64, black_time_ms: i64) -> Self {
        ChessMatch { board, previous: None, white_player, black_player, white_time_ms, black_time_ms }
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn player(&self, color: Color) -> &User {
        match color {
            Color::White => &self.white_player,
            Color::Black => &self.black_player,
        }
    }

    pub fn color_of(&self, user: &User) -> Option<Color> {
        if *user == self.white_player {
            Some(Color::White)
        } else if *user == self.black_player {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn is_player(&self, user: &User) -> bool {
        self.color_of(user).is_some()
    }

    /// The other participant. Anyone who is not white is treated as black's
    /// side, so this never fails.
    pub fn rival_of(&self, user: &User) -> &User {
        if *user == self.white_player {
            &self.black_player
        } else {
            &self.white_player
        }
    }

    pub fn remaining_ms(&self, color: Color) -> i64 {
        match color {
            Color::White => self.white_time_ms,
            Color::Black => self.black_time_ms,
        }
    }

    pub fn debit(&mut self, color: Color, elapsed_ms: i64) {
        match color {
            Color::White => self.white_time_ms -= elapsed_ms,
            Color::Black => self.black_time_ms -= elapsed_ms,
        }
    }

    pub fn in_check(&self) -> bool {
        self.board.checkers().popcnt() > 0
    }

    pub fn status(&self) -> BoardStatus {
        self.board.status()
    }

    /// Squares the piece on `from` may legally move to.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let mut destinations: Vec<Square> = MoveGen::new_legal(&self.board)
            .filter(|mv| mv.get_source() == from)
            .map(|mv| mv.get_dest())
            .collect();
        destinations.dedup();
        destinations
    }

    pub fn is_legal(&self, from: Square, to: Square) -> bool {
        self.legal_destinations(from).contains(&to)
    }

    /// Plays `from`→`to` for the side to move, promoting pawns to queens.
    /// Returns false and leaves the position untouched if illegal.
    pub fn play(&mut self, from: Square, to: Square) -> bool {
        let chosen = MoveGen::new_legal(&self.board)
            .filter(|mv| mv.get_source() == from && mv.get_dest() == to)
            .find(|mv| matches!(mv.get_promotion(), None | Some(Piece::Queen)));
        match chosen {
            Some(mv) => {
                self.apply(mv);
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, mv: ChessMove) {
        self.previous = Some(self.board);
        self.board = self.board.make_move_new(mv);
    }
}
