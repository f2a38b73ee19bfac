//! Shallow move search for when the bot itself is playing.
use chess::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece, ALL_SQUARES};

const MATE: i32 = 100_000;

fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 100,
        Piece::Knight => 320,
        Piece::Bishop => 330,
        Piece::Rook => 500,
        Piece::Queen => 900,
        Piece::King => 0,
    }
}

/// Material balance from `side`'s point of view.
pub fn evaluate(board: &Board, side: Color) -> i32 {
    ALL_SQUARES
        .iter()
        .filter_map(|&square| Some((board.piece_on(square)?, board.color_on(square)?)))
        .map(|(piece, color)| if color == side { piece_value(piece) } else { -piece_value(piece) })
        .sum()
}

/// Best score the side to move can reach with one move.
fn best_reply(board: &Board) -> i32 {
    let side = board.side_to_move();
    match board.status() {
        BoardStatus::Checkmate => -MATE,
        BoardStatus::Stalemate => 0,
        BoardStatus::Ongoing => MoveGen::new_legal(board)
            .map(|mv| {
                let after = board.make_move_new(mv);
                if after.status() == BoardStatus::Checkmate {
                    MATE
                } else {
                    evaluate(&after, side)
                }
            })
            .max()
            .unwrap_or(0),
    }
}

/// Picks a move for the side to move, looking at the opponent's best answer.
/// Ties keep the first move in generation order, so the choice is
/// deterministic. `None` when there is no legal move.
pub fn choose_move(board: &Board) -> Option<ChessMove> {
    let mut best: Option<(i32, ChessMove)> = None;
    for mv in MoveGen::new_legal(board) {
        let score = -best_reply(&board.make_move_new(mv));
        if best.map_or(true, |(best_score, _)| score > best_score) {
            best = Some((score, mv));
        }
    }
    best.map(|(_, mv)| mv)
}
