use chess::{Board, BoardStatus, Color, File, Piece, Rank, Square};

/// Convert a chess color to a string
pub fn color_to_string(color: Color) -> String {
    match color {
        Color::White => "white".to_string(),
        Color::Black => "black".to_string(),
    }
}

pub fn color_from_str(value: &str) -> Option<Color> {
    match value {
        "white" => Some(Color::White),
        "black" => Some(Color::Black),
        _ => None,
    }
}

pub fn piece_to_string(piece: Piece) -> &'static str {
    match piece {
        Piece::Pawn => "pawn",
        Piece::Knight => "knight",
        Piece::Bishop => "bishop",
        Piece::Rook => "rook",
        Piece::Queen => "queen",
        Piece::King => "king",
    }
}

/// Get the board status as a string
pub fn get_board_status(board: &Board) -> &'static str {
    match board.status() {
        BoardStatus::Ongoing if board.checkers().popcnt() > 0 => "check",
        BoardStatus::Ongoing => "in_progress",
        BoardStatus::Checkmate => "checkmate",
        BoardStatus::Stalemate => "stalemate",
    }
}

/// Parses `A1`..`H8`, either case.
pub fn parse_square(text: &str) -> Option<Square> {
    let mut chars = text.chars();
    let file = chars.next()?.to_ascii_uppercase();
    let rank = chars.next()?;
    if chars.next().is_some() || !('A'..='H').contains(&file) || !('1'..='8').contains(&rank) {
        return None;
    }
    Some(Square::make_square(
        Rank::from_index(rank as usize - '1' as usize),
        File::from_index(file as usize - 'A' as usize),
    ))
}

/// Parses a move written as two squares, e.g. `A2A4`, `a2 a4`, `A2,A4`,
/// `A2, A4`, `A2-A4`, `A2>A4` or `A2->A4`.
pub fn parse_move(text: &str) -> Option<(Square, Square)> {
    let text = text.trim();
    if !text.is_ascii() || text.len() < 4 {
        return None;
    }
    let from = parse_square(&text[..2])?;
    let to = parse_square(&text[text.len() - 2..])?;
    match &text[2..text.len() - 2] {
        "" | " " | "," | ", " | "-" | ">" | "->" => Some((from, to)),
        _ => None,
    }
}

/// Formats a remaining time budget as `m:ss`.
pub fn format_clock(remaining_ms: i64) -> String {
    let total_seconds = remaining_ms.max(0) / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Joins words as `a, b, or c`.
pub fn list(items: &[String], conjunction: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{} {} {}", first, conjunction, second),
        [rest @ .., last] => format!("{}, {} {}", rest.join(", "), conjunction, last),
    }
}
