use chess::{Board, Color, File, Piece, Rank, Square};

use crate::error::Result;
use crate::game::sprites::{draw_scaled, draw_tinted, encode_png, fill_rect_alpha, SpriteSheet};

const BOARD_ORIGIN_X: i64 = 36;
const BOARD_ORIGIN_Y: i64 = 40;
const PIECE_SIZE: u32 = 52;
const SQUARE_STEP: i64 = 54;
const HIGHLIGHT: [u8; 3] = [0, 128, 0];

fn occupant(board: &Board, square: Square) -> Option<(Color, Piece)> {
    Some((board.color_on(square)?, board.piece_on(square)?))
}

/// Renders `board`, highlighting every square whose occupant differs from
/// `previous`.
pub fn render_board(sprites: &SpriteSheet, board: &Board, previous: Option<&Board>) -> Result<Vec<u8>> {
    let mut canvas = sprites.chess_board.clone();
    for rank in 0..8 {
        for file in 0..8 {
            let square = Square::make_square(Rank::from_index(rank), File::from_index(file));
            let x = BOARD_ORIGIN_X + SQUARE_STEP * file as i64;
            let y = BOARD_ORIGIN_Y + SQUARE_STEP * (7 - rank) as i64;
            let current = occupant(board, square);
            let changed = previous.is_some_and(|prev| occupant(prev, square) != current);
            match current {
                Some((color, piece)) if changed => {
                    draw_tinted(&mut canvas, sprites.piece(color, piece), HIGHLIGHT, x, y, PIECE_SIZE, PIECE_SIZE);
                }
                Some((color, piece)) => {
                    draw_scaled(&mut canvas, sprites.piece(color, piece), x, y, PIECE_SIZE, PIECE_SIZE);
                }
                None if changed => {
                    fill_rect_alpha(&mut canvas, x, y, PIECE_SIZE, PIECE_SIZE, HIGHLIGHT, 0.5);
                }
                None => {}
            }
        }
    }
    encode_png(&canvas)
}

#[cfg(test)]
mod tests {
    use chess::ChessMove;

    use super::*;

    #[test]
    fn rendering_is_pure() {
        let sprites = SpriteSheet::placeholder();
        let board = Board::default();
        let a = render_board(&sprites, &board, None).unwrap();
        let b = render_board(&sprites, &board, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn last_move_is_highlighted() {
        let sprites = SpriteSheet::placeholder();
        let before = Board::default();
        let after = before.make_move_new(ChessMove::new(Square::E2, Square::E4, None));

        let plain = render_board(&sprites, &after, None).unwrap();
        let highlighted = render_board(&sprites, &after, Some(&before)).unwrap();
        let unchanged = render_board(&sprites, &after, Some(&after)).unwrap();

        assert_ne!(plain, highlighted);
        assert_eq!(plain, unchanged);
    }
}
