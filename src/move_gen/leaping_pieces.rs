use crate::bitboard::{BitBoard, Direction, Square};
use crate::position::Side;

struct SquareToMoveDatabase([BitBoard; 64]);

impl SquareToMoveDatabase {
    const fn get_bitboard(&self, square: Square) -> BitBoard {
        self.0[square as usize]
    }
}

struct ColoredSquareToMoveDatabase {
    white: SquareToMoveDatabase,
    black: SquareToMoveDatabase,
}

impl ColoredSquareToMoveDatabase {
    const fn get_square_db(&self, side: Side) -> &SquareToMoveDatabase {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }
}

pub(crate) fn knight_attacks(square: Square) -> BitBoard {
    KNIGHT_ATKS.get_bitboard(square)
}

pub(crate) fn king_attacks(square: Square) -> BitBoard {
    KING_ATKS.get_bitboard(square)
}

/// Squares a pawn of `side` standing on `square` captures on.
pub(crate) fn pawn_attacks(square: Square, side: Side) -> BitBoard {
    PAWN_ATKS.get_square_db(side).get_bitboard(square)
}

const fn calc_square_to_move_database(dirs: &[&[Direction]]) -> SquareToMoveDatabase {
    let mut bbs = [BitBoard::empty(); 64];

    let mut bb_idx = 0;
    while bb_idx < bbs.len() {
        let sq_bb = BitBoard::from_square(Square::from_u8(bb_idx as u8));

        let mut atks = BitBoard::empty();
        let mut dirs_idx = 0;
        while dirs_idx < dirs.len() {
            // Shifts off the board leave an empty board, so nothing is added
            atks = atks.const_bit_or(sq_bb.shift_all(dirs[dirs_idx]));
            dirs_idx += 1;
        }
        bbs[bb_idx] = atks;
        bb_idx += 1;
    }

    SquareToMoveDatabase(bbs)
}

static PAWN_ATKS: ColoredSquareToMoveDatabase = ColoredSquareToMoveDatabase {
    white: calc_square_to_move_database(&[
        &[Direction::IncRank, Direction::IncFile],
        &[Direction::IncRank, Direction::DecFile],
    ]),
    black: calc_square_to_move_database(&[
        &[Direction::DecRank, Direction::IncFile],
        &[Direction::DecRank, Direction::DecFile],
    ]),
};

static KNIGHT_ATKS: SquareToMoveDatabase = calc_square_to_move_database(&[
    &[Direction::IncRank, Direction::IncRank, Direction::IncFile],
    &[Direction::IncRank, Direction::IncRank, Direction::DecFile],
    &[Direction::DecRank, Direction::DecRank, Direction::IncFile],
    &[Direction::DecRank, Direction::DecRank, Direction::DecFile],
    &[Direction::IncRank, Direction::IncFile, Direction::IncFile],
    &[Direction::IncRank, Direction::DecFile, Direction::DecFile],
    &[Direction::DecRank, Direction::IncFile, Direction::IncFile],
    &[Direction::DecRank, Direction::DecFile, Direction::DecFile],
]);

static KING_ATKS: SquareToMoveDatabase = calc_square_to_move_database(&[
    &[Direction::IncRank],
    &[Direction::IncFile],
    &[Direction::DecFile],
    &[Direction::DecRank],
    &[Direction::IncRank, Direction::IncFile],
    &[Direction::IncRank, Direction::DecFile],
    &[Direction::DecRank, Direction::IncFile],
    &[Direction::DecRank, Direction::DecFile],
]);
