use std::fmt;
use std::ops::{Add, Neg, Sub};

use strum::IntoEnumIterator;

use crate::position::{Piece, Position, Side};

/// Deepest ply a mate score can be reported at. Scores within this many
/// plies of [`Eval::MATE`] are mate scores.
pub const MAX_PLY: i32 = 256;

/// A score in centipawns from the point of view of the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Eval(pub i32);

impl Eval {
    pub const DRAW: Eval = Eval(0);
    pub const MATE: Eval = Eval(30_000);
    pub const INFINITY: Eval = Eval(32_000);
    pub const MAX: Eval = Eval::INFINITY;
    pub const MIN: Eval = Eval(-Eval::INFINITY.0);

    /// Score of the side to move when it is checkmated `ply` half moves from
    /// the root.
    pub const fn mated_in(ply: u8) -> Eval {
        Eval(-(Eval::MATE.0 - ply as i32))
    }

    pub const fn value(self) -> i32 {
        self.0
    }

    pub fn is_mate(self) -> bool {
        self.0.abs() > Eval::MATE.0 - MAX_PLY && self.0.abs() <= Eval::MATE.0
    }

    /// Number of full moves until mate, negative when being mated.
    pub fn mate_in_moves(self) -> Option<i32> {
        if !self.is_mate() {
            return None;
        }
        let plies = Eval::MATE.0 - self.0.abs();
        let moves = (plies + 1) / 2;
        Some(if self.0 > 0 { moves } else { -moves })
    }

    /// Converts a score found `ply` half moves from the root to one relative
    /// to the node itself, for storing in the transposition table.
    pub fn to_table(self, ply: u8) -> Eval {
        if !self.is_mate() {
            self
        } else if self.0 > 0 {
            Eval(self.0 + ply as i32)
        } else {
            Eval(self.0 - ply as i32)
        }
    }

    /// Inverse of [`Eval::to_table`].
    pub fn from_table(self, ply: u8) -> Eval {
        if !self.is_mate() {
            self
        } else if self.0 > 0 {
            Eval(self.0 - ply as i32)
        } else {
            Eval(self.0 + ply as i32)
        }
    }
}

impl Neg for Eval {
    type Output = Eval;

    fn neg(self) -> Eval {
        Eval(-self.0)
    }
}

impl Add<i32> for Eval {
    type Output = Eval;

    fn add(self, rhs: i32) -> Eval {
        Eval(self.0 + rhs)
    }
}

impl Sub<i32> for Eval {
    type Output = Eval;

    fn sub(self, rhs: i32) -> Eval {
        Eval(self.0 - rhs)
    }
}

impl fmt::Display for Eval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mate_in_moves() {
            Some(moves) => write!(f, "mate {}", moves),
            None => write!(f, "cp {}", self.0),
        }
    }
}

pub fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 100,
        Piece::Knight => 300,
        Piece::Bishop => 300,
        Piece::Rook => 500,
        Piece::Queen => 900,
        Piece::King => 10_000,
    }
}

pub trait EvaluatePosition {
    /// Static score of `position` for the side to move.
    fn evaluate(&self, position: &Position) -> Eval;
}

/// Counts material, kings excluded.
#[derive(Clone, Copy)]
pub struct MaterialEvaluator;

impl EvaluatePosition for MaterialEvaluator {
    fn evaluate(&self, position: &Position) -> Eval {
        let mut eval = 0;

        for piece in Piece::iter().filter(|&piece| piece != Piece::King) {
            let white = position.piece_bitboard(piece, Side::White).num_squares_set() as i32;
            let black = position.piece_bitboard(piece, Side::Black).num_squares_set() as i32;
            eval += (white - black) * piece_value(piece);
        }

        if position.state.to_move == Side::White {
            Eval(eval)
        } else {
            Eval(-eval)
        }
    }
}

pub static POSITION_EVALUATOR: MaterialEvaluator = MaterialEvaluator;

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use testresult::TestResult;

    #[test_case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", Eval(0) ; "start")]
    #[test_case("4k3/8/8/8/8/8/8/3QK3 w - - 0 1", Eval(900) ; "white queen up")]
    #[test_case("4k3/8/8/8/8/8/8/3QK3 b - - 0 1", Eval(-900) ; "black to move")]
    #[test_case("4k3/ppp5/8/8/8/8/8/2R1K3 w - - 0 1", Eval(200) ; "rook against pawns")]
    fn test_material(fen: &str, want: Eval) -> TestResult {
        let position = Position::from_fen(fen)?;
        assert_eq!(POSITION_EVALUATOR.evaluate(&position), want);
        Ok(())
    }

    #[test_case(Eval::mated_in(3), Some(-2) ; "mated")]
    #[test_case(-Eval::mated_in(1), Some(1) ; "mating")]
    #[test_case(Eval(450), None ; "not mate")]
    fn test_mate_in_moves(eval: Eval, want: Option<i32>) {
        assert_eq!(eval.mate_in_moves(), want);
    }

    #[test]
    fn test_table_rebasing() {
        // Mate 5 plies from the root, seen from a node at ply 2
        let at_root = -Eval::mated_in(5);
        let stored = at_root.to_table(2);
        assert_eq!(stored, -Eval::mated_in(3));
        assert_eq!(stored.from_table(2), at_root);
        assert_eq!(stored.from_table(4), -Eval::mated_in(7));

        assert_eq!(Eval(120).to_table(9), Eval(120));
    }

    #[test]
    fn test_display() {
        assert_eq!(Eval(-35).to_string(), "cp -35");
        assert_eq!((-Eval::mated_in(1)).to_string(), "mate 1");
    }
}
