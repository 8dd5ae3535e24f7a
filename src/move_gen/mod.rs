pub mod attacks;
pub(crate) mod leaping_pieces;
pub mod magic_bitboard;
pub(crate) mod masks;
mod pseudo_legal;

use arrayvec::ArrayVec;

use crate::position::{Move, Position};

/// Upper bound on pseudo-legal moves in any reachable position.
pub const MAX_MOVES: usize = 256;

pub type MoveList = ArrayVec<Move, MAX_MOVES>;

pub trait GenerateMoves {
    /// Moves obeying piece movement rules for the side to move, possibly
    /// leaving its own king attacked. With `captures_only`, only captures
    /// and promotions.
    fn gen_pseudo_legal_moves(&self, position: &Position, captures_only: bool) -> MoveList;

    /// Pseudo-legal moves that don't leave the mover in check, found by
    /// making and unmaking each one.
    fn gen_legal_moves(&self, position: &mut Position) -> MoveList {
        let mover = position.state.to_move;
        self.gen_pseudo_legal_moves(position, false)
            .into_iter()
            .filter(|&mve| !position.play(mve).is_side_in_check(mover))
            .collect()
    }
}

#[derive(Clone, Copy)]
pub struct MagicMoveGen;

impl GenerateMoves for MagicMoveGen {
    fn gen_pseudo_legal_moves(&self, position: &Position, captures_only: bool) -> MoveList {
        pseudo_legal::gen_pseudo_legal_moves(position, captures_only)
    }
}

pub static MOVE_GEN: MagicMoveGen = MagicMoveGen;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::Square::*;
    use test_case::test_case;
    use testresult::TestResult;

    #[test_case("k7/1Q6/1K6/8/8/8/8/8 b - - 0 1", 0 ; "checkmated")]
    #[test_case("4k3/8/8/8/8/8/8/4K3 w - - 0 1", 5 ; "bare king")]
    #[test_case("4k3/8/8/8/8/8/3r4/4K3 w - - 0 1", 2 ; "rook covers second rank")]
    #[test_case("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1", 4 ; "pinned bishop")]
    fn test_legal_move_count(fen: &str, want: usize) -> TestResult {
        let mut position = Position::from_fen(fen)?;
        assert_eq!(MOVE_GEN.gen_legal_moves(&mut position).len(), want);
        Ok(())
    }

    #[test]
    fn test_legal_moves_leave_position_unchanged() -> TestResult {
        let mut position =
            Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")?;
        let before = position.clone();
        let legal = MOVE_GEN.gen_legal_moves(&mut position);
        assert_eq!(legal.len(), 48);
        assert_eq!(position, before);
        assert_eq!(position.history_len(), 0);
        assert!(legal.contains(&Move::new(E1, G1)));
        Ok(())
    }
}
