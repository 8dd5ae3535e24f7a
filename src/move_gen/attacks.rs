use crate::bitboard::{BitBoard, Square, FILE_A, FILE_H};
use crate::position::{Piece, Position, Side};

use super::leaping_pieces::{king_attacks, knight_attacks};
use super::magic_bitboard::{bishop_attacks, rook_attacks};

/// Squares attacked by every pawn in `pawns` of `side`, shifting the whole
/// set at once. Pawns on the A/H files are masked so captures don't wrap
/// to the opposite edge.
pub(crate) fn pawn_attack_set(pawns: BitBoard, side: Side) -> BitBoard {
    let pawns = pawns.to_val();
    let atks = match side {
        Side::White => ((pawns & !FILE_A.to_val()) << 7) | ((pawns & !FILE_H.to_val()) << 9),
        Side::Black => ((pawns & !FILE_H.to_val()) >> 7) | ((pawns & !FILE_A.to_val()) >> 9),
    };
    BitBoard::from_val(atks)
}

/// Every piece of `by_side` attacking `square`, given `occupancy` for
/// sliders.
pub(crate) fn attackers_with_occupancy(
    position: &Position,
    square: Square,
    by_side: Side,
    occupancy: BitBoard,
) -> BitBoard {
    let pieces = |piece| position.piece_bitboard(piece, by_side);
    let diagonal = pieces(Piece::Bishop) | pieces(Piece::Queen);
    let straight = pieces(Piece::Rook) | pieces(Piece::Queen);
    let target = BitBoard::from_square(square);

    // A pawn attacks the square if the square would attack it back as a pawn
    // of the other side
    let pawns = pieces(Piece::Pawn)
        & pawn_attack_set(target, by_side.opposite_side());

    pawns
        | (knight_attacks(square) & pieces(Piece::Knight))
        | (king_attacks(square) & pieces(Piece::King))
        | (bishop_attacks(square, occupancy) & diagonal)
        | (rook_attacks(square, occupancy) & straight)
}

/// All pieces of `by_side` that attack `square`.
pub fn attackers(position: &Position, square: Square, by_side: Side) -> BitBoard {
    attackers_with_occupancy(position, square, by_side, position.occupied())
}

/// Whether any piece of `by_side` attacks `square`. Checks the cheap
/// leapers before the sliders.
pub fn attacked(position: &Position, square: Square, by_side: Side) -> bool {
    let pieces = |piece| position.piece_bitboard(piece, by_side);
    let target = BitBoard::from_square(square);

    if !(pieces(Piece::Pawn) & pawn_attack_set(target, by_side.opposite_side())).is_empty()
        || !(knight_attacks(square) & pieces(Piece::Knight)).is_empty()
        || !(king_attacks(square) & pieces(Piece::King)).is_empty()
    {
        return true;
    }

    let occupancy = position.occupied();
    let diagonal = pieces(Piece::Bishop) | pieces(Piece::Queen);
    if !diagonal.is_empty() && !(bishop_attacks(square, occupancy) & diagonal).is_empty() {
        return true;
    }
    let straight = pieces(Piece::Rook) | pieces(Piece::Queen);
    !straight.is_empty() && !(rook_attacks(square, occupancy) & straight).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::Square::*;
    use test_case::test_case;
    use testresult::TestResult;

    #[test_case(BitBoard::from_squares(&[A2, H2, D4]), Side::White, BitBoard::from_squares(&[B3, G3, C5, E5]) ; "white edges")]
    #[test_case(BitBoard::from_squares(&[A7, H7]), Side::Black, BitBoard::from_squares(&[B6, G6]) ; "black edges")]
    #[test_case(BitBoard::from_squares(&[H8]), Side::White, BitBoard::empty() ; "off board")]
    fn test_pawn_attack_set(pawns: BitBoard, side: Side, want: BitBoard) {
        assert_eq!(pawn_attack_set(pawns, side), want);
    }

    #[test]
    fn test_attackers_start_position() {
        let position = Position::start();
        assert_eq!(
            attackers(&position, F3, Side::White),
            BitBoard::from_squares(&[E2, G2, G1])
        );
        assert_eq!(attackers(&position, E4, Side::White), BitBoard::empty());
        assert!(!attacked(&position, E4, Side::White));
        assert!(attacked(&position, D6, Side::Black));
    }

    #[test]
    fn test_attackers_sliders_blocked() -> TestResult {
        let position = Position::from_fen("4k3/8/8/3q4/8/1B3R2/8/3RK3 w - - 0 1")?;
        assert_eq!(
            attackers(&position, D5, Side::White),
            BitBoard::from_squares(&[B3, D1])
        );
        assert_eq!(
            attackers(&position, F5, Side::White),
            BitBoard::from_squares(&[F3])
        );
        assert_eq!(
            attackers(&position, F3, Side::Black),
            BitBoard::from_squares(&[D5])
        );
        Ok(())
    }

    #[test]
    fn test_pawn_on_h_file_does_not_attack_a_file() -> TestResult {
        let position = Position::from_fen("4k3/8/8/8/8/8/7P/4K3 w - - 0 1")?;
        assert!(attacked(&position, G3, Side::White));
        assert!(!attacked(&position, A4, Side::White));
        assert!(!attacked(&position, A3, Side::White));
        Ok(())
    }
}
