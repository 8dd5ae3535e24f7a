use std::collections::HashSet;

use chess_search::bitboard::Square::*;
use chess_search::move_gen::{GenerateMoves, MOVE_GEN};
use chess_search::position::{Move, Piece, Position};

use test_case::test_case;
use testresult::TestResult;

#[test_case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", HashSet::from_iter([
    Move::new(A2, A3), Move::new(A2, A4),
    Move::new(B2, B3), Move::new(B2, B4),
    Move::new(C2, C3), Move::new(C2, C4),
    Move::new(D2, D3), Move::new(D2, D4),
    Move::new(E2, E3), Move::new(E2, E4),
    Move::new(F2, F3), Move::new(F2, F4),
    Move::new(G2, G3), Move::new(G2, G4),
    Move::new(H2, H3), Move::new(H2, H4),
    Move::new(B1, A3), Move::new(B1, C3),
    Move::new(G1, F3), Move::new(G1, H3),
]) ; "start")]
#[test_case("8/8/p7/1p1p4/1P6/P1P3kp/5p2/1b5K w - - 0 51", HashSet::from_iter([
    Move::new(C3, C4), Move::new(A3, A4),
]) ; "king boxed in")]
#[test_case("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1", HashSet::from_iter([
    Move::capture(E1, E2, Piece::Rook), Move::new(E1, D1), Move::new(E1, F1),
]) ; "take the checker or step aside")]
#[test_case("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2", HashSet::from_iter([
    Move::new(E5, E6), Move::capture(E5, D6, Piece::Pawn),
    Move::new(E1, D1), Move::new(E1, F1), Move::new(E1, D2), Move::new(E1, E2), Move::new(E1, F2),
]) ; "en passant")]
#[test_case("8/8/8/KPp4r/8/8/8/4k3 w - c6 0 2", HashSet::from_iter([
    Move::new(B5, B6),
    Move::new(A5, A4), Move::new(A5, A6), Move::new(A5, B6),
]) ; "en passant uncovers rank check")]
fn test_gen_legal_moves(fen: &str, want: HashSet<Move>) -> TestResult {
    let mut position = Position::from_fen(fen)?;

    let got: HashSet<Move> = MOVE_GEN.gen_legal_moves(&mut position).into_iter().collect();

    assert_eq!(got, want);
    Ok(())
}

#[test]
fn test_captures_only_is_subset() -> TestResult {
    let position =
        Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")?;
    let all: HashSet<Move> = MOVE_GEN.gen_pseudo_legal_moves(&position, false).into_iter().collect();
    let captures = MOVE_GEN.gen_pseudo_legal_moves(&position, true);

    assert!(!captures.is_empty());
    for mve in &captures {
        assert!(all.contains(mve));
        assert!(mve.is_capture() || mve.is_promotion());
    }
    let all_captures = all.iter().filter(|mve| mve.is_capture()).count();
    assert_eq!(captures.len(), all_captures);
    Ok(())
}

#[test_case(Piece::Queen)]
#[test_case(Piece::Rook)]
#[test_case(Piece::Bishop)]
#[test_case(Piece::Knight)]
fn test_each_promotion_is_a_distinct_move(promotion: Piece) -> TestResult {
    let mut position = Position::from_fen("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1")?;
    let moves = MOVE_GEN.gen_legal_moves(&mut position);

    let want = Move::with_promotion(B7, B8, promotion);
    assert_eq!(moves.iter().filter(|&&mve| mve == want).count(), 1);
    assert!(!moves.contains(&Move::new(B7, B8)));
    Ok(())
}
