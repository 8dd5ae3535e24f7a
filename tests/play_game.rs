use chess_search::bitboard::Square::{self, *};
use chess_search::position::{GameStatus, Piece, Position};

use test_case::test_case;
use testresult::TestResult;

type Played = (Square, Square, Option<Piece>);

#[test_case(vec![
    (D2, D4, None),
    (D7, D5, None),
    (C2, C4, None),
    (D5, C4, None),
    (E2, E3, None),
    (B7, B5, None),
    (A2, A4, None),
    (C7, C6, None),
    (A4, B5, None),
    (C6, B5, None),
    (D1, F3, None),
    (B8, C6, None),
    (F3, C6, None),
    (C8, D7, None),
], "r2qkbnr/p2bpppp/2Q5/1p6/2pP4/4P3/1P3PPP/RNB1KBNR w KQkq - 1 8" ; "normal")]
#[test_case(vec![
    (E2, E4, None),
    (E7, E5, None),
    (G1, F3, None),
    (B8, C6, None),
    (F1, B5, None),
    (A7, A6, None),
    (B5, A4, None),
    (F8, E7, None),
    (E1, G1, None),
], "r1bqk1nr/1pppbppp/p1n5/4p3/B3P3/5N2/PPPP1PPP/RNBQ1RK1 b kq - 3 5" ; "castling")]
#[test_case(vec![
    (D2, D4, None),
    (E7, E5, None),
    (D4, D5, None),
    (E5, E4, None),
    (D5, D6, None),
    (E4, E3, None),
    (D6, C7, None),
    (E3, F2, None),
    (E1, F2, None),
    (D7, D5, None),
    (C7, D8, Some(Piece::Queen)),
], "rnbQkbnr/pp3ppp/8/3p4/8/8/PPP1PKPP/RNBQ1BNR b kq - 0 6" ; "promotion")]
#[test_case(vec![
    (E2, E4, None),
    (A7, A6, None),
    (E4, E5, None),
    (D7, D5, None),
    (E5, D6, None),
], "rnbqkbnr/1pp1pppp/p2P4/8/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 3" ; "en passant")]
fn test_play_game(moves: Vec<Played>, want_fen: &str) -> TestResult {
    let mut position = Position::start();
    let start = position.clone();

    for &(src, dest, promotion) in &moves {
        let mve = position
            .find_legal_move(src, dest, promotion)
            .unwrap_or_else(|| panic!("{}{} is not legal in {}", src, dest, position.to_fen()));
        position.make_legal_move(mve)?;
        assert_eq!(position.hash_key(), position.full_rehash());
    }

    assert_eq!(position, Position::from_fen(want_fen)?);
    assert_eq!(position.to_fen(), want_fen);

    for _ in &moves {
        position.unmake_move()?;
    }
    assert_eq!(position, start);
    assert!(position.unmake_move().is_err());
    Ok(())
}

#[test_case("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2", &[(D8, H4)], GameStatus::Checkmated ; "fools mate")]
#[test_case("7k/8/8/8/8/8/8/R6K w - - 0 1", &[(A1, A8)], GameStatus::InProgress ; "check")]
#[test_case("7k/8/4Q1K1/8/8/8/8/8 w - - 0 1", &[(E6, F7)], GameStatus::Stalemated ; "stalemate")]
#[test_case("k7/8/6K1/8/8/8/6q1/8 w - - 0 1", &[(G6, H7), (G2, G7), (H7, G7)], GameStatus::DrawByInsufficientMaterial ; "bare kings")]
#[test_case("7k/8/8/8/8/8/8/R6K w - - 0 1", &[(A1, A2), (H8, G8), (A2, A1), (G8, H8), (A1, A2), (H8, G8), (A2, A1), (G8, H8)], GameStatus::DrawByRepetition ; "repetition")]
#[test_case("7k/8/8/8/8/8/8/R6K w - - 99 80", &[(A1, A2)], GameStatus::DrawByFiftyMoveRule ; "fifty moves")]
fn test_game_status(fen: &str, moves: &[(Square, Square)], want: GameStatus) -> TestResult {
    let mut position = Position::from_fen(fen)?;
    for &(src, dest) in moves {
        let mve = position
            .find_legal_move(src, dest, None)
            .unwrap_or_else(|| panic!("{}{} is not legal in {}", src, dest, position.to_fen()));
        position.make_legal_move(mve)?;
    }

    assert_eq!(position.game_status(), want);
    Ok(())
}
