use strum::IntoEnumIterator;

use crate::bitboard::Square::*;
use crate::bitboard::{BitBoard, Direction, Square, RANK_1, RANK_8};
use crate::position::{Move, Piece, Position, Side};

use super::attacks::attacked;
use super::leaping_pieces::{king_attacks, knight_attacks, pawn_attacks};
use super::magic_bitboard::{bishop_attacks, queen_attacks, rook_attacks};
use super::MoveList;

const PROMOTION_PIECES: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

/// Generates moves for the side to move without checking whether they leave
/// its king attacked. Castling is only generated when the king is not in
/// check and does not pass over an attacked square; its landing square is
/// left to the legality check. Order is fixed: pawns, then knights through
/// king, each by ascending square.
pub(super) fn gen_pseudo_legal_moves(position: &Position, captures_only: bool) -> MoveList {
    let mut moves = MoveList::new();

    let side = position.state.to_move;
    let own = position.side_bitboard(side);
    let enemies = position.side_bitboard(side.opposite_side());
    let occupancy = own | enemies;
    let targets = if captures_only { enemies } else { !own };

    gen_pawn_moves(position, side, occupancy, captures_only, &mut moves);

    for piece in [
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ] {
        for src in position.piece_bitboard(piece, side).squares() {
            let atks = match piece {
                Piece::Knight => knight_attacks(src),
                Piece::Bishop => bishop_attacks(src, occupancy),
                Piece::Rook => rook_attacks(src, occupancy),
                Piece::Queen => queen_attacks(src, occupancy),
                Piece::King => king_attacks(src),
                Piece::Pawn => unreachable!("pawns are generated separately"),
            };
            for dest in (atks & targets).squares() {
                moves.push(Move {
                    captured: captured_at(position, dest, side),
                    ..Move::new(src, dest)
                });
            }
        }
    }

    if !captures_only {
        gen_castling_moves(position, side, occupancy, &mut moves);
    }

    moves
}

fn captured_at(position: &Position, dest: Square, side: Side) -> Option<Piece> {
    let opp_side = side.opposite_side();
    if !position.side_bitboard(opp_side).is_square_set(dest) {
        return None;
    }
    Piece::iter().find(|&piece| position.piece_bitboard(piece, opp_side).is_square_set(dest))
}

fn push_pawn_move(src: Square, dest: Square, captured: Option<Piece>, moves: &mut MoveList) {
    if (RANK_1 | RANK_8).is_square_set(dest) {
        for promotion in PROMOTION_PIECES {
            moves.push(Move {
                src,
                dest,
                captured,
                promotion: Some(promotion),
            });
        }
    } else {
        moves.push(Move {
            captured,
            ..Move::new(src, dest)
        });
    }
}

fn gen_pawn_moves(
    position: &Position,
    side: Side,
    occupancy: BitBoard,
    captures_only: bool,
    moves: &mut MoveList,
) {
    let (push_dir, double_push_rank) = match side {
        Side::White => (Direction::IncRank, 1),
        Side::Black => (Direction::DecRank, 6),
    };
    let enemies = position.side_bitboard(side.opposite_side());
    let en_passant_target = position.state.en_passant_target;

    for src in position.piece_bitboard(Piece::Pawn, side).squares() {
        let atks = pawn_attacks(src, side);
        for dest in (atks & enemies).squares() {
            push_pawn_move(src, dest, captured_at(position, dest, side), moves);
        }
        if let Some(ep) = en_passant_target.filter(|&ep| atks.is_square_set(ep)) {
            moves.push(Move::capture(src, ep, Piece::Pawn));
        }

        let single = BitBoard::from_square(src).shift(push_dir) & !occupancy;
        if single.is_empty() {
            continue;
        }
        let dest = single.get_lsb();
        if (RANK_1 | RANK_8).is_square_set(dest) {
            // Quiescence still wants promotions
            push_pawn_move(src, dest, None, moves);
        } else if !captures_only {
            moves.push(Move::new(src, dest));
            let double = single.shift(push_dir) & !occupancy;
            if src.rank() == double_push_rank && !double.is_empty() {
                moves.push(Move::new(src, double.get_lsb()));
            }
        }
    }
}

struct CastlingPath {
    king_dest: Square,
    rook_src: Square,
    must_be_empty: BitBoard,
    king_passes: Square,
}

fn gen_castling_moves(position: &Position, side: Side, occupancy: BitBoard, moves: &mut MoveList) {
    let rights = position.state.castling_rights;
    let (king_src, king_side, queen_side) = match side {
        Side::White => (
            E1,
            CastlingPath {
                king_dest: G1,
                rook_src: H1,
                must_be_empty: BitBoard::from_val(0x60),
                king_passes: F1,
            },
            CastlingPath {
                king_dest: C1,
                rook_src: A1,
                must_be_empty: BitBoard::from_val(0x0E),
                king_passes: D1,
            },
        ),
        Side::Black => (
            E8,
            CastlingPath {
                king_dest: G8,
                rook_src: H8,
                must_be_empty: BitBoard::from_val(0x60 << 56),
                king_passes: F8,
            },
            CastlingPath {
                king_dest: C8,
                rook_src: A8,
                must_be_empty: BitBoard::from_val(0x0E << 56),
                king_passes: D8,
            },
        ),
    };

    if !position.piece_bitboard(Piece::King, side).is_square_set(king_src) {
        return;
    }
    let opp_side = side.opposite_side();
    let rooks = position.piece_bitboard(Piece::Rook, side);
    let mut king_safe = None;

    for (allowed, path) in [
        (rights.king_side(side), king_side),
        (rights.queen_side(side), queen_side),
    ] {
        if !allowed
            || !rooks.is_square_set(path.rook_src)
            || !(occupancy & path.must_be_empty).is_empty()
        {
            continue;
        }
        let safe = *king_safe.get_or_insert_with(|| !attacked(position, king_src, opp_side));
        if safe && !attacked(position, path.king_passes, opp_side) {
            moves.push(Move::new(king_src, path.king_dest));
        }
    }
}
