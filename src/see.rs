use std::cmp;

use arrayvec::ArrayVec;

use crate::bitboard::{BitBoard, Square};
use crate::evaluation::piece_value;
use crate::move_gen::attacks::attackers;
use crate::move_gen::masks::{ray_attacks, Ray};
use crate::position::{Move, Piece, Position, Side};

/// Added to a promoting move's score, on top of the promoted piece's rank.
pub const PROMOTION_BONUS: i32 = 10_000;

/// Static exchange evaluation of `mve`, which must already have been made
/// on `position`. Plays out the captures on the destination square, least
/// valuable attacker first, and lets either side stop recapturing when it
/// would lose material. Negative scores lose material for the mover.
pub fn see(position: &Position, mve: Move) -> i32 {
    let mut score = 0;
    if let Some(promotion) = mve.promotion {
        score = PROMOTION_BONUS + promotion as i32 + 1;
    }
    if let Some(captured) = mve.captured {
        score += score_capture(position, mve, captured);
    }
    score
}

fn score_capture(position: &Position, mve: Move, captured: Piece) -> i32 {
    let target = mve.dest;
    let Some((mut current_piece, _)) = position.is_piece_at(target) else {
        return piece_value(captured);
    };

    let pieces = |piece| {
        position.piece_bitboard(piece, Side::White) | position.piece_bitboard(piece, Side::Black)
    };
    let diagonal_sliders = pieces(Piece::Bishop) | pieces(Piece::Queen);
    let straight_sliders = pieces(Piece::Rook) | pieces(Piece::Queen);
    let occupancy = position.occupied();

    let mut white_attackers = attackers(position, target, Side::White);
    let mut black_attackers = attackers(position, target, Side::Black);

    let mut scores: ArrayVec<i32, 32> = ArrayVec::new();
    scores.push(piece_value(captured));
    let mut side = position.state.to_move;
    let mut current_square = mve.src;
    let mut attacked_value = piece_value(current_piece);

    loop {
        // Sliders lined up behind the last capturer join in
        if !matches!(current_piece, Piece::Knight | Piece::King) {
            if let Some(dir) = Ray::between(target, current_square) {
                let sliders = if dir.is_diagonal() {
                    diagonal_sliders
                } else {
                    straight_sliders
                };
                let xrays = ray_attacks(dir, current_square, occupancy) & sliders;
                if !(xrays & position.side_bitboard(Side::White)).is_empty() {
                    white_attackers |= xrays;
                } else if !(xrays & position.side_bitboard(Side::Black)).is_empty() {
                    black_attackers |= xrays;
                }
            }
        }

        let side_attackers = match side {
            Side::White => &mut white_attackers,
            Side::Black => &mut black_attackers,
        };
        let Some((square, piece)) = least_valuable(position, *side_attackers) else {
            break;
        };
        if scores.is_full() {
            break;
        }
        side_attackers.clear_square(square);
        current_square = square;
        current_piece = piece;

        let prev = scores[scores.len() - 1];
        scores.push(attacked_value - prev);
        attacked_value = piece_value(current_piece);
        side = side.opposite_side();
    }

    // Either side may stop capturing, so resolve from the last capture back
    scores
        .into_iter()
        .rev()
        .reduce(|later, prev| -cmp::max(-prev, later))
        .unwrap_or_default()
}

/// The lowest valued piece among `attackers`. Ties go to the lowest square.
fn least_valuable(position: &Position, attackers: BitBoard) -> Option<(Square, Piece)> {
    let mut least: Option<(Square, Piece)> = None;
    for square in attackers.squares() {
        let Some((piece, _)) = position.is_piece_at(square) else {
            continue;
        };
        match least {
            Some((_, least_piece)) if piece_value(least_piece) <= piece_value(piece) => (),
            _ => least = Some((square, piece)),
        }
    }
    least
}
