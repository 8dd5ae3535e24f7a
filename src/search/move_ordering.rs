use arrayvec::ArrayVec;

use crate::move_gen::{MoveList, MAX_MOVES};
use crate::position::{Move, Piece, Position};

const PV_MOVE_SCORE: i32 = i32::MAX;
const HASH_MOVE_SCORE: i32 = i32::MAX - 1;
const CAPTURE_SCORE: i32 = 1_000_000;
const KILLER_SCORES: [i32; 2] = [900_001, 900_000];
const QUIET_SCORE: i32 = 0;

/// Hands out moves best guess first without sorting the whole list up
/// front. Each call picks the highest scored move left; equal scores keep
/// generation order.
///
/// Priority: PV move, hash move, captures and promotions by MVV/LVA,
/// killers, then the remaining quiet moves.
pub(crate) struct MoveOrderer {
    moves: MoveList,
    scores: ArrayVec<i32, MAX_MOVES>,
    next: usize,
}

impl MoveOrderer {
    pub(crate) fn new(
        position: &Position,
        moves: MoveList,
        pv_move: Option<Move>,
        hash_move: Option<Move>,
        killers: [Option<Move>; 2],
    ) -> Self {
        let scores = moves
            .iter()
            .map(|&mve| {
                if Some(mve) == pv_move {
                    PV_MOVE_SCORE
                } else if Some(mve) == hash_move {
                    HASH_MOVE_SCORE
                } else if !mve.is_quiet() {
                    CAPTURE_SCORE + mvv_lva(position, mve)
                } else if let Some(slot) = killers.iter().position(|&k| k == Some(mve)) {
                    KILLER_SCORES[slot]
                } else {
                    QUIET_SCORE
                }
            })
            .collect();

        Self {
            moves,
            scores,
            next: 0,
        }
    }
}

impl Iterator for MoveOrderer {
    type Item = Move;

    fn next(&mut self) -> Option<Move> {
        let remaining = self.scores.get(self.next..)?;
        let (best_offset, _) = remaining
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, i32)>, (idx, &score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((idx, score)),
            })?;

        // Rotate rather than swap so the moves passed over stay in order
        let best_idx = self.next + best_offset;
        self.moves[self.next..=best_idx].rotate_right(1);
        self.scores[self.next..=best_idx].rotate_right(1);

        let mve = self.moves[self.next];
        self.next += 1;
        Some(mve)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.moves.len() - self.next;
        (remaining, Some(remaining))
    }
}

/// Most valuable victim, least valuable attacker. Promotions rank by the
/// piece promoted to on top of whatever they capture.
pub(crate) fn mvv_lva(position: &Position, mve: Move) -> i32 {
    let attacker = position
        .is_piece_at(mve.src)
        .map_or(Piece::Pawn, |(piece, _)| piece);
    let capture = mve
        .captured
        .map_or(0, |victim| victim as i32 * 10 + (5 - attacker as i32));
    let promotion = mve.promotion.map_or(0, |piece| piece as i32 * 100);
    capture + promotion
}
