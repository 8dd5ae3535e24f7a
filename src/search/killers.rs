use crate::position::Move;

use super::MAX_SEARCH_PLY;

/// Two quiet moves per ply that last caused a beta cutoff there.
#[derive(Debug, Clone)]
pub(crate) struct KillerMoves {
    killers: Vec<[Option<Move>; 2]>,
}

impl KillerMoves {
    pub(crate) fn new() -> Self {
        Self {
            killers: vec![[None; 2]; MAX_SEARCH_PLY as usize + 1],
        }
    }

    pub(crate) fn get(&self, ply: u8) -> [Option<Move>; 2] {
        self.killers
            .get(ply as usize)
            .copied()
            .unwrap_or([None; 2])
    }

    /// Makes `mve` the first killer at `ply`, moving the previous first
    /// killer to the second slot unless it is the same move.
    pub(crate) fn add(&mut self, ply: u8, mve: Move) {
        let Some(slots) = self.killers.get_mut(ply as usize) else {
            return;
        };
        if slots[0] != Some(mve) {
            slots[1] = slots[0];
            slots[0] = Some(mve);
        }
    }
}
