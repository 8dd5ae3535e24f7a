use std::fmt;
use std::sync::{Arc, OnceLock};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::debug;

use crate::bitboard::Square;
use crate::position::{CastlingRights, Piece, Pieces, Side, State};

/// Number of keys in an exported key list.
pub const NUM_ZOBRIST_KEYS: usize = 2 * 6 * 64 + 2 + 4 + 64;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ZobristError {
    #[error("key count: want {want} got {got}")]
    KeyCount { want: usize, got: usize },

    #[error("shared keys are already in use, they can only be installed before the first position is created")]
    SharedKeysInUse,
}

static SHARED_KEYS: OnceLock<Arc<ZobristKeys>> = OnceLock::new();

/// The random sub-keys XOR-ed together to form a position hash.
///
/// Exported key lists are ordered as:
/// 1. pieces, white then black, each in pawn, knight, bishop, rook, queen,
///    king order, each covering squares A1 through H8
/// 2. side to move, white then black
/// 3. castling rights: white king side, white queen side, black king side,
///    black queen side
/// 4. en passant target squares A1 through H8
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<u64>", try_from = "Vec<u64>")]
pub struct ZobristKeys {
    pieces: [[[u64; 64]; 6]; 2],
    side_to_move: [u64; 2],
    castling_rights: [u64; 4],
    en_passant: [u64; 64],
}

impl ZobristKeys {
    /// The process-wide keys, generated from OS entropy on first use unless
    /// others were installed first.
    pub fn shared() -> Arc<ZobristKeys> {
        Arc::clone(SHARED_KEYS.get_or_init(|| {
            Arc::new(ZobristKeys::from_rng(&mut ChaCha8Rng::from_entropy()))
        }))
    }

    /// Makes `keys` the process-wide keys. Fails, leaving the current keys in
    /// place, once any position has been built from the shared keys.
    pub fn install_shared(keys: ZobristKeys) -> Result<(), ZobristError> {
        SHARED_KEYS
            .set(Arc::new(keys))
            .map_err(|_| ZobristError::SharedKeysInUse)?;
        debug!("installed shared zobrist keys");
        Ok(())
    }

    pub fn from_seed(seed: u64) -> ZobristKeys {
        ZobristKeys::from_rng(&mut ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_rng(rng: &mut impl Rng) -> ZobristKeys {
        let mut pieces = [[[0; 64]; 6]; 2];
        for side_keys in pieces.iter_mut() {
            for piece_keys in side_keys.iter_mut() {
                rng.fill(&mut piece_keys[..]);
            }
        }
        let mut en_passant = [0; 64];
        rng.fill(&mut en_passant[..]);

        ZobristKeys {
            pieces,
            side_to_move: rng.gen(),
            castling_rights: rng.gen(),
            en_passant,
        }
    }

    pub fn export(&self) -> Vec<u64> {
        let mut keys = Vec::with_capacity(NUM_ZOBRIST_KEYS);
        for side_keys in &self.pieces {
            for piece_keys in side_keys {
                keys.extend_from_slice(piece_keys);
            }
        }
        keys.extend_from_slice(&self.side_to_move);
        keys.extend_from_slice(&self.castling_rights);
        keys.extend_from_slice(&self.en_passant);
        keys
    }

    /// Rebuilds keys from a list produced by [`ZobristKeys::export`].
    pub fn import(keys: &[u64]) -> Result<ZobristKeys, ZobristError> {
        if keys.len() != NUM_ZOBRIST_KEYS {
            return Err(ZobristError::KeyCount {
                want: NUM_ZOBRIST_KEYS,
                got: keys.len(),
            });
        }

        let mut chunks = keys.chunks_exact(64);
        let mut pieces = [[[0; 64]; 6]; 2];
        for side_keys in pieces.iter_mut() {
            for piece_keys in side_keys.iter_mut() {
                if let Some(chunk) = chunks.next() {
                    piece_keys.copy_from_slice(chunk);
                }
            }
        }

        let rest = &keys[2 * 6 * 64..];
        let mut side_to_move = [0; 2];
        side_to_move.copy_from_slice(&rest[..2]);
        let mut castling_rights = [0; 4];
        castling_rights.copy_from_slice(&rest[2..6]);
        let mut en_passant = [0; 64];
        en_passant.copy_from_slice(&rest[6..]);

        debug!(num_keys = keys.len(), "imported zobrist keys");
        Ok(ZobristKeys {
            pieces,
            side_to_move,
            castling_rights,
            en_passant,
        })
    }

    fn piece(&self, square: Square, piece: Piece, side: Side) -> u64 {
        self.pieces[side as usize][piece as usize][square as usize]
    }
}

impl From<ZobristKeys> for Vec<u64> {
    fn from(keys: ZobristKeys) -> Self {
        keys.export()
    }
}

impl TryFrom<Vec<u64>> for ZobristKeys {
    type Error = ZobristError;

    fn try_from(keys: Vec<u64>) -> Result<Self, Self::Error> {
        ZobristKeys::import(&keys)
    }
}

impl fmt::Debug for ZobristKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZobristKeys({:#018x}..)", self.pieces[0][0][0])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct ZobristHash(u64);

impl fmt::Display for ZobristHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl ZobristHash {
    pub(crate) fn calculate(keys: &ZobristKeys, pieces: &Pieces, state: &State) -> ZobristHash {
        let mut hash = ZobristHash(0);
        for side in Side::iter() {
            for piece in Piece::iter() {
                for square in pieces.get(piece).get(side).squares() {
                    hash.toggle_piece(keys, square, piece, side);
                }
            }
        }

        hash.0 ^= keys.side_to_move[state.to_move as usize];
        hash.toggle_castling_rights(keys, CastlingRights::none(), state.castling_rights);
        if let Some(en_passant_target) = state.en_passant_target {
            hash.toggle_en_passant(keys, en_passant_target);
        }
        hash
    }

    pub(crate) fn to_val(self) -> u64 {
        self.0
    }

    pub(crate) fn toggle_piece(&mut self, keys: &ZobristKeys, square: Square, piece: Piece, side: Side) {
        self.0 ^= keys.piece(square, piece, side);
    }

    pub(crate) fn flip_side_to_move(&mut self, keys: &ZobristKeys) {
        self.0 ^= keys.side_to_move[0] ^ keys.side_to_move[1];
    }

    /// Toggles the key of every right that differs between `prev` and `curr`.
    pub(crate) fn toggle_castling_rights(
        &mut self,
        keys: &ZobristKeys,
        prev: CastlingRights,
        curr: CastlingRights,
    ) {
        let changed = prev.to_array().into_iter().zip(curr.to_array());
        for (idx, (was, is)) in changed.enumerate() {
            if was != is {
                self.0 ^= keys.castling_rights[idx];
            }
        }
    }

    pub(crate) fn toggle_en_passant(&mut self, keys: &ZobristKeys, en_passant_target: Square) {
        self.0 ^= keys.en_passant[en_passant_target as usize];
    }
}
