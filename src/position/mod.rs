use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::bitboard::Square::*;
use crate::bitboard::{BitBoard, Square, LIGHT_SQUARES};
use crate::move_gen::{attacks, GenerateMoves, MoveList, MOVE_GEN};

mod fen;
pub mod zobrist_hash;

pub use fen::{FenParseError, START_FEN};
use zobrist_hash::{ZobristHash, ZobristKeys};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PositionError {
    #[error("char -> piece: got {0}")]
    FromCharPiece(char),

    #[error("no piece at {0}")]
    MoveNoPiece(Square),

    #[error("{side} is not to move, for move: {mve}")]
    MoveNotToMove { side: Side, mve: Move },

    #[error("move is not legal in this position: {0}")]
    IllegalMove(Move),

    #[error("can't unmake move because there is no move to unmake")]
    CantUnmakeMove,

    #[error("last move made was a null move, it must be unmade with unmake_null_move")]
    NullMoveOnTop,

    #[error("can't change zobrist keys once moves have been made")]
    HistoryNotEmpty,
}

#[derive(Debug, PartialEq, Eq, EnumIter, Clone, Copy, Display, Hash, Deserialize, Serialize)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposite_side(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

#[derive(Debug, PartialEq, Eq, EnumIter, Clone, Copy, Display, Hash, Deserialize, Serialize)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl From<Piece> for char {
    fn from(piece: Piece) -> char {
        match piece {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        }
    }
}

impl TryFrom<char> for Piece {
    type Error = PositionError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'p' => Ok(Piece::Pawn),
            'n' => Ok(Piece::Knight),
            'b' => Ok(Piece::Bishop),
            'r' => Ok(Piece::Rook),
            'q' => Ok(Piece::Queen),
            'k' => Ok(Piece::King),
            _ => Err(PositionError::FromCharPiece(value)),
        }
    }
}

/// A move as produced by move generation. Captures carry the captured piece,
/// so two moves between the same squares compare equal only if they also
/// agree on what is captured and promoted to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Move {
    pub src: Square,
    pub dest: Square,
    pub captured: Option<Piece>,
    pub promotion: Option<Piece>,
}

impl Move {
    pub fn new(src: Square, dest: Square) -> Move {
        Self {
            src,
            dest,
            captured: None,
            promotion: None,
        }
    }

    pub fn capture(src: Square, dest: Square, captured: Piece) -> Move {
        Self {
            captured: Some(captured),
            ..Move::new(src, dest)
        }
    }

    pub fn with_promotion(src: Square, dest: Square, promotion: Piece) -> Self {
        Self {
            promotion: Some(promotion),
            ..Move::new(src, dest)
        }
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    pub fn is_promotion(&self) -> bool {
        self.promotion.is_some()
    }

    /// Neither a capture nor a promotion.
    pub fn is_quiet(&self) -> bool {
        !self.is_capture() && !self.is_promotion()
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src, self.dest)?;
        if let Some(captured) = self.captured {
            write!(f, " x {}", captured)?;
        }
        if let Some(promotion) = self.promotion {
            write!(f, " ({})", promotion)?;
        }
        Ok(())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let src = self.src.to_string().to_ascii_lowercase();
        let dest = self.dest.to_string().to_ascii_lowercase();
        if let Some(promotion) = self.promotion {
            write!(f, "{}{}{}", src, dest, char::from(promotion))
        } else {
            write!(f, "{}{}", src, dest)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Sides {
    white: BitBoard,
    black: BitBoard,
}

impl Sides {
    fn new() -> Self {
        Self {
            white: BitBoard::empty(),
            black: BitBoard::empty(),
        }
    }

    pub(crate) fn get(&self, side: Side) -> BitBoard {
        match side {
            Side::White => self.white,
            Side::Black => self.black,
        }
    }

    fn get_mut(&mut self, side: Side) -> &mut BitBoard {
        match side {
            Side::White => &mut self.white,
            Side::Black => &mut self.black,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Pieces {
    pawns: Sides,
    knights: Sides,
    bishops: Sides,
    rooks: Sides,
    queens: Sides,
    kings: Sides,
}

impl Pieces {
    fn new() -> Self {
        Self {
            pawns: Sides::new(),
            knights: Sides::new(),
            bishops: Sides::new(),
            rooks: Sides::new(),
            queens: Sides::new(),
            kings: Sides::new(),
        }
    }

    pub(crate) fn get(&self, piece: Piece) -> &Sides {
        match piece {
            Piece::Pawn => &self.pawns,
            Piece::Knight => &self.knights,
            Piece::Bishop => &self.bishops,
            Piece::Rook => &self.rooks,
            Piece::Queen => &self.queens,
            Piece::King => &self.kings,
        }
    }

    fn get_mut(&mut self, piece: Piece) -> &mut Sides {
        match piece {
            Piece::Pawn => &mut self.pawns,
            Piece::Knight => &mut self.knights,
            Piece::Bishop => &mut self.bishops,
            Piece::Rook => &mut self.rooks,
            Piece::Queen => &mut self.queens,
            Piece::King => &mut self.kings,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Deserialize, Serialize)]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastlingRights {
    fn start() -> Self {
        Self::new(true, true, true, true)
    }

    pub(crate) fn none() -> Self {
        Self::new(false, false, false, false)
    }

    pub fn new(
        white_king_side: bool,
        white_queen_side: bool,
        black_king_side: bool,
        black_queen_side: bool,
    ) -> Self {
        Self {
            white_king_side,
            white_queen_side,
            black_king_side,
            black_queen_side,
        }
    }

    pub(crate) fn to_array(self) -> [bool; 4] {
        [
            self.white_king_side,
            self.white_queen_side,
            self.black_king_side,
            self.black_queen_side,
        ]
    }

    pub(crate) fn king_side(self, side: Side) -> bool {
        match side {
            Side::White => self.white_king_side,
            Side::Black => self.black_king_side,
        }
    }

    pub(crate) fn queen_side(self, side: Side) -> bool {
        match side {
            Side::White => self.white_queen_side,
            Side::Black => self.black_queen_side,
        }
    }

    /// Drops the rights tied to a king or rook home square once anything
    /// moves from or to it.
    fn touch_square(&mut self, square: Square) {
        match square {
            E1 => {
                self.white_king_side = false;
                self.white_queen_side = false;
            }
            H1 => self.white_king_side = false,
            A1 => self.white_queen_side = false,
            E8 => {
                self.black_king_side = false;
                self.black_queen_side = false;
            }
            H8 => self.black_king_side = false,
            A8 => self.black_queen_side = false,
            _ => (),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct State {
    pub to_move: Side,
    pub half_move_clock: u16,
    pub en_passant_target: Option<Square>,
    pub castling_rights: CastlingRights,
    pub full_move_counter: u16,
}

impl State {
    fn start() -> Self {
        Self {
            to_move: Side::White,
            half_move_clock: 0,
            en_passant_target: None,
            castling_rights: CastlingRights::start(),
            full_move_counter: 1,
        }
    }
}

/// Everything needed to take back one move. `mve` is `None` for a null move.
#[derive(Clone, Debug)]
struct Undo {
    mve: Option<Move>,
    state: State,
    zobrist_hash: ZobristHash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum GameStatus {
    InProgress,
    Checkmated,
    Stalemated,
    DrawByRepetition,
    DrawByFiftyMoveRule,
    DrawByInsufficientMaterial,
}

#[derive(Clone)]
pub struct Position {
    pub state: State,
    pub(crate) sides: Sides,
    pub(crate) pieces: Pieces,
    zobrist_hash: ZobristHash,
    zobrist_keys: Arc<ZobristKeys>,
    history: Vec<Undo>,
}

impl Position {
    pub fn start() -> Self {
        Self::start_with_keys(ZobristKeys::shared())
    }

    pub fn start_with_keys(zobrist_keys: Arc<ZobristKeys>) -> Self {
        let mut position = Self::empty(State::start(), zobrist_keys);
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, piece) in back_rank.into_iter().enumerate() {
            let file = file as u8;
            position.set_piece(Square::from_rank_file(0, file), piece, Side::White);
            position.set_piece(Square::from_rank_file(1, file), Piece::Pawn, Side::White);
            position.set_piece(Square::from_rank_file(6, file), Piece::Pawn, Side::Black);
            position.set_piece(Square::from_rank_file(7, file), piece, Side::Black);
        }
        position.zobrist_hash = position.calculate_hash();
        position
    }

    fn empty(state: State, zobrist_keys: Arc<ZobristKeys>) -> Self {
        Self {
            state,
            sides: Sides::new(),
            pieces: Pieces::new(),
            zobrist_hash: ZobristHash::default(),
            zobrist_keys,
            history: Vec::new(),
        }
    }

    pub fn is_piece_at(&self, square: Square) -> Option<(Piece, Side)> {
        let side = if self.sides.white.is_square_set(square) {
            Side::White
        } else if self.sides.black.is_square_set(square) {
            Side::Black
        } else {
            return None;
        };

        Piece::iter()
            .find(|&piece| self.pieces.get(piece).get(side).is_square_set(square))
            .map(|piece| (piece, side))
    }

    pub fn piece_bitboard(&self, piece: Piece, side: Side) -> BitBoard {
        self.pieces.get(piece).get(side)
    }

    pub fn side_bitboard(&self, side: Side) -> BitBoard {
        self.sides.get(side)
    }

    pub fn occupied(&self) -> BitBoard {
        self.sides.white | self.sides.black
    }

    pub fn king_square(&self, side: Side) -> Square {
        self.pieces.kings.get(side).get_lsb()
    }

    /// The incrementally maintained hash of this position.
    pub fn hash_key(&self) -> u64 {
        self.zobrist_hash.to_val()
    }

    /// Recomputes the hash from scratch.
    pub fn full_rehash(&self) -> u64 {
        self.calculate_hash().to_val()
    }

    fn calculate_hash(&self) -> ZobristHash {
        ZobristHash::calculate(&self.zobrist_keys, &self.pieces, &self.state)
    }

    pub fn zobrist_keys(&self) -> &Arc<ZobristKeys> {
        &self.zobrist_keys
    }

    /// Switches to other keys and rehashes. Only allowed before any move is
    /// made, since earlier hashes on the undo stack would no longer compare.
    pub fn set_zobrist_keys(&mut self, zobrist_keys: Arc<ZobristKeys>) -> Result<(), PositionError> {
        if !self.history.is_empty() {
            return Err(PositionError::HistoryNotEmpty);
        }
        self.zobrist_keys = zobrist_keys;
        self.zobrist_hash = self.calculate_hash();
        Ok(())
    }

    /// Number of moves, null moves included, that can be unmade.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn is_side_in_check(&self, side: Side) -> bool {
        attacks::attacked(self, self.king_square(side), side.opposite_side())
    }

    pub fn in_check(&self) -> bool {
        self.is_side_in_check(self.state.to_move)
    }

    pub fn has_non_pawn_material(&self, side: Side) -> bool {
        let pawns_and_king = self.pieces.pawns.get(side) | self.pieces.kings.get(side);
        self.sides.get(side) != pawns_and_king
    }

    pub fn legal_moves(&mut self) -> MoveList {
        MOVE_GEN.gen_legal_moves(self)
    }

    /// Looks up the legal move between two squares, for callers that only
    /// know the squares and promotion of a move.
    pub fn find_legal_move(
        &mut self,
        src: Square,
        dest: Square,
        promotion: Option<Piece>,
    ) -> Option<Move> {
        self.legal_moves()
            .into_iter()
            .find(|mve| mve.src == src && mve.dest == dest && mve.promotion == promotion)
    }

    /// Makes a move after checking that the piece on its source square
    /// belongs to the side to move. The move must still be pseudo-legal;
    /// use [`Position::make_legal_move`] for unchecked input.
    pub fn make_move(&mut self, mve: Move) -> Result<(), PositionError> {
        match self.is_piece_at(mve.src) {
            None => Err(PositionError::MoveNoPiece(mve.src)),
            Some((_, side)) if side != self.state.to_move => {
                Err(PositionError::MoveNotToMove { side, mve })
            }
            Some(_) => {
                self.apply_move(mve);
                Ok(())
            }
        }
    }

    pub fn make_legal_move(&mut self, mve: Move) -> Result<(), PositionError> {
        if !self.legal_moves().contains(&mve) {
            return Err(PositionError::IllegalMove(mve));
        }
        self.apply_move(mve);
        Ok(())
    }

    pub fn unmake_move(&mut self) -> Result<Move, PositionError> {
        match self.history.last() {
            None => Err(PositionError::CantUnmakeMove),
            Some(Undo { mve: None, .. }) => Err(PositionError::NullMoveOnTop),
            Some(Undo { mve: Some(mve), .. }) => {
                let mve = *mve;
                self.restore_last();
                Ok(mve)
            }
        }
    }

    /// Passes the turn. En passant is no longer possible afterwards.
    pub fn make_null_move(&mut self) {
        self.history.push(Undo {
            mve: None,
            state: self.state.clone(),
            zobrist_hash: self.zobrist_hash,
        });

        if let Some(en_passant_target) = self.state.en_passant_target.take() {
            self.zobrist_hash
                .toggle_en_passant(&self.zobrist_keys, en_passant_target);
        }
        self.state.to_move = self.state.to_move.opposite_side();
        self.zobrist_hash.flip_side_to_move(&self.zobrist_keys);
    }

    pub fn unmake_null_move(&mut self) -> Result<(), PositionError> {
        match self.history.last() {
            None => Err(PositionError::CantUnmakeMove),
            Some(Undo { mve: Some(mve), .. }) => Err(PositionError::IllegalMove(*mve)),
            Some(Undo { mve: None, .. }) => {
                self.restore_last();
                Ok(())
            }
        }
    }

    /// Makes `mve` and takes it back when the returned guard is dropped.
    pub(crate) fn play(&mut self, mve: Move) -> PlayedMove<'_> {
        self.apply_move(mve);
        PlayedMove { position: self }
    }

    pub(crate) fn play_null(&mut self) -> PlayedMove<'_> {
        self.make_null_move();
        PlayedMove { position: self }
    }

    /// Applies a pseudo-legal move for the side to move.
    pub(crate) fn apply_move(&mut self, mve: Move) {
        let Some((piece, side)) = self.is_piece_at(mve.src) else {
            unreachable!("no piece to move at {}, move {:?}\n{}", mve.src, mve, self)
        };
        debug_assert_eq!(side, self.state.to_move, "moving {:?} out of turn", mve);

        self.history.push(Undo {
            mve: Some(mve),
            state: self.state.clone(),
            zobrist_hash: self.zobrist_hash,
        });

        let prev_en_passant = self.state.en_passant_target.take();
        if let Some(en_passant_target) = prev_en_passant {
            self.zobrist_hash
                .toggle_en_passant(&self.zobrist_keys, en_passant_target);
        }

        if let Some(captured) = mve.captured {
            let capture_square = if piece == Piece::Pawn && Some(mve.dest) == prev_en_passant {
                en_passant_capture_square(mve.dest, side)
            } else {
                mve.dest
            };
            self.remove_piece(capture_square, captured, side.opposite_side());
        }

        self.remove_piece(mve.src, piece, side);
        self.add_piece(mve.dest, mve.promotion.unwrap_or(piece), side);

        if piece == Piece::King && mve.src.file().abs_diff(mve.dest.file()) == 2 {
            let (rook_src, rook_dest) = castle_rook_squares(mve.dest);
            self.remove_piece(rook_src, Piece::Rook, side);
            self.add_piece(rook_dest, Piece::Rook, side);
        }

        let prev_rights = self.state.castling_rights;
        self.state.castling_rights.touch_square(mve.src);
        self.state.castling_rights.touch_square(mve.dest);
        self.zobrist_hash.toggle_castling_rights(
            &self.zobrist_keys,
            prev_rights,
            self.state.castling_rights,
        );

        if piece == Piece::Pawn && mve.src.rank().abs_diff(mve.dest.rank()) == 2 {
            let en_passant_target = Square::from_u8((mve.src as u8 + mve.dest as u8) / 2);
            self.state.en_passant_target = Some(en_passant_target);
            self.zobrist_hash
                .toggle_en_passant(&self.zobrist_keys, en_passant_target);
        }

        if piece == Piece::Pawn || mve.is_capture() {
            self.state.half_move_clock = 0;
        } else {
            self.state.half_move_clock += 1;
        }
        if side == Side::Black {
            self.state.full_move_counter += 1;
        }

        self.state.to_move = side.opposite_side();
        self.zobrist_hash.flip_side_to_move(&self.zobrist_keys);
    }

    /// Takes back whatever is on top of the undo stack. The hash is restored
    /// from the stack rather than recomputed.
    fn restore_last(&mut self) {
        let Some(undo) = self.history.pop() else {
            return;
        };

        if let Some(mve) = undo.mve {
            let side = undo.state.to_move;
            let Some((moved, _)) = self.is_piece_at(mve.dest) else {
                unreachable!("nothing to take back at {}, move {:?}\n{}", mve.dest, mve, self)
            };
            let piece = if mve.is_promotion() { Piece::Pawn } else { moved };

            self.clear_piece(mve.dest, moved, side);
            self.set_piece(mve.src, piece, side);

            if piece == Piece::King && mve.src.file().abs_diff(mve.dest.file()) == 2 {
                let (rook_src, rook_dest) = castle_rook_squares(mve.dest);
                self.clear_piece(rook_dest, Piece::Rook, side);
                self.set_piece(rook_src, Piece::Rook, side);
            }

            if let Some(captured) = mve.captured {
                let capture_square =
                    if piece == Piece::Pawn && Some(mve.dest) == undo.state.en_passant_target {
                        en_passant_capture_square(mve.dest, side)
                    } else {
                        mve.dest
                    };
                self.set_piece(capture_square, captured, side.opposite_side());
            }
        }

        self.state = undo.state;
        self.zobrist_hash = undo.zobrist_hash;
    }

    fn set_piece(&mut self, square: Square, piece: Piece, side: Side) {
        self.sides.get_mut(side).set_square(square);
        self.pieces.get_mut(piece).get_mut(side).set_square(square);
    }

    fn clear_piece(&mut self, square: Square, piece: Piece, side: Side) {
        self.sides.get_mut(side).clear_square(square);
        self.pieces.get_mut(piece).get_mut(side).clear_square(square);
    }

    fn add_piece(&mut self, square: Square, piece: Piece, side: Side) {
        self.set_piece(square, piece, side);
        self.zobrist_hash
            .toggle_piece(&self.zobrist_keys, square, piece, side);
    }

    fn remove_piece(&mut self, square: Square, piece: Piece, side: Side) {
        self.clear_piece(square, piece, side);
        self.zobrist_hash
            .toggle_piece(&self.zobrist_keys, square, piece, side);
    }

    /// True if the current position already occurred twice before. Only
    /// positions since the last capture, pawn move or null move can match.
    pub fn is_draw_by_repetition(&self) -> bool {
        let reversible = self.state.half_move_clock as usize;
        let mut repetitions = 0;
        for undo in self.history.iter().rev().take(reversible) {
            if undo.mve.is_none() {
                break;
            }
            if undo.zobrist_hash == self.zobrist_hash {
                repetitions += 1;
                if repetitions >= 2 {
                    return true;
                }
            }
        }
        false
    }

    pub fn is_draw_by_fifty_move_rule(&self) -> bool {
        self.state.half_move_clock >= 100
    }

    pub fn is_draw(&self) -> bool {
        self.is_draw_by_repetition() || self.is_draw_by_fifty_move_rule()
    }

    /// No pawns or heavy pieces, and the minors left can't force mate: at
    /// most one knight with no bishops, or bishops all on one square color.
    pub fn has_insufficient_material(&self) -> bool {
        let heavy_or_pawns = Side::iter().any(|side| {
            !(self.pieces.pawns.get(side) | self.pieces.rooks.get(side) | self.pieces.queens.get(side))
                .is_empty()
        });
        if heavy_or_pawns {
            return false;
        }

        let knights = self.pieces.knights.get(Side::White) | self.pieces.knights.get(Side::Black);
        let bishops = self.pieces.bishops.get(Side::White) | self.pieces.bishops.get(Side::Black);
        let light_bishops = !(bishops & LIGHT_SQUARES).is_empty();
        let dark_bishops = !(bishops & !LIGHT_SQUARES).is_empty();

        match knights.num_squares_set() {
            0 => !(light_bishops && dark_bishops),
            1 => bishops.is_empty(),
            _ => false,
        }
    }

    pub fn game_status(&mut self) -> GameStatus {
        if self.legal_moves().is_empty() {
            if self.in_check() {
                GameStatus::Checkmated
            } else {
                GameStatus::Stalemated
            }
        } else if self.has_insufficient_material() {
            GameStatus::DrawByInsufficientMaterial
        } else if self.is_draw_by_repetition() {
            GameStatus::DrawByRepetition
        } else if self.is_draw_by_fifty_move_rule() {
            GameStatus::DrawByFiftyMoveRule
        } else {
            GameStatus::InProgress
        }
    }
}

fn en_passant_capture_square(en_passant_target: Square, capturer: Side) -> Square {
    match capturer {
        Side::White => Square::from_u8(en_passant_target as u8 - 8),
        Side::Black => Square::from_u8(en_passant_target as u8 + 8),
    }
}

fn castle_rook_squares(king_dest: Square) -> (Square, Square) {
    match king_dest {
        G1 => (H1, F1),
        C1 => (A1, D1),
        G8 => (H8, F8),
        C8 => (A8, D8),
        _ => unreachable!("castling king can't land on {}", king_dest),
    }
}

/// A move made through [`Position::play`], unmade again when dropped.
pub(crate) struct PlayedMove<'a> {
    position: &'a mut Position,
}

impl Deref for PlayedMove<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        self.position
    }
}

impl DerefMut for PlayedMove<'_> {
    fn deref_mut(&mut self) -> &mut Position {
        self.position
    }
}

impl Drop for PlayedMove<'_> {
    fn drop(&mut self) {
        self.position.restore_last();
    }
}

// Keys and undo history are bookkeeping, two positions are equal if the
// board, state and hash agree
impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
            && self.sides == other.sides
            && self.pieces == other.pieces
            && self.zobrist_hash == other.zobrist_hash
    }
}

impl Eq for Position {}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut board_str = String::with_capacity(64 + 7);
        Square::list_white_perspective()
            .into_iter()
            .enumerate()
            .for_each(|(idx, square)| {
                let ch = match self.is_piece_at(square) {
                    Some((p, Side::White)) => char::from(p).to_ascii_uppercase(),
                    Some((p, Side::Black)) => char::from(p),
                    None => '.',
                };

                board_str.push(ch);
                if (idx + 1) % 8 == 0 && idx != 63 {
                    board_str.push('\n');
                }
            });
        write!(f, "{}", board_str)
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self, self.to_fen())
    }
}
