use std::str::FromStr;
use std::sync::Arc;

use crate::bitboard::Square;
use crate::position::zobrist_hash::ZobristKeys;
use crate::position::{en_passant_capture_square, CastlingRights, Piece, Position, Side, State};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FenParseError {
    #[error("num fields: want 6 got {0}")]
    NumFields(usize),

    #[error("piece placement: got {0}, err at {1}")]
    PiecePlacement(String, usize),

    #[error("kings: want exactly one per side, got {white} white and {black} black")]
    KingCount { white: u32, black: u32 },

    #[error("side to move: want 'w'|'b' got {0}")]
    SideToMove(String),

    #[error("castling rights given: got {0}, err at idx {1}")]
    CastlingRights(String, usize),

    #[error("en passant target: got {0}")]
    EnPassantTarget(String),

    #[error("en passant target: {target} can't be captured with {to_move} to move")]
    EnPassantRank { target: Square, to_move: Side },

    #[error("en passant target: no pawn to capture past {0}")]
    EnPassantPawn(Square),

    #[error("side not to move is in check: {0}")]
    OpponentInCheck(Side),

    #[error("halfmove clock: got {0}")]
    HalfmoveClock(String),

    #[error("full move counter: want 1 <= x <= 65_535 got {0}")]
    FullMoveCounter(String),
}

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Position {
    pub fn from_fen(fen: &str) -> Result<Self, FenParseError> {
        Self::from_fen_with_keys(fen, ZobristKeys::shared())
    }

    pub fn from_fen_with_keys(fen: &str, zobrist_keys: Arc<ZobristKeys>) -> Result<Self, FenParseError> {
        let fields = fen.split_whitespace().collect::<Vec<&str>>();

        if fields.len() != 6 {
            Err(FenParseError::NumFields(fields.len()))?
        }

        let to_move = match fields[1] {
            "w" => Side::White,
            "b" => Side::Black,
            _ => Err(FenParseError::SideToMove(String::from(fields[1])))?,
        };

        let half_move_clock = fields[4]
            .parse::<u16>()
            .map_err(|_| FenParseError::HalfmoveClock(fields[4].to_string()))?;

        let full_move_counter = fields[5]
            .parse::<u16>()
            .ok()
            .filter(|&counter| counter >= 1)
            .ok_or_else(|| FenParseError::FullMoveCounter(fields[5].to_string()))?;

        let state = State {
            castling_rights: castling_rights_from_fen(fields[2])?,
            en_passant_target: en_passant_target_from_fen(fields[3])?,
            half_move_clock,
            to_move,
            full_move_counter,
        };

        let mut position = Position::empty(state, zobrist_keys);
        for (square, piece, side) in pieces_from_fen(fields[0])? {
            position.set_piece(square, piece, side);
        }

        let white = position.piece_bitboard(Piece::King, Side::White).num_squares_set();
        let black = position.piece_bitboard(Piece::King, Side::Black).num_squares_set();
        if white != 1 || black != 1 {
            Err(FenParseError::KingCount { white, black })?
        }

        if let Some(target) = position.state.en_passant_target {
            let capture_rank = match to_move {
                Side::White => 5,
                Side::Black => 2,
            };
            if target.rank() != capture_rank {
                Err(FenParseError::EnPassantRank { target, to_move })?
            }
            let pushed = en_passant_capture_square(target, to_move);
            if position.is_piece_at(pushed) != Some((Piece::Pawn, to_move.opposite_side())) {
                Err(FenParseError::EnPassantPawn(target))?
            }
        }

        if position.is_side_in_check(to_move.opposite_side()) {
            Err(FenParseError::OpponentInCheck(to_move.opposite_side()))?
        }

        position.zobrist_hash = position.calculate_hash();
        Ok(position)
    }

    pub fn to_fen(&self) -> String {
        let mut pieces = String::with_capacity(64);
        let mut curr_empty_count = 0;

        for (idx, sq) in Square::list_white_perspective().into_iter().enumerate() {
            if let Some((piece, side)) = self.is_piece_at(sq) {
                if curr_empty_count != 0 {
                    pieces += &curr_empty_count.to_string();
                    curr_empty_count = 0;
                }
                let piece_char = match side {
                    Side::White => char::from(piece).to_ascii_uppercase(),
                    Side::Black => char::from(piece),
                };
                pieces.push(piece_char);
            } else {
                curr_empty_count += 1;
            }
            if (idx + 1) % 8 == 0 {
                if curr_empty_count != 0 {
                    pieces += &curr_empty_count.to_string();
                    curr_empty_count = 0;
                }
                if idx != 63 {
                    pieces += "/";
                }
            }
        }

        let side_to_move_char = match self.state.to_move {
            Side::White => 'w',
            Side::Black => 'b',
        };

        let mut castling_rights = String::with_capacity(4);
        let rights = self.state.castling_rights;
        for (present, ch) in rights.to_array().into_iter().zip(['K', 'Q', 'k', 'q']) {
            if present {
                castling_rights.push(ch);
            }
        }
        if castling_rights.is_empty() {
            castling_rights += "-";
        }

        let en_passant = if let Some(ep_target) = self.state.en_passant_target {
            ep_target.to_string().to_ascii_lowercase()
        } else {
            "-".to_string()
        };

        format!(
            "{} {} {} {} {} {}",
            pieces,
            side_to_move_char,
            castling_rights,
            en_passant,
            self.state.half_move_clock,
            self.state.full_move_counter
        )
    }
}

fn castling_rights_from_fen(castling_rights_str: &str) -> Result<CastlingRights, FenParseError> {
    let mut rights = CastlingRights::none();
    if castling_rights_str == "-" {
        return Ok(rights);
    }

    for (idx, ch) in castling_rights_str.chars().enumerate() {
        let err = || FenParseError::CastlingRights(castling_rights_str.to_string(), idx);
        let right = match ch {
            'K' => &mut rights.white_king_side,
            'Q' => &mut rights.white_queen_side,
            'k' => &mut rights.black_king_side,
            'q' => &mut rights.black_queen_side,
            _ => return Err(err()),
        };
        if *right {
            return Err(err());
        }
        *right = true;
    }

    Ok(rights)
}

fn en_passant_target_from_fen(
    en_passant_target_str: &str,
) -> Result<Option<Square>, FenParseError> {
    if en_passant_target_str == "-" {
        return Ok(None);
    }

    // FEN uses lowercase letter for square names, Square uses uppercase
    let square = Square::from_str(&en_passant_target_str.to_uppercase())
        .map_err(|_| FenParseError::EnPassantTarget(en_passant_target_str.to_string()))?;
    if square.rank() != 2 && square.rank() != 5 {
        Err(FenParseError::EnPassantTarget(en_passant_target_str.to_string()))?
    }
    Ok(Some(square))
}

fn pieces_from_fen(pieces_str: &str) -> Result<Vec<(Square, Piece, Side)>, FenParseError> {
    let err = |ch_idx| FenParseError::PiecePlacement(pieces_str.to_string(), ch_idx);
    let ranks: Vec<&str> = pieces_str.split('/').collect();
    if ranks.len() != 8 {
        return Err(err(pieces_str.len()));
    }

    let mut placed = Vec::with_capacity(32);
    let mut ch_idx = 0;
    for (rank_idx, rank_str) in ranks.into_iter().enumerate() {
        let rank = 7 - rank_idx as u8;
        let mut file = 0;
        for ch in rank_str.chars() {
            if let Some(digit) = ch.to_digit(10).filter(|d| (1..=8).contains(d)) {
                file += digit as u8;
            } else if let Ok(piece) = Piece::try_from(ch.to_ascii_lowercase()) {
                if file >= 8 {
                    return Err(err(ch_idx));
                }
                let side = if ch.is_uppercase() {
                    Side::White
                } else {
                    Side::Black
                };
                placed.push((Square::from_rank_file(rank, file), piece, side));
                file += 1;
            } else {
                return Err(err(ch_idx));
            }
            ch_idx += 1;
        }
        if file != 8 {
            return Err(err(ch_idx));
        }
        // Account for the '/'
        ch_idx += 1;
    }

    Ok(placed)
}
