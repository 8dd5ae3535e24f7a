use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, FromRepr};

#[rustfmt::skip]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumString, FromRepr, Display, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

impl Square {
    pub const fn rank(self) -> u8 {
        self as u8 / 8
    }

    pub const fn file(self) -> u8 {
        self as u8 % 8
    }

    pub(crate) const fn from_u8(idx: u8) -> Square {
        match Square::from_repr(idx) {
            Some(sq) => sq,
            None => panic!("square out of bounds"),
        }
    }

    pub(crate) const fn from_rank_file(rank: u8, file: u8) -> Square {
        Square::from_u8(rank * 8 + file)
    }

    /// Squares in the order a board diagram prints them, rank 8 first.
    #[rustfmt::skip]
    pub const fn list_white_perspective() -> [Square; 64] {
        [
            Square::A8, Square::B8, Square::C8, Square::D8, Square::E8, Square::F8, Square::G8, Square::H8,
            Square::A7, Square::B7, Square::C7, Square::D7, Square::E7, Square::F7, Square::G7, Square::H7,
            Square::A6, Square::B6, Square::C6, Square::D6, Square::E6, Square::F6, Square::G6, Square::H6,
            Square::A5, Square::B5, Square::C5, Square::D5, Square::E5, Square::F5, Square::G5, Square::H5,
            Square::A4, Square::B4, Square::C4, Square::D4, Square::E4, Square::F4, Square::G4, Square::H4,
            Square::A3, Square::B3, Square::C3, Square::D3, Square::E3, Square::F3, Square::G3, Square::H3,
            Square::A2, Square::B2, Square::C2, Square::D2, Square::E2, Square::F2, Square::G2, Square::H2,
            Square::A1, Square::B1, Square::C1, Square::D1, Square::E1, Square::F1, Square::G1, Square::H1,
        ]
    }
}

/// A single step on the board. Diagonal and knight steps are built by
/// chaining these.
#[repr(isize)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Direction {
    IncRank = 8,
    IncFile = 1,
    DecRank = -8,
    DecFile = -1,
}

pub(crate) const FILE_A: BitBoard = BitBoard(0x0101_0101_0101_0101);
pub(crate) const FILE_H: BitBoard = BitBoard(0x8080_8080_8080_8080);
pub(crate) const RANK_1: BitBoard = BitBoard(0x0000_0000_0000_00FF);
pub(crate) const RANK_8: BitBoard = BitBoard(0xFF00_0000_0000_0000);
pub(crate) const LIGHT_SQUARES: BitBoard = BitBoard(0x55AA_55AA_55AA_55AA);

#[derive(PartialEq, Eq, Clone, Copy, Default, Hash)]
pub struct BitBoard(u64);

impl BitBoard {
    pub const fn empty() -> Self {
        BitBoard(0)
    }

    pub const fn from_square(square: Square) -> Self {
        BitBoard(1 << (square as u8))
    }

    pub fn from_squares(squares: &[Square]) -> Self {
        BitBoard(squares.iter().fold(0, |board, sq| board | 1 << (*sq as u8)))
    }

    pub const fn from_val(val: u64) -> Self {
        BitBoard(val)
    }

    pub const fn to_val(self) -> u64 {
        self.0
    }

    pub fn to_squares(self) -> Vec<Square> {
        self.squares().collect()
    }

    /// Iterates set squares from least to most significant bit.
    pub fn squares(self) -> Squares {
        Squares(self)
    }

    pub fn set_square(&mut self, square: Square) {
        self.0 |= 1 << square as u64
    }

    pub fn clear_square(&mut self, square: Square) {
        self.0 &= !(1 << square as u64)
    }

    pub const fn is_square_set(self, square: Square) -> bool {
        self.0 & 1 << (square as u64) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Shifts every set bit one step, dropping bits that would wrap around a
    /// board edge.
    pub(crate) const fn shift(mut self, dir: Direction) -> BitBoard {
        const EAST_SHIFT_MASK: u64 = !FILE_H.0;
        const WEST_SHIFT_MASK: u64 = !FILE_A.0;
        match dir {
            Direction::IncFile => self.0 &= EAST_SHIFT_MASK,
            Direction::DecFile => self.0 &= WEST_SHIFT_MASK,
            _ => (),
        }
        let shift_amt = dir as isize;
        if shift_amt >= 0 {
            self.0 <<= shift_amt
        } else {
            self.0 >>= -shift_amt
        }
        self
    }

    pub(crate) const fn shift_all(mut self, dirs: &[Direction]) -> BitBoard {
        let mut idx = 0;
        while idx < dirs.len() {
            self = self.shift(dirs[idx]);
            idx += 1;
        }
        self
    }

    pub fn get_lsb(self) -> Square {
        debug_assert!(self.0 != 0, "want != 0, got 0");
        Square::from_u8(self.0.trailing_zeros() as u8)
    }

    pub fn get_msb(self) -> Square {
        debug_assert!(self.0 != 0, "want != 0, got 0");
        Square::from_u8(63 - self.0.leading_zeros() as u8)
    }

    pub fn pop_lsb(&mut self) -> Square {
        let lsb = self.get_lsb();
        self.0 &= self.0 - 1;
        lsb
    }

    pub const fn num_squares_set(self) -> u32 {
        self.0.count_ones()
    }

    pub(crate) const fn const_bit_or(self, other: BitBoard) -> BitBoard {
        BitBoard(self.0 | other.0)
    }

    pub(crate) const fn const_bit_and(self, other: BitBoard) -> BitBoard {
        BitBoard(self.0 & other.0)
    }

    pub(crate) const fn const_bit_not(self) -> BitBoard {
        BitBoard(!self.0)
    }
}

pub struct Squares(BitBoard);

impl Iterator for Squares {
    type Item = Square;

    fn next(&mut self) -> Option<Square> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.pop_lsb())
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.num_squares_set() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for Squares {}

impl BitOr for BitBoard {
    type Output = BitBoard;

    fn bitor(self, other: BitBoard) -> BitBoard {
        BitBoard(self.0 | other.0)
    }
}

impl BitOrAssign for BitBoard {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0
    }
}

impl BitAnd for BitBoard {
    type Output = BitBoard;

    fn bitand(self, other: BitBoard) -> BitBoard {
        BitBoard(self.0 & other.0)
    }
}

impl BitAndAssign for BitBoard {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0
    }
}

impl BitXor for BitBoard {
    type Output = BitBoard;

    fn bitxor(self, other: BitBoard) -> BitBoard {
        BitBoard(self.0 ^ other.0)
    }
}

impl BitXorAssign for BitBoard {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0
    }
}

impl Not for BitBoard {
    type Output = BitBoard;

    fn not(self) -> Self::Output {
        BitBoard(!self.0)
    }
}

impl From<Square> for BitBoard {
    fn from(square: Square) -> Self {
        BitBoard::from_square(square)
    }
}

impl fmt::Debug for BitBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut board_str = String::with_capacity(64 + 7);

        for rank in (0..8).rev() {
            for file in 0..8 {
                let square = Square::from_rank_file(rank, file);
                let ch = if self.is_square_set(square) { 'X' } else { '.' };
                board_str.push(ch);
            }
            if rank != 0 {
                board_str.push('\n');
            }
        }

        write!(f, "{}", board_str)
    }
}

#[cfg(test)]
mod tests {
    use super::Square::*;
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_bitboard_from_squares() {
        let got = BitBoard::from_squares(&[A1, A2, E4]);
        let want = BitBoard(0b0000000000000000000000000000000000010000000000000000000100000001);
        assert_eq!(got, want);
    }

    #[test]
    fn test_debug() {
        let got = BitBoard::from_squares(&[A8, B7, C6, D5, E4, F3, G2, H1]);
        let want = "X.......\n.X......\n..X.....\n...X....\n....X...\n.....X..\n......X.\n.......X";
        assert_eq!(format!("{:?}", got), want);
    }

    #[test_case(BitBoard::from_square(D4), &[Direction::IncRank], BitBoard::from_square(D5) ; "n")]
    #[test_case(BitBoard::from_square(D4), &[Direction::DecRank], BitBoard::from_square(D3) ; "s")]
    #[test_case(BitBoard::from_square(D4), &[Direction::IncFile], BitBoard::from_square(E4) ; "e")]
    #[test_case(BitBoard::from_square(D4), &[Direction::DecFile], BitBoard::from_square(C4) ; "w")]
    #[test_case(BitBoard::from_square(D4), &[Direction::IncRank, Direction::IncFile], BitBoard::from_square(E5) ; "ne")]
    #[test_case(BitBoard::from_square(D4), &[Direction::DecRank, Direction::DecFile], BitBoard::from_square(C3) ; "sw")]
    #[test_case(BitBoard::from_square(A6), &[Direction::DecFile], BitBoard(0) ; "wrap w")]
    #[test_case(BitBoard::from_square(H3), &[Direction::IncFile], BitBoard(0) ; "wrap e")]
    #[test_case(BitBoard::from_square(A2), &[Direction::DecRank, Direction::DecFile], BitBoard(0) ; "wrap sw")]
    #[test_case(BitBoard::from_square(H7), &[Direction::IncRank, Direction::IncFile], BitBoard(0) ; "wrap ne")]
    #[test_case(BitBoard::from_square(E8), &[Direction::IncRank], BitBoard(0) ; "off top")]
    fn test_shift(inp: BitBoard, shift_dirs: &[Direction], want: BitBoard) {
        assert_eq!(inp.shift_all(shift_dirs), want);
    }

    #[test_case(BitBoard(0b1001000), D1, BitBoard(0b1000000) ; "D1")]
    #[test_case(BitBoard(0b1000000), G1, BitBoard(0b0000000) ; "G1")]
    fn test_pop_lsb(mut inp: BitBoard, lsb_want: Square, res_want: BitBoard) {
        let lsb_got = inp.pop_lsb();
        assert_eq!(lsb_got, lsb_want);
        assert_eq!(inp, res_want);
    }

    #[test]
    fn test_squares_iterates_low_to_high() {
        let bb = BitBoard::from_squares(&[H8, C3, A1, E4]);
        assert_eq!(bb.squares().collect::<Vec<_>>(), vec![A1, C3, E4, H8]);
        assert_eq!(bb.squares().len(), 4);
    }

    #[test]
    fn test_file_and_rank_masks() {
        assert!(FILE_A.is_square_set(A5));
        assert!(!FILE_A.is_square_set(B5));
        assert!(LIGHT_SQUARES.is_square_set(H1));
        assert!(LIGHT_SQUARES.is_square_set(A8));
        assert!(!LIGHT_SQUARES.is_square_set(A1));
        assert!(!LIGHT_SQUARES.is_square_set(F8));
        assert!(FILE_H.is_square_set(H1));
        assert_eq!(RANK_1.num_squares_set(), 8);
        assert!(RANK_8.is_square_set(D8));
    }
}
