use strum_macros::EnumIter;

use crate::bitboard::{BitBoard, Direction, Square};

/// The eight compass directions a sliding piece travels in. North is toward
/// rank 8, east toward file H.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub(crate) enum Ray {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Ray {
    pub(crate) const ROOK: [Ray; 4] = [Ray::North, Ray::East, Ray::South, Ray::West];
    pub(crate) const BISHOP: [Ray; 4] = [
        Ray::NorthEast,
        Ray::SouthEast,
        Ray::SouthWest,
        Ray::NorthWest,
    ];

    const fn steps(self) -> &'static [Direction] {
        match self {
            Ray::North => &[Direction::IncRank],
            Ray::NorthEast => &[Direction::IncRank, Direction::IncFile],
            Ray::East => &[Direction::IncFile],
            Ray::SouthEast => &[Direction::DecRank, Direction::IncFile],
            Ray::South => &[Direction::DecRank],
            Ray::SouthWest => &[Direction::DecRank, Direction::DecFile],
            Ray::West => &[Direction::DecFile],
            Ray::NorthWest => &[Direction::IncRank, Direction::DecFile],
        }
    }

    /// Whether squares along this ray have increasing indices.
    const fn is_increasing(self) -> bool {
        matches!(
            self,
            Ray::North | Ray::NorthEast | Ray::East | Ray::NorthWest
        )
    }

    pub(crate) const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Ray::NorthEast | Ray::SouthEast | Ray::SouthWest | Ray::NorthWest
        )
    }

    /// Direction of travel from `src` to `dest`, if they share a rank, file
    /// or diagonal.
    pub(crate) fn between(src: Square, dest: Square) -> Option<Ray> {
        let rank_diff = dest.rank() as i8 - src.rank() as i8;
        let file_diff = dest.file() as i8 - src.file() as i8;

        if rank_diff == 0 && file_diff == 0 {
            return None;
        }
        if rank_diff != 0 && file_diff != 0 && rank_diff.abs() != file_diff.abs() {
            return None;
        }

        let ray = match (rank_diff.signum(), file_diff.signum()) {
            (1, 0) => Ray::North,
            (1, 1) => Ray::NorthEast,
            (0, 1) => Ray::East,
            (-1, 1) => Ray::SouthEast,
            (-1, 0) => Ray::South,
            (-1, -1) => Ray::SouthWest,
            (0, -1) => Ray::West,
            _ => Ray::NorthWest,
        };
        Some(ray)
    }
}

static RAYS: [[BitBoard; 64]; 8] = calc_rays();

const fn calc_rays() -> [[BitBoard; 64]; 8] {
    const ALL_RAYS: [Ray; 8] = [
        Ray::North,
        Ray::NorthEast,
        Ray::East,
        Ray::SouthEast,
        Ray::South,
        Ray::SouthWest,
        Ray::West,
        Ray::NorthWest,
    ];
    let mut rays = [[BitBoard::empty(); 64]; 8];

    let mut ray_idx = 0;
    while ray_idx < 8 {
        let steps = ALL_RAYS[ray_idx].steps();
        let mut sq_idx = 0;
        while sq_idx < 64 {
            let mut curr = BitBoard::from_square(Square::from_u8(sq_idx as u8)).shift_all(steps);
            let mut ray = BitBoard::empty();
            while !curr.is_empty() {
                ray = ray.const_bit_or(curr);
                curr = curr.shift_all(steps);
            }
            rays[ray_idx][sq_idx] = ray;
            sq_idx += 1;
        }
        ray_idx += 1;
    }
    rays
}

/// Every square from `square` (exclusive) to the board edge along `ray`.
pub(crate) fn ray(ray: Ray, square: Square) -> BitBoard {
    RAYS[ray as usize][square as usize]
}

/// Squares a slider on `square` reaches along `dir`, stopping at (and
/// including) the first occupied square.
pub(crate) fn ray_attacks(dir: Ray, square: Square, occupancy: BitBoard) -> BitBoard {
    let full_ray = ray(dir, square);
    let blockers = full_ray & occupancy;
    if blockers.is_empty() {
        return full_ray;
    }
    let nearest = if dir.is_increasing() {
        blockers.get_lsb()
    } else {
        blockers.get_msb()
    };
    full_ray & !ray(dir, nearest)
}

pub(crate) fn sliding_attacks(rays: &[Ray], square: Square, occupancy: BitBoard) -> BitBoard {
    rays.iter().fold(BitBoard::empty(), |atks, &dir| {
        atks | ray_attacks(dir, square, occupancy)
    })
}

/// Occupancy bits that can change a slider's attacks from `square`. The last
/// square on each ray never blocks anything beyond it, so it is left out.
pub(crate) fn relevant_occupancy(rays: &[Ray], square: Square) -> BitBoard {
    rays.iter().fold(BitBoard::empty(), |mask, &dir| {
        let full_ray = ray(dir, square);
        if full_ray.is_empty() {
            return mask;
        }
        let edge = if dir.is_increasing() {
            full_ray.get_msb()
        } else {
            full_ray.get_lsb()
        };
        mask | (full_ray & !BitBoard::from_square(edge))
    })
}
