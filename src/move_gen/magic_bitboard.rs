use std::sync::LazyLock;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strum::IntoEnumIterator;
use tracing::debug;

use crate::bitboard::{BitBoard, Square};

use super::masks::{relevant_occupancy, sliding_attacks, Ray};

// Known working multipliers; each one is still verified when the tables are
// built and replaced by a fresh search if it collides.
#[rustfmt::skip]
const BISHOP_MAGICS: [u64; 64] = [
    0x40040844404084, 0x2004208a004208, 0x10190041080202, 0x108060845042010,
    0x581104180800210, 0x2112080446200010, 0x1080820820060210, 0x3c0808410220200,
    0x4050404440404, 0x21001420088, 0x24d0080801082102, 0x1020a0a020400,
    0x40308200402, 0x4011002100800, 0x401484104104005, 0x801010402020200,
    0x400210c3880100, 0x404022024108200, 0x810018200204102, 0x4002801a02003,
    0x85040820080400, 0x810102c808880400, 0xe900410884800, 0x8002020480840102,
    0x220200865090201, 0x2010100a02021202, 0x152048408022401, 0x20080002081110,
    0x4001001021004000, 0x800040400a011002, 0xe4004081011002, 0x1c004001012080,
    0x8004200962a00220, 0x8422100208500202, 0x2000402200300c08, 0x8646020080080080,
    0x80020a0200100808, 0x2010004880111000, 0x623000a080011400, 0x42008c0340209202,
    0x209188240001000, 0x400408a884001800, 0x110400a6080400, 0x1840060a44020800,
    0x90080104000041, 0x201011000808101, 0x1a2208080504f080, 0x8012020600211212,
    0x500861011240000, 0x180806108200800, 0x4000020e01040044, 0x300000261044000a,
    0x802241102020002, 0x20906061210001, 0x5a84841004010310, 0x4010801011c04,
    0xa010109502200, 0x4a02012000, 0x500201010098b028, 0x8040002811040900,
    0x28000010020204, 0x6000020202d0240, 0x8918844842082200, 0x4010011029020020,
];

#[rustfmt::skip]
const ROOK_MAGICS: [u64; 64] = [
    0x8a80104000800020, 0x140002000100040, 0x2801880a0017001, 0x100081001000420,
    0x200020010080420, 0x3001c0002010008, 0x8480008002000100, 0x2080088004402900,
    0x800098204000, 0x2024401000200040, 0x100802000801000, 0x120800800801000,
    0x208808088000400, 0x2802200800400, 0x2200800100020080, 0x801000060821100,
    0x80044006422000, 0x100808020004000, 0x12108a0010204200, 0x140848010000802,
    0x481828014002800, 0x8094004002004100, 0x4010040010010802, 0x20008806104,
    0x100400080208000, 0x2040002120081000, 0x21200680100081, 0x20100080080080,
    0x2000a00200410, 0x20080800400, 0x80088400100102, 0x80004600042881,
    0x4040008040800020, 0x440003000200801, 0x4200011004500, 0x188020010100100,
    0x14800401802800, 0x2080040080800200, 0x124080204001001, 0x200046502000484,
    0x480400080088020, 0x1000422010034000, 0x30200100110040, 0x100021010009,
    0x2002080100110004, 0x202008004008002, 0x20020004010100, 0x2048440040820001,
    0x101002200408200, 0x40802000401080, 0x4008142004410100, 0x2060820c0120200,
    0x1001004080100, 0x20c020080040080, 0x2935610830022400, 0x44440041009200,
    0x280001040802101, 0x2100190040002085, 0x80c0084100102001, 0x4024081001000421,
    0x20030a0244872, 0x12001008414402, 0x2006104900a0804, 0x1004081002402,
];

const MAGIC_SEARCH_SEED: u64 = 0x5EED_0F_B17B0A4D;

#[derive(Debug, Clone, Copy)]
struct MagicEntry {
    mask: BitBoard,
    magic: u64,
    shift: u32,
    offset: usize,
}

impl MagicEntry {
    fn index(&self, occupancy: BitBoard) -> usize {
        let relevant = (occupancy & self.mask).to_val();
        self.offset + (relevant.wrapping_mul(self.magic) >> self.shift) as usize
    }
}

/// Attack lookup tables for bishops and rooks, indexed by multiplying the
/// relevant blocking occupancy with a per-square magic number.
pub(crate) struct MagicTables {
    bishops: Vec<MagicEntry>,
    rooks: Vec<MagicEntry>,
    attacks: Vec<BitBoard>,
}

static MAGIC_TABLES: LazyLock<MagicTables> = LazyLock::new(MagicTables::new);

pub(crate) fn bishop_attacks(square: Square, occupancy: BitBoard) -> BitBoard {
    let tables = &*MAGIC_TABLES;
    tables.attacks[tables.bishops[square as usize].index(occupancy)]
}

pub(crate) fn rook_attacks(square: Square, occupancy: BitBoard) -> BitBoard {
    let tables = &*MAGIC_TABLES;
    tables.attacks[tables.rooks[square as usize].index(occupancy)]
}

pub(crate) fn queen_attacks(square: Square, occupancy: BitBoard) -> BitBoard {
    bishop_attacks(square, occupancy) | rook_attacks(square, occupancy)
}

/// Forces the tables to be built now instead of on the first lookup.
pub fn init() {
    LazyLock::force(&MAGIC_TABLES);
}

impl MagicTables {
    fn new() -> MagicTables {
        let mut rng = ChaCha8Rng::seed_from_u64(MAGIC_SEARCH_SEED);
        let mut attacks = Vec::new();

        let bishops = Square::iter()
            .map(|sq| {
                build_entry(
                    &Ray::BISHOP,
                    sq,
                    BISHOP_MAGICS[sq as usize],
                    &mut attacks,
                    &mut rng,
                )
            })
            .collect();
        let rooks = Square::iter()
            .map(|sq| {
                build_entry(
                    &Ray::ROOK,
                    sq,
                    ROOK_MAGICS[sq as usize],
                    &mut attacks,
                    &mut rng,
                )
            })
            .collect();

        MagicTables {
            bishops,
            rooks,
            attacks,
        }
    }
}

/// Every subset of `mask`, using the carry-rippler trick.
fn occupancy_subsets(mask: BitBoard) -> Vec<BitBoard> {
    let mask = mask.to_val();
    let mut subsets = Vec::with_capacity(1 << mask.count_ones());
    let mut subset: u64 = 0;
    loop {
        subsets.push(BitBoard::from_val(subset));
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            break;
        }
    }
    subsets
}

/// Fills a table for `magic`, or returns `None` if two occupancies with
/// different attack sets land on the same slot.
fn try_magic(
    magic: u64,
    shift: u32,
    mask: BitBoard,
    occupancies: &[BitBoard],
    references: &[BitBoard],
) -> Option<Vec<BitBoard>> {
    let mut table: Vec<Option<BitBoard>> = vec![None; 1 << (64 - shift)];
    for (&occ, &atks) in occupancies.iter().zip(references) {
        let idx = ((occ & mask).to_val().wrapping_mul(magic) >> shift) as usize;
        match table[idx] {
            None => table[idx] = Some(atks),
            Some(existing) if existing == atks => (),
            Some(_) => return None,
        }
    }
    Some(table.into_iter().map(Option::unwrap_or_default).collect())
}

fn build_entry(
    rays: &[Ray],
    square: Square,
    known_magic: u64,
    attacks: &mut Vec<BitBoard>,
    rng: &mut ChaCha8Rng,
) -> MagicEntry {
    let mask = relevant_occupancy(rays, square);
    let shift = 64 - mask.num_squares_set();
    let occupancies = occupancy_subsets(mask);
    let references: Vec<BitBoard> = occupancies
        .iter()
        .map(|&occ| sliding_attacks(rays, square, occ))
        .collect();

    let (magic, table) = match try_magic(known_magic, shift, mask, &occupancies, &references) {
        Some(table) => (known_magic, table),
        None => {
            debug!(%square, "stored magic collides, searching for a new one");
            search_magic(shift, mask, &occupancies, &references, rng)
        }
    };

    let offset = attacks.len();
    attacks.extend(table);
    MagicEntry {
        mask,
        magic,
        shift,
        offset,
    }
}

fn search_magic(
    shift: u32,
    mask: BitBoard,
    occupancies: &[BitBoard],
    references: &[BitBoard],
    rng: &mut ChaCha8Rng,
) -> (u64, Vec<BitBoard>) {
    loop {
        // Sparse candidates succeed far more often
        let candidate = rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>();
        if (mask.to_val().wrapping_mul(candidate) & 0xFF00_0000_0000_0000).count_ones() < 6 {
            continue;
        }
        if let Some(table) = try_magic(candidate, shift, mask, occupancies, references) {
            return (candidate, table);
        }
    }
}
