use crate::evaluation::Eval;
use crate::position::Move;
use crate::search::SearchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    LowerBound,
    UpperBound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranspositionTableEntry {
    key: u64,
    pub bound: Bound,
    pub score: Eval,
    pub depth: u8,
    pub best_move: Option<Move>,
}

impl TranspositionTableEntry {
    pub fn key(&self) -> u64 {
        self.key
    }
}

pub const DEFAULT_TRANSPOSITION_TABLE_ENTRIES: usize = 1 << 18;

/// Fixed-capacity hash table indexed by the low bits of a position's key.
/// A store always replaces whatever shares its slot; probes compare the
/// full key, so a slot taken over by another position reads as a miss.
#[derive(Debug, Clone)]
pub struct TranspositionTable {
    entries: Vec<Option<TranspositionTableEntry>>,
    mask: usize,
}

impl TranspositionTable {
    /// A table holding `num_entries` rounded down to a power of two.
    pub fn new(num_entries: usize) -> Result<Self, SearchError> {
        if num_entries == 0 {
            return Err(SearchError::TableSize(num_entries));
        }
        let capacity = 1usize << (usize::BITS - 1 - num_entries.leading_zeros());
        Ok(Self {
            entries: vec![None; capacity],
            mask: capacity - 1,
        })
    }

    /// The largest table fitting in `megabytes`.
    pub fn with_size_mb(megabytes: usize) -> Result<Self, SearchError> {
        let entry_size = std::mem::size_of::<Option<TranspositionTableEntry>>();
        let num_entries = megabytes.saturating_mul(1024 * 1024) / entry_size;
        Self::new(num_entries).map_err(|_| SearchError::TableSize(megabytes))
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn probe(&self, key: u64) -> Option<TranspositionTableEntry> {
        self.entries[self.index(key)].filter(|entry| entry.key == key)
    }

    pub fn store(
        &mut self,
        bound: Bound,
        key: u64,
        score: Eval,
        depth: u8,
        best_move: Option<Move>,
    ) {
        let idx = self.index(key);
        self.entries[idx] = Some(TranspositionTableEntry {
            key,
            bound,
            score,
            depth,
            best_move,
        });
    }

    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(|entry| *entry = None);
    }

    /// Occupied slots per thousand, sampled from the start of the table.
    pub fn hashfull(&self) -> u16 {
        let sample = self.entries.len().min(1000);
        let used = self.entries[..sample].iter().filter(|e| e.is_some()).count();
        (used * 1000 / sample) as u16
    }

    fn index(&self, key: u64) -> usize {
        (key as usize) & self.mask
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        let capacity = DEFAULT_TRANSPOSITION_TABLE_ENTRIES;
        Self {
            entries: vec![None; capacity],
            mask: capacity - 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::Square::*;
    use test_case::test_case;
    use testresult::TestResult;

    #[test_case(1, 1 ; "one")]
    #[test_case(1000, 512 ; "rounds down")]
    #[test_case(4096, 4096 ; "power of two")]
    fn test_capacity(num_entries: usize, want: usize) -> TestResult {
        assert_eq!(TranspositionTable::new(num_entries)?.capacity(), want);
        Ok(())
    }

    #[test]
    fn test_zero_capacity() {
        assert!(matches!(
            TranspositionTable::new(0),
            Err(SearchError::TableSize(0))
        ));
        assert!(matches!(
            TranspositionTable::with_size_mb(0),
            Err(SearchError::TableSize(0))
        ));
    }

    #[test]
    fn test_with_size_mb() -> TestResult {
        let table = TranspositionTable::with_size_mb(1)?;
        let bytes = table.capacity() * std::mem::size_of::<Option<TranspositionTableEntry>>();
        assert!(bytes <= 1024 * 1024);
        assert!(bytes * 2 > 1024 * 1024);
        Ok(())
    }

    #[test]
    fn test_store_then_probe() -> TestResult {
        let mut table = TranspositionTable::new(64)?;
        let mve = Some(Move::new(E2, E4));
        table.store(Bound::LowerBound, 0xABCD, Eval(35), 4, mve);

        let entry = table.probe(0xABCD).expect("entry was just stored");
        assert_eq!(entry.bound, Bound::LowerBound);
        assert_eq!(entry.score, Eval(35));
        assert_eq!(entry.depth, 4);
        assert_eq!(entry.best_move, mve);
        assert_eq!(entry.key(), 0xABCD);
        Ok(())
    }

    #[test]
    fn test_collision_never_returns_other_key() -> TestResult {
        let mut table = TranspositionTable::new(64)?;
        table.store(Bound::Exact, 5, Eval(1), 2, None);
        // Same slot, different key
        assert_eq!(table.probe(5 + 64), None);

        table.store(Bound::UpperBound, 5 + 64, Eval(-7), 1, None);
        assert_eq!(table.probe(5), None);
        assert_eq!(table.probe(5 + 64).map(|e| e.score), Some(Eval(-7)));
        Ok(())
    }

    #[test]
    fn test_clear_and_hashfull() -> TestResult {
        let mut table = TranspositionTable::new(16)?;
        assert_eq!(table.hashfull(), 0);
        for key in 0..8 {
            table.store(Bound::Exact, key, Eval::DRAW, 1, None);
        }
        assert_eq!(table.hashfull(), 500);

        table.clear();
        assert_eq!(table.probe(3), None);
        assert_eq!(table.hashfull(), 0);
        Ok(())
    }
}
