use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::evaluation::Eval;
use crate::position::Move;

use super::killers::KillerMoves;

/// Node visits between checks of the terminate flag and deadline.
pub const TIME_CHECK_INTERVAL: u32 = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub qnodes: u64,
    pub fail_highs: u64,
    pub fail_lows: u64,
    pub hash_probes: u64,
    pub hash_hits: u64,
    pub hash_exact_scores: u64,
    pub null_move_cutoffs: u64,
    /// Late moves searched at reduced depth.
    pub reductions: u64,
    /// Null-window and reduced searches that had to be repeated.
    pub re_searches: u64,
    pub check_extensions: u64,
}

impl SearchStats {
    pub fn hash_hit_rate(&self) -> f64 {
        if self.hash_probes == 0 {
            0.0
        } else {
            self.hash_hits as f64 / self.hash_probes as f64
        }
    }
}

/// Progress reported each time the best line at the root improves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSnapshot {
    pub depth: u8,
    pub score: Eval,
    pub nodes: u64,
    pub qnodes: u64,
    pub elapsed: Duration,
    pub pv: Vec<Move>,
}

impl fmt::Display for SearchSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pv = self
            .pv
            .iter()
            .map(|mve| mve.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        write!(
            f,
            "depth {} score {} nodes {} qnodes {} time {} pv {}",
            self.depth,
            self.score,
            self.nodes,
            self.qnodes,
            self.elapsed.as_millis(),
            pv
        )
    }
}

/// Control state for one search call: cancellation, deadline, statistics
/// and the ordering hints carried between iterations.
pub(crate) struct SearchContext<'a> {
    terminate: Arc<AtomicBool>,
    deadline: Option<Instant>,
    pub(crate) start: Instant,
    visits_since_check: u32,
    abortable: bool,
    aborted: bool,
    pub(crate) depth: u8,
    pub(crate) stats: SearchStats,
    pub(crate) last_pv: Vec<Move>,
    pub(crate) killers: KillerMoves,
    reporter: Option<&'a mut dyn FnMut(&SearchSnapshot)>,
}

impl<'a> SearchContext<'a> {
    pub(crate) fn new(
        terminate: Arc<AtomicBool>,
        start: Instant,
        deadline: Option<Instant>,
        reporter: Option<&'a mut dyn FnMut(&SearchSnapshot)>,
    ) -> Self {
        Self {
            terminate,
            deadline,
            start,
            visits_since_check: 0,
            abortable: false,
            aborted: false,
            depth: 0,
            stats: SearchStats::default(),
            last_pv: Vec::new(),
            killers: KillerMoves::new(),
            reporter,
        }
    }

    /// Starts an iteration. The first iteration runs to completion so there
    /// is always a move to play.
    pub(crate) fn begin_iteration(&mut self, depth: u8) {
        self.depth = depth;
        self.abortable = depth > 1;
    }

    /// Counts a node visit and, every [`TIME_CHECK_INTERVAL`] visits, checks
    /// whether the search must stop. Stays true once it has returned true.
    pub(crate) fn poll_abort(&mut self) -> bool {
        if !self.abortable {
            return false;
        }
        if self.aborted {
            return true;
        }
        self.visits_since_check += 1;
        if self.visits_since_check < TIME_CHECK_INTERVAL {
            return false;
        }
        self.visits_since_check = 0;
        if self.stop_requested() {
            trace!(depth = self.depth, nodes = self.stats.nodes, "aborting search");
            self.aborted = true;
        }
        self.aborted
    }

    /// Whether the terminate flag is set or the deadline has passed,
    /// checked right away.
    pub(crate) fn stop_requested(&self) -> bool {
        self.terminate.load(Ordering::Relaxed)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    pub(crate) fn report(&mut self, score: Eval, pv: &[Move]) {
        let Some(reporter) = self.reporter.as_deref_mut() else {
            return;
        };
        let snapshot = SearchSnapshot {
            depth: self.depth,
            score,
            nodes: self.stats.nodes,
            qnodes: self.stats.qnodes,
            elapsed: self.start.elapsed(),
            pv: pv.to_vec(),
        };
        reporter(&snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::Square::*;

    #[test]
    fn test_first_iteration_never_aborts() {
        let terminate = Arc::new(AtomicBool::new(true));
        let mut ctx = SearchContext::new(terminate, Instant::now(), None, None);

        ctx.begin_iteration(1);
        assert!((0..2 * TIME_CHECK_INTERVAL).all(|_| !ctx.poll_abort()));

        ctx.begin_iteration(2);
        let polls_until_abort = (1..=TIME_CHECK_INTERVAL).find(|_| ctx.poll_abort());
        assert_eq!(polls_until_abort, Some(TIME_CHECK_INTERVAL));
        assert!(ctx.poll_abort());
    }

    #[test]
    fn test_deadline() {
        let start = Instant::now();
        let terminate = Arc::new(AtomicBool::new(false));
        let past = SearchContext::new(Arc::clone(&terminate), start, Some(start), None);
        assert!(past.stop_requested());

        let later = start + Duration::from_secs(3600);
        let future = SearchContext::new(terminate, start, Some(later), None);
        assert!(!future.stop_requested());
    }

    #[test]
    fn test_report_snapshot() {
        let mut seen = Vec::new();
        let mut reporter = |snapshot: &SearchSnapshot| seen.push(snapshot.clone());
        {
            let terminate = Arc::new(AtomicBool::new(false));
            let mut ctx = SearchContext::new(terminate, Instant::now(), None, Some(&mut reporter));
            ctx.begin_iteration(3);
            ctx.stats.nodes = 42;
            ctx.report(Eval(15), &[Move::new(E2, E4), Move::new(E7, E5)]);
        }

        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].depth, 3);
        assert_eq!(seen[0].nodes, 42);
        assert_eq!(seen[0].pv, vec![Move::new(E2, E4), Move::new(E7, E5)]);
        assert!(seen[0].to_string().starts_with("depth 3 score cp 15 nodes 42"));
    }
}
