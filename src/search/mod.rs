use std::fmt::Display;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, debug_span, info};

use crate::evaluation::{piece_value, Eval, EvaluatePosition};
use crate::move_gen::GenerateMoves;
use crate::position::{Move, Position, Side};
use crate::see::see;
use crate::transposition_table::{Bound, TranspositionTable};

mod context;
mod killers;
mod move_ordering;

pub use context::{SearchSnapshot, SearchStats, TIME_CHECK_INTERVAL};

use context::SearchContext;
use move_ordering::MoveOrderer;

/// Iterations searched when neither a depth nor a time limit is given.
pub const DEFAULT_MAX_DEPTH: u8 = 20;

/// Frames deeper than this return the static evaluation.
pub const MAX_SEARCH_PLY: u8 = 128;

const NULL_MOVE_MIN_DEPTH: u8 = 3;
const NULL_MOVE_REDUCTION: u8 = 3;
const LMR_MIN_MOVES_SEARCHED: usize = 4;
const LMR_MIN_DEPTH: u8 = 3;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub max_depth: Option<u8>,
    pub move_time: Option<Duration>,
    /// Analysis mode: no deadline, search until terminated or `max_depth`.
    pub infinite: bool,
    pub white_time: Option<Duration>,
    pub black_time: Option<Duration>,
    pub white_inc: Option<Duration>,
    pub black_inc: Option<Duration>,
    pub moves_to_go: Option<u16>,
    /// Searches every move at full depth: no null-move pruning and no late
    /// move reductions.
    pub no_pruning: bool,
}

impl Display for SearchParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Print out only non default fields
        let mut parts = vec![];

        if let Some(max_depth) = self.max_depth {
            parts.push(format!("max_depth: {}", max_depth));
        }
        if let Some(move_time) = self.move_time {
            parts.push(format!("move_time: {:?}", move_time));
        }
        if self.infinite {
            parts.push("infinite: true".to_string());
        }
        if let Some(white_time) = self.white_time {
            parts.push(format!("white_time: {:?}", white_time));
        }
        if let Some(black_time) = self.black_time {
            parts.push(format!("black_time: {:?}", black_time));
        }
        if let Some(white_inc) = self.white_inc {
            parts.push(format!("white_inc: {:?}", white_inc));
        }
        if let Some(black_inc) = self.black_inc {
            parts.push(format!("black_inc: {:?}", black_inc));
        }
        if let Some(moves_to_go) = self.moves_to_go {
            parts.push(format!("moves_to_go: {}", moves_to_go));
        }
        if self.no_pruning {
            parts.push("no_pruning: true".to_string());
        }
        write!(f, "SearchParams: {}", parts.join(", "))
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SearchError {
    #[error("max depth must be at least 1")]
    ZeroDepth,

    #[error("transposition table size must hold at least one entry, got {0}")]
    TableSize(usize),
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    /// `None` only when the side to move has no legal move.
    pub best_move: Option<Move>,
    pub score: Eval,
    /// Deepest iteration that completed.
    pub depth: u8,
    pub pv: Vec<Move>,
    pub stats: SearchStats,
    pub start_time: Instant,
    pub time_elapsed: Duration,
}

/// Searches `position` by iterative deepening and returns the result of the
/// deepest completed iteration. The position is left as it was passed in.
pub fn search(
    position: &mut Position,
    params: &SearchParams,
    move_gen: impl GenerateMoves + Copy,
    position_eval: impl EvaluatePosition + Copy,
    transposition_table: &mut TranspositionTable,
    terminate: Arc<AtomicBool>,
) -> Result<SearchResult, SearchError> {
    run(
        position,
        params,
        move_gen,
        position_eval,
        transposition_table,
        terminate,
        None,
    )
}

/// Like [`search`], calling `reporter` each time the best line at the root
/// improves.
pub fn search_with_reporter(
    position: &mut Position,
    params: &SearchParams,
    move_gen: impl GenerateMoves + Copy,
    position_eval: impl EvaluatePosition + Copy,
    transposition_table: &mut TranspositionTable,
    terminate: Arc<AtomicBool>,
    mut reporter: impl FnMut(&SearchSnapshot),
) -> Result<SearchResult, SearchError> {
    run(
        position,
        params,
        move_gen,
        position_eval,
        transposition_table,
        terminate,
        Some(&mut reporter as &mut dyn FnMut(&SearchSnapshot)),
    )
}

fn run(
    position: &mut Position,
    params: &SearchParams,
    move_gen: impl GenerateMoves + Copy,
    position_eval: impl EvaluatePosition + Copy,
    transposition_table: &mut TranspositionTable,
    terminate: Arc<AtomicBool>,
    reporter: Option<&mut dyn FnMut(&SearchSnapshot)>,
) -> Result<SearchResult, SearchError> {
    let _span = debug_span!("search", position = position.to_fen(), %params).entered();

    let max_depth = params.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
    if max_depth == 0 {
        return Err(SearchError::ZeroDepth);
    }

    let start = Instant::now();
    let (soft_time_limit, hard_time_limit) = get_time_to_use(params, position.state.to_move);
    debug!(
        "Time for this move: soft limit={:?} hard limit={:?}",
        soft_time_limit, hard_time_limit
    );

    let mut searcher = Searcher {
        move_gen,
        position_eval,
        transposition_table,
        pruning: !params.no_pruning,
        ctx: SearchContext::new(
            terminate,
            start,
            hard_time_limit.map(|limit| start + limit),
            reporter,
        ),
    };

    let mut result = SearchResult {
        best_move: None,
        score: Eval::DRAW,
        depth: 0,
        pv: Vec::new(),
        stats: SearchStats::default(),
        start_time: start,
        time_elapsed: Duration::ZERO,
    };

    for depth in 1..=max_depth {
        if depth > 1 && searcher.ctx.stop_requested() {
            break;
        }
        let iteration_start = Instant::now();
        searcher.ctx.begin_iteration(depth);

        let mut pv = Vec::new();
        let Some(score) = searcher.search_root(position, depth, &mut pv) else {
            debug!(depth, "iteration aborted, keeping depth {}", result.depth);
            break;
        };

        result.best_move = pv.first().copied();
        result.score = score;
        result.depth = depth;
        result.pv = pv.clone();
        searcher.ctx.last_pv = pv;
        write_search_info(&searcher, &result);

        if result.best_move.is_none() {
            // Checkmate or stalemate at the root, nothing deeper to find
            break;
        }

        let elapsed = start.elapsed();
        if let Some(soft_time_limit) = soft_time_limit {
            if elapsed + iteration_start.elapsed() > soft_time_limit {
                debug!(
                    "Search time exceeded soft limit: {:?} > {:?}",
                    elapsed, soft_time_limit
                );
                break;
            }
        }
    }

    result.stats = searcher.ctx.stats;
    result.time_elapsed = start.elapsed();
    Ok(result)
}

fn get_time_to_use(
    params: &SearchParams,
    side_to_move: Side,
) -> (Option<Duration>, Option<Duration>) {
    if params.infinite {
        return (None, None);
    }
    let (soft, mut hard) = match (side_to_move, params.white_time, params.black_time) {
        (Side::White, Some(white_time), _) => {
            let (soft, hard) = calc_time_to_use(white_time, params.white_inc, params.moves_to_go);
            (Some(soft), Some(hard))
        }
        (Side::Black, _, Some(black_time)) => {
            let (soft, hard) = calc_time_to_use(black_time, params.black_inc, params.moves_to_go);
            (Some(soft), Some(hard))
        }
        (_, _, _) => (None, None),
    };
    if let Some(move_time) = params.move_time {
        hard = Some(move_time);
    }
    (soft, hard)
}

/// Splits the remaining clock over the moves left, keeping a 5% reserve.
/// Returns a soft limit for starting another iteration and a hard limit
/// after which the search aborts.
fn calc_time_to_use(
    time_left: Duration,
    time_inc: Option<Duration>,
    moves_to_go: Option<u16>,
) -> (Duration, Duration) {
    let time_inc = time_inc.unwrap_or(Duration::ZERO);
    let usable_time = time_left - (time_left / 20);
    let moves_to_go = moves_to_go.unwrap_or(40).max(1);
    let soft_limit = ((usable_time / moves_to_go.into()) + time_inc).min(usable_time);
    let hard_limit = (soft_limit * 2).min(usable_time);
    (soft_limit, hard_limit)
}

fn write_search_info<M, E>(searcher: &Searcher<'_, '_, M, E>, result: &SearchResult) {
    let ctx = &searcher.ctx;
    let elapsed = ctx.start.elapsed();
    let nps = (ctx.stats.nodes + ctx.stats.qnodes) as f64 / elapsed.as_secs_f64().max(1e-9);
    info!(
        target: "search",
        "depth {} score {} nodes {} qnodes {} nps {:.0} hashfull {} hashhitrate {:.2} time {} pv {}",
        result.depth,
        result.score,
        ctx.stats.nodes,
        ctx.stats.qnodes,
        nps,
        searcher.transposition_table.hashfull(),
        ctx.stats.hash_hit_rate(),
        elapsed.as_millis(),
        result
            .pv
            .iter()
            .map(|mve| mve.to_string())
            .collect::<Vec<_>>()
            .join(" "),
    );
}

struct Searcher<'a, 'r, M, E> {
    move_gen: M,
    position_eval: E,
    transposition_table: &'a mut TranspositionTable,
    pruning: bool,
    ctx: SearchContext<'r>,
}

impl<M: GenerateMoves, E: EvaluatePosition> Searcher<'_, '_, M, E> {
    /// Searches every legal root move with a full window for the first and
    /// a null window, widened on success, for the rest. Returns `None` if
    /// the iteration was aborted.
    fn search_root(&mut self, position: &mut Position, depth: u8, pv: &mut Vec<Move>) -> Option<Eval> {
        let mut alpha = Eval::MIN;
        let beta = Eval::MAX;
        self.ctx.stats.nodes += 1;

        let key = position.hash_key();
        let hash_move = self
            .transposition_table
            .probe(key)
            .and_then(|entry| entry.best_move);
        let moves = self.move_gen.gen_legal_moves(position);
        let pv_move = self.ctx.last_pv.first().copied();
        let orderer = MoveOrderer::new(position, moves, pv_move, hash_move, [None; 2]);

        let mut child_pv = Vec::new();
        let mut num_searched = 0;
        for mve in orderer {
            let mut child = position.play(mve);
            let gives_check = child.in_check();
            let new_depth = depth - 1 + u8::from(gives_check);
            if gives_check {
                self.ctx.stats.check_extensions += 1;
            }

            let score = if num_searched == 0 {
                -self.search_node(&mut child, -beta, -alpha, new_depth, 1, true, gives_check, false, &mut child_pv)?
            } else {
                let score = -self.search_node(
                    &mut child,
                    -(alpha + 1),
                    -alpha,
                    new_depth,
                    1,
                    false,
                    gives_check,
                    !gives_check,
                    &mut child_pv,
                )?;
                if score > alpha && score < beta {
                    self.ctx.stats.re_searches += 1;
                    -self.search_node(&mut child, -beta, -alpha, new_depth, 1, true, gives_check, false, &mut child_pv)?
                } else {
                    score
                }
            };
            drop(child);
            num_searched += 1;

            if score > alpha {
                alpha = score;
                set_pv(pv, mve, &child_pv);
                self.ctx.report(score, pv);
            }
        }

        if num_searched == 0 {
            pv.clear();
            return Some(if position.in_check() {
                Eval::mated_in(0)
            } else {
                Eval::DRAW
            });
        }

        self.transposition_table
            .store(Bound::Exact, key, alpha.to_table(0), depth, pv.first().copied());
        Some(alpha)
    }

    /// Alpha-beta below the root. Fails hard: the result is clamped to the
    /// window. `None` means the search was aborted and the result must be
    /// discarded.
    #[allow(clippy::too_many_arguments)]
    fn search_node(
        &mut self,
        position: &mut Position,
        mut alpha: Eval,
        beta: Eval,
        depth: u8,
        ply: u8,
        pv_node: bool,
        in_check: bool,
        null_move_ok: bool,
        pv: &mut Vec<Move>,
    ) -> Option<Eval> {
        debug_assert!(alpha < beta);
        debug_assert_eq!(in_check, position.in_check());
        pv.clear();

        if depth == 0 {
            return self.quiescence(position, alpha, beta, ply);
        }

        self.ctx.stats.nodes += 1;
        if self.ctx.poll_abort() {
            return None;
        }

        if position.is_draw() {
            return Some(Eval::DRAW);
        }
        if ply >= MAX_SEARCH_PLY {
            return Some(self.position_eval.evaluate(position));
        }

        let key = position.hash_key();
        self.ctx.stats.hash_probes += 1;
        let entry = self.transposition_table.probe(key);
        if let Some(entry) = entry {
            self.ctx.stats.hash_hits += 1;
            if entry.depth >= depth {
                let score = entry.score.from_table(ply);
                match entry.bound {
                    Bound::LowerBound if score >= beta => {
                        self.ctx.stats.fail_highs += 1;
                        return Some(beta);
                    }
                    Bound::UpperBound if score <= alpha => {
                        self.ctx.stats.fail_lows += 1;
                        return Some(alpha);
                    }
                    Bound::Exact => {
                        self.ctx.stats.hash_exact_scores += 1;
                        return Some(score);
                    }
                    _ => (),
                }
            }
        }

        let mover = position.state.to_move;

        // Pass the turn: if the opponent still can't reach beta, a real move
        // almost surely fails high too. Skipped with only king and pawns,
        // where passing may be better than any move.
        if self.pruning
            && !pv_node
            && !in_check
            && null_move_ok
            && depth >= NULL_MOVE_MIN_DEPTH
            && beta < Eval::INFINITY
            && position.has_non_pawn_material(mover)
        {
            let null_depth = depth.saturating_sub(NULL_MOVE_REDUCTION + 1).max(1);
            let mut child = position.play_null();
            let null_score = -self.search_node(
                &mut child,
                -beta,
                -(beta - 1),
                null_depth,
                ply + 1,
                false,
                false,
                false,
                &mut Vec::new(),
            )?;
            drop(child);

            if null_score >= beta {
                self.ctx.stats.null_move_cutoffs += 1;
                return Some(beta);
            }
        }

        let moves = self.move_gen.gen_pseudo_legal_moves(position, false);
        let pv_move = if pv_node {
            self.ctx.last_pv.get(ply as usize).copied()
        } else {
            None
        };
        let hash_move = entry.and_then(|entry| entry.best_move);
        let killers = self.ctx.killers.get(ply);
        let orderer = MoveOrderer::new(position, moves, pv_move, hash_move, killers);

        let mut best_move = None;
        let mut child_pv = Vec::new();
        let mut num_searched = 0;
        for mve in orderer {
            let mut child = position.play(mve);
            if child.is_side_in_check(mover) {
                continue;
            }

            let gives_check = child.in_check();
            let extend = u8::from(gives_check);
            let new_depth = depth - 1 + extend;
            if gives_check {
                self.ctx.stats.check_extensions += 1;
            }

            let score = if num_searched == 0 {
                -self.search_node(
                    &mut child,
                    -beta,
                    -alpha,
                    new_depth,
                    ply + 1,
                    pv_node,
                    gives_check,
                    !pv_node,
                    &mut child_pv,
                )?
            } else {
                let reduce = self.pruning
                    && num_searched >= LMR_MIN_MOVES_SEARCHED
                    && depth >= LMR_MIN_DEPTH
                    && !pv_node
                    && !in_check
                    && !gives_check
                    && mve.is_quiet()
                    && !killers.contains(&Some(mve));

                // Anything not reduced goes straight to the full depth probe
                let mut score = if reduce {
                    self.ctx.stats.reductions += 1;
                    -self.search_node(
                        &mut child,
                        -(alpha + 1),
                        -alpha,
                        depth - 2,
                        ply + 1,
                        false,
                        false,
                        true,
                        &mut child_pv,
                    )?
                } else {
                    alpha + 1
                };

                if score > alpha {
                    if reduce {
                        self.ctx.stats.re_searches += 1;
                    }
                    score = -self.search_node(
                        &mut child,
                        -(alpha + 1),
                        -alpha,
                        new_depth,
                        ply + 1,
                        false,
                        gives_check,
                        extend == 0,
                        &mut child_pv,
                    )?;
                }
                if score > alpha && score < beta {
                    self.ctx.stats.re_searches += 1;
                    score = -self.search_node(
                        &mut child,
                        -beta,
                        -alpha,
                        new_depth,
                        ply + 1,
                        pv_node,
                        gives_check,
                        extend == 0,
                        &mut child_pv,
                    )?;
                }
                score
            };
            drop(child);
            num_searched += 1;

            if score > alpha {
                if score >= beta {
                    self.transposition_table.store(
                        Bound::LowerBound,
                        key,
                        beta.to_table(ply),
                        depth,
                        Some(mve),
                    );
                    if mve.is_quiet() {
                        self.ctx.killers.add(ply, mve);
                    }
                    self.ctx.stats.fail_highs += 1;
                    return Some(beta);
                }
                alpha = score;
                best_move = Some(mve);
                set_pv(pv, mve, &child_pv);
            }
        }

        if num_searched == 0 {
            alpha = if in_check {
                Eval::mated_in(ply)
            } else {
                Eval::DRAW
            };
        }

        let bound = if best_move.is_some() {
            Bound::Exact
        } else {
            self.ctx.stats.fail_lows += 1;
            Bound::UpperBound
        };
        self.transposition_table
            .store(bound, key, alpha.to_table(ply), depth, best_move);

        Some(alpha)
    }

    /// Resolves captures until the position is quiet. When not in check the
    /// static evaluation is a floor the side to move can always settle for,
    /// and captures that lose material by exchange are skipped. In check,
    /// every evasion is searched.
    fn quiescence(&mut self, position: &mut Position, mut alpha: Eval, beta: Eval, ply: u8) -> Option<Eval> {
        debug_assert!(alpha < beta);

        self.ctx.stats.qnodes += 1;
        if self.ctx.poll_abort() {
            return None;
        }
        if ply >= MAX_SEARCH_PLY {
            return Some(self.position_eval.evaluate(position));
        }

        let in_check = position.in_check();
        if !in_check {
            let stand_pat = self.position_eval.evaluate(position);
            if stand_pat > alpha {
                if stand_pat >= beta {
                    return Some(beta);
                }
                alpha = stand_pat;
            }
        }

        let mover = position.state.to_move;
        let moves = self.move_gen.gen_pseudo_legal_moves(position, !in_check);
        let orderer = MoveOrderer::new(position, moves, None, None, [None; 2]);

        let mut num_legal = 0;
        for mve in orderer {
            let mut child = position.play(mve);
            if child.is_side_in_check(mover) {
                continue;
            }
            num_legal += 1;

            if !in_check && !mve.is_promotion() {
                if let (Some(captured), Some((capturer, _))) = (mve.captured, child.is_piece_at(mve.dest)) {
                    if piece_value(capturer) >= piece_value(captured) && see(&child, mve) < 0 {
                        continue;
                    }
                }
            }

            let score = -self.quiescence(&mut child, -beta, -alpha, ply + 1)?;
            drop(child);

            if score > alpha {
                if score >= beta {
                    return Some(beta);
                }
                alpha = score;
            }
        }

        if in_check && num_legal == 0 {
            return Some(Eval::mated_in(ply));
        }
        Some(alpha)
    }
}

fn set_pv(pv: &mut Vec<Move>, head: Move, tail: &[Move]) {
    pv.clear();
    pv.push(head);
    pv.extend_from_slice(tail);
}
