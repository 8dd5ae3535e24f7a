use std::fmt::Display;
use std::time::{Duration, Instant};

use tabled::{Table, Tabled};

use crate::move_gen::{GenerateMoves, MOVE_GEN};
use crate::position::{Move, Piece, Position};

/// Counts of the legal moves found at one depth of a perft traversal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Tabled)]
pub struct PerftDepthResult {
    pub depth: usize,
    pub nodes: u64,
    pub captures: u64,
    pub en_passants: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub checkmates: u64,
}

pub struct PerftResult {
    pub depth_results: Vec<PerftDepthResult>,
    pub tot_nodes: u64,
    pub time_elapsed: Duration,
    pub nodes_per_second: f64,
}

impl Display for PerftResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "total nodes: {}", self.tot_nodes)?;
        writeln!(f, "time elapsed: {}", self.time_elapsed.as_secs_f32())?;
        writeln!(f, "nodes/s: {:.0}", self.nodes_per_second)?;
        writeln!(f, "{}", Table::new(&self.depth_results))?;
        Ok(())
    }
}

/// Number of leaf nodes of the legal move tree `depth` plies deep.
pub fn perft(position: &mut Position, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = MOVE_GEN.gen_legal_moves(position);
    if depth == 1 {
        return moves.len() as u64;
    }
    moves
        .into_iter()
        .map(|mve| perft(&mut position.play(mve), depth - 1))
        .sum()
}

/// Leaf counts below each root move, in generation order.
pub fn perft_divide(position: &mut Position, depth: usize) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    MOVE_GEN
        .gen_legal_moves(position)
        .into_iter()
        .map(|mve| (mve, perft(&mut position.play(mve), depth - 1)))
        .collect()
}

/// Perft with a breakdown of the move kinds found at every depth.
pub fn perft_detailed(position: &mut Position, depth: usize) -> PerftResult {
    let mut depth_results: Vec<PerftDepthResult> = (1..=depth)
        .map(|depth| PerftDepthResult {
            depth,
            ..Default::default()
        })
        .collect();

    let start = Instant::now();
    perft_helper(&mut depth_results, position, 0);
    let time_elapsed = start.elapsed();

    let tot_nodes = depth_results.iter().map(|res| res.nodes).sum();
    let nodes_per_second = tot_nodes as f64 / time_elapsed.as_secs_f64().max(1e-9);

    PerftResult {
        depth_results,
        tot_nodes,
        time_elapsed,
        nodes_per_second,
    }
}

fn perft_helper(depth_results: &mut [PerftDepthResult], position: &mut Position, curr_depth: usize) {
    if curr_depth == depth_results.len() {
        return;
    }

    let moves = MOVE_GEN.gen_legal_moves(position);
    for mve in moves {
        let (is_en_passant, is_castle) = match position.is_piece_at(mve.src) {
            Some((Piece::Pawn, _)) => (Some(mve.dest) == position.state.en_passant_target, false),
            Some((Piece::King, _)) => (false, mve.src.file().abs_diff(mve.dest.file()) == 2),
            _ => (false, false),
        };

        let mut child = position.play(mve);
        let gives_check = child.in_check();
        let is_checkmate = gives_check && MOVE_GEN.gen_legal_moves(&mut child).is_empty();

        let curr_res = &mut depth_results[curr_depth];
        curr_res.nodes += 1;
        curr_res.captures += u64::from(mve.is_capture());
        curr_res.en_passants += u64::from(is_en_passant);
        curr_res.castles += u64::from(is_castle);
        curr_res.promotions += u64::from(mve.is_promotion());
        curr_res.checks += u64::from(gives_check);
        curr_res.checkmates += u64::from(is_checkmate);

        perft_helper(depth_results, &mut child, curr_depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::Square::*;
    use test_case::test_case;
    use testresult::TestResult;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    #[test_case(1, 20)]
    #[test_case(2, 400)]
    #[test_case(3, 8902)]
    fn test_perft_start(depth: usize, want: u64) {
        assert_eq!(perft(&mut Position::start(), depth), want);
    }

    #[test]
    fn test_detailed_start() {
        let res = perft_detailed(&mut Position::start(), 3);
        let want = vec![
            PerftDepthResult { depth: 1, nodes: 20, ..Default::default() },
            PerftDepthResult { depth: 2, nodes: 400, ..Default::default() },
            PerftDepthResult { depth: 3, nodes: 8902, captures: 34, checks: 12, ..Default::default() },
        ];
        assert_eq!(res.depth_results, want);
        assert_eq!(res.tot_nodes, 20 + 400 + 8902);
    }

    #[test]
    fn test_detailed_kiwipete() -> TestResult {
        let mut position = Position::from_fen(KIWIPETE)?;
        let res = perft_detailed(&mut position, 2);
        let want = vec![
            PerftDepthResult { depth: 1, nodes: 48, captures: 8, castles: 2, ..Default::default() },
            PerftDepthResult {
                depth: 2,
                nodes: 2039,
                captures: 351,
                en_passants: 1,
                castles: 91,
                checks: 3,
                ..Default::default()
            },
        ];
        assert_eq!(res.depth_results, want);
        assert!(res.to_string().contains("total nodes: 2087"));
        Ok(())
    }

    #[test]
    fn test_divide_sums_to_perft() -> TestResult {
        let mut position = Position::from_fen(KIWIPETE)?;
        let divided = perft_divide(&mut position, 2);
        assert_eq!(divided.len(), 48);
        assert_eq!(divided.iter().map(|(_, nodes)| nodes).sum::<u64>(), 2039);

        let castle = divided
            .iter()
            .find(|(mve, _)| *mve == Move::new(E1, G1))
            .map(|&(_, nodes)| nodes);
        assert_eq!(castle, Some(43));
        Ok(())
    }
}
