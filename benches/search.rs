use std::sync::{atomic::AtomicBool, Arc};
use std::time::Instant;

use chess_search::{search, Position, SearchParams, TranspositionTable, MOVE_GEN, POSITION_EVALUATOR};
use criterion::{criterion_group, criterion_main, Criterion};

const SEARCH_BENCHMARK_FENS_AND_DEPTHS: &[(&str, u8, &str)] = &[
    (
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        6,
        "starting position",
    ),
    (
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        5,
        "middlegame",
    ),
    ("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", 8, "endgame"),
];

pub fn benchmark_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(15);

    for (fen, depth, position_name) in SEARCH_BENCHMARK_FENS_AND_DEPTHS.iter() {
        let mut pos = Position::from_fen(fen).unwrap();
        let bench_name = format!("search {}", position_name);
        let search_params = SearchParams {
            max_depth: Some(*depth),
            ..SearchParams::default()
        };

        group.bench_function(&bench_name, |b| {
            b.iter_custom(|iters| {
                let start = Instant::now();
                let mut total_nodes = 0;

                for _ in 0..iters {
                    let mut table = TranspositionTable::default();
                    let search_result = search(
                        &mut pos,
                        &search_params,
                        MOVE_GEN,
                        POSITION_EVALUATOR,
                        &mut table,
                        Arc::new(AtomicBool::new(false)),
                    )
                    .unwrap();
                    total_nodes += search_result.stats.nodes + search_result.stats.qnodes;
                }

                let elapsed = start.elapsed();
                let nps = total_nodes as f64 / elapsed.as_secs_f64();
                println!("{} (depth {}): {:.0} nodes/second", &bench_name, depth, nps);

                elapsed
            })
        });
    }
}

criterion_group!(benches, benchmark_search);
criterion_main!(benches);
