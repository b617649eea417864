use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use duelsweeper_core::*;
use std::hint::black_box;

fn bench_place_mines(c: &mut Criterion) {
    let mut group = c.benchmark_group("place_mines");
    for difficulty in Difficulty::ALL {
        let config = difficulty.board_config();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", difficulty)),
            &config,
            |b, config| {
                let mut seed = 0u64;
                b.iter(|| {
                    seed = seed.wrapping_add(1);
                    let mut board = Board::new(config.size).unwrap();
                    board.place_mines(RandomMineGenerator::new(seed), config.mines);
                    black_box(board)
                })
            },
        );
    }
    group.finish();
}

fn bench_cascade(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade");
    for size in [(16, 16), (64, 64), (100, 100)] {
        // a single mine in the far corner leaves one big zero region
        let mut board = Board::new(size).unwrap();
        board.place_mines(FixedMineGenerator::new([(size.0 - 1, size.1 - 1)]), 1);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size.0, size.1)),
            &board,
            |b, board| {
                b.iter(|| {
                    let mut board = board.clone();
                    black_box(board.reveal(Seat::First, (0, 0)).unwrap())
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_place_mines, bench_cascade);
criterion_main!(benches);
