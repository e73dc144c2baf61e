use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fourchess::engine::Board;

fn perft(board: &mut Board, depth: usize) -> usize {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0;
    for _move in board.all_legal_moves() {
        board.make_move(&_move).expect("legal move applies");
        nodes += perft(board, depth - 1);
        board.undo_move().expect("history is non-empty");
    }
    nodes
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("legal moves from start", |b| {
        let mut board = Board::standard_setup();
        b.iter(|| black_box(&mut board).all_legal_moves())
    });
    c.bench_function("perft 2", |b| {
        let mut board = Board::standard_setup();
        b.iter(|| perft(black_box(&mut board), 2))
    });
    c.bench_function("random game 50", |b| {
        b.iter(|| {
            use rand::seq::SliceRandom;
            let mut rng = rand::thread_rng();
            let mut board = Board::standard_setup();
            for _ in 0..50 {
                let moves = board.all_legal_moves();
                let choice = match moves.choose(&mut rng) {
                    Some(choice) => choice.clone(),
                    None => break,
                };
                board.make_move(&choice).expect("legal move applies");
            }
            board
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
