use std::env;
use std::fs;

use anyhow::{bail, Context, Result};
use rand::seq::SliceRandom;

use fourchess::engine::Board;
use fourchess::game::replay_standard_game;

fn random_game(max_plies: usize) -> Board {
    let mut board = Board::standard_setup();
    let mut rng = rand::thread_rng();
    for _ in 0..max_plies {
        let moves = board.all_legal_moves();
        let choice = match moves.choose(&mut rng) {
            Some(choice) => choice.clone(),
            None => break,
        };
        board.make_move(&choice).expect("legal move applies");
        board.mark_ends_game();
        if board.last_move().and_then(|_move| _move.ends_game()) == Some(true) {
            break;
        }
    }
    board
}

fn main() -> Result<()> {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).
    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("replay") => {
            let path = args
                .get(2)
                .context("usage: fourchess replay <log-file>")?;
            let text =
                fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            let (mut board, moves) = replay_standard_game(&text)?;
            println!("{board}");
            println!("Moves played: {}", moves.len());
            println!("Result: {:?}", board.game_result());
        }
        Some("random") => {
            let max_plies = match args.get(2) {
                Some(count) => count.parse().context("max-plies must be a number")?,
                None => 200,
            };
            let mut board = random_game(max_plies);
            println!("{board}");
            println!("Moves played: {}", board.move_history().len());
            println!("Result: {:?}", board.game_result());
        }
        _ => bail!("usage: fourchess replay <log-file> | fourchess random [max-plies]"),
    }
    Ok(())
}
