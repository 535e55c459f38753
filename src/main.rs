//! Dial chain CLI - Search for move sequences from JSON configuration.

use std::path::PathBuf;
use std::time::Instant;

use dial_chain::{
    compute::{Board, evolution::SearchEngine},
    schema::{Move, SearchConfig},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    match args[1].as_str() {
        "--example" => print_example_config(),
        "--play" => {
            let Some(path) = args.get(2) else {
                print_usage(&args[0]);
                std::process::exit(1);
            };
            play(&load_config(path), &args[3..]);
        }
        path => {
            let mut config = load_config(path);
            if let Some(generations) = args.get(2).and_then(|s| s.parse().ok()) {
                config.population.generations = generations;
            }
            search(config);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <config.json> [generations]", program);
    eprintln!("       {} --play <config.json> <row,col> [row,col ...]", program);
    eprintln!("       {} --example", program);
    eprintln!();
    eprintln!("Search for the dial move sequence that triggers the most rotations.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  config.json  Path to search configuration file");
    eprintln!("  generations  Override the configured generation budget");
    eprintln!("  --play       Run the given moves once and print the board");
    eprintln!("  --example    Print an example configuration");
}

fn load_config(path: &str) -> SearchConfig {
    let config_path = PathBuf::from(path);
    SearchConfig::from_json_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Error loading {}: {}", config_path.display(), e);
        std::process::exit(1);
    })
}

fn parse_move(arg: &str) -> Option<Move> {
    let (row, col) = arg.split_once(',')?;
    Some(Move::new(row.trim().parse().ok()?, col.trim().parse().ok()?))
}

/// Play `moves` on `board`, warning on divergence. Returns the rotations counted.
fn replay(board: &mut Board, moves: &[Move], limit: u64) -> u64 {
    match board.play(moves, limit) {
        Ok(total) => total,
        Err(divergent) => {
            eprintln!("Warning: {}", divergent);
            divergent.rotations
        }
    }
}

fn play(config: &SearchConfig, args: &[String]) {
    let mut board = Board::from_config(&config.board).unwrap_or_else(|e| {
        eprintln!("Invalid board: {}", e);
        std::process::exit(1);
    });

    let moves: Vec<Move> = args
        .iter()
        .map(|arg| {
            parse_move(arg).unwrap_or_else(|| {
                eprintln!("Invalid move '{}', expected row,col", arg);
                std::process::exit(1);
            })
        })
        .collect();

    println!("Initial board:");
    print!("{}", board);
    println!();

    let total = replay(&mut board, &moves, config.chain.max_rotations_per_move);

    println!("Board after moves:");
    print!("{}", board);
    println!();
    println!("Total rotations: {}", total);
}

fn search(config: SearchConfig) {
    let limit = config.chain.max_rotations_per_move;
    let generations = config.population.generations;

    let mut engine = SearchEngine::new(config).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    println!("Dial Chain Search");
    println!("=================");
    println!(
        "Board: {}x{} ({} dials)",
        engine.board().rows(),
        engine.board().cols(),
        engine.board().dial_count()
    );
    println!("Generations: {}", generations);
    println!("Seed: {}", engine.seed());
    println!();

    let start = Instant::now();
    let report_every = (generations / 10).max(1);
    let result = engine.run_with_callback(|progress| {
        if progress.generation % report_every == 0 || progress.generation == generations {
            println!(
                "  Gen {}/{}: best={}, max={}, mean={:.2}, min={}",
                progress.generation,
                progress.total_generations,
                progress.best_fitness,
                progress.stats.max,
                progress.stats.mean,
                progress.stats.min
            );
        }
    });
    let elapsed = start.elapsed();

    let moves: Vec<String> = result.best.moves.iter().map(Move::to_string).collect();
    println!();
    println!("Best genome: {:?}", result.best.genome);
    println!("Best moves: [{}]", moves.join(", "));
    println!("Best score: {}", result.best.fitness);
    if result.best.divergent {
        println!("  (chain hit the rotation bound)");
    }

    let verification = engine.verify(&result);
    println!(
        "Verification: replay={} ({})",
        verification.replayed,
        if verification.consistent {
            "consistent"
        } else {
            "MISMATCH"
        }
    );

    let mut board = engine.board().clone();
    replay(&mut board, &result.best.moves, limit);
    println!();
    println!("Board after best moves:");
    print!("{}", board);

    println!();
    println!(
        "Time: {:.2}s ({} evaluations, {:.0} evals/s, stopped: {:?})",
        elapsed.as_secs_f32(),
        result.stats.total_evaluations,
        result.stats.evaluations_per_second,
        result.stats.stop_reason
    );
}

fn print_example_config() {
    let config = SearchConfig {
        random_seed: Some(42),
        ..Default::default()
    };

    println!("Example configuration (config.json):");
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|e| e.to_string())
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use dial_chain::schema::BoardConfig;

    fn open_board() -> Board {
        Board::from_config(&BoardConfig::from_cells(vec![vec![0, 0], vec![0, 0]])).unwrap()
    }

    #[test]
    fn test_parse_move() {
        assert_eq!(parse_move("2,3"), Some(Move::new(2, 3)));
        assert_eq!(parse_move(" 1 , 0 "), Some(Move::new(1, 0)));
        assert_eq!(parse_move("1"), None);
        assert_eq!(parse_move("a,b"), None);
    }

    #[test]
    fn test_replay_counts_rotations() {
        let mut board = open_board();
        assert_eq!(replay(&mut board, &[Move::new(0, 0)], 1_000), 2);
        assert_eq!(board.to_codes(), vec![vec![1, 1], vec![0, 0]]);
    }

    #[test]
    fn test_replay_keeps_truncated_total_on_divergence() {
        let mut board = open_board();
        let moves = [Move::new(1, 1), Move::new(0, 0), Move::new(1, 0)];
        assert_eq!(replay(&mut board, &moves, 1), 2);
        // Play stops at the capped move; the last move never runs.
        assert_eq!(board.direction(1, 0), Some(dial_chain::compute::Direction::Up));
    }
}
