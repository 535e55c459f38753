//! Quick search performance test

use dial_chain::{
    SearchEngine,
    schema::{BoardConfig, GeneticOperatorsConfig, PopulationConfig, SearchConfig},
};
use std::time::Instant;

/// Fully populated square board with every dial pointing up.
fn open_board(size: usize) -> BoardConfig {
    BoardConfig::from_cells(vec![vec![0; size]; size])
}

fn main() {
    println!("=== Search Performance Test ===\n");

    // Test different board sizes
    for board_size in [4, 8, 16] {
        println!("Board size: {}x{}", board_size, board_size);

        let config = SearchConfig {
            board: open_board(board_size),
            population: PopulationConfig {
                size: 100,
                generations: 50,
            },
            operators: GeneticOperatorsConfig {
                crossover_prob: 0.7,
                mutation_prob: 0.2,
                gene_mutation_prob: 0.2,
                tournament_size: 3,
                elite_size: 2,
            },
            moves_per_individual: 20,
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let mut engine = match SearchEngine::new(config) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("Invalid configuration: {}", e);
                return;
            }
        };
        let result = engine.run();
        let elapsed = start.elapsed();

        let total_evals = result.stats.total_evaluations;
        let evals_per_sec = total_evals as f64 / elapsed.as_secs_f64();

        println!("  Generations:    {}", result.stats.generations);
        println!("  Evaluations:    {}", total_evals);
        println!("  Elapsed:        {:.2}s", elapsed.as_secs_f64());
        println!("  Evals/sec:      {:.1}", evals_per_sec);
        println!("  Best fitness:   {}", result.stats.best_fitness);
        println!("  Verified:       {}", engine.verify(&result).consistent);
        println!();
    }

    println!("=== Scalability Test (fixed 8x8 board) ===\n");

    // Test different population sizes
    for pop_size in [25, 50, 100, 200] {
        let config = SearchConfig {
            board: open_board(8),
            population: PopulationConfig {
                size: pop_size,
                generations: 20,
            },
            moves_per_individual: 20,
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let Ok(mut engine) = SearchEngine::new(config) else {
            continue;
        };
        let result = engine.run();
        let elapsed = start.elapsed();

        let total_evals = result.stats.total_evaluations;
        let evals_per_sec = total_evals as f64 / elapsed.as_secs_f64();

        println!(
            "Population {}: {} evals in {:.2}s ({:.1} evals/sec)",
            pop_size,
            total_evals,
            elapsed.as_secs_f64(),
            evals_per_sec
        );
    }
}
