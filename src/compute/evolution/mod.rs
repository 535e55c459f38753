//! Evolutionary search for move sequences that maximize chain rotations.
//!
//! # Overview
//!
//! - **Genomes** (`genome`): flat integer genomes, decoding into moves,
//!   two-point crossover and uniform integer mutation
//! - **Fitness** (`fitness`): decode + simulate on a fresh board copy
//! - **Search** (`search`): generational GA with tournament selection and
//!   elitism
//!
//! # Example
//!
//! ```rust,no_run
//! use dial_chain::schema::SearchConfig;
//! use dial_chain::compute::evolution::SearchEngine;
//!
//! let config = SearchConfig {
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let mut engine = SearchEngine::new(config).expect("valid config");
//! let result = engine.run_with_callback(|progress| {
//!     println!("Generation {}: best = {}", progress.generation, progress.best_fitness);
//! });
//!
//! println!("Best moves: {:?}", result.best.moves);
//! assert!(engine.verify(&result).consistent);
//! ```

mod fitness;
mod genome;
mod search;

pub use fitness::{Evaluation, FitnessEvaluator};
pub use genome::{GenomeRng, Individual, cut_points, decode, normalize_cuts, swap_segment};
pub use search::SearchEngine;
