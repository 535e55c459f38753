//! Search configuration and reporting types for the move-sequence optimizer.
//!
//! The configuration mirrors the knobs of a classic generational genetic
//! algorithm: population size, generation budget, crossover and mutation
//! probabilities, tournament size and elitism.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{BoardConfig, BoardError, Move};

/// Flat integer genome.
///
/// Genes alternate row then column: gene `2i` is the row and gene `2i + 1`
/// the column of the `i`-th candidate move.
pub type Genome = Vec<usize>;

/// Top-level configuration for a search run.
///
/// In JSON the population and operator options are top-level keys
/// (`population_size`, `generations`, `crossover_prob`, `mutation_prob`,
/// `gene_mutation_prob`, `tournament_size`, `elite_size`); `board` and
/// `chain` stay nested. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "SearchConfigFile", into = "SearchConfigFile")]
pub struct SearchConfig {
    /// Board template every candidate is evaluated against.
    pub board: BoardConfig,
    /// Population and generation settings.
    pub population: PopulationConfig,
    /// Variation and selection operator settings.
    pub operators: GeneticOperatorsConfig,
    /// Chain reaction safety bound.
    pub chain: ChainConfig,
    /// Number of moves encoded by each genome.
    pub moves_per_individual: usize,
    /// Log aggregate statistics every N generations (0 disables).
    pub report_interval: usize,
    /// Random seed for reproducibility.
    pub random_seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfigFile::default().into()
    }
}

/// JSON layout of [`SearchConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchConfigFile {
    #[serde(default)]
    board: BoardConfig,
    #[serde(default = "default_population_size")]
    population_size: usize,
    #[serde(default = "default_generations")]
    generations: usize,
    #[serde(default = "default_crossover_prob")]
    crossover_prob: f64,
    #[serde(default = "default_mutation_prob")]
    mutation_prob: f64,
    #[serde(default = "default_gene_mutation_prob")]
    gene_mutation_prob: f64,
    #[serde(default = "default_tournament_size")]
    tournament_size: usize,
    #[serde(default = "default_elite_size")]
    elite_size: usize,
    #[serde(default)]
    chain: ChainConfig,
    #[serde(default = "default_moves_per_individual")]
    moves_per_individual: usize,
    #[serde(default = "default_report_interval")]
    report_interval: usize,
    #[serde(default)]
    random_seed: Option<u64>,
}

impl Default for SearchConfigFile {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            population_size: default_population_size(),
            generations: default_generations(),
            crossover_prob: default_crossover_prob(),
            mutation_prob: default_mutation_prob(),
            gene_mutation_prob: default_gene_mutation_prob(),
            tournament_size: default_tournament_size(),
            elite_size: default_elite_size(),
            chain: ChainConfig::default(),
            moves_per_individual: default_moves_per_individual(),
            report_interval: default_report_interval(),
            random_seed: None,
        }
    }
}

impl From<SearchConfigFile> for SearchConfig {
    fn from(file: SearchConfigFile) -> Self {
        Self {
            board: file.board,
            population: PopulationConfig {
                size: file.population_size,
                generations: file.generations,
            },
            operators: GeneticOperatorsConfig {
                crossover_prob: file.crossover_prob,
                mutation_prob: file.mutation_prob,
                gene_mutation_prob: file.gene_mutation_prob,
                tournament_size: file.tournament_size,
                elite_size: file.elite_size,
            },
            chain: file.chain,
            moves_per_individual: file.moves_per_individual,
            report_interval: file.report_interval,
            random_seed: file.random_seed,
        }
    }
}

impl From<SearchConfig> for SearchConfigFile {
    fn from(config: SearchConfig) -> Self {
        Self {
            board: config.board,
            population_size: config.population.size,
            generations: config.population.generations,
            crossover_prob: config.operators.crossover_prob,
            mutation_prob: config.operators.mutation_prob,
            gene_mutation_prob: config.operators.gene_mutation_prob,
            tournament_size: config.operators.tournament_size,
            elite_size: config.operators.elite_size,
            chain: config.chain,
            moves_per_individual: config.moves_per_individual,
            report_interval: config.report_interval,
            random_seed: config.random_seed,
        }
    }
}

fn default_moves_per_individual() -> usize {
    10
}
fn default_report_interval() -> usize {
    10
}

/// Population settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationConfig {
    /// Number of individuals per generation.
    pub size: usize,
    /// Number of generations to evolve after the initial population.
    pub generations: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: default_population_size(),
            generations: default_generations(),
        }
    }
}

fn default_population_size() -> usize {
    100
}
fn default_generations() -> usize {
    200
}

/// Genetic operator settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneticOperatorsConfig {
    /// Probability that a pair of offspring undergoes two-point crossover.
    pub crossover_prob: f64,
    /// Probability that an offspring is considered for mutation.
    pub mutation_prob: f64,
    /// Per-gene resampling probability inside a mutated offspring.
    pub gene_mutation_prob: f64,
    /// Individuals sampled per tournament.
    pub tournament_size: usize,
    /// Best individuals copied unchanged into the next generation.
    pub elite_size: usize,
}

impl Default for GeneticOperatorsConfig {
    fn default() -> Self {
        Self {
            crossover_prob: default_crossover_prob(),
            mutation_prob: default_mutation_prob(),
            gene_mutation_prob: default_gene_mutation_prob(),
            tournament_size: default_tournament_size(),
            elite_size: default_elite_size(),
        }
    }
}

fn default_crossover_prob() -> f64 {
    0.7
}
fn default_mutation_prob() -> f64 {
    0.2
}
fn default_gene_mutation_prob() -> f64 {
    0.2
}
fn default_tournament_size() -> usize {
    3
}
fn default_elite_size() -> usize {
    2
}

/// Safety bound on chain reactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    /// Maximum rotations a single top-level move may trigger.
    #[serde(default = "default_max_rotations_per_move")]
    pub max_rotations_per_move: u64,
    /// How a divergent evaluation is scored.
    #[serde(default)]
    pub divergence: DivergencePolicy,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_rotations_per_move: default_max_rotations_per_move(),
            divergence: DivergencePolicy::default(),
        }
    }
}

fn default_max_rotations_per_move() -> u64 {
    100_000
}

/// Fitness assigned when a chain hits the rotation bound.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DivergencePolicy {
    /// Score the rotations counted up to the bound.
    #[default]
    Truncate,
    /// Score zero.
    Penalize,
}

// ============================================================================
// Progress and Result Types
// ============================================================================

/// Aggregate fitness statistics for one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation index (0 is the initial population).
    pub generation: usize,
    /// Fitness evaluations performed this generation.
    pub evaluations: usize,
    pub min: u64,
    pub mean: f64,
    pub max: u64,
    pub std: f64,
}

impl GenerationStats {
    /// Summarize a set of fitness values.
    pub fn from_fitness(generation: usize, evaluations: usize, fitness: &[u64]) -> Self {
        if fitness.is_empty() {
            return Self {
                generation,
                evaluations,
                min: 0,
                mean: 0.0,
                max: 0,
                std: 0.0,
            };
        }

        let n = fitness.len() as f64;
        let mean = fitness.iter().map(|&f| f as f64).sum::<f64>() / n;
        let variance = fitness
            .iter()
            .map(|&f| (f as f64 - mean).powi(2))
            .sum::<f64>()
            / n;

        Self {
            generation,
            evaluations,
            min: fitness.iter().copied().min().unwrap_or(0),
            mean,
            max: fitness.iter().copied().max().unwrap_or(0),
            std: variance.sqrt(),
        }
    }
}

/// Generation-indexed statistics log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHistory {
    pub generations: Vec<GenerationStats>,
}

impl SearchHistory {
    /// Best-of-generation fitness per generation.
    pub fn max_fitness(&self) -> impl Iterator<Item = u64> + '_ {
        self.generations.iter().map(|g| g.max)
    }
}

/// Current phase of the search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Initializing,
    Evolving,
    Complete,
    Stopped,
}

/// Best individual found so far.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BestCandidate {
    /// Raw genome.
    pub genome: Genome,
    /// Valid moves decoded from the genome, in order.
    pub moves: Vec<Move>,
    /// Cached fitness (total rotations).
    pub fitness: u64,
    /// Generation in which it was first recorded.
    pub generation: usize,
    /// Whether its evaluation hit the chain bound.
    pub divergent: bool,
}

/// Progress update emitted after every evaluated generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchProgress {
    pub generation: usize,
    pub total_generations: usize,
    /// Best fitness seen so far.
    pub best_fitness: u64,
    /// Statistics of the current generation.
    pub stats: GenerationStats,
    pub phase: SearchPhase,
}

/// Final result of a search run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Best candidate across all generations.
    pub best: BestCandidate,
    /// Seed the random generator was created from.
    pub random_seed: u64,
    pub stats: SearchStats,
    pub history: SearchHistory,
}

/// Run-level statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchStats {
    /// Generations evolved after the initial population.
    pub generations: usize,
    pub total_evaluations: u64,
    pub best_fitness: u64,
    pub final_mean_fitness: f64,
    pub elapsed_seconds: f64,
    pub evaluations_per_second: f64,
    pub stop_reason: StopReason,
}

/// Reason the search stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Generation budget exhausted.
    MaxGenerations,
    /// Cancelled through the cancel handle.
    Cancelled,
}

/// Outcome of replaying the best move list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub recorded: u64,
    pub replayed: u64,
    pub consistent: bool,
}

// ============================================================================
// Validation
// ============================================================================

/// Search configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchConfigError {
    #[error("Population size must be positive")]
    PopulationEmpty,
    #[error("Moves per individual must be positive")]
    NoMoves,
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("Tournament size must be at least 1")]
    TournamentEmpty,
    #[error("Elite size {elite} must be smaller than population size {population}")]
    EliteTooLarge { elite: usize, population: usize },
    #[error("Chain rotation bound must be positive")]
    InvalidChainLimit,
    #[error("Board validation failed: {0}")]
    Board(#[from] BoardError),
}

/// Errors loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SearchConfig {
    /// Read a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Length of every genome.
    #[inline]
    pub fn genome_len(&self) -> usize {
        self.moves_per_individual * 2
    }

    /// Validate search configuration.
    pub fn validate(&self) -> Result<(), SearchConfigError> {
        self.board.validate()?;

        if self.population.size == 0 {
            return Err(SearchConfigError::PopulationEmpty);
        }
        if self.moves_per_individual == 0 {
            return Err(SearchConfigError::NoMoves);
        }

        let check_prob = |value: f64, name: &'static str| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(SearchConfigError::InvalidProbability { name, value })
            }
        };
        check_prob(self.operators.crossover_prob, "crossover_prob")?;
        check_prob(self.operators.mutation_prob, "mutation_prob")?;
        check_prob(self.operators.gene_mutation_prob, "gene_mutation_prob")?;

        if self.operators.tournament_size == 0 {
            return Err(SearchConfigError::TournamentEmpty);
        }
        if self.operators.elite_size >= self.population.size {
            return Err(SearchConfigError::EliteTooLarge {
                elite: self.operators.elite_size,
                population: self.population.size,
            });
        }
        if self.chain.max_rotations_per_move == 0 {
            return Err(SearchConfigError::InvalidChainLimit);
        }

        Ok(())
    }
}
