//! Generational genetic algorithm over move-sequence genomes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;

use crate::compute::Board;
use crate::schema::{
    BestCandidate, GenerationStats, SearchConfig, SearchConfigError, SearchHistory, SearchPhase,
    SearchProgress, SearchResult, SearchStats, StopReason, Verification,
};

use super::fitness::FitnessEvaluator;
use super::genome::{GenomeRng, Individual, decode};

/// Evolution engine that runs the search.
///
/// One generation transition evaluates every individual without a cached
/// fitness, records statistics and the best individual, then builds the next
/// population from elites plus tournament-selected, crossed and mutated
/// offspring. All randomness comes from a single seeded generator on the
/// calling thread; only fitness evaluation runs in parallel.
pub struct SearchEngine {
    config: SearchConfig,
    seed: u64,
    rng: GenomeRng,
    evaluator: FitnessEvaluator,
    population: Vec<Individual>,
    history: SearchHistory,
    generation: usize,
    best: Option<BestCandidate>,
    evaluations: u64,
    cancelled: Arc<AtomicBool>,
}

impl SearchEngine {
    /// Create a new search engine, validating the configuration.
    pub fn new(config: SearchConfig) -> Result<Self, SearchConfigError> {
        config.validate()?;
        let board = Board::from_config(&config.board)?;

        let seed = config.random_seed.unwrap_or_else(rand::random);
        let evaluator = FitnessEvaluator::new(board, config.chain.clone());

        Ok(Self {
            rng: GenomeRng::new(seed),
            seed,
            evaluator,
            population: Vec::new(),
            history: SearchHistory::default(),
            generation: 0,
            best: None,
            evaluations: 0,
            cancelled: Arc::new(AtomicBool::new(false)),
            config,
        })
    }

    /// Get cancellation handle.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Seed the random generator was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn board(&self) -> &Board {
        self.evaluator.board()
    }

    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn best(&self) -> Option<&BestCandidate> {
        self.best.as_ref()
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Largest gene value a mutation may draw.
    fn gene_upper(&self) -> usize {
        self.board().max_coordinate()
    }

    /// Create and evaluate a random initial population (generation 0).
    pub fn initialize(&mut self) {
        let len = self.config.genome_len();
        let max_row = self.board().rows() - 1;
        let max_col = self.board().cols() - 1;

        self.population = (0..self.config.population.size)
            .map(|_| Individual::new(self.rng.random_genome(len, max_row, max_col)))
            .collect();
        self.history = SearchHistory::default();
        self.generation = 0;
        self.best = None;
        self.evaluations = 0;

        let evaluated = self.evaluate_population();
        self.record_generation(evaluated);
    }

    /// Evolve one generation and evaluate it.
    pub fn next_generation(&mut self) {
        self.step_generation();
        let evaluated = self.evaluate_population();
        self.record_generation(evaluated);
    }

    /// Evaluate every individual lacking a cached fitness, in parallel.
    ///
    /// Returns the number of evaluations performed.
    fn evaluate_population(&mut self) -> usize {
        let evaluator = &self.evaluator;
        let pending = self
            .population
            .iter()
            .filter(|ind| !ind.is_evaluated())
            .count();

        self.population
            .par_iter_mut()
            .filter(|ind| !ind.is_evaluated())
            .for_each(|ind| {
                let evaluation = evaluator.evaluate(&ind.genome);
                ind.fitness = Some(evaluation.fitness);
                ind.divergent = evaluation.divergent;
            });

        self.evaluations += pending as u64;
        pending
    }

    /// Record statistics and track the best individual of the current generation.
    fn record_generation(&mut self, evaluated: usize) {
        let fitness: Vec<u64> = self.population.iter().map(Individual::score).collect();
        let stats = GenerationStats::from_fitness(self.generation, evaluated, &fitness);

        // First index wins ties.
        let mut leader = 0;
        for (idx, &f) in fitness.iter().enumerate() {
            if f > fitness[leader] {
                leader = idx;
            }
        }

        let improved = self
            .best
            .as_ref()
            .is_none_or(|best| fitness[leader] > best.fitness);
        if improved && let Some(champion) = self.population.get(leader) {
            let moves = decode(&champion.genome, self.evaluator.board());
            log::debug!(
                "Generation {}: new best fitness {} ({} valid moves)",
                self.generation,
                fitness[leader],
                moves.len()
            );
            self.best = Some(BestCandidate {
                genome: champion.genome.clone(),
                moves,
                fitness: fitness[leader],
                generation: self.generation,
                divergent: champion.divergent,
            });
        }

        let interval = self.config.report_interval;
        if interval > 0 && self.generation % interval == 0 {
            log::info!(
                "gen {:>4}  evals {:>4}  min {:>5}  mean {:>8.2}  max {:>5}  std {:>7.2}",
                stats.generation,
                stats.evaluations,
                stats.min,
                stats.mean,
                stats.max,
                stats.std
            );
        }

        self.history.generations.push(stats);
    }

    /// Build the next population: elites, then selected and varied offspring.
    fn step_generation(&mut self) {
        let size = self.config.population.size;
        let ops = self.config.operators.clone();
        let upper = self.gene_upper();

        // Stable sort keeps original order among equal fitness.
        let mut ranked: Vec<usize> = (0..self.population.len()).collect();
        ranked.sort_by(|&a, &b| self.population[b].score().cmp(&self.population[a].score()));

        let mut next_gen: Vec<Individual> = ranked
            .iter()
            .take(ops.elite_size)
            .map(|&idx| self.population[idx].clone())
            .collect();

        let mut offspring: Vec<Individual> = (0..size - next_gen.len())
            .map(|_| {
                let idx = self.select_index(ops.tournament_size);
                self.population[idx].clone()
            })
            .collect();

        // Crossover on consecutive pairs
        for pair in offspring.chunks_exact_mut(2) {
            if self.rng.chance(ops.crossover_prob) {
                let (first, second) = pair.split_at_mut(1);
                self.rng.crossover(&mut first[0], &mut second[0]);
            }
        }

        // Mutation
        for child in &mut offspring {
            if self.rng.chance(ops.mutation_prob) {
                self.rng.mutate(child, ops.gene_mutation_prob, upper);
            }
        }

        next_gen.append(&mut offspring);
        self.population = next_gen;
        self.generation += 1;
    }

    /// Tournament selection: fittest of `size` uniform draws with replacement.
    ///
    /// The earliest drawn aspirant wins ties.
    fn select_index(&mut self, size: usize) -> usize {
        let len = self.population.len();
        let mut best_idx = self.rng.index(len);
        for _ in 1..size {
            let idx = self.rng.index(len);
            if self.population[idx].score() > self.population[best_idx].score() {
                best_idx = idx;
            }
        }
        best_idx
    }

    /// Get current progress.
    pub fn progress(&self) -> SearchProgress {
        let stats = self.history.generations.last().cloned().unwrap_or_else(|| {
            GenerationStats::from_fitness(self.generation, 0, &[])
        });

        let phase = if self.history.generations.is_empty() {
            SearchPhase::Initializing
        } else if self.cancelled.load(Ordering::Relaxed) {
            SearchPhase::Stopped
        } else if self.generation >= self.config.population.generations {
            SearchPhase::Complete
        } else {
            SearchPhase::Evolving
        };

        SearchProgress {
            generation: self.generation,
            total_generations: self.config.population.generations,
            best_fitness: self.best.as_ref().map_or(0, |b| b.fitness),
            stats,
            phase,
        }
    }

    /// Check if the search should stop.
    fn should_stop(&self) -> Option<StopReason> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Some(StopReason::Cancelled);
        }

        if self.generation >= self.config.population.generations {
            return Some(StopReason::MaxGenerations);
        }

        None
    }

    /// Run the search with a progress callback invoked after every generation.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> SearchResult
    where
        F: FnMut(&SearchProgress),
    {
        let start_time = Instant::now();
        log::info!(
            "Searching {}x{} board: population {}, {} generations, {} moves per individual, seed {}",
            self.board().rows(),
            self.board().cols(),
            self.config.population.size,
            self.config.population.generations,
            self.config.moves_per_individual,
            self.seed
        );

        self.initialize();
        callback(&self.progress());

        let stop_reason = loop {
            if let Some(reason) = self.should_stop() {
                break reason;
            }

            self.next_generation();
            callback(&self.progress());
        };

        if stop_reason == StopReason::Cancelled {
            log::info!("Search cancelled after generation {}", self.generation);
        }

        let elapsed = start_time.elapsed().as_secs_f64();
        let best = self.best.clone().unwrap_or_default();
        let final_mean_fitness = self
            .history
            .generations
            .last()
            .map_or(0.0, |stats| stats.mean);

        SearchResult {
            stats: SearchStats {
                generations: self.generation,
                total_evaluations: self.evaluations,
                best_fitness: best.fitness,
                final_mean_fitness,
                elapsed_seconds: elapsed,
                evaluations_per_second: self.evaluations as f64 / elapsed.max(f64::EPSILON),
                stop_reason,
            },
            best,
            random_seed: self.seed,
            history: self.history.clone(),
        }
    }

    /// Run the search (blocking).
    pub fn run(&mut self) -> SearchResult {
        self.run_with_callback(|_| {})
    }

    /// Replay the best decoded moves on a fresh board and compare fitness.
    pub fn verify(&self, result: &SearchResult) -> Verification {
        self.evaluator.verify(&result.best.moves, result.best.fitness)
    }
}
