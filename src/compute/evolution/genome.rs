//! Genome utilities for the move-sequence search.
//!
//! Provides decoding into moves, random generation, two-point crossover and
//! uniform integer mutation.

use std::ops::Range;

use rand::prelude::*;

use crate::compute::Board;
use crate::schema::{Genome, Move};

/// A genome paired with its cached fitness.
///
/// `fitness` is `None` whenever the genome content changed since it was last
/// evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Individual {
    pub genome: Genome,
    pub fitness: Option<u64>,
    /// Whether the cached fitness came from a chain that hit the bound.
    pub divergent: bool,
}

impl Individual {
    /// Unevaluated individual.
    pub fn new(genome: Genome) -> Self {
        Self {
            genome,
            fitness: None,
            divergent: false,
        }
    }

    #[inline]
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Drop the cached fitness.
    #[inline]
    pub fn invalidate(&mut self) {
        self.fitness = None;
        self.divergent = false;
    }

    /// Cached fitness, treating unevaluated individuals as zero.
    #[inline]
    pub fn score(&self) -> u64 {
        self.fitness.unwrap_or(0)
    }
}

/// Decode a genome into the valid moves it encodes, in order.
///
/// Consecutive genes form `(row, col)` pairs. Pairs that are out of bounds or
/// address a missing cell are dropped; a trailing unpaired gene is ignored.
pub fn decode(genome: &[usize], board: &Board) -> Vec<Move> {
    genome
        .chunks_exact(2)
        .map(|pair| Move::new(pair[0], pair[1]))
        .filter(|&mv| board.is_playable(mv))
        .collect()
}

/// Pick two-point crossover cut points for genomes of length `size`.
///
/// Draws `a` in `1..=size` and `b` in `1..size`; `b` is bumped past `a` when
/// it is not below it, otherwise the two are swapped. The result is always an
/// ascending, non-empty range inside `1..=size`. Requires `size >= 2`.
pub fn cut_points<R: Rng + ?Sized>(rng: &mut R, size: usize) -> Range<usize> {
    let a = rng.gen_range(1..=size);
    let b = rng.gen_range(1..size);
    normalize_cuts(a, b)
}

/// Order two raw cut draws into a segment.
#[inline]
pub fn normalize_cuts(a: usize, b: usize) -> Range<usize> {
    if b >= a { a..b + 1 } else { b..a }
}

/// Swap `segment` between two genomes in place.
pub fn swap_segment(first: &mut [usize], second: &mut [usize], segment: Range<usize>) {
    first[segment.clone()].swap_with_slice(&mut second[segment]);
}

/// Random number generator wrapper for genome operations.
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Genome of `len` genes alternating row and column draws.
    ///
    /// Even genes are uniform in `0..=max_row`, odd genes in `0..=max_col`.
    pub fn random_genome(&mut self, len: usize, max_row: usize, max_col: usize) -> Genome {
        (0..len)
            .map(|i| {
                let upper = if i % 2 == 0 { max_row } else { max_col };
                self.rng.gen_range(0..=upper)
            })
            .collect()
    }

    /// Bernoulli trial.
    #[inline]
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.r#gen::<f64>() < probability
    }

    /// Uniform index in `0..len`.
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Two-point crossover in place.
    ///
    /// Both individuals lose their cached fitness. Genomes shorter than two
    /// genes are left untouched.
    pub fn crossover(&mut self, first: &mut Individual, second: &mut Individual) {
        let size = first.genome.len().min(second.genome.len());
        if size < 2 {
            return;
        }
        let segment = cut_points(&mut self.rng, size);
        swap_segment(&mut first.genome, &mut second.genome, segment);
        first.invalidate();
        second.invalidate();
    }

    /// Resample each gene with probability `indpb` uniformly in `0..=upper`.
    ///
    /// Returns whether any gene changed; the cached fitness is dropped only in
    /// that case.
    pub fn mutate(&mut self, individual: &mut Individual, indpb: f64, upper: usize) -> bool {
        let mut changed = false;
        for gene in &mut individual.genome {
            if self.rng.r#gen::<f64>() < indpb {
                let value = self.rng.gen_range(0..=upper);
                changed |= value != *gene;
                *gene = value;
            }
        }
        if changed {
            individual.invalidate();
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BoardConfig;

    fn board(cells: Vec<Vec<i32>>) -> Board {
        Board::from_config(&BoardConfig::from_cells(cells)).unwrap()
    }

    #[test]
    fn test_decode_drops_invalid_pairs() {
        let board = board(vec![vec![0, -1, 0], vec![0, 0, 0]]);
        // (0,1) missing, (2,0) row out of range, (1,2) valid, (0,0) valid.
        let genome = vec![0, 1, 2, 0, 1, 2, 0, 0];
        assert_eq!(decode(&genome, &board), vec![Move::new(1, 2), Move::new(0, 0)]);
    }

    #[test]
    fn test_decode_keeps_duplicates_and_order() {
        let board = board(vec![vec![0, 0], vec![0, 0]]);
        let genome = vec![1, 1, 0, 0, 1, 1];
        let moves = decode(&genome, &board);
        assert_eq!(moves, vec![Move::new(1, 1), Move::new(0, 0), Move::new(1, 1)]);
        assert_eq!(decode(&genome, &board), moves);
    }

    #[test]
    fn test_decode_all_missing() {
        let board = board(vec![vec![-1, 0], vec![0, -1]]);
        assert!(decode(&[0, 0, 1, 1, 0, 0], &board).is_empty());
    }

    #[test]
    fn test_random_genome_bounds() {
        let mut rng = GenomeRng::new(42);
        let genome = rng.random_genome(200, 4, 4);
        assert_eq!(genome.len(), 200);
        assert!(genome.iter().all(|&g| g <= 4));
        assert!(genome.contains(&0));
        assert!(genome.contains(&4));
    }

    #[test]
    fn test_random_genome_uses_axis_bounds() {
        let mut rng = GenomeRng::new(1);
        let genome = rng.random_genome(400, 0, 7);
        assert!(genome.iter().step_by(2).all(|&row| row == 0));
        assert!(genome.iter().skip(1).step_by(2).all(|&col| col <= 7));
        assert!(genome.iter().skip(1).step_by(2).any(|&col| col == 7));

        // Every pair of a fully populated 1x8 board decodes.
        let strip = board(vec![vec![0; 8]]);
        assert_eq!(decode(&genome, &strip).len(), 200);
    }

    #[test]
    fn test_seeded_rng_reproducible() {
        let mut a = GenomeRng::new(7);
        let mut b = GenomeRng::new(7);
        assert_eq!(a.random_genome(20, 9, 3), b.random_genome(20, 9, 3));
        assert_eq!(a.index(1000), b.index(1000));
    }

    #[test]
    fn test_normalize_cuts() {
        assert_eq!(normalize_cuts(2, 3), 2..4);
        assert_eq!(normalize_cuts(3, 3), 3..4);
        assert_eq!(normalize_cuts(4, 1), 1..4);
    }

    #[test]
    fn test_cut_points_always_ascending_and_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        for size in 2..12 {
            for _ in 0..200 {
                let segment = cut_points(&mut rng, size);
                assert!(segment.start >= 1);
                assert!(segment.start < segment.end);
                assert!(segment.end <= size);
            }
        }
    }

    #[test]
    fn test_swap_segment() {
        let mut a = vec![0, 1, 2, 3, 4];
        let mut b = vec![5, 6, 7, 8, 9];
        swap_segment(&mut a, &mut b, 1..3);
        assert_eq!(a, vec![0, 6, 7, 3, 4]);
        assert_eq!(b, vec![5, 1, 2, 8, 9]);
    }

    #[test]
    fn test_crossover_preserves_genes_per_position() {
        let mut rng = GenomeRng::new(3);
        let mut a = Individual::new(vec![0; 10]);
        let mut b = Individual::new(vec![1; 10]);
        a.fitness = Some(5);
        b.fitness = Some(6);

        rng.crossover(&mut a, &mut b);

        assert_eq!(a.genome.len(), 10);
        assert_eq!(b.genome.len(), 10);
        for i in 0..10 {
            assert_eq!(a.genome[i] + b.genome[i], 1);
        }
        assert_eq!(a.genome[0], 0);
        assert!(a.genome.contains(&1));
        assert!(!a.is_evaluated());
        assert!(!b.is_evaluated());
    }

    #[test]
    fn test_mutation_bounds_and_invalidation() {
        let mut rng = GenomeRng::new(11);
        let mut individual = Individual::new(vec![0; 50]);
        individual.fitness = Some(3);

        assert!(rng.mutate(&mut individual, 1.0, 3));
        assert!(individual.genome.iter().all(|&g| g <= 3));
        assert!(!individual.is_evaluated());
    }

    #[test]
    fn test_mutation_without_change_keeps_fitness() {
        let mut rng = GenomeRng::new(11);
        let mut individual = Individual::new(vec![2; 8]);
        individual.fitness = Some(9);

        assert!(!rng.mutate(&mut individual, 0.0, 3));
        assert_eq!(individual.fitness, Some(9));

        // A single-value gene range can never change.
        let mut fixed = Individual::new(vec![0; 8]);
        fixed.fitness = Some(4);
        assert!(!rng.mutate(&mut fixed, 1.0, 0));
        assert_eq!(fixed.fitness, Some(4));
    }
}
