//! Fitness evaluation: decode a genome and count the rotations it triggers.

use std::sync::Arc;

use crate::compute::{Board, simulate};
use crate::schema::{ChainConfig, DivergencePolicy, Move, Verification};

use super::genome::decode;

/// Evaluates genomes against a fixed board template.
///
/// Holds no mutable state; each call simulates on a private copy of the
/// template, so evaluations may run in any order or in parallel.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    board: Arc<Board>,
    chain: ChainConfig,
}

/// Result of evaluating one genome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Fitness after applying the divergence policy.
    pub fitness: u64,
    /// Rotations actually counted (truncated when divergent).
    pub rotations: u64,
    /// Valid moves decoded from the genome.
    pub moves: Vec<Move>,
    pub divergent: bool,
}

impl FitnessEvaluator {
    /// Create a new fitness evaluator.
    pub fn new(board: Board, chain: ChainConfig) -> Self {
        Self {
            board: Arc::new(board),
            chain,
        }
    }

    /// The board template.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Decode and simulate a genome.
    pub fn evaluate(&self, genome: &[usize]) -> Evaluation {
        let moves = decode(genome, &self.board);
        self.evaluate_moves(moves)
    }

    /// Simulate an already decoded move list.
    pub fn evaluate_moves(&self, moves: Vec<Move>) -> Evaluation {
        match simulate(&self.board, &moves, self.chain.max_rotations_per_move) {
            Ok(rotations) => Evaluation {
                fitness: rotations,
                rotations,
                moves,
                divergent: false,
            },
            Err(divergent) => {
                log::debug!("{divergent}");
                let fitness = match self.chain.divergence {
                    DivergencePolicy::Truncate => divergent.rotations,
                    DivergencePolicy::Penalize => 0,
                };
                Evaluation {
                    fitness,
                    rotations: divergent.rotations,
                    moves,
                    divergent: true,
                }
            }
        }
    }

    /// Replay `moves` and compare against a recorded fitness.
    pub fn verify(&self, moves: &[Move], recorded: u64) -> Verification {
        let replayed = self.evaluate_moves(moves.to_vec()).fitness;
        if replayed != recorded {
            log::warn!("Verification mismatch: recorded fitness {recorded}, replay gave {replayed}");
        }
        Verification {
            recorded,
            replayed,
            consistent: replayed == recorded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BoardConfig;

    fn evaluator(cells: Vec<Vec<i32>>, chain: ChainConfig) -> FitnessEvaluator {
        let board = Board::from_config(&BoardConfig::from_cells(cells)).unwrap();
        FitnessEvaluator::new(board, chain)
    }

    #[test]
    fn test_evaluate_counts_rotations() {
        let eval = evaluator(vec![vec![0, 0], vec![0, 0]], ChainConfig::default());
        let result = eval.evaluate(&[0, 0, 5, 5]);
        assert_eq!(result.moves, vec![Move::new(0, 0)]);
        assert_eq!(result.fitness, 2);
        assert!(!result.divergent);
    }

    #[test]
    fn test_all_missing_genome_scores_zero() {
        let eval = evaluator(vec![vec![-1, 0], vec![0, -1]], ChainConfig::default());
        let result = eval.evaluate(&[0, 0, 1, 1, 1, 1]);
        assert!(result.moves.is_empty());
        assert_eq!(result.fitness, 0);
    }

    #[test]
    fn test_evaluate_is_pure() {
        let eval = evaluator(BoardConfig::default().cells, ChainConfig::default());
        let genome = [0, 0, 1, 0, 2, 0, 3, 0, 4, 0];
        let first = eval.evaluate(&genome);
        assert_eq!(first.fitness, 15);
        assert_eq!(eval.evaluate(&genome), first);
    }

    #[test]
    fn test_divergence_policies() {
        let truncate = evaluator(
            vec![vec![0, 0], vec![0, 0]],
            ChainConfig {
                max_rotations_per_move: 1,
                divergence: DivergencePolicy::Truncate,
            },
        );
        let result = truncate.evaluate(&[0, 0]);
        assert!(result.divergent);
        assert_eq!(result.fitness, 1);
        assert_eq!(result.rotations, 1);

        let penalize = evaluator(
            vec![vec![0, 0], vec![0, 0]],
            ChainConfig {
                max_rotations_per_move: 1,
                divergence: DivergencePolicy::Penalize,
            },
        );
        let result = penalize.evaluate(&[0, 0]);
        assert!(result.divergent);
        assert_eq!(result.fitness, 0);
        assert_eq!(result.rotations, 1);
    }

    #[test]
    fn test_verify() {
        let eval = evaluator(vec![vec![0, 0], vec![0, 0]], ChainConfig::default());
        let moves = [Move::new(0, 0)];
        assert_eq!(
            eval.verify(&moves, 2),
            Verification {
                recorded: 2,
                replayed: 2,
                consistent: true
            }
        );
        assert!(!eval.verify(&moves, 3).consistent);
    }
}
