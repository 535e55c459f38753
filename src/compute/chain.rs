//! Chain reaction engine.
//!
//! Triggering a dial rotates it one step clockwise and, if the dial now
//! points at another dial, triggers that one in turn. A single move can
//! therefore cascade across many cells before the chain leaves the grid or
//! runs into a missing cell.
//!
//! The cascade is driven by an explicit loop rather than recursion, and every
//! top-level move is capped at a configurable number of rotations. Hitting
//! the cap stops the run with [`DivergentSimulation`], which still carries
//! the rotations counted so far.

use crate::schema::Move;

use super::Board;

/// A chain exceeded the per-move rotation bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error(
    "Chain started by move {move_index} at ({row}, {col}) exceeded the rotation bound; {rotations} rotations counted"
)]
pub struct DivergentSimulation {
    /// Index of the offending move in the request.
    pub move_index: usize,
    pub row: usize,
    pub col: usize,
    /// Total rotations up to and including the capped chain.
    pub rotations: u64,
}

impl Board {
    /// Trigger one move and return the rotations it caused.
    ///
    /// Moves that are out of bounds or address a missing cell are skipped and
    /// contribute zero. On `Err`, the returned count is the `limit` rotations
    /// performed before the chain was cut.
    pub fn trigger(&mut self, mv: Move, limit: u64) -> Result<u64, u64> {
        if !self.is_playable(mv) {
            return Ok(0);
        }

        let mut rotations = 0u64;
        let mut cursor = Some(mv);

        while let Some(cell) = cursor {
            if rotations == limit {
                return Err(rotations);
            }
            let Some(direction) = self.rotate(cell.row, cell.col) else {
                break;
            };
            rotations += 1;
            cursor = self.neighbor(cell.row, cell.col, direction);
        }

        Ok(rotations)
    }

    /// Apply `moves` in order and return the total rotation count.
    pub fn play(&mut self, moves: &[Move], limit: u64) -> Result<u64, DivergentSimulation> {
        let mut total = 0u64;

        for (move_index, &mv) in moves.iter().enumerate() {
            match self.trigger(mv, limit) {
                Ok(rotations) => total += rotations,
                Err(rotations) => {
                    return Err(DivergentSimulation {
                        move_index,
                        row: mv.row,
                        col: mv.col,
                        rotations: total + rotations,
                    });
                }
            }
        }

        Ok(total)
    }
}

/// Run `moves` on a private copy of `template`.
///
/// The template is never mutated, so concurrent callers can share it.
pub fn simulate(template: &Board, moves: &[Move], limit: u64) -> Result<u64, DivergentSimulation> {
    let mut board = template.clone();
    board.play(moves, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::Direction;

    const LIMIT: u64 = 10_000;

    fn board(cells: Vec<Vec<i32>>) -> Board {
        Board::from_config(&crate::schema::BoardConfig::from_cells(cells)).unwrap()
    }

    fn moves(coords: &[(usize, usize)]) -> Vec<Move> {
        coords.iter().copied().map(Move::from).collect()
    }

    #[test]
    fn test_chain_stops_at_missing_cell() {
        let template = board(vec![vec![0, -1], vec![0, 0]]);
        assert_eq!(simulate(&template, &moves(&[(0, 0)]), LIMIT), Ok(1));
    }

    #[test]
    fn test_chain_propagates_until_edge() {
        let template = board(vec![vec![0, 0], vec![0, 0]]);
        let mut played = template.clone();
        assert_eq!(played.play(&moves(&[(0, 0)]), LIMIT), Ok(2));
        assert_eq!(played.direction(0, 0), Some(Direction::Right));
        assert_eq!(played.direction(0, 1), Some(Direction::Right));
        assert_eq!(played.direction(1, 0), Some(Direction::Up));
    }

    #[test]
    fn test_empty_moves() {
        let template = board(vec![vec![0, 0], vec![0, 0]]);
        assert_eq!(simulate(&template, &[], LIMIT), Ok(0));
    }

    #[test]
    fn test_invalid_moves_contribute_nothing() {
        let template = board(vec![vec![0, -1], vec![0, 0]]);
        let total = simulate(&template, &moves(&[(0, 1), (2, 0), (0, 9), (7, 7)]), LIMIT);
        assert_eq!(total, Ok(0));
    }

    #[test]
    fn test_template_untouched() {
        let template = board(vec![vec![0, 0], vec![0, 0]]);
        let before = template.clone();
        simulate(&template, &moves(&[(0, 0), (1, 1)]), LIMIT).unwrap();
        assert_eq!(template, before);
    }

    #[test]
    fn test_default_board_column_sweep() {
        let template = Board::from_config(&crate::schema::BoardConfig::default()).unwrap();
        let sweep = moves(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);

        let mut played = template.clone();
        assert_eq!(played.play(&sweep, LIMIT), Ok(15));
        assert_eq!(
            played.to_codes(),
            vec![
                vec![1, -1, 0, 0],
                vec![1, 1, 1, 1],
                vec![1, 1, 1, 1],
                vec![1, 1, 1, 1],
                vec![1, 1, -1, 0],
            ]
        );
    }

    #[test]
    fn test_repeated_center_triggers() {
        let template = board(vec![vec![0; 3]; 3]);
        let mut played = template.clone();
        assert_eq!(played.play(&moves(&[(1, 1); 4]), LIMIT), Ok(13));
        assert_eq!(
            played.to_codes(),
            vec![vec![0, 1, 1], vec![1, 1, 2], vec![0, 1, 2]]
        );
    }

    #[test]
    fn test_deterministic() {
        let template = Board::from_config(&crate::schema::BoardConfig::default()).unwrap();
        let mv = moves(&[(2, 1), (3, 3), (2, 1), (0, 0)]);
        let first = simulate(&template, &mv, LIMIT);
        for _ in 0..10 {
            assert_eq!(simulate(&template, &mv, LIMIT), first);
        }
    }

    #[test]
    fn test_bound_reports_divergence() {
        let template = board(vec![vec![0, 0], vec![0, 0]]);
        let result = simulate(&template, &moves(&[(1, 1), (0, 0), (1, 0)]), 1);
        assert_eq!(
            result,
            Err(DivergentSimulation {
                move_index: 1,
                row: 0,
                col: 0,
                rotations: 2,
            })
        );
    }

    #[test]
    fn test_chain_exactly_at_bound_is_not_divergent() {
        let template = board(vec![vec![0, 0], vec![0, 0]]);
        assert_eq!(simulate(&template, &moves(&[(0, 0)]), 2), Ok(2));
    }
}
