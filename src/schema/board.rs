//! Board template configuration and move coordinates.

use serde::{Deserialize, Serialize};

/// Cell value marking a missing dial.
pub const MISSING_CELL: i32 = -1;

/// Literal board template: a rectangular grid of direction codes.
///
/// `-1` marks a missing dial, `0..=3` are the initial directions
/// (up, right, down, left). `rows` and `cols` are optional declared
/// dimensions; when present they must agree with `cells`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardConfig {
    /// Declared row count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    /// Declared column count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cols: Option<usize>,
    /// Row-major cell codes.
    pub cells: Vec<Vec<i32>>,
}

impl BoardConfig {
    /// Template without declared dimensions.
    pub fn from_cells(cells: Vec<Vec<i32>>) -> Self {
        Self {
            rows: None,
            cols: None,
            cells,
        }
    }

    /// Check shape and cell codes, returning `(rows, cols)`.
    pub fn validate(&self) -> Result<(usize, usize), BoardError> {
        let rows = self.cells.len();
        let cols = self.cells.first().map_or(0, Vec::len);

        if let Some(row) = self.cells.iter().position(|r| r.len() != cols) {
            return Err(BoardError::RaggedRow {
                row,
                expected: cols,
                actual: self.cells[row].len(),
            });
        }

        let declared_rows = self.rows.unwrap_or(rows);
        let declared_cols = self.cols.unwrap_or(cols);
        if declared_rows != rows || declared_cols != cols {
            return Err(BoardError::ShapeMismatch {
                declared_rows,
                declared_cols,
                actual_rows: rows,
                actual_cols: cols,
            });
        }

        if rows == 0 || cols == 0 {
            return Err(BoardError::Empty);
        }

        for (row, line) in self.cells.iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                if !(MISSING_CELL..=3).contains(&value) {
                    return Err(BoardError::InvalidCell { row, col, value });
                }
            }
        }

        Ok((rows, cols))
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::from_cells(vec![
            vec![0, -1, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, -1, 0],
        ])
    }
}

/// A trigger move addressing one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

impl Move {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Move {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Board construction errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("Board must have at least one row and one column")]
    Empty,
    #[error(
        "Declared board shape {declared_rows}x{declared_cols} does not match cells {actual_rows}x{actual_cols}"
    )]
    ShapeMismatch {
        declared_rows: usize,
        declared_cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },
    #[error("Row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Cell ({row}, {col}) has invalid value {value}; expected -1 or 0..=3")]
    InvalidCell { row: usize, col: usize, value: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_board_valid() {
        assert_eq!(BoardConfig::default().validate(), Ok((5, 4)));
    }

    #[test]
    fn test_declared_shape_mismatch() {
        let config = BoardConfig {
            rows: Some(3),
            cols: Some(2),
            cells: vec![vec![0, 0], vec![0, 0]],
        };
        assert_eq!(
            config.validate(),
            Err(BoardError::ShapeMismatch {
                declared_rows: 3,
                declared_cols: 2,
                actual_rows: 2,
                actual_cols: 2,
            })
        );
    }

    #[test]
    fn test_ragged_rows() {
        let config = BoardConfig::from_cells(vec![vec![0, 0], vec![0]]);
        assert!(matches!(
            config.validate(),
            Err(BoardError::RaggedRow { row: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_cell_and_empty() {
        let config = BoardConfig::from_cells(vec![vec![0, 4]]);
        assert_eq!(
            config.validate(),
            Err(BoardError::InvalidCell {
                row: 0,
                col: 1,
                value: 4
            })
        );
        assert_eq!(
            BoardConfig::from_cells(Vec::new()).validate(),
            Err(BoardError::Empty)
        );
        assert_eq!(
            BoardConfig::from_cells(vec![Vec::new()]).validate(),
            Err(BoardError::Empty)
        );
    }

    #[test]
    fn test_deserialize_without_dimensions() {
        let config: BoardConfig = serde_json::from_str(r#"{"cells": [[0, -1], [3, 2]]}"#).unwrap();
        assert_eq!(config.rows, None);
        assert_eq!(config.validate(), Ok((2, 2)));
    }
}
