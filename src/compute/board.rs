//! Dial grid representation.

use std::fmt;

use crate::schema::{BoardConfig, BoardError, MISSING_CELL, Move};

/// Direction a dial points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Decode a `0..=3` direction code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Up),
            1 => Some(Self::Right),
            2 => Some(Self::Down),
            3 => Some(Self::Left),
            _ => None,
        }
    }

    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Next direction clockwise (one step modulo 4).
    #[inline]
    pub fn rotated(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
        }
    }

    /// Row/column offset of one step in this direction.
    #[inline]
    pub fn offset(self) -> (isize, isize) {
        match self {
            Self::Up => (-1, 0),
            Self::Right => (0, 1),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
        }
    }
}

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Missing,
    Dial(Direction),
}

impl Cell {
    pub fn code(self) -> i32 {
        match self {
            Self::Missing => MISSING_CELL,
            Self::Dial(direction) => direction.code(),
        }
    }
}

/// Fixed-size grid of dials.
///
/// Cells are stored row-major: index = `row * cols + col`. Dimensions never
/// change after construction and missing cells never change state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Build a board with declared dimensions from literal cell codes.
    pub fn new(rows: usize, cols: usize, cells: Vec<Vec<i32>>) -> Result<Self, BoardError> {
        Self::from_config(&BoardConfig {
            rows: Some(rows),
            cols: Some(cols),
            cells,
        })
    }

    /// Build a board from a template configuration.
    pub fn from_config(config: &BoardConfig) -> Result<Self, BoardError> {
        let (rows, cols) = config.validate()?;

        let cells = config
            .cells
            .iter()
            .flatten()
            .map(|&code| Direction::from_code(code).map_or(Cell::Missing, Cell::Dial))
            .collect();

        Ok(Self { rows, cols, cells })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Largest coordinate value addressable on either axis.
    #[inline]
    pub fn max_coordinate(&self) -> usize {
        self.rows.max(self.cols) - 1
    }

    #[inline]
    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Cell at `(row, col)`, or `None` when out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        (row < self.rows && col < self.cols).then(|| self.cells[self.idx(row, col)])
    }

    /// Direction of the dial at `(row, col)`, if any.
    #[inline]
    pub fn direction(&self, row: usize, col: usize) -> Option<Direction> {
        match self.get(row, col)? {
            Cell::Dial(direction) => Some(direction),
            Cell::Missing => None,
        }
    }

    /// True when `mv` addresses an in-bounds dial.
    #[inline]
    pub fn is_playable(&self, mv: Move) -> bool {
        self.direction(mv.row, mv.col).is_some()
    }

    /// Number of dials (non-missing cells).
    pub fn dial_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c, Cell::Dial(_)))
            .count()
    }

    /// Rotate the dial at `(row, col)` one step and return its new direction.
    ///
    /// Missing and out-of-bounds cells are left alone and yield `None`.
    #[inline]
    pub(crate) fn rotate(&mut self, row: usize, col: usize) -> Option<Direction> {
        let next = self.direction(row, col)?.rotated();
        let idx = self.idx(row, col);
        self.cells[idx] = Cell::Dial(next);
        Some(next)
    }

    /// The dial one step from `(row, col)` towards `direction`, if there is one.
    #[inline]
    pub fn neighbor(&self, row: usize, col: usize, direction: Direction) -> Option<Move> {
        let (dr, dc) = direction.offset();
        let next = Move::new(
            row.checked_add_signed(dr)?,
            col.checked_add_signed(dc)?,
        );
        self.is_playable(next).then_some(next)
    }

    /// Cell codes as nested rows, `-1` for missing.
    pub fn to_codes(&self) -> Vec<Vec<i32>> {
        self.cells
            .chunks(self.cols)
            .map(|row| row.iter().map(|c| c.code()).collect())
            .collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            let line: Vec<String> = row.iter().map(|c| format!("{:>2}", c.code())).collect();
            writeln!(f, "[{}]", line.join(" "))?;
        }
        Ok(())
    }
}
