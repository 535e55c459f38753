//! Dial chain - chain-reaction simulation and evolutionary move search.
//!
//! A board is a grid of dials, each pointing up, right, down or left, with
//! some cells missing. Triggering a dial rotates it clockwise; if it now
//! points at another dial, that dial is triggered too. This crate counts the
//! rotations a move sequence causes and searches for sequences that
//! maximize that count.
//!
//! # Architecture
//!
//! - `schema`: Board templates, search configuration and result types
//! - `compute`: The board, the chain reaction engine and the genetic search
//!
//! # Example
//!
//! ```rust
//! use dial_chain::{
//!     compute::{Board, simulate},
//!     schema::{BoardConfig, Move},
//! };
//!
//! let board = Board::from_config(&BoardConfig::from_cells(vec![
//!     vec![0, 0],
//!     vec![0, 0],
//! ]))
//! .unwrap();
//!
//! // (0,0) turns right and triggers (0,1), which turns right off the board.
//! let rotations = simulate(&board, &[Move::new(0, 0)], 1_000).unwrap();
//! assert_eq!(rotations, 2);
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::{FitnessEvaluator, SearchEngine};
pub use compute::{Board, DivergentSimulation, simulate};
pub use schema::{BoardConfig, Move, SearchConfig, SearchResult};
