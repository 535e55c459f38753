//! Compute module - Dial board simulation and evolutionary move search.

mod board;
mod chain;

pub mod evolution;

pub use board::*;
pub use chain::*;
