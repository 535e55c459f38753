//! Schema module - Board templates, search configuration and result types.

mod board;
mod search;

pub use board::*;
pub use search::*;
