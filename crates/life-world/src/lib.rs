//! Simulation kernel for Conway's Game of Life on a toroidal grid.
//!
//! This crate holds the grid representation, the generation rule, a small
//! library of seed patterns and the timed stepping controller.

pub mod grid;
pub mod patterns;
pub mod rules;
pub mod session;

pub use grid::Grid;
pub use patterns::Pattern;
pub use rules::{cell_fate, next_generation, Generation};
pub use session::{Session, Snapshot, StepReport};
