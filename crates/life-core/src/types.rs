//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a simulation session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of a single cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    #[default]
    Dead,
    Alive,
}

impl Cell {
    pub fn is_alive(self) -> bool {
        self == Cell::Alive
    }

    pub fn toggled(self) -> Self {
        match self {
            Cell::Dead => Cell::Alive,
            Cell::Alive => Cell::Dead,
        }
    }
}

impl From<bool> for Cell {
    fn from(alive: bool) -> Self {
        if alive {
            Cell::Alive
        } else {
            Cell::Dead
        }
    }
}

/// How a freshly created grid is filled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    /// Every cell dead
    #[default]
    Empty,
    /// Every cell independently alive with probability ~0.5
    Random,
}

/// Run state of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Running,
}

impl RunState {
    pub fn is_running(self) -> bool {
        self == RunState::Running
    }
}

/// Grid coordinate, row-major
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Offset by a signed delta, wrapping each axis independently onto a
    /// `rows` x `cols` torus.
    pub fn offset_wrapped(&self, d_row: isize, d_col: isize, rows: usize, cols: usize) -> Self {
        Self {
            row: wrap_axis(self.row, d_row, rows),
            col: wrap_axis(self.col, d_col, cols),
        }
    }
}

fn wrap_axis(value: usize, delta: isize, len: usize) -> usize {
    let len = len as isize;
    ((value as isize + delta).rem_euclid(len)) as usize
}

/// The eight neighbor directions of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    /// (row delta, col delta); north is row - 1.
    pub fn to_delta(&self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
            Direction::NorthEast => (-1, 1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (1, -1),
        }
    }

    pub fn all() -> [Direction; 8] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::NorthEast,
            Direction::NorthWest,
            Direction::SouthEast,
            Direction::SouthWest,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_wrap() {
        let c = Coord::new(0, 0);
        assert_eq!(c.offset_wrapped(-1, -1, 36, 64), Coord::new(35, 63));

        let c = Coord::new(35, 63);
        assert_eq!(c.offset_wrapped(1, 1, 36, 64), Coord::new(0, 0));

        let c = Coord::new(5, 5);
        assert_eq!(c.offset_wrapped(1, -1, 36, 64), Coord::new(6, 4));
    }

    #[test]
    fn test_coord_wrap_single_row() {
        // On a 1-wide axis every offset folds back onto index 0
        let c = Coord::new(0, 2);
        assert_eq!(c.offset_wrapped(-1, 1, 1, 3), Coord::new(0, 0));
    }

    #[test]
    fn test_direction_deltas_are_distinct_neighbors() {
        let deltas: Vec<_> = Direction::all().iter().map(|d| d.to_delta()).collect();
        assert_eq!(deltas.len(), 8);
        assert!(!deltas.contains(&(0, 0)));
        for (i, a) in deltas.iter().enumerate() {
            for b in &deltas[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_cell_toggle() {
        assert_eq!(Cell::Dead.toggled(), Cell::Alive);
        assert_eq!(Cell::Alive.toggled(), Cell::Dead);
        assert!(Cell::from(true).is_alive());
    }

    #[test]
    fn test_fill_mode_serialization() {
        let json = serde_json::to_string(&FillMode::Random).unwrap();
        assert_eq!(json, "\"random\"");
    }
}
