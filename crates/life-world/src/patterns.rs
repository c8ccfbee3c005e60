//! Named seed patterns.

use crate::grid::Grid;
use life_core::{Cell, Coord, Error, Result};

pub struct Pattern {
    pub name: &'static str,
    /// Alive cells as (row, col) offsets from the pattern's top-left corner
    pub cells: &'static [(usize, usize)],
}

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "block",
        cells: &[(0, 0), (0, 1), (1, 0), (1, 1)],
    },
    Pattern {
        name: "blinker",
        cells: &[(0, 0), (0, 1), (0, 2)],
    },
    Pattern {
        name: "toad",
        cells: &[(0, 1), (0, 2), (0, 3), (1, 0), (1, 1), (1, 2)],
    },
    Pattern {
        name: "beacon",
        cells: &[(0, 0), (0, 1), (1, 0), (1, 1), (2, 2), (2, 3), (3, 2), (3, 3)],
    },
    Pattern {
        name: "glider",
        cells: &[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)],
    },
    Pattern {
        name: "r-pentomino",
        cells: &[(0, 1), (0, 2), (1, 0), (1, 1), (2, 1)],
    },
    Pattern {
        name: "lwss",
        cells: &[(0, 1), (0, 4), (1, 0), (2, 0), (2, 4), (3, 0), (3, 1), (3, 2), (3, 3)],
    },
];

impl Pattern {
    /// (height, width) of the pattern's bounding box
    pub fn extent(&self) -> (usize, usize) {
        let height = self.cells.iter().map(|&(r, _)| r + 1).max().unwrap_or(0);
        let width = self.cells.iter().map(|&(_, c)| c + 1).max().unwrap_or(0);
        (height, width)
    }

    /// Write the pattern's alive cells onto `grid` with its top-left corner at
    /// `origin`, wrapping around the edges. Other cells are left as they are.
    pub fn stamp(&self, grid: &mut Grid, origin: Coord) -> Result<()> {
        let (rows, cols) = grid.dimensions();
        for &(r, c) in self.cells {
            let target = origin.offset_wrapped(r as isize, c as isize, rows, cols);
            grid.set(target.row, target.col, Cell::Alive)?;
        }
        Ok(())
    }

    /// Origin that places the pattern's bounding box at the centre of `grid`.
    pub fn centered_origin(&self, grid: &Grid) -> Coord {
        let (height, width) = self.extent();
        Coord::new(
            grid.rows().saturating_sub(height) / 2,
            grid.cols().saturating_sub(width) / 2,
        )
    }
}

/// Look up a pattern by name, ignoring case.
pub fn find(name: &str) -> Result<&'static Pattern> {
    PATTERNS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| Error::Pattern(format!("unknown pattern '{}'", name)))
}

pub fn names() -> impl Iterator<Item = &'static str> {
    PATTERNS.iter().map(|p| p.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::next_generation;

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(find("Glider").unwrap().name, "glider");
        assert_eq!(find("R-PENTOMINO").unwrap().name, "r-pentomino");
        assert!(matches!(find("gosper"), Err(Error::Pattern(_))));
    }

    #[test]
    fn test_extent() {
        assert_eq!(find("blinker").unwrap().extent(), (1, 3));
        assert_eq!(find("lwss").unwrap().extent(), (4, 5));
    }

    #[test]
    fn test_stamp_wraps() {
        let mut grid = Grid::new(4, 4).unwrap();
        find("block").unwrap().stamp(&mut grid, Coord::new(3, 3)).unwrap();
        assert_eq!(grid.to_string(), "#..#\n....\n....\n#..#");
    }

    #[test]
    fn test_centered_blinker_keeps_population() {
        let pattern = find("blinker").unwrap();
        let mut grid = Grid::new(5, 5).unwrap();
        let origin = pattern.centered_origin(&grid);
        assert_eq!(origin, Coord::new(2, 1));
        pattern.stamp(&mut grid, origin).unwrap();

        let mut current = grid;
        for _ in 0..10 {
            let next = next_generation(&current);
            assert_eq!(next.population, 3);
            current = next.grid;
        }
    }

    #[test]
    fn test_oscillators_and_still_lifes_survive() {
        for name in ["block", "blinker", "toad", "beacon"] {
            let pattern = find(name).unwrap();
            let mut grid = Grid::new(12, 12).unwrap();
            let origin = pattern.centered_origin(&grid);
            pattern.stamp(&mut grid, origin).unwrap();

            let start = grid.clone();
            let two_later = next_generation(&next_generation(&grid).grid).grid;
            assert_eq!(two_later, start, "{} should have period 1 or 2", name);
        }
    }
}
