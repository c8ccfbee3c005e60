//! The classic Life rule: survive on 2 or 3 neighbors, birth on exactly 3.

use crate::grid::Grid;
use life_core::Cell;

/// Result of advancing a grid by one generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub grid: Grid,
    pub population: usize,
}

/// Next state of a single cell given its current state and alive-neighbor count.
pub fn cell_fate(cell: Cell, alive_neighbors: u8) -> Cell {
    match (cell, alive_neighbors) {
        (Cell::Alive, 2) | (Cell::Alive, 3) => Cell::Alive, // Survival
        (Cell::Dead, 3) => Cell::Alive,                     // Birth
        _ => Cell::Dead,
    }
}

/// Compute the next generation. The input grid is left untouched.
pub fn next_generation(grid: &Grid) -> Generation {
    let (rows, cols) = grid.dimensions();
    let mut population = 0;

    let cells: Vec<Cell> = grid
        .iter()
        .map(|(coord, cell)| {
            let next = cell_fate(cell, grid.alive_neighbors(coord));
            if next.is_alive() {
                population += 1;
            }
            next
        })
        .collect();

    Generation {
        grid: Grid::from_cells(rows, cols, cells),
        population,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_cell_fate_table() {
        for n in 0..=8u8 {
            let survives = cell_fate(Cell::Alive, n).is_alive();
            let born = cell_fate(Cell::Dead, n).is_alive();
            assert_eq!(survives, n == 2 || n == 3, "alive with {} neighbors", n);
            assert_eq!(born, n == 3, "dead with {} neighbors", n);
        }
    }

    #[test]
    fn test_block_is_still_life() {
        let grid = Grid::from_rows(&[
            "......",
            "......",
            "..##..",
            "..##..",
            "......",
            "......",
        ])
        .unwrap();

        for (coord, cell) in grid.iter() {
            let n = grid.count_alive_toroidal_neighbors(coord.row, coord.col).unwrap();
            if cell.is_alive() {
                assert_eq!(n, 3);
            } else {
                assert!(n <= 2, "dead cell {:?} has {} neighbors", coord, n);
            }
        }

        let next = next_generation(&grid);
        assert_eq!(next.grid, grid);
        assert_eq!(next.population, 4);
    }

    #[test]
    fn test_blinker_oscillates() {
        let horizontal = Grid::from_rows(&[
            ".....",
            ".....",
            ".###.",
            ".....",
            ".....",
        ])
        .unwrap();
        let vertical = Grid::from_rows(&[
            ".....",
            "..#..",
            "..#..",
            "..#..",
            ".....",
        ])
        .unwrap();

        let mut grid = horizontal.clone();
        for step in 1..=6 {
            let next = next_generation(&grid);
            assert_eq!(next.population, 3);
            let expected = if step % 2 == 1 { &vertical } else { &horizontal };
            assert_eq!(&next.grid, expected, "step {}", step);
            grid = next.grid;
        }
    }

    #[test]
    fn test_isolated_cell_dies() {
        let grid = Grid::from_rows(&["...", ".#.", "..."]).unwrap();
        let next = next_generation(&grid);
        assert_eq!(next.population, 0);
        assert!(next.grid.is_extinct());
    }

    #[test]
    fn test_glider_wraps_across_edges() {
        let mut grid = Grid::from_rows(&[
            ".#....",
            "..#...",
            "###...",
            "......",
            "......",
            "......",
        ])
        .unwrap();

        // A glider returns to its shape after 4 generations, shifted by (1, 1);
        // on a 6x6 torus it is back where it started after 24
        for _ in 0..24 {
            let next = next_generation(&grid);
            assert_eq!(next.population, 5);
            grid = next.grid;
        }
        assert_eq!(grid.to_string(), ".#....\n..#...\n###...\n......\n......\n......");
    }

    proptest! {
        #[test]
        fn prop_dimensions_preserved_and_pure(
            rows in 1usize..16,
            cols in 1usize..16,
            seed in any::<u64>(),
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let grid = Grid::random(rows, cols, 0.5, &mut rng).unwrap();
            let before = grid.clone();

            let first = next_generation(&grid);
            let second = next_generation(&grid);

            prop_assert_eq!(first.grid.dimensions(), (rows, cols));
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(&grid, &before);
            prop_assert_eq!(first.population, first.grid.population());
        }
    }
}
