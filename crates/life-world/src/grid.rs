//! 2D toroidal grid of cells.

use life_core::{Cell, Coord, Direction, Error, FillMode, GridConfig, Result};
use rand::Rng;
use serde::Serialize;
use std::fmt;

/// Default probability of a cell being alive after a random fill
pub const DEFAULT_DENSITY: f64 = 0.5;

/// One generation's cell states, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an all-dead grid.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        check_dimensions(rows, cols)?;
        Ok(Self::blank(rows, cols))
    }

    /// Create a grid filled according to `fill`. Random fills use the thread-local RNG.
    pub fn create(rows: usize, cols: usize, fill: FillMode) -> Result<Self> {
        match fill {
            FillMode::Empty => Self::new(rows, cols),
            FillMode::Random => Self::random(rows, cols, DEFAULT_DENSITY, &mut rand::thread_rng()),
        }
    }

    /// Create a grid where each cell is independently alive with probability `density`.
    pub fn random<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        density: f64,
        rng: &mut R,
    ) -> Result<Self> {
        check_dimensions(rows, cols)?;
        if !(0.0..=1.0).contains(&density) {
            return Err(Error::Config(format!(
                "density must be within 0.0..=1.0, got {}",
                density
            )));
        }
        Ok(Self::random_unchecked(rows, cols, density, rng))
    }

    /// Parse a grid from text rows, `#`, `O` or `*` for alive and `.` for dead.
    pub fn from_rows<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let rows = lines.len();
        let cols = lines.first().map(|l| l.as_ref().chars().count()).unwrap_or(0);
        check_dimensions(rows, cols)?;

        let mut cells = Vec::with_capacity(rows * cols);
        for (row, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            if line.chars().count() != cols {
                return Err(Error::Pattern(format!(
                    "row {} has {} cells, expected {}",
                    row,
                    line.chars().count(),
                    cols
                )));
            }
            for (col, ch) in line.chars().enumerate() {
                let cell = match ch {
                    '#' | 'O' | '*' => Cell::Alive,
                    '.' => Cell::Dead,
                    other => {
                        return Err(Error::Pattern(format!(
                            "unexpected character {:?} at ({}, {})",
                            other, row, col
                        )))
                    }
                };
                cells.push(cell);
            }
        }

        Ok(Self { rows, cols, cells })
    }

    /// An all-dead grid with the same dimensions as this one.
    pub fn empty_like(&self) -> Self {
        Self::blank(self.rows, self.cols)
    }

    pub(crate) fn blank(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::Dead; rows * cols],
        }
    }

    /// Random fill without validation; `density` must already be within `0.0..=1.0`.
    pub(crate) fn random_unchecked<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        density: f64,
        rng: &mut R,
    ) -> Self {
        let cells = (0..rows * cols)
            .map(|_| Cell::from(rng.gen_bool(density)))
            .collect();
        Self { rows, cols, cells }
    }

    pub(crate) fn from_cells(rows: usize, cols: usize, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), rows * cols);
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// (rows, cols)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Get the cell at (row, col). No wraparound.
    pub fn get(&self, row: usize, col: usize) -> Result<Cell> {
        let index = self.checked_index(row, col)?;
        Ok(self.cells[index])
    }

    /// Set the cell at (row, col). No wraparound.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) -> Result<()> {
        let index = self.checked_index(row, col)?;
        self.cells[index] = cell;
        Ok(())
    }

    /// Flip the cell at (row, col), returning its new value.
    pub fn toggle(&mut self, row: usize, col: usize) -> Result<Cell> {
        let index = self.checked_index(row, col)?;
        let cell = self.cells[index].toggled();
        self.cells[index] = cell;
        Ok(cell)
    }

    /// Count alive cells among the 8 neighbors of (row, col), wrapping each
    /// axis independently.
    pub fn count_alive_toroidal_neighbors(&self, row: usize, col: usize) -> Result<u8> {
        self.checked_index(row, col)?;
        Ok(self.alive_neighbors(Coord::new(row, col)))
    }

    /// Neighbor count for a coordinate already known to be in range.
    pub(crate) fn alive_neighbors(&self, coord: Coord) -> u8 {
        Direction::all()
            .iter()
            .map(|dir| {
                let (d_row, d_col) = dir.to_delta();
                coord.offset_wrapped(d_row, d_col, self.rows, self.cols)
            })
            .filter(|n| self.cells[self.index(*n)].is_alive())
            .count() as u8
    }

    /// Number of alive cells
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }

    pub fn is_extinct(&self) -> bool {
        !self.cells.iter().any(|c| c.is_alive())
    }

    /// Iterator over all cells with coordinates, row-major
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.index_to_coord(i), *cell))
    }

    /// Iterator over the coordinates of alive cells
    pub fn iter_alive(&self) -> impl Iterator<Item = Coord> + '_ {
        self.iter()
            .filter(|(_, cell)| cell.is_alive())
            .map(|(coord, _)| coord)
    }

    fn checked_index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.index(Coord::new(row, col)))
    }

    fn index(&self, coord: Coord) -> usize {
        coord.row * self.cols + coord.col
    }

    fn index_to_coord(&self, index: usize) -> Coord {
        Coord::new(index / self.cols, index % self.cols)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, line) in self.cells.chunks(self.cols).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for cell in line {
                f.write_str(if cell.is_alive() { "#" } else { "." })?;
            }
        }
        Ok(())
    }
}

fn check_dimensions(rows: usize, cols: usize) -> Result<()> {
    GridConfig { rows, cols }.validate()
}
