//! Dense 2D grid addressed by `(col, row)`.
//!
//! Backs both room blueprints (`Grid<TileKind>`) and the shared floor
//! (`Grid<FloorCell>`). Every grid carries the default value it was built
//! with; cells outside a copied region, and holes left by
//! [`Grid::extract_flood_region`], fall back to it.
//!
//! Two failure styles:
//! - [`Grid::get`], [`Grid::set`] and [`Grid::extract_region`] return
//!   [`GridError`] when asked about cells outside the grid.
//! - [`Grid::try_get`] and [`Grid::write_region`] never fail; reads
//!   return `None` and writes clip.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::{Cardinal, GridPos};

/// Indexing failure on a [`Grid`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell ({col}, {row}) is outside the {cols}x{rows} grid")]
    OutOfBounds {
        col: i32,
        row: i32,
        cols: usize,
        rows: usize,
    },
    #[error("region {width}x{height} at ({col}, {row}) extends past the {cols}x{rows} grid")]
    RegionOutOfRange {
        col: i32,
        row: i32,
        width: usize,
        height: usize,
        cols: usize,
        rows: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    cols: usize,
    rows: usize,
    default: T,
    /// Row-major: `cells[row * cols + col]`.
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// A `cols`×`rows` grid with every cell set to `default`.
    pub fn new(cols: usize, rows: usize, default: T) -> Self {
        Self {
            cols,
            rows,
            cells: vec![default.clone(); cols * rows],
            default,
        }
    }

    /// Build a grid cell by cell. `default` is still remembered for
    /// region copies.
    pub fn from_fn(
        cols: usize,
        rows: usize,
        default: T,
        f: impl FnMut(i32, i32) -> T,
    ) -> Self {
        let mut grid = Self::new(cols, rows, default);
        grid.fill(f);
        grid
    }

    /// Copy of the `width`×`height` block whose top-left cell is
    /// `(col, row)`. Fails if any part of the block is off the grid, which
    /// doubles as the "does it fit" check during placement.
    pub fn extract_region(
        &self,
        col: i32,
        row: i32,
        width: usize,
        height: usize,
    ) -> Result<Grid<T>, GridError> {
        let fits = col >= 0
            && row >= 0
            && col as usize + width <= self.cols
            && row as usize + height <= self.rows;
        if !fits {
            return Err(GridError::RegionOutOfRange {
                col,
                row,
                width,
                height,
                cols: self.cols,
                rows: self.rows,
            });
        }

        let (c0, r0) = (col as usize, row as usize);
        let mut cells = Vec::with_capacity(width * height);
        for r in r0..r0 + height {
            let start = r * self.cols + c0;
            cells.extend_from_slice(&self.cells[start..start + width]);
        }
        Ok(Grid {
            cols: width,
            rows: height,
            default: self.default.clone(),
            cells,
        })
    }

    /// Copy `source` onto this grid with its top-left cell at
    /// `(dest_col, dest_row)`. Cells landing off the grid are dropped.
    pub fn write_region(&mut self, source: &Grid<T>, dest_col: i32, dest_row: i32) {
        for (col, row, value) in source.iter() {
            if let Some(index) = self.index_of(dest_col + col, dest_row + row) {
                self.cells[index] = value.clone();
            }
        }
    }

    /// Elementwise conversion. The new grid's default is `f(default)`.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            cols: self.cols,
            rows: self.rows,
            default: f(&self.default),
            cells: self.cells.iter().map(f).collect(),
        }
    }

    pub fn row(&self, row: usize) -> Option<Vec<T>> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        Some(self.cells[start..start + self.cols].to_vec())
    }

    pub fn column(&self, col: usize) -> Option<Vec<T>> {
        if col >= self.cols {
            return None;
        }
        Some(
            (0..self.rows)
                .map(|row| self.cells[row * self.cols + col].clone())
                .collect(),
        )
    }

    /// Swap rows and columns.
    pub fn transposed(&self) -> Grid<T> {
        let mut out = Grid::new(self.rows, self.cols, self.default.clone());
        for (col, row, value) in self.iter() {
            out.cells[col as usize * out.cols + row as usize] = value.clone();
        }
        out
    }

    /// Rotate a quarter turn clockwise: the top row becomes the right column.
    pub fn rotated_cw(&self) -> Grid<T> {
        let mut out = Grid::new(self.rows, self.cols, self.default.clone());
        for (col, row, value) in self.iter() {
            let dest_col = self.rows - 1 - row as usize;
            let dest_row = col as usize;
            out.cells[dest_row * out.cols + dest_col] = value.clone();
        }
        out
    }

    /// Connected component of cells matching `predicate`.
    ///
    /// The seed is the first matching cell in column-major order (columns
    /// left to right, each scanned top to bottom). From there the
    /// component grows through 4-neighbours that also match. The result is
    /// the component's bounding box; cells of the box outside the
    /// component hold the grid default. `None` if nothing matches.
    pub fn extract_flood_region(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<Grid<T>> {
        let seed = (0..self.cols)
            .flat_map(|col| (0..self.rows).map(move |row| (col, row)))
            .find(|&(col, row)| predicate(&self.cells[row * self.cols + col]))?;

        let mut visited = vec![false; self.cells.len()];
        let mut component = Vec::new();
        let mut queue = VecDeque::new();
        visited[seed.1 * self.cols + seed.0] = true;
        queue.push_back(GridPos::new(seed.0 as i32, seed.1 as i32));

        while let Some(current) = queue.pop_front() {
            component.push(current);
            for dir in Cardinal::ALL {
                let next = current.step(dir);
                let Some(index) = self.index_of(next.col, next.row) else {
                    continue;
                };
                if visited[index] || !predicate(&self.cells[index]) {
                    continue;
                }
                visited[index] = true;
                queue.push_back(next);
            }
        }

        let min_col = component.iter().map(|p| p.col).min()?;
        let max_col = component.iter().map(|p| p.col).max()?;
        let min_row = component.iter().map(|p| p.row).min()?;
        let max_row = component.iter().map(|p| p.row).max()?;

        let mut out = Grid::new(
            (max_col - min_col + 1) as usize,
            (max_row - min_row + 1) as usize,
            self.default.clone(),
        );
        for pos in component {
            let src = pos.row as usize * self.cols + pos.col as usize;
            let dst = (pos.row - min_row) as usize * out.cols + (pos.col - min_col) as usize;
            out.cells[dst] = self.cells[src].clone();
        }
        Some(out)
    }
}

impl<T: Clone + PartialEq> Grid<T> {
    /// Top-left position of the first placement (column-major scan) where
    /// every cell of `sub` equals the cell underneath. Cells of `sub` for
    /// which `ignore` holds match anything, even off-grid positions.
    pub fn locate(&self, sub: &Grid<T>, ignore: impl Fn(&T) -> bool) -> Option<GridPos> {
        for col in 0..self.cols as i32 {
            for row in 0..self.rows as i32 {
                let matches = sub.iter().all(|(c, r, wanted)| {
                    ignore(wanted) || self.try_get(col + c, row + r) == Some(wanted)
                });
                if matches {
                    return Some(GridPos::new(col, row));
                }
            }
        }
        None
    }
}

impl<T> Grid<T> {
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    #[inline]
    pub fn in_bounds(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.cols && (row as usize) < self.rows
    }

    #[inline]
    fn index_of(&self, col: i32, row: i32) -> Option<usize> {
        if self.in_bounds(col, row) {
            Some(row as usize * self.cols + col as usize)
        } else {
            None
        }
    }

    fn out_of_bounds(&self, col: i32, row: i32) -> GridError {
        GridError::OutOfBounds {
            col,
            row,
            cols: self.cols,
            rows: self.rows,
        }
    }

    pub fn get(&self, col: i32, row: i32) -> Result<&T, GridError> {
        match self.index_of(col, row) {
            Some(index) => Ok(&self.cells[index]),
            None => Err(self.out_of_bounds(col, row)),
        }
    }

    pub fn get_mut(&mut self, col: i32, row: i32) -> Result<&mut T, GridError> {
        match self.index_of(col, row) {
            Some(index) => Ok(&mut self.cells[index]),
            None => Err(self.out_of_bounds(col, row)),
        }
    }

    pub fn set(&mut self, col: i32, row: i32, value: T) -> Result<(), GridError> {
        *self.get_mut(col, row)? = value;
        Ok(())
    }

    /// Speculative read: `None` off the grid.
    #[inline]
    pub fn try_get(&self, col: i32, row: i32) -> Option<&T> {
        self.index_of(col, row).map(|index| &self.cells[index])
    }

    /// Overwrite every cell with `f(col, row)`.
    pub fn fill(&mut self, mut f: impl FnMut(i32, i32) -> T) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                self.cells[row * self.cols + col] = f(col as i32, row as i32);
            }
        }
    }

    pub fn all(&self, mut predicate: impl FnMut(i32, i32, &T) -> bool) -> bool {
        self.iter().all(|(col, row, value)| predicate(col, row, value))
    }

    /// First row in `col` whose value matches.
    pub fn first_row_index(&self, col: usize, mut predicate: impl FnMut(&T) -> bool) -> Option<usize> {
        if col >= self.cols {
            return None;
        }
        (0..self.rows).find(|&row| predicate(&self.cells[row * self.cols + col]))
    }

    /// `(col, row, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, &T)> + '_ {
        let cols = self.cols.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, value)| ((i % cols) as i32, (i / cols) as i32, value))
    }

    #[inline]
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn midpoint(&self) -> GridPos {
        GridPos::new((self.cols / 2) as i32, (self.rows / 2) as i32)
    }

    /// One line per row, each cell drawn by `glyph`.
    pub fn render(&self, mut glyph: impl FnMut(&T) -> char) -> String {
        let mut out = String::with_capacity((self.cols + 1) * self.rows);
        for row in 0..self.rows {
            for col in 0..self.cols {
                out.push(glyph(&self.cells[row * self.cols + col]));
            }
            out.push('\n');
        }
        out
    }
}
