//! Row-major grid of cells and image composition
//!
//! Cells are stored flattened, `index = row * cols + col`. Neighbors are the
//! four orthogonally adjacent cells inside the grid bounds; there is no
//! wraparound at the edges.

use crate::io::error::{AlgorithmError, Result};
use crate::spatial::cell::Cell;
use crate::spatial::tiles::{Direction, PixelBuffer, TileSet};
use ndarray::{Array3, s};

/// Output grid size in tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimension {
    rows: usize,
    cols: usize,
}

impl Dimension {
    /// Validate and create a grid dimension
    ///
    /// # Errors
    ///
    /// Returns an error if either `rows` or `cols` is zero
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(AlgorithmError::InvalidDimension { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    /// Number of rows
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells
    pub const fn cell_count(&self) -> usize {
        self.rows * self.cols
    }
}

impl TryFrom<(usize, usize)> for Dimension {
    type Error = AlgorithmError;

    fn try_from((rows, cols): (usize, usize)) -> Result<Self> {
        Self::new(rows, cols)
    }
}

/// Flattened grid of cells for one collapse attempt
#[derive(Debug, Clone)]
pub struct Grid {
    dimension: Dimension,
    cells: Vec<Cell>,
}

impl Grid {
    /// Allocate a grid where every cell allows every tile
    pub fn new(dimension: Dimension, tiles: &TileSet) -> Self {
        Self {
            dimension,
            cells: vec![Cell::new(tiles); dimension.cell_count()],
        }
    }

    /// Grid size in tiles
    pub const fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Number of rows
    pub const fn rows(&self) -> usize {
        self.dimension.rows
    }

    /// Number of columns
    pub const fn cols(&self) -> usize {
        self.dimension.cols
    }

    /// Number of cells
    pub const fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; a dimension has at least one cell
    pub const fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Flat index of (row, col), if inside the grid
    pub const fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.dimension.rows && col < self.dimension.cols {
            Some(row * self.dimension.cols + col)
        } else {
            None
        }
    }

    /// (row, col) of a flat index
    pub const fn position_of(&self, index: usize) -> (usize, usize) {
        (index / self.dimension.cols, index % self.dimension.cols)
    }

    /// Cell at a flat index
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Mutable cell at a flat index
    pub fn cell_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.cells.get_mut(index)
    }

    /// All cells in row-major order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// In-bounds neighbors of `index`
    ///
    /// Each item is `(neighbor_index, direction)` where `direction` is the
    /// neighbor's position relative to `index`.
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = (usize, Direction)> + use<> {
        let (row, col) = self.position_of(index);
        let dimension = self.dimension;
        Direction::ALL.into_iter().filter_map(move |direction| {
            let (d_row, d_col) = direction.offset();
            let n_row = row.checked_add_signed(d_row)?;
            let n_col = col.checked_add_signed(d_col)?;
            (n_row < dimension.rows && n_col < dimension.cols)
                .then_some((n_row * dimension.cols + n_col, direction))
        })
    }

    /// Narrow the options of `target` against its neighbor `source`
    ///
    /// `direction` is the position of `target` relative to `source`. Returns
    /// whether the target's options shrank; out-of-range or identical indices
    /// change nothing.
    pub fn narrow(
        &mut self,
        target: usize,
        source: usize,
        direction: Direction,
        tiles: &TileSet,
    ) -> bool {
        match self.cells.get_disjoint_mut([target, source]) {
            Ok([target_cell, source_cell]) => {
                target_cell.update_options(source_cell, direction, tiles)
            }
            Err(_) => false,
        }
    }

    /// Number of collapsed cells
    pub fn collapsed_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_collapsed()).count()
    }

    /// Whether every cell has collapsed
    pub fn is_fully_collapsed(&self) -> bool {
        self.cells.iter().all(Cell::is_collapsed)
    }

    /// Whether every cell still has at least one option
    pub fn is_consistent(&self) -> bool {
        self.cells.iter().all(Cell::is_valid)
    }

    /// Tile each cell's image into a single `rows*h x cols*w x 3` buffer
    ///
    /// Contradicted cells are rendered black.
    pub fn compose_image(&self, tiles: &TileSet) -> PixelBuffer {
        let (tile_height, tile_width) = tiles.tile_shape();
        let mut image = Array3::zeros((
            self.rows() * tile_height,
            self.cols() * tile_width,
            3,
        ));

        for (index, cell) in self.cells.iter().enumerate() {
            let Some(cell_image) = cell.image(tiles) else {
                continue;
            };
            let (row, col) = self.position_of(index);
            let top = row * tile_height;
            let left = col * tile_width;
            image
                .slice_mut(s![top..top + tile_height, left..left + tile_width, ..])
                .assign(&cell_image);
        }

        image
    }
}
