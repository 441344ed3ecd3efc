//! Grid cell holding a superposition of tiles

use crate::algorithm::bitset::TileBitset;
use crate::math::probability::{weighted_choice, weighted_entropy};
use crate::spatial::tiles::{Direction, PixelBuffer, TileSet};
use rand::Rng;

/// A grid position that has not necessarily settled on a tile yet
///
/// The remaining options are indices into the run's [`TileSet`]. An unresolved
/// cell always has at least one option; a cell whose options run out is a
/// contradiction and invalidates the whole grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    options: TileBitset,
    collapsed: bool,
}

impl Cell {
    /// Create an unresolved cell allowing every tile of the set
    pub fn new(tiles: &TileSet) -> Self {
        Self {
            options: TileBitset::all(tiles.len()),
            collapsed: false,
        }
    }

    /// Remaining tile options
    pub const fn options(&self) -> &TileBitset {
        &self.options
    }

    /// Whether the cell has committed to a single tile
    pub const fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Whether the cell still has at least one option
    pub fn is_valid(&self) -> bool {
        !self.options.is_empty()
    }

    /// Tile the cell has collapsed to
    pub fn tile(&self) -> Option<usize> {
        if self.collapsed {
            self.options.first()
        } else {
            None
        }
    }

    /// Frequency-weighted Shannon entropy of the remaining options
    ///
    /// Zero once collapsed and `+infinity` for a contradicted cell.
    pub fn entropy(&self, tiles: &TileSet) -> f64 {
        if self.collapsed {
            return 0.0;
        }
        weighted_entropy(self.options.iter().map(|index| tiles.frequency(index)))
    }

    /// Rendered view of the cell
    ///
    /// A collapsed cell shows its tile, an unresolved cell the per-pixel mean
    /// of its remaining options. A contradicted cell has no image.
    pub fn image(&self, tiles: &TileSet) -> Option<PixelBuffer> {
        if self.collapsed {
            return self
                .options
                .first()
                .and_then(|index| tiles.get(index))
                .map(|tile| tile.image().clone());
        }
        tiles.mean_image(self.options.iter())
    }

    /// Drop every option that has no compatible partner in `neighbor`
    ///
    /// `direction` is the position of this cell relative to `neighbor`. A
    /// collapsed cell is left untouched. If a single option survives the cell
    /// collapses to it. Returns whether the option set shrank.
    pub fn update_options(&mut self, neighbor: &Self, direction: Direction, tiles: &TileSet) -> bool {
        if self.collapsed {
            return false;
        }

        let before = self.options.count();
        self.options.retain(|option| {
            tiles
                .compatible(option, direction)
                .is_some_and(|allowed| allowed.intersects(&neighbor.options))
        });

        if self.options.count() == 1 {
            self.collapsed = true;
        }

        self.options.count() != before
    }

    /// Commit to one remaining option drawn by frequency
    ///
    /// Returns the chosen tile index, or `None` if the cell has no options
    /// left, in which case it is left unchanged.
    pub fn collapse<R: Rng + ?Sized>(&mut self, tiles: &TileSet, rng: &mut R) -> Option<usize> {
        let candidates = self.options.to_vec();
        let weights: Vec<u32> = candidates
            .iter()
            .map(|&index| tiles.frequency(index))
            .collect();

        let chosen = weighted_choice(&weights, rng).and_then(|slot| candidates.get(slot).copied())?;

        self.options = TileBitset::single(self.options.capacity(), chosen);
        self.collapsed = true;
        Some(chosen)
    }
}
