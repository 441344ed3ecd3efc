//! Tiles, their edge adjacency predicate and the shared tile set
//!
//! A tile is an immutable RGB pattern with a relative frequency. Two tiles may
//! sit next to each other when the pixels along their touching edges are
//! exactly equal. The tile set owns every tile of a run and precomputes, for
//! each tile and direction, which tiles are allowed on the other side, so
//! propagation only ever intersects bitsets.

use crate::algorithm::bitset::TileBitset;
use crate::io::error::{AlgorithmError, Result, type_mismatch};
use ndarray::{Array3, ArrayView3, Axis, s};

/// Height x width x 3 RGB pixel buffer used for tiles and rendered grids
pub type PixelBuffer = Array3<u8>;

/// Relative position of a cell or tile with respect to another one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Directly above the other
    Up,
    /// Directly below the other
    Down,
    /// Directly left of the other
    Left,
    /// Directly right of the other
    Right,
}

impl Direction {
    /// All four directions, in the order used for rule tables
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// The direction pointing the other way
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Row and column step taken to move in this direction
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    /// Position of this direction within [`Direction::ALL`]
    pub const fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Down => 1,
            Self::Left => 2,
            Self::Right => 3,
        }
    }
}

/// Immutable tile pattern with a relative selection weight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pattern: PixelBuffer,
    frequency: u32,
}

impl Tile {
    /// Create a tile from an RGB pattern and a positive frequency
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `frequency` is zero
    /// - The pattern is not `height x width x 3` with non-zero height and width
    pub fn new(pattern: PixelBuffer, frequency: u32) -> Result<Self> {
        if frequency == 0 {
            return Err(AlgorithmError::InvalidTileFrequency { frequency });
        }

        let (height, width, channels) = pattern.dim();
        if height == 0 || width == 0 || channels != 3 {
            return Err(type_mismatch(
                &"a non-empty height x width x 3 RGB pattern",
                &format!("a {height}x{width}x{channels} array"),
            ));
        }

        Ok(Self { pattern, frequency })
    }

    /// Relative weight used when this tile is drawn during collapse
    pub const fn frequency(&self) -> u32 {
        self.frequency
    }

    /// The tile's pixel pattern
    pub const fn image(&self) -> &PixelBuffer {
        &self.pattern
    }

    /// Pattern dimensions as (height, width)
    pub fn shape(&self) -> (usize, usize) {
        let (height, width, _) = self.pattern.dim();
        (height, width)
    }

    /// Whether this tile may sit in `direction` relative to `other`
    ///
    /// Compares the boundary row or column the two patterns would share. For
    /// example with [`Direction::Up`] this tile is above `other`, so its last
    /// row must equal the first row of `other`.
    pub fn is_adjacent_to(&self, other: &Self, direction: Direction) -> bool {
        let own = self.pattern.view();
        let theirs = other.pattern.view();
        match direction {
            Direction::Up => last_row(own) == first_row(theirs),
            Direction::Down => first_row(own) == last_row(theirs),
            Direction::Left => last_col(own) == first_col(theirs),
            Direction::Right => first_col(own) == last_col(theirs),
        }
    }
}

fn first_row<'a>(pattern: ArrayView3<'a, u8>) -> ArrayView3<'a, u8> {
    pattern.slice_move(s![..1, .., ..])
}

fn last_row<'a>(pattern: ArrayView3<'a, u8>) -> ArrayView3<'a, u8> {
    pattern.slice_move(s![-1.., .., ..])
}

fn first_col<'a>(pattern: ArrayView3<'a, u8>) -> ArrayView3<'a, u8> {
    pattern.slice_move(s![.., ..1, ..])
}

fn last_col<'a>(pattern: ArrayView3<'a, u8>) -> ArrayView3<'a, u8> {
    pattern.slice_move(s![.., -1.., ..])
}

/// Shared, read-only arena of tiles with precomputed adjacency rules
///
/// Cells refer to tiles by their index in this set.
#[derive(Debug, Clone)]
pub struct TileSet {
    tiles: Vec<Tile>,
    /// `compatibility[tile][direction]` holds every tile `other` for which
    /// `tile.is_adjacent_to(other, direction)`
    compatibility: Vec<[TileBitset; 4]>,
    tile_shape: (usize, usize),
}

impl TileSet {
    /// Build a tile set and its adjacency rule table
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `tiles` is empty
    /// - The tiles do not all share the same pattern shape
    pub fn new(tiles: Vec<Tile>) -> Result<Self> {
        let tile_shape = tiles
            .first()
            .map(Tile::shape)
            .ok_or(AlgorithmError::EmptyPatternSet)?;

        if let Some(mismatch) = tiles.iter().find(|tile| tile.shape() != tile_shape) {
            let (height, width) = mismatch.shape();
            return Err(type_mismatch(
                &format!("tiles of shape {}x{}", tile_shape.0, tile_shape.1),
                &format!("a tile of shape {height}x{width}"),
            ));
        }

        let compatibility = tiles
            .iter()
            .map(|tile| {
                Direction::ALL.map(|direction| {
                    let mut allowed = TileBitset::new(tiles.len());
                    for (index, other) in tiles.iter().enumerate() {
                        if tile.is_adjacent_to(other, direction) {
                            allowed.insert(index);
                        }
                    }
                    allowed
                })
            })
            .collect();

        Ok(Self {
            tiles,
            compatibility,
            tile_shape,
        })
    }

    /// Number of tiles in the set
    pub const fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always false; construction rejects empty sets
    pub const fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tile at `index`
    pub fn get(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    /// Iterate over all tiles in index order
    pub fn iter(&self) -> std::slice::Iter<'_, Tile> {
        self.tiles.iter()
    }

    /// Common pattern dimensions of every tile as (height, width)
    pub const fn tile_shape(&self) -> (usize, usize) {
        self.tile_shape
    }

    /// Frequency of the tile at `index`, zero for unknown indices
    pub fn frequency(&self, index: usize) -> u32 {
        self.tiles.get(index).map_or(0, Tile::frequency)
    }

    /// Tiles allowed on the far side when tile `index` sits in `direction`
    /// relative to them
    pub fn compatible(&self, index: usize, direction: Direction) -> Option<&TileBitset> {
        self.compatibility
            .get(index)
            .and_then(|rules| rules.get(direction.index()))
    }

    /// Per-pixel mean over the given tiles, truncated to whole intensities
    ///
    /// Returns `None` when `indices` selects no tile of this set.
    pub fn mean_image<I>(&self, indices: I) -> Option<PixelBuffer>
    where
        I: IntoIterator<Item = usize>,
    {
        let (height, width) = self.tile_shape;
        let mut sum = Array3::<u32>::zeros((height, width, 3));
        let mut count = 0u32;

        for tile in indices.into_iter().filter_map(|index| self.get(index)) {
            sum.zip_mut_with(tile.image(), |acc, &value| *acc += u32::from(value));
            count += 1;
        }

        (count > 0).then(|| sum.mapv(|total| (total / count) as u8))
    }

    /// Per-pixel mean over the whole set, used to preview undecided cells
    pub fn preview_image(&self) -> PixelBuffer {
        self.mean_image(0..self.len())
            .unwrap_or_else(|| Array3::zeros((self.tile_shape.0, self.tile_shape.1, 3)))
    }
}

impl<'a> IntoIterator for &'a TileSet {
    type Item = &'a Tile;
    type IntoIter = std::slice::Iter<'a, Tile>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles.iter()
    }
}

/// Rotate a pattern a quarter turn clockwise
pub fn rotate_90(pattern: &PixelBuffer) -> PixelBuffer {
    let mut rotated = pattern.view().permuted_axes([1, 0, 2]);
    rotated.invert_axis(Axis(1));
    rotated.as_standard_layout().into_owned()
}
