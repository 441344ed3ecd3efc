use bitvec::prelude::*;
use std::fmt;

/// Fixed-size bitset over tile indices of a tile set
///
/// Holds a cell's remaining options and the per-direction compatibility rules.
/// Indices are 0-based positions in the tile set, iterated in ascending order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileBitset {
    bits: BitVec,
}

impl TileBitset {
    /// Create a bitset with no tiles present
    pub fn new(max_tiles: usize) -> Self {
        Self {
            bits: bitvec![0; max_tiles],
        }
    }

    /// Create a bitset containing all possible tiles
    pub fn all(max_tiles: usize) -> Self {
        Self {
            bits: bitvec![1; max_tiles],
        }
    }

    /// Create a bitset holding exactly one tile
    pub fn single(max_tiles: usize, tile: usize) -> Self {
        let mut bitset = Self::new(max_tiles);
        bitset.insert(tile);
        bitset
    }

    /// Number of tile indices this set can hold
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Insert a tile index, ignoring indices beyond capacity
    pub fn insert(&mut self, tile: usize) {
        if tile < self.bits.len() {
            self.bits.set(tile, true);
        }
    }

    /// Test tile membership
    pub fn contains(&self, tile: usize) -> bool {
        self.bits.get(tile).as_deref() == Some(&true)
    }

    /// Test whether the two sets share at least one tile
    pub fn intersects(&self, other: &Self) -> bool {
        self.bits.iter_ones().any(|tile| other.contains(tile))
    }

    /// Keep only the tiles for which `keep` returns true
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(usize) -> bool,
    {
        let dropped: Vec<usize> = self.bits.iter_ones().filter(|&tile| !keep(tile)).collect();
        for tile in dropped {
            self.bits.set(tile, false);
        }
    }

    /// Test if no tiles are present
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Count tiles in the set
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Lowest tile index present
    pub fn first(&self) -> Option<usize> {
        self.bits.first_one()
    }

    /// Iterate over present tile indices in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// Extract all tile indices as a vector
    pub fn to_vec(&self) -> Vec<usize> {
        self.bits.iter_ones().collect()
    }
}

impl fmt::Display for TileBitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileBitset({} tiles: {:?})", self.count(), self.to_vec())
    }
}
