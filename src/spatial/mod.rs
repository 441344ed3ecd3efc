//! Spatial data structures
//!
//! This module contains:
//! - Tiles, directions and the shared tile set
//! - Cells holding a superposition of tiles
//! - The row-major output grid

/// Cell superposition state
pub mod cell;
/// Grid layout, neighbors and image composition
pub mod grid;
/// Tile patterns, adjacency and the tile set arena
pub mod tiles;

pub use cell::Cell;
pub use grid::{Dimension, Grid};
