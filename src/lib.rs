//! Wave function collapse over image tiles
//!
//! Every cell of an output grid starts in a superposition of all tiles. Cells
//! are collapsed one at a time in order of lowest entropy, and each collapse is
//! propagated to the neighbors so that shared tile edges always match. A run
//! is consumed step by step, yielding an image of the grid after every
//! collapse and a final result once the grid is complete or contradicted.

#![deny(unsafe_code)]

/// Collapse engine: option sets, priority queue, propagation and the run controller
pub mod algorithm;
/// Input/output operations, configuration defaults and error handling
pub mod io;
/// Entropy and weighted sampling
pub mod math;
/// Tiles, cells and the output grid
pub mod spatial;

pub use algorithm::executor::{RunConfig, RunResult, Step, WaveFunctionCollapse};
pub use io::error::{AlgorithmError, Result};
pub use spatial::tiles::{Direction, PixelBuffer, Tile, TileSet};
