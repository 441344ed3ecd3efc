/// Command-line interface and batch generation
pub mod cli;
/// Compile-time defaults
pub mod configuration;
/// Error types and the crate result alias
pub mod error;
/// Tile loading, rotation and PNG export
pub mod image;
/// Terminal progress bars
pub mod progress;
/// Snapshot recording and GIF export
pub mod visualization;
