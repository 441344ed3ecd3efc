//! Runtime configuration defaults

// Grid settings
/// Default output grid dimension in tiles (rows, cols)
pub const DEFAULT_OUTPUT_DIMENSION: (usize, usize) = (10, 30);

/// Frequency assigned to tiles loaded from disk
pub const DEFAULT_TILE_FREQUENCY: u32 = 1;

// Run settings
/// Default number of attempts the command line allows before giving up
pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

/// Default number of images generated per invocation
pub const DEFAULT_RUN_COUNT: usize = 1;

// Queue settings
/// Minimum tombstone count before the priority queue compacts itself
pub const QUEUE_COMPACTION_FLOOR: usize = 64;

// Progress bar display settings
/// Threshold for switching to a single batch bar when generating many images
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_result";
/// Delay between GIF animation frames
pub const GIF_FRAME_DELAY_MS: u32 = 20;
/// Minimum frame delay that viewers reliably support (in milliseconds)
pub const VIEWER_MIN_FRAME_DELAY_MS: u32 = 50;
