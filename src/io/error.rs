//! Error types for configuration, tile handling and run control

use std::fmt;
use std::path::PathBuf;

/// Main error type for all algorithm operations
#[derive(Debug)]
pub enum AlgorithmError {
    /// Output grid dimension has a zero row or column count
    InvalidDimension {
        /// Requested number of rows
        rows: usize,
        /// Requested number of columns
        cols: usize,
    },

    /// No tiles were supplied to build a tile set from
    EmptyPatternSet,

    /// A tile was constructed with a non-positive frequency
    InvalidTileFrequency {
        /// The rejected frequency
        frequency: u32,
    },

    /// Data of the wrong shape was supplied where a tile pattern was expected
    ///
    /// Raised for patterns that are not `height x width x 3` and for tile sets
    /// whose tiles do not all share one shape.
    TypeMismatch {
        /// Description of what was expected
        expected: String,
        /// Description of what was found
        found: String,
    },

    /// Popped or peeked an empty priority queue
    EmptyQueue,

    /// Another run was requested after completion while reruns are disabled
    AlreadyCollapsed,

    /// The caller-imposed attempt budget was used up before a run succeeded
    AttemptLimitReached {
        /// Number of attempts made
        attempts: usize,
    },

    /// Failed to load a tile image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Algorithm or command-line parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Failed to save a generated image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for AlgorithmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimension { rows, cols } => {
                write!(
                    f,
                    "Invalid output dimension {rows}x{cols}: both rows and columns must be at least 1"
                )
            }
            Self::EmptyPatternSet => write!(f, "Pattern set is empty: at least one tile is required"),
            Self::InvalidTileFrequency { frequency } => {
                write!(
                    f,
                    "Invalid tile frequency {frequency}: frequency must be a positive integer"
                )
            }
            Self::TypeMismatch { expected, found } => {
                write!(f, "Type mismatch: expected {expected}, found {found}")
            }
            Self::EmptyQueue => write!(f, "Priority queue is empty"),
            Self::AlreadyCollapsed => write!(
                f,
                "The current configuration has already been collapsed; enable rerun or change the configuration to run again"
            ),
            Self::AttemptLimitReached { attempts } => {
                write!(f, "No successful collapse after {attempts} attempts")
            }
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for AlgorithmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for algorithm results
pub type Result<T> = std::result::Result<T, AlgorithmError>;

impl From<image::ImageError> for AlgorithmError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for AlgorithmError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> AlgorithmError {
    AlgorithmError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a type mismatch error
pub fn type_mismatch(expected: &impl ToString, found: &impl ToString) -> AlgorithmError {
    AlgorithmError::TypeMismatch {
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

/// Create a path-related parameter error
pub fn io_error(msg: &str) -> AlgorithmError {
    AlgorithmError::InvalidParameter {
        parameter: "path",
        value: String::new(),
        reason: msg.to_string(),
    }
}
