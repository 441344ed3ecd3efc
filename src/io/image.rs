//! Tile loading, rotation augmentation and PNG export

use crate::io::error::{AlgorithmError, Result, invalid_parameter, type_mismatch};
use crate::spatial::tiles::{PixelBuffer, Tile, rotate_90};
use image::RgbImage;
use ndarray::Array3;
use std::path::{Path, PathBuf};

/// Decode an image file into an RGB pixel buffer
///
/// Any format the `image` crate can decode is accepted; alpha is dropped.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded
pub fn load_tile_image(path: &Path) -> Result<PixelBuffer> {
    let decoded = image::open(path).map_err(|e| AlgorithmError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })?;

    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    Array3::from_shape_vec((height as usize, width as usize, 3), rgb.into_raw()).map_err(|e| {
        type_mismatch(
            &format!("a {height}x{width} RGB image"),
            &format!("{}: {e}", path.display()),
        )
    })
}

/// Load every PNG in `dir` as a tile of the given frequency
///
/// Files are read in sorted filename order. With `rotate` set the patterns are
/// augmented by their distinct quarter-turn rotations, see
/// [`with_rotations`].
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be read
/// - An image cannot be decoded
/// - `frequency` is zero
/// - `rotate` is set and a tile is not square
pub fn load_tiles_from_directory(dir: &Path, frequency: u32, rotate: bool) -> Result<Vec<Tile>> {
    let mut paths = png_files(dir)?;
    paths.sort();
    log::debug!("Loading {} tile images from {}", paths.len(), dir.display());

    let mut patterns = paths
        .iter()
        .map(|path| load_tile_image(path))
        .collect::<Result<Vec<_>>>()?;

    if rotate {
        patterns = with_rotations(patterns)?;
    }

    patterns
        .into_iter()
        .map(|pattern| Tile::new(pattern, frequency))
        .collect()
}

fn png_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_error = |e| AlgorithmError::FileSystem {
        path: dir.to_path_buf(),
        operation: "read directory",
        source: e,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        let is_png = path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("png"));
        if is_png && path.is_file() {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Add the distinct quarter-turn rotations of each pattern
///
/// A pattern that looks the same after a quarter turn contributes nothing.
/// Otherwise its 90 degree rotation is added, the 180 degree rotation unless it
/// matches the pattern itself, and the 270 degree rotation unless it matches
/// the 90 degree one.
///
/// # Errors
///
/// Returns an error if a pattern is not square
pub fn with_rotations(patterns: Vec<PixelBuffer>) -> Result<Vec<PixelBuffer>> {
    let mut augmented = Vec::with_capacity(patterns.len() * 4);

    for pattern in patterns {
        let (height, width, _) = pattern.dim();
        if height != width {
            return Err(invalid_parameter(
                "rotate",
                &format!("{height}x{width}"),
                &"only square tiles can be rotated",
            ));
        }

        let quarter = rotate_90(&pattern);
        if quarter == pattern {
            augmented.push(pattern);
            continue;
        }

        let half = rotate_90(&quarter);
        let three_quarters = rotate_90(&half);

        let keep_half = half != pattern;
        let keep_three_quarters = three_quarters != quarter;

        augmented.push(pattern);
        augmented.push(quarter);
        if keep_half {
            augmented.push(half);
        }
        if keep_three_quarters {
            augmented.push(three_quarters);
        }
    }

    Ok(augmented)
}

/// Convert a pixel buffer into an `image` RGB image
///
/// # Errors
///
/// Returns an error if the buffer does not have three channels
pub fn to_rgb_image(buffer: &PixelBuffer) -> Result<RgbImage> {
    let (height, width, channels) = buffer.dim();
    if channels != 3 {
        return Err(type_mismatch(
            &"an RGB pixel buffer",
            &format!("{channels} channels"),
        ));
    }

    let raw: Vec<u8> = buffer.iter().copied().collect();
    RgbImage::from_raw(width as u32, height as u32, raw).ok_or_else(|| {
        type_mismatch(
            &format!("{} bytes", width * height * 3),
            &"a buffer of a different size",
        )
    })
}

/// Save a pixel buffer as PNG, creating parent directories as needed
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be encoded or written
pub fn export_image_as_png(buffer: &PixelBuffer, output_path: &Path) -> Result<()> {
    let image = to_rgb_image(buffer)?;

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AlgorithmError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    image
        .save(output_path)
        .map_err(|e| AlgorithmError::ImageExport {
            path: output_path.to_path_buf(),
            source: e,
        })
}
