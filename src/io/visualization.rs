//! Snapshot capture and GIF generation for collapse visualization

use crate::io::configuration::VIEWER_MIN_FRAME_DELAY_MS;
use crate::io::error::{AlgorithmError, Result};
use crate::io::image::to_rgb_image;
use crate::spatial::tiles::PixelBuffer;
use image::{Delay, DynamicImage, Frame, RgbaImage};
use std::path::Path;

/// Records grid snapshots for an animated replay of a run
///
/// Snapshots are stored in the order they were emitted. Recording several
/// attempts in a row is allowed; the replay then shows each of them.
#[derive(Debug, Default)]
pub struct SnapshotRecorder {
    frames: Vec<RgbaImage>,
}

impl SnapshotRecorder {
    /// Create a recorder with room for `expected_frames` snapshots
    pub fn new(expected_frames: usize) -> Self {
        Self {
            frames: Vec::with_capacity(expected_frames),
        }
    }

    /// Record one snapshot
    ///
    /// A snapshot identical to the last recorded one is not stored again.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is not an RGB image
    pub fn record(&mut self, snapshot: &PixelBuffer) -> Result<()> {
        let rgb = to_rgb_image(snapshot)?;
        let frame = DynamicImage::ImageRgb8(rgb).to_rgba8();
        if self.frames.last() != Some(&frame) {
            self.frames.push(frame);
        }
        Ok(())
    }

    /// Number of recorded snapshots
    pub const fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Whether nothing has been recorded
    pub const fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop every recorded snapshot
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Export the recorded snapshots as a GIF with automatic frame skipping
    ///
    /// Viewers clamp very short frame delays, so when `frame_delay_ms` is below
    /// what they support only every n-th snapshot is kept to preserve the
    /// apparent speed. With a requested 20ms delay against a 50ms viewer floor,
    /// every 3rd snapshot is written. The last snapshot is always written and
    /// held on screen longer.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No snapshots were recorded
    /// - File system operations fail
    /// - GIF encoding fails
    pub fn export_gif(&self, output_path: &Path, frame_delay_ms: u32) -> Result<()> {
        let Some(last) = self.frames.last() else {
            return Err(AlgorithmError::InvalidParameter {
                parameter: "visualization",
                value: output_path.display().to_string(),
                reason: "No snapshots captured for visualization".to_string(),
            });
        };

        let effective_delay_ms = frame_delay_ms.max(VIEWER_MIN_FRAME_DELAY_MS);
        let skip_factor = frames_to_skip(frame_delay_ms);

        let mut frames: Vec<Frame> = self
            .frames
            .iter()
            .enumerate()
            .filter(|(index, _)| (index + 1) % skip_factor == 0)
            .map(|(_, image)| frame(image.clone(), effective_delay_ms))
            .collect();

        if self.frames.len() % skip_factor != 0 {
            frames.push(frame(last.clone(), effective_delay_ms));
        }

        // Hold the finished grid on screen
        frames.push(frame(last.clone(), effective_delay_ms * 25));

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AlgorithmError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }

        let file = std::fs::File::create(output_path).map_err(|e| AlgorithmError::FileSystem {
            path: output_path.to_path_buf(),
            operation: "create file",
            source: e,
        })?;

        let mut encoder = image::codecs::gif::GifEncoder::new(file);
        encoder
            .encode_frames(frames)
            .map_err(|e| AlgorithmError::ImageExport {
                path: output_path.to_path_buf(),
                source: e,
            })
    }
}

/// Keep one snapshot in this many for the requested frame delay
pub const fn frames_to_skip(frame_delay_ms: u32) -> usize {
    if frame_delay_ms == 0 {
        return VIEWER_MIN_FRAME_DELAY_MS as usize;
    }
    if frame_delay_ms < VIEWER_MIN_FRAME_DELAY_MS {
        VIEWER_MIN_FRAME_DELAY_MS.div_ceil(frame_delay_ms) as usize
    } else {
        1
    }
}

fn frame(image: RgbaImage, delay_ms: u32) -> Frame {
    Frame::from_parts(image, 0, 0, Delay::from_numer_denom_ms(delay_ms, 1))
}
