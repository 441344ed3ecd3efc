//! Command-line interface for generating images from a directory of tiles

use crate::algorithm::executor::{RunConfig, RunResult, Step, WaveFunctionCollapse};
use crate::io::configuration::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_OUTPUT_DIMENSION, DEFAULT_RUN_COUNT, DEFAULT_TILE_FREQUENCY,
    GIF_FRAME_DELAY_MS, OUTPUT_SUFFIX,
};
use crate::io::error::{AlgorithmError, Result, invalid_parameter, io_error};
use crate::io::image::{export_image_as_png, load_tiles_from_directory};
use crate::io::progress::ProgressManager;
use crate::io::visualization::SnapshotRecorder;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "tilecollapse")]
#[command(
    author,
    version,
    about = "Generate images from edge-matching tiles using Wave Function Collapse"
)]
/// Command-line arguments for the image generation tool
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Directory of PNG tiles, all of the same size
    #[arg(value_name = "TILES")]
    pub tiles: PathBuf,

    /// Output height in tiles
    #[arg(short, long, default_value_t = DEFAULT_OUTPUT_DIMENSION.0)]
    pub rows: usize,

    /// Output width in tiles
    #[arg(short, long, default_value_t = DEFAULT_OUTPUT_DIMENSION.1)]
    pub cols: usize,

    /// Random seed for reproducible generation
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Number of images to generate
    #[arg(short = 'n', long, default_value_t = DEFAULT_RUN_COUNT)]
    pub count: usize,

    /// Add the 90°, 180° and 270° rotations of every tile
    #[arg(long)]
    pub rotate: bool,

    /// Frequency given to every loaded tile
    #[arg(long, default_value_t = DEFAULT_TILE_FREQUENCY)]
    pub frequency: u32,

    /// Give up on the first contradiction instead of retrying
    #[arg(long)]
    pub no_retry: bool,

    /// Maximum attempts per image before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: usize,

    /// Enable visualization output as animated GIF
    #[arg(short, long)]
    pub visualize: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output PNG path, defaults to `<TILES>_result.png` next to the tile directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Controller settings derived from the arguments
    ///
    /// Retries are driven by [`Generator`] so the attempt budget can be
    /// enforced, and reruns are always enabled so one controller can produce
    /// every requested image.
    pub const fn run_config(&self) -> RunConfig {
        RunConfig {
            output_dimension: (self.rows, self.cols),
            repeat_until_success: false,
            rerun: true,
            seed: self.seed,
        }
    }

    /// Check argument values that clap cannot validate on its own
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `count` or `max_attempts` is zero
    /// - The tile path is not a directory
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(invalid_parameter(
                "count",
                &self.count,
                &"at least one image must be requested",
            ));
        }
        if self.max_attempts == 0 {
            return Err(invalid_parameter(
                "max-attempts",
                &self.max_attempts,
                &"at least one attempt must be allowed",
            ));
        }
        if !self.tiles.is_dir() {
            return Err(io_error("Tile path must be a directory of PNG images"));
        }
        Ok(())
    }
}

/// Drives a controller to produce every requested image with progress tracking
pub struct Generator {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl Generator {
    /// Create a new generator with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Generate and export every requested image
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Argument validation fails
    /// - The tiles cannot be loaded or do not form a valid tile set
    /// - An image runs out of attempts
    /// - Exporting an image fails
    pub fn process(&mut self) -> Result<()> {
        self.cli.validate()?;

        let tiles = load_tiles_from_directory(&self.cli.tiles, self.cli.frequency, self.cli.rotate)?;
        log::info!(
            "Loaded {} tiles from {}",
            tiles.len(),
            self.cli.tiles.display()
        );

        let mut controller = WaveFunctionCollapse::new(self.cli.run_config(), tiles)?;

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(self.cli.count);
        }

        for index in 0..self.cli.count {
            self.generate(&mut controller, index)?;
        }

        if let Some(ref pm) = self.progress_manager {
            pm.finish();
        }

        Ok(())
    }

    fn generate(&mut self, controller: &mut WaveFunctionCollapse, index: usize) -> Result<()> {
        let output_path = self.output_path(index);
        let mut recorder = self
            .cli
            .visualize
            .then(|| SnapshotRecorder::new(controller.cell_count()));

        if let Some(ref mut pm) = self.progress_manager {
            let label = output_path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            pm.start_run(index, &label, controller.cell_count());
        }

        let mut attempts = 0;
        let result = loop {
            attempts += 1;
            if attempts > self.cli.max_attempts {
                return Err(AlgorithmError::AttemptLimitReached {
                    attempts: self.cli.max_attempts,
                });
            }

            let outcome = self.drive_attempt(controller, index, attempts, recorder.as_mut())?;
            if outcome.success || self.cli.no_retry {
                break outcome;
            }

            log::debug!("Image {index}: attempt {attempts} hit a contradiction");
            if let Some(ref mut recorder) = recorder {
                recorder.clear();
            }
        };

        if !result.success {
            log::warn!(
                "Image {index} ended in a contradiction; exporting the partial grid"
            );
        }

        export_image_as_png(&result.image, &output_path)?;

        if let Some(ref recorder) = recorder {
            recorder.export_gif(&Self::visualization_path(&output_path), GIF_FRAME_DELAY_MS)?;
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.complete_run(index, result.success);
        }

        Ok(())
    }

    /// Pull one attempt from the controller until it concludes
    fn drive_attempt(
        &mut self,
        controller: &mut WaveFunctionCollapse,
        index: usize,
        attempt: usize,
        mut recorder: Option<&mut SnapshotRecorder>,
    ) -> Result<RunResult> {
        loop {
            match controller.advance()? {
                Step::Snapshot(image) => {
                    if let Some(recorder) = recorder.as_deref_mut() {
                        recorder.record(&image)?;
                    }
                    if let Some(ref mut pm) = self.progress_manager {
                        pm.update_run(index, controller.collapsed_cells(), attempt);
                    }
                }
                Step::Completed(result) => {
                    if let Some(recorder) = recorder {
                        recorder.record(&result.image)?;
                    }
                    return Ok(result);
                }
            }
        }
    }

    /// Output PNG path for image `index`
    ///
    /// When several images are requested each gets its index appended.
    pub fn output_path(&self, index: usize) -> PathBuf {
        let base = self
            .cli
            .output
            .clone()
            .unwrap_or_else(|| Self::default_output_path(&self.cli.tiles));

        if self.cli.count <= 1 {
            return base;
        }

        let stem = base.file_stem().unwrap_or_default().to_string_lossy();
        let file_name = base.extension().map_or_else(
            || format!("{stem}_{index}"),
            |extension| format!("{stem}_{index}.{}", extension.to_string_lossy()),
        );
        base.with_file_name(file_name)
    }

    fn default_output_path(tiles: &Path) -> PathBuf {
        let name = tiles
            .file_name()
            .map_or_else(|| "tiles".into(), |name| name.to_string_lossy());
        let output_name = format!("{name}{OUTPUT_SUFFIX}.png");

        match tiles.parent() {
            Some(parent) => parent.join(output_name),
            None => PathBuf::from(output_name),
        }
    }

    fn visualization_path(output_path: &Path) -> PathBuf {
        let stem = output_path.file_stem().unwrap_or_default();
        output_path.with_file_name(format!("{}_visualization.gif", stem.to_string_lossy()))
    }
}
