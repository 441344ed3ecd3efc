use crate::{
    algorithm::propagation::{Propagation, propagate},
    algorithm::queue::{CellEntry, UpdatablePriorityQueue},
    io::configuration::DEFAULT_OUTPUT_DIMENSION,
    io::error::{AlgorithmError, Result},
    spatial::tiles::{PixelBuffer, Tile, TileSet},
    spatial::{Dimension, Grid},
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::Arc;

/// Run parameters for a [`WaveFunctionCollapse`] controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Output size in tiles as (rows, cols)
    pub output_dimension: (usize, usize),
    /// Start a fresh attempt whenever one ends in a contradiction
    pub repeat_until_success: bool,
    /// Allow a completed run to be followed by a new one
    pub rerun: bool,
    /// Seed for a reproducible random stream, OS entropy when unset
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dimension: DEFAULT_OUTPUT_DIMENSION,
            repeat_until_success: true,
            rerun: true,
            seed: None,
        }
    }
}

/// Outcome of a concluded run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunResult {
    /// Whether every cell collapsed without contradiction
    pub success: bool,
    /// Composed grid image, `rows*h x cols*w x 3`
    pub image: PixelBuffer,
}

/// One pull from the controller
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Grid image after a collapse and its propagation
    Snapshot(PixelBuffer),
    /// The run concluded
    Completed(RunResult),
}

impl Step {
    /// The image carried by this step
    pub const fn image(&self) -> &PixelBuffer {
        match self {
            Self::Snapshot(image) => image,
            Self::Completed(result) => &result.image,
        }
    }
}

/// Grid and queue of the attempt in flight
#[derive(Debug)]
struct Attempt {
    tiles: Arc<TileSet>,
    grid: Grid,
    queue: UpdatablePriorityQueue<CellEntry>,
    seeded: bool,
    steps: usize,
}

/// Result of advancing an attempt by one collapse
enum AttemptStep {
    Snapshot(PixelBuffer),
    Finished { success: bool },
}

impl Attempt {
    fn new(dimension: Dimension, tiles: Arc<TileSet>) -> Self {
        let grid = Grid::new(dimension, &tiles);
        Self {
            tiles,
            grid,
            queue: UpdatablePriorityQueue::new(),
            seeded: false,
            steps: 0,
        }
    }

    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> AttemptStep {
        let origin = if self.seeded {
            match self.next_collapse(rng) {
                Some(origin) => origin,
                None => {
                    return AttemptStep::Finished {
                        success: self.grid.is_fully_collapsed(),
                    };
                }
            }
        } else {
            self.seeded = true;
            match self.seed(rng) {
                Some(origin) => origin,
                None => return AttemptStep::Finished { success: false },
            }
        };

        if let Propagation::Contradiction { index } =
            propagate(origin, &mut self.grid, &self.tiles, &mut self.queue)
        {
            log::debug!(
                "Contradiction at cell {index} after collapsing cell {origin}, step {}",
                self.steps
            );
            return AttemptStep::Finished { success: false };
        }

        self.steps += 1;
        AttemptStep::Snapshot(self.grid.compose_image(&self.tiles))
    }

    /// Collapse a uniformly drawn start cell and queue every other cell
    fn seed<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize> {
        let origin = rng.random_range(0..self.grid.len());
        let _ = self.grid.cell_mut(origin)?.collapse(&self.tiles, rng)?;

        for (index, cell) in self.grid.cells().iter().enumerate() {
            if !cell.is_collapsed() {
                self.queue.push(CellEntry::new(index, cell.entropy(&self.tiles)));
            }
        }
        Some(origin)
    }

    /// Collapse the lowest-entropy cell that is still unresolved
    ///
    /// Cells that collapsed during propagation are dropped from the queue.
    /// Returns `None` when nothing is left to collapse.
    fn next_collapse<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize> {
        while let Ok(entry) = self.queue.pop() {
            let cell = self.grid.cell_mut(entry.index)?;
            if cell.is_collapsed() {
                continue;
            }
            let _ = cell.collapse(&self.tiles, rng)?;
            return Some(entry.index);
        }
        None
    }
}

#[derive(Debug)]
enum RunState {
    /// Configuration changed or nothing has run yet
    Stale,
    Running(Attempt),
    Completed,
}

/// Resumable Wave Function Collapse run controller
///
/// Every [`advance`](Self::advance) performs one collapse and its propagation,
/// returning the resulting grid image, until the run concludes with a
/// [`RunResult`]. Attempts ending in a contradiction are discarded whole and,
/// when `repeat_until_success` is set, restarted on a fresh grid. A restart is
/// reported as a snapshot of that undecided grid, so every pull returns even
/// when no attempt can succeed.
///
/// Changing any setting discards the attempt in flight; the next pull starts
/// a new run with the new settings.
#[derive(Debug)]
pub struct WaveFunctionCollapse {
    tiles: Arc<TileSet>,
    dimension: Dimension,
    repeat_until_success: bool,
    rerun: bool,
    seed: Option<u64>,
    rng: StdRng,
    state: RunState,
    result: Option<RunResult>,
    attempts: usize,
}

impl WaveFunctionCollapse {
    /// Create a controller for the given patterns
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Either output dimension is zero
    /// - `patterns` is empty
    /// - The patterns do not all share one shape
    pub fn new(config: RunConfig, patterns: Vec<Tile>) -> Result<Self> {
        let dimension = Dimension::try_from(config.output_dimension)?;
        let tiles = Arc::new(TileSet::new(patterns)?);

        Ok(Self {
            tiles,
            dimension,
            repeat_until_success: config.repeat_until_success,
            rerun: config.rerun,
            seed: config.seed,
            rng: seeded_rng(config.seed),
            state: RunState::Stale,
            result: None,
            attempts: 0,
        })
    }

    /// Output size in tiles
    pub const fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Tile set used by the next attempt
    pub fn tiles(&self) -> &TileSet {
        &self.tiles
    }

    /// Whether failed attempts are retried
    pub const fn repeat_until_success(&self) -> bool {
        self.repeat_until_success
    }

    /// Whether a completed run may be followed by a new one
    pub const fn rerun(&self) -> bool {
        self.rerun
    }

    /// Configured random seed
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Change the output size
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero; the controller is left
    /// unchanged in that case
    pub fn set_output_dimension(&mut self, rows: usize, cols: usize) -> Result<()> {
        self.dimension = Dimension::new(rows, cols)?;
        self.mark_stale();
        Ok(())
    }

    /// Replace the tile set
    ///
    /// # Errors
    ///
    /// Returns an error if `patterns` is empty or mixes pattern shapes; the
    /// controller is left unchanged in that case
    pub fn set_patterns(&mut self, patterns: Vec<Tile>) -> Result<()> {
        self.tiles = Arc::new(TileSet::new(patterns)?);
        self.mark_stale();
        Ok(())
    }

    /// Enable or disable retrying after a contradiction
    pub fn set_repeat_until_success(&mut self, repeat_until_success: bool) {
        self.repeat_until_success = repeat_until_success;
        self.mark_stale();
    }

    /// Enable or disable starting a new run after completion
    pub fn set_rerun(&mut self, rerun: bool) {
        self.rerun = rerun;
        self.mark_stale();
    }

    /// Reseed the random stream
    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
        self.rng = seeded_rng(seed);
        self.mark_stale();
    }

    /// Forget the current run and restart the random stream from the seed
    pub fn reset(&mut self) {
        self.rng = seeded_rng(self.seed);
        self.result = None;
        self.mark_stale();
    }

    /// Pull the next snapshot or the final result
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCollapsed` if the run has completed and reruns are
    /// disabled
    pub fn advance(&mut self) -> Result<Step> {
        if matches!(self.state, RunState::Completed) {
            if !self.rerun {
                return Err(AlgorithmError::AlreadyCollapsed);
            }
            self.state = RunState::Stale;
        }

        if matches!(self.state, RunState::Stale) {
            self.begin_run();
        }

        loop {
            let RunState::Running(attempt) = &mut self.state else {
                self.begin_attempt();
                continue;
            };

            match attempt.step(&mut self.rng) {
                AttemptStep::Snapshot(image) => return Ok(Step::Snapshot(image)),
                AttemptStep::Finished { success } => {
                    if !success && self.repeat_until_success {
                        log::debug!("Attempt {} failed, retrying", self.attempts);
                        self.begin_attempt();
                        return Ok(Step::Snapshot(self.preview_image()));
                    }
                    let image = attempt.grid.compose_image(&attempt.tiles);
                    return Ok(Step::Completed(self.complete(success, image)));
                }
            }
        }
    }

    /// Drive the run until it concludes
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCollapsed` if the run has completed and reruns are
    /// disabled
    pub fn run_to_completion(&mut self) -> Result<RunResult> {
        loop {
            if let Step::Completed(result) = self.advance()? {
                return Ok(result);
            }
        }
    }

    /// Last completed result, or a preview of an undecided grid
    ///
    /// The preview shows every cell as the per-pixel mean of the whole tile
    /// set and reports `success = false`.
    pub fn current_result(&self) -> RunResult {
        self.result.clone().unwrap_or_else(|| RunResult {
            success: false,
            image: self.preview_image(),
        })
    }

    /// Iterate over the remaining steps of the run
    ///
    /// The iterator ends after yielding the completed result or an error.
    pub fn steps_iter(&mut self) -> StepIter<'_> {
        StepIter {
            controller: self,
            done: false,
        }
    }

    /// Attempts started in the current run
    pub const fn attempts(&self) -> usize {
        self.attempts
    }

    /// Snapshots emitted by the attempt in flight
    pub const fn steps(&self) -> usize {
        match &self.state {
            RunState::Running(attempt) => attempt.steps,
            RunState::Stale | RunState::Completed => 0,
        }
    }

    /// Collapsed cells in the attempt in flight
    pub fn collapsed_cells(&self) -> usize {
        match &self.state {
            RunState::Running(attempt) => attempt.grid.collapsed_count(),
            RunState::Stale | RunState::Completed => 0,
        }
    }

    /// Number of cells in the output grid
    pub const fn cell_count(&self) -> usize {
        self.dimension.cell_count()
    }

    /// Whether an attempt is in flight
    pub const fn is_running(&self) -> bool {
        matches!(self.state, RunState::Running(_))
    }

    /// Whether the next [`advance`](Self::advance) would produce a step
    pub const fn has_more(&self) -> bool {
        !matches!(self.state, RunState::Completed) || self.rerun
    }

    fn mark_stale(&mut self) {
        self.state = RunState::Stale;
    }

    fn begin_run(&mut self) {
        self.attempts = 0;
        self.result = None;
        self.begin_attempt();
    }

    fn begin_attempt(&mut self) {
        self.attempts += 1;
        log::debug!(
            "Starting attempt {} on a {}x{} grid with {} tiles",
            self.attempts,
            self.dimension.rows(),
            self.dimension.cols(),
            self.tiles.len()
        );
        self.state = RunState::Running(Attempt::new(self.dimension, Arc::clone(&self.tiles)));
    }

    /// Grid image with every cell showing the mean of the whole tile set
    fn preview_image(&self) -> PixelBuffer {
        let preview = self.tiles.preview_image();
        let (tile_height, tile_width) = self.tiles.tile_shape();
        PixelBuffer::from_shape_fn(
            (
                self.dimension.rows() * tile_height,
                self.dimension.cols() * tile_width,
                3,
            ),
            |(row, col, channel)| {
                preview
                    .get([row % tile_height, col % tile_width, channel])
                    .copied()
                    .unwrap_or(0)
            },
        )
    }

    fn complete(&mut self, success: bool, image: PixelBuffer) -> RunResult {
        if success {
            log::info!("Collapse succeeded after {} attempt(s)", self.attempts);
        } else {
            log::info!("Collapse failed after {} attempt(s)", self.attempts);
        }

        let result = RunResult { success, image };
        self.result = Some(result.clone());
        self.state = RunState::Completed;
        result
    }
}

/// Iterator over the steps of one run, see [`WaveFunctionCollapse::steps_iter`]
#[derive(Debug)]
pub struct StepIter<'a> {
    controller: &'a mut WaveFunctionCollapse,
    done: bool,
}

impl Iterator for StepIter<'_> {
    type Item = Result<Step>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let step = self.controller.advance();
        self.done = matches!(step, Ok(Step::Completed(_)) | Err(_));
        Some(step)
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
}
