//! Multi-run progress tracking with automatic batching for large counts

use crate::io::configuration::MAX_INDIVIDUAL_PROGRESS_BARS;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;

/// Display state of one run: label, collapsed cells, total cells, attempt
#[derive(Debug, Clone, Default)]
struct RunState {
    label: String,
    collapsed: usize,
    cells: usize,
    attempt: usize,
}

/// Coordinates progress display while generating images
///
/// Shows one bar per run for small counts. Larger counts add a batch bar and
/// keep only the most recent runs visible.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    run_bars: Vec<ProgressBar>,
    runs: Vec<RunState>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

static PROGRESS_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:30.cyan/blue}] {prefix}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Images: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            run_bars: Vec::new(),
            runs: Vec::new(),
        }
    }

    /// Create the bars for `run_count` images
    pub fn initialize(&mut self, run_count: usize) {
        if run_count > MAX_INDIVIDUAL_PROGRESS_BARS + 1 {
            let batch_bar = ProgressBar::new(run_count as u64);
            batch_bar.set_style(BATCH_STYLE.clone());
            self.batch_bar = Some(self.multi_progress.add(batch_bar));
        }

        for _ in 0..run_count.min(MAX_INDIVIDUAL_PROGRESS_BARS) {
            let bar = ProgressBar::new(0);
            bar.set_style(PROGRESS_STYLE.clone());
            self.run_bars.push(self.multi_progress.add(bar));
        }
    }

    /// Start tracking run `index` over a grid of `cells` cells
    pub fn start_run(&mut self, index: usize, label: &str, cells: usize) {
        if index >= self.runs.len() {
            self.runs.resize(index + 1, RunState::default());
        }
        if let Some(run) = self.runs.get_mut(index) {
            *run = RunState {
                label: label.to_string(),
                collapsed: 0,
                cells,
                attempt: 1,
            };
        }
        self.update_bars();
    }

    /// Report collapsed cells of the current attempt of run `index`
    pub fn update_run(&mut self, index: usize, collapsed: usize, attempt: usize) {
        if let Some(run) = self.runs.get_mut(index) {
            run.collapsed = collapsed;
            run.attempt = attempt;
        }
        self.update_bars();
    }

    /// Mark run `index` as finished
    pub fn complete_run(&mut self, index: usize, success: bool) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.inc(1);
        }

        if let Some(run) = self.runs.get_mut(index) {
            let mark = if success { "✓" } else { "✗" };
            run.label = format!("{mark} {}", run.label);
            if success {
                run.collapsed = run.cells;
            }
        }
        self.update_bars();
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.finish_with_message("All images generated");
        }
        let _ = self.multi_progress.clear();
    }

    /// Show the most recent runs on the available bars
    fn update_bars(&self) {
        let active: Vec<&RunState> = self.runs.iter().filter(|run| !run.label.is_empty()).collect();
        let start = active.len().saturating_sub(MAX_INDIVIDUAL_PROGRESS_BARS);
        let visible = active.get(start..).unwrap_or(&[]);

        for (bar, run) in self.run_bars.iter().zip(visible) {
            bar.set_length(run.cells as u64);
            bar.set_position(run.collapsed as u64);
            let width = run.cells.to_string().len();
            bar.set_message(format!(
                "{:>width$}/{} (attempt {})",
                run.collapsed, run.cells, run.attempt
            ));
            bar.set_prefix(run.label.clone());
        }

        for bar in self.run_bars.iter().skip(visible.len()) {
            bar.set_length(0);
            bar.set_position(0);
            bar.set_message(String::new());
            bar.set_prefix(String::new());
        }
    }
}
