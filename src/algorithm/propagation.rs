use crate::{
    algorithm::queue::{CellEntry, UpdatablePriorityQueue},
    spatial::{Grid, tiles::Direction, tiles::TileSet},
};

/// Outcome of propagating a collapse through the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Every narrowed cell kept at least one option
    Continue,
    /// A cell ran out of options; the grid can no longer be completed
    Contradiction {
        /// Flat index of the contradicted cell
        index: usize,
    },
}

impl Propagation {
    /// Whether propagation hit a contradiction
    pub const fn is_contradiction(self) -> bool {
        matches!(self, Self::Contradiction { .. })
    }
}

/// Pending narrowing of `target` against its neighbor `source`
#[derive(Debug, Clone, Copy)]
struct PendingUpdate {
    target: usize,
    source: usize,
    /// Position of `target` relative to `source`
    direction: Direction,
}

/// Flood the consequences of a collapse at `origin` through the grid
///
/// Works depth-first with an explicit stack over the four orthogonal
/// neighbors. A neighbor whose options shrink is re-queued at its new entropy
/// and its own neighbors are revisited, so constraints cascade as far as they
/// reach. Collapsed neighbors are never touched. Stops at the first cell left
/// without options.
pub fn propagate(
    origin: usize,
    grid: &mut Grid,
    tiles: &TileSet,
    queue: &mut UpdatablePriorityQueue<CellEntry>,
) -> Propagation {
    let mut stack: Vec<PendingUpdate> = Vec::new();
    push_neighbors(&mut stack, grid, origin);

    while let Some(update) = stack.pop() {
        let Some(target) = grid.cell(update.target) else {
            continue;
        };
        if target.is_collapsed() {
            continue;
        }

        if !grid.narrow(update.target, update.source, update.direction, tiles) {
            continue;
        }

        let Some(target) = grid.cell(update.target) else {
            continue;
        };
        if !target.is_valid() {
            return Propagation::Contradiction {
                index: update.target,
            };
        }

        queue.push(CellEntry::new(update.target, target.entropy(tiles)));
        push_neighbors(&mut stack, grid, update.target);
    }

    Propagation::Continue
}

fn push_neighbors(stack: &mut Vec<PendingUpdate>, grid: &Grid, source: usize) {
    stack.extend(
        grid.neighbors(source)
            .map(|(target, direction)| PendingUpdate {
                target,
                source,
                direction,
            }),
    );
}
