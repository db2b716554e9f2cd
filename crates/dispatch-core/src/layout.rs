//! Pane grid for one terminal window.
//!
//! Each supported pane count maps to a fixed list of split steps. A step
//! splits an already-created pane (by index) to the right or downward; the
//! result is a top row filled left to right, then a bottom row.
//!
//! ```text
//! 4 panes        5 panes            6 panes
//! +----+----+    +----+----+----+   +----+----+----+
//! | 0  | 1  |    | 0  | 1  | 2  |   | 0  | 1  | 2  |
//! +----+----+    +----+----+    |   +----+----+----+
//! | 2  | 3  |    | 3  | 4  |    |   | 3  | 4  | 5  |
//! +----+----+    +----+----+----+   +----+----+----+
//! ```

use crate::error::Result;
use crate::terminal::SplitDirection::{Down, Right};
use crate::terminal::{PaneHandle, SplitDirection, TerminalBackend};

/// Largest grid a window can hold.
pub const MAX_PANES: usize = 6;

/// Split steps per pane count, indexed by `count - 1`.
const GRIDS: [&[(usize, SplitDirection)]; MAX_PANES] = [
    &[],
    &[(0, Right)],
    &[(0, Right), (1, Right)],
    &[(0, Right), (0, Down), (1, Down)],
    &[(0, Right), (1, Right), (0, Down), (1, Down)],
    &[(0, Right), (1, Right), (0, Down), (1, Down), (2, Down)],
];

/// Split steps for `count` panes, if that count has a grid.
pub fn plan(count: usize) -> Option<&'static [(usize, SplitDirection)]> {
    count.checked_sub(1).and_then(|i| GRIDS.get(i)).copied()
}

/// Carve the window rooted at `root` into `count` panes.
///
/// Returns handles in grid order. Counts without a grid leave the window
/// as a single pane.
pub fn layout(
    backend: &mut dyn TerminalBackend,
    root: PaneHandle,
    count: usize,
) -> Result<Vec<PaneHandle>> {
    let mut panes = vec![root];
    let Some(steps) = plan(count) else {
        return Ok(panes);
    };
    for &(parent, direction) in steps {
        let child = backend.split(&panes[parent], direction)?;
        panes.push(child);
    }
    Ok(panes)
}

/// Split `units` into windows of at most `capacity` panes.
pub fn batches<T>(units: &[T], capacity: usize) -> impl Iterator<Item = &[T]> {
    units.chunks(capacity.clamp(1, MAX_PANES))
}
