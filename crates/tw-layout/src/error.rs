// ABOUTME: Error type for window tree operations.
// ABOUTME: Every failing operation leaves the tree exactly as it was.

use crate::node::{Axis, Side, WindowId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("window {window} cannot be resized by {delta}")]
    NotResizable { window: WindowId, delta: i32 },

    #[error("the root window of a frame cannot be resized or deleted")]
    RootWindow,

    #[error("cannot delete the last main window while side windows exist")]
    LastMainWindow,

    #[error("window {window} is too small to split (requested size {size:?})")]
    InvalidSplitSize { window: WindowId, size: Option<i32> },

    #[error("window {0} does not exist")]
    NoSuchWindow(WindowId),

    #[error("window {0} is not a leaf window")]
    NotLeaf(WindowId),

    #[error("window {window} has no neighbor along its {} edge", axis.label())]
    NoNeighbor { window: WindowId, axis: Axis },

    #[error("side region {side:?} is limited to {slots} windows")]
    SideSlotsExhausted { side: Side, slots: usize },

    #[error("cannot make side window {0} the only window")]
    SideWindow(WindowId),

    #[error("window tree is corrupt: {0}")]
    CorruptTree(String),
}
