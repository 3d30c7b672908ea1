// ABOUTME: Serializable snapshot of a frame's window layout.
// ABOUTME: Used for JSON output and for comparing layouts in tests.

use serde::{Deserialize, Serialize};

use crate::frame::Frame;
use crate::node::{Axis, FixedSize, GroupId, NormalSize, Rect, Side, Size, WindowId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub size: Size,
    pub selected: WindowId,
    pub root: WindowSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub id: WindowId,
    pub rect: Rect,
    pub normal: NormalSize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed: Option<FixedSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atom: Option<GroupId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<WindowSnapshot>,
}

impl Frame {
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            size: self.size(),
            selected: self.selected(),
            root: self.window_snapshot(self.root()),
        }
    }

    fn window_snapshot(&self, id: WindowId) -> WindowSnapshot {
        let tree = self.tree();
        let node = &tree[id];
        WindowSnapshot {
            id,
            rect: tree.edges(id),
            normal: node.normal_size(),
            axis: node.combination_axis(),
            fixed: node.fixed_size(),
            side: node.side(),
            atom: node.atom_group(),
            children: node
                .children()
                .iter()
                .map(|&c| self.window_snapshot(c))
                .collect(),
        }
    }
}
