// ABOUTME: Structural consistency check for a frame's window tree.
// ABOUTME: Verifies links, size sums, normal sums, minimums and group tags.

use crate::error::LayoutError;
use crate::frame::Frame;
use crate::groups::{broken_atom_roots, sides_valid};
use crate::node::Axis;
use crate::solver::Ignore;

/// Tolerance for normal sizes summing to one.
const NORMAL_EPSILON: f64 = 1e-6;

impl Frame {
    /// Check every tree invariant, reporting the first violation found.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let tree = &self.tree;
        let root = tree.root();
        let corrupt = |msg: String| Err(LayoutError::CorruptTree(msg));

        if tree.parent(root).is_some() {
            return corrupt(format!("root {root} has a parent"));
        }
        let reachable = tree.walk(root);
        if reachable.len() != tree.live_count() {
            return corrupt(format!(
                "{} windows are live but only {} are reachable",
                tree.live_count(),
                reachable.len()
            ));
        }
        if !tree.contains(self.selected) || !tree.is_leaf(self.selected) {
            return corrupt(format!("selected window {} is not a live leaf", self.selected));
        }

        for &id in &reachable {
            let node = &tree[id];
            if node.total.height < 1 || node.total.width < 1 {
                return corrupt(format!("window {id} has empty size {:?}", node.total));
            }
            let Some(axis) = node.combination_axis() else {
                for axis in [Axis::Vertical, Axis::Horizontal] {
                    let min = tree.min_size(id, axis, Ignore::Safe);
                    if tree.total(id, axis) < min {
                        return corrupt(format!(
                            "window {id} {} {} is below the safe minimum {min}",
                            axis.label(),
                            tree.total(id, axis)
                        ));
                    }
                }
                continue;
            };

            let children = node.children();
            if children.len() < 2 {
                return corrupt(format!("combination {id} has {} children", children.len()));
            }
            let mut sum = 0;
            let mut normals = 0.0;
            for &child in children {
                if tree.parent(child) != Some(id) {
                    return corrupt(format!("child {child} does not point back to {id}"));
                }
                if tree.total(child, axis.other()) != tree.total(id, axis.other()) {
                    return corrupt(format!(
                        "child {child} {} differs from parent {id}",
                        axis.other().label()
                    ));
                }
                sum += tree.total(child, axis);
                normals += tree.normal(child, axis);
            }
            if sum != tree.total(id, axis) {
                return corrupt(format!(
                    "children of {id} add up to {sum}, not {}",
                    tree.total(id, axis)
                ));
            }
            if (normals - 1.0).abs() > NORMAL_EPSILON {
                return corrupt(format!("normal sizes of {id}'s children add up to {normals}"));
            }
        }

        if let Some(root) = broken_atom_roots(tree).first() {
            return corrupt(format!("atomic group at {root} is broken"));
        }
        if !sides_valid(tree) {
            return corrupt("side window tags are inconsistent".to_string());
        }
        Ok(())
    }
}
