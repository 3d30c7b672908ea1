// ABOUTME: Splitting a window into two.
// ABOUTME: Sizes the new window, validates minimums and inserts it into the tree.

use serde::{Deserialize, Serialize};
use tracing::debug;
use tw_core::Decoration;

use crate::error::LayoutError;
use crate::frame::Frame;
use crate::node::{Axis, Leaf, NodeKind, Side, WindowId, WindowNode};
use crate::solver::Ignore;
use crate::transaction::ResizeTransaction;

/// Where the new window goes relative to the window being split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Above,
    Below,
    Left,
    Right,
}

impl Direction {
    pub fn axis(self) -> Axis {
        match self {
            Direction::Above | Direction::Below => Axis::Vertical,
            Direction::Left | Direction::Right => Axis::Horizontal,
        }
    }

    fn new_first(self) -> bool {
        matches!(self, Direction::Above | Direction::Left)
    }
}

impl Frame {
    /// Split `window`, consulting its split hook first.
    ///
    /// `size` is the size the original window keeps along the split axis;
    /// a negative `size` instead gives the size of the new window. Without a
    /// size the space is halved and the original window gets the odd unit.
    pub fn split(
        &mut self,
        window: WindowId,
        size: Option<i32>,
        direction: Direction,
    ) -> Result<WindowId, LayoutError> {
        self.live(window)?;
        if let Some(policy) = self.split_policies.get(&window).cloned() {
            if let Some(result) = policy.split(self, window, size, direction) {
                return result;
            }
        }
        self.split_default(window, size, direction)
    }

    /// Split `window` without consulting its hook.
    pub fn split_default(
        &mut self,
        window: WindowId,
        size: Option<i32>,
        direction: Direction,
    ) -> Result<WindowId, LayoutError> {
        self.live(window)?;
        if let Some(atom) = self.atom_root(window) {
            if atom != window {
                debug!(%window, %atom, "splitting atomic group root instead");
                return self.split(atom, size, direction);
            }
        }
        self.check_side_slots(window)?;

        let tree = &self.tree;
        let axis = direction.axis();
        let parent = tree.parent(window);
        let invalid = LayoutError::InvalidSplitSize { window, size };

        // groups must keep their own root, so never split into the enclosing
        // combination
        let target = &tree[window];
        let group_root = target.atom.is_some()
            || (target.side.is_some() && parent.map(|p| tree[p].side) != Some(target.side));
        let limit = self.policy.combination_limit || group_root;
        let combined = tree.is_combined(window, axis);
        let resize = self.policy.combination_resize && !limit && combined;
        let new_parent = limit || !combined;

        let decoration = self.inherited_decoration(window);
        let new_min = tree.leaf_min_size(&decoration, axis);
        let old_size = tree.total(window, axis);
        let old_normal = tree.normal(window, axis);
        let mut tx = ResizeTransaction::begin(tree, axis, Ignore::Nothing);

        let (new_size, base) = match parent.filter(|_| resize) {
            Some(parent) => {
                let parent_size = tree.total(parent, axis);
                let new_size = match size {
                    None => {
                        let share = parent_size / (1 + tree.combination_count(parent, axis)) as i32;
                        let room = parent_size - tree.min_size(parent, axis, Ignore::Nothing);
                        new_min.max(room.min(share))
                    }
                    Some(s) if s >= 0 => old_size - s,
                    Some(s) => s.checked_neg().ok_or_else(|| invalid.clone())?,
                };
                if new_size < new_min
                    || tree.sizable(parent, -new_size, axis, Ignore::Nothing) != -new_size
                {
                    return Err(invalid);
                }
                let siblings: Vec<WindowId> = tree
                    .children(parent)
                    .iter()
                    .copied()
                    .filter(|&c| !tree.is_fixed(c, axis, Ignore::Nothing))
                    .collect();
                let given = tx
                    .distribute(tree, &siblings, -new_size, parent_size - new_size)
                    .map_err(|_| invalid.clone())?;
                if given != -new_size {
                    return Err(invalid);
                }
                let new_normal = f64::from(new_size) / f64::from(parent_size);
                for &child in tree.children(parent) {
                    tx.set_normal(child, tx.normal(child) * (1.0 - new_normal));
                }
                (new_size, parent_size)
            }
            None => {
                let new_size = match size {
                    None => old_size / 2,
                    Some(s) if s >= 0 => old_size - s,
                    Some(s) => s.checked_neg().ok_or_else(|| invalid.clone())?,
                };
                if new_size < new_min
                    || old_size - new_size < tree.min_size(window, axis, Ignore::Nothing)
                {
                    return Err(invalid);
                }
                tx.resize_window(tree, window, -new_size)
                    .map_err(|_| invalid.clone())?;
                let base = match parent {
                    Some(parent) if !new_parent => tree.total(parent, axis),
                    _ => old_size,
                };
                let new_normal = f64::from(new_size) / f64::from(base);
                let kept = if new_parent { 1.0 } else { old_normal };
                tx.set_normal(window, kept - new_normal);
                (new_size, base)
            }
        };
        let new_normal = f64::from(new_size) / f64::from(base);
        tx.apply(&mut self.tree);

        let side = self.tree[window].side;
        let mut total = self.tree[window].total;
        total.set(axis, new_size);
        let mut leaf = Leaf::new(decoration);
        leaf.origin = Some(window);
        let mut node = WindowNode::leaf(None, total, leaf);
        node.normal.set(axis, new_normal);
        node.side = side;
        let new = self.tree.insert(node);

        if new_parent {
            self.insert_parent(window, new, axis, old_size, old_normal, direction);
        } else if let Some(parent) = parent {
            let pos = self.tree.position(window).unwrap_or(0);
            let at = if direction.new_first() { pos } else { pos + 1 };
            if let Some(children) = self.tree.node_mut(parent).children_mut() {
                children.insert(at, new);
            }
            self.tree.node_mut(new).parent = Some(parent);
        }

        self.check_atoms();
        self.check_sides();
        debug!(%window, %new, ?direction, new_size, "split window");
        Ok(new)
    }

    /// Put `window` and `new` under a fresh parent that takes `window`'s
    /// place and its original size.
    fn insert_parent(
        &mut self,
        window: WindowId,
        new: WindowId,
        axis: Axis,
        old_size: i32,
        old_normal: f64,
        direction: Direction,
    ) {
        let grandparent = self.tree.parent(window);
        let target = &self.tree[window];
        let mut total = target.total;
        total.set(axis, old_size);
        let mut normal = target.normal;
        normal.set(axis, old_normal);
        let children = if direction.new_first() {
            vec![new, window]
        } else {
            vec![window, new]
        };
        let parent = self.tree.insert(WindowNode {
            parent: grandparent,
            kind: NodeKind::Internal { axis, children },
            total,
            normal,
            atom: None,
            side: target.side,
        });

        match grandparent {
            Some(gp) => {
                if let Some(children) = self.tree.node_mut(gp).children_mut() {
                    for child in children.iter_mut().filter(|c| **c == window) {
                        *child = parent;
                    }
                }
            }
            None => self.tree.set_root(parent),
        }
        for id in [window, new] {
            let node = self.tree.node_mut(id);
            node.parent = Some(parent);
            node.normal.set(axis.other(), 1.0);
        }
    }

    /// Decoration for a window split off `window`.
    fn inherited_decoration(&self, window: WindowId) -> Decoration {
        let source = if self.tree.is_leaf(window) {
            Some(window)
        } else {
            Some(self.selected).filter(|&s| self.tree.contains(s))
        };
        source
            .and_then(|s| self.tree[s].as_leaf())
            .map_or(self.decoration, |leaf| leaf.decoration)
    }

    fn check_side_slots(&self, window: WindowId) -> Result<(), LayoutError> {
        let Some(side) = self.tree[window].side.filter(|s| s.is_edge()) else {
            return Ok(());
        };
        let slots = match side {
            Side::Left => self.side_slots.left,
            Side::Top => self.side_slots.top,
            Side::Right => self.side_slots.right,
            Side::Bottom => self.side_slots.bottom,
            Side::Main => None,
        };
        let Some(slots) = slots else {
            return Ok(());
        };
        let root = self.tree.side_root(window).unwrap_or(window);
        if self.tree.subtree_leaf_count(root) >= slots {
            return Err(LayoutError::SideSlotsExhausted { side, slots });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Rect;
    use tw_core::Config;

    fn frame() -> Frame {
        Frame::new(24, 80, &Config::default())
    }

    #[test]
    fn split_right_with_explicit_size() {
        let mut f = frame();
        let a = f.root();
        let b = f.split(a, Some(20), Direction::Right).unwrap();
        assert_eq!(f.tree().edges(a), Rect { top: 0, left: 0, height: 24, width: 20 });
        assert_eq!(f.tree().edges(b), Rect { top: 0, left: 20, height: 24, width: 60 });
        let root = f.root();
        assert_ne!(root, a);
        assert_eq!(f.tree().children(root), &[a, b]);
        assert_eq!(f.tree()[root].combination_axis(), Some(Axis::Horizontal));
    }

    #[test]
    fn halving_gives_original_the_odd_unit() {
        let mut f = Frame::new(25, 80, &Config::default());
        let a = f.root();
        let b = f.split(a, None, Direction::Below).unwrap();
        assert_eq!(f.tree().total(a, Axis::Vertical), 13);
        assert_eq!(f.tree().total(b, Axis::Vertical), 12);
    }

    #[test]
    fn negative_size_sizes_new_window() {
        let mut f = frame();
        let a = f.root();
        let b = f.split(a, Some(-6), Direction::Above).unwrap();
        assert_eq!(f.tree().edges(b), Rect { top: 0, left: 0, height: 6, width: 80 });
        assert_eq!(f.tree().edges(a).top, 6);
    }

    #[test]
    fn split_reuses_matching_combination() {
        let mut f = frame();
        let a = f.root();
        let b = f.split(a, None, Direction::Below).unwrap();
        let root = f.root();
        let c = f.split(b, None, Direction::Below).unwrap();
        assert_eq!(f.root(), root);
        assert_eq!(f.tree().children(root), &[a, b, c]);
        let sum: f64 = [a, b, c].iter().map(|&w| f.tree().normal(w, Axis::Vertical)).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn combination_limit_always_adds_parent() {
        let mut config = Config::default();
        config.policy.combination_limit = true;
        let mut f = Frame::new(24, 80, &config);
        let a = f.root();
        let b = f.split(a, None, Direction::Below).unwrap();
        let c = f.split(b, None, Direction::Below).unwrap();
        let inner = f.tree().parent(c).unwrap();
        assert_eq!(f.tree().children(inner), &[b, c]);
        assert_eq!(f.tree().parent(inner), Some(f.root()));
    }

    #[test]
    fn combination_resize_takes_from_all_siblings() {
        let mut config = Config::default();
        config.policy.combination_resize = true;
        let mut f = Frame::new(24, 80, &config);
        let a = f.root();
        let b = f.split(a, None, Direction::Below).unwrap();
        let c = f.split(b, None, Direction::Below).unwrap();
        let heights: Vec<i32> = [a, b, c]
            .iter()
            .map(|&w| f.tree().total(w, Axis::Vertical))
            .collect();
        assert_eq!(heights, vec![8, 8, 8]);
    }

    #[test]
    fn too_small_split_is_rejected() {
        let mut f = Frame::new(7, 80, &Config::default());
        let a = f.root();
        assert_eq!(
            f.split(a, None, Direction::Below),
            Err(LayoutError::InvalidSplitSize { window: a, size: None })
        );
        assert!(f.split(a, Some(2), Direction::Below).is_err());
        assert_eq!(f.leaves(), vec![a]);
    }

    #[test]
    fn extreme_sizes_are_rejected() {
        let mut f = frame();
        let a = f.root();
        for size in [i32::MIN, i32::MAX, -i32::MAX] {
            assert_eq!(
                f.split(a, Some(size), Direction::Below),
                Err(LayoutError::InvalidSplitSize { window: a, size: Some(size) })
            );
        }

        let mut config = Config::default();
        config.policy.combination_resize = true;
        let mut f = Frame::new(24, 80, &config);
        let a = f.root();
        let b = f.split(a, None, Direction::Below).unwrap();
        let before = f.snapshot();
        assert!(f.split(b, Some(i32::MIN), Direction::Below).is_err());
        assert_eq!(f.snapshot(), before);
    }

    #[test]
    fn new_window_inherits_decoration() {
        let mut f = frame();
        let a = f.root();
        let deco = Decoration::bare();
        f.set_decoration(a, deco).unwrap();
        let b = f.split(a, None, Direction::Right).unwrap();
        assert_eq!(f.tree()[b].as_leaf().unwrap().decoration, deco);
    }
}
