// ABOUTME: A frame owns one window tree and the policy it is laid out under.
// ABOUTME: Resizing, edge moves, frame size changes and per-window settings live here.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace};
use tw_core::{Config, Decoration, LayoutPolicy, SideSlots};

use crate::error::LayoutError;
use crate::node::{Axis, FixedSize, Leaf, Rect, Size, WindowId, WindowNode, WindowTree};
use crate::policy::{DeletePolicy, SplitPolicy};
use crate::solver::Ignore;
use crate::transaction::ResizeTransaction;

#[derive(Debug)]
pub struct Frame {
    pub(crate) tree: WindowTree,
    pub(crate) policy: LayoutPolicy,
    pub(crate) side_slots: SideSlots,
    /// Decoration for new windows that have no leaf to inherit from
    pub(crate) decoration: Decoration,
    pub(crate) selected: WindowId,
    pub(crate) next_group: u32,
    pub(crate) split_policies: HashMap<WindowId, Rc<dyn SplitPolicy>>,
    pub(crate) delete_policies: HashMap<WindowId, Rc<dyn DeletePolicy>>,
}

impl Frame {
    /// Create a frame holding a single window of the given size.
    pub fn new(height: i32, width: i32, config: &Config) -> Self {
        let size = Size::new(height.max(1), width.max(1));
        let tree = WindowTree::new(size, config.sizes, config.decoration);
        let selected = tree.root();
        Self {
            tree,
            policy: config.policy,
            side_slots: config.sides,
            decoration: config.decoration,
            selected,
            next_group: 0,
            split_policies: HashMap::new(),
            delete_policies: HashMap::new(),
        }
    }

    /// Create a frame sized by the config's `[frame]` section.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.frame.height, config.frame.width, config)
    }

    pub fn tree(&self) -> &WindowTree {
        &self.tree
    }

    pub fn root(&self) -> WindowId {
        self.tree.root()
    }

    pub fn size(&self) -> Size {
        self.tree[self.tree.root()].total_size()
    }

    pub fn policy(&self) -> LayoutPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: LayoutPolicy) {
        self.policy = policy;
    }

    pub fn selected(&self) -> WindowId {
        self.selected
    }

    pub fn select(&mut self, window: WindowId) -> Result<(), LayoutError> {
        self.live(window)?;
        if !self.tree.is_leaf(window) {
            return Err(LayoutError::NotLeaf(window));
        }
        self.selected = window;
        Ok(())
    }

    pub fn window(&self, window: WindowId) -> Result<&WindowNode, LayoutError> {
        self.tree
            .node(window)
            .ok_or(LayoutError::NoSuchWindow(window))
    }

    pub fn leaves(&self) -> Vec<WindowId> {
        self.tree.leaves(self.tree.root())
    }

    pub fn edges(&self, window: WindowId) -> Result<Rect, LayoutError> {
        self.live(window)?;
        Ok(self.tree.edges(window))
    }

    pub(crate) fn live(&self, window: WindowId) -> Result<(), LayoutError> {
        if self.tree.contains(window) {
            Ok(())
        } else {
            Err(LayoutError::NoSuchWindow(window))
        }
    }

    fn leaf_mut(&mut self, window: WindowId) -> Result<&mut Leaf, LayoutError> {
        self.live(window)?;
        self.tree
            .node_mut(window)
            .as_leaf_mut()
            .ok_or(LayoutError::NotLeaf(window))
    }

    pub fn set_fixed_size(
        &mut self,
        window: WindowId,
        fixed: Option<FixedSize>,
    ) -> Result<(), LayoutError> {
        self.leaf_mut(window)?.fixed = fixed;
        Ok(())
    }

    pub fn set_decoration(
        &mut self,
        window: WindowId,
        decoration: Decoration,
    ) -> Result<(), LayoutError> {
        self.leaf_mut(window)?.decoration = decoration;
        Ok(())
    }

    /// Weight of `window`'s area when balancing areas. Factors that are not
    /// positive and finite reset the weight to 1.0.
    pub fn set_area_factor(&mut self, window: WindowId, factor: f64) -> Result<(), LayoutError> {
        let factor = if factor.is_finite() && factor > 0.0 {
            factor
        } else {
            1.0
        };
        self.leaf_mut(window)?.area_factor = factor;
        Ok(())
    }

    /// How much of `delta` `window` can actually be resized by. Never fails;
    /// unknown windows can't be resized at all.
    pub fn resizable(&self, window: WindowId, delta: i32, axis: Axis, ignore: Ignore) -> i32 {
        if self.tree.contains(window) {
            self.tree.resizable(window, delta, axis, ignore)
        } else {
            0
        }
    }

    /// Resize `window` by exactly `delta` along `axis`.
    ///
    /// Space comes from (or goes to) the adjacent sibling when it can take
    /// the whole change on its own, otherwise from all siblings and then
    /// enclosing combinations.
    pub fn resize(
        &mut self,
        window: WindowId,
        delta: i32,
        axis: Axis,
        ignore: Ignore,
    ) -> Result<(), LayoutError> {
        self.live(window)?;
        let tree = &self.tree;
        let Some(parent) = tree.parent(window) else {
            return Err(LayoutError::RootWindow);
        };
        if delta == 0 {
            return Ok(());
        }
        if tree.resizable(window, delta, axis, ignore) != delta {
            return Err(LayoutError::NotResizable { window, delta });
        }

        let mut tx = ResizeTransaction::begin(tree, axis, ignore);
        tx.resize_window(tree, window, delta)?;
        let neighbor = if !self.policy.combination_resize && tree.is_combined(window, axis) {
            tree.next_sibling(window)
                .or_else(|| tree.prev_sibling(window))
                .filter(|&n| tree.sizable(n, -delta, axis, ignore) == -delta)
        } else {
            None
        };
        match neighbor {
            Some(neighbor) => {
                tx.resize_window(tree, neighbor, -delta)?;
                let shift = f64::from(delta) / f64::from(tree.total(parent, axis).max(1));
                tx.set_normal(window, tx.normal(window) + shift);
                tx.set_normal(neighbor, tx.normal(neighbor) - shift);
            }
            None => tx.resize_siblings(tree, window, delta)?,
        }
        tx.apply(&mut self.tree);
        debug!(%window, delta, axis = axis.label(), "resized window");
        Ok(())
    }

    pub fn enlarge(&mut self, window: WindowId, delta: i32, axis: Axis) -> Result<(), LayoutError> {
        self.resize(window, delta, axis, Ignore::Nothing)
    }

    pub fn shrink(&mut self, window: WindowId, delta: i32, axis: Axis) -> Result<(), LayoutError> {
        self.resize(window, -delta, axis, Ignore::Nothing)
    }

    /// Grow `window` as far as its siblings allow. Returns the amount grown.
    pub fn maximize(&mut self, window: WindowId, axis: Axis) -> Result<i32, LayoutError> {
        self.live(window)?;
        let delta = self
            .tree
            .max_growth(window, axis, Ignore::Nothing, None, false);
        if delta > 0 {
            self.resize(window, delta, axis, Ignore::Nothing)?;
        }
        Ok(delta)
    }

    /// Shrink `window` to its minimum size. Returns the amount shrunk.
    pub fn minimize(&mut self, window: WindowId, axis: Axis) -> Result<i32, LayoutError> {
        self.live(window)?;
        let delta = self
            .tree
            .max_shrink(window, axis, Ignore::Nothing, None, false);
        if delta > 0 {
            self.resize(window, -delta, axis, Ignore::Nothing)?;
        }
        Ok(delta)
    }

    /// Move the bottom (or right) edge of `window` by up to `delta`.
    ///
    /// The edge moved is the one between the nearest ancestor-or-self that
    /// has a following sibling along `axis` and that sibling. Returns the
    /// amount the edge actually moved.
    pub fn adjust_trailing_edge(
        &mut self,
        window: WindowId,
        delta: i32,
        axis: Axis,
    ) -> Result<i32, LayoutError> {
        let root = self.tree.root();
        self.move_trailing_edge(window, delta, axis, root, false)
    }

    /// Like `adjust_trailing_edge`, but only edges between windows inside
    /// `scope` are considered.
    pub(crate) fn move_trailing_edge(
        &mut self,
        window: WindowId,
        delta: i32,
        axis: Axis,
        scope: WindowId,
        exact: bool,
    ) -> Result<i32, LayoutError> {
        self.live(window)?;
        let tree = &self.tree;
        let mut left = window;
        let right = loop {
            if left == scope {
                return Err(LayoutError::NoNeighbor { window, axis });
            }
            if tree.is_combined(left, axis) {
                if let Some(next) = tree.next_sibling(left) {
                    break next;
                }
            }
            match tree.parent(left) {
                Some(parent) => left = parent,
                None => return Err(LayoutError::NoNeighbor { window, axis }),
            }
        };
        self.move_boundary(left, right, delta, axis, exact)
    }

    /// Move the boundary between adjacent siblings `left` and `right`.
    pub(crate) fn move_boundary(
        &mut self,
        left: WindowId,
        right: WindowId,
        delta: i32,
        axis: Axis,
        exact: bool,
    ) -> Result<i32, LayoutError> {
        let tree = &self.tree;
        let moved = if delta > 0 {
            let room = (-tree.sizable(right, -delta, axis, Ignore::Nothing)).max(0);
            room.min(tree.sizable(left, delta, axis, Ignore::Nothing))
        } else if delta < 0 {
            let room = (-tree.sizable(left, delta, axis, Ignore::Nothing)).max(0);
            -room.min(tree.sizable(right, delta.saturating_neg(), axis, Ignore::Nothing))
        } else {
            0
        };
        if exact && moved != delta {
            return Err(LayoutError::NotResizable {
                window: left,
                delta,
            });
        }
        if moved == 0 {
            return Ok(0);
        }

        let parent_total = tree.parent(left).map_or(1, |p| tree.total(p, axis)).max(1);
        let mut tx = ResizeTransaction::begin(tree, axis, Ignore::Nothing);
        tx.resize_window(tree, left, moved)?;
        tx.resize_window(tree, right, -moved)?;
        let shift = f64::from(moved) / f64::from(parent_total);
        tx.set_normal(left, tx.normal(left) + shift);
        tx.set_normal(right, tx.normal(right) - shift);
        tx.apply(&mut self.tree);
        trace!(%left, %right, moved, axis = axis.label(), "moved edge");
        Ok(moved)
    }

    /// Resize the whole frame, redistributing space over all windows.
    ///
    /// Configured minimums and fixed sizes are honored when possible, then
    /// dropped, and finally only the safe minimums are kept.
    pub fn set_frame_size(&mut self, height: i32, width: i32) -> Result<(), LayoutError> {
        let root = self.tree.root();
        let mut pending = Vec::new();
        for (axis, target) in [(Axis::Vertical, height), (Axis::Horizontal, width)] {
            let delta = target.saturating_sub(self.tree.total(root, axis));
            if delta == 0 {
                continue;
            }
            let tx = [Ignore::Nothing, Ignore::All, Ignore::Safe]
                .into_iter()
                .find_map(|ignore| {
                    if self.tree.min_size(root, axis, ignore) > target {
                        return None;
                    }
                    let mut tx = ResizeTransaction::begin(&self.tree, axis, ignore);
                    tx.resize_window(&self.tree, root, delta).ok().map(|()| tx)
                })
                .ok_or(LayoutError::NotResizable {
                    window: root,
                    delta,
                })?;
            pending.push(tx);
        }
        for tx in pending {
            tx.apply(&mut self.tree);
        }
        debug!(height, width, "resized frame");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;

    fn frame() -> Frame {
        Frame::new(24, 80, &Config::default())
    }

    fn height(frame: &Frame, w: WindowId) -> i32 {
        frame.tree().total(w, Axis::Vertical)
    }

    #[test]
    fn resize_root_is_an_error() {
        let mut f = frame();
        let root = f.root();
        assert_eq!(
            f.resize(root, 1, Axis::Vertical, Ignore::Nothing),
            Err(LayoutError::RootWindow)
        );
    }

    #[test]
    fn resize_takes_from_neighbor() {
        let mut f = frame();
        let a = f.root();
        let b = f.split(a, None, Direction::Below).unwrap();
        f.resize(a, 3, Axis::Vertical, Ignore::Nothing).unwrap();
        assert_eq!(height(&f, a), 15);
        assert_eq!(height(&f, b), 9);
        let normal = f.tree().normal(a, Axis::Vertical);
        assert!((normal - 15.0 / 24.0).abs() < 1e-9);
    }

    #[test]
    fn resize_beyond_limit_fails_cleanly() {
        let mut f = frame();
        let a = f.root();
        let b = f.split(a, None, Direction::Below).unwrap();
        let before = f.snapshot();
        assert_eq!(
            f.resize(b, 9, Axis::Vertical, Ignore::Nothing),
            Err(LayoutError::NotResizable { window: b, delta: 9 })
        );
        assert_eq!(f.snapshot(), before);
    }

    #[test]
    fn resize_skips_fixed_neighbor() {
        let mut f = frame();
        let a = f.root();
        let b = f.split(a, Some(8), Direction::Below).unwrap();
        let c = f.split(b, Some(8), Direction::Below).unwrap();
        f.set_fixed_size(b, Some(FixedSize::Height)).unwrap();
        f.resize(a, 3, Axis::Vertical, Ignore::Nothing).unwrap();
        assert_eq!(
            [height(&f, a), height(&f, b), height(&f, c)],
            [11, 8, 5]
        );
    }

    #[test]
    fn maximize_and_minimize() {
        let mut f = frame();
        let a = f.root();
        let b = f.split(a, None, Direction::Right).unwrap();
        assert_eq!(f.maximize(a, Axis::Horizontal).unwrap(), 30);
        assert_eq!(f.tree().total(a, Axis::Horizontal), 70);
        assert_eq!(f.tree().total(b, Axis::Horizontal), 10);
        assert_eq!(f.minimize(a, Axis::Horizontal).unwrap(), 60);
        assert_eq!(f.tree().total(a, Axis::Horizontal), 10);
    }

    #[test]
    fn trailing_edge_clamps_and_climbs() {
        let mut f = frame();
        let a = f.root();
        let b = f.split(a, None, Direction::Right).unwrap();
        let a2 = f.split(a, None, Direction::Below).unwrap();
        // a2 has no sibling to its right in its own column
        assert_eq!(f.adjust_trailing_edge(a2, 5, Axis::Horizontal).unwrap(), 5);
        assert_eq!(f.tree().total(a2, Axis::Horizontal), 45);
        assert_eq!(f.tree().total(b, Axis::Horizontal), 35);
        assert_eq!(f.adjust_trailing_edge(a, 100, Axis::Horizontal).unwrap(), 25);
        assert_eq!(f.tree().total(b, Axis::Horizontal), 10);
        assert_eq!(
            f.adjust_trailing_edge(b, 1, Axis::Horizontal),
            Err(LayoutError::NoNeighbor { window: b, axis: Axis::Horizontal })
        );
    }

    #[test]
    fn extreme_deltas_are_clamped_or_rejected() {
        let mut f = frame();
        let a = f.root();
        let b = f.split(a, None, Direction::Below).unwrap();
        let before = f.snapshot();
        assert_eq!(f.resizable(a, i32::MIN, Axis::Vertical, Ignore::Nothing), -8);
        assert_eq!(f.resizable(a, i32::MAX, Axis::Vertical, Ignore::Nothing), 8);
        assert!(f.resize(a, i32::MIN, Axis::Vertical, Ignore::Nothing).is_err());
        assert!(f.resize(a, i32::MAX, Axis::Vertical, Ignore::Nothing).is_err());
        assert!(f.set_frame_size(i32::MIN, 80).is_err());
        assert_eq!(f.snapshot(), before);

        assert_eq!(f.adjust_trailing_edge(a, i32::MIN, Axis::Vertical).unwrap(), -8);
        assert_eq!(f.adjust_trailing_edge(a, i32::MAX, Axis::Vertical).unwrap(), 16);
        assert_eq!([height(&f, a), height(&f, b)], [20, 4]);
    }

    #[test]
    fn frame_resize_falls_back_to_safe_minimums() {
        let mut f = frame();
        let a = f.root();
        let b = f.split(a, None, Direction::Below).unwrap();
        f.set_frame_size(30, 100).unwrap();
        assert_eq!(height(&f, a) + height(&f, b), 30);
        assert_eq!(f.tree().total(b, Axis::Horizontal), 100);

        // 2 lines each is below the configured minimum but above the safe one
        f.set_frame_size(4, 100).unwrap();
        assert_eq!([height(&f, a), height(&f, b)], [2, 2]);
        assert!(f.set_frame_size(1, 100).is_err());
        assert_eq!(f.size(), Size::new(4, 100));
    }

    #[test]
    fn select_requires_live_leaf() {
        let mut f = frame();
        let a = f.root();
        let b = f.split(a, None, Direction::Right).unwrap();
        assert!(f.select(b).is_ok());
        assert_eq!(f.selected(), b);
        assert_eq!(f.select(f.root()), Err(LayoutError::NotLeaf(f.root())));
        assert_eq!(f.select(WindowId(99)), Err(LayoutError::NoSuchWindow(WindowId(99))));
    }
}
