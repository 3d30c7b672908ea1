// ABOUTME: Read-only size queries over a window tree.
// ABOUTME: Minimum sizes, how far a window can grow or shrink, and clamped resize amounts.

use tw_core::{Decoration, SizeLimits};

use crate::node::{Axis, NodeKind, WindowId, WindowTree};

/// Which size restrictions a query or resize may disregard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ignore {
    /// Honor fixed sizes and configured minimums.
    #[default]
    Nothing,
    /// Disregard fixed sizes and configured minimums; decorations and safe
    /// minimums still count.
    All,
    /// Disregard everything but the bare safe minimums.
    Safe,
    /// Like `Safe`, but only for the given window.
    Window(WindowId),
}

impl Ignore {
    /// Whether fixed sizes and configured minimums of `id` are disregarded.
    pub fn covers(self, id: WindowId) -> bool {
        match self {
            Ignore::Nothing => false,
            Ignore::All | Ignore::Safe => true,
            Ignore::Window(w) => w == id,
        }
    }

    fn bare_safe(self, id: WindowId) -> bool {
        match self {
            Ignore::Safe => true,
            Ignore::Window(w) => w == id,
            Ignore::Nothing | Ignore::All => false,
        }
    }
}

/// Restricts which siblings may contribute space to a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trail {
    /// Only siblings before (above / left of) the window.
    Before,
    /// Only siblings after (below / right of) the window.
    After,
}

impl Trail {
    fn admits(trail: Option<Trail>, index: usize, pos: usize) -> bool {
        match trail {
            None => true,
            Some(Trail::Before) => index < pos,
            Some(Trail::After) => index > pos,
        }
    }
}

fn safe_min(limits: &SizeLimits, axis: Axis) -> i32 {
    match axis {
        Axis::Vertical => limits.safe_min_height,
        Axis::Horizontal => limits.safe_min_width,
    }
}

fn configured_min(limits: &SizeLimits, axis: Axis) -> i32 {
    match axis {
        Axis::Vertical => limits.min_height,
        Axis::Horizontal => limits.min_width,
    }
}

fn decoration_extent(decoration: &Decoration, axis: Axis) -> i32 {
    match axis {
        Axis::Vertical => decoration.lines(),
        Axis::Horizontal => decoration.columns(),
    }
}

impl WindowTree {
    /// True when `id` may not change size along `axis` under `ignore`.
    pub fn is_fixed(&self, id: WindowId, axis: Axis, ignore: Ignore) -> bool {
        !ignore.covers(id) && self.fixed_size_effective(id, axis)
    }

    /// Smallest size `id` can take along `axis`.
    ///
    /// For a leaf this is its current size when fixed, otherwise the larger
    /// of the configured minimum and the safe minimum plus decorations.
    /// Iso-combinations sum their children, ortho-combinations take the max.
    pub fn min_size(&self, id: WindowId, axis: Axis, ignore: Ignore) -> i32 {
        let Some(node) = self.node(id) else {
            return 0;
        };
        match &node.kind {
            NodeKind::Leaf(leaf) => {
                if !ignore.covers(id) && leaf.fixed.is_some_and(|f| f.fixes(axis)) {
                    return node.total.get(axis);
                }
                if ignore.bare_safe(id) {
                    return safe_min(&self.limits, axis);
                }
                if ignore.covers(id) {
                    safe_min(&self.limits, axis) + decoration_extent(&leaf.decoration, axis)
                } else {
                    self.leaf_min_size(&leaf.decoration, axis)
                }
            }
            NodeKind::Internal { axis: a, children } if *a == axis => children
                .iter()
                .map(|&c| self.min_size(c, axis, ignore))
                .sum(),
            NodeKind::Internal { children, .. } => children
                .iter()
                .map(|&c| self.min_size(c, axis, ignore))
                .max()
                .unwrap_or(0),
        }
    }

    /// Minimum size of a leaf with `decoration` under the configured limits.
    pub fn leaf_min_size(&self, decoration: &Decoration, axis: Axis) -> i32 {
        let decorated = safe_min(&self.limits, axis) + decoration_extent(decoration, axis);
        decorated.max(configured_min(&self.limits, axis))
    }

    fn slack(&self, id: WindowId, axis: Axis, ignore: Ignore) -> i32 {
        (self.total(id, axis) - self.min_size(id, axis, ignore)).max(0)
    }

    /// How much `id` can grow along `axis` by taking space from siblings,
    /// walking up through enclosing combinations unless `no_up` is set.
    pub fn max_growth(
        &self,
        id: WindowId,
        axis: Axis,
        ignore: Ignore,
        trail: Option<Trail>,
        no_up: bool,
    ) -> i32 {
        if self.is_fixed(id, axis, ignore) {
            return 0;
        }
        let mut window = id;
        let mut delta = 0;
        while let Some(parent) = self.parent(window) {
            let pos = self.position(window).unwrap_or(0);
            let siblings = self.children(parent);
            if self.is_iso(parent, axis) {
                delta += siblings
                    .iter()
                    .enumerate()
                    .filter(|&(i, &sub)| sub != window && Trail::admits(trail, i, pos))
                    .filter(|&(_, &sub)| !self.is_fixed(sub, axis, ignore))
                    .map(|(_, &sub)| self.slack(sub, axis, ignore))
                    .sum::<i32>();
            } else if siblings
                .iter()
                .any(|&sub| sub != window && self.is_fixed(sub, axis, ignore))
            {
                // siblings of an ortho-combination would have to grow along
                return delta;
            }
            if no_up {
                break;
            }
            window = parent;
        }
        delta
    }

    /// How much `id` can shrink along `axis` while some sibling takes up the
    /// freed space. The root window can never shrink.
    pub fn max_shrink(
        &self,
        id: WindowId,
        axis: Axis,
        ignore: Ignore,
        trail: Option<Trail>,
        no_up: bool,
    ) -> i32 {
        let mut delta = self.slack(id, axis, ignore);
        if delta == 0 {
            return 0;
        }
        let mut window = id;
        while let Some(parent) = self.parent(window) {
            let pos = self.position(window).unwrap_or(0);
            let siblings = self.children(parent);
            if self.is_iso(parent, axis) {
                let taker = siblings
                    .iter()
                    .enumerate()
                    .filter(|&(i, &sub)| sub != window && Trail::admits(trail, i, pos))
                    .any(|(_, &sub)| !self.is_fixed(sub, axis, ignore));
                if taker {
                    return delta;
                }
            } else {
                for &sub in siblings.iter().filter(|&&sub| sub != window) {
                    delta = delta.min(self.slack(sub, axis, ignore));
                }
                if delta == 0 {
                    return 0;
                }
            }
            if no_up {
                return if self.is_iso(parent, axis) { 0 } else { delta };
            }
            window = parent;
        }
        0
    }

    /// `delta` clamped to what `id` can actually grow or shrink by.
    pub fn resizable(&self, id: WindowId, delta: i32, axis: Axis, ignore: Ignore) -> i32 {
        self.resizable_with(id, delta, axis, ignore, None, false)
    }

    pub fn resizable_with(
        &self,
        id: WindowId,
        delta: i32,
        axis: Axis,
        ignore: Ignore,
        trail: Option<Trail>,
        no_up: bool,
    ) -> i32 {
        if delta > 0 {
            delta.min(self.max_growth(id, axis, ignore, trail, no_up))
        } else if delta < 0 {
            delta.max(-self.max_shrink(id, axis, ignore, trail, no_up))
        } else {
            0
        }
    }

    /// `delta` clamped to what the subtree of `id` can absorb on its own,
    /// without regard to its siblings.
    pub fn sizable(&self, id: WindowId, delta: i32, axis: Axis, ignore: Ignore) -> i32 {
        if !self.contains(id) {
            0
        } else if delta < 0 {
            (self.min_size(id, axis, ignore) - self.total(id, axis)).max(delta)
        } else if ignore.covers(id) {
            delta
        } else if delta > 0 && self.fixed_size_effective(id, axis) {
            0
        } else {
            delta
        }
    }
}
