// ABOUTME: Balancing window sizes within a subtree.
// ABOUTME: Equal shares per combination, or equal leaf areas weighted by each window's area factor.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::LayoutError;
use crate::frame::Frame;
use crate::node::{Axis, Rect, WindowId, WindowTree};
use crate::solver::Ignore;

/// Outcome of a balancing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BalanceReport {
    /// Passes (shape balance) or rounds (area balance) performed
    pub passes: usize,
    /// Whether any window changed size
    pub changed: bool,
}

impl Frame {
    /// Give the children of every combination under `scope` equal shares
    /// of their parent, as far as minimums and fixed sizes allow.
    ///
    /// Works by moving boundaries between adjacent siblings and repeats
    /// until nothing moves or a layout comes back that was already seen.
    pub fn balance(&mut self, scope: WindowId) -> Result<BalanceReport, LayoutError> {
        self.live(scope)?;
        let max_passes = 4 + 2 * self.tree.subtree_leaf_count(scope);
        let mut seen = HashSet::new();
        let mut report = BalanceReport::default();
        loop {
            if !seen.insert(self.leaf_edges(scope)) {
                break;
            }
            if report.passes == max_passes {
                warn!(%scope, passes = report.passes, "balancing did not settle");
                break;
            }
            report.passes += 1;
            if !self.balance_pass(scope)? {
                break;
            }
            report.changed = true;
        }
        debug!(%scope, passes = report.passes, changed = report.changed, "balanced windows");
        Ok(report)
    }

    fn leaf_edges(&self, scope: WindowId) -> Vec<(WindowId, Rect)> {
        self.tree
            .leaves(scope)
            .into_iter()
            .map(|w| (w, self.tree.edges(w)))
            .collect()
    }

    fn balance_pass(&mut self, node: WindowId) -> Result<bool, LayoutError> {
        let Some(axis) = self.tree[node].combination_axis() else {
            return Ok(false);
        };
        let children = self.tree.children(node).to_vec();
        let targets = equal_shares(&self.tree, node, axis);
        // fixed children keep their size, so move the boundaries between the
        // nearest resizable ones across them
        let movable: Vec<usize> = (0..children.len())
            .filter(|&i| !self.tree.is_fixed(children[i], axis, Ignore::Nothing))
            .collect();
        let mut moved = false;
        for pair in movable.windows(2) {
            let (left, right) = (pair[0], pair[1]);
            let desired: i32 = targets[..=left].iter().sum();
            let current: i32 = children[..=left]
                .iter()
                .map(|&c| self.tree.total(c, axis))
                .sum();
            let delta = desired - current;
            if delta != 0 {
                let applied =
                    self.move_boundary(children[left], children[right], delta, axis, false)?;
                moved |= applied != 0;
            }
        }
        for child in children {
            moved |= self.balance_pass(child)?;
        }
        Ok(moved)
    }

    /// Make leaf areas under `scope` roughly equal, weighted by area factor.
    ///
    /// Each window is compared with the next one in traversal order and its
    /// trailing edge moved to even out the difference. Edges on the border
    /// of `scope` never move. Differences too
    /// small to move an edge are carried over to the next comparison. Stops
    /// after two rounds in which no new window geometry appeared.
    pub fn balance_area(&mut self, scope: WindowId) -> Result<BalanceReport, LayoutError> {
        self.live(scope)?;
        let tree = &self.tree;
        let windows: Vec<WindowId> = tree
            .leaves(scope)
            .into_iter()
            .filter(|&w| {
                !tree.fixed_size_effective(w, Axis::Vertical)
                    && !tree.fixed_size_effective(w, Axis::Horizontal)
            })
            .collect();
        let n = windows.len();
        let mut report = BalanceReport::default();
        if n < 2 {
            return Ok(report);
        }

        let max_rounds = 16 + 4 * n * n;
        let mut changelog: HashSet<(WindowId, Rect)> = HashSet::new();
        let mut unchanged = 0;
        let mut carry = 0.0;
        while unchanged < 2 && report.passes < max_rounds {
            unchanged += 1;
            report.passes += 1;
            for pair in windows.windows(2) {
                let (win, next) = (pair[0], pair[1]);
                let (we, ne) = (self.tree.edges(win), self.tree.edges(next));
                let horizontal = we.left < ne.left;
                let (wf, nf) = (self.area_factor(win), self.area_factor(next));
                let areadiff = (ne.area() as f64 * nf - we.area() as f64 * wf) / wf.max(nf);
                let edgesize = f64::from(if horizontal {
                    we.height + ne.height
                } else {
                    we.width + ne.width
                });

                let mut diff = (areadiff / edgesize).trunc() as i32;
                if diff == 0 {
                    diff = (1.5 * areadiff / edgesize).trunc() as i32;
                }
                if diff == 0 && areadiff != 0.0 {
                    diff = ((areadiff + carry) / edgesize).trunc() as i32;
                    if diff.abs() > 1 {
                        diff /= 2;
                    }
                }
                if diff == 0 {
                    carry += areadiff;
                    continue;
                }

                let axis = if horizontal {
                    Axis::Horizontal
                } else {
                    Axis::Vertical
                };
                report.changed |= self.adjust_area(win, diff, axis, scope);
                if changelog.insert((win, self.tree.edges(win))) {
                    unchanged = 0;
                    carry = 0.0;
                }
            }
        }
        if unchanged < 2 {
            warn!(%scope, rounds = report.passes, "area balancing did not settle");
        }
        debug!(%scope, rounds = report.passes, changed = report.changed, "balanced window areas");
        Ok(report)
    }

    fn area_factor(&self, window: WindowId) -> f64 {
        self.tree[window]
            .as_leaf()
            .map_or(1.0, |leaf| leaf.area_factor)
    }

    /// Move the trailing edge of `window` inside `scope` by `delta`, halving
    /// the amount until a move succeeds.
    fn adjust_area(
        &mut self,
        window: WindowId,
        mut delta: i32,
        axis: Axis,
        scope: WindowId,
    ) -> bool {
        while delta != 0 {
            match self.move_trailing_edge(window, delta, axis, scope, true) {
                Ok(moved) => return moved != 0,
                Err(LayoutError::NotResizable { .. }) => delta /= 2,
                Err(_) => return false,
            }
        }
        false
    }
}

/// Equal shares of `node`'s size for its children along `axis`.
///
/// Fixed children keep their size. Children whose minimum exceeds the share
/// get their minimum and drop out of the next round. Leftover units go one
/// each to the first remaining children.
fn equal_shares(tree: &WindowTree, node: WindowId, axis: Axis) -> Vec<i32> {
    let children = tree.children(node);
    let mut targets: Vec<Option<i32>> = children
        .iter()
        .map(|&c| tree.is_fixed(c, axis, Ignore::Nothing).then(|| tree.total(c, axis)))
        .collect();
    let mut available = tree.total(node, axis) - targets.iter().flatten().sum::<i32>();

    loop {
        let open: Vec<usize> = (0..children.len()).filter(|&i| targets[i].is_none()).collect();
        if open.is_empty() {
            break;
        }
        let share = available / open.len() as i32;
        let stuck: Vec<usize> = open
            .iter()
            .copied()
            .filter(|&i| tree.min_size(children[i], axis, Ignore::Nothing) > share)
            .collect();
        if stuck.is_empty() {
            let mut rest = available - share * open.len() as i32;
            for i in open {
                let extra = i32::from(rest > 0);
                rest -= extra;
                targets[i] = Some(share + extra);
            }
            break;
        }
        for i in stuck {
            let min = tree.min_size(children[i], axis, Ignore::Nothing);
            targets[i] = Some(min);
            available -= min;
        }
    }
    targets.into_iter().map(Option::unwrap_or_default).collect()
}
