// ABOUTME: Two-phase resize transactions over a window tree.
// ABOUTME: Pending sizes are computed against the untouched tree, then committed in one step.

use std::collections::HashMap;

use crate::error::LayoutError;
use crate::node::{Axis, WindowId, WindowTree};
use crate::solver::Ignore;

/// Pending sizes along one axis.
///
/// Building a transaction never touches the tree, so a failed computation
/// can simply be dropped. `apply` commits everything at once.
#[derive(Debug, Clone)]
pub(crate) struct ResizeTransaction {
    axis: Axis,
    ignore: Ignore,
    new_total: HashMap<WindowId, i32>,
    new_normal: HashMap<WindowId, f64>,
}

impl ResizeTransaction {
    /// Seed pending sizes from the current ones.
    pub(crate) fn begin(tree: &WindowTree, axis: Axis, ignore: Ignore) -> Self {
        let ids = tree.walk(tree.root());
        let new_total = ids.iter().map(|&id| (id, tree.total(id, axis))).collect();
        let new_normal = ids.iter().map(|&id| (id, tree.normal(id, axis))).collect();
        Self {
            axis,
            ignore,
            new_total,
            new_normal,
        }
    }

    pub(crate) fn total(&self, id: WindowId) -> i32 {
        self.new_total.get(&id).copied().unwrap_or_default()
    }

    pub(crate) fn normal(&self, id: WindowId) -> f64 {
        self.new_normal.get(&id).copied().unwrap_or_default()
    }

    pub(crate) fn add_total(&mut self, id: WindowId, delta: i32) {
        *self.new_total.entry(id).or_default() += delta;
    }

    pub(crate) fn set_normal(&mut self, id: WindowId, normal: f64) {
        self.new_normal.insert(id, normal);
    }

    /// Change the size of `id` by `delta` and spread the change over its
    /// subtree. The caller is responsible for the siblings.
    pub(crate) fn resize_window(
        &mut self,
        tree: &WindowTree,
        id: WindowId,
        delta: i32,
    ) -> Result<(), LayoutError> {
        if delta == 0 {
            return Ok(());
        }
        let current = self.total(id) - tree.total(id, self.axis);
        if tree.sizable(id, current + delta, self.axis, self.ignore) != current + delta {
            return Err(LayoutError::NotResizable { window: id, delta });
        }
        self.add_total(id, delta);
        self.resize_children(tree, id, delta)
    }

    fn resize_children(
        &mut self,
        tree: &WindowTree,
        id: WindowId,
        delta: i32,
    ) -> Result<(), LayoutError> {
        let node = &tree[id];
        match node.combination_axis() {
            None => Ok(()),
            Some(axis) if axis == self.axis => {
                let participants: Vec<WindowId> = node
                    .children()
                    .iter()
                    .copied()
                    .filter(|&c| !tree.is_fixed(c, self.axis, self.ignore))
                    .collect();
                let given = self.distribute(tree, &participants, delta, self.total(id))?;
                if given == delta {
                    Ok(())
                } else {
                    Err(LayoutError::NotResizable { window: id, delta })
                }
            }
            Some(_) => {
                for &child in node.children() {
                    self.resize_window(tree, child, delta)?;
                }
                Ok(())
            }
        }
    }

    /// Hand `delta` out to `participants` one unit at a time.
    ///
    /// Each unit goes to the participant furthest from its proportional share
    /// of `basis`: when shrinking the one most above its share (among those
    /// still above their minimum), when growing the one most below it.
    /// Returns the amount actually handed out.
    pub(crate) fn distribute(
        &mut self,
        tree: &WindowTree,
        participants: &[WindowId],
        delta: i32,
        basis: i32,
    ) -> Result<i32, LayoutError> {
        if delta == 0 || participants.is_empty() {
            return Ok(0);
        }
        let basis = f64::from(basis.max(1));
        let n = participants.len();
        let mut sizes: Vec<i32> = participants.iter().map(|&p| self.total(p)).collect();
        let normals: Vec<f64> = participants.iter().map(|&p| self.normal(p)).collect();
        let mins: Vec<i32> = participants
            .iter()
            .map(|&p| tree.min_size(p, self.axis, self.ignore))
            .collect();
        let mut received = vec![0i32; n];
        let excess = |sizes: &[i32], i: usize| f64::from(sizes[i]) / basis - normals[i];

        for _ in 0..delta.unsigned_abs() {
            let pick = if delta < 0 {
                (0..n).filter(|&i| sizes[i] > mins[i]).max_by(|&i, &j| {
                    excess(&sizes, i)
                        .total_cmp(&excess(&sizes, j))
                        .then((sizes[i] - mins[i]).cmp(&(sizes[j] - mins[j])))
                        .then(j.cmp(&i))
                })
            } else {
                (0..n).min_by(|&i, &j| {
                    excess(&sizes, i)
                        .total_cmp(&excess(&sizes, j))
                        .then(received[i].abs().cmp(&received[j].abs()))
                        .then(i.cmp(&j))
                })
            };
            let Some(i) = pick else { break };
            sizes[i] += delta.signum();
            received[i] += delta.signum();
        }

        for (&p, &change) in participants.iter().zip(&received) {
            self.resize_window(tree, p, change)?;
        }
        Ok(received.iter().sum())
    }

    /// Make the siblings of `window` absorb `-delta` after `window` itself
    /// changed by `delta`, moving up to the parent for whatever they can't.
    ///
    /// Normals at a level where siblings changed are recomputed from the
    /// pending totals.
    pub(crate) fn resize_siblings(
        &mut self,
        tree: &WindowTree,
        window: WindowId,
        delta: i32,
    ) -> Result<(), LayoutError> {
        if delta == 0 {
            return Ok(());
        }
        let Some(parent) = tree.parent(window) else {
            return Err(LayoutError::NotResizable { window, delta });
        };
        let axis = self.axis;
        let other_delta;

        if tree.is_iso(parent, axis) {
            let eligible: Vec<WindowId> = tree
                .children(parent)
                .iter()
                .copied()
                .filter(|&c| c != window && !tree.is_fixed(c, axis, self.ignore))
                .collect();
            let this_delta = if eligible.is_empty() {
                0
            } else if delta < 0 {
                delta
            } else {
                let slack: i32 = eligible
                    .iter()
                    .map(|&c| (self.total(c) - tree.min_size(c, axis, self.ignore)).max(0))
                    .sum();
                delta.min(slack)
            };
            other_delta = delta - this_delta;
            if other_delta != 0 {
                self.add_total(parent, other_delta);
            }
            if this_delta != 0 {
                let given = self.distribute(tree, &eligible, -this_delta, self.total(parent))?;
                if given != -this_delta {
                    return Err(LayoutError::NotResizable { window, delta });
                }
            }
            let parent_total = f64::from(self.total(parent).max(1));
            for &child in tree.children(parent) {
                let normal = f64::from(self.total(child)) / parent_total;
                self.set_normal(child, normal);
            }
        } else {
            for &sibling in tree.children(parent).iter().filter(|&&c| c != window) {
                self.resize_window(tree, sibling, delta)?;
            }
            self.add_total(parent, delta);
            other_delta = delta;
        }

        if other_delta != 0 {
            self.resize_siblings(tree, parent, other_delta)?;
        }
        Ok(())
    }

    /// Commit pending sizes to the tree.
    pub(crate) fn apply(self, tree: &mut WindowTree) {
        let axis = self.axis;
        for (id, total) in self.new_total {
            if tree.contains(id) {
                tree.node_mut(id).total.set(axis, total);
            }
        }
        for (id, normal) in self.new_normal {
            if tree.contains(id) {
                tree.node_mut(id).normal.set(axis, normal);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, Frame};
    use tw_core::Config;

    /// Three windows stacked 12/6/6 in a 24 line frame.
    fn stacked() -> (Frame, [WindowId; 3]) {
        let mut frame = Frame::new(24, 80, &Config::default());
        let a = frame.root();
        let b = frame.split(a, None, Direction::Below).unwrap();
        let c = frame.split(b, None, Direction::Below).unwrap();
        (frame, [a, b, c])
    }

    fn heights(frame: &Frame, ids: &[WindowId]) -> Vec<i32> {
        ids.iter().map(|&w| frame.tree().total(w, Axis::Vertical)).collect()
    }

    #[test]
    fn growing_parent_keeps_proportions() {
        let (frame, ids) = stacked();
        let tree = frame.tree();
        let mut tx = ResizeTransaction::begin(tree, Axis::Vertical, Ignore::Nothing);
        tx.resize_window(tree, tree.root(), 8).unwrap();
        assert_eq!(ids.map(|w| tx.total(w)), [16, 8, 8]);
    }

    #[test]
    fn shrinking_parent_keeps_proportions() {
        let (frame, ids) = stacked();
        let tree = frame.tree();
        let mut tx = ResizeTransaction::begin(tree, Axis::Vertical, Ignore::Nothing);
        tx.resize_window(tree, tree.root(), -8).unwrap();
        assert_eq!(ids.map(|w| tx.total(w)), [8, 4, 4]);
    }

    /// Three 8 line windows with equal normals in a 24 line column.
    fn even_thirds() -> (Frame, [WindowId; 3]) {
        let mut frame = Frame::new(24, 80, &Config::default());
        let a = frame.root();
        let b = frame.split(a, Some(8), Direction::Below).unwrap();
        let c = frame.split(b, Some(8), Direction::Below).unwrap();
        (frame, [a, b, c])
    }

    #[test]
    fn uneven_deltas_are_shared_fairly() {
        for (delta, expected) in [(-4, [1, 1, 2]), (7, [2, 2, 3]), (-5, [1, 2, 2])] {
            let (frame, ids) = even_thirds();
            let tree = frame.tree();
            assert_eq!(heights(&frame, &ids), vec![8, 8, 8]);
            let mut tx = ResizeTransaction::begin(tree, Axis::Vertical, Ignore::Nothing);
            tx.resize_window(tree, tree.root(), delta).unwrap();

            let mut changes: Vec<i32> = ids.iter().map(|&w| (tx.total(w) - 8).abs()).collect();
            changes.sort_unstable();
            assert_eq!(changes, expected, "delta {delta}");
            let totals = ids.map(|w| tx.total(w));
            let spread = totals.iter().max().unwrap() - totals.iter().min().unwrap();
            assert!(spread <= 1, "delta {delta}: {totals:?}");
            assert_eq!(totals.iter().sum::<i32>(), 24 + delta);
            let normals: f64 = ids.iter().map(|&w| tx.normal(w)).sum();
            assert!((normals - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn shrinking_below_minimums_fails_without_touching_tree() {
        let (frame, ids) = stacked();
        let tree = frame.tree();
        let mut tx = ResizeTransaction::begin(tree, Axis::Vertical, Ignore::Nothing);
        assert!(tx.resize_window(tree, tree.root(), -13).is_err());
        assert_eq!(heights(&frame, &ids), vec![12, 6, 6]);
    }

    #[test]
    fn siblings_absorb_growth_and_normals_follow() {
        let (mut frame, [a, b, c]) = stacked();
        let tree = frame.tree();
        let mut tx = ResizeTransaction::begin(tree, Axis::Vertical, Ignore::Nothing);
        tx.resize_window(tree, c, 4).unwrap();
        tx.resize_siblings(tree, c, 4).unwrap();
        tx.apply(&mut frame.tree);
        assert_eq!(heights(&frame, &[a, b, c]), vec![8, 6, 10]);
        let sum: f64 = [a, b, c]
            .iter()
            .map(|&w| frame.tree().normal(w, Axis::Vertical))
            .sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn apply_only_touches_its_axis() {
        let (mut frame, [a, _, _]) = stacked();
        let tree = frame.tree();
        let mut tx = ResizeTransaction::begin(tree, Axis::Vertical, Ignore::Nothing);
        tx.resize_window(tree, tree.root(), 2).unwrap();
        tx.apply(&mut frame.tree);
        assert_eq!(frame.tree().total(a, Axis::Horizontal), 80);
        assert_eq!(frame.tree().total(frame.root(), Axis::Vertical), 26);
    }
}
