// ABOUTME: Deleting windows and collapsing the tree afterwards.
// ABOUTME: Returns the space to a neighbor or to all siblings, then removes the subtree.

use tracing::{debug, warn};

use crate::error::LayoutError;
use crate::frame::Frame;
use crate::node::{Axis, Side, WindowId};
use crate::solver::Ignore;
use crate::transaction::ResizeTransaction;

impl Frame {
    /// Delete `window`, consulting its delete hook first.
    pub fn delete(&mut self, window: WindowId) -> Result<(), LayoutError> {
        self.live(window)?;
        if let Some(policy) = self.delete_policies.get(&window).cloned() {
            if let Some(result) = policy.delete(self, window) {
                return result;
            }
        }
        self.delete_default(window)
    }

    /// Delete `window` without consulting its hook. Deleting a member of an
    /// atomic group deletes the whole group.
    pub fn delete_default(&mut self, window: WindowId) -> Result<(), LayoutError> {
        self.live(window)?;
        if let Some(atom) = self.atom_root(window) {
            if atom != window {
                debug!(%window, %atom, "deleting atomic group root instead");
                return self.delete(atom);
            }
        }
        let Some(parent) = self.tree.parent(window) else {
            return Err(LayoutError::RootWindow);
        };
        if self.holds_last_main_window(window) {
            return Err(LayoutError::LastMainWindow);
        }
        let Some(axis) = self.tree[parent].combination_axis() else {
            return Err(LayoutError::CorruptTree(format!(
                "parent {parent} of {window} is a leaf"
            )));
        };

        let tx = self.deletion_transaction(window, parent, axis)?;
        let neighbor = self
            .tree
            .prev_sibling(window)
            .or_else(|| self.tree.next_sibling(window));
        tx.apply(&mut self.tree);
        self.detach(window, parent, axis);

        if !self.tree.contains(self.selected) {
            let fallback = neighbor
                .filter(|&n| self.tree.contains(n))
                .unwrap_or(self.tree.root());
            self.selected = self.tree.leaves(fallback).first().copied().unwrap_or(fallback);
        }
        self.check_atoms();
        self.check_sides();
        debug!(%window, "deleted window");
        Ok(())
    }

    /// Compute who gets the space of `window`.
    ///
    /// The window it was split from, or else its previous or next sibling,
    /// takes everything if it can. Otherwise all siblings share, moving up
    /// the tree as needed, and as a last resort fixed sizes are overridden.
    fn deletion_transaction(
        &self,
        window: WindowId,
        parent: WindowId,
        axis: Axis,
    ) -> Result<ResizeTransaction, LayoutError> {
        let tree = &self.tree;
        let size = tree.total(window, axis);

        if !self.policy.combination_resize {
            let prev = tree.prev_sibling(window);
            let next = tree.next_sibling(window);
            let origin = tree[window]
                .as_leaf()
                .and_then(|leaf| leaf.origin)
                .filter(|&o| Some(o) == prev || Some(o) == next);
            let receiver = [origin, prev, next]
                .into_iter()
                .flatten()
                .find(|&s| tree.sizable(s, size, axis, Ignore::Nothing) == size);
            if let Some(receiver) = receiver {
                let mut tx = ResizeTransaction::begin(tree, axis, Ignore::Nothing);
                tx.add_total(window, -size);
                tx.resize_window(tree, receiver, size)?;
                tx.set_normal(receiver, tx.normal(receiver) + tx.normal(window));
                tx.set_normal(window, 0.0);
                return Ok(tx);
            }
        }

        let mut last_err = LayoutError::NotResizable {
            window: parent,
            delta: size,
        };
        for ignore in [Ignore::Nothing, Ignore::All] {
            let mut tx = ResizeTransaction::begin(tree, axis, ignore);
            tx.add_total(window, -size);
            match tx.resize_siblings(tree, window, -size) {
                Ok(()) => return Ok(tx),
                Err(err) => {
                    if ignore == Ignore::Nothing {
                        warn!(%window, "overriding fixed sizes to delete window");
                    }
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }

    /// Remove `window`'s subtree and collapse a parent left with one child.
    fn detach(&mut self, window: WindowId, parent: WindowId, axis: Axis) {
        for id in self.tree.walk(window) {
            self.forget(id);
        }
        if let Some(children) = self.tree.node_mut(parent).children_mut() {
            children.retain(|&c| c != window);
        }
        let [only] = self.tree.children(parent) else {
            return;
        };
        let only = *only;
        self.replace(parent, only);
        if let Some(grandparent) = self.tree.parent(only) {
            self.flatten(only, grandparent);
        }
        debug!(%parent, %only, axis = axis.label(), "collapsed combination");
    }

    /// Put `child` in `parent`'s place, taking over its sizes, and drop
    /// `parent` and everything else below it.
    pub(crate) fn replace(&mut self, parent: WindowId, child: WindowId) {
        let grandparent = self.tree.parent(parent);
        let (total, normal) = {
            let node = &self.tree[parent];
            (node.total, node.normal)
        };
        let keep = self.tree.walk(child);
        for id in self.tree.walk(parent) {
            if !keep.contains(&id) {
                self.forget(id);
            }
        }
        let node = self.tree.node_mut(child);
        node.total = total;
        node.normal = normal;
        match grandparent {
            Some(gp) => {
                node.parent = Some(gp);
                if let Some(children) = self.tree.node_mut(gp).children_mut() {
                    for c in children.iter_mut().filter(|c| **c == parent) {
                        *c = child;
                    }
                }
            }
            None => self.tree.set_root(child),
        }
    }

    /// Splice the children of `child` into `grandparent` when both lay out
    /// along the same axis and `child` is not the root of a group.
    fn flatten(&mut self, child: WindowId, grandparent: WindowId) {
        if self.policy.combination_limit {
            return;
        }
        let tree = &self.tree;
        let (node, gp) = (&tree[child], &tree[grandparent]);
        let Some(axis) = node.combination_axis() else {
            return;
        };
        if gp.combination_axis() != Some(axis) || node.side != gp.side || node.atom != gp.atom {
            return;
        }
        let scale = node.normal.get(axis);
        let grandkids = node.children().to_vec();
        for &gk in &grandkids {
            let n = self.tree.node_mut(gk);
            n.parent = Some(grandparent);
            let normal = n.normal.get(axis) * scale;
            n.normal.set(axis, normal);
        }
        if let Some(children) = self.tree.node_mut(grandparent).children_mut() {
            if let Some(pos) = children.iter().position(|&c| c == child) {
                children.splice(pos..=pos, grandkids);
            }
        }
        self.forget(child);
    }

    /// Whether deleting `window` would leave no main window while side
    /// windows exist.
    fn holds_last_main_window(&self, window: WindowId) -> bool {
        let tree = &self.tree;
        if !tree.has_side_windows() {
            return false;
        }
        let (inside, outside): (Vec<WindowId>, Vec<WindowId>) = tree
            .leaves(tree.root())
            .into_iter()
            .filter(|&l| tree[l].side == Some(Side::Main))
            .partition(|&l| tree.is_descendant(l, window));
        !inside.is_empty() && outside.is_empty()
    }

    /// Make `window` fill the frame, or the main area when side windows
    /// exist, deleting everything else there.
    pub fn delete_other_windows(&mut self, window: WindowId) -> Result<(), LayoutError> {
        self.live(window)?;
        let window = self.atom_root(window).unwrap_or(window);
        let tree = &self.tree;
        let scope = if tree.has_side_windows() {
            if tree[window].side != Some(Side::Main) {
                return Err(LayoutError::SideWindow(window));
            }
            tree.side_root(window).unwrap_or(window)
        } else {
            tree.root()
        };
        if scope == window {
            return Ok(());
        }

        let mut pending = Vec::new();
        for axis in [Axis::Vertical, Axis::Horizontal] {
            let delta = tree.total(scope, axis) - tree.total(window, axis);
            let mut tx = ResizeTransaction::begin(tree, axis, Ignore::All);
            tx.resize_window(tree, window, delta)?;
            pending.push(tx);
        }
        for tx in pending {
            tx.apply(&mut self.tree);
        }
        let side = self.tree[scope].side;
        self.replace(scope, window);
        self.tree.node_mut(window).side = side;
        if let Some(grandparent) = self.tree.parent(window) {
            self.flatten(window, grandparent);
        }

        if !self.tree.contains(self.selected) {
            self.selected = self.tree.leaves(window).first().copied().unwrap_or(window);
        }
        self.check_atoms();
        self.check_sides();
        debug!(%window, "deleted other windows");
        Ok(())
    }
}
