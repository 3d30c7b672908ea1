// ABOUTME: Atomic window groups and side window regions.
// ABOUTME: Tagging, group root lookup and the checks that drop tags violating tree invariants.

use std::collections::HashMap;

use tracing::warn;

use crate::error::LayoutError;
use crate::frame::Frame;
use crate::node::{GroupId, Side, WindowId, WindowTree};

impl Frame {
    /// Topmost window of the atomic group `window` belongs to.
    pub fn atom_root(&self, window: WindowId) -> Option<WindowId> {
        let tree = &self.tree;
        let group = tree.node(window)?.atom?;
        let mut root = window;
        while let Some(parent) = tree.parent(root) {
            if tree[parent].atom != Some(group) {
                break;
            }
            root = parent;
        }
        Some(root)
    }

    /// Turn the subtree of `window` into one atomic group, which is then
    /// split and deleted as a unit. Returns the group root, or None when
    /// `window` is a leaf and there is nothing to group.
    pub fn make_atomic(&mut self, window: WindowId) -> Result<Option<WindowId>, LayoutError> {
        self.live(window)?;
        if self.tree.is_leaf(window) {
            return Ok(None);
        }
        let group = GroupId(self.next_group);
        self.next_group += 1;
        for id in self.tree.walk(window) {
            self.tree.node_mut(id).atom = Some(group);
        }
        self.check_atoms();
        Ok(self.atom_root(window))
    }

    /// Tag the subtree of `window` as belonging to `side`, or clear the tag.
    ///
    /// Tags are not checked here since a valid layout usually needs several
    /// of them; call `check_sides` once all are in place.
    pub fn with_side(&mut self, window: WindowId, side: Option<Side>) -> Result<(), LayoutError> {
        self.live(window)?;
        for id in self.tree.walk(window) {
            self.tree.node_mut(id).side = side;
        }
        Ok(())
    }

    /// Dissolve atomic groups that are broken. Returns false if any was.
    pub fn check_atoms(&mut self) -> bool {
        let broken = broken_atom_roots(&self.tree);
        for &root in &broken {
            warn!(%root, "dissolving broken atomic group");
            for id in self.tree.walk(root) {
                self.tree.node_mut(id).atom = None;
            }
        }
        broken.is_empty()
    }

    /// Clear every side tag if the side layout is invalid. Returns false if
    /// tags were cleared.
    pub fn check_sides(&mut self) -> bool {
        if sides_valid(&self.tree) {
            return true;
        }
        warn!("side window layout is invalid, clearing side tags");
        let root = self.tree.root();
        for id in self.tree.walk(root) {
            self.tree.node_mut(id).side = None;
        }
        false
    }
}

/// Roots of atomic groups that contain a non-member, consist of a single
/// window, or share their id with another group.
pub(crate) fn broken_atom_roots(tree: &WindowTree) -> Vec<WindowId> {
    let mut roots: HashMap<GroupId, Vec<WindowId>> = HashMap::new();
    for id in tree.walk(tree.root()) {
        let Some(group) = tree[id].atom else {
            continue;
        };
        if tree.parent(id).and_then(|p| tree[p].atom) != Some(group) {
            roots.entry(group).or_default().push(id);
        }
    }

    let mut broken = Vec::new();
    for (group, group_roots) in roots {
        let shared = group_roots.len() > 1;
        for root in group_roots {
            let members = tree.walk(root);
            let whole = members.iter().all(|&m| tree[m].atom == Some(group));
            if shared || !whole || members.len() == 1 {
                broken.push(root);
            }
        }
    }
    broken.sort();
    broken
}

/// Whether the side tags form a valid layout.
///
/// Each region is a connected subtree, with at most one region per side
/// and one main region. Once any side window exists every leaf belongs to
/// some region and there is a main window; without side windows no tags
/// may be present at all.
pub(crate) fn sides_valid(tree: &WindowTree) -> bool {
    let mut regions: HashMap<Side, usize> = HashMap::new();
    let mut untagged_leaf = false;
    let mut main_leaf = false;

    for id in tree.walk(tree.root()) {
        let node = &tree[id];
        let parent_side = tree.parent(id).and_then(|p| tree[p].side);
        match (parent_side, node.side) {
            (Some(parent), side) if side != Some(parent) => return false,
            (Some(_), _) => {}
            (None, Some(side)) => {
                let count = regions.entry(side).or_default();
                *count += 1;
                if *count > 1 {
                    return false;
                }
            }
            (None, None) => untagged_leaf |= node.is_leaf(),
        }
        main_leaf |= node.is_leaf() && node.side == Some(Side::Main);
    }

    let edges = regions.keys().any(|side| side.is_edge());
    if edges {
        main_leaf && !untagged_leaf
    } else {
        regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Axis;
    use crate::Direction;
    use tw_core::Config;

    fn frame() -> Frame {
        Frame::new(24, 80, &Config::default())
    }

    /// [a | [b / c / d]] with the right column made atomic.
    fn atomic_column() -> (Frame, [WindowId; 5]) {
        let mut f = frame();
        let a = f.root();
        let b = f.split(a, None, Direction::Right).unwrap();
        let c = f.split(b, None, Direction::Below).unwrap();
        let d = f.split(c, None, Direction::Below).unwrap();
        let column = f.tree().parent(b).unwrap();
        assert_eq!(f.make_atomic(column).unwrap(), Some(column));
        (f, [a, b, c, d, column])
    }

    #[test]
    fn atom_root_walks_up_to_group_root() {
        let (f, [a, b, c, _, column]) = atomic_column();
        assert_eq!(f.atom_root(b), Some(column));
        assert_eq!(f.atom_root(c), Some(column));
        assert_eq!(f.atom_root(a), None);
    }

    #[test]
    fn deleting_member_deletes_group() {
        let (mut f, [a, b, c, d, column]) = atomic_column();
        f.delete(c).unwrap();
        for gone in [b, c, d, column] {
            assert!(!f.tree().contains(gone));
        }
        assert_eq!(f.root(), a);
        assert_eq!(f.tree().total(a, Axis::Horizontal), 80);
    }

    #[test]
    fn splitting_member_splits_group_root() {
        let (mut f, [a, b, _, _, column]) = atomic_column();
        let new = f.split(b, None, Direction::Below).unwrap();
        let parent = f.tree().parent(new).unwrap();
        assert_eq!(f.tree().children(parent), &[column, new]);
        assert_eq!(f.tree().parent(parent), Some(f.root()));
        assert_eq!(f.tree().next_sibling(a), Some(parent));
        assert!(f.tree()[new].atom_group().is_none());
    }

    #[test]
    fn make_atomic_on_leaf_is_noop() {
        let mut f = frame();
        let root = f.root();
        assert_eq!(f.make_atomic(root).unwrap(), None);
        assert!(f.tree()[root].atom_group().is_none());
    }

    #[test]
    fn group_with_foreign_member_is_dissolved() {
        let (mut f, [_, b, _, _, column]) = atomic_column();
        f.tree.node_mut(b).atom = None;
        assert!(!f.check_atoms());
        assert_eq!(f.atom_root(column), None);
        assert!(f.check_atoms());
    }

    /// [left | main] with left pinned to the left edge.
    fn with_left_side() -> (Frame, WindowId, WindowId) {
        let mut f = frame();
        let main = f.root();
        let left = f.split(main, Some(-20), Direction::Left).unwrap();
        f.with_side(left, Some(Side::Left)).unwrap();
        f.with_side(main, Some(Side::Main)).unwrap();
        assert!(f.check_sides());
        (f, left, main)
    }

    #[test]
    fn valid_side_layout_survives_check() {
        let (f, left, main) = with_left_side();
        assert_eq!(f.tree()[left].side(), Some(Side::Left));
        assert_eq!(f.tree()[main].side(), Some(Side::Main));
        assert!(f.tree().has_side_windows());
    }

    #[test]
    fn lone_main_tag_is_cleared() {
        let mut f = frame();
        let a = f.root();
        let b = f.split(a, None, Direction::Right).unwrap();
        f.with_side(b, Some(Side::Main)).unwrap();
        assert!(!f.check_sides());
        assert_eq!(f.tree()[b].side(), None);
    }

    #[test]
    fn untagged_leaf_next_to_side_window_is_invalid() {
        let mut f = frame();
        let a = f.root();
        let b = f.split(a, None, Direction::Right).unwrap();
        f.with_side(b, Some(Side::Right)).unwrap();
        assert!(!f.check_sides());
        assert_eq!(f.tree()[b].side(), None);
    }

    #[test]
    fn last_main_window_cannot_be_deleted() {
        let (mut f, left, main) = with_left_side();
        assert_eq!(f.delete(main), Err(LayoutError::LastMainWindow));
        assert!(f.delete(left).is_ok());
    }

    #[test]
    fn splitting_main_window_stays_in_main_region() {
        let (mut f, _, main) = with_left_side();
        let new = f.split(main, None, Direction::Below).unwrap();
        assert_eq!(f.tree()[new].side(), Some(Side::Main));
        let region = f.tree().parent(new).unwrap();
        assert_eq!(f.tree()[region].side(), Some(Side::Main));
        assert!(f.check_sides());
        assert!(f.delete(main).is_ok());
    }

    #[test]
    fn side_slots_limit_splits() {
        let mut config = Config::default();
        config.sides.left = Some(2);
        let mut f = Frame::new(24, 80, &config);
        let main = f.root();
        let left = f.split(main, Some(-20), Direction::Left).unwrap();
        f.with_side(left, Some(Side::Left)).unwrap();
        f.with_side(main, Some(Side::Main)).unwrap();
        assert!(f.check_sides());

        let second = f.split(left, None, Direction::Below).unwrap();
        assert_eq!(f.tree()[second].side(), Some(Side::Left));
        assert_eq!(
            f.split(second, None, Direction::Below),
            Err(LayoutError::SideSlotsExhausted { side: Side::Left, slots: 2 })
        );
    }

    #[test]
    fn delete_other_windows_stays_in_main_area() {
        let (mut f, left, main) = with_left_side();
        let other = f.split(main, None, Direction::Below).unwrap();
        assert_eq!(f.delete_other_windows(left), Err(LayoutError::SideWindow(left)));
        f.delete_other_windows(other).unwrap();
        assert!(f.tree().contains(left));
        assert!(!f.tree().contains(main));
        assert_eq!(f.tree()[other].side(), Some(Side::Main));
        assert_eq!(f.tree().total(other, Axis::Horizontal), 60);
        assert!(f.check_sides());
    }
}
