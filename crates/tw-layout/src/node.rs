// ABOUTME: Window tree nodes stored in an arena and addressed by handle.
// ABOUTME: Parent/child/sibling navigation, sizes, geometry and fixed-size queries.

use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};
use tw_core::{Decoration, SizeLimits};

/// Handle of a window in its frame's arena. Never reused within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u32);

impl WindowId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies one atomic group. All members of a group carry the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u32);

/// Direction along which sizes are measured and children are laid out.
///
/// `Vertical` is the height axis: a vertical combination stacks its children
/// top to bottom. `Horizontal` is the width axis: children go left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Vertical,
    Horizontal,
}

impl Axis {
    pub fn other(self) -> Axis {
        match self {
            Axis::Vertical => Axis::Horizontal,
            Axis::Horizontal => Axis::Vertical,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::Vertical => "height",
            Axis::Horizontal => "width",
        }
    }
}

/// Frame edge a side window is pinned to. `Main` tags the root of the
/// ordinary (non-side) window area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Top,
    Right,
    Bottom,
    Main,
}

impl Side {
    pub fn all() -> &'static [Side] {
        &[Side::Left, Side::Top, Side::Right, Side::Bottom, Side::Main]
    }

    /// True for the four edge sides, false for `Main`.
    pub fn is_edge(self) -> bool {
        !matches!(self, Side::Main)
    }
}

/// Which dimensions of a leaf may not be changed by resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixedSize {
    Height,
    Width,
    Both,
}

impl FixedSize {
    pub fn fixes(self, axis: Axis) -> bool {
        matches!(
            (self, axis),
            (FixedSize::Both, _)
                | (FixedSize::Height, Axis::Vertical)
                | (FixedSize::Width, Axis::Horizontal)
        )
    }
}

/// Extent in lines (height) and columns (width).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub height: i32,
    pub width: i32,
}

impl Size {
    pub fn new(height: i32, width: i32) -> Self {
        Self { height, width }
    }

    pub fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Vertical => self.height,
            Axis::Horizontal => self.width,
        }
    }

    pub fn set(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::Vertical => self.height = value,
            Axis::Horizontal => self.width = value,
        }
    }
}

/// Share of the parent's extent along each axis (0.0 to 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalSize {
    pub height: f64,
    pub width: f64,
}

impl NormalSize {
    pub fn full() -> Self {
        Self {
            height: 1.0,
            width: 1.0,
        }
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Vertical => self.height,
            Axis::Horizontal => self.width,
        }
    }

    pub fn set(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::Vertical => self.height = value,
            Axis::Horizontal => self.width = value,
        }
    }
}

/// Position and extent of a window within its frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub top: i32,
    pub left: i32,
    pub height: i32,
    pub width: i32,
}

impl Rect {
    pub fn area(&self) -> i64 {
        i64::from(self.height) * i64::from(self.width)
    }
}

/// Content-displaying window state
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub decoration: Decoration,
    pub fixed: Option<FixedSize>,
    /// Weight of this window's area in area balancing
    pub area_factor: f64,
    /// Window this one was split off from, while that window is still around
    pub(crate) origin: Option<WindowId>,
}

impl Leaf {
    pub fn new(decoration: Decoration) -> Self {
        Self {
            decoration,
            fixed: None,
            area_factor: 1.0,
            origin: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeKind {
    Leaf(Leaf),
    Internal { axis: Axis, children: Vec<WindowId> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowNode {
    pub(crate) parent: Option<WindowId>,
    pub(crate) kind: NodeKind,
    pub(crate) total: Size,
    pub(crate) normal: NormalSize,
    pub(crate) atom: Option<GroupId>,
    pub(crate) side: Option<Side>,
}

impl WindowNode {
    pub(crate) fn leaf(parent: Option<WindowId>, total: Size, leaf: Leaf) -> Self {
        Self {
            parent,
            kind: NodeKind::Leaf(leaf),
            total,
            normal: NormalSize::full(),
            atom: None,
            side: None,
        }
    }

    pub fn parent(&self) -> Option<WindowId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match &self.kind {
            NodeKind::Leaf(leaf) => Some(leaf),
            NodeKind::Internal { .. } => None,
        }
    }

    pub(crate) fn as_leaf_mut(&mut self) -> Option<&mut Leaf> {
        match &mut self.kind {
            NodeKind::Leaf(leaf) => Some(leaf),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Axis the children are laid out along, None for leaves.
    pub fn combination_axis(&self) -> Option<Axis> {
        match &self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Internal { axis, .. } => Some(*axis),
        }
    }

    pub fn children(&self) -> &[WindowId] {
        match &self.kind {
            NodeKind::Leaf(_) => &[],
            NodeKind::Internal { children, .. } => children,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<WindowId>> {
        match &mut self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Internal { children, .. } => Some(children),
        }
    }

    pub fn total_size(&self) -> Size {
        self.total
    }

    pub fn normal_size(&self) -> NormalSize {
        self.normal
    }

    pub fn atom_group(&self) -> Option<GroupId> {
        self.atom
    }

    pub fn side(&self) -> Option<Side> {
        self.side
    }

    pub fn fixed_size(&self) -> Option<FixedSize> {
        self.as_leaf().and_then(|leaf| leaf.fixed)
    }
}

/// Arena of window nodes making up one frame's window tree.
#[derive(Debug, Clone)]
pub struct WindowTree {
    nodes: Vec<Option<WindowNode>>,
    root: WindowId,
    pub(crate) limits: SizeLimits,
}

/// Panics when `id` is not live; `WindowTree::node` is the checked lookup.
impl Index<WindowId> for WindowTree {
    type Output = WindowNode;

    fn index(&self, id: WindowId) -> &WindowNode {
        match self.nodes.get(id.index()).and_then(Option::as_ref) {
            Some(node) => node,
            None => panic!("window {id} is not live"),
        }
    }
}

impl WindowTree {
    pub fn new(size: Size, limits: SizeLimits, decoration: Decoration) -> Self {
        let root = WindowNode::leaf(None, size, Leaf::new(decoration));
        Self {
            nodes: vec![Some(root)],
            root: WindowId(0),
            limits,
        }
    }

    pub fn root(&self) -> WindowId {
        self.root
    }

    pub fn limits(&self) -> &SizeLimits {
        &self.limits
    }

    pub fn node(&self, id: WindowId) -> Option<&WindowNode> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.node(id).is_some()
    }

    pub(crate) fn node_mut(&mut self, id: WindowId) -> &mut WindowNode {
        match self.nodes.get_mut(id.index()).and_then(Option::as_mut) {
            Some(node) => node,
            None => panic!("window {id} is not live"),
        }
    }

    pub(crate) fn insert(&mut self, node: WindowNode) -> WindowId {
        let id = WindowId(self.nodes.len() as u32);
        self.nodes.push(Some(node));
        id
    }

    pub(crate) fn remove(&mut self, id: WindowId) -> Option<WindowNode> {
        self.nodes.get_mut(id.index()).and_then(Option::take)
    }

    pub(crate) fn set_root(&mut self, id: WindowId) {
        self.root = id;
        self.node_mut(id).parent = None;
    }

    pub fn parent(&self, id: WindowId) -> Option<WindowId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: WindowId) -> &[WindowId] {
        match self.node(id) {
            Some(node) => node.children(),
            None => &[],
        }
    }

    pub fn is_leaf(&self, id: WindowId) -> bool {
        self.node(id).is_some_and(WindowNode::is_leaf)
    }

    pub fn leftmost_child(&self, id: WindowId) -> Option<WindowId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: WindowId) -> Option<WindowId> {
        self.children(id).last().copied()
    }

    /// Index of `id` in its parent's child list.
    pub fn position(&self, id: WindowId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn next_sibling(&self, id: WindowId) -> Option<WindowId> {
        let parent = self.parent(id)?;
        let pos = self.position(id)?;
        self.children(parent).get(pos + 1).copied()
    }

    pub fn prev_sibling(&self, id: WindowId) -> Option<WindowId> {
        let parent = self.parent(id)?;
        let pos = self.position(id)?;
        pos.checked_sub(1)
            .and_then(|p| self.children(parent).get(p).copied())
    }

    /// Size of `id` along `axis`, 0 for windows that are not live.
    pub fn total(&self, id: WindowId, axis: Axis) -> i32 {
        self.node(id).map_or(0, |node| node.total.get(axis))
    }

    pub fn normal(&self, id: WindowId, axis: Axis) -> f64 {
        self.node(id).map_or(0.0, |node| node.normal.get(axis))
    }

    /// True when `id`'s parent lays its children out along `axis`.
    pub fn is_combined(&self, id: WindowId, axis: Axis) -> bool {
        self.parent(id)
            .and_then(|p| self.node(p))
            .and_then(WindowNode::combination_axis)
            .is_some_and(|a| a == axis)
    }

    /// True when `id` is internal and its children lie along `axis`.
    pub fn is_iso(&self, id: WindowId, axis: Axis) -> bool {
        self.node(id).and_then(WindowNode::combination_axis) == Some(axis)
    }

    /// All nodes of the subtree under `id` in pre-order.
    pub fn walk(&self, id: WindowId) -> Vec<WindowId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    /// Leaves under `id` in traversal order (top-left first).
    pub fn leaves(&self, id: WindowId) -> Vec<WindowId> {
        self.walk(id)
            .into_iter()
            .filter(|&w| self.is_leaf(w))
            .collect()
    }

    pub fn subtree_leaf_count(&self, id: WindowId) -> usize {
        self.leaves(id).len()
    }

    /// True when `id` is `ancestor` or lies below it.
    pub fn is_descendant(&self, id: WindowId, ancestor: WindowId) -> bool {
        let mut cur = Some(id);
        while let Some(w) = cur {
            if w == ancestor {
                return true;
            }
            cur = self.parent(w);
        }
        false
    }

    /// Largest number of windows that end up side by side along `axis`
    /// below `id`. Iso-combinations add up, ortho-combinations take the max.
    pub fn combination_count(&self, id: WindowId, axis: Axis) -> usize {
        let Some(node) = self.node(id) else {
            return 0;
        };
        match node.combination_axis() {
            None => 1,
            Some(a) if a == axis => node
                .children()
                .iter()
                .map(|&c| self.combination_count(c, axis))
                .sum(),
            Some(_) => node
                .children()
                .iter()
                .map(|&c| self.combination_count(c, axis))
                .max()
                .unwrap_or(1),
        }
    }

    /// Whether `id` cannot change size along `axis` because of fixed leaves.
    ///
    /// An iso-combination is fixed only if every child is; an ortho-combination
    /// is fixed as soon as one child is, since all children share its extent.
    pub fn fixed_size_effective(&self, id: WindowId, axis: Axis) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        match &node.kind {
            NodeKind::Leaf(leaf) => leaf.fixed.is_some_and(|f| f.fixes(axis)),
            NodeKind::Internal { axis: a, children } if *a == axis => children
                .iter()
                .all(|&c| self.fixed_size_effective(c, axis)),
            NodeKind::Internal { children, .. } => children
                .iter()
                .any(|&c| self.fixed_size_effective(c, axis)),
        }
    }

    /// Frame-relative position and size of `id`. Empty for windows that are
    /// not live.
    pub fn edges(&self, id: WindowId) -> Rect {
        let total = self.node(id).map_or_else(Size::default, |node| node.total);
        let mut rect = Rect {
            top: 0,
            left: 0,
            height: total.height,
            width: total.width,
        };
        let mut cur = id;
        while let Some(parent) = self.parent(cur) {
            if let Some(axis) = self.node(parent).and_then(WindowNode::combination_axis) {
                let offset: i32 = self
                    .children(parent)
                    .iter()
                    .take_while(|&&c| c != cur)
                    .map(|&c| self.total(c, axis))
                    .sum();
                match axis {
                    Axis::Vertical => rect.top += offset,
                    Axis::Horizontal => rect.left += offset,
                }
            }
            cur = parent;
        }
        rect
    }

    /// Nearest ancestor-or-self carrying the same side tag as `id` whose
    /// parent does not, i.e. the root of `id`'s side region.
    pub fn side_root(&self, id: WindowId) -> Option<WindowId> {
        let side = self.node(id)?.side?;
        let mut cur = id;
        while let Some(parent) = self.parent(cur) {
            if self.node(parent).and_then(|node| node.side) != Some(side) {
                break;
            }
            cur = parent;
        }
        Some(cur)
    }

    /// True when at least one window is pinned to a frame edge.
    pub fn has_side_windows(&self) -> bool {
        self.walk(self.root)
            .into_iter()
            .any(|w| self[w].side.is_some_and(Side::is_edge))
    }

    pub fn live_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn internal(parent: Option<WindowId>, axis: Axis, total: Size) -> WindowNode {
        WindowNode {
            parent,
            kind: NodeKind::Internal {
                axis,
                children: Vec::new(),
            },
            total,
            normal: NormalSize::full(),
            atom: None,
            side: None,
        }
    }

    /// root (vertical) -> [a, mid (horizontal) -> [b, c]]
    fn sample() -> (WindowTree, [WindowId; 4]) {
        let mut tree = WindowTree::new(
            Size::new(24, 80),
            SizeLimits::default(),
            Decoration::default(),
        );
        let root = tree.root();
        let leaf = |parent, total| {
            WindowNode::leaf(Some(parent), total, Leaf::new(Decoration::default()))
        };

        *tree.node_mut(root) = internal(None, Axis::Vertical, Size::new(24, 80));
        let a = tree.insert(leaf(root, Size::new(10, 80)));
        let mid = tree.insert(internal(Some(root), Axis::Horizontal, Size::new(14, 80)));
        let b = tree.insert(leaf(mid, Size::new(14, 30)));
        let c = tree.insert(leaf(mid, Size::new(14, 50)));
        tree.node_mut(root).children_mut().unwrap().extend([a, mid]);
        tree.node_mut(mid).children_mut().unwrap().extend([b, c]);
        (tree, [a, mid, b, c])
    }

    #[test]
    fn sibling_navigation() {
        let (tree, [a, mid, b, c]) = sample();
        assert_eq!(tree.next_sibling(a), Some(mid));
        assert_eq!(tree.prev_sibling(mid), Some(a));
        assert_eq!(tree.prev_sibling(a), None);
        assert_eq!(tree.next_sibling(c), None);
        assert_eq!(tree.leftmost_child(mid), Some(b));
        assert_eq!(tree.last_child(tree.root()), Some(mid));
        assert_eq!(tree.parent(b), Some(mid));
    }

    #[test]
    fn leaves_in_traversal_order() {
        let (tree, [a, _, b, c]) = sample();
        assert_eq!(tree.leaves(tree.root()), vec![a, b, c]);
        assert_eq!(tree.subtree_leaf_count(tree.root()), 3);
    }

    #[test]
    fn combination_count_sums_iso_and_maxes_ortho() {
        let (tree, [_, mid, _, _]) = sample();
        assert_eq!(tree.combination_count(tree.root(), Axis::Vertical), 2);
        assert_eq!(tree.combination_count(tree.root(), Axis::Horizontal), 2);
        assert_eq!(tree.combination_count(mid, Axis::Horizontal), 2);
        assert_eq!(tree.combination_count(mid, Axis::Vertical), 1);
    }

    #[test]
    fn fixed_size_iso_needs_all_ortho_needs_any() {
        let (mut tree, [_, mid, b, c]) = sample();
        tree.node_mut(b).as_leaf_mut().unwrap().fixed = Some(FixedSize::Both);

        // mid lays out horizontally: iso for width, ortho for height
        assert!(!tree.fixed_size_effective(mid, Axis::Horizontal));
        assert!(tree.fixed_size_effective(mid, Axis::Vertical));

        tree.node_mut(c).as_leaf_mut().unwrap().fixed = Some(FixedSize::Width);
        assert!(tree.fixed_size_effective(mid, Axis::Horizontal));
    }

    #[test]
    fn edges_accumulate_offsets() {
        let (tree, [a, _, b, c]) = sample();
        assert_eq!(tree.edges(a), Rect { top: 0, left: 0, height: 10, width: 80 });
        assert_eq!(tree.edges(b), Rect { top: 10, left: 0, height: 14, width: 30 });
        assert_eq!(tree.edges(c), Rect { top: 10, left: 30, height: 14, width: 50 });
    }

    #[test]
    fn fixed_size_axes() {
        assert!(FixedSize::Height.fixes(Axis::Vertical));
        assert!(!FixedSize::Height.fixes(Axis::Horizontal));
        assert!(FixedSize::Both.fixes(Axis::Horizontal));
    }
}
