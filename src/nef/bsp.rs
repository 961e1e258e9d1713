// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Alexandre Severino
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Ternary BSP trees over exact planes: the storage behind a Nef
//! polyhedron.
//!
//! Every split node divides its cell into the open negative side, the part
//! on its plane and the open positive side. Leaves carry the mark of their
//! cell. Nodes are shared through hash-consing, so the tree is a DAG whose
//! size follows the structure of the set rather than the arrangement of
//! all its planes.

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::{
    geometry::{plane::Plane3, point::Point3, vector::Vector3},
    nef::{
        boolean::BooleanOp,
        region::{Division, Region, frame_bound},
        sphere_map::{CircleMap, SphereMap},
    },
    numeric::scalar::{Scalar, Sign},
};

pub type NodeId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BspNode {
    Leaf(bool),
    /// Children on the negative side, on the plane, on the positive side.
    Split { plane: usize, children: [NodeId; 3] },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BspTree<T: Scalar> {
    planes: Vec<Plane3<T>>,
    nodes: Vec<BspNode>,
    root: NodeId,
}

/// A cell of a tree walk: a leaf region with its mark.
#[derive(Clone, Debug)]
pub struct Cell<T: Scalar> {
    pub region: Region<T>,
    pub mark: bool,
    /// Branches taken from the root; equal paths name the same cell.
    pub path: Vec<u8>,
    /// Planes whose on-branch was taken because the region lies on them.
    pub on_planes: SmallVec<[usize; 3]>,
}

/// How a refinement pass combines the marks around a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocalRule {
    /// Marked if anything around is marked.
    Closure,
    /// Marked if everything around is marked.
    Interior,
}

impl LocalRule {
    fn absorbs(self, mark: bool) -> bool {
        match self {
            LocalRule::Closure => mark,
            LocalRule::Interior => !mark,
        }
    }

    fn combine(self, a: bool, b: bool) -> bool {
        match self {
            LocalRule::Closure => a || b,
            LocalRule::Interior => a && b,
        }
    }
}

fn branch(side: Sign) -> usize {
    match side {
        Sign::Negative => 0,
        Sign::Zero => 1,
        Sign::Positive => 2,
    }
}

/// Child taken by a region lying on `plane` when nudged along `direction`.
fn tie_branch<T: Scalar>(plane: &Plane3<T>, direction: Option<&Vector3<T>>) -> usize {
    branch(direction.map_or(Sign::Zero, |d| plane.direction_side(d)))
}

/// Hash-consing arena trees are assembled in.
pub(crate) struct TreeBuilder<T: Scalar> {
    planes: Vec<Plane3<T>>,
    plane_ids: AHashMap<Plane3<T>, usize>,
    nodes: Vec<BspNode>,
    node_ids: AHashMap<BspNode, NodeId>,
}

impl<T: Scalar> TreeBuilder<T> {
    pub fn new() -> Self {
        let mut builder = TreeBuilder {
            planes: Vec::new(),
            plane_ids: AHashMap::new(),
            nodes: Vec::new(),
            node_ids: AHashMap::new(),
        };
        builder.intern(BspNode::Leaf(false));
        builder.intern(BspNode::Leaf(true));
        builder
    }

    fn intern(&mut self, node: BspNode) -> NodeId {
        if let Some(&id) = self.node_ids.get(&node) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(node);
        self.node_ids.insert(node, id);
        id
    }

    /// Index of a plane given in canonical form.
    pub fn plane(&mut self, plane: &Plane3<T>) -> usize {
        if let Some(&id) = self.plane_ids.get(plane) {
            return id;
        }
        let id = self.planes.len();
        self.planes.push(plane.clone());
        self.plane_ids.insert(plane.clone(), id);
        id
    }

    pub fn planes(&self) -> &[Plane3<T>] {
        &self.planes
    }

    pub fn leaf(&self, mark: bool) -> NodeId {
        usize::from(mark)
    }

    /// Node splitting by `plane`, or the common child when all three agree.
    pub fn split(&mut self, plane: usize, children: [NodeId; 3]) -> NodeId {
        if children[0] == children[1] && children[1] == children[2] {
            return children[0];
        }
        self.intern(BspNode::Split { plane, children })
    }

    /// Keeps the nodes and planes reachable from `root`, children first.
    pub fn finish(self, root: NodeId) -> BspTree<T> {
        let mut order = Vec::new();
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            if seen[id] {
                continue;
            }
            seen[id] = true;
            stack.push((id, true));
            if let BspNode::Split { children, .. } = self.nodes[id] {
                stack.extend(children.into_iter().filter(|&c| !seen[c]).map(|c| (c, false)));
            }
        }

        let mut remap = vec![0; self.nodes.len()];
        let mut plane_remap: Vec<Option<usize>> = vec![None; self.planes.len()];
        let mut planes = Vec::new();
        let mut nodes = Vec::with_capacity(order.len());
        for id in order {
            let node = match self.nodes[id] {
                BspNode::Leaf(mark) => BspNode::Leaf(mark),
                BspNode::Split { plane, children } => {
                    let local = *plane_remap[plane].get_or_insert_with(|| {
                        planes.push(self.planes[plane].clone());
                        planes.len() - 1
                    });
                    BspNode::Split {
                        plane: local,
                        children: children.map(|c| remap[c]),
                    }
                }
            };
            remap[id] = nodes.len();
            nodes.push(node);
        }
        BspTree {
            planes,
            nodes,
            root: remap[root],
        }
    }
}

/// Rebuilds the part of `tree` below `node` that meets `region`, with every
/// leaf replaced by `at_leaf(builder, mark, leaf_region)`. Regions lying on
/// a plane follow `direction` off it; without one they take the on-branch.
fn clip<T, F>(
    builder: &mut TreeBuilder<T>,
    tree: &BspTree<T>,
    planes: &[usize],
    node: NodeId,
    region: Region<T>,
    direction: Option<&Vector3<T>>,
    at_leaf: &mut F,
) -> NodeId
where
    T: Scalar,
    F: FnMut(&mut TreeBuilder<T>, bool, Region<T>) -> NodeId,
{
    match tree.nodes[node] {
        BspNode::Leaf(mark) => at_leaf(builder, mark, region),
        BspNode::Split { plane, children } => {
            let h = &tree.planes[plane];
            match region.divide(h) {
                Division::Negative => clip(builder, tree, planes, children[0], region, direction, at_leaf),
                Division::Positive => clip(builder, tree, planes, children[2], region, direction, at_leaf),
                Division::On => {
                    let child = children[tie_branch(h, direction)];
                    clip(builder, tree, planes, child, region, direction, at_leaf)
                }
                Division::Crossing(parts) => {
                    let tie = children[tie_branch(h, direction)];
                    let n = clip(builder, tree, planes, children[0], parts.negative, direction, at_leaf);
                    let o = clip(builder, tree, planes, tie, parts.on, direction, at_leaf);
                    let p = clip(builder, tree, planes, children[2], parts.positive, direction, at_leaf);
                    builder.split(planes[plane], [n, o, p])
                }
            }
        }
    }
}

impl<T: Scalar> BspTree<T> {
    pub fn leaf(mark: bool) -> Self {
        BspTree {
            planes: Vec::new(),
            nodes: vec![BspNode::Leaf(mark)],
            root: 0,
        }
    }

    /// The closed or open negative side of `plane`.
    pub fn half_space(plane: &Plane3<T>, boundary: bool) -> Self {
        let mut builder = TreeBuilder::new();
        let canonical = plane.canonicalized();
        let flipped = canonical != plane.normalized();
        let id = builder.plane(&canonical);
        let (inside, outside, on) = (builder.leaf(true), builder.leaf(false), builder.leaf(boundary));
        let children = if flipped {
            [outside, on, inside]
        } else {
            [inside, on, outside]
        };
        let root = builder.split(id, children);
        builder.finish(root)
    }

    pub fn planes(&self) -> &[Plane3<T>] {
        &self.planes
    }

    pub fn nodes(&self) -> &[BspNode] {
        &self.nodes
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of distinct nodes, leaves included.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Every node is reached by a non-empty cell, so a single marked leaf
    /// means a non-empty set.
    pub fn is_empty(&self) -> bool {
        !self.nodes.contains(&BspNode::Leaf(true))
    }

    pub fn is_space(&self) -> bool {
        !self.nodes.contains(&BspNode::Leaf(false))
    }

    /// Children precede their parents and every plane is in use.
    pub fn is_valid(&self) -> bool {
        let mut used = vec![false; self.planes.len()];
        for (id, node) in self.nodes.iter().enumerate() {
            if let BspNode::Split { plane, children } = *node {
                let collapsible = children[0] == children[1] && children[1] == children[2];
                if plane >= self.planes.len() || collapsible || children.iter().any(|&c| c >= id) {
                    return false;
                }
                used[plane] = true;
            }
        }
        self.root < self.nodes.len() && used.into_iter().all(|u| u)
    }

    /// Leaf reached by `p`. A point on a splitting plane follows
    /// `direction` off the plane, the on-branch when there is none or it
    /// runs along the plane.
    pub fn locate(&self, p: &Point3<T>, direction: Option<&Vector3<T>>) -> NodeId {
        let mut id = self.root;
        while let BspNode::Split { plane, children } = self.nodes[id] {
            let h = &self.planes[plane];
            id = match h.oriented_side(p) {
                Sign::Zero => children[tie_branch(h, direction)],
                side => children[branch(side)],
            };
        }
        id
    }

    /// Mark at `p`, or just off `p` along `direction`.
    pub fn mark_at(&self, p: &Point3<T>, direction: Option<&Vector3<T>>) -> bool {
        self.nodes[self.locate(p, direction)] == BspNode::Leaf(true)
    }

    pub fn complement(&self) -> Self {
        BspTree {
            planes: self.planes.clone(),
            nodes: self
                .nodes
                .iter()
                .map(|n| match *n {
                    BspNode::Leaf(mark) => BspNode::Leaf(!mark),
                    split => split,
                })
                .collect(),
            root: self.root,
        }
    }

    /// Box every cell of this tree reaches into.
    pub fn frame(&self) -> Region<T> {
        Region::frame(&frame_bound(&self.planes))
    }

    /// Merges both trees, marking every cell with `op` of the operands'
    /// marks. Each operand is only refined where the other one has
    /// structure.
    pub fn combine(&self, other: &Self, op: BooleanOp) -> Self {
        let mut builder = TreeBuilder::new();
        let left: Vec<usize> = self.planes.iter().map(|p| builder.plane(p)).collect();
        let right: Vec<usize> = other.planes.iter().map(|p| builder.plane(p)).collect();
        let frame = Region::frame(&frame_bound(builder.planes()));
        let mut merger = Merger {
            builder,
            left: (self, left),
            right: (other, right),
            op,
        };
        let root = merger.merge(self.root, other.root, frame);
        merger.builder.finish(root)
    }

    /// Leaf cells of the tree inside `region`.
    pub fn partition(&self, region: Region<T>, direction: Option<&Vector3<T>>) -> Vec<Cell<T>> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        let mut on_planes = SmallVec::new();
        self.walk(self.root, region, direction, &mut path, &mut on_planes, &mut out);
        out
    }

    fn walk(
        &self,
        node: NodeId,
        region: Region<T>,
        direction: Option<&Vector3<T>>,
        path: &mut Vec<u8>,
        on_planes: &mut SmallVec<[usize; 3]>,
        out: &mut Vec<Cell<T>>,
    ) {
        let (plane, children) = match self.nodes[node] {
            BspNode::Leaf(mark) => {
                out.push(Cell {
                    region,
                    mark,
                    path: path.clone(),
                    on_planes: on_planes.clone(),
                });
                return;
            }
            BspNode::Split { plane, children } => (plane, children),
        };
        let h = &self.planes[plane];
        let tie = tie_branch(h, direction);
        let mut descend = |this: &Self, b: usize, part: Region<T>, on: bool| {
            path.push(b as u8);
            if on && b == 1 {
                on_planes.push(plane);
            }
            this.walk(children[b], part, direction, path, on_planes, out);
            if on && b == 1 {
                on_planes.pop();
            }
            path.pop();
        };
        match region.divide(h) {
            Division::Negative => descend(self, 0, region, false),
            Division::Positive => descend(self, 2, region, false),
            Division::On => descend(self, tie, region, true),
            Division::Crossing(parts) => {
                descend(self, 0, parts.negative, false);
                descend(self, tie, parts.on, true);
                descend(self, 2, parts.positive, false);
            }
        }
    }

    /// Directions sampling every neighbourhood of a cell lying on planes
    /// of this tree: across a facet, around a line, around a point.
    fn directions_at(&self, region: &Region<T>) -> Vec<Vector3<T>> {
        match region {
            Region::Solid(_) => Vec::new(),
            Region::Polygon(_) => match region.normal() {
                Some(n) => vec![-&n, n],
                None => Vec::new(),
            },
            Region::Segment(a, b) => {
                let normals: Vec<Vector3<T>> = self
                    .planes
                    .iter()
                    .filter(|h| h.has_on(a) && h.has_on(b))
                    .map(|h| h.normal())
                    .collect();
                let (rays, sectors) = CircleMap::directions(&(b - a), &normals);
                rays.into_iter().chain(sectors).collect()
            }
            Region::Point(p) => {
                let normals = self.planes.iter().filter(|h| h.has_on(p)).map(|h| h.normal()).collect();
                SphereMap::sample_directions(normals)
            }
        }
    }

    /// Replaces the mark of every lower-dimensional cell by `rule` applied
    /// to the marks around it: the closure or the interior of the set.
    pub fn refined(&self, rule: LocalRule) -> Self {
        let frame = self.frame();
        let mut current = self.clone();
        for dimension in [2, 1, 0] {
            current = current.refine_cells(self, &frame, dimension, rule);
        }
        current
    }

    fn refine_cells(&self, original: &Self, frame: &Region<T>, dimension: usize, rule: LocalRule) -> Self {
        let mut builder = TreeBuilder::new();
        let own: Vec<usize> = self.planes.iter().map(|p| builder.plane(p)).collect();
        let theirs: Vec<usize> = original.planes.iter().map(|p| builder.plane(p)).collect();
        let mut at_leaf = |b: &mut TreeBuilder<T>, mark: bool, region: Region<T>| {
            if region.dimension() != dimension || rule.absorbs(mark) {
                return b.leaf(mark);
            }
            let directions = original.directions_at(&region);
            around(b, original, &theirs, region, &directions, rule, mark)
        };
        let root = clip(&mut builder, self, &own, self.root, frame.clone(), None, &mut at_leaf);
        builder.finish(root)
    }
}

/// Folds the marks of `tree` seen from `region` along each direction in
/// turn, splitting the region wherever the answer changes.
fn around<T: Scalar>(
    builder: &mut TreeBuilder<T>,
    tree: &BspTree<T>,
    planes: &[usize],
    region: Region<T>,
    directions: &[Vector3<T>],
    rule: LocalRule,
    acc: bool,
) -> NodeId {
    let Some((first, rest)) = directions.split_first() else {
        return builder.leaf(acc);
    };
    if rule.absorbs(acc) {
        return builder.leaf(acc);
    }
    let mut at_leaf = |b: &mut TreeBuilder<T>, mark: bool, part: Region<T>| {
        around(b, tree, planes, part, rest, rule, rule.combine(acc, mark))
    };
    clip(builder, tree, planes, tree.root, region, Some(first), &mut at_leaf)
}

struct Merger<'a, T: Scalar> {
    builder: TreeBuilder<T>,
    left: (&'a BspTree<T>, Vec<usize>),
    right: (&'a BspTree<T>, Vec<usize>),
    op: BooleanOp,
}

impl<T: Scalar> Merger<'_, T> {
    fn merge(&mut self, a: NodeId, b: NodeId, region: Region<T>) -> NodeId {
        let (left, right) = (self.left.0, self.right.0);
        match (left.nodes[a], right.nodes[b]) {
            (BspNode::Leaf(x), BspNode::Leaf(y)) => self.builder.leaf(self.op.apply(x, y)),
            (BspNode::Leaf(x), BspNode::Split { .. }) => {
                let (lo, hi) = (self.op.apply(x, false), self.op.apply(x, true));
                if lo == hi {
                    return self.builder.leaf(lo);
                }
                let mut relabel = |builder: &mut TreeBuilder<T>, y: bool, _: Region<T>| builder.leaf(y == hi);
                clip(&mut self.builder, right, &self.right.1, b, region, None, &mut relabel)
            }
            (BspNode::Split { .. }, BspNode::Leaf(y)) => {
                let (lo, hi) = (self.op.apply(false, y), self.op.apply(true, y));
                if lo == hi {
                    return self.builder.leaf(lo);
                }
                let mut relabel = |builder: &mut TreeBuilder<T>, x: bool, _: Region<T>| builder.leaf(x == hi);
                clip(&mut self.builder, left, &self.left.1, a, region, None, &mut relabel)
            }
            (BspNode::Split { plane, children }, _) => {
                let g = self.left.1[plane];
                match region.divide(&left.planes[plane]) {
                    Division::Negative => self.merge(children[0], b, region),
                    Division::On => self.merge(children[1], b, region),
                    Division::Positive => self.merge(children[2], b, region),
                    Division::Crossing(parts) => {
                        let n = self.merge(children[0], b, parts.negative);
                        let o = self.merge(children[1], b, parts.on);
                        let p = self.merge(children[2], b, parts.positive);
                        self.builder.split(g, [n, o, p])
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::CgarRational;

    type Tree = BspTree<CgarRational>;
    type P = Point3<CgarRational>;

    fn cube(lo: i32, hi: i32) -> Tree {
        let mut tree = Tree::leaf(true);
        for axis in 0..3 {
            let mut n = [0; 3];
            n[axis] = 1;
            let upper = Tree::half_space(&Plane3::from_ints(n[0], n[1], n[2], -hi), true);
            let lower = Tree::half_space(&Plane3::from_ints(-n[0], -n[1], -n[2], lo), true);
            tree = tree.combine(&upper, BooleanOp::Intersection);
            tree = tree.combine(&lower, BooleanOp::Intersection);
        }
        tree
    }

    #[test]
    fn half_space_orientation_survives_canonical_planes() {
        let below = Tree::half_space(&Plane3::from_ints(0, 0, -2, 2), false);
        assert!(below.mark_at(&P::from_ints(0, 0, 5), None));
        assert!(!below.mark_at(&P::from_ints(0, 0, 1), None));
        assert!(below.mark_at(&P::from_ints(0, 0, 1), Some(&Vector3::from_ints(0, 0, 1))));
        assert_eq!(below.planes().len(), 1);
        assert!(below.is_valid());
    }

    #[test]
    fn cube_tree_stays_small() {
        let tree = cube(0, 2);
        assert_eq!(tree.planes().len(), 6);
        // One split per plane, plus the two leaves.
        assert_eq!(tree.size(), 8);
        assert!(tree.mark_at(&P::from_ints(1, 1, 1), None));
        assert!(tree.mark_at(&P::from_ints(2, 2, 2), None));
        assert!(!tree.mark_at(&P::from_ints(3, 1, 1), None));
        assert!(tree.is_valid());
    }

    #[test]
    fn disjoint_difference_keeps_operand() {
        let a = cube(0, 1);
        let b = cube(5, 6);
        let d = a.combine(&b, BooleanOp::Difference);
        assert_eq!(d, a);
        assert!(a.combine(&a, BooleanOp::Difference).is_empty());
        assert!(a.combine(&a.complement(), BooleanOp::Join).is_space());
    }

    #[test]
    fn refinement_closes_and_opens() {
        let open = Tree::half_space(&Plane3::from_ints(1, 0, 0, 0), false);
        let closed = open.refined(LocalRule::Closure);
        assert_eq!(closed, Tree::half_space(&Plane3::from_ints(1, 0, 0, 0), true));
        assert_eq!(closed.refined(LocalRule::Interior), open);
    }

    #[test]
    fn partition_reports_leaf_cells() {
        let tree = cube(0, 2);
        let cells = tree.partition(tree.frame(), None);
        let dims = |d: usize| cells.iter().filter(|c| c.region.dimension() == d).count();
        // 27 cells of the 3x3x3 grid are only reached where the tree splits.
        assert_eq!(cells.iter().filter(|c| c.mark).count(), 27);
        assert_eq!(dims(3), 7);
        assert!(cells.iter().all(|c| c.on_planes.len() == 3 - c.region.dimension()));
    }
}
