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

use std::sync::OnceLock;

use tracing::{debug, info};

use crate::{
    config::Boundary,
    error::{NefError, NefResult},
    geometry::{Plane3, Point3},
    mesh::Polyhedron,
    nef::{
        bsp::{BspTree, LocalRule},
        classify::RayClassifier,
        from_mesh::solid_tree,
        skeleton::Skeleton,
    },
    numeric::scalar::{Scalar, Sign},
};

/// Nef polyhedron: any region of 3-space obtained from half-spaces by
/// boolean operations, bounded or not, manifold or not.
///
/// The region is stored as a BSP tree whose splits follow its boundary.
/// Vertices, edges, facets and volumes are derived from the tree on first
/// use. Operations never modify their operands.
#[derive(Clone, Debug)]
pub struct NefPolyhedron<T: Scalar> {
    tree: BspTree<T>,
    skeleton: OnceLock<Skeleton<T>>,
}

impl<T: Scalar> NefPolyhedron<T> {
    pub(crate) fn from_tree(tree: BspTree<T>) -> Self {
        debug_assert!(tree.is_valid());
        Self {
            tree,
            skeleton: OnceLock::new(),
        }
    }

    pub fn empty() -> Self {
        Self::from_tree(BspTree::leaf(false))
    }

    pub fn complete() -> Self {
        Self::from_tree(BspTree::leaf(true))
    }

    /// The negative side of `plane`, with or without the plane itself.
    pub fn half_space(plane: Plane3<T>, boundary: Boundary) -> Self {
        if plane.is_degenerate() {
            let inside = matches!(
                (plane.d.sign(), boundary),
                (Sign::Negative, _) | (Sign::Zero, Boundary::Included)
            );
            return if inside { Self::complete() } else { Self::empty() };
        }
        Self::from_tree(BspTree::half_space(&plane, boundary == Boundary::Included))
    }

    /// The closed solid bounded by a closed polyhedral surface.
    pub fn from_polyhedron(mesh: &Polyhedron<T>) -> NefResult<Self> {
        if !mesh.is_closed() {
            return Err(NefError::NotClosed {
                border_halfedges: mesh.border_halfedges(),
            });
        }
        let classifier = RayClassifier::new(mesh)?;
        let nef = Self::from_tree(solid_tree(mesh, &classifier)?);
        info!(
            facets = mesh.size_of_facets(),
            planes = nef.number_of_planes(),
            nodes = nef.tree.size(),
            "built Nef polyhedron from polyhedron"
        );
        Ok(nef)
    }

    pub fn tree(&self) -> &BspTree<T> {
        &self.tree
    }

    /// Vertices, edges, facets and volumes of the set.
    pub fn skeleton(&self) -> &Skeleton<T> {
        self.skeleton.get_or_init(|| Skeleton::derive(&self.tree))
    }

    /// Supporting planes of the tree, canonical.
    pub fn planes(&self) -> &[Plane3<T>] {
        self.tree.planes()
    }

    pub fn number_of_planes(&self) -> usize {
        self.tree.planes().len()
    }

    /// Points whose neighbourhood is not invariant along any line.
    pub fn number_of_vertices(&self) -> usize {
        self.skeleton().vertices.len()
    }

    pub fn number_of_edges(&self) -> usize {
        self.skeleton().edges.len()
    }

    pub fn number_of_facets(&self) -> usize {
        self.skeleton().facets.len()
    }

    /// Connected components of space minus the facets, the unbounded
    /// outside included.
    pub fn number_of_volumes(&self) -> usize {
        self.skeleton().volumes
    }

    pub fn contains(&self, p: &Point3<T>) -> bool {
        self.tree.mark_at(p, None)
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn is_space(&self) -> bool {
        self.tree.is_space()
    }

    pub fn is_bounded(&self) -> bool {
        self.is_empty() || (!self.is_space() && self.skeleton().bounded)
    }

    pub fn is_valid(&self) -> bool {
        self.tree.is_valid()
    }

    /// Points with a neighbourhood inside the set.
    pub fn interior(&self) -> Self {
        Self::from_tree(self.tree.refined(LocalRule::Interior))
    }

    pub fn closure(&self) -> Self {
        Self::from_tree(self.tree.refined(LocalRule::Closure))
    }

    pub fn boundary(&self) -> Self {
        self.closure().difference(&self.interior())
    }

    /// Closure of the interior: drops isolated points, dangling edges and
    /// faces, and fills cracks.
    pub fn regularization(&self) -> Self {
        self.interior().closure()
    }

    /// Same point set, regardless of how the two trees split space.
    pub fn same_selection(&self, other: &Self) -> bool {
        self.tree == other.tree || self.symmetric_difference(other).is_empty()
    }

    pub(crate) fn log_summary(&self, what: &str) {
        debug!(
            what,
            planes = self.number_of_planes(),
            nodes = self.tree.size(),
            "Nef polyhedron"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mesh::{MeshBuilder, PolyhedronBuilder},
        numeric::CgarRational,
    };

    type Nef = NefPolyhedron<CgarRational>;
    type P = Point3<CgarRational>;

    fn octahedron(r: i32) -> Polyhedron<CgarRational> {
        let mut builder = PolyhedronBuilder::new();
        for p in [
            P::from_ints(r, 0, 0),
            P::from_ints(-r, 0, 0),
            P::from_ints(0, r, 0),
            P::from_ints(0, -r, 0),
            P::from_ints(0, 0, r),
            P::from_ints(0, 0, -r),
        ] {
            builder.add_vertex(p);
        }
        for face in [
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ] {
            builder.add_face(&face).unwrap();
        }
        builder.finalize().unwrap()
    }

    #[test]
    fn empty_and_complete() {
        assert!(Nef::empty().is_empty());
        assert!(Nef::complete().is_space());
        assert!(Nef::empty().is_bounded());
        assert!(!Nef::complete().is_bounded());
        assert!(Nef::complete().contains(&P::from_ints(100, -7, 3)));
        assert_eq!(Nef::complete().number_of_volumes(), 1);
    }

    #[test]
    fn half_space_boundary_flag() {
        let plane = Plane3::from_ints(0, 0, -1, 0); // z >= 0
        let closed = Nef::half_space(plane.clone(), Boundary::Included);
        let open = Nef::half_space(plane, Boundary::Excluded);
        for nef in [&closed, &open] {
            assert!(nef.contains(&P::from_ints(0, 0, 1)));
            assert!(!nef.contains(&P::from_ints(0, 0, -1)));
            assert!(!nef.is_bounded());
            assert!(nef.is_valid());
        }
        assert!(closed.contains(&P::from_ints(5, 5, 0)));
        assert!(!open.contains(&P::from_ints(5, 5, 0)));
    }

    #[test]
    fn interior_and_closure_of_a_half_space() {
        let closed = Nef::half_space(Plane3::from_ints(1, 0, 0, -1), Boundary::Included);
        let open = Nef::half_space(Plane3::from_ints(1, 0, 0, -1), Boundary::Excluded);
        assert!(closed.interior().same_selection(&open));
        assert!(open.closure().same_selection(&closed));
        let plane = closed.boundary();
        assert!(plane.contains(&P::from_ints(1, 9, -4)));
        assert!(!plane.contains(&P::from_ints(0, 0, 0)));
        assert_eq!(plane.number_of_volumes(), 2);
        assert_eq!(plane.number_of_facets(), 1);
    }

    #[test]
    fn octahedron_counts_its_own_features() {
        let nef = Nef::from_polyhedron(&octahedron(2)).unwrap();
        assert_eq!(nef.number_of_planes(), 8);
        assert_eq!(nef.number_of_vertices(), 6);
        assert_eq!(nef.number_of_edges(), 12);
        assert_eq!(nef.number_of_facets(), 8);
        assert_eq!(nef.number_of_volumes(), 2);
        assert!(nef.is_bounded());
        assert!(nef.contains(&P::from_ints(0, 0, 2)));
        assert!(nef.contains(&P::from_ints(1, 1, 0)));
        assert!(!nef.contains(&P::from_ints(1, 1, 1)));
    }

    #[test]
    fn open_solids_are_rejected() {
        let mut builder = PolyhedronBuilder::new();
        builder.add_vertex(P::from_ints(0, 0, 0));
        builder.add_vertex(P::from_ints(1, 0, 0));
        builder.add_vertex(P::from_ints(0, 1, 0));
        builder.add_face(&[0, 1, 2]).unwrap();
        let mesh = builder.finalize().unwrap();
        assert!(matches!(
            Nef::from_polyhedron(&mesh),
            Err(NefError::NotClosed { border_halfedges: 3 })
        ));
    }
}
