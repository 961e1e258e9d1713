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

//! BSP tree of the closed solid bounded by a polyhedral surface.
//!
//! The tree is an autopartition: cells are only split along facet planes,
//! and only where a piece of the surface still passes through them. Inside
//! a split plane the pieces of the surface met there drive the splits of
//! the lower-dimensional cells the same way. A cell no piece passes through
//! has a constant mark, taken from the point classifier at its witness.

use tracing::{debug, trace};

use crate::{
    error::{NefError, NefResult},
    geometry::{plane::Plane3, point::{Point3, PointOps}, vector::VectorOps},
    mesh::Polyhedron,
    nef::{
        bsp::{BspTree, NodeId, TreeBuilder},
        classify::RayClassifier,
        region::{Placement, Region, frame_bound},
    },
    numeric::scalar::{Scalar, Sign},
};

/// Piece of the surface inside a cell, with a plane through it that
/// crosses the cell.
#[derive(Clone, Debug)]
struct Fragment<T: Scalar> {
    region: Region<T>,
    plane: usize,
    /// Polygons only: plane of the facet across each edge, `None` between
    /// coplanar facets and along cuts.
    edge_planes: Vec<Option<usize>>,
}

impl<T: Scalar> Fragment<T> {
    fn simple(region: Region<T>, plane: usize) -> Self {
        Fragment {
            region,
            plane,
            edge_planes: Vec::new(),
        }
    }
}

struct Buckets<T: Scalar> {
    negative: Vec<Fragment<T>>,
    on: Vec<Fragment<T>>,
    positive: Vec<Fragment<T>>,
}

impl<T: Scalar> Buckets<T> {
    fn side(&mut self, sign: Sign) -> &mut Vec<Fragment<T>> {
        match sign {
            Sign::Negative => &mut self.negative,
            Sign::Zero => &mut self.on,
            Sign::Positive => &mut self.positive,
        }
    }
}

pub(crate) fn solid_tree<T: Scalar>(mesh: &Polyhedron<T>, classifier: &RayClassifier<T>) -> NefResult<BspTree<T>> {
    let mut triangles = mesh.clone();
    triangles.triangulate_faces()?;

    let mut builder = TreeBuilder::new();
    let facet_planes: Vec<Option<usize>> = (0..triangles.size_of_facets())
        .map(|f| triangles.facet_plane(f).map(|p| builder.plane(&p.canonicalized())))
        .collect();

    let mut fragments = Vec::with_capacity(facet_planes.len());
    for (f, plane) in facet_planes.iter().enumerate() {
        let Some(plane) = *plane else {
            trace!(facet = f, "skipping degenerate triangle");
            continue;
        };
        let halfedges = triangles.facet_halfedges(f);
        let points = halfedges
            .iter()
            .map(|&h| triangles.point(triangles.source(h)).clone())
            .collect();
        let edge_planes = halfedges
            .iter()
            .map(|&h| {
                triangles
                    .face(triangles.opposite(h))
                    .and_then(|g| facet_planes[g])
                    .filter(|&g| g != plane)
            })
            .collect();
        fragments.push(Fragment {
            region: Region::Polygon(points),
            plane,
            edge_planes,
        });
    }

    let frame = Region::frame(&frame_bound(builder.planes()));
    let mut partitioner = Partitioner {
        builder,
        classifier,
        leaves: 0,
    };
    let root = partitioner.build(frame, fragments)?;
    let leaves = partitioner.leaves;
    let tree = partitioner.builder.finish(root);
    debug!(
        fragments = facet_planes.len(),
        leaves,
        nodes = tree.size(),
        planes = tree.planes().len(),
        "autopartition of a closed surface"
    );
    Ok(tree)
}

struct Partitioner<'a, T: Scalar> {
    builder: TreeBuilder<T>,
    classifier: &'a RayClassifier<T>,
    leaves: usize,
}

impl<T: Scalar> Partitioner<'_, T> {
    fn plane(&self, id: usize) -> &Plane3<T> {
        &self.builder.planes()[id]
    }

    fn build(&mut self, region: Region<T>, mut fragments: Vec<Fragment<T>>) -> NefResult<NodeId> {
        fragments.retain(|f| region.placement(self.plane(f.plane)) == Placement::Crossing);
        let Some(first) = fragments.first() else {
            self.leaves += 1;
            let mark = self.classifier.contains_closed(&region.witness())?;
            return Ok(self.builder.leaf(mark));
        };
        let g = first.plane;
        let h = self.plane(g).clone();
        let parts = region
            .split(&h)
            .ok_or_else(|| NefError::topology("splitting plane does not cross its cell"))?;

        let mut buckets = Buckets {
            negative: Vec::new(),
            on: Vec::new(),
            positive: Vec::new(),
        };
        for fragment in fragments {
            self.distribute(fragment, &h, &parts.on, &mut buckets);
        }
        let n = self.build(parts.negative, buckets.negative)?;
        let o = self.build(parts.on, buckets.on)?;
        let p = self.build(parts.positive, buckets.positive)?;
        Ok(self.builder.split(g, [n, o, p]))
    }

    /// First plane through `p` that crosses `region`.
    fn transversal(&self, p: &Point3<T>, region: &Region<T>) -> Option<usize> {
        self.builder
            .planes()
            .iter()
            .position(|h| h.has_on(p) && region.placement(h) == Placement::Crossing)
    }

    fn point_on(&self, p: Point3<T>, on: &Region<T>, buckets: &mut Buckets<T>) {
        if on.dimension() == 0 {
            return;
        }
        match self.transversal(&p, on) {
            Some(plane) => buckets.on.push(Fragment::simple(Region::Point(p), plane)),
            None => trace!(point = ?p.to_f64(), "no plane isolates a surface point"),
        }
    }

    fn distribute(&self, fragment: Fragment<T>, h: &Plane3<T>, on: &Region<T>, buckets: &mut Buckets<T>) {
        match fragment.region {
            Region::Point(p) => match h.oriented_side(&p) {
                Sign::Zero => self.point_on(p, on, buckets),
                side => buckets.side(side).push(Fragment::simple(Region::Point(p), fragment.plane)),
            },
            Region::Segment(a, b) => {
                let (va, vb) = (h.value_at(&a), h.value_at(&b));
                match (va.sign(), vb.sign()) {
                    (Sign::Zero, Sign::Zero) => {
                        self.point_on(a, on, buckets);
                        self.point_on(b, on, buckets);
                    }
                    (Sign::Zero, side) | (side, Sign::Zero) => {
                        let touch = if va.sign() == Sign::Zero { a.clone() } else { b.clone() };
                        buckets.on.push(Fragment::simple(Region::Point(touch), fragment.plane));
                        buckets
                            .side(side)
                            .push(Fragment::simple(Region::Segment(a, b), fragment.plane));
                    }
                    (sa, sb) if sa == sb => {
                        buckets.side(sa).push(Fragment::simple(Region::Segment(a, b), fragment.plane));
                    }
                    (sa, _) => {
                        let t = va.clone() / (va - vb);
                        let q = a.add_vector(&(&b - &a).scale(&t));
                        buckets
                            .side(sa)
                            .push(Fragment::simple(Region::Segment(a, q.clone()), fragment.plane));
                        buckets
                            .side(sa.opposite())
                            .push(Fragment::simple(Region::Segment(q.clone(), b), fragment.plane));
                        buckets.on.push(Fragment::simple(Region::Point(q), fragment.plane));
                    }
                }
            }
            Region::Polygon(points) => {
                let values: Vec<T> = points.iter().map(|p| h.value_at(p)).collect();
                let negative = values.iter().any(|v| v.is_negative());
                let positive = values.iter().any(|v| v.is_positive());
                match (negative, positive) {
                    (false, false) => {
                        // Lies in the split plane: its outline bounds the
                        // solid's trace there.
                        let n = points.len();
                        for (i, label) in fragment.edge_planes.iter().enumerate() {
                            if let Some(l) = *label {
                                let edge = Region::Segment(points[i].clone(), points[(i + 1) % n].clone());
                                buckets.on.push(Fragment::simple(edge, l));
                            }
                        }
                    }
                    (true, true) => {
                        let cut = split_labelled(&points, &fragment.edge_planes, &values);
                        if let [a, b] = cut.on.as_slice() {
                            buckets
                                .on
                                .push(Fragment::simple(Region::Segment(a.clone(), b.clone()), fragment.plane));
                        }
                        buckets.negative.push(Fragment {
                            region: Region::Polygon(cut.negative.0),
                            plane: fragment.plane,
                            edge_planes: cut.negative.1,
                        });
                        buckets.positive.push(Fragment {
                            region: Region::Polygon(cut.positive.0),
                            plane: fragment.plane,
                            edge_planes: cut.positive.1,
                        });
                    }
                    (below, _) => {
                        let touching: Vec<Point3<T>> = points
                            .iter()
                            .zip(&values)
                            .filter(|(_, v)| v.sign() == Sign::Zero)
                            .map(|(p, _)| p.clone())
                            .collect();
                        match touching.as_slice() {
                            [p] => buckets.on.push(Fragment::simple(Region::Point(p.clone()), fragment.plane)),
                            [a, b] => buckets
                                .on
                                .push(Fragment::simple(Region::Segment(a.clone(), b.clone()), fragment.plane)),
                            _ => {}
                        }
                        let side = if below { Sign::Negative } else { Sign::Positive };
                        buckets.side(side).push(Fragment {
                            region: Region::Polygon(points),
                            plane: fragment.plane,
                            edge_planes: fragment.edge_planes,
                        });
                    }
                }
            }
            Region::Solid(_) => {}
        }
    }
}

struct LabelledSplit<T: Scalar> {
    negative: (Vec<Point3<T>>, Vec<Option<usize>>),
    positive: (Vec<Point3<T>>, Vec<Option<usize>>),
    on: Vec<Point3<T>>,
}

/// Clips a convex polygon against both sides of a plane it crosses,
/// carrying the edge labels over. Edges along the cut get no label.
fn split_labelled<T: Scalar>(points: &[Point3<T>], labels: &[Option<usize>], values: &[T]) -> LabelledSplit<T> {
    let n = points.len();
    let side_of = |i: usize| values[i % n].sign();
    let mut out = LabelledSplit {
        negative: (Vec::new(), Vec::new()),
        positive: (Vec::new(), Vec::new()),
        on: Vec::new(),
    };
    for i in 0..n {
        let (si, sj) = (side_of(i), side_of(i + 1));
        if si == Sign::Zero {
            out.on.push(points[i].clone());
        }
        let crossing = si.times(sj) == Sign::Negative;
        let q = crossing.then(|| {
            let (vi, vj) = (&values[i], &values[(i + 1) % n]);
            let t = vi.clone() / (vi.clone() - vj.clone());
            points[i].add_vector(&(&points[(i + 1) % n] - &points[i]).scale(&t))
        });
        if let Some(q) = &q {
            out.on.push(q.clone());
        }
        for (side, ring) in [(Sign::Negative, &mut out.negative), (Sign::Positive, &mut out.positive)] {
            let keeps = |s: Sign| s == side || s == Sign::Zero;
            if keeps(si) {
                // The outgoing edge follows edge i unless it leaves along the cut.
                let label = if keeps(sj) || si == side { labels[i] } else { None };
                ring.0.push(points[i].clone());
                ring.1.push(label);
            }
            if let Some(q) = &q {
                let label = if sj == side { labels[i] } else { None };
                ring.0.push(q.clone());
                ring.1.push(label);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::CgarRational;

    type Q = CgarRational;

    fn p(x: i32, y: i32, z: i32) -> Point3<Q> {
        Point3::from_ints(x, y, z)
    }

    #[test]
    fn labels_follow_the_clipped_edges() {
        let square = [p(0, 0, 0), p(2, 0, 0), p(2, 2, 0), p(0, 2, 0)];
        let labels = [Some(10), Some(11), Some(12), Some(13)];
        let cut = Plane3::<Q>::from_ints(1, 0, 0, -1);
        let values: Vec<Q> = square.iter().map(|q| cut.value_at(q)).collect();
        let split = split_labelled(&square, &labels, &values);
        assert_eq!(split.on, vec![p(1, 0, 0), p(1, 2, 0)]);
        assert_eq!(split.negative.0, vec![p(0, 0, 0), p(1, 0, 0), p(1, 2, 0), p(0, 2, 0)]);
        assert_eq!(split.negative.1, vec![Some(10), None, Some(12), Some(13)]);
        assert_eq!(split.positive.0, vec![p(1, 0, 0), p(2, 0, 0), p(2, 2, 0), p(1, 2, 0)]);
        assert_eq!(split.positive.1, vec![Some(10), Some(11), Some(12), None]);
    }

    #[test]
    fn split_through_a_corner_keeps_labels() {
        let triangle = [p(0, 0, 0), p(2, 0, 0), p(0, 2, 0)];
        let labels = [Some(1), Some(2), Some(3)];
        let cut = Plane3::<Q>::from_ints(1, -1, 0, 0);
        let values: Vec<Q> = triangle.iter().map(|q| cut.value_at(q)).collect();
        let split = split_labelled(&triangle, &labels, &values);
        assert_eq!(split.on.len(), 2);
        // Positive side x > y: corner, (2,0), midpoint of the hypotenuse.
        assert_eq!(split.positive.0.len(), 3);
        assert_eq!(split.positive.1, vec![Some(1), Some(2), None]);
        assert_eq!(split.negative.1, vec![None, Some(2), Some(3)]);
    }
}
