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

//! Relatively open convex cells of a plane partition, clipped to a box.
//!
//! Every node of a [`BspTree`](super::bsp::BspTree) owns such a cell. The
//! box stands in for infinity: it is sized by [`frame_bound`] so that every
//! non-empty cell of any arrangement of the planes involved reaches inside
//! it, which keeps the combinatorics of the clipped cells exact.

use std::cmp::Ordering;

use crate::{
    geometry::{
        plane::Plane3,
        point::{Point3, PointOps, centroid},
        vector::{Vector3, VectorOps},
    },
    kernel::predicates::{compare_angle_around, polygon_normal},
    numeric::scalar::{Scalar, Sign},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Region<T: Scalar> {
    /// Convex polytope given by its boundary faces.
    Solid(Vec<Vec<Point3<T>>>),
    /// Convex polygon, vertices in cyclic order.
    Polygon(Vec<Point3<T>>),
    Segment(Point3<T>, Point3<T>),
    Point(Point3<T>),
}

/// Where a region lies with respect to a plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Negative,
    On,
    Positive,
    /// The plane cuts the region into three non-empty parts.
    Crossing,
}

/// A region cut by a plane: either it lies on one side or on the plane,
/// or it splits into three parts.
#[derive(Clone, Debug)]
pub enum Division<T: Scalar> {
    Negative,
    On,
    Positive,
    Crossing(RegionSplit<T>),
}

#[derive(Clone, Debug)]
pub struct RegionSplit<T: Scalar> {
    pub negative: Region<T>,
    pub on: Region<T>,
    pub positive: Region<T>,
}

/// Half-width of the box every cell is clipped to.
///
/// With integer plane coefficients of height at most `M`, every vertex of
/// the arrangement has coordinates below `M³`, and the same holds for the
/// points of lines and planes closest to the origin. `M⁴ + 1` leaves room
/// for every unbounded cell.
pub fn frame_bound<'a, T, I>(planes: I) -> T
where
    T: Scalar + 'a,
    I: IntoIterator<Item = &'a Plane3<T>>,
{
    let mut height = T::one();
    for plane in planes {
        let h = plane.integral_height();
        if h > height {
            height = h;
        }
    }
    let square = height.clone() * height;
    square.clone() * square + T::one()
}

impl<T: Scalar> Region<T> {
    /// The box `[-bound, bound]³`.
    pub fn frame(bound: &T) -> Self {
        let corner = |i: usize| {
            let c = |bit: usize| {
                if i & (1 << bit) == 0 {
                    -bound.clone()
                } else {
                    bound.clone()
                }
            };
            Point3::new(c(0), c(1), c(2))
        };
        let mut faces = Vec::with_capacity(6);
        for axis in 0..3 {
            let u = 1 << ((axis + 1) % 3);
            let v = 1 << ((axis + 2) % 3);
            for side in [0, 1 << axis] {
                faces.push(vec![
                    corner(side),
                    corner(side | u),
                    corner(side | u | v),
                    corner(side | v),
                ]);
            }
        }
        Region::Solid(faces)
    }

    pub fn dimension(&self) -> usize {
        match self {
            Region::Solid(_) => 3,
            Region::Polygon(_) => 2,
            Region::Segment(..) => 1,
            Region::Point(_) => 0,
        }
    }

    /// Distinct vertices of the closure.
    pub fn vertices(&self) -> Vec<Point3<T>> {
        match self {
            Region::Solid(faces) => {
                let mut all: Vec<Point3<T>> = faces.iter().flatten().cloned().collect();
                all.sort();
                all.dedup();
                all
            }
            Region::Polygon(ring) => ring.clone(),
            Region::Segment(a, b) => vec![a.clone(), b.clone()],
            Region::Point(p) => vec![p.clone()],
        }
    }

    /// A point of the relatively open region.
    pub fn witness(&self) -> Point3<T> {
        match self {
            Region::Point(p) => p.clone(),
            Region::Segment(a, b) => a.midpoint(b),
            _ => {
                let vertices = self.vertices();
                centroid(&vertices).unwrap_or_else(Point3::origin)
            }
        }
    }

    pub fn touches_frame(&self, bound: &T) -> bool {
        let on_frame = |p: &Point3<T>| p.max_abs_coord() == *bound;
        match self {
            Region::Solid(faces) => faces.iter().flatten().any(on_frame),
            Region::Polygon(ring) => ring.iter().any(on_frame),
            Region::Segment(a, b) => on_frame(a) || on_frame(b),
            Region::Point(p) => on_frame(p),
        }
    }

    pub fn placement(&self, plane: &Plane3<T>) -> Placement {
        let mut negative = false;
        let mut positive = false;
        let mut visit = |p: &Point3<T>| match plane.oriented_side(p) {
            Sign::Negative => negative = true,
            Sign::Positive => positive = true,
            Sign::Zero => {}
        };
        match self {
            Region::Solid(faces) => faces.iter().flatten().for_each(&mut visit),
            Region::Polygon(ring) => ring.iter().for_each(&mut visit),
            Region::Segment(a, b) => {
                visit(a);
                visit(b);
            }
            Region::Point(p) => visit(p),
        }
        match (negative, positive) {
            (true, true) => Placement::Crossing,
            (true, false) => Placement::Negative,
            (false, true) => Placement::Positive,
            (false, false) => Placement::On,
        }
    }

    pub fn divide(&self, plane: &Plane3<T>) -> Division<T> {
        match self.placement(plane) {
            Placement::Negative => Division::Negative,
            Placement::On => Division::On,
            Placement::Positive => Division::Positive,
            Placement::Crossing => match self.cut(plane) {
                Some(parts) => Division::Crossing(parts),
                None => Division::On,
            },
        }
    }

    /// Splits a region the plane crosses. `None` for any other placement.
    pub fn split(&self, plane: &Plane3<T>) -> Option<RegionSplit<T>> {
        if self.placement(plane) != Placement::Crossing {
            return None;
        }
        self.cut(plane)
    }

    fn cut(&self, plane: &Plane3<T>) -> Option<RegionSplit<T>> {
        match self {
            Region::Point(_) => None,
            Region::Segment(a, b) => {
                let (va, vb) = (plane.value_at(a), plane.value_at(b));
                let q = crossing_point(a, b, &va, &vb);
                let (lo, hi) = if va.is_negative() { (a, b) } else { (b, a) };
                Some(RegionSplit {
                    negative: Region::Segment(lo.clone(), q.clone()),
                    on: Region::Point(q.clone()),
                    positive: Region::Segment(q, hi.clone()),
                })
            }
            Region::Polygon(ring) => {
                let cut = split_ring(ring, plane);
                let mut on = cut.on;
                on.sort();
                on.dedup();
                let [a, b] = <[Point3<T>; 2]>::try_from(on).ok()?;
                Some(RegionSplit {
                    negative: Region::Polygon(cut.negative),
                    on: Region::Segment(a, b),
                    positive: Region::Polygon(cut.positive),
                })
            }
            Region::Solid(faces) => {
                let mut negative = Vec::new();
                let mut positive = Vec::new();
                let mut cap = Vec::new();
                for face in faces {
                    let cut = split_ring(face, plane);
                    cap.extend(cut.on);
                    if cut.negative.len() >= 3 {
                        negative.push(cut.negative);
                    }
                    if cut.positive.len() >= 3 {
                        positive.push(cut.positive);
                    }
                }
                cap.sort();
                cap.dedup();
                let cap = sort_ring(cap, &plane.normal());
                negative.push(cap.clone());
                positive.push(cap.clone());
                Some(RegionSplit {
                    negative: Region::Solid(negative),
                    on: Region::Polygon(cap),
                    positive: Region::Solid(positive),
                })
            }
        }
    }

    /// Supporting normal of a polygon region.
    pub fn normal(&self) -> Option<Vector3<T>> {
        match self {
            Region::Polygon(ring) => Some(polygon_normal(ring)),
            _ => None,
        }
    }
}

struct RingSplit<T: Scalar> {
    negative: Vec<Point3<T>>,
    positive: Vec<Point3<T>>,
    on: Vec<Point3<T>>,
}

/// Sutherland–Hodgman clip of a ring against both sides of a plane.
/// Points on the plane go to both sides and to `on`.
fn split_ring<T: Scalar>(ring: &[Point3<T>], plane: &Plane3<T>) -> RingSplit<T> {
    let values: Vec<T> = ring.iter().map(|p| plane.value_at(p)).collect();
    let mut out = RingSplit {
        negative: Vec::new(),
        positive: Vec::new(),
        on: Vec::new(),
    };
    let mut negative_seen = false;
    let mut positive_seen = false;
    for i in 0..ring.len() {
        let j = (i + 1) % ring.len();
        let (p, vp, vq) = (&ring[i], &values[i], &values[j]);
        match vp.sign() {
            Sign::Negative => {
                negative_seen = true;
                out.negative.push(p.clone());
            }
            Sign::Positive => {
                positive_seen = true;
                out.positive.push(p.clone());
            }
            Sign::Zero => {
                out.negative.push(p.clone());
                out.positive.push(p.clone());
                out.on.push(p.clone());
            }
        }
        if vp.sign().times(vq.sign()) == Sign::Negative {
            let q = crossing_point(p, &ring[j], vp, vq);
            out.negative.push(q.clone());
            out.positive.push(q.clone());
            out.on.push(q);
        }
    }
    // A face touching the plane from one side leaves only its on-plane
    // points on the other side.
    if !negative_seen {
        out.negative.clear();
    }
    if !positive_seen {
        out.positive.clear();
    }
    out
}

/// Point where the plane crosses `a b`, given the plane's values at both ends.
fn crossing_point<T: Scalar>(a: &Point3<T>, b: &Point3<T>, va: &T, vb: &T) -> Point3<T> {
    let t = va.clone() / (va.clone() - vb.clone());
    a.add_vector(&(b - a).scale(&t))
}

/// Orders coplanar points of a convex polygon counter-clockwise around `axis`.
pub(crate) fn sort_ring<T: Scalar>(mut points: Vec<Point3<T>>, axis: &Vector3<T>) -> Vec<Point3<T>> {
    let Some(center) = centroid(&points) else {
        return points;
    };
    let Some(reference) = points.first().map(|p| p - &center) else {
        return points;
    };
    points.sort_by(|p, q| {
        let (dp, dq) = (p - &center, q - &center);
        match compare_angle_around(axis, &reference, &dp, &dq) {
            Ordering::Equal => dp.squared_length().cmp(&dq.squared_length()),
            other => other,
        }
    });
    points
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
    fn frame_has_six_square_faces() {
        let Region::Solid(faces) = Region::frame(&Q::from(2)) else {
            panic!("frame is a solid");
        };
        assert_eq!(faces.len(), 6);
        assert!(faces.iter().all(|f| f.len() == 4));
        assert_eq!(Region::frame(&Q::from(2)).vertices().len(), 8);
    }

    #[test]
    fn frame_bound_grows_with_plane_height() {
        let small = frame_bound([&Plane3::<Q>::from_ints(1, 0, 0, -1)]);
        let large = frame_bound([&Plane3::<Q>::from_ints(3, 0, 0, -1)]);
        assert_eq!(small, Q::from(17));
        assert!(large > small);
    }

    #[test]
    fn plane_through_box_yields_three_parts() {
        let frame = Region::frame(&Q::from(4));
        let plane = Plane3::<Q>::from_ints(1, 1, 0, -1);
        assert_eq!(frame.placement(&plane), Placement::Crossing);
        let parts = frame.split(&plane).expect("crossing");
        assert_eq!(parts.negative.dimension(), 3);
        assert_eq!(parts.positive.dimension(), 3);
        let Region::Polygon(cap) = &parts.on else {
            panic!("cap is a polygon");
        };
        assert_eq!(cap.len(), 4);
        assert!(cap.iter().all(|q| plane.has_on(q)));
        assert_eq!(parts.negative.placement(&plane), Placement::Negative);
        assert_eq!(parts.positive.placement(&plane), Placement::Positive);
    }

    #[test]
    fn touching_plane_does_not_split() {
        let frame = Region::frame(&Q::from(4));
        let plane = Plane3::<Q>::from_ints(1, 0, 0, -4);
        assert_eq!(frame.placement(&plane), Placement::Negative);
        assert!(frame.split(&plane).is_none());
        assert!(matches!(frame.divide(&plane), Division::Negative));
    }

    #[test]
    fn polygon_and_segment_split() {
        let square = Region::Polygon(vec![p(0, 0, 0), p(2, 0, 0), p(2, 2, 0), p(0, 2, 0)]);
        let plane = Plane3::<Q>::from_ints(1, 0, 0, -1);
        let parts = square.split(&plane).expect("crossing");
        assert_eq!(parts.on, Region::Segment(p(1, 0, 0), p(1, 2, 0)));
        let parts = parts.on.split(&Plane3::from_ints(0, 1, 0, -1)).expect("crossing");
        assert_eq!(parts.on, Region::Point(p(1, 1, 0)));
        assert_eq!(parts.negative, Region::Segment(p(1, 0, 0), p(1, 1, 0)));
    }

    #[test]
    fn split_through_a_vertex() {
        let triangle = Region::Polygon(vec![p(0, 0, 0), p(2, 0, 0), p(0, 2, 0)]);
        let plane = Plane3::<Q>::from_ints(1, -1, 0, 0);
        let parts = triangle.split(&plane).expect("crossing");
        assert_eq!(parts.on, Region::Segment(p(0, 0, 0), p(1, 1, 0)));
        assert_eq!(parts.on.witness(), Point3::new(Q::from_num_den(1, 2), Q::from_num_den(1, 2), Q::from(0)));
    }
}
