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

use std::cmp::Ordering;

use crate::{
    geometry::{Point2, Point3, PointOps, Vector3, VectorOps},
    numeric::scalar::{Scalar, Sign},
};

/// Orientation of `c` relative to the directed line `a → b`:
/// `Positive` for a left turn (counter-clockwise).
pub fn orient2d<T: Scalar>(a: &Point2<T>, b: &Point2<T>, c: &Point2<T>) -> Sign {
    let abx = b.coords[0].clone() - a.coords[0].clone();
    let aby = b.coords[1].clone() - a.coords[1].clone();
    let acx = c.coords[0].clone() - a.coords[0].clone();
    let acy = c.coords[1].clone() - a.coords[1].clone();
    (abx * acy - aby * acx).sign()
}

/// Sign of the signed volume of the tetrahedron `(a, b, c, d)`:
/// `((b - a) × (c - a)) · (d - a)`.
pub fn orient3d<T: Scalar>(a: &Point3<T>, b: &Point3<T>, c: &Point3<T>, d: &Point3<T>) -> Sign {
    (b - a).cross(&(c - a)).dot(&(d - a)).sign()
}

/// Sign of `(u × v) · axis`: whether `v` is counter-clockwise from `u`
/// seen from the tip of `axis`.
pub fn turn_around<T: Scalar>(axis: &Vector3<T>, u: &Vector3<T>, v: &Vector3<T>) -> Sign {
    u.cross(v).dot(axis).sign()
}

/// Orders `a` and `b` by their counter-clockwise angle from `reference`,
/// in `[0, 2π)`, seen from the tip of `axis`. All vectors are expected to
/// be non-zero and orthogonal to `axis`.
pub fn compare_angle_around<T: Scalar>(
    axis: &Vector3<T>,
    reference: &Vector3<T>,
    a: &Vector3<T>,
    b: &Vector3<T>,
) -> Ordering {
    let quadrant = |d: &Vector3<T>| match turn_around(axis, reference, d) {
        Sign::Positive => 1,
        Sign::Negative => 3,
        Sign::Zero => {
            if reference.dot(d).sign() == Sign::Positive {
                0
            } else {
                2
            }
        }
    };
    let (qa, qb) = (quadrant(a), quadrant(b));
    if qa != qb {
        return qa.cmp(&qb);
    }
    if qa % 2 == 0 {
        return Ordering::Equal;
    }
    match turn_around(axis, a, b) {
        Sign::Positive => Ordering::Less,
        Sign::Negative => Ordering::Greater,
        Sign::Zero => Ordering::Equal,
    }
}

/// Dimension of the space spanned by `vectors`.
pub fn rank<'a, T, I>(vectors: I) -> usize
where
    T: Scalar + 'a,
    I: IntoIterator<Item = &'a Vector3<T>>,
{
    let vs: Vec<&Vector3<T>> = vectors.into_iter().filter(|v| !v.is_zero()).collect();
    let Some(first) = vs.first() else {
        return 0;
    };
    let Some(cross) = vs
        .iter()
        .map(|v| first.cross(v))
        .find(|c| !c.is_zero())
    else {
        return 1;
    };
    if vs.iter().any(|v| cross.dot(v).sign() != Sign::Zero) {
        3
    } else {
        2
    }
}

/// True if `p` lies on the closed segment `a b` (all points in a plane).
pub fn on_segment2d<T: Scalar>(a: &Point2<T>, b: &Point2<T>, p: &Point2<T>) -> bool {
    if orient2d(a, b, p) != Sign::Zero {
        return false;
    }
    (0..2).all(|i| {
        let (lo, hi) = if a.coords[i] <= b.coords[i] {
            (&a.coords[i], &b.coords[i])
        } else {
            (&b.coords[i], &a.coords[i])
        };
        lo <= &p.coords[i] && &p.coords[i] <= hi
    })
}

/// Closed segments `p1 p2` and `q1 q2` share at least one point.
pub fn segments_intersect2d<T: Scalar>(
    p1: &Point2<T>,
    p2: &Point2<T>,
    q1: &Point2<T>,
    q2: &Point2<T>,
) -> bool {
    let o1 = orient2d(p1, p2, q1);
    let o2 = orient2d(p1, p2, q2);
    let o3 = orient2d(q1, q2, p1);
    let o4 = orient2d(q1, q2, p2);

    if o1 != Sign::Zero && o2 != Sign::Zero && o3 != Sign::Zero && o4 != Sign::Zero {
        return o1 != o2 && o3 != o4;
    }
    on_segment2d(p1, p2, q1)
        || on_segment2d(p1, p2, q2)
        || on_segment2d(q1, q2, p1)
        || on_segment2d(q1, q2, p2)
}

/// Position of `p` relative to the closed triangle `a b c` (any orientation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrianglePosition {
    Outside,
    OnBoundary,
    Inside,
}

pub fn locate_in_triangle2d<T: Scalar>(
    a: &Point2<T>,
    b: &Point2<T>,
    c: &Point2<T>,
    p: &Point2<T>,
) -> TrianglePosition {
    let o = orient2d(a, b, c);
    if o == Sign::Zero {
        return if on_segment2d(a, b, p) || on_segment2d(b, c, p) || on_segment2d(c, a, p) {
            TrianglePosition::OnBoundary
        } else {
            TrianglePosition::Outside
        };
    }
    let s = [orient2d(a, b, p), orient2d(b, c, p), orient2d(c, a, p)];
    if s.iter().any(|&x| x == o.opposite()) {
        TrianglePosition::Outside
    } else if s.iter().any(|&x| x == Sign::Zero) {
        TrianglePosition::OnBoundary
    } else {
        TrianglePosition::Inside
    }
}

/// Unit normal of `(p, q, r)` in doubles, `None` for collinear points.
pub fn unit_normal<T: Scalar>(p: &Point3<T>, q: &Point3<T>, r: &Point3<T>) -> Option<[f64; 3]> {
    let n = (q - p).cross(&(r - p));
    if n.is_zero() {
        return None;
    }
    let [x, y, z] = n.to_f64();
    let len = (x * x + y * y + z * z).sqrt();
    if len == 0.0 || !len.is_finite() {
        return None;
    }
    Some([x / len, y / len, z / len])
}

/// Newell normal of a closed polygon: exact, oriented counter-clockwise,
/// and non-zero for every non-degenerate planar polygon, convex or not.
pub fn polygon_normal<'a, T, I>(ring: I) -> Vector3<T>
where
    T: Scalar + 'a,
    I: IntoIterator<Item = &'a Point3<T>>,
{
    let pts: Vec<&Point3<T>> = ring.into_iter().collect();
    let mut n = Vector3::<T>::zero();
    for i in 0..pts.len() {
        let p = pts[i].as_vector();
        let q = pts[(i + 1) % pts.len()].as_vector();
        n = &n + &p.cross(&q);
    }
    n
}

/// Twice the signed area of a projected polygon.
pub fn signed_area2<T: Scalar>(ring: &[Point2<T>]) -> T {
    let mut sum = T::zero();
    for i in 0..ring.len() {
        let p = &ring[i];
        let q = &ring[(i + 1) % ring.len()];
        sum += &(p.coords[0].clone() * q.coords[1].clone() - p.coords[1].clone() * q.coords[0].clone());
    }
    sum
}

/// Position of `p` relative to a closed ring (crossing parity, exact).
pub fn locate_in_ring2d<T: Scalar>(ring: &[Point2<T>], p: &Point2<T>) -> TrianglePosition {
    let n = ring.len();
    let mut inside = false;
    for i in 0..n {
        let a = &ring[i];
        let b = &ring[(i + 1) % n];
        if on_segment2d(a, b, p) {
            return TrianglePosition::OnBoundary;
        }
        let ay = &a.coords[1];
        let by = &b.coords[1];
        let py = &p.coords[1];
        // Half-open rule on y so vertices are counted once.
        if (ay > py) != (by > py) {
            let o = orient2d(a, b, p);
            let upward = by > ay;
            if (upward && o == Sign::Positive) || (!upward && o == Sign::Negative) {
                inside = !inside;
            }
        }
    }
    if inside {
        TrianglePosition::Inside
    } else {
        TrianglePosition::Outside
    }
}
