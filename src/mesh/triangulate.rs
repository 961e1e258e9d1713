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

//! Exact ear clipping of planar polygons, holes bridged into the outer ring.

use tracing::trace;

use crate::{
    error::{NefError, NefResult},
    geometry::{Point2, Point3, Vector3, VectorOps},
    kernel::{
        TrianglePosition, locate_in_ring2d, locate_in_triangle2d, on_segment2d, orient2d,
        segments_intersect2d, signed_area2,
    },
    numeric::scalar::{Scalar, Sign},
};

/// Projection of a polygon plane onto the coordinate plane that drops the
/// normal's dominant axis, swapped when needed so counter-clockwise around
/// `normal` stays counter-clockwise in 2D.
struct Projector {
    axis: usize,
    flip: bool,
}

impl Projector {
    fn new<T: Scalar>(normal: &Vector3<T>) -> Self {
        let axis = normal.dominant_axis();
        Projector {
            axis,
            flip: normal.coords[axis].sign() == Sign::Negative,
        }
    }

    fn project<T: Scalar>(&self, p: &Point3<T>) -> Point2<T> {
        let q = p.project(self.axis);
        if self.flip {
            let [x, y] = q.coords;
            Point2::new(y, x)
        } else {
            q
        }
    }
}

/// Triangulates the polygon `outer` (counter-clockwise around `normal`)
/// minus the `holes`. Indices refer to `points`; no point is created.
pub fn triangulate_polygon<T: Scalar>(
    points: &[Point3<T>],
    outer: &[usize],
    holes: &[Vec<usize>],
    normal: &Vector3<T>,
) -> NefResult<Vec<[usize; 3]>> {
    if normal.is_zero() {
        return Err(NefError::Triangulation {
            details: "degenerate polygon normal".into(),
        });
    }
    if outer.len() < 3 {
        return Err(NefError::Triangulation {
            details: format!("outer ring has {} vertices", outer.len()),
        });
    }
    let projector = Projector::new(normal);
    let project_ring =
        |ring: &[usize]| -> Vec<Point2<T>> { ring.iter().map(|&i| projector.project(&points[i])).collect() };

    if signed_area2(&project_ring(outer)).sign() != Sign::Positive {
        return Err(NefError::Triangulation {
            details: "outer ring is not counter-clockwise around the normal".into(),
        });
    }

    let mut holes: Vec<Vec<usize>> = holes
        .iter()
        .filter(|h| h.len() >= 3)
        .map(|h| {
            let mut h = h.clone();
            if signed_area2(&project_ring(&h)).sign() == Sign::Positive {
                h.reverse();
            }
            h
        })
        .collect();

    // Rightmost holes first keeps the bridges short and non-crossing.
    holes.sort_by(|a, b| {
        let max_a = a.iter().map(|&i| projector.project(&points[i])).max();
        let max_b = b.iter().map(|&i| projector.project(&points[i])).max();
        max_b.cmp(&max_a)
    });

    let mut ring: Vec<usize> = outer.to_vec();
    for k in 0..holes.len() {
        let (current, rest) = holes[k..].split_first().ok_or_else(|| NefError::Triangulation {
            details: "hole list exhausted".into(),
        })?;
        ring = bridge_hole(points, &projector, &ring, current, rest)?;
    }

    ear_clip(points, &projector, ring)
}

fn bridge_hole<T: Scalar>(
    points: &[Point3<T>],
    projector: &Projector,
    ring: &[usize],
    hole: &[usize],
    other_holes: &[Vec<usize>],
) -> NefResult<Vec<usize>> {
    let p = |i: usize| projector.project(&points[i]);
    let ring_pts: Vec<Point2<T>> = ring.iter().map(|&i| p(i)).collect();
    let hole_pts: Vec<Point2<T>> = hole.iter().map(|&i| p(i)).collect();
    let others: Vec<Vec<Point2<T>>> = other_holes
        .iter()
        .map(|h| h.iter().map(|&i| p(i)).collect())
        .collect();

    let mut rings: Vec<&[Point2<T>]> = vec![ring_pts.as_slice(), hole_pts.as_slice()];
    rings.extend(others.iter().map(|h| h.as_slice()));

    let mut best: Option<(T, usize, usize)> = None;
    for (hi, h) in hole_pts.iter().enumerate() {
        for (oi, o) in ring_pts.iter().enumerate() {
            if h == o {
                continue;
            }
            let n = ring_pts.len();
            let prev = &ring_pts[(oi + n - 1) % n];
            let next = &ring_pts[(oi + 1) % n];
            if !in_wedge(prev, o, next, h) {
                continue;
            }
            let dx = h.coords[0].clone() - o.coords[0].clone();
            let dy = h.coords[1].clone() - o.coords[1].clone();
            let dist = dx.clone() * dx + dy.clone() * dy;
            if let Some((d, _, _)) = &best {
                if &dist >= d {
                    continue;
                }
            }
            if bridge_is_clear(h, o, &rings) {
                best = Some((dist, hi, oi));
            }
        }
    }

    let (_, hi, oi) = best.ok_or_else(|| NefError::Triangulation {
        details: "no visible vertex to bridge a hole".into(),
    })?;
    trace!(hole_len = hole.len(), ring_len = ring.len(), "bridging hole");

    let mut out = Vec::with_capacity(ring.len() + hole.len() + 2);
    out.extend_from_slice(&ring[..=oi]);
    out.extend_from_slice(&hole[hi..]);
    out.extend_from_slice(&hole[..hi]);
    out.push(hole[hi]);
    out.push(ring[oi]);
    out.extend_from_slice(&ring[oi + 1..]);
    Ok(out)
}

/// `h` is strictly inside the interior angle at `o` of a counter-clockwise
/// ring arriving from `prev` and leaving to `next`.
fn in_wedge<T: Scalar>(prev: &Point2<T>, o: &Point2<T>, next: &Point2<T>, h: &Point2<T>) -> bool {
    let left_of_in = orient2d(prev, o, h) == Sign::Positive;
    let left_of_out = orient2d(o, next, h) == Sign::Positive;
    match orient2d(prev, o, next) {
        Sign::Positive => left_of_in && left_of_out,
        Sign::Negative => left_of_in || left_of_out,
        Sign::Zero => {
            if on_segment2d(prev, next, o) {
                left_of_in
            } else {
                // Spike: everything but the spike ray is interior.
                orient2d(o, next, h) != Sign::Zero || !on_segment2d(o, next, h)
            }
        }
    }
}

fn bridge_is_clear<T: Scalar>(h: &Point2<T>, o: &Point2<T>, rings: &[&[Point2<T>]]) -> bool {
    for ring in rings {
        let n = ring.len();
        for i in 0..n {
            let a = &ring[i];
            let b = &ring[(i + 1) % n];
            let a_shared = a == h || a == o;
            let b_shared = b == h || b == o;
            match (a_shared, b_shared) {
                (true, true) => return false,
                (true, false) => {
                    if on_segment2d(h, o, b) {
                        return false;
                    }
                }
                (false, true) => {
                    if on_segment2d(h, o, a) {
                        return false;
                    }
                }
                (false, false) => {
                    if segments_intersect2d(h, o, a, b) {
                        return false;
                    }
                }
            }
        }
    }

    let two = T::from(2);
    let mid = Point2::new(
        (h.coords[0].clone() + o.coords[0].clone()) / two.clone(),
        (h.coords[1].clone() + o.coords[1].clone()) / two,
    );
    let (outer, holes) = match rings.split_first() {
        Some(split) => split,
        None => return false,
    };
    locate_in_ring2d(outer, &mid) == TrianglePosition::Inside
        && holes
            .iter()
            .all(|hole| locate_in_ring2d(hole, &mid) == TrianglePosition::Outside)
}

fn ear_clip<T: Scalar>(
    points: &[Point3<T>],
    projector: &Projector,
    mut ring: Vec<usize>,
) -> NefResult<Vec<[usize; 3]>> {
    let mut pts: Vec<Point2<T>> = ring.iter().map(|&i| projector.project(&points[i])).collect();
    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));

    while ring.len() > 3 {
        let n = ring.len();
        let ear = (0..n).find(|&i| is_ear(&pts, (i + n - 1) % n, i, (i + 1) % n));
        let Some(i) = ear else {
            return Err(NefError::Triangulation {
                details: format!("no ear left in a ring of {} vertices", n),
            });
        };
        triangles.push([ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]]);
        ring.remove(i);
        pts.remove(i);
    }

    if orient2d(&pts[0], &pts[1], &pts[2]) != Sign::Positive {
        return Err(NefError::Triangulation {
            details: "last triangle is degenerate".into(),
        });
    }
    triangles.push([ring[0], ring[1], ring[2]]);
    Ok(triangles)
}

fn is_ear<T: Scalar>(pts: &[Point2<T>], ia: usize, ib: usize, ic: usize) -> bool {
    let (a, b, c) = (&pts[ia], &pts[ib], &pts[ic]);
    if orient2d(a, b, c) != Sign::Positive {
        return false;
    }
    pts.iter().enumerate().all(|(j, q)| {
        j == ia
            || j == ib
            || j == ic
            || q == a
            || q == b
            || q == c
            || locate_in_triangle2d(a, b, c, q) == TrianglePosition::Outside
    })
}
