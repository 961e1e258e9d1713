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

//! Local views of a Nef polyhedron around a point and around a line.
//!
//! A [`SphereMap`] records the marks in every direction leaving a point,
//! cut into features by the great circles of the planes through it. A
//! [`CircleMap`] does the same in the plane orthogonal to a line. Both
//! find the planes a local view really depends on, which is what decides
//! whether a point is a vertex and a line carries an edge.

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::{
    geometry::vector::{Vector3, VectorOps},
    kernel::predicates::{compare_angle_around, rank},
    nef::sign_vector::SignVector,
    numeric::scalar::{Scalar, Sign},
};

/// Direction of a line through the center.
#[derive(Clone, Debug)]
pub struct SVertex<T: Scalar> {
    pub direction: Vector3<T>,
    pub mark: bool,
}

/// Arc of a great circle between two consecutive sphere vertices.
#[derive(Clone, Debug)]
pub struct SEdge<T: Scalar> {
    /// Index into [`SphereMap::normals`] of the circle carrying the arc.
    pub circle: usize,
    pub source: usize,
    pub target: usize,
    /// Direction of the arc's midpoint.
    pub direction: Vector3<T>,
    pub mark: bool,
    /// Sphere faces on the positive and the negative side of the circle.
    pub faces: [usize; 2],
}

/// A great circle without sphere vertices, present when a single plane
/// passes through the center.
#[derive(Clone, Debug)]
pub struct SLoop<T: Scalar> {
    pub direction: Vector3<T>,
    pub mark: bool,
    pub faces: [usize; 2],
}

#[derive(Clone, Debug)]
pub struct SFace<T: Scalar> {
    pub direction: Vector3<T>,
    pub mark: bool,
}

#[derive(Clone, Debug)]
pub struct SphereMap<T: Scalar> {
    pub center: bool,
    pub normals: Vec<Vector3<T>>,
    pub svertices: Vec<SVertex<T>>,
    pub sedges: Vec<SEdge<T>>,
    pub sloop: Option<SLoop<T>>,
    pub sfaces: Vec<SFace<T>>,
}

/// Some non-zero vector orthogonal to `n`.
pub(crate) fn orthogonal<T: Scalar>(n: &Vector3<T>) -> Vector3<T> {
    let v = Vector3::new(-n.y().clone(), n.x().clone(), T::zero());
    if v.is_zero() {
        Vector3::from_ints(1, 0, 0)
    } else {
        v
    }
}

fn local_signs<T: Scalar>(normals: &[Vector3<T>], d: &Vector3<T>) -> SignVector {
    SignVector(normals.iter().map(|n| n.dot(d).sign()).collect())
}

fn is_consistent(entries: &[(SignVector, bool)]) -> bool {
    let mut seen: AHashMap<&SignVector, bool> = AHashMap::with_capacity(entries.len());
    entries
        .iter()
        .all(|(sign, mark)| *seen.entry(sign).or_insert(*mark) == *mark)
}

/// Planes (positions in the sign vectors) whose removal merges only
/// entries of equal mark are dropped one at a time; the rest are returned.
/// `None` when the table already maps one position to two marks.
fn essential_positions(mut entries: Vec<(SignVector, bool)>, count: usize) -> Option<Vec<usize>> {
    if !is_consistent(&entries) {
        return None;
    }
    let mut kept: Vec<usize> = (0..count).collect();
    for plane in 0..count {
        let Some(pos) = kept.iter().position(|&q| q == plane) else {
            continue;
        };
        let merged: Vec<(SignVector, bool)> =
            entries.iter().map(|(s, m)| (s.without(pos), *m)).collect();
        if is_consistent(&merged) {
            entries = merged;
            kept.remove(pos);
        }
    }
    Some(kept)
}

impl<T: Scalar> SphereMap<T> {
    /// Builds the sphere map cut by the planes with the given normals,
    /// all passing through the center. `mark_of` reports the mark in a
    /// direction.
    pub fn build<F>(normals: Vec<Vector3<T>>, center: bool, mut mark_of: F) -> SphereMap<T>
    where
        F: FnMut(&Vector3<T>) -> bool,
    {
        let mut map = SphereMap {
            center,
            normals,
            svertices: Vec::new(),
            sedges: Vec::new(),
            sloop: None,
            sfaces: Vec::new(),
        };
        match map.normals.len() {
            0 => {
                let d = Vector3::from_ints(1, 0, 0);
                map.sfaces.push(SFace {
                    mark: mark_of(&d),
                    direction: d,
                });
                return map;
            }
            1 => {
                let n = map.normals[0].clone();
                for d in [n.clone(), -&n] {
                    map.sfaces.push(SFace {
                        mark: mark_of(&d),
                        direction: d,
                    });
                }
                let w = orthogonal(&n);
                map.sloop = Some(SLoop {
                    mark: mark_of(&w),
                    direction: w,
                    faces: [0, 1],
                });
                return map;
            }
            _ => {}
        }

        let normals = map.normals.clone();
        let mut directions: Vec<Vector3<T>> = Vec::new();
        let mut seen: AHashMap<Vector3<T>, usize> = AHashMap::new();
        for a in 0..normals.len() {
            for b in a + 1..normals.len() {
                let c = normals[a].cross(&normals[b]);
                if c.is_zero() {
                    continue;
                }
                for d in [c.direction_key(), (-&c).direction_key()] {
                    if !seen.contains_key(&d) {
                        seen.insert(d.clone(), directions.len());
                        directions.push(d);
                    }
                }
            }
        }
        for d in &directions {
            map.svertices.push(SVertex {
                direction: d.clone(),
                mark: mark_of(d),
            });
        }

        let mut face_index: AHashMap<SmallVec<[Sign; 8]>, usize> = AHashMap::new();
        for (k, n) in normals.iter().enumerate() {
            let mut on: Vec<usize> = (0..directions.len())
                .filter(|&i| n.dot(&directions[i]).sign() == Sign::Zero)
                .collect();
            if on.len() < 2 {
                continue;
            }
            let reference = directions[on[0]].clone();
            on.sort_by(|&a, &b| compare_angle_around(n, &reference, &directions[a], &directions[b]));

            for w in 0..on.len() {
                let (a, b) = (on[w], on[(w + 1) % on.len()]);
                let mut r = &directions[a] + &directions[b];
                if r.is_zero() {
                    r = n.cross(&directions[a]);
                }
                let r = r.direction_key();

                // Step off the circle less than halfway to any other circle.
                let mut step: Option<T> = None;
                for (j, m) in normals.iter().enumerate() {
                    if j == k {
                        continue;
                    }
                    let nm = m.dot(n);
                    if nm.sign() == Sign::Zero {
                        continue;
                    }
                    let bound = m.dot(&r).abs() / (nm.abs() * T::from(2));
                    if step.as_ref().is_none_or(|s| &bound < s) {
                        step = Some(bound);
                    }
                }
                let step = step.unwrap_or_else(T::one);

                let mut faces = [0, 0];
                for (side, s) in [(0usize, step.clone()), (1, -step.clone())] {
                    let q = (&r + &n.scale(&s)).direction_key();
                    let key: SmallVec<[Sign; 8]> = normals.iter().map(|m| m.dot(&q).sign()).collect();
                    faces[side] = match face_index.get(&key) {
                        Some(&idx) => idx,
                        None => {
                            let idx = map.sfaces.len();
                            map.sfaces.push(SFace {
                                mark: mark_of(&q),
                                direction: q,
                            });
                            face_index.insert(key, idx);
                            idx
                        }
                    };
                }

                map.sedges.push(SEdge {
                    circle: k,
                    source: a,
                    target: b,
                    mark: mark_of(&r),
                    direction: r,
                    faces,
                });
            }
        }
        map
    }

    /// One direction per feature of the map cut by `normals`.
    pub fn sample_directions(normals: Vec<Vector3<T>>) -> Vec<Vector3<T>> {
        let map = SphereMap::build(normals, false, |_| false);
        map.features().map(|(d, _)| d.clone()).collect()
    }

    /// Direction and mark of every feature except the center.
    pub fn features(&self) -> impl Iterator<Item = (&Vector3<T>, bool)> + '_ {
        self.svertices
            .iter()
            .map(|v| (&v.direction, v.mark))
            .chain(self.sedges.iter().map(|e| (&e.direction, e.mark)))
            .chain(self.sloop.iter().map(|l| (&l.direction, l.mark)))
            .chain(self.sfaces.iter().map(|f| (&f.direction, f.mark)))
    }

    /// Circles the marks really depend on; `None` when the center
    /// differs from a direction that lies on every circle.
    pub fn essential_circles(&self) -> Option<Vec<usize>> {
        let count = self.normals.len();
        let entries = std::iter::once((SignVector(SmallVec::from_elem(Sign::Zero, count)), self.center))
            .chain(self.features().map(|(d, m)| (local_signs(&self.normals, d), m)))
            .collect();
        essential_positions(entries, count)
    }

    /// The center is a vertex unless the marks around it are invariant
    /// along some line through it.
    pub fn is_vertex(&self) -> bool {
        match self.essential_circles() {
            None => true,
            Some(kept) => rank(kept.iter().map(|&k| &self.normals[k])) == 3,
        }
    }

    /// Arcs separating sphere faces of different marks.
    pub fn boundary_arcs(&self) -> Vec<bool> {
        self.sedges
            .iter()
            .map(|e| self.sfaces[e.faces[0]].mark != self.sfaces[e.faces[1]].mark)
            .collect()
    }

    /// The center disagrees with every direction around it.
    pub fn is_isolated(&self) -> bool {
        self.sfaces.iter().all(|f| f.mark != self.center)
            && self.features().all(|(_, m)| m != self.center)
    }

    /// The boundary arcs form no cycle or exactly one simple cycle.
    pub fn boundary_is_single_cycle(&self) -> bool {
        let selected = self.boundary_arcs();
        let arcs: Vec<usize> = (0..self.sedges.len()).filter(|&i| selected[i]).collect();
        if arcs.is_empty() {
            return true;
        }
        let mut degree = vec![0usize; self.svertices.len()];
        for &a in &arcs {
            degree[self.sedges[a].source] += 1;
            degree[self.sedges[a].target] += 1;
        }
        if degree.iter().any(|&d| d != 0 && d != 2) {
            return false;
        }

        // Walk the cycle through the first arc; it must use every arc.
        let mut visited = vec![false; self.sedges.len()];
        let mut arc = arcs[0];
        let mut at = self.sedges[arc].target;
        let mut walked = 0;
        loop {
            visited[arc] = true;
            walked += 1;
            let next = arcs.iter().copied().find(|&b| {
                !visited[b] && (self.sedges[b].source == at || self.sedges[b].target == at)
            });
            match next {
                Some(b) => {
                    let e = &self.sedges[b];
                    at = if e.source == at { e.target } else { e.source };
                    arc = b;
                }
                None => break,
            }
        }
        walked == arcs.len()
    }
}

/// Marks around a line: half-planes bounded by it and the sectors between.
#[derive(Clone, Debug)]
pub struct CircleMap<T: Scalar> {
    pub center: bool,
    pub normals: Vec<Vector3<T>>,
    /// Half-planes counter-clockwise around the line's direction.
    pub rays: Vec<(Vector3<T>, bool)>,
    /// `sectors[i]` lies between `rays[i]` and the next ray.
    pub sectors: Vec<(Vector3<T>, bool)>,
}

impl<T: Scalar> CircleMap<T> {
    /// Ray and sector directions around `axis` cut by planes containing it.
    pub fn directions(axis: &Vector3<T>, normals: &[Vector3<T>]) -> (Vec<Vector3<T>>, Vec<Vector3<T>>) {
        let mut rays: Vec<Vector3<T>> = Vec::with_capacity(2 * normals.len());
        for n in normals {
            let w = n.cross(axis).direction_key();
            for d in [-&w, w] {
                if !rays.contains(&d) {
                    rays.push(d);
                }
            }
        }
        let Some(reference) = rays.first().cloned() else {
            return (rays, vec![orthogonal(axis)]);
        };
        rays.sort_by(|a, b| compare_angle_around(axis, &reference, a, b));
        let sectors = (0..rays.len())
            .map(|i| {
                let (a, b) = (&rays[i], &rays[(i + 1) % rays.len()]);
                let s = a + b;
                if s.is_zero() { axis.cross(a) } else { s }
            })
            .collect();
        (rays, sectors)
    }

    pub fn build<F>(axis: &Vector3<T>, normals: Vec<Vector3<T>>, center: bool, mut mark_of: F) -> Self
    where
        F: FnMut(&Vector3<T>) -> bool,
    {
        let (rays, sectors) = Self::directions(axis, &normals);
        let mut marked = |ds: Vec<Vector3<T>>| {
            ds.into_iter()
                .map(|d| {
                    let m = mark_of(&d);
                    (d, m)
                })
                .collect::<Vec<(Vector3<T>, bool)>>()
        };
        let rays = marked(rays);
        let sectors = marked(sectors);
        CircleMap {
            center,
            normals,
            rays,
            sectors,
        }
    }

    /// The line carries an edge unless the marks around it are invariant
    /// across the line inside some plane.
    pub fn is_edge(&self) -> bool {
        let count = self.normals.len();
        let entries = std::iter::once((SignVector(SmallVec::from_elem(Sign::Zero, count)), self.center))
            .chain(
                self.rays
                    .iter()
                    .chain(&self.sectors)
                    .map(|(d, m)| (local_signs(&self.normals, d), *m)),
            )
            .collect();
        match essential_positions(entries, count) {
            None => true,
            Some(kept) => kept.len() >= 2,
        }
    }

    /// Half-planes separating sectors of different marks.
    pub fn boundary_fan(&self) -> usize {
        let n = self.rays.len();
        (0..n)
            .filter(|&i| self.sectors[(i + n - 1) % n].1 != self.sectors[i].1)
            .count()
    }

    /// The line differs from every sector around it.
    pub fn is_isolated(&self) -> bool {
        self.sectors.iter().all(|(_, m)| *m != self.center)
    }

    /// A half-plane differs from both sectors beside it while they agree.
    pub fn has_dangling_ray(&self) -> bool {
        let n = self.rays.len();
        (0..n).any(|i| {
            let (before, after) = (self.sectors[(i + n - 1) % n].1, self.sectors[i].1);
            before == after && self.rays[i].1 != before
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::CgarRational;

    type V = Vector3<CgarRational>;

    fn axes() -> Vec<V> {
        vec![V::from_ints(1, 0, 0), V::from_ints(0, 1, 0), V::from_ints(0, 0, 1)]
    }

    fn positive_octant(d: &V) -> bool {
        d.coords.iter().all(|c| c.sign() != Sign::Negative)
    }

    #[test]
    fn octant_corner_has_octahedral_map() {
        let map = SphereMap::build(axes(), true, positive_octant);
        assert_eq!(map.svertices.len(), 6);
        assert_eq!(map.sedges.len(), 12);
        assert_eq!(map.sfaces.len(), 8);
        assert_eq!(map.sfaces.iter().filter(|f| f.mark).count(), 1);
        assert_eq!(map.boundary_arcs().iter().filter(|&&b| b).count(), 3);
        assert!(map.boundary_is_single_cycle());
        assert!(map.is_vertex());
    }

    #[test]
    fn point_inside_a_facet_is_no_vertex() {
        // Lower half-space z <= 0 seen from a point of its boundary that
        // happens to lie on two more planes.
        let below = |d: &V| d.z().sign() != Sign::Positive;
        let map = SphereMap::build(axes(), true, below);
        assert_eq!(map.essential_circles(), Some(vec![2]));
        assert!(!map.is_vertex());
    }

    #[test]
    fn single_plane_and_empty_maps() {
        let map = SphereMap::build(vec![V::from_ints(0, 0, 1)], false, |d: &V| d.z().is_positive());
        assert_eq!(map.sfaces.len(), 2);
        assert!(map.sloop.is_some());
        assert!(!map.is_vertex());
        let lonely = SphereMap::<CgarRational>::build(Vec::new(), true, |_| false);
        assert!(lonely.is_vertex());
        assert!(lonely.is_isolated());
    }

    #[test]
    fn two_opposite_octants_are_not_one_cycle() {
        let opposite = |d: &V| {
            positive_octant(d) || d.coords.iter().all(|c| c.sign() != Sign::Positive)
        };
        let map = SphereMap::build(axes(), true, opposite);
        assert!(!map.boundary_is_single_cycle());
    }

    #[test]
    fn circle_map_around_a_cube_edge() {
        // Edge along z of the quadrant x <= 0, y <= 0.
        let axis = V::from_ints(0, 0, 1);
        let normals = vec![V::from_ints(1, 0, 0), V::from_ints(0, 1, 0)];
        let quadrant = |d: &V| d.x().sign() != Sign::Positive && d.y().sign() != Sign::Positive;
        let map = CircleMap::build(&axis, normals, true, quadrant);
        assert_eq!(map.rays.len(), 4);
        assert_eq!(map.sectors.len(), 4);
        assert_eq!(map.boundary_fan(), 2);
        assert!(map.is_edge());
        assert!(!map.has_dangling_ray());
    }

    #[test]
    fn line_inside_a_facet_is_no_edge() {
        let axis = V::from_ints(0, 0, 1);
        let normals = vec![V::from_ints(1, 0, 0), V::from_ints(0, 1, 0)];
        let half = |d: &V| d.x().sign() != Sign::Positive;
        let map = CircleMap::build(&axis, normals, true, half);
        assert!(!map.is_edge());
        assert_eq!(map.boundary_fan(), 2);
        let dangling = CircleMap::build(&axis, vec![V::from_ints(1, 0, 0)], true, |_| false);
        assert!(dangling.is_edge());
        assert!(dangling.is_isolated());
    }
}
