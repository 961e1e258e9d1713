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

//! Clean-up of polygon soups read from files before they become halfedge
//! meshes: equal points merged, degenerate and repeated polygons dropped,
//! orientation made consistent across shared edges.

use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};
use tracing::debug;

use crate::{
    geometry::{Point3, PointOps, VectorOps},
    kernel::polygon_normal,
    mesh::builder::PolygonSoup,
    numeric::scalar::Scalar,
};

fn undirected(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

fn edges(polygon: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    (0..polygon.len()).map(move |i| (polygon[i], polygon[(i + 1) % polygon.len()]))
}

fn uses(polygon: &[usize], a: usize, b: usize) -> bool {
    edges(polygon).any(|e| e == (a, b))
}

/// Polygons around one vertex chain into a single fan or ring. Each link
/// runs from the polygon's previous to its next vertex.
fn is_single_fan(links: &[(usize, usize)]) -> bool {
    let mut by_start: AHashMap<usize, usize> = AHashMap::with_capacity(links.len());
    let mut ends: AHashSet<usize> = AHashSet::with_capacity(links.len());
    for (i, &(from, to)) in links.iter().enumerate() {
        if by_start.insert(from, i).is_some() || !ends.insert(to) {
            return false;
        }
    }
    let start = links.iter().position(|(from, _)| !ends.contains(from)).unwrap_or(0);
    let mut at = start;
    let mut walked = 1;
    while let Some(&next) = by_start.get(&links[at].1) {
        if next == start || walked == links.len() {
            break;
        }
        at = next;
        walked += 1;
    }
    walked == links.len()
}

impl<T: Scalar> PolygonSoup<T> {
    /// Merges equal points, then drops polygons left with fewer than three
    /// distinct vertices, a repeated vertex, no area, or the vertex set of
    /// an earlier polygon. Unused points are removed. Returns the number of
    /// polygons dropped.
    pub fn repair(&mut self) -> usize {
        let mut index: AHashMap<&Point3<T>, usize> = AHashMap::with_capacity(self.points.len());
        let mut first_of = Vec::with_capacity(self.points.len());
        for (i, p) in self.points.iter().enumerate() {
            first_of.push(*index.entry(p).or_insert(i));
        }

        let before = self.polygons.len();
        let mut seen: AHashSet<Vec<usize>> = AHashSet::with_capacity(before);
        let mut kept = Vec::with_capacity(before);
        for polygon in &self.polygons {
            let mut ring: Vec<usize> = Vec::with_capacity(polygon.len());
            for &v in polygon {
                let Some(&v) = first_of.get(v) else {
                    continue;
                };
                if ring.last() != Some(&v) {
                    ring.push(v);
                }
            }
            while ring.len() > 1 && ring.first() == ring.last() {
                ring.pop();
            }
            let mut key = ring.clone();
            key.sort_unstable();
            key.dedup();
            if ring.len() < 3 || key.len() != ring.len() {
                continue;
            }
            if polygon_normal(ring.iter().map(|&v| &self.points[v])).is_zero() {
                continue;
            }
            if seen.insert(key) {
                kept.push(ring);
            }
        }

        let mut used = vec![false; self.points.len()];
        for &v in kept.iter().flatten() {
            used[v] = true;
        }
        let mut renumber = vec![usize::MAX; self.points.len()];
        let mut points = Vec::new();
        for (v, p) in self.points.iter().enumerate() {
            if used[v] {
                renumber[v] = points.len();
                points.push(p.clone());
            }
        }
        for v in kept.iter_mut().flatten() {
            *v = renumber[*v];
        }
        let removed = before - kept.len();
        debug!(
            merged = self.points.len() - points.len(),
            removed, "repaired polygon soup"
        );
        self.points = points;
        self.polygons = kept;
        removed
    }

    /// Flips polygons so that neighbours across every shared edge agree,
    /// then turns each closed component to face outward. Returns `false`
    /// when an edge has more than two polygons or a component cannot be
    /// oriented; those polygons keep whatever orientation they reached.
    pub fn orient(&mut self) -> bool {
        let mut edge_polygons: AHashMap<(usize, usize), Vec<usize>> = AHashMap::new();
        for (f, polygon) in self.polygons.iter().enumerate() {
            for (a, b) in edges(polygon) {
                edge_polygons.entry(undirected(a, b)).or_default().push(f);
            }
        }

        let mut orientable = true;
        let mut component = vec![usize::MAX; self.polygons.len()];
        let mut components = 0;
        let mut queue = VecDeque::new();
        for seed in 0..self.polygons.len() {
            if component[seed] != usize::MAX {
                continue;
            }
            component[seed] = components;
            queue.push_back(seed);
            while let Some(f) = queue.pop_front() {
                let ring = self.polygons[f].clone();
                for (a, b) in edges(&ring) {
                    let around = &edge_polygons[&undirected(a, b)];
                    if around.len() > 2 {
                        orientable = false;
                        continue;
                    }
                    for &g in around.iter().filter(|&&g| g != f) {
                        let agrees = uses(&self.polygons[g], b, a);
                        if component[g] == usize::MAX {
                            if !agrees {
                                self.polygons[g].reverse();
                            }
                            component[g] = components;
                            queue.push_back(g);
                        } else if !agrees {
                            orientable = false;
                        }
                    }
                }
            }
            components += 1;
        }

        // Six times the signed volume of each component.
        let mut volume = vec![T::zero(); components];
        for (f, polygon) in self.polygons.iter().enumerate() {
            let origin = self.points[polygon[0]].as_vector();
            for i in 1..polygon.len().saturating_sub(1) {
                let a = self.points[polygon[i]].as_vector();
                let b = self.points[polygon[i + 1]].as_vector();
                volume[component[f]] += &origin.dot(&a.cross(&b));
            }
        }
        let mut flipped = 0;
        for (f, polygon) in self.polygons.iter_mut().enumerate() {
            if volume[component[f]].is_negative() {
                polygon.reverse();
                flipped += 1;
            }
        }
        debug!(components, flipped, orientable, "oriented polygon soup");
        orientable
    }

    /// Every edge is used at most once in each direction by at most two
    /// polygons, and the polygons around every vertex form one fan.
    pub fn is_polygon_mesh(&self) -> bool {
        let mut directed: AHashSet<(usize, usize)> = AHashSet::new();
        let mut links: AHashMap<usize, Vec<(usize, usize)>> = AHashMap::new();
        for polygon in &self.polygons {
            let n = polygon.len();
            if n < 3 || polygon.iter().any(|&v| v >= self.points.len()) {
                return false;
            }
            for i in 0..n {
                if !directed.insert((polygon[i], polygon[(i + 1) % n])) {
                    return false;
                }
                links
                    .entry(polygon[i])
                    .or_default()
                    .push((polygon[(i + n - 1) % n], polygon[(i + 1) % n]));
            }
        }
        links.values().all(|l| is_single_fan(l))
    }
}
