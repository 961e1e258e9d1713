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

use crate::{mesh::polyhedron::Polyhedron, numeric::scalar::Scalar};

/// Disjoint-set forest over dense indices.
pub(crate) struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    pub(crate) fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    pub(crate) fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }
}

/// `V - E + F` of one connected component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentEuler {
    pub vertices: usize,
    pub edges: usize,
    pub faces: usize,
}

impl ComponentEuler {
    pub fn characteristic(&self) -> i64 {
        self.vertices as i64 - self.edges as i64 + self.faces as i64
    }

    /// Genus of a closed orientable surface with this characteristic.
    pub fn genus(&self) -> Option<usize> {
        let chi = self.characteristic();
        if chi > 2 || chi % 2 != 0 {
            None
        } else {
            Some(((2 - chi) / 2) as usize)
        }
    }
}

/// Euler characteristic of every connected component of an indexed
/// polygon set, components ordered by their smallest vertex. Vertices used
/// by no polygon form components of their own.
pub fn polygon_components(vertex_count: usize, polygons: &[Vec<usize>]) -> Vec<ComponentEuler> {
    let mut uf = UnionFind::new(vertex_count);
    let mut edges: Vec<(usize, usize)> = Vec::new();
    for polygon in polygons {
        let n = polygon.len();
        for i in 0..n {
            let (a, b) = (polygon[i], polygon[(i + 1) % n]);
            uf.union(a, b);
            edges.push((a.min(b), a.max(b)));
        }
    }
    edges.sort_unstable();
    edges.dedup();

    let mut slot = vec![usize::MAX; vertex_count];
    let mut out: Vec<ComponentEuler> = Vec::new();
    let mut component_of = |uf: &mut UnionFind, v: usize, out: &mut Vec<ComponentEuler>| {
        let root = uf.find(v);
        if slot[root] == usize::MAX {
            slot[root] = out.len();
            out.push(ComponentEuler {
                vertices: 0,
                edges: 0,
                faces: 0,
            });
        }
        slot[root]
    };
    for v in 0..vertex_count {
        let c = component_of(&mut uf, v, &mut out);
        out[c].vertices += 1;
    }
    for &(a, _) in &edges {
        let c = component_of(&mut uf, a, &mut out);
        out[c].edges += 1;
    }
    for polygon in polygons {
        if let Some(&v) = polygon.first() {
            let c = component_of(&mut uf, v, &mut out);
            out[c].faces += 1;
        }
    }
    out
}

impl<T: Scalar> Polyhedron<T> {
    /// Vertex handles of every connected component, each list sorted,
    /// components ordered by their smallest vertex.
    pub fn connected_components(&self) -> Vec<Vec<usize>> {
        let mut uf = UnionFind::new(self.vertices.len());
        for h in 0..self.half_edges.len() {
            uf.union(self.source(h), self.target(h));
        }
        let mut slot = vec![usize::MAX; self.vertices.len()];
        let mut out: Vec<Vec<usize>> = Vec::new();
        for v in 0..self.vertices.len() {
            let root = uf.find(v);
            if slot[root] == usize::MAX {
                slot[root] = out.len();
                out.push(Vec::new());
            }
            out[slot[root]].push(v);
        }
        out
    }

    pub fn euler_characteristics(&self) -> Vec<ComponentEuler> {
        let polygons: Vec<Vec<usize>> = (0..self.faces.len())
            .map(|f| self.facet_vertices(f).into_vec())
            .collect();
        polygon_components(self.vertices.len(), &polygons)
    }

    /// Closed, and every component is an orientable surface of some genus.
    pub fn is_closed_surface(&self) -> bool {
        self.is_closed() && self.euler_characteristics().iter().all(|c| c.genus().is_some())
    }
}
