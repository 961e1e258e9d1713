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

//! Incremental construction of meshes from indexed polygons.

use ahash::AHashMap;
use tracing::trace;

use crate::{
    error::{NefError, NefResult},
    geometry::Point3,
    mesh::{face::Face, half_edge::HalfEdge, polyhedron::Polyhedron, vertex::Vertex},
    numeric::scalar::Scalar,
};

/// Sink for indexed polygonal surfaces.
///
/// Vertices are numbered in insertion order. A face lists vertex handles
/// counter-clockwise seen from outside.
pub trait MeshBuilder<T: Scalar> {
    type Output;

    fn add_vertex(&mut self, point: Point3<T>) -> usize;

    fn add_face(&mut self, vertices: &[usize]) -> NefResult<usize>;

    fn finalize(self) -> NefResult<Self::Output>;
}

/// Points plus polygons as index lists, no connectivity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PolygonSoup<T: Scalar> {
    pub points: Vec<Point3<T>>,
    pub polygons: Vec<Vec<usize>>,
}

impl<T: Scalar> PolygonSoup<T> {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            polygons: Vec::new(),
        }
    }

    pub fn is_pure_triangle(&self) -> bool {
        self.polygons.iter().all(|p| p.len() == 3)
    }
}

fn check_face(face: usize, vertices: &[usize], vertex_count: usize) -> NefResult<()> {
    if vertices.len() < 3 {
        return Err(NefError::InvalidFace {
            face,
            details: format!("{} vertices", vertices.len()),
        });
    }
    if let Some(&v) = vertices.iter().find(|&&v| v >= vertex_count) {
        return Err(NefError::InvalidFace {
            face,
            details: format!("vertex {} out of range (have {})", v, vertex_count),
        });
    }
    for (i, v) in vertices.iter().enumerate() {
        if vertices[i + 1..].contains(v) {
            return Err(NefError::InvalidFace {
                face,
                details: format!("vertex {} repeated", v),
            });
        }
    }
    Ok(())
}

impl<T: Scalar> MeshBuilder<T> for PolygonSoup<T> {
    type Output = PolygonSoup<T>;

    fn add_vertex(&mut self, point: Point3<T>) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    fn add_face(&mut self, vertices: &[usize]) -> NefResult<usize> {
        check_face(self.polygons.len(), vertices, self.points.len())?;
        self.polygons.push(vertices.to_vec());
        Ok(self.polygons.len() - 1)
    }

    fn finalize(self) -> NefResult<PolygonSoup<T>> {
        Ok(self)
    }
}

/// Builds a [`Polyhedron`] face by face.
///
/// Every undirected edge gets its twin pair of half-edges the first time
/// it is seen; the half-edge nobody claims stays on the border. Border
/// cycles are linked in [`MeshBuilder::finalize`].
#[derive(Debug, Default)]
pub struct PolyhedronBuilder<T: Scalar> {
    mesh: Polyhedron<T>,
    edge_map: AHashMap<(usize, usize), usize>,
}

impl<T: Scalar> PolyhedronBuilder<T> {
    pub fn new() -> Self {
        Self {
            mesh: Polyhedron::new(),
            edge_map: AHashMap::new(),
        }
    }

    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        let mut builder = Self::new();
        builder.mesh.vertices.reserve(vertices);
        builder.mesh.faces.reserve(faces);
        builder.edge_map.reserve(faces * 4);
        builder
    }

    fn half_edge_for(&mut self, u: usize, v: usize) -> NefResult<usize> {
        if let Some(&h) = self.edge_map.get(&(u, v)) {
            if !self.mesh.half_edges[h].is_border() {
                return Err(NefError::NonManifoldEdge { from: u, to: v });
            }
            return Ok(h);
        }
        let h = self.mesh.half_edges.len();
        let t = h + 1;
        let mut he = HalfEdge::new(v);
        he.twin = t;
        let mut tw = HalfEdge::new(u);
        tw.twin = h;
        self.mesh.half_edges.push(he);
        self.mesh.half_edges.push(tw);
        self.edge_map.insert((u, v), h);
        self.edge_map.insert((v, u), t);
        Ok(h)
    }

    /// Next border half-edge after border `b`: rotate around its target
    /// through interior spokes until a border spoke shows up.
    fn rotate_to_border(&self, b: usize) -> Option<usize> {
        let hs = &self.mesh.half_edges;
        let mut t = hs[b].twin;
        for _ in 0..hs.len() {
            if hs[t].is_border() {
                return None;
            }
            let cand = hs[hs[t].prev].twin;
            if hs[cand].is_border() {
                return Some(cand);
            }
            t = cand;
        }
        None
    }
}

impl<T: Scalar> MeshBuilder<T> for PolyhedronBuilder<T> {
    type Output = Polyhedron<T>;

    fn add_vertex(&mut self, point: Point3<T>) -> usize {
        self.mesh.vertices.push(Vertex::new(point));
        self.mesh.vertices.len() - 1
    }

    fn add_face(&mut self, vertices: &[usize]) -> NefResult<usize> {
        let face = self.mesh.faces.len();
        check_face(face, vertices, self.mesh.vertices.len())?;

        let n = vertices.len();
        // Claim every directed edge before touching the arenas so a
        // rejected face leaves no trace.
        for i in 0..n {
            let (u, v) = (vertices[i], vertices[(i + 1) % n]);
            if let Some(&h) = self.edge_map.get(&(u, v)) {
                if !self.mesh.half_edges[h].is_border() {
                    return Err(NefError::NonManifoldEdge { from: u, to: v });
                }
            }
        }

        let mut ring = Vec::with_capacity(n);
        for i in 0..n {
            ring.push(self.half_edge_for(vertices[i], vertices[(i + 1) % n])?);
        }
        for i in 0..n {
            let h = ring[i];
            let he = &mut self.mesh.half_edges[h];
            he.face = Some(face);
            he.next = ring[(i + 1) % n];
            he.prev = ring[(i + n - 1) % n];
            self.mesh.vertices[vertices[i]].half_edge.get_or_insert(h);
        }
        self.mesh.faces.push(Face::new(ring[0]));
        trace!(face, degree = n, "added face");
        Ok(face)
    }

    fn finalize(mut self) -> NefResult<Polyhedron<T>> {
        let m = self.mesh.half_edges.len();
        let borders: Vec<usize> = (0..m).filter(|&h| self.mesh.half_edges[h].is_border()).collect();

        if !borders.is_empty() {
            // Border half-edges grouped by their source vertex, used when the
            // rotation cannot decide (several border fans at one vertex).
            let mut leaving: AHashMap<usize, Vec<usize>> = AHashMap::new();
            for &b in &borders {
                let source = self.mesh.half_edges[self.mesh.half_edges[b].twin].vertex;
                leaving.entry(source).or_default().push(b);
            }

            let mut next_of = vec![usize::MAX; m];
            let mut taken = vec![false; m];
            for &b in &borders {
                if let Some(nb) = self.rotate_to_border(b) {
                    if !taken[nb] {
                        next_of[b] = nb;
                        taken[nb] = true;
                    }
                }
            }
            for &b in &borders {
                if next_of[b] != usize::MAX {
                    continue;
                }
                let target = self.mesh.half_edges[b].vertex;
                let nb = leaving
                    .get(&target)
                    .and_then(|list| list.iter().copied().find(|&c| !taken[c]))
                    .ok_or_else(|| NefError::topology(format!("border half-edge {} has no successor", b)))?;
                next_of[b] = nb;
                taken[nb] = true;
            }
            for &b in &borders {
                let nb = next_of[b];
                self.mesh.half_edges[b].next = nb;
                self.mesh.half_edges[nb].prev = b;
            }
        }

        trace!(
            vertices = self.mesh.vertices.len(),
            half_edges = m,
            faces = self.mesh.faces.len(),
            "finalized polyhedron"
        );
        Ok(self.mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::CgarRational;

    fn quad_builder() -> PolyhedronBuilder<CgarRational> {
        let mut b = PolyhedronBuilder::new();
        b.add_vertex(Point3::from_ints(0, 0, 0));
        b.add_vertex(Point3::from_ints(1, 0, 0));
        b.add_vertex(Point3::from_ints(1, 1, 0));
        b.add_vertex(Point3::from_ints(0, 1, 0));
        b
    }

    #[test]
    fn open_surface_gets_a_border_cycle() {
        let mut b = quad_builder();
        b.add_face(&[0, 1, 2]).unwrap();
        b.add_face(&[0, 2, 3]).unwrap();
        let mesh = b.finalize().unwrap();

        assert!(mesh.is_valid());
        assert!(!mesh.is_closed());
        assert_eq!(mesh.border_halfedges(), 4);

        let start = (0..mesh.size_of_halfedges())
            .find(|&h| mesh.face(h).is_none())
            .unwrap();
        let mut h = start;
        let mut len = 0;
        loop {
            assert!(mesh.face(h).is_none());
            h = mesh.next(h);
            len += 1;
            if h == start {
                break;
            }
        }
        assert_eq!(len, 4);
    }

    #[test]
    fn same_direction_edge_twice_is_rejected() {
        let mut b = quad_builder();
        b.add_face(&[0, 1, 2]).unwrap();
        let err = b.add_face(&[0, 1, 3]).unwrap_err();
        assert!(matches!(err, NefError::NonManifoldEdge { from: 0, to: 1 }));
        // The rejected face left nothing behind.
        let mesh = b.finalize().unwrap();
        assert_eq!(mesh.size_of_facets(), 1);
        assert_eq!(mesh.size_of_halfedges(), 6);
    }

    #[test]
    fn malformed_faces_are_rejected() {
        let mut b = quad_builder();
        assert!(matches!(b.add_face(&[0, 1]), Err(NefError::InvalidFace { .. })));
        assert!(matches!(b.add_face(&[0, 1, 9]), Err(NefError::InvalidFace { .. })));
        assert!(matches!(b.add_face(&[0, 1, 1]), Err(NefError::InvalidFace { .. })));
    }

    #[test]
    fn soup_builder_keeps_indices() {
        let mut soup = PolygonSoup::<CgarRational>::new();
        let a = soup.add_vertex(Point3::from_ints(0, 0, 0));
        let b = soup.add_vertex(Point3::from_ints(1, 0, 0));
        let c = soup.add_vertex(Point3::from_ints(0, 1, 0));
        assert_eq!(soup.add_face(&[a, b, c]).unwrap(), 0);
        let soup = soup.finalize().unwrap();
        assert!(soup.is_pure_triangle());
        assert_eq!(soup.polygons, vec![vec![0, 1, 2]]);
    }
}
