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

use smallvec::SmallVec;
use tracing::debug;

use crate::{
    error::{NefError, NefResult},
    geometry::{Plane3, Point3, PointOps, Vector3, VectorOps},
    kernel::polygon_normal,
    mesh::{
        builder::{MeshBuilder, PolygonSoup, PolyhedronBuilder},
        face::Face,
        half_edge::HalfEdge,
        triangulate::triangulate_polygon,
        vertex::Vertex,
    },
    numeric::scalar::Scalar,
};

/// Halfedge polyhedral surface.
///
/// Vertices, half-edges and facets live in parallel arenas addressed by
/// `usize` handles. Half-edges come in twin pairs, so their count is always
/// even; a half-edge with `face == None` is a border half-edge.
#[derive(Clone, Debug, Default)]
pub struct Polyhedron<T: Scalar> {
    pub vertices: Vec<Vertex<T>>,
    pub half_edges: Vec<HalfEdge>,
    pub faces: Vec<Face>,
}

impl<T: Scalar> Polyhedron<T> {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            half_edges: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn size_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn size_of_halfedges(&self) -> usize {
        self.half_edges.len()
    }

    pub fn size_of_facets(&self) -> usize {
        self.faces.len()
    }

    pub fn size_of_edges(&self) -> usize {
        self.half_edges.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn point(&self, v: usize) -> &Point3<T> {
        &self.vertices[v].position
    }

    pub fn target(&self, he: usize) -> usize {
        self.half_edges[he].vertex
    }

    pub fn source(&self, he: usize) -> usize {
        self.half_edges[self.half_edges[he].twin].vertex
    }

    pub fn next(&self, he: usize) -> usize {
        self.half_edges[he].next
    }

    pub fn prev(&self, he: usize) -> usize {
        self.half_edges[he].prev
    }

    pub fn opposite(&self, he: usize) -> usize {
        self.half_edges[he].twin
    }

    pub fn face(&self, he: usize) -> Option<usize> {
        self.half_edges[he].face
    }

    /// Half-edges of facet `f` in cycle order, starting at the facet's
    /// first half-edge.
    pub fn facet_halfedges(&self, f: usize) -> SmallVec<[usize; 4]> {
        let start = self.faces[f].half_edge;
        let mut out = SmallVec::new();
        let mut h = start;
        loop {
            out.push(h);
            h = self.half_edges[h].next;
            if h == start || out.len() > self.half_edges.len() {
                break;
            }
        }
        out
    }

    /// Vertices of facet `f` in the order it was created with.
    pub fn facet_vertices(&self, f: usize) -> SmallVec<[usize; 4]> {
        self.facet_halfedges(f)
            .into_iter()
            .map(|h| self.source(h))
            .collect()
    }

    pub fn facet_degree(&self, f: usize) -> usize {
        self.facet_halfedges(f).len()
    }

    /// Outgoing half-edges of `v`, found by rotating around it.
    pub fn outgoing_half_edges(&self, v: usize) -> Vec<usize> {
        let Some(start) = self.vertices[v].half_edge else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut h = start;
        loop {
            out.push(h);
            // prev(h) arrives at v, its twin leaves v again.
            h = self.half_edges[self.half_edges[h].prev].twin;
            if h == start || out.len() > self.half_edges.len() {
                break;
            }
        }
        out
    }

    pub fn border_halfedges(&self) -> usize {
        self.half_edges.iter().filter(|h| h.is_border()).count()
    }

    pub fn is_closed(&self) -> bool {
        self.half_edges.iter().all(|h| !h.is_border())
    }

    pub fn is_pure_triangle(&self) -> bool {
        (0..self.faces.len()).all(|f| self.facet_degree(f) == 3)
    }

    /// Exact (non-unit) normal of a facet, counter-clockwise.
    pub fn facet_normal(&self, f: usize) -> Vector3<T> {
        let vs = self.facet_vertices(f);
        polygon_normal(vs.iter().map(|&v| self.point(v)))
    }

    /// Supporting plane of a planar facet, oriented so the facet's
    /// vertices are counter-clockwise seen from its positive side. `None`
    /// when the facet is degenerate or not planar.
    pub fn facet_plane(&self, f: usize) -> Option<Plane3<T>> {
        let normal = self.facet_normal(f);
        if normal.is_zero() {
            return None;
        }
        let vs = self.facet_vertices(f);
        let plane = Plane3::from_point_normal(self.point(vs[0]), &normal);
        if vs.iter().all(|&v| plane.has_on(self.point(v))) {
            Some(plane)
        } else {
            None
        }
    }

    /// Exact enclosed volume, positive for outward oriented closed meshes.
    pub fn volume(&self) -> T {
        let mut six = T::zero();
        for f in 0..self.faces.len() {
            let vs = self.facet_vertices(f);
            let p0 = self.point(vs[0]).as_vector();
            for w in vs[1..].windows(2) {
                let p1 = self.point(w[0]).as_vector();
                let p2 = self.point(w[1]).as_vector();
                six += &p0.dot(&p1.cross(&p2));
            }
        }
        six / T::from(6)
    }

    /// Splits every non-triangular facet with exact ear clipping. No
    /// vertex is added or moved.
    pub fn triangulate_faces(&mut self) -> NefResult<()> {
        if self.is_pure_triangle() {
            return Ok(());
        }
        let points: Vec<Point3<T>> = self.vertices.iter().map(|v| v.position.clone()).collect();
        let mut builder = PolyhedronBuilder::with_capacity(points.len(), self.faces.len() * 2);
        for p in &points {
            builder.add_vertex(p.clone());
        }
        for f in 0..self.faces.len() {
            let vs: Vec<usize> = self.facet_vertices(f).into_vec();
            if vs.len() == 3 {
                builder.add_face(&vs)?;
                continue;
            }
            let local: Vec<usize> = (0..vs.len()).collect();
            let ring: Vec<Point3<T>> = vs.iter().map(|&v| points[v].clone()).collect();
            let normal = self.facet_normal(f);
            for [a, b, c] in triangulate_polygon(&ring, &local, &[], &normal)? {
                builder.add_face(&[vs[a], vs[b], vs[c]])?;
            }
        }
        let before = self.faces.len();
        *self = builder.finalize()?;
        debug!(before, after = self.faces.len(), "triangulated facets");
        Ok(())
    }

    pub fn from_polygon_soup(soup: &PolygonSoup<T>) -> NefResult<Self> {
        let mut builder = PolyhedronBuilder::with_capacity(soup.points.len(), soup.polygons.len());
        for p in &soup.points {
            builder.add_vertex(p.clone());
        }
        for polygon in &soup.polygons {
            builder.add_face(polygon)?;
        }
        builder.finalize()
    }

    pub fn to_polygon_soup(&self) -> PolygonSoup<T> {
        PolygonSoup {
            points: self.vertices.iter().map(|v| v.position.clone()).collect(),
            polygons: (0..self.faces.len())
                .map(|f| self.facet_vertices(f).into_vec())
                .collect(),
        }
    }

    /// Combinatorial consistency of the arenas: twins are involutive and
    /// reversed, `next`/`prev` are inverse, every facet cycle is closed and
    /// labelled with its facet, and every vertex points to an outgoing
    /// half-edge.
    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }

    pub fn check(&self) -> NefResult<()> {
        let m = self.half_edges.len();
        if m % 2 != 0 {
            return Err(NefError::topology(format!("odd half-edge count {}", m)));
        }
        for (i, h) in self.half_edges.iter().enumerate() {
            if h.twin >= m || h.next >= m || h.prev >= m || h.vertex >= self.vertices.len() {
                return Err(NefError::topology(format!("half-edge {} has a dangling handle", i)));
            }
            if h.twin == i || self.half_edges[h.twin].twin != i {
                return Err(NefError::topology(format!("half-edge {} twin is not involutive", i)));
            }
            if h.vertex == self.half_edges[h.twin].vertex {
                return Err(NefError::topology(format!("half-edge {} is a loop", i)));
            }
            if self.half_edges[h.next].prev != i || self.half_edges[h.prev].next != i {
                return Err(NefError::topology(format!("half-edge {} next/prev mismatch", i)));
            }
            if self.half_edges[h.next].face != h.face {
                return Err(NefError::topology(format!("half-edge {} leaves its facet", i)));
            }
            if self.source(h.next) != h.vertex {
                return Err(NefError::topology(format!("half-edge {} is not chained", i)));
            }
        }
        for (f, face) in self.faces.iter().enumerate() {
            if face.half_edge >= m || self.half_edges[face.half_edge].face != Some(f) {
                return Err(NefError::topology(format!("facet {} has a foreign half-edge", f)));
            }
            if self.facet_degree(f) < 3 {
                return Err(NefError::topology(format!("facet {} has fewer than 3 sides", f)));
            }
        }
        for (v, vertex) in self.vertices.iter().enumerate() {
            if let Some(h) = vertex.half_edge {
                if h >= m || self.source(h) != v {
                    return Err(NefError::topology(format!("vertex {} has a foreign half-edge", v)));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::{CgarRational, Sign};

    fn square_pyramid() -> Polyhedron<CgarRational> {
        let soup = PolygonSoup {
            points: vec![
                Point3::from_ints(0, 0, 0),
                Point3::from_ints(2, 0, 0),
                Point3::from_ints(2, 2, 0),
                Point3::from_ints(0, 2, 0),
                Point3::from_ints(1, 1, 3),
            ],
            polygons: vec![
                vec![0, 3, 2, 1],
                vec![0, 1, 4],
                vec![1, 2, 4],
                vec![2, 3, 4],
                vec![3, 0, 4],
            ],
        };
        Polyhedron::from_polygon_soup(&soup).unwrap()
    }

    #[test]
    fn pyramid_navigation() {
        let mesh = square_pyramid();
        assert!(mesh.is_valid());
        assert!(mesh.is_closed());
        assert!(!mesh.is_pure_triangle());
        assert_eq!(mesh.size_of_halfedges(), 16);
        assert_eq!(mesh.facet_vertices(0).as_slice(), &[0, 3, 2, 1]);

        let h = mesh.faces[1].half_edge;
        assert_eq!(mesh.source(h), 0);
        assert_eq!(mesh.target(h), 1);
        assert_eq!(mesh.opposite(mesh.opposite(h)), h);
        assert_eq!(mesh.outgoing_half_edges(4).len(), 4);
    }

    #[test]
    fn pyramid_volume_is_exact() {
        let mesh = square_pyramid();
        // base 4, height 3.
        assert_eq!(mesh.volume(), CgarRational::from(4));
    }

    #[test]
    fn triangulating_keeps_volume_and_vertices() {
        let mut mesh = square_pyramid();
        let volume = mesh.volume();
        mesh.triangulate_faces().unwrap();
        assert!(mesh.is_pure_triangle());
        assert!(mesh.is_valid());
        assert_eq!(mesh.size_of_facets(), 6);
        assert_eq!(mesh.size_of_vertices(), 5);
        assert_eq!(mesh.volume(), volume);
    }

    #[test]
    fn facet_plane_orientation() {
        let mesh = square_pyramid();
        let base = mesh.facet_plane(0).unwrap();
        assert_eq!(base.oriented_side(mesh.point(4)), Sign::Negative);
    }
}
