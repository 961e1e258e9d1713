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

//! Boundary extraction: simple, bounded Nef polyhedron to polygon mesh.

use std::collections::BTreeSet;

use ahash::{AHashMap, AHashSet};
use tracing::info;

use crate::{
    config::{ConversionOptions, FacetMode},
    error::{NefError, NefResult},
    geometry::Vector3,
    mesh::{
        MeshBuilder, Polyhedron, PolyhedronBuilder, topology::polygon_components,
        triangulate::triangulate_polygon,
    },
    nef::nef_polyhedron::NefPolyhedron,
    numeric::scalar::Scalar,
};

/// Boundary facet with its rings turned to face out of the solid.
struct OutwardFacet<T: Scalar> {
    normal: Vector3<T>,
    outer: Vec<usize>,
    holes: Vec<Vec<usize>>,
}

/// Writes the boundary of `nef` into `builder` as a closed polygon mesh
/// with outward oriented facets.
///
/// Fails with [`NefError::NotManifold`] unless `nef` is simple and with
/// [`NefError::Unbounded`] when the selection reaches infinity. Facets
/// with holes are always triangulated. The polygons are checked to form
/// closed orientable surfaces before anything reaches `builder`.
pub fn convert_nef_polyhedron_to_polygon_mesh<T, B>(
    nef: &NefPolyhedron<T>,
    builder: &mut B,
    options: &ConversionOptions,
) -> NefResult<()>
where
    T: Scalar,
    B: MeshBuilder<T>,
{
    if !nef.is_simple() {
        return Err(NefError::NotManifold);
    }
    if !nef.is_bounded() {
        return Err(NefError::Unbounded);
    }

    let skeleton = nef.skeleton();
    let points = &skeleton.points;
    let facets: Vec<OutwardFacet<T>> = skeleton
        .facets
        .iter()
        .filter(|f| f.below != f.above)
        .map(|f| {
            let normal = nef.planes()[f.plane].normal();
            if f.below {
                OutwardFacet {
                    normal,
                    outer: f.outer.clone(),
                    holes: f.holes.clone(),
                }
            } else {
                let reversed = |ring: &Vec<usize>| ring.iter().rev().copied().collect::<Vec<_>>();
                OutwardFacet {
                    normal: -normal,
                    outer: reversed(&f.outer),
                    holes: f.holes.iter().map(reversed).collect(),
                }
            }
        })
        .collect();

    let used: BTreeSet<usize> = facets
        .iter()
        .flat_map(|f| f.outer.iter().chain(f.holes.iter().flatten()).copied())
        .collect();
    let local: AHashMap<usize, usize> = used.iter().enumerate().map(|(i, &v)| (v, i)).collect();

    let mut polygons: Vec<Vec<usize>> = Vec::new();
    for facet in &facets {
        let repeated = facet.outer.iter().collect::<AHashSet<_>>().len() != facet.outer.len();
        if facet.holes.is_empty() && !repeated && options.facet_mode == FacetMode::Preserve {
            polygons.push(facet.outer.iter().map(|v| local[v]).collect());
            continue;
        }
        for tri in triangulate_polygon(points, &facet.outer, &facet.holes, &facet.normal)? {
            polygons.push(tri.iter().map(|v| local[v]).collect());
        }
    }

    verify_closed_surface(used.len(), &polygons)?;

    for &v in &used {
        builder.add_vertex(points[v].clone());
    }
    for polygon in &polygons {
        builder.add_face(polygon)?;
    }
    info!(
        vertices = used.len(),
        facets = polygons.len(),
        mode = ?options.facet_mode,
        "converted Nef polyhedron to polygon mesh"
    );
    Ok(())
}

impl<T: Scalar> NefPolyhedron<T> {
    /// Boundary of a simple, bounded Nef polyhedron as a closed halfedge
    /// mesh.
    pub fn to_polyhedron(&self, facet_mode: FacetMode) -> NefResult<Polyhedron<T>> {
        let options = ConversionOptions { facet_mode };
        let mut builder = PolyhedronBuilder::new();
        convert_nef_polyhedron_to_polygon_mesh(self, &mut builder, &options)?;
        let mesh = builder.finalize()?;
        mesh.check()?;
        Ok(mesh)
    }
}

/// Every edge is shared by exactly two facets in opposite directions and
/// every component is a closed orientable surface.
fn verify_closed_surface(vertex_count: usize, polygons: &[Vec<usize>]) -> NefResult<()> {
    let mut directed: AHashMap<(usize, usize), usize> = AHashMap::new();
    for polygon in polygons {
        let n = polygon.len();
        for i in 0..n {
            *directed.entry((polygon[i], polygon[(i + 1) % n])).or_insert(0) += 1;
        }
    }
    for (&(a, b), &c) in &directed {
        if c != 1 || directed.get(&(b, a)) != Some(&1) {
            return Err(NefError::topology(format!("edge ({}, {}) is not shared by two facets", a, b)));
        }
    }
    for (i, component) in polygon_components(vertex_count, polygons).iter().enumerate() {
        let chi = component.characteristic();
        if chi > 2 || chi % 2 != 0 {
            return Err(NefError::topology(format!(
                "component {} has Euler characteristic {}",
                i, chi
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Boundary,
        geometry::Plane3,
        mesh::PolygonSoup,
        numeric::CgarRational,
    };

    type Nef = NefPolyhedron<CgarRational>;

    fn block(lo: [i32; 3], hi: [i32; 3]) -> Nef {
        let mut nef = Nef::complete();
        for axis in 0..3 {
            let mut n = [0; 3];
            n[axis] = 1;
            let upper = Nef::half_space(Plane3::from_ints(n[0], n[1], n[2], -hi[axis]), Boundary::Included);
            let lower = Nef::half_space(
                Plane3::from_ints(-n[0], -n[1], -n[2], lo[axis]),
                Boundary::Included,
            );
            nef = &(&nef & &upper) & &lower;
        }
        nef
    }

    #[test]
    fn block_converts_to_six_quads() {
        let mesh = block([0, 0, 0], [1, 2, 3]).to_polyhedron(FacetMode::Preserve).unwrap();
        assert_eq!(mesh.size_of_vertices(), 8);
        assert_eq!(mesh.size_of_facets(), 6);
        assert!(mesh.is_closed());
        assert_eq!(mesh.volume(), CgarRational::from(6));
    }

    #[test]
    fn soup_builder_receives_the_boundary() {
        let mut soup = PolygonSoup::new();
        convert_nef_polyhedron_to_polygon_mesh(
            &block([0, 0, 0], [1, 1, 1]),
            &mut soup,
            &ConversionOptions::triangulated(),
        )
        .unwrap();
        assert_eq!(soup.points.len(), 8);
        assert_eq!(soup.polygons.len(), 12);
        assert!(soup.is_pure_triangle());
    }

    #[test]
    fn l_shape_drops_straight_vertices() {
        // The union splits the top face along x = 1; the seam vertices on the
        // outline are not corners and must disappear.
        let l = &block([0, 0, 0], [2, 1, 1]) | &block([0, 1, 0], [1, 2, 1]);
        let mesh = l.to_polyhedron(FacetMode::Preserve).unwrap();
        assert_eq!(mesh.size_of_vertices(), 12);
        assert_eq!(mesh.size_of_facets(), 8);
        assert_eq!(mesh.volume(), CgarRational::from(3));
    }

    #[test]
    fn stacked_blocks_merge_coplanar_sides() {
        let tower = &block([0, 0, 0], [2, 2, 1]) | &block([0, 0, 1], [1, 1, 2]);
        let mesh = tower.to_polyhedron(FacetMode::Preserve).unwrap();
        assert_eq!(mesh.size_of_vertices(), 15);
        // The two sides at x = 0 and at y = 0 become L-shaped facets.
        assert_eq!(mesh.size_of_facets(), 9);
        assert!(mesh.is_closed());
        assert_eq!(mesh.volume(), CgarRational::from(5));
    }

    #[test]
    fn open_or_pinched_surfaces_fail_verification() {
        let tetrahedron = vec![vec![0, 2, 1], vec![0, 1, 3], vec![1, 2, 3], vec![0, 3, 2]];
        assert!(verify_closed_surface(4, &tetrahedron).is_ok());
        assert!(matches!(verify_closed_surface(4, &tetrahedron[..3]), Err(NefError::Topology { .. })));

        let mut flipped = tetrahedron.clone();
        flipped[3].reverse();
        assert!(verify_closed_surface(4, &flipped).is_err());

        // A second tetrahedron on vertices 0, 4, 5, 6 touching the first at 0.
        let mut pinched = tetrahedron.clone();
        pinched.extend(
            tetrahedron
                .iter()
                .map(|p| p.iter().map(|&v| if v == 0 { 0 } else { v + 3 }).collect::<Vec<_>>()),
        );
        assert!(matches!(verify_closed_surface(7, &pinched), Err(NefError::Topology { .. })));
    }

    #[test]
    fn unbounded_and_empty() {
        let half = Nef::half_space(Plane3::from_ints(0, 0, 1, 0), Boundary::Included);
        assert!(matches!(half.to_polyhedron(FacetMode::Preserve), Err(NefError::Unbounded)));
        let empty = Nef::empty().to_polyhedron(FacetMode::Preserve).unwrap();
        assert!(empty.is_empty());
    }
}
