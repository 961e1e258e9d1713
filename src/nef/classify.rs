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

//! Exact point-in-solid test for closed polyhedra by ray parity.

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::trace;

use crate::{
    config::{RAY_DIRECTION_ATTEMPTS, RAY_SEED},
    error::{NefError, NefResult},
    geometry::{Plane3, Point2, Point3, PointOps, Vector3, VectorOps},
    kernel::{TrianglePosition, locate_in_ring2d},
    mesh::Polyhedron,
    numeric::scalar::{Scalar, Sign},
};

const FIXED_DIRECTIONS: [[i32; 3]; 4] = [[3, 5, 7], [-11, 2, 13], [17, -19, 5], [-7, -23, -29]];

struct ClassifierFacet<T: Scalar> {
    plane: Plane3<T>,
    axis: usize,
    ring: Vec<Point2<T>>,
}

impl<T: Scalar> ClassifierFacet<T> {
    /// `p`, a point of the facet plane, lies in the closed facet.
    fn touches(&self, p: &Point3<T>) -> bool {
        locate_in_ring2d(&self.ring, &p.project(self.axis)) != TrianglePosition::Outside
    }
}

/// Facets of a closed polyhedron, projected once for repeated queries.
pub struct RayClassifier<T: Scalar> {
    facets: Vec<ClassifierFacet<T>>,
}

impl<T: Scalar> RayClassifier<T> {
    pub fn new(mesh: &Polyhedron<T>) -> NefResult<Self> {
        let mut facets = Vec::with_capacity(mesh.size_of_facets());
        for f in 0..mesh.size_of_facets() {
            let plane = mesh
                .facet_plane(f)
                .ok_or(NefError::NonPlanarFacet { facet: f })?;
            let axis = plane.normal().dominant_axis();
            let ring = mesh
                .facet_vertices(f)
                .iter()
                .map(|&v| mesh.point(v).project(axis))
                .collect();
            facets.push(ClassifierFacet { plane, axis, ring });
        }
        Ok(Self { facets })
    }

    pub fn planes(&self) -> impl Iterator<Item = &Plane3<T>> + '_ {
        self.facets.iter().map(|f| &f.plane)
    }

    /// Crossings of the ray `p + s·d, s > 0` with the facets, `None` when
    /// the ray touches a facet boundary, runs inside a facet plane or
    /// starts on a facet.
    fn crossings(&self, p: &Point3<T>, d: &Vector3<T>) -> Option<usize> {
        let mut count = 0;
        for facet in &self.facets {
            let value = facet.plane.value_at(p);
            let nd = facet.plane.normal().dot(d);
            if nd.sign() == Sign::Zero {
                if value.sign() == Sign::Zero {
                    return None;
                }
                continue;
            }
            let s = -value / nd;
            match s.sign() {
                Sign::Negative => continue,
                Sign::Zero => {
                    if facet.touches(p) {
                        return None;
                    }
                    continue;
                }
                Sign::Positive => {}
            }
            let hit = p.add_vector(&d.scale(&s));
            match locate_in_ring2d(&facet.ring, &hit.project(facet.axis)) {
                TrianglePosition::Inside => count += 1,
                TrianglePosition::OnBoundary => return None,
                TrianglePosition::Outside => {}
            }
        }
        Some(count)
    }

    /// Whether `p` lies on the closed surface.
    pub fn on_surface(&self, p: &Point3<T>) -> bool {
        self.facets.iter().any(|f| f.plane.has_on(p) && f.touches(p))
    }

    /// Whether `p` belongs to the closed solid.
    pub fn contains_closed(&self, p: &Point3<T>) -> NefResult<bool> {
        if self.on_surface(p) {
            return Ok(true);
        }
        self.contains(p)
    }

    /// Whether `p`, a point off the surface, is inside the solid.
    pub fn contains(&self, p: &Point3<T>) -> NefResult<bool> {
        let mut rng = StdRng::seed_from_u64(RAY_SEED);
        for attempt in 0..RAY_DIRECTION_ATTEMPTS {
            let d = match FIXED_DIRECTIONS.get(attempt) {
                Some(&[x, y, z]) => Vector3::from_ints(x, y, z),
                None => Vector3::from_ints(
                    rng.random_range(-1000..=1000),
                    rng.random_range(-1000..=1000),
                    rng.random_range(-1000..=1000),
                ),
            };
            if d.is_zero() {
                continue;
            }
            if let Some(count) = self.crossings(p, &d) {
                return Ok(count % 2 == 1);
            }
            trace!(attempt, "degenerate classification ray");
        }
        Err(NefError::topology(format!(
            "no generic ray found from {:?}",
            p.to_f64()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::PolygonSoup;
    use crate::numeric::CgarRational;

    fn unit_cube() -> Polyhedron<CgarRational> {
        let points = (0..8)
            .map(|i| Point3::from_ints(i & 1, (i >> 1) & 1, (i >> 2) & 1))
            .collect();
        let soup = PolygonSoup {
            points,
            polygons: vec![
                vec![0, 2, 3, 1],
                vec![4, 5, 7, 6],
                vec![0, 1, 5, 4],
                vec![2, 6, 7, 3],
                vec![0, 4, 6, 2],
                vec![1, 3, 7, 5],
            ],
        };
        Polyhedron::from_polygon_soup(&soup).unwrap()
    }

    #[test]
    fn inside_and_outside_the_cube() {
        let classifier = RayClassifier::new(&unit_cube()).unwrap();
        let half = CgarRational::from_num_den(1, 2);
        let center = Point3::new(half.clone(), half.clone(), half.clone());
        assert!(classifier.contains(&center).unwrap());
        // Axis-aligned rays through edges are avoided by the fixed directions.
        let outside = Point3::new(half.clone(), half, CgarRational::from(2));
        assert!(!classifier.contains(&outside).unwrap());
        assert!(!classifier.contains(&Point3::from_ints(-1, -1, -1)).unwrap());
    }

    #[test]
    fn closed_containment_includes_the_surface() {
        let classifier = RayClassifier::new(&unit_cube()).unwrap();
        let half = CgarRational::from_num_den(1, 2);
        let on_top = Point3::new(half.clone(), half.clone(), CgarRational::from(1));
        assert!(classifier.contains_closed(&on_top).unwrap());
        assert!(classifier.contains_closed(&Point3::from_ints(1, 1, 1)).unwrap());
        // On the plane of the top facet, but beside the cube.
        let beside = Point3::new(CgarRational::from(3), half, CgarRational::from(1));
        assert!(!classifier.on_surface(&beside));
        assert!(!classifier.contains_closed(&beside).unwrap());
    }

    #[test]
    fn degenerate_rays_are_retried() {
        // From (2, 2, 2) the ray along (-1, -1, -1) hits the cube corner.
        let classifier = RayClassifier::new(&unit_cube()).unwrap();
        let corner = Vector3::<CgarRational>::from_ints(-1, -1, -1);
        assert!(classifier.crossings(&Point3::from_ints(2, 2, 2), &corner).is_none());
        assert!(!classifier.contains(&Point3::from_ints(2, 2, 2)).unwrap());
    }
}
