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

//! Local 2-manifold test of a Nef polyhedron's boundary.

use tracing::debug;

use crate::{nef::nef_polyhedron::NefPolyhedron, numeric::scalar::Scalar};

/// First reason a Nef polyhedron is not simple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimplicityViolation {
    /// A feature of the given dimension disagrees with everything around
    /// it: an isolated point, a dangling edge or face, or a crack.
    InconsistentFeature { dimension: usize, at: [f64; 3] },
    /// The boundary arcs around a vertex do not form one simple cycle.
    VertexNotManifold { vertex: usize },
    /// An edge carries a number of boundary facets other than 0 or 2.
    EdgeNotManifold { at: [f64; 3], facets: usize },
}

impl<T: Scalar> NefPolyhedron<T> {
    /// The boundary is a 2-manifold and no lower dimensional feature
    /// sticks out of it.
    pub fn is_simple(&self) -> bool {
        match self.simplicity_violation() {
            None => true,
            Some(violation) => {
                debug!(?violation, "Nef polyhedron is not simple");
                false
            }
        }
    }

    pub fn simplicity_violation(&self) -> Option<SimplicityViolation> {
        self.skeleton().violation
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::Boundary,
        geometry::Plane3,
        nef::NefPolyhedron,
        numeric::CgarRational,
    };

    type Nef = NefPolyhedron<CgarRational>;

    fn cube(x: i32, y: i32, z: i32, size: i32) -> Nef {
        let mut nef = Nef::complete();
        for (axis, lo) in [(0, x), (1, y), (2, z)] {
            let mut n = [0; 3];
            n[axis] = 1;
            let upper = Nef::half_space(
                Plane3::from_ints(n[0], n[1], n[2], -(lo + size)),
                Boundary::Included,
            );
            let lower = Nef::half_space(Plane3::from_ints(-n[0], -n[1], -n[2], lo), Boundary::Included);
            nef = &(&nef & &upper) & &lower;
        }
        nef
    }

    #[test]
    fn cube_is_simple() {
        assert!(cube(0, 0, 0, 1).is_simple());
        assert!(Nef::empty().is_simple());
        assert!(Nef::complete().is_simple());
    }

    #[test]
    fn cubes_sharing_an_edge_are_not_simple() {
        let pair = &cube(0, 0, 0, 1) | &cube(1, 1, 0, 1);
        assert!(matches!(
            pair.simplicity_violation(),
            Some(super::SimplicityViolation::EdgeNotManifold { facets: 4, .. })
        ));
    }

    #[test]
    fn cubes_sharing_a_corner_are_not_simple() {
        let pair = &cube(0, 0, 0, 1) | &cube(1, 1, 1, 1);
        assert!(matches!(
            pair.simplicity_violation(),
            Some(super::SimplicityViolation::VertexNotManifold { .. })
        ));
    }

    #[test]
    fn isolated_point_is_not_simple() {
        let point = &(&cube(0, 0, 0, 1).boundary() & &cube(1, 1, 1, 1)) | &cube(3, 3, 3, 1);
        assert!(matches!(
            point.simplicity_violation(),
            Some(super::SimplicityViolation::InconsistentFeature { dimension: 0, .. })
        ));
    }

    #[test]
    fn dangling_face_is_not_simple() {
        let solid = cube(0, 0, 0, 2);
        let sheet = Nef::half_space(Plane3::from_ints(0, 0, 1, -1), Boundary::Included)
            .boundary();
        let with_sheet = &solid | &(&sheet & &cube(-1, -1, -1, 4));
        assert!(matches!(
            with_sheet.simplicity_violation(),
            Some(super::SimplicityViolation::InconsistentFeature { dimension: 2, .. })
        ));
    }
}
