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

//! Boolean operations on Nef polyhedra by merging their BSP trees.

use std::ops::{BitAnd, BitOr, BitXor, Not, Sub};

use tracing::debug;

use crate::{nef::nef_polyhedron::NefPolyhedron, numeric::scalar::Scalar};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    Intersection,
    Join,
    Difference,
    SymmetricDifference,
}

impl BooleanOp {
    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            BooleanOp::Intersection => a && b,
            BooleanOp::Join => a || b,
            BooleanOp::Difference => a && !b,
            BooleanOp::SymmetricDifference => a != b,
        }
    }
}

impl<T: Scalar> NefPolyhedron<T> {
    /// Marks every point with `op` of the operands' marks there. The
    /// result only splits space where one of the operands has structure,
    /// and subtrees that end up uniform collapse into a leaf.
    pub fn boolean(&self, other: &Self, op: BooleanOp) -> Self {
        let result = Self::from_tree(self.tree().combine(other.tree(), op));
        debug!(
            ?op,
            left = self.tree().size(),
            right = other.tree().size(),
            result = result.tree().size(),
            "boolean operation"
        );
        result
    }

    pub fn intersection(&self, other: &Self) -> Self {
        self.boolean(other, BooleanOp::Intersection)
    }

    pub fn join(&self, other: &Self) -> Self {
        self.boolean(other, BooleanOp::Join)
    }

    pub fn difference(&self, other: &Self) -> Self {
        self.boolean(other, BooleanOp::Difference)
    }

    pub fn symmetric_difference(&self, other: &Self) -> Self {
        self.boolean(other, BooleanOp::SymmetricDifference)
    }

    /// Every leaf flips, the unbounded ones included.
    pub fn complement(&self) -> Self {
        let result = Self::from_tree(self.tree().complement());
        result.log_summary("complement");
        result
    }
}

impl<'a, 'b, T: Scalar> BitAnd<&'b NefPolyhedron<T>> for &'a NefPolyhedron<T> {
    type Output = NefPolyhedron<T>;

    fn bitand(self, rhs: &'b NefPolyhedron<T>) -> NefPolyhedron<T> {
        self.intersection(rhs)
    }
}

impl<'a, 'b, T: Scalar> BitOr<&'b NefPolyhedron<T>> for &'a NefPolyhedron<T> {
    type Output = NefPolyhedron<T>;

    fn bitor(self, rhs: &'b NefPolyhedron<T>) -> NefPolyhedron<T> {
        self.join(rhs)
    }
}

impl<'a, 'b, T: Scalar> Sub<&'b NefPolyhedron<T>> for &'a NefPolyhedron<T> {
    type Output = NefPolyhedron<T>;

    fn sub(self, rhs: &'b NefPolyhedron<T>) -> NefPolyhedron<T> {
        self.difference(rhs)
    }
}

impl<'a, 'b, T: Scalar> BitXor<&'b NefPolyhedron<T>> for &'a NefPolyhedron<T> {
    type Output = NefPolyhedron<T>;

    fn bitxor(self, rhs: &'b NefPolyhedron<T>) -> NefPolyhedron<T> {
        self.symmetric_difference(rhs)
    }
}

impl<'a, T: Scalar> Not for &'a NefPolyhedron<T> {
    type Output = NefPolyhedron<T>;

    fn not(self) -> NefPolyhedron<T> {
        self.complement()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Boundary, geometry::{Plane3, Point3}, numeric::CgarRational};

    type Nef = NefPolyhedron<CgarRational>;

    /// The slab `lo <= x_axis <= hi`.
    fn slab(axis: usize, lo: i32, hi: i32) -> Nef {
        let mut n = [0; 3];
        n[axis] = 1;
        let upper = Nef::half_space(Plane3::from_ints(n[0], n[1], n[2], -hi), Boundary::Included);
        let lower = Nef::half_space(Plane3::from_ints(-n[0], -n[1], -n[2], lo), Boundary::Included);
        &upper & &lower
    }

    #[test]
    fn truth_tables() {
        use BooleanOp::*;
        assert!(Intersection.apply(true, true) && !Intersection.apply(true, false));
        assert!(Join.apply(false, true) && !Join.apply(false, false));
        assert!(Difference.apply(true, false) && !Difference.apply(true, true));
        assert!(SymmetricDifference.apply(true, false) && !SymmetricDifference.apply(true, true));
    }

    #[test]
    fn box_from_slabs() {
        let cube = &(&slab(0, 0, 2) & &slab(1, 0, 2)) & &slab(2, 0, 2);
        assert_eq!(cube.number_of_planes(), 6);
        assert_eq!(cube.number_of_vertices(), 8);
        assert_eq!(cube.number_of_edges(), 12);
        assert_eq!(cube.number_of_facets(), 6);
        assert!(cube.is_bounded());
        assert!(cube.contains(&Point3::from_ints(1, 1, 1)));
        assert!(cube.contains(&Point3::from_ints(2, 2, 2)));
        assert!(!cube.contains(&Point3::from_ints(3, 1, 1)));
    }

    #[test]
    fn touching_slabs_merge() {
        let joined = &slab(0, 0, 1) | &slab(0, 1, 3);
        assert!(joined.same_selection(&slab(0, 0, 3)));
        // The seam at x = 1 may stay in the tree but is no facet.
        assert_eq!(joined.number_of_facets(), 2);
        assert_eq!(joined.number_of_volumes(), 3);
    }

    #[test]
    fn complement_twice_is_identity() {
        let s = slab(1, -1, 4);
        let back = !&!&s;
        assert_eq!(back.tree(), s.tree());
        assert!((&s ^ &back).is_empty());
        assert!((&s - &s).is_empty());
        assert!((&s | &!&s).is_space());
    }
}
