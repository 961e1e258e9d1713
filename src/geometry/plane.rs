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

use crate::{
    geometry::{
        point::{Point3, PointOps},
        vector::{Vector3, VectorOps},
    },
    numeric::scalar::{Scalar, Sign},
};

/// Oriented plane `a·x + b·y + c·z + d = 0`; the positive side is the one
/// the normal `(a, b, c)` points to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Plane3<T: Scalar> {
    pub a: T,
    pub b: T,
    pub c: T,
    pub d: T,
}

impl<T: Scalar> Plane3<T> {
    pub fn new(a: T, b: T, c: T, d: T) -> Self {
        Plane3 { a, b, c, d }
    }

    pub fn from_ints(a: i32, b: i32, c: i32, d: i32) -> Self {
        Plane3::new(T::from(a), T::from(b), T::from(c), T::from(d))
    }

    /// Plane through `p` with the given normal.
    pub fn from_point_normal(p: &Point3<T>, normal: &Vector3<T>) -> Self {
        let d = -normal.dot(&p.as_vector());
        let [a, b, c] = normal.coords.clone();
        Plane3 { a, b, c, d }
    }

    /// Plane through three points, oriented so that `p, q, r` is
    /// counter-clockwise seen from the positive side. `None` when the
    /// points are collinear.
    pub fn from_points(p: &Point3<T>, q: &Point3<T>, r: &Point3<T>) -> Option<Self> {
        let normal = (q - p).cross(&(r - p));
        if normal.is_zero() {
            return None;
        }
        Some(Plane3::from_point_normal(p, &normal))
    }

    pub fn normal(&self) -> Vector3<T> {
        Vector3::new(self.a.clone(), self.b.clone(), self.c.clone())
    }

    pub fn is_degenerate(&self) -> bool {
        self.normal().is_zero()
    }

    pub fn value_at(&self, p: &Point3<T>) -> T {
        self.a.clone() * p.coords[0].clone()
            + self.b.clone() * p.coords[1].clone()
            + self.c.clone() * p.coords[2].clone()
            + self.d.clone()
    }

    pub fn oriented_side(&self, p: &Point3<T>) -> Sign {
        self.value_at(p).sign()
    }

    pub fn has_on(&self, p: &Point3<T>) -> bool {
        self.oriented_side(p) == Sign::Zero
    }

    /// Side of the plane a direction points to when leaving a point on it.
    pub fn direction_side(&self, v: &Vector3<T>) -> Sign {
        self.normal().dot(v).sign()
    }

    pub fn opposite(&self) -> Plane3<T> {
        Plane3 {
            a: -self.a.clone(),
            b: -self.b.clone(),
            c: -self.c.clone(),
            d: -self.d.clone(),
        }
    }

    /// Unique representative of the oriented plane: scaled by a positive
    /// factor so that the first non-zero normal coordinate has magnitude one.
    pub fn normalized(&self) -> Plane3<T> {
        let lead = [&self.a, &self.b, &self.c]
            .into_iter()
            .find(|x| x.sign() != Sign::Zero)
            .map(|x| x.abs());
        match lead {
            Some(s) => Plane3 {
                a: self.a.clone() / s.clone(),
                b: self.b.clone() / s.clone(),
                c: self.c.clone() / s.clone(),
                d: self.d.clone() / s,
            },
            None => self.clone(),
        }
    }

    /// Unique representative of the unoriented plane: `normalized()` with
    /// the first non-zero normal coordinate equal to `+1`.
    pub fn canonicalized(&self) -> Plane3<T> {
        let first = [&self.a, &self.b, &self.c]
            .into_iter()
            .find(|x| x.sign() != Sign::Zero)
            .map(|x| x.sign());
        match first {
            Some(Sign::Negative) => self.opposite().normalized(),
            _ => self.normalized(),
        }
    }

    /// Sum of the absolute coefficients once all four are scaled to
    /// integers. Coordinates of every vertex of an arrangement containing
    /// the plane are bounded by a power of the largest height.
    pub fn integral_height(&self) -> T {
        let coeffs = [&self.a, &self.b, &self.c, &self.d];
        let mut scale = T::one();
        for c in coeffs {
            scale *= &c.denominator();
        }
        coeffs
            .into_iter()
            .fold(T::zero(), |acc, c| acc + (c.clone() * scale.clone()).abs())
    }

    /// Point of the plane closest to the origin.
    pub fn point(&self) -> Point3<T> {
        let n = self.normal();
        let t = -self.d.clone() / n.squared_length();
        Point3::from_vector(n.scale(&t))
    }

    /// Common point of three planes, `None` unless their normals are
    /// linearly independent.
    pub fn intersect_three(p: &Plane3<T>, q: &Plane3<T>, r: &Plane3<T>) -> Option<Point3<T>> {
        let (n1, n2, n3) = (p.normal(), q.normal(), r.normal());
        let n2x3 = n2.cross(&n3);
        let det = n1.dot(&n2x3);
        if det.sign() == Sign::Zero {
            return None;
        }
        // n_i · x = -d_i, solved by Cramer's rule in vector form.
        let h1 = -p.d.clone();
        let h2 = -q.d.clone();
        let h3 = -r.d.clone();
        let sum = &(&n2x3.scale(&h1) + &n3.cross(&n1).scale(&h2)) + &n1.cross(&n2).scale(&h3);
        Some(Point3::from_vector(sum.scale(&(T::one() / det))))
    }

    /// Point of the line `self ∩ other` closest to the origin, `None` for
    /// parallel planes.
    pub fn line_point(&self, other: &Plane3<T>) -> Option<Point3<T>> {
        let n1 = self.normal();
        let n2 = other.normal();
        let u = n1.cross(&n2);
        let uu = u.squared_length();
        if uu.sign() == Sign::Zero {
            return None;
        }
        let h1 = -self.d.clone();
        let h2 = -other.d.clone();
        let v = &n2.cross(&u).scale(&h1) + &u.cross(&n1).scale(&h2);
        Some(Point3::from_vector(v.scale(&(T::one() / uu))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::CgarRational;

    type P = Point3<CgarRational>;
    type Pl = Plane3<CgarRational>;

    #[test]
    fn canonical_form_ignores_scale_and_orientation() {
        let p = Pl::from_ints(0, -2, 0, 4);
        let q = Pl::from_ints(0, 3, 0, -6);
        assert_eq!(p.canonicalized(), q.canonicalized());
        assert_ne!(p.normalized(), q.normalized());
    }

    #[test]
    fn three_planes_meet_in_one_point() {
        let x = Pl::from_ints(1, 0, 0, -1);
        let y = Pl::from_ints(0, 1, 0, -2);
        let z = Pl::from_ints(1, 1, 1, -6);
        let p = Pl::intersect_three(&x, &y, &z).unwrap();
        assert_eq!(p, P::from_ints(1, 2, 3));
        assert!(Pl::intersect_three(&x, &x.opposite(), &z).is_none());
    }

    #[test]
    fn line_point_lies_on_both_planes() {
        let a = Pl::from_ints(1, 1, 0, -2);
        let b = Pl::from_ints(0, 1, 1, -3);
        let p = a.line_point(&b).unwrap();
        assert!(a.has_on(&p));
        assert!(b.has_on(&p));
    }

    #[test]
    fn integral_height_clears_denominators() {
        let p = Pl::new(
            CgarRational::from_num_den(1, 2),
            CgarRational::from(0),
            CgarRational::from_num_den(-1, 3),
            CgarRational::from(1),
        );
        // Scaled by 6: (3, 0, -2, 6).
        assert_eq!(p.integral_height(), CgarRational::from(11));
    }

    #[test]
    fn from_points_orients_counter_clockwise() {
        let plane = Pl::from_points(
            &P::from_ints(0, 0, 0),
            &P::from_ints(1, 0, 0),
            &P::from_ints(0, 1, 0),
        )
        .unwrap();
        assert_eq!(plane.oriented_side(&P::from_ints(0, 0, 5)), Sign::Positive);
        assert!(
            Pl::from_points(&P::from_ints(0, 0, 0), &P::from_ints(1, 1, 1), &P::from_ints(2, 2, 2))
                .is_none()
        );
    }
}
