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

use std::{
    array,
    ops::{Add, Index, Sub},
};

use crate::{
    geometry::vector::{Vector, Vector3},
    numeric::scalar::Scalar,
};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point<T: Scalar, const N: usize> {
    pub coords: [T; N],
}

/// A point of a projected facet plane.
pub type Point2<T> = Point<T, 2>;
pub type Point3<T> = Point<T, 3>;

pub trait PointOps<T: Scalar, const N: usize>: Sized {
    type Vector;

    fn as_vector(&self) -> Self::Vector;
    fn from_vector(v: Self::Vector) -> Self;
    fn add_vector(&self, v: &Self::Vector) -> Self;
    fn vector_to(&self, other: &Self) -> Self::Vector;
    fn midpoint(&self, other: &Self) -> Self;
}

impl<T: Scalar, const N: usize> PointOps<T, N> for Point<T, N> {
    type Vector = Vector<T, N>;

    fn as_vector(&self) -> Vector<T, N> {
        Vector {
            coords: self.coords.clone(),
        }
    }

    fn from_vector(v: Vector<T, N>) -> Self {
        Point { coords: v.coords }
    }

    fn add_vector(&self, v: &Vector<T, N>) -> Self {
        let mut out = self.clone();
        for i in 0..N {
            out.coords[i] += &v.coords[i];
        }
        out
    }

    fn vector_to(&self, other: &Self) -> Vector<T, N> {
        other - self
    }

    fn midpoint(&self, other: &Self) -> Self {
        let half = T::one() / T::from(2);
        Point {
            coords: array::from_fn(|i| (self.coords[i].clone() + other.coords[i].clone()) * half.clone()),
        }
    }
}

impl<T: Scalar> Point<T, 3> {
    pub fn new(x: T, y: T, z: T) -> Self {
        Point { coords: [x, y, z] }
    }

    pub fn from_ints(x: i32, y: i32, z: i32) -> Self {
        Self::new(T::from(x), T::from(y), T::from(z))
    }

    /// Exact point from doubles; `None` if a coordinate is not finite.
    pub fn from_f64(x: f64, y: f64, z: f64) -> Option<Self> {
        Some(Self::new(T::from_f64(x)?, T::from_f64(y)?, T::from_f64(z)?))
    }

    pub fn origin() -> Self {
        Self::from_ints(0, 0, 0)
    }

    pub fn x(&self) -> &T {
        &self.coords[0]
    }

    pub fn y(&self) -> &T {
        &self.coords[1]
    }

    pub fn z(&self) -> &T {
        &self.coords[2]
    }

    /// Drops `axis` and keeps the two remaining coordinates in cyclic
    /// order, so a polygon counter-clockwise around `+axis` stays
    /// counter-clockwise in the plane.
    pub fn project(&self, axis: usize) -> Point2<T> {
        let i = (axis + 1) % 3;
        let j = (axis + 2) % 3;
        Point2::new(self.coords[i].clone(), self.coords[j].clone())
    }

    pub fn max_abs_coord(&self) -> T {
        let mut best = self.coords[0].abs();
        for c in &self.coords[1..] {
            let a = c.abs();
            if a > best {
                best = a;
            }
        }
        best
    }

    pub fn to_f64(&self) -> [f64; 3] {
        self.coords.clone().map(|c| c.to_f64_lossy())
    }
}

impl<T: Scalar> Point<T, 2> {
    pub fn new(x: T, y: T) -> Self {
        Point { coords: [x, y] }
    }

    pub fn x(&self) -> &T {
        &self.coords[0]
    }

    pub fn y(&self) -> &T {
        &self.coords[1]
    }
}

/// Barycenter of a non-empty set of points.
pub fn centroid<'a, T, I>(points: I) -> Option<Point3<T>>
where
    T: Scalar + 'a,
    I: IntoIterator<Item = &'a Point3<T>>,
{
    let mut sum = Vector3::<T>::zero();
    let mut count = 0i32;
    for p in points {
        for i in 0..3 {
            sum.coords[i] += &p.coords[i];
        }
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let n = T::from(count);
    Some(Point {
        coords: sum.coords.map(|c| c / n.clone()),
    })
}

impl<T: Scalar, const N: usize> Index<usize> for Point<T, N> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.coords[i]
    }
}

impl<'a, 'b, T: Scalar, const N: usize> Sub<&'b Point<T, N>> for &'a Point<T, N> {
    type Output = Vector<T, N>;

    fn sub(self, rhs: &'b Point<T, N>) -> Vector<T, N> {
        let mut out = self.as_vector();
        for i in 0..N {
            out.coords[i] -= &rhs.coords[i];
        }
        out
    }
}

impl<'a, 'b, T: Scalar, const N: usize> Add<&'b Vector<T, N>> for &'a Point<T, N> {
    type Output = Point<T, N>;

    fn add(self, rhs: &'b Vector<T, N>) -> Point<T, N> {
        self.add_vector(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::CgarRational;

    type P = Point3<CgarRational>;

    #[test]
    fn vector_between_points() {
        let a = P::from_ints(1, 2, 3);
        let b = P::from_ints(4, 6, 3);
        let v = a.vector_to(&b);
        assert_eq!(v, Vector3::from_ints(3, 4, 0));
        assert_eq!(a.add_vector(&v), b);
        assert_eq!(&b - &a, v);
    }

    #[test]
    fn midpoint_and_projection() {
        let a = P::from_ints(0, 0, 0);
        let b = P::from_ints(2, 4, 6);
        assert_eq!(a.midpoint(&b), P::from_ints(1, 2, 3));
        let q = b.project(0);
        assert_eq!(q.x(), &CgarRational::from(4));
        assert_eq!(q.y(), &CgarRational::from(6));
    }
}
