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
    ops::{Add, Index, Neg, Sub},
};

use crate::numeric::scalar::{Scalar, Sign};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Vector<T: Scalar, const N: usize> {
    pub coords: [T; N],
}

pub type Vector2<T> = Vector<T, 2>;
pub type Vector3<T> = Vector<T, 3>;

pub trait VectorOps<T: Scalar, const N: usize>: Sized {
    /// Scalar in the plane, vector in space.
    type Cross;

    fn dot(&self, other: &Self) -> T;
    fn cross(&self, other: &Self) -> Self::Cross;
    fn scale(&self, s: &T) -> Self;

    fn squared_length(&self) -> T {
        self.dot(self)
    }
}

impl<T: Scalar, const N: usize> Vector<T, N> {
    pub fn zero() -> Self {
        Vector {
            coords: array::from_fn(|_| T::zero()),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.coords.iter().all(|c| c.sign() == Sign::Zero)
    }

    /// Representative of the ray spanned by `self`: the vector scaled so
    /// that its first non-zero coordinate is `±1`. Two vectors pointing in
    /// the same direction map to the same key.
    pub fn direction_key(&self) -> Self {
        match self.coords.iter().find(|c| c.sign() != Sign::Zero) {
            Some(first) => {
                let s = first.abs();
                Vector {
                    coords: self.coords.clone().map(|c| c / s.clone()),
                }
            }
            None => self.clone(),
        }
    }

    /// Index of the coordinate with the largest magnitude.
    pub fn dominant_axis(&self) -> usize {
        let mut best = 0;
        for i in 1..N {
            if self.coords[i].abs() > self.coords[best].abs() {
                best = i;
            }
        }
        best
    }
}

impl<T: Scalar> Vector<T, 3> {
    pub fn new(x: T, y: T, z: T) -> Self {
        Vector { coords: [x, y, z] }
    }

    pub fn from_ints(x: i32, y: i32, z: i32) -> Self {
        Self::new(T::from(x), T::from(y), T::from(z))
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

    pub fn to_f64(&self) -> [f64; 3] {
        self.coords.clone().map(|c| c.to_f64_lossy())
    }
}

impl<T: Scalar> Vector<T, 2> {
    pub fn new(x: T, y: T) -> Self {
        Vector { coords: [x, y] }
    }
}

impl<T: Scalar> VectorOps<T, 2> for Vector<T, 2> {
    type Cross = T;

    fn dot(&self, other: &Self) -> T {
        let [a0, a1] = &self.coords;
        let [b0, b1] = &other.coords;
        a0.clone() * b0.clone() + a1.clone() * b1.clone()
    }

    fn cross(&self, other: &Self) -> T {
        let [a0, a1] = &self.coords;
        let [b0, b1] = &other.coords;
        a0.clone() * b1.clone() - a1.clone() * b0.clone()
    }

    fn scale(&self, s: &T) -> Self {
        Vector {
            coords: self.coords.clone().map(|c| c * s.clone()),
        }
    }
}

impl<T: Scalar> VectorOps<T, 3> for Vector<T, 3> {
    type Cross = Vector<T, 3>;

    fn dot(&self, other: &Self) -> T {
        let [a0, a1, a2] = &self.coords;
        let [b0, b1, b2] = &other.coords;
        a0.clone() * b0.clone() + a1.clone() * b1.clone() + a2.clone() * b2.clone()
    }

    fn cross(&self, other: &Self) -> Vector<T, 3> {
        let [a0, a1, a2] = &self.coords;
        let [b0, b1, b2] = &other.coords;
        Vector::<T, 3>::new(
            a1.clone() * b2.clone() - a2.clone() * b1.clone(),
            a2.clone() * b0.clone() - a0.clone() * b2.clone(),
            a0.clone() * b1.clone() - a1.clone() * b0.clone(),
        )
    }

    fn scale(&self, s: &T) -> Self {
        Vector {
            coords: self.coords.clone().map(|c| c * s.clone()),
        }
    }
}

impl<T: Scalar, const N: usize> Index<usize> for Vector<T, N> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.coords[i]
    }
}

impl<'a, 'b, T: Scalar, const N: usize> Add<&'b Vector<T, N>> for &'a Vector<T, N> {
    type Output = Vector<T, N>;

    fn add(self, rhs: &'b Vector<T, N>) -> Vector<T, N> {
        let mut out = self.clone();
        for i in 0..N {
            out.coords[i] += &rhs.coords[i];
        }
        out
    }
}

impl<'a, 'b, T: Scalar, const N: usize> Sub<&'b Vector<T, N>> for &'a Vector<T, N> {
    type Output = Vector<T, N>;

    fn sub(self, rhs: &'b Vector<T, N>) -> Vector<T, N> {
        let mut out = self.clone();
        for i in 0..N {
            out.coords[i] -= &rhs.coords[i];
        }
        out
    }
}

impl<T: Scalar, const N: usize> Neg for Vector<T, N> {
    type Output = Vector<T, N>;

    fn neg(self) -> Vector<T, N> {
        Vector {
            coords: self.coords.map(|c| -c),
        }
    }
}

impl<'a, T: Scalar, const N: usize> Neg for &'a Vector<T, N> {
    type Output = Vector<T, N>;

    fn neg(self) -> Vector<T, N> {
        -self.clone()
    }
}
