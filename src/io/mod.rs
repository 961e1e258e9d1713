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

//! Mesh readers and writers.

use std::borrow::Cow;

use crate::{
    mesh::{Polyhedron, PolygonSoup},
    numeric::scalar::Scalar,
};

pub mod off;
pub mod polygon_mesh;
pub mod stl;

pub use off::{read_off, read_off_file, write_off, write_off_file};
pub use polygon_mesh::{read_polygon_mesh, read_polygon_soup, write_polygon_mesh};
pub use stl::{read_stl, read_stl_file, write_stl, write_stl_file};

/// Anything the writers can see as points plus indexed polygons.
pub trait PolygonMesh {
    type Scalar: Scalar;

    fn polygon_soup(&self) -> Cow<'_, PolygonSoup<Self::Scalar>>;
}

impl<T: Scalar> PolygonMesh for PolygonSoup<T> {
    type Scalar = T;

    fn polygon_soup(&self) -> Cow<'_, PolygonSoup<T>> {
        Cow::Borrowed(self)
    }
}

impl<T: Scalar> PolygonMesh for Polyhedron<T> {
    type Scalar = T;

    fn polygon_soup(&self) -> Cow<'_, PolygonSoup<T>> {
        Cow::Owned(self.to_polygon_soup())
    }
}
