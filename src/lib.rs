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

//! Exact Nef polyhedra over rational arithmetic.
//!
//! A [`NefPolyhedron`] is a binary space partition with marked cells, closed
//! under every boolean operation. Its vertices, edges, facets and volumes are
//! derived from the partition on demand. Closed halfedge meshes ([`Polyhedron`])
//! convert to Nef polyhedra and, when the selection is simple, back.

pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod kernel;
pub mod mesh;
pub mod nef;
pub mod numeric;

pub use config::{Boundary, ConversionOptions, FacetMode, StlFormat};
pub use error::{NefError, NefResult};
pub use geometry::{Plane3, Point3, Vector3};
pub use mesh::{MeshBuilder, PolygonSoup, Polyhedron, PolyhedronBuilder};
pub use nef::{BooleanOp, NefPolyhedron, convert_nef_polyhedron_to_polygon_mesh};
pub use numeric::{CgarRational, Scalar, Sign};
