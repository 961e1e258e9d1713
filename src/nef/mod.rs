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

//! Nef polyhedra stored as marked binary space partitions, closed under
//! every boolean operation, and the conversion of their boundary to meshes.

pub mod boolean;
pub mod bsp;
pub mod classify;
pub mod convert;
pub mod from_mesh;
pub mod nef_polyhedron;
pub mod region;
pub mod sign_vector;
pub mod simple;
pub mod skeleton;
pub mod sphere_map;

pub use boolean::BooleanOp;
pub use convert::convert_nef_polyhedron_to_polygon_mesh;
pub use nef_polyhedron::NefPolyhedron;
pub use simple::SimplicityViolation;
pub use skeleton::Skeleton;
