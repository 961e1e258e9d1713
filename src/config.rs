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

//! Options and constants of the conversion pipeline and the I/O adapters.

/// Header of binary STL files written by this crate (padded to 80 bytes).
pub const STL_BINARY_HEADER: &str = "FileType: Binary";

pub const STL_HEADER_LEN: usize = 80;

/// Bytes of one binary STL triangle record.
pub const STL_TRIANGLE_RECORD_LEN: usize = 50;

/// Number of fixed ray directions tried by the point classifier before
/// falling back to seeded random directions.
pub const RAY_DIRECTION_ATTEMPTS: usize = 64;

pub const RAY_SEED: u64 = 0x5eed_0f_ce11;

/// Shape of the facets emitted by the Nef → polyhedron conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacetMode {
    /// Every facet is split into triangles over its own vertices.
    Triangulate,
    /// Facets keep their polygonal shape. Facets with holes are still
    /// triangulated since a halfedge facet has a single boundary cycle.
    #[default]
    Preserve,
}

/// The produced polygons are always checked to form closed orientable
/// surfaces; only the facet shape is configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversionOptions {
    pub facet_mode: FacetMode,
}

impl ConversionOptions {
    pub fn triangulated() -> Self {
        Self {
            facet_mode: FacetMode::Triangulate,
        }
    }
}

/// Whether a half-space contains its bounding plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Boundary {
    #[default]
    Included,
    Excluded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StlFormat {
    #[default]
    Ascii,
    Binary,
}
