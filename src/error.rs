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

//! Error type shared by the mesh, Nef and I/O layers.

use std::path::PathBuf;

use thiserror::Error;

pub type NefResult<T> = Result<T, NefError>;

#[derive(Debug, Error)]
pub enum NefError {
    /// A Nef polyhedron can only wrap a mesh without border halfedges.
    #[error("polyhedron is not closed ({border_halfedges} border halfedges)")]
    NotClosed { border_halfedges: usize },

    /// The Nef polyhedron's boundary is not a 2-manifold.
    #[error("Nef polyhedron is not a 2-manifold")]
    NotManifold,

    /// The selection reaches infinity and has no closed boundary mesh.
    #[error("Nef polyhedron is unbounded")]
    Unbounded,

    #[error("facet {facet} is not planar")]
    NonPlanarFacet { facet: usize },

    #[error("invalid face {face}: {details}")]
    InvalidFace { face: usize, details: String },

    #[error("edge ({from}, {to}) is used by more than one face in the same direction")]
    NonManifoldEdge { from: usize, to: usize },

    #[error("inconsistent mesh topology: {details}")]
    Topology { details: String },

    #[error("failed to triangulate facet: {details}")]
    Triangulation { details: String },

    #[error("facet {facet} has {degree} vertices, a triangle mesh is required")]
    NotTriangulated { facet: usize, degree: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse {format} data: {details}")]
    Parse { format: &'static str, details: String },

    #[error("unsupported mesh format: {path:?}")]
    UnsupportedFormat { path: PathBuf },

    /// Even after repair and reorientation the polygons of a file do not
    /// form a polygon mesh.
    #[error("{path:?} does not describe a polygon mesh: {details}")]
    NotPolygonMesh { path: PathBuf, details: String },
}

impl NefError {
    pub(crate) fn parse(format: &'static str, details: impl Into<String>) -> Self {
        NefError::Parse {
            format,
            details: details.into(),
        }
    }

    pub(crate) fn topology(details: impl Into<String>) -> Self {
        NefError::Topology {
            details: details.into(),
        }
    }
}
