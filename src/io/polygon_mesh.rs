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

//! Format dispatch on the file extension, and reading a file into a
//! halfedge mesh with soup repair as the fallback.

use std::path::Path;

use tracing::{info, warn};

use crate::{
    config::StlFormat,
    error::{NefError, NefResult},
    io::{
        PolygonMesh,
        off::{read_off_file, write_off_file},
        stl::{read_stl_file, write_stl_file},
    },
    mesh::{PolygonSoup, Polyhedron},
    numeric::scalar::Scalar,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MeshFormat {
    Off,
    Stl,
}

fn format_of(path: &Path) -> NefResult<MeshFormat> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("off") => Ok(MeshFormat::Off),
        Some("stl") => Ok(MeshFormat::Stl),
        _ => Err(NefError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Reads an `.off` or `.stl` file into a polygon soup, as stored.
pub fn read_polygon_soup<T: Scalar, P: AsRef<Path>>(path: P) -> NefResult<PolygonSoup<T>> {
    let path = path.as_ref();
    match format_of(path)? {
        MeshFormat::Off => read_off_file(path),
        MeshFormat::Stl => read_stl_file(path),
    }
}

/// Reads an `.off` or `.stl` file into a halfedge mesh.
///
/// When the polygons do not build a mesh as stored, the soup is repaired
/// (equal points merged, degenerate and repeated polygons dropped) and
/// reoriented consistently first. Fails with [`NefError::NotPolygonMesh`]
/// when even that leaves a non-manifold edge or vertex.
pub fn read_polygon_mesh<T: Scalar, P: AsRef<Path>>(path: P) -> NefResult<Polyhedron<T>> {
    let path = path.as_ref();
    let mut soup = read_polygon_soup(path)?;
    if let Ok(mesh) = Polyhedron::from_polygon_soup(&soup) {
        return Ok(mesh);
    }

    info!(?path, "cleaning polygon soup");
    let removed = soup.repair();
    if !soup.orient() {
        warn!(?path, "polygons cannot be oriented consistently");
    }
    if !soup.is_polygon_mesh() {
        return Err(NefError::NotPolygonMesh {
            path: path.to_path_buf(),
            details: format!("non-manifold after dropping {} polygons", removed),
        });
    }
    Polyhedron::from_polygon_soup(&soup)
}

/// Writes `mesh` to an `.off` or `.stl` file. STL output is ASCII and
/// requires a triangle mesh.
pub fn write_polygon_mesh<M, P>(path: P, mesh: &M) -> NefResult<()>
where
    M: PolygonMesh + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    match format_of(path)? {
        MeshFormat::Off => write_off_file(path, mesh),
        MeshFormat::Stl => write_stl_file(path, mesh, StlFormat::default()),
    }
}
