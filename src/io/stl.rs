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

//! STL in both flavours.
//!
//! ASCII:
//!   solid
//!   facet normal nx ny nz
//!   outer loop
//!   vertex x y z   (three times)
//!   endloop
//!   endfacet
//!   endsolid
//!
//! Binary: 80 byte header, `u32` triangle count, then per triangle the
//! normal and the three vertices as little-endian `f32` followed by two
//! attribute bytes.

use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::Path,
};

use ahash::AHashMap;
use tracing::{debug, info, warn};

use crate::{
    config::{STL_BINARY_HEADER, STL_HEADER_LEN, STL_TRIANGLE_RECORD_LEN, StlFormat},
    error::{NefError, NefResult},
    geometry::Point3,
    io::PolygonMesh,
    kernel::unit_normal,
    mesh::{MeshBuilder, PolygonSoup},
    numeric::scalar::Scalar,
};

/// Normal written for collinear triangles.
const DEGENERATE_NORMAL: [f64; 3] = [1.0, 0.0, 0.0];

struct StlTriangle {
    normal: [f64; 3],
    vertices: [[f64; 3]; 3],
}

/// Triangles in output order. A polygon `[a, b, c]` is the facet cycle
/// `a -> b -> c` of its first halfedge `h`, written as
/// `target(h), target(next(h)), source(h)`.
fn triangles<T: Scalar>(soup: &PolygonSoup<T>) -> NefResult<Vec<StlTriangle>> {
    if let Some((facet, polygon)) = soup.polygons.iter().enumerate().find(|(_, p)| p.len() != 3) {
        return Err(NefError::NotTriangulated {
            facet,
            degree: polygon.len(),
        });
    }

    Ok(soup
        .polygons
        .iter()
        .map(|polygon| {
            let [p, q, r] = [polygon[1], polygon[2], polygon[0]].map(|v| &soup.points[v]);
            StlTriangle {
                normal: unit_normal(p, q, r).unwrap_or(DEGENERATE_NORMAL),
                vertices: [p.to_f64(), q.to_f64(), r.to_f64()],
            }
        })
        .collect())
}

fn write_ascii<W: Write>(out: &mut W, triangles: &[StlTriangle]) -> io::Result<()> {
    writeln!(out, "solid")?;
    for t in triangles {
        let [nx, ny, nz] = t.normal;
        writeln!(out, "facet normal {} {} {}", nx, ny, nz)?;
        writeln!(out, "outer loop")?;
        for [x, y, z] in &t.vertices {
            writeln!(out, "vertex {} {} {}", x, y, z)?;
        }
        writeln!(out, "endloop")?;
        writeln!(out, "endfacet")?;
    }
    writeln!(out, "endsolid")
}

fn write_binary<W: Write>(out: &mut W, triangles: &[StlTriangle]) -> io::Result<()> {
    let count = u32::try_from(triangles.len()).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "too many triangles for binary STL")
    })?;

    let mut header = [b' '; STL_HEADER_LEN];
    header[..STL_BINARY_HEADER.len()].copy_from_slice(STL_BINARY_HEADER.as_bytes());
    out.write_all(&header)?;
    out.write_all(&count.to_le_bytes())?;

    for t in triangles {
        for value in t.normal.iter().chain(t.vertices.iter().flatten()) {
            out.write_all(&(*value as f32).to_le_bytes())?;
        }
        out.write_all(b"  ")?;
    }
    Ok(())
}

/// Writes a triangle mesh as STL. Every polygon must be a triangle.
pub fn write_stl<M, W>(writer: W, mesh: &M, format: StlFormat) -> NefResult<()>
where
    M: PolygonMesh + ?Sized,
    W: Write,
{
    let soup = mesh.polygon_soup();
    let triangles = triangles(&*soup)?;
    let mut out = BufWriter::new(writer);
    match format {
        StlFormat::Ascii => write_ascii(&mut out, &triangles)?,
        StlFormat::Binary => write_binary(&mut out, &triangles)?,
    }
    out.flush()?;
    debug!(triangles = triangles.len(), ?format, "wrote STL");
    Ok(())
}

pub fn write_stl_file<M, P>(path: P, mesh: &M, format: StlFormat) -> NefResult<()>
where
    M: PolygonMesh + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    info!(?path, ?format, "writing STL");
    write_stl(File::create(path)?, mesh, format)
}

/// Collects triangles into a soup, merging exactly equal points.
struct SoupCollector<T: Scalar> {
    soup: PolygonSoup<T>,
    index: AHashMap<Point3<T>, usize>,
    degenerate: usize,
}

impl<T: Scalar> SoupCollector<T> {
    fn new() -> Self {
        Self {
            soup: PolygonSoup::new(),
            index: AHashMap::new(),
            degenerate: 0,
        }
    }

    fn vertex(&mut self, coords: [f64; 3]) -> NefResult<usize> {
        let [x, y, z] = coords;
        let point = Point3::from_f64(x, y, z)
            .ok_or_else(|| NefError::parse("STL", format!("vertex {:?} is not finite", coords)))?;
        if let Some(&v) = self.index.get(&point) {
            return Ok(v);
        }
        let v = self.soup.add_vertex(point.clone());
        self.index.insert(point, v);
        Ok(v)
    }

    fn triangle(&mut self, corners: [[f64; 3]; 3]) -> NefResult<()> {
        let mut face = [0; 3];
        for (slot, coords) in face.iter_mut().zip(corners) {
            *slot = self.vertex(coords)?;
        }
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            self.degenerate += 1;
            return Ok(());
        }
        self.soup.add_face(&face)?;
        Ok(())
    }

    fn finish(self) -> PolygonSoup<T> {
        if self.degenerate > 0 {
            warn!(skipped = self.degenerate, "skipped STL triangles with merged corners");
        }
        self.soup
    }
}

fn read_binary<T: Scalar>(bytes: &[u8]) -> NefResult<PolygonSoup<T>> {
    let body = &bytes[STL_HEADER_LEN..];
    let count = u32::from_le_bytes([body[0], body[1], body[2], body[3]]) as usize;
    let records = &body[4..];
    if records.len() < count * STL_TRIANGLE_RECORD_LEN {
        return Err(NefError::parse(
            "STL",
            format!("{} triangles announced, {} bytes of data", count, records.len()),
        ));
    }

    let mut collector = SoupCollector::new();
    for record in records.chunks_exact(STL_TRIANGLE_RECORD_LEN).take(count) {
        let value = |i: usize| {
            let at = 12 + 4 * i;
            f32::from_le_bytes([record[at], record[at + 1], record[at + 2], record[at + 3]]) as f64
        };
        let corner = |c: usize| [value(3 * c), value(3 * c + 1), value(3 * c + 2)];
        collector.triangle([corner(0), corner(1), corner(2)])?;
    }
    Ok(collector.finish())
}

fn read_ascii<T: Scalar>(text: &str) -> NefResult<PolygonSoup<T>> {
    let mut collector = SoupCollector::new();
    let mut corners = Vec::with_capacity(3);

    for line in text.lines() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("facet") => corners.clear(),
            Some("vertex") => {
                let mut coords = [0.0; 3];
                for c in &mut coords {
                    let token = parts
                        .next()
                        .ok_or_else(|| NefError::parse("STL", format!("incomplete vertex '{}'", line.trim())))?;
                    *c = token
                        .parse()
                        .map_err(|_| NefError::parse("STL", format!("bad coordinate '{}'", token)))?;
                }
                corners.push(coords);
            }
            Some("endfacet") => {
                let [a, b, c] = corners[..] else {
                    return Err(NefError::parse(
                        "STL",
                        format!("facet with {} vertices", corners.len()),
                    ));
                };
                collector.triangle([a, b, c])?;
                corners.clear();
            }
            Some("endsolid") => break,
            _ => {}
        }
    }
    Ok(collector.finish())
}

fn is_binary(bytes: &[u8]) -> bool {
    if bytes.len() < STL_HEADER_LEN + 4 {
        return false;
    }
    let body = &bytes[STL_HEADER_LEN..];
    let count = u32::from_le_bytes([body[0], body[1], body[2], body[3]]) as usize;
    let exact = body.len() - 4 == count * STL_TRIANGLE_RECORD_LEN;
    let looks_ascii = bytes.trim_ascii_start().starts_with(b"solid");
    exact || !looks_ascii
}

/// Reads ASCII or binary STL; the flavour is detected from the content.
pub fn read_stl<T: Scalar, R: Read>(mut reader: R) -> NefResult<PolygonSoup<T>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let soup = if is_binary(&bytes) {
        read_binary(&bytes)?
    } else if bytes.trim_ascii_start().starts_with(b"solid") {
        read_ascii(&String::from_utf8_lossy(&bytes))?
    } else {
        return Err(NefError::parse("STL", "neither ASCII nor binary STL"));
    };
    debug!(vertices = soup.points.len(), faces = soup.polygons.len(), "read STL");
    Ok(soup)
}

pub fn read_stl_file<T: Scalar, P: AsRef<Path>>(path: P) -> NefResult<PolygonSoup<T>> {
    let path = path.as_ref();
    info!(?path, "reading STL");
    read_stl(File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::CgarRational;

    fn right_triangle() -> PolygonSoup<CgarRational> {
        PolygonSoup {
            points: vec![
                Point3::from_ints(0, 0, 0),
                Point3::from_ints(1, 0, 0),
                Point3::from_ints(0, 1, 0),
            ],
            polygons: vec![vec![0, 1, 2]],
        }
    }

    #[test]
    fn ascii_grammar() {
        let mut bytes = Vec::new();
        write_stl(&mut bytes, &right_triangle(), StlFormat::Ascii).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "solid\n\
             facet normal 0 0 1\n\
             outer loop\n\
             vertex 1 0 0\n\
             vertex 0 1 0\n\
             vertex 0 0 0\n\
             endloop\n\
             endfacet\n\
             endsolid\n"
        );
    }

    #[test]
    fn degenerate_triangle_gets_fixed_normal() {
        let mut soup = right_triangle();
        soup.points[2] = Point3::from_ints(2, 0, 0);
        let mut bytes = Vec::new();
        write_stl(&mut bytes, &soup, StlFormat::Ascii).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("facet normal 1 0 0\n"));
    }

    #[test]
    fn binary_layout() {
        let mut bytes = Vec::new();
        write_stl(&mut bytes, &right_triangle(), StlFormat::Binary).unwrap();
        assert_eq!(bytes.len(), 80 + 4 + 50);
        assert!(bytes.starts_with(b"FileType: Binary "));
        assert_eq!(&bytes[80..84], &1u32.to_le_bytes());
        let nz = f32::from_le_bytes([bytes[92], bytes[93], bytes[94], bytes[95]]);
        assert_eq!(nz, 1.0);
        assert_eq!(&bytes[132..134], b"  ");
    }

    #[test]
    fn rejects_polygons() {
        let soup = PolygonSoup::<CgarRational> {
            points: vec![
                Point3::from_ints(0, 0, 0),
                Point3::from_ints(1, 0, 0),
                Point3::from_ints(1, 1, 0),
                Point3::from_ints(0, 1, 0),
            ],
            polygons: vec![vec![0, 1, 2, 3]],
        };
        let mut bytes = Vec::new();
        assert!(matches!(
            write_stl(&mut bytes, &soup, StlFormat::Ascii),
            Err(NefError::NotTriangulated { facet: 0, degree: 4 })
        ));
    }

    #[test]
    fn both_flavours_read_back() {
        for format in [StlFormat::Ascii, StlFormat::Binary] {
            let mut bytes = Vec::new();
            write_stl(&mut bytes, &right_triangle(), format).unwrap();
            let soup: PolygonSoup<CgarRational> = read_stl(bytes.as_slice()).unwrap();
            assert_eq!(soup.points.len(), 3);
            assert_eq!(soup.polygons, vec![vec![0, 1, 2]]);
            assert_eq!(soup.points[2], Point3::origin());
        }
    }

    #[test]
    fn shared_corners_are_merged() {
        let text = "solid square\n\
            facet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nvertex 1 1 0\nendloop\nendfacet\n\
            facet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 1 0\nvertex 0 1 0\nendloop\nendfacet\n\
            endsolid square\n";
        let soup: PolygonSoup<CgarRational> = read_stl(text.as_bytes()).unwrap();
        assert_eq!(soup.points.len(), 4);
        assert_eq!(soup.polygons, vec![vec![0, 1, 2], vec![0, 2, 3]]);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(read_stl::<CgarRational, _>(&b"hello"[..]).is_err());
        let truncated = "solid\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nendloop\nendfacet\n";
        assert!(matches!(
            read_stl::<CgarRational, _>(truncated.as_bytes()),
            Err(NefError::Parse { format: "STL", .. })
        ));
    }
}
