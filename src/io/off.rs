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

//! Object File Format: `OFF`, the counts, one vertex per line, one polygon
//! per line as `<k> i0 .. ik-1` with zero-based indices.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Read, Write},
    path::Path,
};

use tracing::{debug, info};

use crate::{
    error::{NefError, NefResult},
    geometry::Point3,
    io::PolygonMesh,
    mesh::{MeshBuilder, PolygonSoup},
    numeric::scalar::Scalar,
};

/// Non-empty lines with `#` comments stripped, split into tokens.
fn tokenized_lines<R: BufRead>(reader: R) -> NefResult<Vec<Vec<String>>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }
        lines.push(content.split_whitespace().map(str::to_owned).collect());
    }
    Ok(lines)
}

fn parse_count(token: Option<&String>, what: &str) -> NefResult<usize> {
    let token = token.ok_or_else(|| NefError::parse("OFF", format!("missing {}", what)))?;
    token
        .parse()
        .map_err(|_| NefError::parse("OFF", format!("bad {} '{}'", what, token)))
}

fn parse_coord(token: Option<&String>, vertex: usize) -> NefResult<f64> {
    let token =
        token.ok_or_else(|| NefError::parse("OFF", format!("vertex {} is incomplete", vertex)))?;
    token
        .parse()
        .map_err(|_| NefError::parse("OFF", format!("bad coordinate '{}'", token)))
}

/// Reads a polygonal OFF stream.
///
/// The header may carry the counts on its own line; the edge count is
/// optional. Tokens after the coordinates of a vertex or after the indices
/// of a face (colors) are ignored.
pub fn read_off<T: Scalar, R: Read>(reader: R) -> NefResult<PolygonSoup<T>> {
    let lines = tokenized_lines(BufReader::new(reader))?;
    let mut lines = lines.iter();

    let header = lines
        .next()
        .ok_or_else(|| NefError::parse("OFF", "empty file"))?;
    if header[0] != "OFF" {
        return Err(NefError::parse("OFF", format!("expected 'OFF', got '{}'", header[0])));
    }
    let counts = if header.len() > 1 {
        &header[1..]
    } else {
        lines
            .next()
            .map(|l| l.as_slice())
            .ok_or_else(|| NefError::parse("OFF", "missing counts"))?
    };
    let vertex_count = parse_count(counts.first(), "vertex count")?;
    let face_count = parse_count(counts.get(1), "face count")?;

    let mut soup = PolygonSoup::new();
    soup.points.reserve(vertex_count);
    soup.polygons.reserve(face_count);

    for i in 0..vertex_count {
        let tokens = lines
            .next()
            .ok_or_else(|| NefError::parse("OFF", format!("expected {} vertices, got {}", vertex_count, i)))?;
        let x = parse_coord(tokens.first(), i)?;
        let y = parse_coord(tokens.get(1), i)?;
        let z = parse_coord(tokens.get(2), i)?;
        let point = Point3::from_f64(x, y, z)
            .ok_or_else(|| NefError::parse("OFF", format!("vertex {} is not finite", i)))?;
        soup.add_vertex(point);
    }

    let mut face = Vec::new();
    for f in 0..face_count {
        let tokens = lines
            .next()
            .ok_or_else(|| NefError::parse("OFF", format!("expected {} faces, got {}", face_count, f)))?;
        let degree = parse_count(tokens.first(), "face degree")?;
        if tokens.len() < degree + 1 {
            return Err(NefError::parse(
                "OFF",
                format!("face {} lists {} of {} indices", f, tokens.len() - 1, degree),
            ));
        }
        face.clear();
        for token in &tokens[1..=degree] {
            face.push(parse_count(Some(token), "vertex index")?);
        }
        soup.add_face(&face)?;
    }

    debug!(vertices = soup.points.len(), faces = soup.polygons.len(), "read OFF");
    Ok(soup)
}

pub fn read_off_file<T: Scalar, P: AsRef<Path>>(path: P) -> NefResult<PolygonSoup<T>> {
    let path = path.as_ref();
    info!(?path, "reading OFF");
    read_off(File::open(path)?)
}

/// Writes `mesh` as OFF. Coordinates are rounded to the nearest double.
pub fn write_off<M, W>(writer: W, mesh: &M) -> NefResult<()>
where
    M: PolygonMesh + ?Sized,
    W: Write,
{
    let soup = mesh.polygon_soup();
    let mut out = BufWriter::new(writer);

    writeln!(out, "OFF")?;
    writeln!(out, "{} {} 0", soup.points.len(), soup.polygons.len())?;
    for p in &soup.points {
        let [x, y, z] = p.to_f64();
        writeln!(out, "{} {} {}", x, y, z)?;
    }
    for polygon in &soup.polygons {
        write!(out, "{}", polygon.len())?;
        for v in polygon {
            write!(out, " {}", v)?;
        }
        writeln!(out)?;
    }

    out.flush()?;
    Ok(())
}

pub fn write_off_file<M, P>(path: P, mesh: &M) -> NefResult<()>
where
    M: PolygonMesh + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    info!(?path, "writing OFF");
    write_off(File::create(path)?, mesh)
}
